#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use crate::anomaly::AnomalyKind;
use crate::config::Config;
use pretty_assertions::assert_eq;

fn scope(name: &str) -> Scope {
    Obj::scope(name).as_scope().unwrap()
}

/// Global scope with `Foo:Bar` registered under it.
fn world() -> (Scope, Obj, Obj) {
    let global = scope("");
    let foo = global.register(Obj::scope("Foo")).unwrap();
    let bar = foo.as_scope().unwrap().register(Obj::plain("Bar")).unwrap();
    (global, foo, bar)
}

// Registration

#[test]
fn register_sets_parent() {
    let s = scope("S");
    let obj = s.register(Obj::plain("x")).unwrap();
    assert!(obj.parent().unwrap().ptr_eq(&s));
    assert_eq!(s.len(), 1);
}

#[test]
fn duplicate_registration_fails() {
    let s = scope("S");
    s.register(Obj::plain("x")).unwrap();
    let err = s.register(Obj::plain("x")).unwrap_err();
    assert_eq!(
        err.kind,
        AnomalyKind::AlreadyExists {
            name: "x".to_string(),
            scope: "S".to_string()
        }
    );
    assert_eq!(s.len(), 1);
}

#[test]
fn register_into_const_scope_fails() {
    let s = scope("S");
    s.set_const(true);
    assert_eq!(
        s.register(Obj::plain("x")).unwrap_err().kind,
        AnomalyKind::ConstAssign {
            name: "S".to_string()
        }
    );
}

#[test]
fn register_moves_between_scopes() {
    let a = scope("A");
    let b = scope("B");
    let obj = a.register(Obj::plain("x")).unwrap();
    b.register(obj.clone()).unwrap();
    assert!(a.member("x").is_none());
    assert!(obj.parent().unwrap().ptr_eq(&b));
}

#[test]
fn scope_cannot_own_itself_or_an_ancestor() {
    let (global, foo, _) = world();
    let foo_scope = foo.as_scope().unwrap();
    assert_eq!(
        foo_scope.register(foo.clone()).unwrap_err().kind,
        AnomalyKind::OwnershipCycle {
            name: ":Foo".to_string()
        }
    );
    assert_eq!(
        foo_scope.register(global.object().clone()).unwrap_err().kind,
        AnomalyKind::OwnershipCycle {
            name: String::new()
        }
    );
    assert!(foo.parent().unwrap().ptr_eq(&global));
}

#[test]
fn unregister_clears_parent() {
    let s = scope("S");
    let obj = s.register(Obj::plain("x")).unwrap();
    let removed = s.unregister("x").unwrap();
    assert!(removed.ptr_eq(&obj));
    assert!(!obj.is_registered());
    assert!(s.is_empty());
}

#[test]
fn unregister_absent_is_panic_class() {
    let err = scope("S").unregister("ghost").unwrap_err();
    assert!(err.is_panic());
}

#[test]
fn clear_resets_builtins() {
    let s = scope("S");
    let doc = s.member("doc").unwrap();
    doc.as_variable()
        .unwrap()
        .assign(crate::Scalar::Str("notes".into()), &Config::default())
        .unwrap();
    let member = s.register(Obj::plain("x")).unwrap();
    s.clear();
    assert!(s.is_empty());
    assert!(!member.is_registered());
    let fresh = s.member("doc").unwrap();
    assert!(!fresh.ptr_eq(&doc));
    assert_eq!(fresh.as_string(&Config::default()).unwrap(), "");
}

// Resolution

#[test]
fn absolute_identifier_restarts_at_global() {
    let (global, foo, bar) = world();
    let sub = foo.as_scope().unwrap().register(Obj::scope("Sub")).unwrap();
    let found = sub.as_scope().unwrap().resolve_str(":Foo:Bar").unwrap();
    assert!(found.ptr_eq(&bar));
    assert!(global.resolve_str("Foo:Bar").unwrap().ptr_eq(&bar));
}

#[test]
fn relative_identifier_does_not_climb_parents() {
    let (_, foo, _) = world();
    let sub = foo.as_scope().unwrap().register(Obj::scope("Sub")).unwrap();
    let err = sub.as_scope().unwrap().resolve_str("Bar").unwrap_err();
    assert_eq!(
        err.kind,
        AnomalyKind::IdNotFound {
            id: "Bar".to_string()
        }
    );
}

#[test]
fn miss_names_full_identifier() {
    let (global, _, _) = world();
    let err = global.resolve_str("Foo:Baz:Qux").unwrap_err();
    assert_eq!(err.message, "identifier not found: Foo:Baz:Qux");
}

#[test]
fn descending_into_non_scope_misses() {
    let (global, _, _) = world();
    assert!(global.try_resolve(&Identifier::parse("Foo:Bar:x")).is_none());
}

#[test]
fn imports_are_searched_in_order() {
    let a = scope("A");
    let b = scope("B");
    let from_a = a.register(Obj::plain("x")).unwrap();
    b.register(Obj::plain("x")).unwrap();
    let s = scope("S");
    s.import(&a).unwrap();
    s.import(&b).unwrap();
    assert!(s.resolve_str("x").unwrap().ptr_eq(&from_a));
    s.unimport(&a).unwrap();
    assert!(!s.resolve_str("x").unwrap().ptr_eq(&from_a));
}

#[test]
fn local_hit_wins_over_imports() {
    let lib = scope("Lib");
    lib.register(Obj::plain("x")).unwrap();
    let s = scope("S");
    let local = s.register(Obj::plain("x")).unwrap();
    s.import(&lib).unwrap();
    assert!(s.resolve_str("x").unwrap().ptr_eq(&local));
}

#[test]
fn compound_identifier_through_import() {
    let lib = scope("Lib");
    let shop = lib.register(Obj::scope("Shop")).unwrap();
    let price = shop.as_scope().unwrap().register(Obj::plain("price")).unwrap();
    let s = scope("S");
    s.import(&lib).unwrap();
    assert!(s.resolve_str("Shop:price").unwrap().ptr_eq(&price));
    assert!(s.exists("Shop:price"));
    assert!(!s.exists("Shop:cost"));
    assert!(!s.exists(""));
}

#[test]
fn import_cycles_terminate() {
    let a = scope("A");
    let b = scope("B");
    a.import(&b).unwrap();
    b.import(&a).unwrap();
    assert!(a.try_resolve(&Identifier::parse("nowhere")).is_none());
    let target = b.register(Obj::plain("here")).unwrap();
    assert!(a.resolve_str("here").unwrap().ptr_eq(&target));
}

#[test]
fn import_rules() {
    let a = scope("A");
    let b = scope("B");
    assert_eq!(
        a.import(&a).unwrap_err().kind,
        AnomalyKind::AlreadyExists {
            name: "A".to_string(),
            scope: "A".to_string()
        }
    );
    a.import(&b).unwrap();
    assert!(a.import(&b).is_err());
    assert_eq!(
        a.import(&Obj::plain("p")).unwrap_err().kind,
        AnomalyKind::NoConversion {
            name: "p".to_string(),
            target: "Scope"
        }
    );
    let c = scope("C");
    assert_eq!(
        a.unimport(&c).unwrap_err().kind,
        AnomalyKind::NotImported {
            name: "C".to_string()
        }
    );
}

#[test]
fn dropped_import_is_skipped() {
    let s = scope("S");
    {
        let temp = scope("Temp");
        temp.register(Obj::plain("x")).unwrap();
        s.import(&temp).unwrap();
    }
    assert!(s.imports().is_empty());
    assert!(s.try_resolve(&Identifier::parse("x")).is_none());
}

#[test]
fn deep_nesting_resolves() {
    let global = scope("");
    let mut current = global.clone();
    let mut path = Vec::new();
    for depth in 0..500 {
        let name = format!("s{depth}");
        path.push(name.clone());
        current = current.register(Obj::scope(name)).unwrap().as_scope().unwrap();
    }
    let leaf = current.register(Obj::plain("leaf")).unwrap();
    path.push("leaf".to_string());
    let id = Identifier::from_segments(path);
    assert!(global.resolve(&id).unwrap().ptr_eq(&leaf));
}

// Built-ins

#[test]
fn builtins_exist_on_first_lookup() {
    let s = scope("S");
    assert!(s.is_empty());
    assert!(s.exists("name"));
    assert!(s.exists("fullname"));
    assert!(s.exists("doc"));
    assert!(!s.exists("in"));
    assert_eq!(s.len(), 3);
}

#[test]
fn builtin_name_collides_with_registration() {
    let s = scope("S");
    let err = s.register(Obj::plain("doc")).unwrap_err();
    assert!(matches!(err.kind, AnomalyKind::AlreadyExists { .. }));
}
