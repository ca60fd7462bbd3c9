//! End-to-end behavior of the object model, driven through the public API
//! the way an interpreter would use it.

#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use parley_runtime::{
    AnomalyKind, AnomalyResult, Block, Bookmark, Config, Executor, FileId, Identifier, Kind, List,
    Number, Obj, Scalar, Scope, SharedConfig, SourcePos, MAX_LIST_LEN,
};
use pretty_assertions::assert_eq;

/// A global scope holding `Foo:Bar` and an unrelated nested scope.
fn world() -> (Scope, Obj, Obj, Obj) {
    let global = Obj::scope("").as_scope().unwrap();
    let foo = global.register(Obj::scope("Foo")).unwrap();
    let bar = foo.as_scope().unwrap().register(Obj::plain("Bar")).unwrap();
    let deep = global
        .register(Obj::scope("Other"))
        .unwrap()
        .as_scope()
        .unwrap()
        .register(Obj::scope("Deep"))
        .unwrap();
    (global, foo, bar, deep)
}

fn list_of(values: &[i64], config: &Config) -> List {
    let list = Obj::list("").as_list().unwrap();
    for value in values {
        list.push(&Obj::integer("", *value, config), config).unwrap();
    }
    list
}

fn texts(list: &List, config: &Config) -> Vec<String> {
    list.elements()
        .unwrap()
        .iter()
        .map(|e| e.as_string(config).unwrap())
        .collect()
}

#[test]
fn second_registration_of_same_name_fails() {
    let (global, ..) = world();
    let first = global.register(Obj::plain("x")).unwrap();
    let err = global.register(Obj::plain("x")).unwrap_err();
    assert!(matches!(err.kind, AnomalyKind::AlreadyExists { .. }));
    assert!(global.resolve_str("x").unwrap().ptr_eq(&first));
    assert!(first.parent().unwrap().ptr_eq(&global));
}

#[test]
fn absolute_resolution_matches_global_resolution() {
    let (global, foo, bar, deep) = world();
    let expected = global.resolve_str("Foo:Bar").unwrap();
    assert!(expected.ptr_eq(&bar));
    for start in [global.object().clone(), foo, deep] {
        let found = start.as_scope().unwrap().resolve_str(":Foo:Bar").unwrap();
        assert!(found.ptr_eq(&expected), "from {}", start.full_name());
    }
}

#[test]
fn list_indexing_modes() {
    let shared = SharedConfig::new(Config::strict());
    let list = list_of(&[1, 2, 3], &shared.get());

    let last = list.get(-1, &shared.get()).unwrap();
    assert!(last.ptr_eq(&list.get(2, &shared.get()).unwrap()));

    let err = list.get(5, &shared.get()).unwrap_err();
    assert_eq!(err.kind, AnomalyKind::NoListElement { index: 5, len: 3 });

    shared.set_strict_lists(false);
    list.get(5, &shared.get()).unwrap();
    let length = list.length();
    assert_eq!(length.as_string(&shared.get()).unwrap(), "6");
    for index in 3..=5 {
        let element = list.get(index, &shared.get()).unwrap();
        assert!(element.as_number(&shared.get()).unwrap().is_zero());
    }
}

#[test]
fn resize_limits() {
    let config = Config::default();
    let list = list_of(&[1, 2], &config);
    for bad in [-1, i64::MAX, 1 << 40] {
        assert!(matches!(
            list.resize(bad, &config).unwrap_err().kind,
            AnomalyKind::ListTooBig { max: MAX_LIST_LEN, .. }
        ));
    }
    list.resize(0, &config).unwrap();
    assert!(list.is_empty());
}

#[test]
fn const_and_non_const_list_assignment() {
    let config = Config::default();
    let source = list_of(&[1, 2, 3, 4, 5], &config);

    let fixed = list_of(&[0, 0, 0], &config);
    fixed.set_const(true);
    fixed.assign(&source, &config).unwrap();
    assert_eq!(texts(&fixed, &config), ["1", "2", "3"]);

    let open = list_of(&[0, 0, 0], &config);
    open.assign(&source, &config).unwrap();
    assert_eq!(open.len(), 5);
    assert_eq!(texts(&open, &config), ["1", "2", "3", "4", "5"]);
}

#[test]
fn scalar_view_is_full_name() {
    let (global, foo, bar, deep) = world();
    let config = Config::default();
    let block = global
        .register(Obj::block("Scene", Bookmark::detached(SourcePos::host())))
        .unwrap();
    let op = foo
        .as_scope()
        .unwrap()
        .register(Obj::operator("op", |_, _| Ok(Obj::boolean("", true))))
        .unwrap();
    for obj in [foo, bar, deep, block, op] {
        let text = obj.as_variable().unwrap().as_string(&config).unwrap();
        assert_eq!(text, obj.full_name());
    }
}

#[test]
fn variable_is_not_a_list() {
    let config = Config::default();
    let var = Obj::integer("count", 3, &config);
    let err = var.as_list().unwrap_err();
    assert_eq!(
        err.kind,
        AnomalyKind::NoConversion {
            name: "count".to_string(),
            target: Kind::List.name()
        }
    );
    assert!(err.message.contains("List"));
}

/// Says whatever was bound into `in`.
struct Echo(Config);

impl Executor for Echo {
    fn config(&self) -> Config {
        self.0
    }

    fn execute_block(&mut self, block: &Block) -> AnomalyResult<()> {
        let said = block.to_operator().input()?.flatten(&self.0)?;
        block.say(&said);
        Ok(())
    }
}

#[test]
fn operate_results_are_independent() {
    let config = Config::default();
    let mut echo = Echo(config);
    let block = Obj::block(
        "Echo",
        Bookmark::detached(SourcePos::new(FileId::new(1), 0, 1)),
    )
    .as_block()
    .unwrap();

    let first = block.operate(&Obj::string("", "one"), &mut echo).unwrap();
    assert!(block.been_said());
    let second = block.operate(&Obj::string("", "two"), &mut echo).unwrap();
    assert!(block.been_said());

    first
        .as_variable()
        .unwrap()
        .assign(Scalar::Str("changed".into()), &config)
        .unwrap();
    assert_eq!(second.as_string(&config).unwrap(), "two");
    assert_eq!(block.out(), "two");
}

#[test]
fn precision_bounds_and_formatting() {
    let config = Config::default();
    let n = Obj::number("n", Number::parse("3.14159", &config).unwrap());
    let var = n.as_variable().unwrap();
    for bad in [0, 10_001] {
        assert_eq!(
            var.set_precision(bad, &config).unwrap_err().kind,
            AnomalyKind::BadPrecision { precision: bad }
        );
    }
    var.set_precision(3, &config).unwrap();
    assert_eq!(n.as_string(&config).unwrap(), "3.14");
    var.set_precision(10, &config).unwrap();
    assert_eq!(n.as_string(&config).unwrap(), "3.14");
}

#[test]
fn script_settings_flow_through_shared_config() {
    let shared = SharedConfig::default();
    let global = Obj::scope("").as_scope().unwrap();
    global.register(shared.precision_variable("precision")).unwrap();
    global.register(shared.base_variable("base")).unwrap();

    let precision = global.resolve(&Identifier::parse(":precision")).unwrap();
    precision
        .as_variable()
        .unwrap()
        .assign(Scalar::Str("4".into()), &shared.get())
        .unwrap();
    assert_eq!(shared.get().precision, 4);

    let third = Obj::integer("", 1, &shared.get())
        .as_variable()
        .unwrap()
        .binary(
            parley_runtime::BinaryOp::Div,
            &Obj::integer("", 3, &shared.get()),
            &shared.get(),
        )
        .unwrap();
    assert_eq!(third.as_string(&shared.get()).unwrap(), "0.3333");

    let base = global.resolve_str("base").unwrap();
    base.as_variable()
        .unwrap()
        .assign(Scalar::Str("16".into()), &shared.get())
        .unwrap();
    let hex = Obj::string("", "ff");
    assert_eq!(hex.as_number(&shared.get()).unwrap().to_i64(), Some(255));
}
