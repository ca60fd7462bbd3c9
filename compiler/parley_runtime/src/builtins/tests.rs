#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use crate::anomaly::AnomalyKind;
use crate::block::Bookmark;
use crate::config::Config;
use parley_ir::SourcePos;
use pretty_assertions::assert_eq;

fn block(name: &str) -> Obj {
    Obj::block(name, Bookmark::detached(SourcePos::host()))
}

#[test]
fn applicable_builtins_per_kind() {
    assert_eq!(Builtins::for_member(NAME, Kind::Scope), Some(Builtins::NAME));
    assert_eq!(Builtins::for_member(INPUT, Kind::Scope), None);
    assert_eq!(Builtins::for_member(INPUT, Kind::Operator), Some(Builtins::INPUT));
    assert_eq!(Builtins::for_member(NEXT, Kind::Operator), None);
    assert_eq!(Builtins::for_member(NEXT, Kind::Block), Some(Builtins::NEXT));
    assert_eq!(Builtins::for_member(BEEN_SAID, Kind::Block), Some(Builtins::BEEN_SAID));
    assert_eq!(Builtins::for_member("gold", Kind::Block), None);
}

#[test]
fn materialized_once() {
    let scope = Obj::scope("S").as_scope().unwrap();
    let first = scope.member(DOC).unwrap();
    let second = scope.member(DOC).unwrap();
    assert!(first.ptr_eq(&second));
    assert!(scope.data().hooks.get().contains(Builtins::DOC));
}

#[test]
fn unregistered_builtin_stays_gone() {
    let scope = Obj::scope("S").as_scope().unwrap();
    scope.member(DOC).unwrap();
    scope.unregister(DOC).unwrap();
    assert!(scope.member(DOC).is_none());
    scope.register(Obj::integer(DOC, 3, &Config::default())).unwrap();
    assert_eq!(scope.member(DOC).unwrap().kind(), Kind::Variable);
}

#[test]
fn name_reads_and_renames_owner() {
    let config = Config::default();
    let global = Obj::scope("");
    let intro = global
        .as_scope()
        .unwrap()
        .register(Obj::scope("Intro"))
        .unwrap();
    let name = intro.as_scope().unwrap().member(NAME).unwrap();
    let var = name.as_variable().unwrap();
    assert_eq!(var.as_string(&config).unwrap(), "Intro");

    var.assign(Scalar::Str("Prologue".into()), &config).unwrap();
    assert_eq!(intro.name(), "Prologue");
    assert!(global.as_scope().unwrap().member("Intro").is_none());
    assert!(global.as_scope().unwrap().member("Prologue").unwrap().ptr_eq(&intro));
    assert_eq!(var.as_string(&config).unwrap(), "Prologue");
}

#[test]
fn name_of_const_scope_cannot_be_written() {
    let config = Config::default();
    let global = Obj::scope("");
    let intro = global
        .as_scope()
        .unwrap()
        .register(Obj::scope("Intro"))
        .unwrap();
    intro.set_const(true);
    let var = intro.as_scope().unwrap().member(NAME).unwrap();
    let err = var
        .as_variable()
        .unwrap()
        .assign(Scalar::Str("Prologue".into()), &config)
        .unwrap_err();
    assert!(matches!(err.kind, AnomalyKind::ConstAssign { .. }));
    assert_eq!(intro.name(), "Intro");
}

#[test]
fn fullname_is_read_only_and_live() {
    let config = Config::default();
    let global = Obj::scope("");
    let intro = global
        .as_scope()
        .unwrap()
        .register(Obj::scope("Intro"))
        .unwrap();
    let full = intro.as_scope().unwrap().member(FULLNAME).unwrap();
    assert_eq!(full.as_string(&config).unwrap(), ":Intro");
    intro.set_name("Start").unwrap();
    assert_eq!(full.as_string(&config).unwrap(), ":Start");
    let err = full
        .as_variable()
        .unwrap()
        .assign(Scalar::Str("x".into()), &config)
        .unwrap_err();
    assert!(matches!(err.kind, AnomalyKind::ConstAssign { .. }));
}

#[test]
fn doc_starts_empty_and_is_writable() {
    let config = Config::default();
    let scope = Obj::scope("S").as_scope().unwrap();
    let doc = scope.member(DOC).unwrap().as_variable().unwrap();
    assert_eq!(doc.as_string(&config).unwrap(), "");
    doc.assign(Scalar::Str("A shop.".into()), &config).unwrap();
    assert_eq!(doc.as_string(&config).unwrap(), "A shop.");
}

#[test]
fn block_builtins() {
    let config = Config::default();
    let block = block("Greeting");
    let scope = block.as_scope().unwrap();
    assert_eq!(scope.member(INPUT).unwrap().kind(), Kind::List);
    assert_eq!(scope.member(NEXT).unwrap().kind(), Kind::List);

    let said = scope.member(BEEN_SAID).unwrap().as_variable().unwrap();
    assert!(!said.as_bool(&config).unwrap());
    said.assign(Scalar::Bool(true), &config).unwrap();
    assert!(block.as_block().unwrap().been_said());
}

#[test]
fn operator_has_input_but_no_next() {
    let op = Obj::operator("op", |_, _| Ok(Obj::boolean("", true)));
    let scope = op.as_scope().unwrap();
    assert!(scope.member(INPUT).is_some());
    assert!(scope.member(NEXT).is_none());
    assert!(scope.member(BEEN_SAID).is_none());
}
