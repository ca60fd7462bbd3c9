#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use crate::anomaly::AnomalyKind;
use crate::config::Config;
use parley_ir::FileId;
use pretty_assertions::assert_eq;

/// Says the argument bound into `in`, prefixed with a greeting.
struct Greeter {
    config: Config,
    runs: usize,
}

impl Executor for Greeter {
    fn config(&self) -> Config {
        self.config
    }

    fn execute_block(&mut self, block: &Block) -> AnomalyResult<()> {
        self.runs += 1;
        let input = block.to_operator().input()?;
        let who = input.get(0, &self.config)?.as_string(&self.config)?;
        block.say("Hello, ");
        block.say(&who);
        Ok(())
    }
}

/// Fails partway through the body.
struct Stumbler;

impl Executor for Stumbler {
    fn config(&self) -> Config {
        Config::default()
    }

    fn execute_block(&mut self, block: &Block) -> AnomalyResult<()> {
        block.say("Well...");
        Err(anomaly::id_not_found("missing"))
    }
}

fn greeter() -> Greeter {
    Greeter {
        config: Config::default(),
        runs: 0,
    }
}

fn block(name: &str) -> Obj {
    Obj::block(name, Bookmark::detached(SourcePos::new(FileId::new(0), 120, 7)))
}

#[test]
fn operate_returns_independent_text() {
    let mut exec = greeter();
    let b = block("Greeting").as_block().unwrap();
    assert!(!b.been_said());

    let first = b.operate(&Obj::string("", "Ann"), &mut exec).unwrap();
    assert!(b.been_said());
    let second = b.operate(&Obj::string("", "Bo"), &mut exec).unwrap();

    let config = Config::default();
    assert_eq!(first.as_string(&config).unwrap(), "Hello, Ann");
    assert_eq!(second.as_string(&config).unwrap(), "Hello, Bo");
    assert!(!first.ptr_eq(&second));
    assert_eq!(b.out(), "Hello, Bo");
    assert_eq!(exec.runs, 2);
}

#[test]
fn operator_view_dispatches_to_block() {
    let mut exec = greeter();
    let obj = block("Greeting");
    let result = obj
        .as_operator()
        .unwrap()
        .operate(&Obj::string("", "Cy"), &mut exec)
        .unwrap();
    assert_eq!(result.as_string(&Config::default()).unwrap(), "Hello, Cy");
    assert!(obj.as_block().unwrap().been_said());
}

#[test]
fn failed_body_is_not_said() {
    let b = block("Shaky").as_block().unwrap();
    let err = b.operate(&Obj::boolean("", true), &mut Stumbler).unwrap_err();
    assert_eq!(
        err.kind,
        AnomalyKind::IdNotFound {
            id: "missing".to_string()
        }
    );
    assert!(!b.been_said());
    assert_eq!(b.out(), "Well...");
}

#[test]
fn been_said_never_resets_itself() {
    let mut exec = greeter();
    let b = block("Once").as_block().unwrap();
    b.operate(&Obj::string("", "A"), &mut exec).unwrap();
    assert!(b.operate(&Obj::boolean("", true), &mut Stumbler).is_err());
    assert!(b.been_said());
}

#[test]
fn bookmark_keeps_position_and_weak_context() {
    let pos = SourcePos::new(FileId::new(2), 40, 3);
    let context = Obj::scope("Chapter");
    let b = Obj::block("Scene", Bookmark::new(pos, &context));
    let view = b.as_block().unwrap();
    assert_eq!(view.bookmark().pos(), pos);
    assert!(view.bookmark().context().unwrap().ptr_eq(&context));
    drop(context);
    assert!(view.bookmark().context().is_none());
}

#[test]
fn successors_are_non_owning() {
    let global = Obj::scope("").as_scope().unwrap();
    let intro = global.register(block("Intro")).unwrap().as_block().unwrap();
    let shop = global.register(block("Shop")).unwrap();
    let inn = global.register(block("Inn")).unwrap();
    intro.add_next(&shop).unwrap();
    intro.add_next(&inn).unwrap();

    let names: Vec<String> = intro
        .successors()
        .unwrap()
        .iter()
        .map(|b| b.full_name())
        .collect();
    assert_eq!(names, [":Shop", ":Inn"]);

    drop(inn);
    global.unregister("Inn").unwrap();
    assert!(matches!(
        intro.successors().unwrap_err().kind,
        AnomalyKind::IdNotFound { .. }
    ));
}

#[test]
fn successor_must_be_a_block() {
    let b = block("B").as_block().unwrap();
    let err = b.add_next(&Obj::scope("S")).unwrap_err();
    assert_eq!(
        err.kind,
        AnomalyKind::NoConversion {
            name: "S".to_string(),
            target: "Block"
        }
    );
}

#[test]
fn block_loop_does_not_leak() {
    let a = block("A");
    let weak = a.downgrade();
    {
        let view = a.as_block().unwrap();
        view.add_next(&a).unwrap();
    }
    drop(a);
    assert!(weak.upgrade().is_none());
}
