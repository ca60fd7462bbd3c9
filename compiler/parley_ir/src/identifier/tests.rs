use super::*;
use pretty_assertions::assert_eq;

#[test]
fn splits_on_separator() {
    let id = Identifier::parse("Intro:greeting:text");
    assert_eq!(id.segments(), &["Intro", "greeting", "text"]);
    assert_eq!(id.len(), 3);
    assert!(!id.is_absolute());
}

#[test]
fn leading_separator_is_absolute() {
    let id = Identifier::parse(":Foo:Bar");
    assert_eq!(id.segments(), &["", "Foo", "Bar"]);
    assert!(id.is_absolute());
    assert_eq!(id.relative_segments(), &["Foo", "Bar"]);
}

#[test]
fn empty_text_has_no_segments() {
    let id = Identifier::parse("");
    assert!(id.is_empty());
    assert!(!id.is_absolute());
    assert_eq!(id.last(), None);
}

#[test]
fn lone_separator_is_absolute_with_empty_name() {
    let id = Identifier::parse(":");
    assert!(id.is_absolute());
    assert_eq!(id.relative_segments(), &[""]);
}

#[test]
fn display_rejoins_segments() {
    for text in ["a", "a:b", ":a:b:c"] {
        assert_eq!(Identifier::parse(text).to_string(), text);
    }
}

#[test]
fn from_segments_and_push() {
    let mut id = Identifier::from_segments(["", "Shop"]);
    id.push("keeper");
    assert_eq!(id.to_string(), ":Shop:keeper");
    assert_eq!(id.last(), Some("keeper"));
}
