use super::Interner;
use crate::Name;
use pretty_assertions::assert_eq;

#[test]
fn same_string_same_name() {
    let interner = Interner::new();
    let a = interner.intern("total");
    let b = interner.intern("total");
    assert_eq!(a, b);
}

#[test]
fn distinct_strings_distinct_names() {
    let interner = Interner::new();
    let a = interner.intern("x");
    let b = interner.intern("y");
    assert_ne!(a, b);
}

#[test]
fn lookup_round_trips() {
    let interner = Interner::new();
    let name = interner.intern("Count");
    assert_eq!(interner.lookup(name), "Count");
}

#[test]
fn empty_string_is_pre_interned() {
    let interner = Interner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
}

#[test]
fn intern_owned_matches_intern() {
    let interner = Interner::new();
    let a = interner.intern("value");
    let b = interner.intern_owned(String::from("value"));
    assert_eq!(a, b);
}
