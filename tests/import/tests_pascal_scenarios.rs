#![allow(clippy::unwrap_used)]

use nassi::{ElementKind, PascalImporter};

use crate::helpers::import_helpers::{import_roots, texts};
use crate::helpers::source_fixtures::{PASCAL_IF_ELSE, PASCAL_LOOPS, PASCAL_ROUTINES};

#[test]
fn test_bare_if_else_becomes_alternative() {
    let roots = import_roots(&PascalImporter, "choice.pas", PASCAL_IF_ELSE);
    assert_eq!(roots.len(), 1);
    assert!(roots[0].is_program());

    let elements = roots[0].children.elements();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].text, ["x > 0"]);
    let ElementKind::Alternative { on_true, on_false } = &elements[0].kind else {
        panic!("expected alternative, got {}", elements[0].type_name());
    };
    assert_eq!(texts(on_true), ["y <- 1"]);
    assert_eq!(texts(on_false), ["y <- 2"]);
}

#[test]
fn test_known_routines_turn_calls_into_call_elements() {
    let roots = import_roots(&PascalImporter, "calls.pas", PASCAL_ROUTINES);
    let signatures: Vec<String> = roots.iter().skip(1).map(|root| root.signature()).collect();
    assert_eq!(signatures, ["foo#2", "bar#0"]);
    assert!(roots[1..].iter().all(|root| root.is_subroutine()));

    let main = roots[0].children.elements();
    assert_eq!(main.len(), 3);
    assert!(matches!(main[0].kind, ElementKind::Call), "foo(1, 2) is a known routine");
    assert!(matches!(main[1].kind, ElementKind::Call), "bar() is a known routine");
    assert!(
        matches!(main[2].kind, ElementKind::Instruction),
        "baz(1) has no matching routine"
    );
    assert_eq!(main[2].text, ["baz(1)"]);
}

#[test]
fn test_every_root_records_its_origin() {
    let roots = import_roots(&PascalImporter, "calls.pas", PASCAL_ROUTINES);
    for root in &roots {
        assert!(root.origin.contains("Pascal"), "origin was {:?}", root.origin);
        assert!(root.origin.contains("calls.pas"), "origin was {:?}", root.origin);
    }
}

#[test]
fn test_loops_keep_their_bodies() {
    let roots = import_roots(&PascalImporter, "loops.pas", PASCAL_LOOPS);
    assert_eq!(roots[0].text, ["loops"]);
    let elements = roots[0].children.elements();
    assert_eq!(texts(&roots[0].children), ["i <- 0", "i < 10", "i = 0"]);

    let ElementKind::While { body } = &elements[1].kind else {
        panic!("expected while");
    };
    assert_eq!(texts(body), ["i <- i + 1"]);
    let ElementKind::Repeat { body } = &elements[2].kind else {
        panic!("expected repeat");
    };
    assert_eq!(texts(body), ["i <- i - 1"]);
}
