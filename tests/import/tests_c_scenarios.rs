#![allow(clippy::unwrap_used)]

use nassi::{CImporter, ElementKind};

use crate::helpers::import_helpers::{import_roots, texts};
use crate::helpers::source_fixtures::C_MAIN;

#[test]
fn test_main_function_is_named_after_the_file() {
    let roots = import_roots(&CImporter, "countdown.c", C_MAIN);
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].text, ["countdown"]);

    let elements = roots[0].children.elements();
    assert_eq!(elements[0].text, ["n <- 3"]);
    assert_eq!(elements[1].text, ["n > 0"]);
    let ElementKind::While { body } = &elements[1].kind else {
        panic!("expected while, got {}", elements[1].type_name());
    };
    let body = texts(body);
    assert_eq!(body.len(), 2);
    assert!(body[0].starts_with("OUTPUT"), "printf becomes output: {}", body[0]);
    assert_eq!(body[1], "n <- n - 1");
    assert!(matches!(elements[2].kind, ElementKind::Jump));
}
