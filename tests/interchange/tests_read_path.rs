#![allow(clippy::unwrap_used)]

use nassi::interchange::{InterchangeError, read_path};
use nassi::{ElementKind, ParserKeywords};

use crate::helpers::import_helpers::{source_file, texts};
use crate::helpers::source_fixtures::SBD_MAIN;

#[test]
fn test_sbd_inline_declaration() {
    let file = source_file("main.sbd", SBD_MAIN);
    let root = read_path(&file.path, &ParserKeywords::default()).unwrap();
    assert_eq!(root.text_string(), "main");
    assert_eq!(texts(&root.children), ["var a: int"]);
    assert!(matches!(root.children.elements()[0].kind, ElementKind::Instruction));
    assert!(root.origin.starts_with(" / sbide: \""), "{}", root.origin);
}

#[test]
fn test_unnamed_structogram_is_named_after_the_file() {
    // "x <- 1" as character codes
    let xml = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<struktogramm>
  <strelem typ="0" bgcolor="-1"><text>120;32;60;45;32;49</text></strelem>
</struktogramm>"#;
    let file = source_file("first try.stj", xml);
    let root = read_path(&file.path, &ParserKeywords::default()).unwrap();
    assert_eq!(root.text_string(), "first_try");
    assert_eq!(texts(&root.children), ["x <- 1"]);
    assert!(root.origin.contains("Struktogrammeditor"));
}

#[test]
fn test_content_must_match_the_format() {
    let file = source_file("wrong.nsd", "{ main }{1 x <- 1}");
    assert!(read_path(&file.path, &ParserKeywords::default()).is_err());

    let file = source_file("wrong.sbd", "<root/>");
    assert!(read_path(&file.path, &ParserKeywords::default()).is_err());
}

#[test]
fn test_unknown_extension_is_unsupported() {
    let file = source_file("diagram.txt", "{ main }");
    let error = read_path(&file.path, &ParserKeywords::default()).unwrap_err();
    assert!(matches!(error, InterchangeError::Unsupported(_)), "{error:?}");
}

#[test]
fn test_unbalanced_nsd_is_rejected() {
    let xml = r#"<root text="&#34;p&#34;"><children><alternative text="&#34;c&#34;"><qFalse></qFalse></alternative></children></root>"#;
    let file = source_file("bad.nsd", xml);
    let error = read_path(&file.path, &ParserKeywords::default()).unwrap_err();
    assert!(matches!(error, InterchangeError::Malformed { .. }), "{error:?}");
}
