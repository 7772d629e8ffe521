#![allow(clippy::unwrap_used)]

use nassi::interchange::{DiagramFormat, Nsd};
use nassi::{KeywordKey, ParserKeywords, Root};

use crate::helpers::import_helpers::texts;
use crate::helpers::source_fixtures::{NSD_GERMAN_SNAPSHOT, NSD_OLD_VERSION};

fn read_nsd(xml: &str, keywords: &ParserKeywords) -> Root {
    Nsd.read(xml.as_bytes(), keywords).unwrap()
}

fn all_texts(root: &Root) -> Vec<String> {
    let mut collected = Vec::new();
    root.walk(&mut |element| collected.push(element.text_string()));
    collected
}

#[test]
fn test_old_file_without_snapshot_is_left_alone() {
    let keywords = ParserKeywords::default()
        .with(KeywordKey::PreWhile, "solange")
        .with(KeywordKey::Output, "AUSGABE");
    let root = read_nsd(NSD_OLD_VERSION, &keywords);
    assert_eq!(all_texts(&root), ["while x < 3", "OUTPUT x"]);
    assert_eq!(root.stored_keywords, None);
}

#[test]
fn test_trusted_snapshot_is_translated_to_current_keywords() {
    let keywords = ParserKeywords::default();
    let root = read_nsd(NSD_GERMAN_SNAPSHOT, &keywords);
    assert_eq!(all_texts(&root), ["INPUT x", "while x < 3", "OUTPUT x"]);
    assert_eq!(root.stored_keywords, Some(keywords.snapshot()));
}

#[test]
fn test_refactoring_twice_changes_nothing_more() {
    let keywords = ParserKeywords::default();
    let mut root = read_nsd(NSD_GERMAN_SNAPSHOT, &keywords);
    let once = root.clone();
    assert_eq!(root.refactor_keywords(&keywords), 0);
    assert_eq!(root, once);
}

#[test]
fn test_refactoring_to_other_keywords_follows_the_stored_set() {
    let mut root = read_nsd(NSD_GERMAN_SNAPSHOT, &ParserKeywords::default());
    let target = ParserKeywords::default().with(KeywordKey::Output, "PRINT");
    assert_eq!(root.refactor_keywords(&target), 1);
    assert_eq!(texts(root.children.elements()[1].subqueues()[0]), ["PRINT x"]);
    assert_eq!(root.stored_keywords, Some(target.snapshot()));
}
