#![allow(dead_code)]

pub mod import_helpers;
pub mod source_fixtures;
