//! Parser-preference keywords.
//!
//! These are the surface words the importers put into composed element
//! text (`while`, `INPUT`, ...). A diagram file may carry the set that was
//! active when it was saved; see [`KeywordSnapshot`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The fixed set of keyword preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeywordKey {
    PreAlt,
    PostAlt,
    PreCase,
    PostCase,
    PreFor,
    PostFor,
    StepFor,
    PreForIn,
    PostForIn,
    PreWhile,
    PostWhile,
    PreRepeat,
    PostRepeat,
    PreLeave,
    PreReturn,
    PreExit,
    PreThrow,
    Input,
    Output,
    PreImport,
}

impl KeywordKey {
    pub const ALL: [KeywordKey; 20] = [
        KeywordKey::PreAlt,
        KeywordKey::PostAlt,
        KeywordKey::PreCase,
        KeywordKey::PostCase,
        KeywordKey::PreFor,
        KeywordKey::PostFor,
        KeywordKey::StepFor,
        KeywordKey::PreForIn,
        KeywordKey::PostForIn,
        KeywordKey::PreWhile,
        KeywordKey::PostWhile,
        KeywordKey::PreRepeat,
        KeywordKey::PostRepeat,
        KeywordKey::PreLeave,
        KeywordKey::PreReturn,
        KeywordKey::PreExit,
        KeywordKey::PreThrow,
        KeywordKey::Input,
        KeywordKey::Output,
        KeywordKey::PreImport,
    ];

    /// Persisted name, as used in settings files and diagram attributes.
    pub fn name(self) -> &'static str {
        match self {
            KeywordKey::PreAlt => "preAlt",
            KeywordKey::PostAlt => "postAlt",
            KeywordKey::PreCase => "preCase",
            KeywordKey::PostCase => "postCase",
            KeywordKey::PreFor => "preFor",
            KeywordKey::PostFor => "postFor",
            KeywordKey::StepFor => "stepFor",
            KeywordKey::PreForIn => "preForIn",
            KeywordKey::PostForIn => "postForIn",
            KeywordKey::PreWhile => "preWhile",
            KeywordKey::PostWhile => "postWhile",
            KeywordKey::PreRepeat => "preRepeat",
            KeywordKey::PostRepeat => "postRepeat",
            KeywordKey::PreLeave => "preLeave",
            KeywordKey::PreReturn => "preReturn",
            KeywordKey::PreExit => "preExit",
            KeywordKey::PreThrow => "preThrow",
            KeywordKey::Input => "input",
            KeywordKey::Output => "output",
            KeywordKey::PreImport => "preImport",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    pub fn default_value(self) -> &'static str {
        match self {
            KeywordKey::PreFor => "for",
            KeywordKey::PostFor => "to",
            KeywordKey::StepFor => "by",
            KeywordKey::PreForIn => "foreach",
            KeywordKey::PostForIn => "in",
            KeywordKey::PreWhile => "while",
            KeywordKey::PreRepeat => "until",
            KeywordKey::PreLeave => "leave",
            KeywordKey::PreReturn => "return",
            KeywordKey::PreExit => "exit",
            KeywordKey::PreThrow => "throw",
            KeywordKey::Input => "INPUT",
            KeywordKey::Output => "OUTPUT",
            KeywordKey::PreImport => "include",
            KeywordKey::PreAlt
            | KeywordKey::PostAlt
            | KeywordKey::PreCase
            | KeywordKey::PostCase
            | KeywordKey::PostWhile
            | KeywordKey::PostRepeat => "",
        }
    }
}

impl std::fmt::Display for KeywordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The keyword set in effect for one import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserKeywords {
    values: IndexMap<KeywordKey, String>,
    pub ignore_case: bool,
}

impl Default for ParserKeywords {
    fn default() -> Self {
        Self {
            values: KeywordKey::ALL
                .into_iter()
                .map(|key| (key, key.default_value().to_string()))
                .collect(),
            ignore_case: true,
        }
    }
}

impl ParserKeywords {
    pub fn get(&self, key: KeywordKey) -> &str {
        let value = self.values.get(&key).map(String::as_str).unwrap_or("");
        if key == KeywordKey::PreForIn && value.trim().is_empty() {
            return self.get(KeywordKey::PreFor);
        }
        value
    }

    /// Builder-style setter.
    pub fn with(mut self, key: KeywordKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: KeywordKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// An optional keyword (one that may be empty), padded for insertion.
    ///
    /// Returns the empty string unless `insert` is set and the keyword is
    /// non-blank.
    pub fn get_opt(&self, key: KeywordKey, insert: bool, pre_blank: bool, post_blank: bool) -> String {
        let keyword = self.get(key).trim();
        if !insert || keyword.is_empty() {
            return String::new();
        }
        let mut padded = String::with_capacity(keyword.len() + 2);
        if pre_blank {
            padded.push(' ');
        }
        padded.push_str(keyword);
        if post_blank {
            padded.push(' ');
        }
        padded
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeywordKey, &str)> {
        KeywordKey::ALL.into_iter().map(|key| (key, self.get(key)))
    }

    pub fn snapshot(&self) -> KeywordSnapshot {
        KeywordSnapshot {
            values: self
                .values
                .iter()
                .map(|(key, value)| (*key, value.clone()))
                .collect(),
            ignore_case: Some(self.ignore_case),
        }
    }
}

/// Keywords as saved with a diagram file.
///
/// Files need not carry every key; a missing key never triggers refactoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSnapshot {
    values: IndexMap<KeywordKey, String>,
    pub ignore_case: Option<bool>,
}

impl KeywordSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: KeywordKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    pub fn get(&self, key: KeywordKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeywordKey, &str)> {
        self.values.iter().map(|(key, value)| (*key, value.as_str()))
    }

    /// Keys whose saved value differs from `current`.
    pub fn changed_keys(&self, current: &ParserKeywords) -> Vec<KeywordKey> {
        self.values
            .iter()
            .filter(|(key, value)| current.get(**key) != value.as_str())
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn differs_from(&self, current: &ParserKeywords) -> bool {
        !self.changed_keys(current).is_empty()
    }
}
