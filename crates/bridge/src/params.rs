use binja_protocol::DEFAULT_TARGET_LABEL;
use std::collections::BTreeMap;
use std::fmt;

/// Query parameters of one backend operation.
///
/// Backed by an ordered map, so two parameter sets built in different insertion orders compare
/// (and hash into the cache) identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl fmt::Display) {
        self.0.insert(key.to_string(), value.to_string());
    }

    /// Inserts only when the trimmed value is non-empty.
    pub fn insert_non_blank(&mut self, key: &str, value: &str) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.insert(key, trimmed);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Which instance an operation is routed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Default,
    Instance(String),
}

impl Target {
    /// Tool arguments use an empty string for "default instance".
    pub fn from_optional(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|v| !v.is_empty()) {
            Some(id) => Self::Instance(id.to_string()),
            None => Self::Default,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Default => DEFAULT_TARGET_LABEL,
            Self::Instance(id) => id,
        }
    }
}
