use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use dg_core::Value;
use regex::{Captures, Regex};

pub const VARIABLE_SIGIL: char = '$';

fn reference_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("variable reference regex must compile")
    })
}

/// Global name→value mapping read during substitution and written by `Set`.
/// Keys are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableStore {
    values: BTreeMap<String, Value>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed<I, K, V>(seed: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            values: seed
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Replaces every `$name` with the current value of `name`. References to
    /// unknown variables stay in the text verbatim.
    pub fn substitute<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if !text.contains(VARIABLE_SIGIL) {
            return Cow::Borrowed(text);
        }
        reference_regex().replace_all(text, |caps: &Captures<'_>| match self.values.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
    }
}

impl From<BTreeMap<String, Value>> for VariableStore {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }
}
