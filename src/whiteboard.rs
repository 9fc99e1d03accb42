//! The shared namespace that ingestion writes into.
//!
//! Names are unique and a later write replaces an earlier one. The store is an
//! ordinary value owned by the caller and passed to each stage as `&mut`.

use glob::{Pattern, PatternError};
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::logging::{log, obj, v_str, Domain, Level};
use crate::stats::{StatsReport, Summary};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Flag(bool),
    /// Numeric column indexed by row; missing cells are NaN.
    Series(Vec<f64>),
    /// Mapped column holding non-numeric cells.
    Labels(Vec<String>),
    /// Any other non-object design value (arrays, null).
    Json(serde_json::Value),
}

impl Value {
    /// Convert a design-document value. Objects are the caller's concern.
    pub fn from_json(v: &serde_json::Value) -> Value {
        match v {
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or_else(|| Value::Json(v.clone())),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Bool(b) => Value::Flag(*b),
            other => Value::Json(other.clone()),
        }
    }

    /// Numeric cells available for reduction, if this value has any.
    pub fn numeric_view(&self) -> Option<&[f64]> {
        match self {
            Value::Number(n) => Some(std::slice::from_ref(n)),
            Value::Series(s) if !s.is_empty() => Some(s.as_slice()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            Value::Series(s) => Some(s.as_slice()),
            _ => None,
        }
    }

    fn preview(&self) -> String {
        match self {
            Value::Number(n) => n.to_string(),
            Value::Text(s) => s.clone(),
            Value::Flag(b) => b.to_string(),
            Value::Series(s) => match s.first() {
                Some(first) => format!("{}, ..", (first * 100.0).round() / 100.0),
                None => "[]".to_string(),
            },
            Value::Labels(l) => match l.first() {
                Some(first) => format!("{}, ..", first),
                None => "[]".to_string(),
            },
            Value::Json(j) => j.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Whiteboard {
    entries: BTreeMap<String, Value>,
}

impl Whiteboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last writer wins.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Names matching a case-sensitive glob (`*`, `?`, `[..]`), sorted.
    pub fn names_matching(&self, pattern: &str) -> Result<Vec<String>, PatternError> {
        let pat = Pattern::new(pattern)?;
        Ok(self
            .entries
            .keys()
            .filter(|name| pat.matches(name))
            .cloned()
            .collect())
    }

    /// Add `<name>_min/_mean/_max/_sum` for every summarizable entry present
    /// when the pass starts. Entries written by the pass are not revisited.
    pub fn compute_statistics(&mut self) -> StatsReport {
        let mut report = StatsReport::default();
        let mut derived = Vec::new();
        for (name, value) in &self.entries {
            match value.numeric_view().and_then(Summary::of) {
                Some(summary) => {
                    report.summarized += 1;
                    for (suffix, v) in summary.entries() {
                        derived.push((format!("{}{}", name, suffix), v));
                    }
                }
                None => {
                    report.skipped += 1;
                    log(Level::Debug, Domain::Stats, "skip", obj(&[("name", v_str(name))]));
                }
            }
        }
        for (name, v) in derived {
            self.entries.insert(name, Value::Number(v));
        }
        report
    }

    /// Inspection listing: one line per name, padded to 32 columns.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.entries {
            let _ = writeln!(out, "{:<32} {}", name, value.preview());
        }
        out
    }
}
