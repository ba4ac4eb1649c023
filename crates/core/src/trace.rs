//! Ordered step traces recorded by the engines.
//!
//! Each engine invocation builds its own [`StepTrace`] and hands it back inside
//! the result; nothing is shared between runs. Sub-procedures (division,
//! block summation, the channel) return a [`Traced`] value instead of writing
//! into a logger passed down to them, and the caller absorbs their steps in
//! order.
//!
//! A step's `state` is a flat mapping from stable field names to primitive
//! values. Keys are kept sorted so serialized traces diff cleanly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bits::BitString;

/// A primitive value in a step snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Flag(bool),
    Number(i64),
    Text(String),
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        StateValue::Flag(value)
    }
}

impl From<usize> for StateValue {
    fn from(value: usize) -> Self {
        StateValue::Number(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::Text(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::Text(value)
    }
}

impl From<&BitString> for StateValue {
    fn from(value: &BitString) -> Self {
        StateValue::Text(value.to_string())
    }
}

/// One recorded algorithm step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Short label shown in a step list
    pub title: String,

    /// Human-readable explanation of what happened
    pub description: String,

    /// Optional snapshot for visualization (empty when absent)
    #[serde(default)]
    pub state: BTreeMap<String, StateValue>,
}

impl Step {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            state: BTreeMap::new(),
        }
    }

    /// Attach one snapshot field.
    pub fn with(mut self, key: &str, value: impl Into<StateValue>) -> Self {
        self.state.insert(key.to_string(), value.into());
        self
    }

    /// Look up a snapshot field.
    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.state.get(key)
    }
}

/// Append-only ordered log of steps for a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepTrace {
    steps: Vec<Step>,
}

impl StepTrace {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step with no snapshot.
    pub fn record(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.steps.push(Step::new(title, description));
    }

    /// Append a fully built step.
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Append every step of `other`, keeping order, and return its value.
    pub fn absorb<T>(&mut self, other: Traced<T>) -> T {
        self.steps.extend(other.steps.steps);
        other.value
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// Titles in order; handy for assertions and summaries.
    pub fn titles(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.title.as_str()).collect()
    }

    /// First step whose title matches exactly.
    pub fn find(&self, title: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.title == title)
    }
}

impl<'a> IntoIterator for &'a StepTrace {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// A value together with the steps that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traced<T> {
    pub value: T,
    pub steps: StepTrace,
}

impl<T> Traced<T> {
    pub fn new(value: T, steps: StepTrace) -> Self {
        Self { value, steps }
    }
}
