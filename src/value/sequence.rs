//! Sequence and tuple-stream containers (spec §3).

use super::Value;
use indexmap::IndexMap;

/// An ordered value container distinct from a plain array: single-element
/// sequences collapse to their sole element unless `keep_singleton` is
/// set, and nested sequences flatten during path evaluation while arrays
/// present in input data do not.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    items: Vec<Value>,
    keep_singleton: bool,
}

impl Sequence {
    /// An empty sequence.
    pub fn new() -> Self {
        Self { items: Vec::new(), keep_singleton: false }
    }

    /// Build a sequence from existing items.
    pub fn from_vec(items: Vec<Value>) -> Self {
        Self { items, keep_singleton: false }
    }

    /// Set whether a single-element result should stay wrapped.
    pub fn with_keep_singleton(mut self, keep: bool) -> Self {
        self.keep_singleton = keep;
        self
    }

    /// Append a value, flattening nested sequences (arrays are kept as-is).
    pub fn push(&mut self, value: Value) {
        match value {
            Value::Sequence(inner) => {
                self.keep_singleton = self.keep_singleton || inner.keep_singleton;
                self.items.extend(inner.items);
            }
            Value::Undefined => {}
            other => self.items.push(other),
        }
    }

    /// Items currently held.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Consume into the raw item vector.
    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Collapse per spec: empty → `Undefined`, singleton (and not
    /// `keep_singleton`) → the sole element, else stays a sequence value.
    pub fn collapse(self) -> Value {
        if self.items.is_empty() {
            Value::Undefined
        } else if self.items.len() == 1 && !self.keep_singleton {
            self.items.into_iter().next().unwrap()
        } else {
            Value::Sequence(self)
        }
    }
}

/// One binding row of a tuple stream: the per-row focus plus any named
/// positional/index/ancestor bindings introduced by path steps.
#[derive(Debug, Clone, Default)]
pub struct Tuple {
    pub focus: Value,
    pub bindings: IndexMap<String, Value>,
}

/// An ordered sequence of [`Tuple`] rows, produced by path steps that
/// introduce focus/index/ancestor variables (spec §3).
#[derive(Debug, Clone, Default)]
pub struct TupleStream {
    pub rows: Vec<Tuple>,
}

impl TupleStream {
    /// An empty tuple stream.
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Project the `@`-bound focus of every row back into a sequence.
    pub fn foci(&self) -> Sequence {
        Sequence::from_vec(self.rows.iter().map(|t| t.focus.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_element_collapses() {
        let seq = Sequence::from_vec(vec![Value::Number(1.0)]);
        assert_eq!(seq.collapse(), Value::Number(1.0));
    }

    #[test]
    fn empty_collapses_to_undefined() {
        assert_eq!(Sequence::new().collapse(), Value::Undefined);
    }

    #[test]
    fn keep_singleton_preserves_wrapper() {
        let seq = Sequence::from_vec(vec![Value::Number(1.0)]).with_keep_singleton(true);
        assert!(matches!(seq.collapse(), Value::Sequence(_)));
    }

    #[test]
    fn nested_sequences_flatten_on_push() {
        let mut outer = Sequence::new();
        outer.push(Value::Sequence(Sequence::from_vec(vec![Value::Number(1.0), Value::Number(2.0)])));
        outer.push(Value::Number(3.0));
        assert_eq!(outer.len(), 3);
    }
}
