//! List filters
//!
//! An ordered set of predicates combined with logical AND. Absent or
//! empty filter values add no predicate, so an empty `Filters` keeps
//! every item.

/// Field accessor used by a predicate
type Field<T> = fn(&T) -> &str;

enum Predicate<T> {
    Exact { field: Field<T>, value: String },
    Contains { field: Field<T>, value: String },
}

impl<T> Predicate<T> {
    fn matches(&self, item: &T) -> bool {
        match self {
            Predicate::Exact { field, value } => field(item) == value,
            Predicate::Contains { field, value } => field(item).contains(value.as_str()),
        }
    }
}

/// Conjunction of field predicates
pub struct Filters<T> {
    predicates: Vec<Predicate<T>>,
}

impl<T> Default for Filters<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Filters<T> {
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Require `field` to equal `value`
    pub fn exact(mut self, value: Option<&str>, field: Field<T>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.predicates.push(Predicate::Exact {
                field,
                value: value.to_string(),
            });
        }
        self
    }

    /// Require `field` to contain `value` (case-sensitive)
    pub fn contains(mut self, value: Option<&str>, field: Field<T>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.predicates.push(Predicate::Contains {
                field,
                value: value.to_string(),
            });
        }
        self
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// True when the item satisfies every predicate
    pub fn matches(&self, item: &T) -> bool {
        self.predicates.iter().all(|p| p.matches(item))
    }

    /// Keep matching items, preserving order
    pub fn apply(&self, items: Vec<T>) -> Vec<T> {
        if self.is_empty() {
            return items;
        }
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}
