//! Validation cascade
//!
//! Every node implements [`Validate`] and reports problems into a shared
//! [`ValidationContext`]. Composite nodes push their own field name before
//! recursing, so errors carry fully qualified paths such as
//! `services[0].engine.hosts[1].name`. Validation never stops at the first
//! error.

use crate::derive::derive_apr_listener;
use crate::hierarchy::indexed;
use crate::settings::Settings;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;

/// Deterministic error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Missing or blank value
    Required,
    /// Number outside its allowed range
    Range,
    /// Identity key shared with a sibling
    Duplicate,
    /// Inconsistent combination of values
    Invalid,
    /// Reference to a sibling that does not exist
    UnknownReference,
}

impl ErrorCode {
    /// Stable string form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Range => "range",
            Self::Duplicate => "duplicate",
            Self::Invalid => "invalid",
            Self::UnknownReference => "unknownReference",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field-scoped error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Fully qualified field path
    pub field: String,
    /// Error code
    pub code: ErrorCode,
    /// Message arguments (bounds, offending values)
    pub args: Vec<String>,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.code)?;
        if !self.args.is_empty() {
            write!(f, " ({})", self.args.join(", "))?;
        }
        Ok(())
    }
}

/// All errors collected by one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{count} validation error(s)", count = .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Number of errors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True when validation passed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate in report order
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Errors reported for one exact path
    #[must_use]
    pub fn for_field(&self, field: &str) -> Vec<&FieldError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    /// Errors grouped by path, in first-reported order
    #[must_use]
    pub fn by_field(&self) -> IndexMap<&str, Vec<&FieldError>> {
        let mut grouped: IndexMap<&str, Vec<&FieldError>> = IndexMap::new();
        for error in &self.errors {
            grouped.entry(error.field.as_str()).or_default().push(error);
        }
        grouped
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    ///
    /// # Errors
    /// Returns the collection itself when it holds at least one error.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Path stack plus accumulated errors
#[derive(Debug, Default)]
pub struct ValidationContext {
    path: Vec<String>,
    errors: ValidationErrors,
}

impl ValidationContext {
    /// Empty context rooted at `""`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a path segment
    pub fn push(&mut self, segment: impl Into<String>) {
        self.path.push(segment.into());
    }

    /// Leave the innermost path segment
    pub fn pop(&mut self) {
        self.path.pop();
    }

    /// Run `f` with `field` pushed
    pub fn nested<F>(&mut self, field: &str, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.push(field);
        f(self);
        self.pop();
    }

    /// Run `f` with `field[index]` pushed
    pub fn nested_indexed<F>(&mut self, field: &str, index: usize, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.push(indexed(field, index));
        f(self);
        self.pop();
    }

    /// Validate a child under `field`
    pub fn validate_child<T: Validate + ?Sized>(&mut self, field: &str, child: &T) {
        self.nested(field, |ctx| child.validate(ctx));
    }

    /// Validate every member of a collection under `field[i]`
    pub fn validate_each<T: Validate>(&mut self, field: &str, items: &[T]) {
        for (index, item) in items.iter().enumerate() {
            self.nested_indexed(field, index, |ctx| item.validate(ctx));
        }
    }

    fn qualify(&self, field: &str) -> String {
        let mut full = self.path.join(".");
        if !field.is_empty() {
            if !full.is_empty() {
                full.push('.');
            }
            full.push_str(field);
        }
        full
    }

    /// Record an error without arguments
    pub fn reject(&mut self, field: &str, code: ErrorCode) {
        self.reject_with(field, code, Vec::new());
    }

    /// Record an error with message arguments
    pub fn reject_with(&mut self, field: &str, code: ErrorCode, args: Vec<String>) {
        let field = self.qualify(field);
        tracing::debug!(field = %field, code = %code, "validation error");
        self.errors.errors.push(FieldError { field, code, args });
    }

    /// Reject `None` or blank text; returns whether the value was present
    pub fn require_text(&mut self, field: &str, value: Option<&str>) -> bool {
        let present = value.is_some_and(|v| !v.trim().is_empty());
        if !present {
            self.reject(field, ErrorCode::Required);
        }
        present
    }

    /// Reject a missing value; returns whether it was present
    pub fn require<T>(&mut self, field: &str, value: Option<&T>) -> bool {
        if value.is_none() {
            self.reject(field, ErrorCode::Required);
        }
        value.is_some()
    }

    /// Reject a value outside `min..=max`
    pub fn check_range(&mut self, field: &str, value: i32, min: i32, max: i32) {
        if value < min || value > max {
            self.reject_with(
                field,
                ErrorCode::Range,
                vec![min.to_string(), max.to_string(), value.to_string()],
            );
        }
    }

    /// Reject a value below `min`
    pub fn check_min(&mut self, field: &str, value: i32, min: i32) {
        self.check_range(field, value, min, i32::MAX);
    }

    /// Flag every member of `items` whose key is shared with a sibling.
    ///
    /// Members with no key or a blank key are skipped.
    pub fn check_unique<T, F>(&mut self, field: &str, key_field: &str, items: &[T], key: F)
    where
        F: Fn(&T) -> Option<String>,
    {
        let keys: Vec<Option<String>> = items
            .iter()
            .map(|item| key(item).filter(|k| !k.trim().is_empty()))
            .collect();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for k in keys.iter().flatten() {
            *counts.entry(k.as_str()).or_default() += 1;
        }
        for (index, k) in keys.iter().enumerate() {
            let Some(k) = k else { continue };
            if counts.get(k.as_str()).copied().unwrap_or_default() > 1 {
                let path = format!("{}.{key_field}", indexed(field, index));
                self.reject_with(&path, ErrorCode::Duplicate, vec![k.clone()]);
            }
        }
    }

    /// Finish and hand back the collected errors
    #[must_use]
    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }
}

/// Self-validating node
pub trait Validate {
    /// Append this node's errors (and its children's) to `ctx`
    fn validate(&self, ctx: &mut ValidationContext);
}

/// Validate a settings tree.
///
/// Recomputes the derived APR listener first, then runs the full cascade.
pub fn validate(settings: &mut Settings) -> ValidationErrors {
    if derive_apr_listener(settings) {
        tracing::debug!("apr lifecycle listener recomputed");
    }
    validate_node(settings)
}

/// Run the read-only cascade on any node, with paths relative to it
pub fn validate_node<T: Validate + ?Sized>(node: &T) -> ValidationErrors {
    let mut ctx = ValidationContext::new();
    node.validate(&mut ctx);
    let errors = ctx.into_errors();
    tracing::debug!(errors = errors.len(), "validation finished");
    errors
}
