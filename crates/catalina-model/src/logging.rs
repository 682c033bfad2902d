//! Access logging, shared by engines and hosts

use crate::hierarchy::{Attach, Hierarchical, ParentRef, ParentSlot};
use crate::service::{Engine, Host};
use crate::validation::{Validate, ValidationContext};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Where a [`Logging`] block lives
pub trait LoggingScope {
    /// Owning node type
    type Parent;

    /// File prefix used when none is configured
    const DEFAULT_PREFIX: &'static str;
}

/// Engine-level access log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EngineScope;

impl LoggingScope for EngineScope {
    type Parent = Engine;
    const DEFAULT_PREFIX: &'static str = "catalina_access_log";
}

/// Host-level access log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HostScope;

impl LoggingScope for HostScope {
    type Parent = Host;
    const DEFAULT_PREFIX: &'static str = "localhost_access_log";
}

/// Access log valve settings. `enabled` mirrors the presence of the valve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Logging<S: LoggingScope> {
    pub enabled: bool,
    pub directory: String,
    pub pattern: String,
    pub prefix: String,
    pub suffix: String,
    pub file_date_format: Option<String>,
    #[serde(skip)]
    parent: ParentSlot<S::Parent>,
    #[serde(skip)]
    scope: PhantomData<S>,
}

impl<S: LoggingScope> Default for Logging<S> {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: "logs".to_owned(),
            pattern: "common".to_owned(),
            prefix: S::DEFAULT_PREFIX.to_owned(),
            suffix: ".txt".to_owned(),
            file_date_format: None,
            parent: ParentSlot::default(),
            scope: PhantomData,
        }
    }
}

impl<S: LoggingScope> Logging<S> {
    /// Enabled log with default file naming
    #[must_use]
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Replace the pattern
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }
}

impl<S: LoggingScope> Hierarchical for Logging<S> {
    type Parent = S::Parent;

    fn parent(&self) -> Option<&ParentRef<S::Parent>> {
        self.parent.get()
    }

    fn location(&self) -> &str {
        self.parent.location()
    }

    fn apply_parent_to_children(&mut self) {}
}

impl<S: LoggingScope> Attach for Logging<S> {
    fn slot_mut(&mut self) -> &mut ParentSlot<S::Parent> {
        &mut self.parent
    }
}

impl<S: LoggingScope> Validate for Logging<S> {
    fn validate(&self, ctx: &mut ValidationContext) {
        if self.enabled {
            ctx.require_text("directory", Some(self.directory.as_str()));
            ctx.require_text("prefix", Some(self.prefix.as_str()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_node;

    #[test]
    fn prefix_depends_on_scope() {
        assert_eq!(Logging::<EngineScope>::default().prefix, "catalina_access_log");
        assert_eq!(Logging::<HostScope>::default().prefix, "localhost_access_log");
    }

    #[test]
    fn disabled_log_is_not_checked() {
        let mut log = Logging::<HostScope>::default();
        log.directory = String::new();
        assert!(validate_node(&log).is_empty());
        log.enabled = true;
        assert_eq!(validate_node(&log).for_field("directory").len(), 1);
        log.prefix = " ".to_owned();
        assert_eq!(validate_node(&log).for_field("prefix").len(), 1);
    }
}
