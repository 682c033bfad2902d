//! Stuck thread detection

use crate::hierarchy::{leaf_node, ParentSlot};
use crate::service::Engine;
use crate::validation::{Validate, ValidationContext};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Stuck thread detection valve on an engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ThreadDiagnostics {
    pub enabled: bool,
    /// Seconds before a request thread counts as stuck
    pub threshold: i32,
    /// Number of stuck threads remembered
    pub history: i32,
    #[serde(skip)]
    parent: ParentSlot<Engine>,
}

impl Default for ThreadDiagnostics {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: 600,
            history: 10,
            parent: ParentSlot::default(),
        }
    }
}

impl ThreadDiagnostics {
    #[must_use]
    pub fn enabled(threshold: i32) -> Self {
        Self {
            enabled: true,
            threshold,
            ..Self::default()
        }
    }
}

leaf_node!(ThreadDiagnostics, Engine);

impl Validate for ThreadDiagnostics {
    fn validate(&self, ctx: &mut ValidationContext) {
        ctx.check_min("threshold", self.threshold, 0);
        ctx.check_min("history", self.history, 0);
    }
}
