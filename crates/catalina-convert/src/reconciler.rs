//! Entry point tying properties, options and converters together

use crate::converters::{ConvertContext, DocumentSet, SettingsConverter};
use crate::error::{ConvertResult, ReconcileError};
use crate::merge::MergeOutcome;
use crate::options::ReconcileOptions;
use crate::properties::Properties;
use catalina_model::{validate, Settings};

/// Reads and writes settings trees against a [`DocumentSet`]
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    properties: Properties,
    options: ReconcileOptions,
}

impl Reconciler {
    #[must_use]
    pub fn new(properties: Properties, options: ReconcileOptions) -> Self {
        Self {
            properties,
            options,
        }
    }

    #[inline]
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    fn context(&self) -> ConvertContext<'_> {
        ConvertContext::new(&self.properties, &self.options)
    }

    /// Read the documents into a settings tree
    ///
    /// # Errors
    /// Fails on the first structural error.
    pub fn read(&self, documents: &DocumentSet) -> ConvertResult<Settings> {
        SettingsConverter.read(documents, &self.context())
    }

    /// Write a settings tree without validating it
    ///
    /// # Errors
    /// Fails when a live document violates a structural precondition.
    pub fn write(&self, documents: &mut DocumentSet, settings: &Settings) -> ConvertResult<MergeOutcome> {
        SettingsConverter.write(documents, settings, &self.context())
    }

    /// Validate, then write
    ///
    /// Validation recomputes derived fields first, so `settings` may change
    /// even when the write is refused.
    ///
    /// # Errors
    /// [`ReconcileError::Invalid`] with every validation error when the tree
    /// is invalid, in which case no document is touched;
    /// [`ReconcileError::Convert`] when the write itself fails.
    pub fn reconcile(
        &self,
        documents: &mut DocumentSet,
        settings: &mut Settings,
    ) -> Result<MergeOutcome, ReconcileError> {
        let errors = validate(settings);
        if !errors.is_empty() {
            tracing::warn!(errors = errors.len(), "refusing to write invalid settings");
            return Err(ReconcileError::Invalid(errors));
        }
        Ok(self.write(documents, settings)?)
    }
}
