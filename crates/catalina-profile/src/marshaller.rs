//! JSON marshalling checked against the derived profile schema

use crate::error::{ProfileError, ProfileResult};
use crate::profile::Profile;
use catalina_model::Hierarchical;
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fmt;

/// Converts profiles to and from JSON
///
/// The schema is derived from [`Profile`] and compiled once on
/// construction; every document crossing the boundary is validated against
/// it.
pub struct ProfileMarshaller {
    schema: Value,
    compiled: JSONSchema,
}

impl fmt::Debug for ProfileMarshaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileMarshaller").finish_non_exhaustive()
    }
}

impl ProfileMarshaller {
    /// Derive and compile the profile schema
    ///
    /// # Errors
    /// Returns [`ProfileError::SchemaCompilation`] if the derived schema is
    /// rejected by the validator.
    pub fn new() -> ProfileResult<Self> {
        let schema = serde_json::to_value(schemars::schema_for!(Profile))?;
        let compiled = JSONSchema::compile(&schema)
            .map_err(|e| ProfileError::SchemaCompilation(e.to_string()))?;
        tracing::debug!("compiled profile schema");
        Ok(Self { schema, compiled })
    }

    /// The derived JSON Schema
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    fn check(&self, value: &Value) -> ProfileResult<()> {
        if let Err(errors) = self.compiled.validate(value) {
            let messages: Vec<String> = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    let path = if path.is_empty() { "root".to_owned() } else { path };
                    format!("{path}: {e}")
                })
                .collect();
            tracing::warn!(errors = messages.len(), "profile failed schema validation");
            return Err(ProfileError::SchemaValidation(messages));
        }
        Ok(())
    }

    /// Serialize a profile, validating the result
    ///
    /// # Errors
    /// Fails when serialization fails or the output violates the schema.
    pub fn to_json(&self, profile: &Profile) -> ProfileResult<String> {
        let value = serde_json::to_value(profile)?;
        self.check(&value)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Validate and deserialize a profile, binding parent links
    ///
    /// # Errors
    /// Fails on malformed JSON, schema violations, or a shape serde cannot
    /// map.
    pub fn from_json(&self, json: &str) -> ProfileResult<Profile> {
        let value: Value = serde_json::from_str(json)?;
        self.check(&value)?;
        let mut profile: Profile = serde_json::from_value(value)?;
        profile.settings.apply_parent_to_children();
        Ok(profile)
    }
}
