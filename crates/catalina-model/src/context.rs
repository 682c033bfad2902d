//! Global web application settings from `context.xml` and `web.xml`

use crate::configuration::Configuration;
use crate::hierarchy::{adopt, attach_slot, leaf_node, Hierarchical, ParentRef, ParentSlot};
use crate::validation::{ErrorCode, Validate, ValidationContext};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default cache size in KiB
pub const DEFAULT_CACHE_MAX_SIZE: i32 = 10240;
/// Default cache entry lifetime in milliseconds
pub const DEFAULT_CACHE_TTL: i32 = 5000;
/// Default session timeout in minutes
pub const DEFAULT_SESSION_TIMEOUT: i32 = 30;
/// Default welcome file list
pub const DEFAULT_WELCOME_FILES: [&str; 3] = ["index.html", "index.htm", "index.jsp"];

/// Settings of the global `<Context>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextContainer {
    pub static_resource_cache: StaticResourceCache,
    pub web_application_logger: WebApplicationLogger,
    #[serde(skip)]
    parent: ParentSlot<Configuration>,
}

impl Hierarchical for ContextContainer {
    type Parent = Configuration;

    fn parent(&self) -> Option<&ParentRef<Configuration>> {
        self.parent.get()
    }

    fn location(&self) -> &str {
        self.parent.location()
    }

    fn apply_parent_to_children(&mut self) {
        let path = self.parent.location().to_owned();
        adopt(
            &mut self.static_resource_cache,
            ParentRef::new(path.as_str(), None),
            "staticResourceCache",
        );
        adopt(
            &mut self.web_application_logger,
            ParentRef::new(path.as_str(), None),
            "webApplicationLogger",
        );
    }
}

attach_slot!(ContextContainer, Configuration);

impl Validate for ContextContainer {
    fn validate(&self, ctx: &mut ValidationContext) {
        ctx.validate_child("staticResourceCache", &self.static_resource_cache);
        ctx.validate_child("webApplicationLogger", &self.web_application_logger);
    }
}

/// `<Resources cachingAllowed cacheMaxSize cacheTtl>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct StaticResourceCache {
    pub allowed: bool,
    /// KiB
    pub max_size: i32,
    /// Milliseconds
    pub ttl: i32,
    #[serde(skip)]
    parent: ParentSlot<ContextContainer>,
}

impl Default for StaticResourceCache {
    fn default() -> Self {
        Self {
            allowed: true,
            max_size: DEFAULT_CACHE_MAX_SIZE,
            ttl: DEFAULT_CACHE_TTL,
            parent: ParentSlot::default(),
        }
    }
}

impl StaticResourceCache {
    /// Whether every field still holds its default
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

leaf_node!(StaticResourceCache, ContextContainer);

impl Validate for StaticResourceCache {
    fn validate(&self, ctx: &mut ValidationContext) {
        ctx.check_min("maxSize", self.max_size, 0);
        ctx.check_min("ttl", self.ttl, 0);
    }
}

/// `<Context swallowOutput>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WebApplicationLogger {
    pub swallow_output: bool,
    #[serde(skip)]
    parent: ParentSlot<ContextContainer>,
}

leaf_node!(WebApplicationLogger, ContextContainer);

impl Validate for WebApplicationLogger {
    fn validate(&self, _ctx: &mut ValidationContext) {}
}

/// Defaults applied to every web application (global `web.xml`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerDefaults {
    /// Minutes, `-1` never expires
    pub session_timeout: i32,
    pub welcome_files: Vec<String>,
    #[serde(skip)]
    parent: ParentSlot<Configuration>,
}

impl Default for ServerDefaults {
    fn default() -> Self {
        Self {
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            welcome_files: DEFAULT_WELCOME_FILES.iter().map(|&f| f.to_owned()).collect(),
            parent: ParentSlot::default(),
        }
    }
}

leaf_node!(ServerDefaults, Configuration);

impl Validate for ServerDefaults {
    fn validate(&self, ctx: &mut ValidationContext) {
        ctx.check_min("sessionTimeout", self.session_timeout, -1);
        for (index, file) in self.welcome_files.iter().enumerate() {
            if file.trim().is_empty() {
                ctx.nested_indexed("welcomeFiles", index, |ctx| {
                    ctx.reject("", ErrorCode::Required);
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_node;

    #[test]
    fn cache_defaults() {
        let cache = StaticResourceCache::default();
        assert!(cache.allowed);
        assert_eq!(cache.max_size, 10240);
        assert_eq!(cache.ttl, 5000);
        assert!(cache.is_default());
    }

    #[test]
    fn negative_cache_values_rejected() {
        let mut context = ContextContainer::default();
        context.static_resource_cache.ttl = -1;
        let errors = validate_node(&context);
        assert_eq!(errors.for_field("staticResourceCache.ttl").len(), 1);
    }

    #[test]
    fn blank_welcome_file_rejected_by_index() {
        let mut defaults = ServerDefaults::default();
        defaults.welcome_files.push(" ".to_owned());
        defaults.session_timeout = -1;
        let errors = validate_node(&defaults);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.for_field("welcomeFiles[3]")[0].code, ErrorCode::Required);
    }
}
