use catalina_model::Settings;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A named, persistable settings tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Profile {
    pub name: String,
    pub settings: Settings,
}

impl Profile {
    #[must_use]
    pub fn new(name: impl Into<String>, settings: Settings) -> Self {
        Self {
            name: name.into(),
            settings,
        }
    }
}
