//! Root of the settings tree

use crate::configuration::Configuration;
use crate::datasource::DataSource;
use crate::hierarchy::{adopt, indexed, Hierarchical, ParentRef};
use crate::identity::Identity;
use crate::service::Service;
use crate::validation::{Validate, ValidationContext};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// Complete server configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub configuration: Configuration,
    pub data_sources: Vec<DataSource>,
    pub services: Vec<Service>,
    /// Id assigned by an external inventory; never written to a document
    pub external_id: Option<String>,
}

impl Settings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }

    #[must_use]
    pub fn with_data_source(mut self, data_source: DataSource) -> Self {
        self.data_sources.push(data_source);
        self
    }

    /// Service by name
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name.as_deref() == Some(name))
    }

    /// Service by name, mutably
    pub fn service_mut(&mut self, name: &str) -> Option<&mut Service> {
        self.services.iter_mut().find(|s| s.name.as_deref() == Some(name))
    }

    /// Data source by JNDI name
    #[must_use]
    pub fn data_source(&self, jndi_name: &str) -> Option<&DataSource> {
        self.data_sources.iter().find(|d| d.identity_key() == jndi_name)
    }
}

impl Hierarchical for Settings {
    type Parent = Infallible;

    fn parent(&self) -> Option<&ParentRef<Infallible>> {
        None
    }

    fn location(&self) -> &str {
        ""
    }

    fn apply_parent_to_children(&mut self) {
        adopt(&mut self.configuration, ParentRef::new("", None), "configuration");
        for (index, source) in self.data_sources.iter_mut().enumerate() {
            adopt(source, ParentRef::new("", None), &indexed("dataSources", index));
        }
        for (index, service) in self.services.iter_mut().enumerate() {
            adopt(service, ParentRef::new("", None), &indexed("services", index));
        }
    }
}

impl Validate for Settings {
    fn validate(&self, ctx: &mut ValidationContext) {
        ctx.validate_child("configuration", &self.configuration);
        ctx.validate_each("dataSources", &self.data_sources);
        ctx.check_unique("dataSources", "general.jndiName", &self.data_sources, |d| {
            d.resource().general.jndi_name.clone()
        });
        ctx.validate_each("services", &self.services);
        ctx.check_unique("services", "name", &self.services, |s| s.name.clone());
    }
}
