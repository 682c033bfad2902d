//! JDBC data sources declared as global naming resources

use crate::hierarchy::{adopt, leaf_node, Attach, Hierarchical, ParentRef, ParentSlot};
use crate::identity::Identity;
use crate::secret::Secret;
use crate::settings::Settings;
use crate::validation::{ErrorCode, Validate, ValidationContext};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Factory class of the Tomcat JDBC pool
pub const TOMCAT_FACTORY: &str = "org.apache.tomcat.jdbc.pool.DataSourceFactory";
/// Factory class of the bundled DBCP2 pool
pub const DBCP_FACTORY: &str = "org.apache.tomcat.dbcp.dbcp2.BasicDataSourceFactory";

/// `name`, `description`, `auth`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct General {
    pub jndi_name: Option<String>,
    pub description: Option<String>,
    pub auth: Option<String>,
    #[serde(skip)]
    parent: ParentSlot<DataSource>,
}

impl Default for General {
    fn default() -> Self {
        Self {
            jndi_name: None,
            description: None,
            auth: Some("Container".to_owned()),
            parent: ParentSlot::default(),
        }
    }
}

leaf_node!(General, DataSource);

impl Validate for General {
    fn validate(&self, ctx: &mut ValidationContext) {
        ctx.require_text("jndiName", self.jndi_name.as_deref());
        ctx.require_text("auth", self.auth.as_deref());
    }
}

/// Driver and credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Connection {
    pub url: Option<String>,
    pub driver_class_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<Secret>,
    #[serde(skip)]
    parent: ParentSlot<DataSource>,
}

leaf_node!(Connection, DataSource);

impl Validate for Connection {
    fn validate(&self, ctx: &mut ValidationContext) {
        ctx.require_text("url", self.url.as_deref());
        ctx.require_text("driverClassName", self.driver_class_name.as_deref());
    }
}

/// Pool sizing. Defaults depend on the pool implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionPool {
    pub initial_size: i32,
    pub max_active: i32,
    pub max_idle: i32,
    pub min_idle: i32,
    /// Milliseconds
    pub max_wait: i32,
    #[serde(skip)]
    parent: ParentSlot<DataSource>,
}

impl Default for ConnectionPool {
    fn default() -> Self {
        Self::tomcat()
    }
}

impl ConnectionPool {
    /// Tomcat JDBC pool defaults
    #[must_use]
    pub fn tomcat() -> Self {
        Self {
            initial_size: 10,
            max_active: 100,
            max_idle: 100,
            min_idle: 10,
            max_wait: 30000,
            parent: ParentSlot::default(),
        }
    }

    /// DBCP2 defaults; `max_wait` of `-1` waits forever
    #[must_use]
    pub fn dbcp() -> Self {
        Self {
            initial_size: 0,
            max_active: 8,
            max_idle: 8,
            min_idle: 0,
            max_wait: -1,
            parent: ParentSlot::default(),
        }
    }
}

leaf_node!(ConnectionPool, DataSource);

impl Validate for ConnectionPool {
    fn validate(&self, ctx: &mut ValidationContext) {
        ctx.check_min("initialSize", self.initial_size, 0);
        ctx.check_min("maxIdle", self.max_idle, 0);
        ctx.check_min("minIdle", self.min_idle, 0);
        ctx.check_min("maxWait", self.max_wait, -1);
        if self.min_idle > self.max_idle {
            ctx.reject_with(
                "minIdle",
                ErrorCode::Invalid,
                vec![self.min_idle.to_string(), self.max_idle.to_string()],
            );
        }
    }
}

/// Body shared by both pool implementations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct JdbcResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub general: General,
    pub connection: Connection,
    pub pool: ConnectionPool,
    #[serde(skip)]
    parent: ParentSlot<Settings>,
}

impl JdbcResource {
    fn new(jndi_name: &str, url: &str, driver: &str, pool: ConnectionPool) -> Self {
        let mut resource = Self {
            pool,
            ..Self::default()
        };
        resource.general.jndi_name = Some(jndi_name.to_owned());
        resource.connection.url = Some(url.to_owned());
        resource.connection.driver_class_name = Some(driver.to_owned());
        resource
    }
}

/// A `<Resource type="javax.sql.DataSource">`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DataSource {
    Tomcat(JdbcResource),
    Dbcp(JdbcResource),
}

impl DataSource {
    /// Tomcat JDBC pool data source with default sizing
    #[must_use]
    pub fn tomcat(jndi_name: &str, url: &str, driver: &str) -> Self {
        Self::Tomcat(JdbcResource::new(jndi_name, url, driver, ConnectionPool::tomcat()))
    }

    /// DBCP2 data source with default sizing
    #[must_use]
    pub fn dbcp(jndi_name: &str, url: &str, driver: &str) -> Self {
        Self::Dbcp(JdbcResource::new(jndi_name, url, driver, ConnectionPool::dbcp()))
    }

    #[inline]
    #[must_use]
    pub fn resource(&self) -> &JdbcResource {
        match self {
            Self::Tomcat(r) | Self::Dbcp(r) => r,
        }
    }

    #[inline]
    pub fn resource_mut(&mut self) -> &mut JdbcResource {
        match self {
            Self::Tomcat(r) | Self::Dbcp(r) => r,
        }
    }

    /// `factory` attribute value
    #[must_use]
    pub const fn factory(&self) -> &'static str {
        match self {
            Self::Tomcat(_) => TOMCAT_FACTORY,
            Self::Dbcp(_) => DBCP_FACTORY,
        }
    }

    /// Pool attribute carrying `max_active`
    #[must_use]
    pub const fn max_active_attribute(&self) -> &'static str {
        match self {
            Self::Tomcat(_) => "maxActive",
            Self::Dbcp(_) => "maxTotal",
        }
    }

    /// Pool attribute carrying `max_wait`
    #[must_use]
    pub const fn max_wait_attribute(&self) -> &'static str {
        match self {
            Self::Tomcat(_) => "maxWait",
            Self::Dbcp(_) => "maxWaitMillis",
        }
    }

    /// Default pool of this implementation
    #[must_use]
    pub fn default_pool(&self) -> ConnectionPool {
        match self {
            Self::Tomcat(_) => ConnectionPool::tomcat(),
            Self::Dbcp(_) => ConnectionPool::dbcp(),
        }
    }
}

impl Identity for DataSource {
    fn machine_id(&self) -> Option<&str> {
        self.resource().id.as_deref()
    }

    fn set_machine_id(&mut self, id: Option<String>) {
        self.resource_mut().id = id;
    }

    fn human_id(&self) -> String {
        self.identity_key()
    }

    fn identity_key(&self) -> String {
        self.resource().general.jndi_name.clone().unwrap_or_default()
    }
}

impl Hierarchical for DataSource {
    type Parent = Settings;

    fn parent(&self) -> Option<&ParentRef<Settings>> {
        self.resource().parent.get()
    }

    fn location(&self) -> &str {
        self.resource().parent.location()
    }

    fn apply_parent_to_children(&mut self) {
        let resource = self.resource_mut();
        let path = resource.parent.location().to_owned();
        let id = resource.id.clone();
        let me = || ParentRef::new(path.as_str(), id.as_deref());
        adopt(&mut resource.general, me(), "general");
        adopt(&mut resource.connection, me(), "connection");
        adopt(&mut resource.pool, me(), "pool");
    }
}

impl Attach for DataSource {
    fn slot_mut(&mut self) -> &mut ParentSlot<Settings> {
        &mut self.resource_mut().parent
    }
}

impl Validate for DataSource {
    fn validate(&self, ctx: &mut ValidationContext) {
        let resource = self.resource();
        ctx.validate_child("general", &resource.general);
        ctx.validate_child("connection", &resource.connection);
        ctx.nested("pool", |ctx| {
            resource.pool.validate(ctx);
            let max_active = resource.pool.max_active;
            match self {
                Self::Tomcat(_) => ctx.check_min("maxActive", max_active, 1),
                Self::Dbcp(_) if max_active == 0 => {
                    ctx.reject_with("maxActive", ErrorCode::Range, vec![max_active.to_string()]);
                }
                Self::Dbcp(_) => {}
            }
        });
    }
}
