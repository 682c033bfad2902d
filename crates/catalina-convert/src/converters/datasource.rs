//! JDBC `<Resource>` elements under `<GlobalNamingResources>`
//!
//! A resource is owned when its `type` is `javax.sql.DataSource`. The
//! `factory` attribute selects the pool implementation: the Tomcat JDBC pool
//! factory maps to [`DataSource::Tomcat`], an absent factory or the DBCP2
//! factory to [`DataSource::Dbcp`].

use super::names::{DATA_SOURCE_TYPE, GLOBAL_NAMING_RESOURCES, LISTENER, RESOURCE, SERVICE};
use super::singleton::Placement;
use super::{ConvertContext, ElementConverter};
use crate::attributes::{AttrReader, AttrWriter};
use crate::error::{ConvertError, ConvertResult};
use crate::merge::{merge, MergeOutcome, MergeTarget};
use crate::options::WritePolicy;
use catalina_model::{DataSource, Identity, JdbcResource, DBCP_FACTORY, TOMCAT_FACTORY};
use catalina_xml::Element;

/// Pool attribute names of both variants
const TOMCAT_POOL: [&str; 2] = ["maxActive", "maxWait"];
const DBCP_POOL: [&str; 2] = ["maxTotal", "maxWaitMillis"];

#[derive(Debug, Clone, Copy, Default)]
pub struct DataSourceConverter;

impl DataSourceConverter {
    fn is_tomcat(element: &Element, cx: &ConvertContext<'_>) -> bool {
        AttrReader::new(element, cx).string("factory").as_deref() == Some(TOMCAT_FACTORY)
    }
}

impl ElementConverter for DataSourceConverter {
    type Node = DataSource;

    fn read(&self, element: &Element, cx: &ConvertContext<'_>) -> ConvertResult<DataSource> {
        let attrs = AttrReader::new(element, cx);
        let name = attrs.required("name")?;
        let mut source = if Self::is_tomcat(element, cx) {
            DataSource::Tomcat(JdbcResource::default())
        } else {
            DataSource::Dbcp(JdbcResource::default())
        };
        let pool = source.default_pool();
        let (max_active, max_wait) = (source.max_active_attribute(), source.max_wait_attribute());

        let resource = source.resource_mut();
        resource.general.jndi_name = Some(name);
        resource.general.description = attrs.string("description");
        resource.general.auth = attrs.string("auth").or(resource.general.auth.take());
        resource.connection.url = attrs.string("url");
        resource.connection.driver_class_name = attrs.string("driverClassName");
        resource.connection.username = attrs.string("username");
        resource.connection.password = attrs.secret("password");
        resource.pool.initial_size = attrs.parse("initialSize").unwrap_or(pool.initial_size);
        resource.pool.max_active = attrs.parse(max_active).unwrap_or(pool.max_active);
        resource.pool.max_idle = attrs.parse("maxIdle").unwrap_or(pool.max_idle);
        resource.pool.min_idle = attrs.parse("minIdle").unwrap_or(pool.min_idle);
        resource.pool.max_wait = attrs.parse(max_wait).unwrap_or(pool.max_wait);
        Ok(source)
    }

    fn write(
        &self,
        element: &mut Element,
        source: &DataSource,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<MergeOutcome> {
        let live_tomcat = Self::is_tomcat(element, cx);
        let preserve = WritePolicy::PreserveExpression;
        let resource = source.resource();
        let defaults = source.default_pool();

        let mut attrs = AttrWriter::new(element, cx);
        match source {
            DataSource::Tomcat(_) if !live_tomcat => {
                attrs.force("factory", TOMCAT_FACTORY);
                attrs.remove(&DBCP_POOL);
            }
            DataSource::Dbcp(_) if live_tomcat => {
                attrs.force("factory", DBCP_FACTORY);
                attrs.remove(&TOMCAT_POOL);
            }
            _ => {}
        }

        attrs.text_with("name", resource.general.jndi_name.as_deref(), preserve);
        attrs.text("description", resource.general.description.as_deref());
        attrs.text("auth", resource.general.auth.as_deref());
        attrs.text_with("url", resource.connection.url.as_deref(), preserve);
        attrs.text("driverClassName", resource.connection.driver_class_name.as_deref());
        attrs.text_with("username", resource.connection.username.as_deref(), preserve);
        attrs.secret("password", resource.connection.password.as_ref());

        let pool = &resource.pool;
        attrs.value("initialSize", &pool.initial_size, &defaults.initial_size);
        attrs.value(source.max_active_attribute(), &pool.max_active, &defaults.max_active);
        attrs.value("maxIdle", &pool.max_idle, &defaults.max_idle);
        attrs.value("minIdle", &pool.min_idle, &defaults.min_idle);
        attrs.value(source.max_wait_attribute(), &pool.max_wait, &defaults.max_wait);
        Ok(MergeOutcome::default())
    }
}

impl MergeTarget for DataSourceConverter {
    type Item = DataSource;

    fn tag(&self) -> &'static str {
        RESOURCE
    }

    fn item_key(&self, item: &DataSource) -> String {
        item.identity_key()
    }

    fn element_key(&self, element: &Element, cx: &ConvertContext<'_>) -> String {
        AttrReader::new(element, cx).string("name").unwrap_or_default()
    }

    fn is_owned(&self, element: &Element, cx: &ConvertContext<'_>) -> bool {
        AttrReader::new(element, cx).string("type").as_deref() == Some(DATA_SOURCE_TYPE)
    }

    fn create(&self, item: &DataSource, _cx: &ConvertContext<'_>) -> Element {
        let element = Element::new(RESOURCE).with_attribute("type", DATA_SOURCE_TYPE);
        match item {
            DataSource::Tomcat(_) => element.with_attribute("factory", TOMCAT_FACTORY),
            DataSource::Dbcp(_) => element,
        }
    }

    fn update(
        &self,
        element: &mut Element,
        item: &DataSource,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<MergeOutcome> {
        self.write(element, item, cx)
    }
}

/// Operates on `<Server>`, managing the data sources of its
/// `<GlobalNamingResources>`
#[derive(Debug, Clone, Copy, Default)]
pub struct DataSourcesConverter;

impl DataSourcesConverter {
    const PLACEMENT: Placement = Placement::AfterLast {
        tag: LISTENER,
        anchor: SERVICE,
    };
}

impl ElementConverter for DataSourcesConverter {
    type Node = Vec<DataSource>;

    fn read(&self, server: &Element, cx: &ConvertContext<'_>) -> ConvertResult<Vec<DataSource>> {
        let Some(resources) = server.first_child(GLOBAL_NAMING_RESOURCES) else {
            return Ok(Vec::new());
        };
        resources
            .child_elements()
            .filter(|child| child.name() == RESOURCE && DataSourceConverter.is_owned(child, cx))
            .map(|child| DataSourceConverter.read(child, cx))
            .collect()
    }

    fn write(
        &self,
        server: &mut Element,
        sources: &Vec<DataSource>,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<MergeOutcome> {
        let mut outcome = MergeOutcome::default();
        let index = match server.first_child_index(GLOBAL_NAMING_RESOURCES) {
            Some(index) => index,
            None if sources.is_empty() => return Ok(outcome),
            None => {
                outcome.created += 1;
                tracing::debug!("created global naming resources");
                Self::PLACEMENT.insert(server, Element::new(GLOBAL_NAMING_RESOURCES))
            }
        };
        let resources = server
            .element_at_mut(index)
            .ok_or_else(|| ConvertError::missing_element(GLOBAL_NAMING_RESOURCES, "Server"))?;
        outcome += merge(&DataSourceConverter, resources, sources, cx)?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReconcileOptions;
    use crate::properties::Properties;
    use catalina_xml::Document;
    use pretty_assertions::assert_eq;

    const URL: &str = "jdbc:postgresql://db/app";
    const DRIVER: &str = "org.postgresql.Driver";

    const SERVER: &str = r#"<Server port="8005" shutdown="SHUTDOWN">
  <Listener className="org.apache.catalina.core.JreMemoryLeakPreventionListener"/>
  <GlobalNamingResources>
    <Resource name="UserDatabase" auth="Container" type="org.apache.catalina.UserDatabase"/>
    <Resource name="jdbc/app" auth="Container" type="javax.sql.DataSource" url="jdbc:postgresql://db/app" driverClassName="org.postgresql.Driver" maxTotal="20" maxWaitMillis="lots"/>
  </GlobalNamingResources>
  <Service name="Catalina"/>
</Server>"#;

    fn cx_parts() -> (Properties, ReconcileOptions) {
        (Properties::new(), ReconcileOptions::default())
    }

    #[test]
    fn absent_factory_reads_as_dbcp() {
        let (properties, options) = cx_parts();
        let cx = ConvertContext::new(&properties, &options);
        let doc = Document::parse(SERVER).unwrap();
        let sources = DataSourcesConverter.read(doc.root(), &cx).unwrap();
        assert_eq!(sources.len(), 1);
        let DataSource::Dbcp(resource) = &sources[0] else {
            panic!("expected dbcp data source");
        };
        assert_eq!(resource.pool.max_active, 20);
        assert_eq!(resource.pool.max_wait, -1);
        assert_eq!(resource.general.auth.as_deref(), Some("Container"));
    }

    #[test]
    fn absent_auth_keeps_container_default() {
        let (properties, options) = cx_parts();
        let cx = ConvertContext::new(&properties, &options);
        let element = Element::new("Resource")
            .with_attribute("name", "jdbc/a")
            .with_attribute("type", "javax.sql.DataSource")
            .with_attribute("url", "u")
            .with_attribute("driverClassName", "d");
        let source = DataSourceConverter.read(&element, &cx).unwrap();
        assert_eq!(source.resource().general.auth.as_deref(), Some("Container"));
    }

    #[test]
    fn switching_to_tomcat_renames_pool_attributes() {
        let (properties, options) = cx_parts();
        let cx = ConvertContext::new(&properties, &options);
        let mut doc = Document::parse(SERVER).unwrap();
        let mut source = DataSource::tomcat("jdbc/app", URL, DRIVER);
        source.resource_mut().pool.max_active = 20;
        let outcome = DataSourcesConverter.write(doc.root_mut(), &vec![source.clone()], &cx).unwrap();
        assert_eq!((outcome.updated, outcome.foreign), (1, 1));

        let resources = doc.root().first_child("GlobalNamingResources").unwrap();
        let written = resources.element_at(resources.element_indices("Resource")[1]).unwrap();
        assert_eq!(written.attribute("factory"), Some(TOMCAT_FACTORY));
        assert_eq!(written.attribute("maxActive"), Some("20"));
        assert!(!written.has_attribute("maxTotal"));
        assert!(!written.has_attribute("maxWaitMillis"));
        assert_eq!(DataSourcesConverter.read(doc.root(), &cx).unwrap(), vec![source]);
    }

    #[test]
    fn naming_resources_created_after_listeners() {
        let (properties, options) = cx_parts();
        let cx = ConvertContext::new(&properties, &options);
        let mut doc = Document::parse(
            "<Server>\n  <Listener className=\"a\"/>\n  <Service name=\"Catalina\"/>\n</Server>",
        )
        .unwrap();
        let sources = vec![DataSource::dbcp("jdbc/app", URL, DRIVER)];
        let outcome = DataSourcesConverter.write(doc.root_mut(), &sources, &cx).unwrap();
        assert_eq!(outcome.created, 2);
        let order: Vec<&str> = doc.root().child_elements().map(Element::name).collect();
        assert_eq!(order, ["Listener", "GlobalNamingResources", "Service"]);
        assert_eq!(DataSourcesConverter.read(doc.root(), &cx).unwrap(), sources);
    }

    #[test]
    fn no_sources_leaves_server_alone() {
        let (properties, options) = cx_parts();
        let cx = ConvertContext::new(&properties, &options);
        let mut doc = Document::parse("<Server>\n  <Service name=\"Catalina\"/>\n</Server>").unwrap();
        let outcome = DataSourcesConverter.write(doc.root_mut(), &Vec::new(), &cx).unwrap();
        assert_eq!(outcome, MergeOutcome::default());
        assert!(doc.root().first_child("GlobalNamingResources").is_none());
    }
}
