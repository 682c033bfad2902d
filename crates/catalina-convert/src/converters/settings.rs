//! Whole-tree conversion over the set of managed documents

use super::context::ContextConverter;
use super::datasource::DataSourcesConverter;
use super::general::GeneralConfigConverter;
use super::names::{SERVER, SERVICE};
use super::service::ServiceConverter;
use super::web_defaults::WebDefaultsConverter;
use super::{ConvertContext, ElementConverter};
use crate::error::{ConvertError, ConvertResult};
use crate::merge::{merge, MergeOutcome};
use catalina_model::{ContextContainer, Hierarchical, ServerDefaults, Settings};
use catalina_xml::{Document, XmlResult};

/// Parsed documents one settings tree maps onto
///
/// `server.xml` is mandatory. The global `context.xml` and `web.xml` are
/// optional; without them their part of the tree reads as defaults and is
/// not written.
#[derive(Debug, Clone)]
pub struct DocumentSet {
    pub server: Document,
    pub context: Option<Document>,
    pub web: Option<Document>,
}

impl DocumentSet {
    #[must_use]
    pub fn new(server: Document) -> Self {
        Self {
            server,
            context: None,
            web: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: Document) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn with_web(mut self, web: Document) -> Self {
        self.web = Some(web);
        self
    }

    /// Parse the documents from text
    ///
    /// # Errors
    /// Returns the first document's syntax error.
    pub fn parse(server: &str, context: Option<&str>, web: Option<&str>) -> XmlResult<Self> {
        Ok(Self {
            server: Document::parse(server)?,
            context: context.map(Document::parse).transpose()?,
            web: web.map(Document::parse).transpose()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsConverter;

impl SettingsConverter {
    fn check_root(documents: &DocumentSet) -> ConvertResult<()> {
        let root = documents.server.root().name();
        if root == SERVER {
            Ok(())
        } else {
            Err(ConvertError::missing_element(SERVER, root))
        }
    }

    /// Build a settings tree with bound parent links
    ///
    /// # Errors
    /// Fails on the first structural error of any managed subtree.
    pub fn read(&self, documents: &DocumentSet, cx: &ConvertContext<'_>) -> ConvertResult<Settings> {
        Self::check_root(documents)?;
        let server = documents.server.root();
        let mut settings = Settings::new();
        settings.configuration.general = GeneralConfigConverter.read(server, cx)?;
        if let Some(context) = &documents.context {
            settings.configuration.context = ContextConverter.read(context.root(), cx)?;
        }
        if let Some(web) = &documents.web {
            settings.configuration.defaults = WebDefaultsConverter.read(web.root(), cx)?;
        }
        settings.data_sources = DataSourcesConverter.read(server, cx)?;
        settings.services = server
            .child_elements()
            .filter(|child| child.name() == SERVICE)
            .map(|child| ServiceConverter.read(child, cx))
            .collect::<ConvertResult<_>>()?;
        settings.apply_parent_to_children();

        tracing::debug!(
            services = settings.services.len(),
            data_sources = settings.data_sources.len(),
            "read settings"
        );
        Ok(settings)
    }

    /// Apply a settings tree onto the documents in place
    ///
    /// # Errors
    /// Fails when a live document violates a structural precondition.
    pub fn write(
        &self,
        documents: &mut DocumentSet,
        settings: &Settings,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<MergeOutcome> {
        Self::check_root(documents)?;
        let configuration = &settings.configuration;
        let server = documents.server.root_mut();
        let mut outcome = GeneralConfigConverter.write(server, &configuration.general, cx)?;
        outcome += DataSourcesConverter.write(server, &settings.data_sources, cx)?;
        outcome += merge(&ServiceConverter, server, &settings.services, cx)?;

        match &mut documents.context {
            Some(context) => outcome += ContextConverter.write(context.root_mut(), &configuration.context, cx)?,
            None if configuration.context != ContextContainer::default() => {
                tracing::warn!("context settings differ from defaults but no context.xml was supplied");
            }
            None => {}
        }
        match &mut documents.web {
            Some(web) => outcome += WebDefaultsConverter.write(web.root_mut(), &configuration.defaults, cx)?,
            None if configuration.defaults != ServerDefaults::default() => {
                tracing::warn!("web defaults differ from defaults but no web.xml was supplied");
            }
            None => {}
        }

        tracing::info!(
            updated = outcome.updated,
            created = outcome.created,
            removed = outcome.removed,
            foreign = outcome.foreign,
            "wrote settings"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReconcileOptions;
    use crate::properties::Properties;
    use pretty_assertions::assert_eq;

    #[test]
    fn wrong_root_is_rejected() {
        let (properties, options) = (Properties::new(), ReconcileOptions::default());
        let cx = ConvertContext::new(&properties, &options);
        let documents = DocumentSet::parse("<Context/>", None, None).unwrap();
        assert!(matches!(
            SettingsConverter.read(&documents, &cx),
            Err(ConvertError::ElementNotFound { .. })
        ));
    }

    #[test]
    fn read_binds_parents() {
        let (properties, options) = (Properties::new(), ReconcileOptions::default());
        let cx = ConvertContext::new(&properties, &options);
        let documents = DocumentSet::parse(
            r#"<Server><Service name="Catalina"><Engine name="Catalina" defaultHost="localhost"><Host name="localhost"/></Engine></Service></Server>"#,
            None,
            None,
        )
        .unwrap();
        let settings = SettingsConverter.read(&documents, &cx).unwrap();
        let host = &settings.services[0].engine.hosts[0];
        assert_eq!(host.location(), "services[0].engine.hosts[0]");
        assert!(host.parent().is_some());
        assert_eq!(settings.configuration.defaults, ServerDefaults::default());
    }
}
