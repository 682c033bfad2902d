//! Global `context.xml`

use super::names::RESOURCES;
use super::{ConvertContext, ElementConverter};
use crate::attributes::{AttrReader, AttrWriter};
use crate::error::{ConvertError, ConvertResult};
use crate::merge::MergeOutcome;
use catalina_model::{ContextContainer, StaticResourceCache};
use catalina_xml::Element;

/// Operates on the `<Context>` root
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextConverter;

impl ContextConverter {
    fn write_cache(resources: &mut Element, cache: &StaticResourceCache, cx: &ConvertContext<'_>) {
        let defaults = StaticResourceCache::default();
        let mut attrs = AttrWriter::new(resources, cx);
        attrs.value("cachingAllowed", &cache.allowed, &defaults.allowed);
        attrs.value("cacheMaxSize", &cache.max_size, &defaults.max_size);
        attrs.value("cacheTtl", &cache.ttl, &defaults.ttl);
    }
}

impl ElementConverter for ContextConverter {
    type Node = ContextContainer;

    fn read(&self, context: &Element, cx: &ConvertContext<'_>) -> ConvertResult<ContextContainer> {
        let mut container = ContextContainer::default();
        let logger = &mut container.web_application_logger;
        logger.swallow_output = AttrReader::new(context, cx)
            .flag("swallowOutput")
            .unwrap_or(logger.swallow_output);

        if let Some(resources) = context.first_child(RESOURCES) {
            let attrs = AttrReader::new(resources, cx);
            let cache = &mut container.static_resource_cache;
            cache.allowed = attrs.flag("cachingAllowed").unwrap_or(cache.allowed);
            cache.max_size = attrs.parse("cacheMaxSize").unwrap_or(cache.max_size);
            cache.ttl = attrs.parse("cacheTtl").unwrap_or(cache.ttl);
        }
        Ok(container)
    }

    fn write(
        &self,
        context: &mut Element,
        container: &ContextContainer,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<MergeOutcome> {
        AttrWriter::new(context, cx).value(
            "swallowOutput",
            &container.web_application_logger.swallow_output,
            &false,
        );

        let cache = &container.static_resource_cache;
        let (index, outcome) = match context.first_child_index(RESOURCES) {
            Some(index) => (index, MergeOutcome::updated()),
            None if cache.is_default() => return Ok(MergeOutcome::default()),
            None => (context.append_element(Element::new(RESOURCES)), MergeOutcome::created()),
        };
        let resources = context
            .element_at_mut(index)
            .ok_or_else(|| ConvertError::missing_element(RESOURCES, "Context"))?;
        Self::write_cache(resources, cache, cx);
        Ok(outcome)
    }
}
