//! Access log valve of an `<Engine>` or `<Host>`

use super::names::{ACCESS_LOG_VALVE_CLASS, VALVE};
use super::singleton::{element_by_class, sync_singleton, Placement};
use super::{ConvertContext, ElementConverter};
use crate::attributes::{AttrReader, AttrWriter};
use crate::error::ConvertResult;
use crate::merge::MergeOutcome;
use catalina_model::{Logging, LoggingScope};
use catalina_xml::Element;
use std::marker::PhantomData;

/// Operates on the element owning the valve
#[derive(Debug, Clone, Copy)]
pub struct AccessLogConverter<S> {
    scope: PhantomData<S>,
}

impl<S> AccessLogConverter<S> {
    #[must_use]
    pub const fn new() -> Self {
        Self { scope: PhantomData }
    }
}

impl<S> Default for AccessLogConverter<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: LoggingScope> ElementConverter for AccessLogConverter<S> {
    type Node = Logging<S>;

    fn read(&self, owner: &Element, cx: &ConvertContext<'_>) -> ConvertResult<Logging<S>> {
        let mut logging = Logging::<S>::default();
        let Some(valve) = element_by_class(owner, VALVE, ACCESS_LOG_VALVE_CLASS) else {
            return Ok(logging);
        };
        let attrs = AttrReader::new(valve, cx);
        logging.enabled = true;
        for (name, field) in [
            ("directory", &mut logging.directory),
            ("pattern", &mut logging.pattern),
            ("prefix", &mut logging.prefix),
            ("suffix", &mut logging.suffix),
        ] {
            if let Some(value) = attrs.string(name) {
                *field = value;
            }
        }
        logging.file_date_format = attrs.string("fileDateFormat");
        Ok(logging)
    }

    fn write(
        &self,
        owner: &mut Element,
        logging: &Logging<S>,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<MergeOutcome> {
        sync_singleton(
            owner,
            VALVE,
            ACCESS_LOG_VALVE_CLASS,
            logging.enabled,
            Placement::Append,
            |valve| {
                let mut attrs = AttrWriter::new(valve, cx);
                attrs.text("directory", Some(logging.directory.as_str()));
                attrs.text("prefix", Some(logging.prefix.as_str()));
                attrs.text("suffix", Some(logging.suffix.as_str()));
                attrs.text("pattern", Some(logging.pattern.as_str()));
                attrs.text("fileDateFormat", logging.file_date_format.as_deref());
                Ok(())
            },
        )
    }
}
