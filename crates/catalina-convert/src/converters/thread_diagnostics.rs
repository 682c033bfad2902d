//! Stuck thread detection valve of an `<Engine>`

use super::names::{STUCK_THREAD_VALVE_CLASS, VALVE};
use super::singleton::{element_by_class, sync_singleton, Placement};
use super::{ConvertContext, ElementConverter};
use crate::attributes::{AttrReader, AttrWriter};
use crate::error::ConvertResult;
use crate::merge::MergeOutcome;
use catalina_model::ThreadDiagnostics;
use catalina_xml::Element;

/// Operates on the `<Engine>` element
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDiagnosticsConverter;

impl ElementConverter for ThreadDiagnosticsConverter {
    type Node = ThreadDiagnostics;

    fn read(&self, engine: &Element, cx: &ConvertContext<'_>) -> ConvertResult<ThreadDiagnostics> {
        let mut diagnostics = ThreadDiagnostics::default();
        if let Some(valve) = element_by_class(engine, VALVE, STUCK_THREAD_VALVE_CLASS) {
            let attrs = AttrReader::new(valve, cx);
            diagnostics.enabled = true;
            diagnostics.threshold = attrs.parse("threshold").unwrap_or(diagnostics.threshold);
            diagnostics.history = attrs.parse("history").unwrap_or(diagnostics.history);
        }
        Ok(diagnostics)
    }

    fn write(
        &self,
        engine: &mut Element,
        diagnostics: &ThreadDiagnostics,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<MergeOutcome> {
        let defaults = ThreadDiagnostics::default();
        sync_singleton(
            engine,
            VALVE,
            STUCK_THREAD_VALVE_CLASS,
            diagnostics.enabled,
            Placement::Append,
            |valve| {
                let mut attrs = AttrWriter::new(valve, cx);
                attrs.value("threshold", &diagnostics.threshold, &defaults.threshold);
                attrs.value("history", &diagnostics.history, &defaults.history);
                Ok(())
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReconcileOptions;
    use crate::properties::Properties;

    #[test]
    fn write_then_read() {
        let (properties, options) = (Properties::new(), ReconcileOptions::default());
        let cx = ConvertContext::new(&properties, &options);
        let mut engine = Element::new("Engine");
        let desired = ThreadDiagnostics::enabled(120);
        ThreadDiagnosticsConverter.write(&mut engine, &desired, &cx).unwrap();
        let valve = engine.first_child("Valve").unwrap();
        assert_eq!(valve.attribute("threshold"), Some("120"));
        assert!(!valve.has_attribute("history"));
        assert_eq!(ThreadDiagnosticsConverter.read(&engine, &cx).unwrap(), desired);

        ThreadDiagnosticsConverter
            .write(&mut engine, &ThreadDiagnostics::default(), &cx)
            .unwrap();
        assert!(engine.first_child("Valve").is_none());
    }
}
