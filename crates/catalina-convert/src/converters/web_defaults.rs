//! Global `web.xml` session and welcome file defaults

use super::names::{SESSION_CONFIG, SESSION_TIMEOUT, WELCOME_FILE, WELCOME_FILE_LIST};
use super::{ConvertContext, ElementConverter};
use crate::error::{ConvertError, ConvertResult};
use crate::merge::MergeOutcome;
use catalina_model::ServerDefaults;
use catalina_xml::Element;

/// Operates on the `<web-app>` root
#[derive(Debug, Clone, Copy, Default)]
pub struct WebDefaultsConverter;

impl WebDefaultsConverter {
    fn text_of(element: &Element, cx: &ConvertContext<'_>) -> String {
        cx.properties.resolve(element.text().trim()).trim().to_owned()
    }

    fn session_timeout(web_app: &Element, cx: &ConvertContext<'_>) -> Option<i32> {
        let timeout = web_app.first_child(SESSION_CONFIG)?.first_child(SESSION_TIMEOUT)?;
        let text = Self::text_of(timeout, cx);
        match text.parse() {
            Ok(minutes) => Some(minutes),
            Err(_) => {
                tracing::warn!(value = %text, "ignoring malformed session timeout, keeping default");
                None
            }
        }
    }

    fn welcome_files(web_app: &Element, cx: &ConvertContext<'_>) -> Option<Vec<String>> {
        let list = web_app.first_child(WELCOME_FILE_LIST)?;
        Some(
            list.child_elements()
                .filter(|child| child.name() == WELCOME_FILE)
                .map(|child| Self::text_of(child, cx))
                .collect(),
        )
    }

    fn write_session(web_app: &mut Element, minutes: i32, cx: &ConvertContext<'_>) -> ConvertResult<MergeOutcome> {
        if Self::session_timeout(web_app, cx) == Some(minutes) {
            return Ok(MergeOutcome::default());
        }
        let default = minutes == ServerDefaults::default().session_timeout;
        let (config_index, mut outcome) = match web_app.first_child_index(SESSION_CONFIG) {
            Some(index) => (index, MergeOutcome::default()),
            None if default => return Ok(MergeOutcome::default()),
            None => (web_app.append_element(Element::new(SESSION_CONFIG)), MergeOutcome::created()),
        };
        let config = web_app
            .element_at_mut(config_index)
            .ok_or_else(|| ConvertError::missing_element(SESSION_CONFIG, "web-app"))?;
        let timeout = match config.first_child_index(SESSION_TIMEOUT) {
            Some(index) => {
                outcome.updated += 1;
                index
            }
            None if default => return Ok(outcome),
            None => {
                outcome.created += 1;
                config.append_element(Element::new(SESSION_TIMEOUT))
            }
        };
        if let Some(timeout) = config.element_at_mut(timeout) {
            timeout.set_text(minutes.to_string());
        }
        Ok(outcome)
    }

    fn write_welcome_files(web_app: &mut Element, files: &[String], cx: &ConvertContext<'_>) -> ConvertResult<MergeOutcome> {
        let live = Self::welcome_files(web_app, cx);
        if live.as_deref() == Some(files) {
            return Ok(MergeOutcome::default());
        }
        let (index, mut outcome) = match web_app.first_child_index(WELCOME_FILE_LIST) {
            Some(index) => (index, MergeOutcome::updated()),
            None if files == ServerDefaults::default().welcome_files.as_slice() => {
                return Ok(MergeOutcome::default());
            }
            None => (
                web_app.append_element(Element::new(WELCOME_FILE_LIST)),
                MergeOutcome::created(),
            ),
        };
        let list = web_app
            .element_at_mut(index)
            .ok_or_else(|| ConvertError::missing_element(WELCOME_FILE_LIST, "web-app"))?;
        let entries = list.element_indices(WELCOME_FILE);
        for (&index, file) in entries.iter().zip(files) {
            if let Some(entry) = list.element_at_mut(index) {
                if entry.text().trim() != file {
                    entry.set_text(file.as_str());
                }
            }
        }
        for &stale in entries.iter().skip(files.len()).rev() {
            list.detach_element(stale);
            outcome.removed += 1;
        }
        for file in files.iter().skip(entries.len()) {
            let mut entry = Element::new(WELCOME_FILE);
            entry.set_text(file.as_str());
            list.append_element(entry);
            outcome.created += 1;
        }
        Ok(outcome)
    }
}

impl ElementConverter for WebDefaultsConverter {
    type Node = ServerDefaults;

    fn read(&self, web_app: &Element, cx: &ConvertContext<'_>) -> ConvertResult<ServerDefaults> {
        let mut defaults = ServerDefaults::default();
        if let Some(minutes) = Self::session_timeout(web_app, cx) {
            defaults.session_timeout = minutes;
        }
        if let Some(files) = Self::welcome_files(web_app, cx) {
            defaults.welcome_files = files;
        }
        Ok(defaults)
    }

    fn write(
        &self,
        web_app: &mut Element,
        defaults: &ServerDefaults,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<MergeOutcome> {
        let mut outcome = Self::write_session(web_app, defaults.session_timeout, cx)?;
        outcome += Self::write_welcome_files(web_app, &defaults.welcome_files, cx)?;
        Ok(outcome)
    }
}
