//! Derived settings
//!
//! The APR lifecycle listener is never chosen by a caller: it exists exactly
//! while some HTTP connector runs on the APR implementation.

use crate::configuration::AprLifecycleListener;
use crate::settings::Settings;

/// Whether any service has an HTTP connector on the APR implementation
#[must_use]
pub fn requires_apr_listener(settings: &Settings) -> bool {
    settings
        .services
        .iter()
        .flat_map(|s| s.connectors.iter())
        .any(crate::connector::Connector::uses_apr)
}

/// Recompute `configuration.general.apr_lifecycle_listener` from the
/// connector set. An existing listener is kept as is while still needed.
///
/// Returns `true` when the field changed.
pub fn derive_apr_listener(settings: &mut Settings) -> bool {
    let required = requires_apr_listener(settings);
    let slot = &mut settings.configuration.general.apr_lifecycle_listener;
    match (required, slot.is_some()) {
        (true, false) => {
            *slot = Some(AprLifecycleListener::default());
            true
        }
        (false, true) => {
            *slot = None;
            true
        }
        _ => false,
    }
}
