//! Identity of collection members

/// Capability of nodes that live in an identity-keyed collection
/// (services, hosts, connectors, data sources).
pub trait Identity {
    /// Explicitly assigned lookup id, `None` until a caller sets one
    fn machine_id(&self) -> Option<&str>;

    /// Assign or clear the machine id
    fn set_machine_id(&mut self, id: Option<String>);

    /// Display id derived from domain fields. Not URL-safe.
    fn human_id(&self) -> String;

    /// Key used to match the node against document elements and siblings
    fn identity_key(&self) -> String;
}

/// Build the `address:port` key shared by connectors and their elements
#[must_use]
pub fn connector_key(address: Option<&str>, port: Option<&str>) -> String {
    format!("{}:{}", address.unwrap_or_default(), port.unwrap_or_default())
}
