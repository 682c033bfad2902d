//! Catalina settings profiles
//!
//! Persists a [`catalina_model::Settings`] tree as JSON. Every document is
//! checked against a JSON Schema derived from the model, both on the way
//! out and on the way in.
//!
//! # Example
//!
//! ```
//! use catalina_model::{Engine, Host, Service, Settings};
//! use catalina_profile::{Profile, ProfileMarshaller};
//!
//! let settings = Settings::new().with_service(
//!     Service::new("Catalina").with_engine(Engine::new("Catalina").with_host(Host::new("localhost"))),
//! );
//! let marshaller = ProfileMarshaller::new().unwrap();
//! let json = marshaller.to_json(&Profile::new("dev", settings.clone())).unwrap();
//! assert_eq!(marshaller.from_json(&json).unwrap().settings, settings);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod marshaller;
mod profile;

pub use error::{ProfileError, ProfileResult};
pub use marshaller::ProfileMarshaller;
pub use profile::Profile;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
