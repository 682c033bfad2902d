//! Catalina instance lifecycle primitives
//!
//! Everything needed to drive an instance from the outside, without
//! spawning anything itself:
//!
//! # Core Concepts
//!
//! - **State detection**: [`detect_state`] classifies an instance from a
//!   [`ProcessTable`] snapshot; [`wait_for_state`] polls it to a deadline.
//! - **Command translation**: [`CommandConverter`] wraps commands in `sudo`
//!   or `su` when the agent and instance owner differ.
//! - **Stopping**: [`stop_with_escalation`] walks stop command, terminate
//!   and kill through a [`ControlRunner`].
//!
//! # Example
//!
//! ```
//! use catalina_lifecycle::{detect_state, InstanceState, ProcessInfo, ProcessQuery};
//!
//! let table = vec![ProcessInfo::new(
//!     4242,
//!     "tomcat",
//!     "java -Dcatalina.base=/srv/app org.apache.catalina.startup.Bootstrap start",
//! )];
//! let query = ProcessQuery::new("/srv/app");
//! assert_eq!(detect_state(&table, &query), InstanceState::Started);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod command;
mod control;
mod error;
mod state;

pub use command::{CommandConverter, CommandLine};
pub use control::{stop_with_escalation, ControlOutcome, ControlRunner, StopStep};
pub use error::{LifecycleError, LifecycleResult};
pub use state::{detect_state, wait_for_state, InstanceState, ProcessInfo, ProcessQuery, ProcessTable};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
