//! Schemalog - schema-validated structured logging with typed message keys.
//!
//! This crate provides:
//! - A per-level, per-message-key metadata schema, declared with ordinary
//!   serde types
//! - Logging methods that validate metadata against the schema and fall
//!   back to a stringified payload on mismatch
//! - Sink wiring from the environment: console, the `tracing` ecosystem,
//!   and remote ingestion
//!
//! # Example
//!
//! ```rust,no_run
//! use schemalog::{Level, Logger, Schema};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Stats {
//!     a: u64,
//!     b: Option<u64>,
//! }
//!
//! let schema = Schema::new().define::<Stats>(Level::Debug, "stats");
//!
//! let logger = Logger::builder("my-service").with_schema(schema).build();
//!
//! // Validated against `Stats` before it reaches any sink.
//! logger.debug("stats", Stats { a: 123, b: None });
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod commit;
mod error;
mod level;
mod logger;
mod record;
mod schema;
mod sink;

#[cfg(feature = "axiom")]
mod axiom;

#[cfg(feature = "axiom")]
pub use axiom::{AxiomError, AxiomSink};
pub use commit::commit_hash;
pub use error::SchemaError;
pub use level::Level;
pub use logger::{Environment, Event, Logger, LoggerBuilder};
pub use record::{ErrorDetails, Record};
pub use schema::Schema;
pub use sink::{ConsoleSink, Sink, TracingSink};
