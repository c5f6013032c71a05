//! Prelude module - commonly used types for convenient import.
//!
//! Use `use schemalog::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust,no_run
//! use schemalog::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Stats {
//!     a: u64,
//! }
//!
//! let schema = Schema::new().define::<Stats>(Level::Debug, "stats");
//! let logger = Logger::builder("my-service").with_schema(schema).build();
//! logger.debug("stats", Stats { a: 123 });
//! ```

// Logger and construction
pub use crate::{Environment, Logger, LoggerBuilder};

// Schema and levels
pub use crate::{Event, Level, Schema, SchemaError};

// Records and error payloads
pub use crate::{ErrorDetails, Record};

// Sinks
pub use crate::{ConsoleSink, Sink, TracingSink};

// Remote ingestion
#[cfg(feature = "axiom")]
pub use crate::{AxiomError, AxiomSink};
