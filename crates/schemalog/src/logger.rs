//! The typed logger: construction, sink wiring, and the validate-or-fallback
//! logging path.

use serde::Serialize;
use serde_json::{Value, json};

use crate::commit::commit_hash;
use crate::sink::ConsoleSink;
use crate::{Level, Record, Schema, Sink};

/// Environment snapshot that drives sink wiring.
///
/// Read once at construction. An explicit struct so wiring decisions can be
/// exercised without mutating the process environment.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// `APP_ENV`; `test` silences the logger.
    pub app_env: Option<String>,
    /// `AXIOM_TOKEN`; the remote sink is added when present.
    pub axiom_token: Option<String>,
    /// `TRANSPORTS`; comma-separated sink names forced on.
    pub transports: Option<String>,
}

impl Environment {
    /// Snapshot the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            app_env: std::env::var("APP_ENV").ok(),
            axiom_token: std::env::var("AXIOM_TOKEN").ok(),
            transports: std::env::var("TRANSPORTS").ok(),
        }
    }

    fn is_test(&self) -> bool {
        self.app_env.as_deref() == Some("test")
    }

    fn wants_transport(&self, name: &str) -> bool {
        self.transports.as_deref().is_some_and(|transports| {
            transports
                .split(',')
                .any(|part| part.trim().eq_ignore_ascii_case(name))
        })
    }
}

/// A log message whose level, key and metadata shape are fixed at compile
/// time.
///
/// Emitting through [`Logger::event`] gives the level → key → shape mapping
/// a compile-time guarantee; the payload still passes through any runtime
/// schema declared for the same key.
pub trait Event: Serialize {
    /// Message key.
    const KEY: &'static str;
    /// Severity the key is logged at.
    const LEVEL: Level;
}

/// Builder for [`Logger`].
pub struct LoggerBuilder {
    service: String,
    name: String,
    schema: Schema,
    sinks: Vec<Box<dyn Sink>>,
    environment: Option<Environment>,
    silent: Option<bool>,
}

impl LoggerBuilder {
    fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            name: env!("CARGO_PKG_NAME").to_owned(),
            schema: Schema::new(),
            sinks: Vec::new(),
            environment: None,
            silent: None,
        }
    }

    /// Set the application name attached to every record.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Declare the metadata schema.
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Add a sink ahead of the environment-wired ones.
    #[must_use]
    pub fn with_sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Use an explicit environment snapshot instead of the process one.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Force emission on or off, overriding the test-environment default.
    #[must_use]
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = Some(silent);
        self
    }

    /// Wire sinks from the environment and finish the logger.
    #[must_use]
    pub fn build(self) -> Logger {
        let environment = self.environment.unwrap_or_else(Environment::from_env);
        let mut sinks = self.sinks;

        // Emission is suppressed during test runs so the methods stay
        // callable without polluting test output.
        let silent = self.silent.unwrap_or_else(|| environment.is_test());

        // Remote ingestion joins only when a token is present.
        #[cfg(feature = "axiom")]
        if let Some(token) = environment.axiom_token.as_deref() {
            sinks.push(Box::new(crate::axiom::AxiomSink::new(token)));
        }

        // Console joins unless this is a test run that already has a sink,
        // or it is forced on via TRANSPORTS.
        if !environment.is_test() || sinks.is_empty() || environment.wants_transport("console") {
            sinks.push(Box::new(ConsoleSink::new()));
        }

        Logger {
            service: self.service,
            name: self.name,
            silent,
            schema: self.schema,
            sinks,
        }
    }
}

/// A typed, schema-validating logger.
///
/// Construct once, call methods: each logging call validates its metadata
/// against the declared schema and forwards the finished record to every
/// sink. Metadata that does not match its declared shape, and metadata for
/// keys with no declared shape, is stringified into a `{ data, error }`
/// fallback payload instead of reaching the sinks as loose keys.
pub struct Logger {
    service: String,
    name: String,
    silent: bool,
    schema: Schema,
    sinks: Vec<Box<dyn Sink>>,
}

impl Logger {
    /// Start building a logger for `service`.
    #[must_use]
    pub fn builder(service: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(service)
    }

    /// Logger with no schema and environment-wired sinks.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self::builder(service).build()
    }

    /// Whether emission is suppressed.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// Log at debug.
    pub fn debug<M: Serialize>(&self, message: &str, meta: M) {
        self.log(Level::Debug, message, meta);
    }

    /// Log at info.
    pub fn info<M: Serialize>(&self, message: &str, meta: M) {
        self.log(Level::Info, message, meta);
    }

    /// Log at warn.
    pub fn warn<M: Serialize>(&self, message: &str, meta: M) {
        self.log(Level::Warn, message, meta);
    }

    /// Log at error.
    pub fn error<M: Serialize>(&self, message: &str, meta: M) {
        self.log(Level::Error, message, meta);
    }

    /// Log an error with its causal chain captured as the `error` field.
    pub fn error_with(&self, message: &str, error: &(dyn std::error::Error + 'static)) {
        self.log(
            Level::Error,
            message,
            json!({ "error": crate::ErrorDetails::from_error(error) }),
        );
    }

    /// Log a typed event at its declared level and key.
    ///
    /// A runtime schema declared for the same key still applies; without
    /// one the payload is forwarded as-is, since its shape is already
    /// fixed by the event type.
    pub fn event<E: Event>(&self, event: &E) {
        let Some(raw) = self.serialize_or_dispatch(E::LEVEL, E::KEY, event) else {
            return;
        };
        let meta = match self.schema.validate(E::LEVEL, E::KEY, &raw) {
            Some(Ok(validated)) => validated,
            Some(Err(err)) => json!({ "data": raw.to_string(), "error": err.to_string() }),
            None => raw,
        };
        self.dispatch(E::LEVEL, E::KEY, meta);
    }

    /// Flush every sink.
    pub fn flush(&self) {
        for sink in &self.sinks {
            sink.flush();
        }
    }

    fn log<M: Serialize>(&self, level: Level, message: &str, meta: M) {
        let Some(raw) = self.serialize_or_dispatch(level, message, meta) else {
            return;
        };

        // Validate against the declared shape. Mismatches fall back to a
        // stringified payload, and so do keys with no declared shape: only
        // declared fields reach the sinks as individual keys, which keeps
        // the key count bounded downstream.
        let meta = match self.schema.validate(level, message, &raw) {
            Some(Ok(validated)) => validated,
            Some(Err(err)) => json!({ "data": raw.to_string(), "error": err.to_string() }),
            None if raw.is_null() => Value::Null,
            None => json!({ "data": raw.to_string() }),
        };
        self.dispatch(level, message, meta);
    }

    /// Serialize metadata, or dispatch the fallback record and yield `None`.
    ///
    /// A payload that cannot be serialized must still produce a record
    /// rather than panic or silently vanish.
    fn serialize_or_dispatch<M: Serialize>(
        &self,
        level: Level,
        message: &str,
        meta: M,
    ) -> Option<Value> {
        match serde_json::to_value(meta) {
            Ok(value) => Some(value),
            Err(err) => {
                self.dispatch(
                    level,
                    message,
                    json!({ "data": Value::Null, "error": err.to_string() }),
                );
                None
            }
        }
    }

    fn dispatch(&self, level: Level, message: &str, meta: Value) {
        if self.silent {
            return;
        }

        let record = Record {
            timestamp: chrono::Utc::now(),
            level,
            service: self.service.clone(),
            name: self.name.clone(),
            pid: std::process::id(),
            commit_hash: commit_hash().to_owned(),
            message: message.to_owned(),
            meta,
        };
        for sink in &self.sinks {
            sink.emit(&record);
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use serde::Deserialize;
    use serde_json::json;
    use thiserror::Error;

    use super::*;

    #[derive(Clone, Default)]
    struct CaptureSink(Arc<Mutex<Vec<Record>>>);

    impl CaptureSink {
        fn records(&self) -> Vec<Record> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Sink for CaptureSink {
        fn emit(&self, record: &Record) {
            self.0.lock().unwrap().push(record.clone());
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Stats {
        a: u64,
    }

    #[derive(Debug, Serialize)]
    struct CacheMiss {
        key: String,
    }

    impl Event for CacheMiss {
        const KEY: &'static str = "cache_miss";
        const LEVEL: Level = Level::Info;
    }

    #[derive(Debug, Error)]
    #[error("inner failed")]
    struct Inner;

    #[derive(Debug, Error)]
    #[error("outer failed")]
    struct Outer {
        #[source]
        inner: Inner,
    }

    fn test_env() -> Environment {
        Environment {
            app_env: Some("test".to_owned()),
            ..Environment::default()
        }
    }

    /// Capture-backed logger: test wiring skips the console, emission forced on.
    fn logger_with(schema: Schema) -> (Logger, CaptureSink) {
        let capture = CaptureSink::default();
        let logger = Logger::builder("svc")
            .with_schema(schema)
            .with_sink(capture.clone())
            .with_environment(test_env())
            .with_silent(false)
            .build();
        (logger, capture)
    }

    #[test]
    fn test_default_wiring_adds_console() {
        let logger = Logger::builder("svc")
            .with_environment(Environment::default())
            .build();
        assert_eq!(logger.sinks.len(), 1);
        assert!(!logger.is_silent());
    }

    #[test]
    fn test_test_wiring_is_silent_with_console_fallback() {
        let logger = Logger::builder("svc").with_environment(test_env()).build();
        // No other sink wired, so the console still joins; silence keeps it quiet.
        assert_eq!(logger.sinks.len(), 1);
        assert!(logger.is_silent());
    }

    #[cfg(feature = "axiom")]
    #[test]
    fn test_token_wires_the_remote_sink() {
        let logger = Logger::builder("svc")
            .with_environment(Environment {
                axiom_token: Some("token".to_owned()),
                ..Environment::default()
            })
            .build();
        // Remote plus console.
        assert_eq!(logger.sinks.len(), 2);
    }

    #[cfg(feature = "axiom")]
    #[test]
    fn test_test_wiring_with_token_skips_console() {
        let logger = Logger::builder("svc")
            .with_environment(Environment {
                app_env: Some("test".to_owned()),
                axiom_token: Some("token".to_owned()),
                transports: None,
            })
            .build();
        assert_eq!(logger.sinks.len(), 1);
    }

    #[cfg(feature = "axiom")]
    #[test]
    fn test_transports_forces_console_back_on() {
        let logger = Logger::builder("svc")
            .with_environment(Environment {
                app_env: Some("test".to_owned()),
                axiom_token: Some("token".to_owned()),
                transports: Some("Console,remote".to_owned()),
            })
            .build();
        assert_eq!(logger.sinks.len(), 2);
    }

    #[test]
    fn test_valid_metadata_is_normalized() {
        let (logger, capture) =
            logger_with(Schema::new().define::<Stats>(Level::Debug, "stats"));

        logger.debug("stats", json!({ "a": 123, "rogue": true }));

        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Debug);
        assert_eq!(records[0].message, "stats");
        // Unknown fields are stripped by validation.
        assert_eq!(records[0].meta, json!({ "a": 123 }));
    }

    #[test]
    fn test_invalid_metadata_falls_back() {
        let (logger, capture) =
            logger_with(Schema::new().define::<Stats>(Level::Debug, "stats"));

        logger.debug("stats", json!({ "a": "not a number" }));

        let records = capture.records();
        assert_eq!(records.len(), 1);
        let meta = &records[0].meta;
        assert_eq!(meta["data"], "{\"a\":\"not a number\"}");
        assert!(meta["error"].as_str().unwrap().contains("stats"));
    }

    #[test]
    fn test_undeclared_key_is_stringified() {
        let (logger, capture) =
            logger_with(Schema::new().define::<Stats>(Level::Debug, "stats"));

        logger.info("startup", json!({ "anything": [1, 2, 3] }));

        // No declared shape: the payload ships as one stringified key.
        assert_eq!(
            capture.records()[0].meta,
            json!({ "data": "{\"anything\":[1,2,3]}" })
        );
    }

    #[test]
    fn test_unserializable_metadata_degrades_to_fallback() {
        let (logger, capture) = logger_with(Schema::new());

        // Non-string map keys cannot be serialized to JSON.
        let mut meta = HashMap::new();
        meta.insert(vec![0u8], 1u8);
        logger.info("weird", meta);

        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].meta["data"], Value::Null);
        assert!(records[0].meta["error"].is_string());
    }

    #[test]
    fn test_default_metadata_is_attached() {
        let (logger, capture) = logger_with(Schema::new());

        logger.info("ready", ());

        let records = capture.records();
        assert_eq!(records[0].service, "svc");
        assert_eq!(records[0].name, "schemalog");
        assert_eq!(records[0].pid, std::process::id());
        assert!(!records[0].commit_hash.is_empty());
        assert!(records[0].meta.is_null());
    }

    #[test]
    fn test_silent_logger_emits_nothing() {
        let capture = CaptureSink::default();
        let logger = Logger::builder("svc")
            .with_sink(capture.clone())
            .with_environment(test_env())
            .build();

        assert!(logger.is_silent());
        logger.warn("ignored", json!({ "a": 1 }));
        assert!(capture.records().is_empty());
    }

    #[test]
    fn test_typed_event_uses_declared_level_and_key() {
        let (logger, capture) = logger_with(Schema::new());

        logger.event(&CacheMiss {
            key: "user:1".to_owned(),
        });

        let records = capture.records();
        assert_eq!(records[0].level, Level::Info);
        assert_eq!(records[0].message, "cache_miss");
        // Typed events carry their shape in the type, so no stringify.
        assert_eq!(records[0].meta, json!({ "key": "user:1" }));
    }

    #[test]
    fn test_typed_event_still_checked_against_declared_schema() {
        #[derive(Debug, Serialize)]
        struct BadStats {
            a: String,
        }

        impl Event for BadStats {
            const KEY: &'static str = "stats";
            const LEVEL: Level = Level::Debug;
        }

        let (logger, capture) =
            logger_with(Schema::new().define::<Stats>(Level::Debug, "stats"));

        logger.event(&BadStats { a: "x".to_owned() });

        let meta = &capture.records()[0].meta;
        assert_eq!(meta["data"], "{\"a\":\"x\"}");
        assert!(meta["error"].as_str().unwrap().contains("stats"));
    }

    #[test]
    fn test_error_with_captures_the_chain() {
        let (logger, capture) = logger_with(Schema::new());

        logger.error_with("request_failed", &Outer { inner: Inner });

        let records = capture.records();
        assert_eq!(records[0].level, Level::Error);
        // `request_failed` has no declared shape, so the payload arrives
        // stringified; the chain survives inside it.
        let data: Value =
            serde_json::from_str(records[0].meta["data"].as_str().unwrap()).unwrap();
        assert_eq!(data["error"]["message"], "outer failed");
        assert_eq!(data["error"]["chain"], json!(["inner failed"]));
    }

    #[test]
    fn test_each_level_method_tags_its_level() {
        let (logger, capture) = logger_with(Schema::new());

        logger.debug("a", ());
        logger.info("b", ());
        logger.warn("c", ());
        logger.error("d", ());

        let levels: Vec<Level> = capture.records().iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            vec![Level::Debug, Level::Info, Level::Warn, Level::Error]
        );
    }
}
