//! Per-level, per-message-key metadata schemas.
//!
//! A [`Schema`] maps `(level, message key)` pairs to the metadata shape a
//! call at that key must carry. Shapes are ordinary serde types: validation
//! deserializes the supplied JSON into the declared type and re-serializes
//! it, so unknown fields are stripped and missing or mistyped fields fail.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Level, SchemaError};

type Validator = Box<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Declares the expected metadata shape for each `(level, message key)` pair.
#[derive(Default)]
pub struct Schema {
    entries: HashMap<Level, HashMap<String, Validator>>,
}

impl Schema {
    /// An empty schema: every payload passes through unvalidated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `key` logged at `level` carries metadata shaped like `T`.
    ///
    /// Redefining a key replaces the previous shape.
    #[must_use]
    pub fn define<T>(mut self, level: Level, key: impl Into<String>) -> Self
    where
        T: Serialize + DeserializeOwned,
    {
        let validator: Validator = Box::new(|value: &Value| {
            let typed: T = serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
            serde_json::to_value(typed).map_err(|e| e.to_string())
        });
        self.entries.entry(level).or_default().insert(key.into(), validator);
        self
    }

    /// Whether a shape is declared for `key` at `level`.
    #[must_use]
    pub fn contains(&self, level: Level, key: &str) -> bool {
        self.entries
            .get(&level)
            .is_some_and(|keys| keys.contains_key(key))
    }

    /// Validate `meta` against the shape declared for `(level, key)`.
    ///
    /// Returns `None` when no shape is declared, `Some(Ok(_))` with the
    /// normalized payload (unknown fields stripped) on success, and
    /// `Some(Err(_))` when the payload does not match.
    pub fn validate(
        &self,
        level: Level,
        key: &str,
        meta: &Value,
    ) -> Option<Result<Value, SchemaError>> {
        let validator = self.entries.get(&level)?.get(key)?;
        Some(validator(meta).map_err(|reason| SchemaError {
            key: key.to_owned(),
            reason,
        }))
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (level, keys) in &self.entries {
            let mut names: Vec<&str> = keys.keys().map(String::as_str).collect();
            names.sort_unstable();
            map.entry(level, &names);
        }
        map.finish()
    }
}
