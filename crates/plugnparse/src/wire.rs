//! Wire representation: the untyped dict entities encode to and decode from,
//! the reserved tag keys, and the options that steer parsing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::Kind;
use crate::error::{Error, Result};

/// The serialized form of an entity.
pub type WireDict = Map<String, Value>;

/// Default key carrying the kind name of a tagged value.
pub const GENERIC_PARSABLE_TYPE: &str = "parsable_type";
/// Default key carrying the namespace of a tagged value.
pub const GENERIC_PARSABLE_MODULE: &str = "parsable_module";

/// Names of the two reserved keys that carry polymorphism metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireKeys {
    pub kind: String,
    pub namespace: String,
}

impl Default for WireKeys {
    fn default() -> Self {
        Self {
            kind: GENERIC_PARSABLE_TYPE.to_string(),
            namespace: GENERIC_PARSABLE_MODULE.to_string(),
        }
    }
}

impl WireKeys {
    pub fn new(kind: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            namespace: namespace.into(),
        }
    }

    /// Writes `kind` into `wire` under these keys.
    pub fn tag(&self, wire: &mut WireDict, kind: Kind) {
        wire.insert(self.kind.clone(), Value::from(kind.name));
        wire.insert(self.namespace.clone(), Value::from(kind.namespace));
    }
}

/// Options controlling how wire dicts are turned into entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub keys: WireKeys,
    /// Kind name to use instead of the one embedded in the wire dict.
    pub kind: Option<String>,
    /// Namespace to use instead of the one embedded in the wire dict.
    pub namespace: Option<String>,
    /// Turn every soft "unresolved / unparsable" outcome into an error.
    pub strict: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_keys(mut self, keys: WireKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// The options nested values are parsed with: same keys and strictness,
    /// no overrides.
    pub fn nested(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            kind: None,
            namespace: None,
            strict: self.strict,
        }
    }
}

/// The `(kind, namespace)` pair found on a wire dict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    pub kind: Option<String>,
    pub namespace: Option<String>,
}

impl Tags {
    /// Reads the tags of `wire`, preferring the overrides in `options`.
    ///
    /// Absent or non-string tags yield `None` unless `options.strict` is set.
    pub fn extract(wire: &WireDict, options: &ParseOptions) -> Result<Self> {
        let namespace = pick(
            wire,
            options.namespace.as_deref(),
            &options.keys.namespace,
            options.strict,
        )?;
        let kind = pick(wire, options.kind.as_deref(), &options.keys.kind, options.strict)?;
        Ok(Self { kind, namespace })
    }

    /// Whether `wire` carries a kind tag under `keys`.
    pub fn is_tagged(wire: &WireDict, keys: &WireKeys) -> bool {
        wire.get(&keys.kind).is_some_and(Value::is_string)
    }
}

fn pick(
    wire: &WireDict,
    explicit: Option<&str>,
    key: &str,
    strict: bool,
) -> Result<Option<String>> {
    if let Some(explicit) = explicit {
        return Ok(Some(explicit.to_string()));
    }
    match wire.get(key) {
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => {
            if strict {
                return Err(Error::type_mismatch(key, "string", describe(other)));
            }
            tracing::warn!(key, found = describe(other), "ignoring non-string tag");
            Ok(None)
        }
        None => {
            if strict {
                return Err(Error::resolution(
                    key,
                    None,
                    "the wire dict does not carry this tag",
                ));
            }
            Ok(None)
        }
    }
}

/// Pulls one typed constructor argument out of `args`.
pub fn required_arg<T: DeserializeOwned>(args: &WireDict, key: &str) -> Result<T> {
    let value = args.get(key).ok_or_else(|| {
        Error::missing_arguments(
            "constructor",
            vec![key.to_string()],
            args.keys().cloned().collect(),
        )
    })?;
    serde_json::from_value(value.clone()).map_err(|_| {
        Error::type_mismatch(key, std::any::type_name::<T>(), describe(value))
    })
}

/// JSON type name of `value`, for diagnostics.
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
