//! Named product inputs and their per-input options

use serde::ser::{Serialize, SerializeMap, Serializer};

/// URI scheme referencing a stored key
pub const KEYSTORE_SCHEME: &str = "keystore://";

/// Schema value pointing at a key by name
pub fn keystore_uri(key_name: &str) -> String {
    format!("{}{}", KEYSTORE_SCHEME, key_name)
}

/// A named product URL fed to a process
///
/// Serializes as `{"<key>": "<url>", "schema": "keystore://<name>"}`, the
/// schema entry present only when a key is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub key: String,
    pub url: String,
    /// Name of the key granting access to `url`
    pub keystore: Option<String>,
}

impl Input {
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
            keystore: None,
        }
    }

    pub fn with_keystore(mut self, key_name: impl Into<String>) -> Self {
        self.keystore = Some(key_name.into());
        self
    }
}

impl Serialize for Input {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.keystore.is_some() { 2 } else { 1 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(&self.key, &self.url)?;
        if let Some(name) = &self.keystore {
            map.serialize_entry("schema", &keystore_uri(name))?;
        }
        map.end()
    }
}

/// How the service should treat one input
///
/// Both fields are always sent; `uncompress` defaults to `false`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ConfigOption {
    pub uncompress: bool,
    #[serde(rename = "subPath")]
    pub sub_path: String,
}

impl ConfigOption {
    pub fn new(sub_path: impl Into<String>) -> Self {
        Self {
            uncompress: false,
            sub_path: sub_path.into(),
        }
    }

    pub fn uncompress(mut self, uncompress: bool) -> Self {
        self.uncompress = uncompress;
        self
    }
}

/// Options bound to the input of the same `key`
///
/// Serializes as `{"<key>": {"uncompress": ..., "subPath": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub key: String,
    pub options: ConfigOption,
}

impl Config {
    pub fn new(key: impl Into<String>, options: ConfigOption) -> Self {
        Self {
            key: key.into(),
            options,
        }
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.options)?;
        map.end()
    }
}
