//! Keys referencing external storage credentials (S3 or WebDAV)
//!
//! A key's configuration is only ever sent encrypted with the service's
//! public key.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use crate::api::Api;
use crate::crypto::encrypt_payload;
use crate::error::{Result, SdkError};
use crate::process::keystore_uri;

/// Expiry applied when a key does not set one, in seconds
pub const DEFAULT_EXPIRE_SECONDS: u64 = 3600;

/// Kind of storage a key points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    #[serde(rename = "S3")]
    S3,
    #[serde(rename = "WEBDAV")]
    WebDav,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::S3 => "S3",
            KeyType::WebDav => "WEBDAV",
        }
    }
}

impl FromStr for KeyType {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "S3" => Ok(KeyType::S3),
            "WEBDAV" => Ok(KeyType::WebDav),
            _ => Err(SdkError::Validation(format!(
                "Type must be either 'S3' or 'WEBDAV', got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn check_endpoint(endpoint: &str) -> Result<()> {
    if !endpoint.starts_with("https://") {
        return Err(SdkError::Validation(format!(
            "Endpoint '{}' does not look like an https URL",
            endpoint
        )));
    }
    Ok(())
}

/// Credentials of an S3-compatible bucket
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct S3KeyConfig {
    secret_key: String,
    access_key: String,
    bucket: String,
    endpoint: String,
    region: String,
}

impl S3KeyConfig {
    pub fn new(
        secret_key: impl Into<String>,
        access_key: impl Into<String>,
        bucket: impl Into<String>,
        endpoint: impl Into<String>,
        region: impl Into<String>,
    ) -> Result<Self> {
        let endpoint = endpoint.into();
        check_endpoint(&endpoint)?;
        Ok(Self {
            secret_key: secret_key.into(),
            access_key: access_key.into(),
            bucket: bucket.into(),
            endpoint,
            region: region.into(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for S3KeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3KeyConfig")
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

/// Credentials of a WebDAV share
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct WebDavKeyConfig {
    endpoint: String,
    username: String,
    password: String,
}

impl WebDavKeyConfig {
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let endpoint = endpoint.into();
        check_endpoint(&endpoint)?;
        Ok(Self {
            endpoint,
            username: username.into(),
            password: password.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for WebDavKeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDavKeyConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Plaintext storage credentials attached to a key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum KeyConfig {
    S3(S3KeyConfig),
    WebDav(WebDavKeyConfig),
}

impl From<S3KeyConfig> for KeyConfig {
    fn from(config: S3KeyConfig) -> Self {
        KeyConfig::S3(config)
    }
}

impl From<WebDavKeyConfig> for KeyConfig {
    fn from(config: WebDavKeyConfig) -> Self {
        KeyConfig::WebDav(config)
    }
}

impl KeyConfig {
    pub fn key_type(&self) -> KeyType {
        match self {
            KeyConfig::S3(_) => KeyType::S3,
            KeyConfig::WebDav(_) => KeyType::WebDav,
        }
    }

    /// Encrypts the configuration with the given PEM public key, base64-encoded
    pub fn encrypt(&self, public_key_pem: &[u8]) -> Result<String> {
        encrypt_payload(self, public_key_pem)
    }

    /// Fetches the service public key and encrypts the configuration with it
    pub async fn encode(&self, api: &Api) -> Result<String> {
        let public_key = api.get_public_key().await?;
        self.encrypt(&public_key)
    }
}

/// Key representation as returned by the service
#[derive(Deserialize, Debug, Clone)]
pub struct KeyResponse {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "creationDate", default)]
    pub creation_date: Option<String>,
    #[serde(rename = "expirationDate", default)]
    pub expiration_date: Option<String>,
    #[serde(rename = "expireSeconds", default)]
    pub expire_seconds: Option<u64>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub public: Option<bool>,
}

/// Named reference to externally stored credentials
#[derive(Debug, Clone)]
pub struct Key {
    api: Api,
    pub name: String,
    type_: Option<KeyType>,
    config: Option<KeyConfig>,
    pub description: Option<String>,
    pub creation_date: Option<String>,
    pub owner: Option<String>,
    pub public: bool,
    pub expiration_date: Option<String>,
    /// `0` means "use the default of one hour"
    pub expire_seconds: u64,
}

impl Key {
    /// A key with no type or configuration, e.g. to reference an existing one
    pub fn new(api: &Api, name: impl Into<String>) -> Self {
        Self {
            api: api.clone(),
            name: name.into(),
            type_: None,
            config: None,
            description: None,
            creation_date: None,
            owner: None,
            public: false,
            expiration_date: None,
            expire_seconds: 0,
        }
    }

    /// A key whose type follows its configuration
    pub fn with_config(api: &Api, name: impl Into<String>, config: impl Into<KeyConfig>) -> Self {
        let config = config.into();
        let mut key = Self::new(api, name);
        key.type_ = Some(config.key_type());
        key.config = Some(config);
        key
    }

    /// A key with an explicit type string
    ///
    /// The type must be `S3` or `WEBDAV`, and must match the configuration
    /// kind when both are given.
    pub fn try_new(
        api: &Api,
        name: impl Into<String>,
        type_: Option<&str>,
        config: Option<KeyConfig>,
    ) -> Result<Self> {
        let declared = type_.map(KeyType::from_str).transpose()?;
        let mut key = Self::new(api, name);

        match (declared, config) {
            (Some(declared), Some(config)) if declared != config.key_type() => {
                return Err(SdkError::Validation(format!(
                    "Key type '{}' conflicts with a {} configuration",
                    declared,
                    config.key_type()
                )));
            }
            (_, Some(config)) => {
                key.type_ = Some(config.key_type());
                key.config = Some(config);
            }
            (declared, None) => key.type_ = declared,
        }

        Ok(key)
    }

    pub(crate) fn from_response(api: Api, data: KeyResponse) -> Result<Self> {
        let type_ = data.type_.as_deref().map(KeyType::from_str).transpose()?;
        Ok(Self {
            api,
            name: data.name,
            type_,
            config: None,
            description: data.description,
            creation_date: data.creation_date,
            owner: data.owner,
            public: data.public.unwrap_or(false),
            expiration_date: data.expiration_date,
            expire_seconds: data.expire_seconds.unwrap_or(0),
        })
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn expire_seconds(mut self, seconds: u64) -> Self {
        self.expire_seconds = seconds;
        self
    }

    pub fn type_(&self) -> Option<KeyType> {
        self.type_
    }

    pub fn config(&self) -> Option<&KeyConfig> {
        self.config.as_ref()
    }

    /// `keystore://<name>`, as used in process inputs and outputs
    pub fn uri(&self) -> String {
        keystore_uri(&self.name)
    }

    fn require_config(&self) -> Result<&KeyConfig> {
        self.config
            .as_ref()
            .ok_or_else(|| SdkError::Validation("Cannot create a key without config".to_string()))
    }

    /// Body of the key creation request, with the configuration encrypted
    pub async fn request_body(&self) -> Result<Value> {
        let config = self.require_config()?;
        let data = config.encode(&self.api).await?;
        Ok(self.body_with_data(config, data))
    }

    fn body_with_data(&self, config: &KeyConfig, data: String) -> Value {
        let expire = match self.expire_seconds {
            0 => DEFAULT_EXPIRE_SECONDS,
            seconds => seconds,
        };
        let description = self.description.clone().unwrap_or_else(|| self.name.clone());

        let mut body = serde_json::Map::new();
        body.insert(
            self.name.clone(),
            serde_json::json!({
                "type": config.key_type(),
                "expire": expire,
                "public": self.public,
                "description": description,
                "data": data,
            }),
        );
        Value::Object(body)
    }

    /// Registers the key with the service
    ///
    /// Fails before any network call when the key has no configuration.
    pub async fn create(self) -> Result<Key> {
        self.require_config()?;
        let api = self.api.clone();
        api.create_key(self).await
    }

    pub async fn delete(&self) -> Result<()> {
        self.api.delete_key(&self.name).await
    }
}
