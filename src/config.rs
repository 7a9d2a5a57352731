//! Endpoint table and local configuration paths

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use crate::error::{Result, SdkError};

/// Environment variable overriding the directory that holds `.hdarc`
pub const CONFIG_DIR_ENV: &str = "EOCANVAS_CONFIG_DIR";

/// Name of the credentials file inside the config directory
pub const CREDENTIALS_FILE: &str = ".hdarc";

pub const DEFAULT_TOKEN_URL: &str = "https://gateway.prod.wekeo2.eu/hda-broker/";
pub const DEFAULT_BASE_URL: &str = "https://gateway.prod.wekeo2.eu/eocanvas/api/v1";

const DEFAULT_ENDPOINTS: &[(&str, &str)] = &[
    ("process_list", "/processes"),
    ("process_detail", "/processes/{process_id}"),
    ("process_execution", "/processes/{process_id}/execution"),
    ("job_list", "/jobs"),
    ("job_detail", "/jobs/{job_id}"),
    ("job_logs", "/jobs/{job_id}/logs"),
    ("job_results", "/jobs/{job_id}/results"),
    ("key_list", "/keys"),
    ("key_detail", "/keys/{key_id}"),
    ("download", "{result_href}"),
];

/// Maps logical endpoint names to absolute URLs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Urls {
    /// Base URL of the token service; `gettoken`/`refreshtoken` are joined to it
    pub token_url: String,
    /// Prefix prepended to every endpoint template
    pub base_url: String,
    /// Endpoint templates with `{param}` placeholders
    pub endpoints: HashMap<String, String>,
}

impl Default for Urls {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_URL, DEFAULT_BASE_URL)
    }
}

impl Urls {
    /// Builds the built-in endpoint table against the given service roots
    ///
    /// # Example
    ///
    /// ```rust
    /// use eocanvas_rust_sdk::config::Urls;
    ///
    /// let urls = Urls::new("http://localhost:8080/token/", "http://localhost:8080/api");
    /// assert_eq!(
    ///     urls.get("job_detail", &[("job_id", "123")]).unwrap(),
    ///     "http://localhost:8080/api/jobs/123"
    /// );
    /// ```
    pub fn new(token_url: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            token_url: token_url.into(),
            base_url: base_url.into(),
            endpoints: DEFAULT_ENDPOINTS
                .iter()
                .map(|(name, template)| (name.to_string(), template.to_string()))
                .collect(),
        }
    }

    /// Loads an endpoint table from a JSON file
    ///
    /// The file must provide `token_url`, `base_url` and `endpoints`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| {
            SdkError::InvalidConfig(format!("Malformed url file {}: {}", path.display(), e))
        })
    }

    /// Resolves an endpoint name and its path parameters to an absolute URL
    ///
    /// # Arguments
    ///
    /// * `endpoint_name` - Logical name, e.g. `job_detail`
    /// * `params` - Values for the `{param}` placeholders of the template
    pub fn get(&self, endpoint_name: &str, params: &[(&str, &str)]) -> Result<String> {
        let template = self.endpoints.get(endpoint_name).ok_or_else(|| {
            SdkError::InvalidConfig(format!(
                "Endpoint {} not found in configuration.",
                endpoint_name
            ))
        })?;

        let mut path = template.clone();
        for (name, value) in params {
            path = path.replace(&format!("{{{}}}", name), value);
        }

        if path.contains('{') {
            return Err(SdkError::InvalidConfig(format!(
                "Missing parameter for endpoint {}: {}",
                endpoint_name, template
            )));
        }

        Ok(format!("{}{}", self.base_url, path))
    }
}

/// Directory holding the credentials file
///
/// `$EOCANVAS_CONFIG_DIR` wins, then the user's home directory.
pub fn config_dir() -> PathBuf {
    std::env::var_os(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .or_else(dirs_next::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Full path of the credentials file
pub fn credentials_path() -> PathBuf {
    config_dir().join(CREDENTIALS_FILE)
}
