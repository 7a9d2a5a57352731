//! Data Tailor customisation inputs

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use crate::error::{Result, SdkError};
use super::inputs::{Config, Input};

/// Process id of the Data Tailor function
pub const DATATAILOR_PROCESS_ID: &str = "dataTailor";

/// Layer filter: a list of bands for a given product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Bands as `{id, number, name}` objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bands: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

/// Geographical area given by its north, south, west and east bounds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionOfInterest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Decimal degrees
    #[serde(rename = "NSWE", default, skip_serializing_if = "Option::is_none")]
    pub nswe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quicklook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resample_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stretch_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodatacolor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_size: Option<i64>,
}

/// Chain configuration for a Data Tailor customisation
///
/// Unset fields are omitted from the encoded document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi: Option<RegionOfInterest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quicklook: Option<Quicklook>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resample_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resample_resolution: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xrit_segments: Option<Vec<Value>>,
}

impl Chain {
    /// Parses a chain from a JSON document
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| SdkError::InvalidChain(e.to_string()))
    }

    /// Reads a chain from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Transport form expected by the `epct_chain` input
    ///
    /// The chain is written as a JSON document, which the service's YAML
    /// reader accepts as a flow mapping.
    pub fn b64encode(&self) -> Result<String> {
        let document = serde_json::to_vec(self)?;
        Ok(general_purpose::STANDARD.encode(document))
    }

    /// Inverse of [`Chain::b64encode`]
    pub fn b64decode(encoded: &str) -> Result<Self> {
        let bytes = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| SdkError::InvalidChain(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| SdkError::InvalidChain(e.to_string()))
    }
}

/// Inputs of a Data Tailor process
#[derive(Debug, Clone, PartialEq)]
pub struct DataTailorInputs {
    pub epct_chain: Chain,
    pub epct_input: Vec<Input>,
    pub epct_config: Vec<Config>,
}

impl DataTailorInputs {
    pub fn new(epct_chain: Chain) -> Self {
        Self {
            epct_chain,
            epct_input: Vec::new(),
            epct_config: Vec::new(),
        }
    }

    pub fn with_input(mut self, input: Input) -> Self {
        self.epct_input.push(input);
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.epct_config.push(config);
        self
    }

    pub(crate) fn to_value(&self) -> Result<Value> {
        let mut value = serde_json::json!({
            "epct_chain": self.epct_chain.b64encode()?,
            "epct_input": serde_json::to_string(&self.epct_input)?,
        });
        if !self.epct_config.is_empty() {
            value["epct_config"] = Value::String(serde_json::to_string(&self.epct_config)?);
        }
        Ok(value)
    }
}
