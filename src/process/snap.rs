//! SNAP graph execution inputs

use base64::{Engine as _, engine::general_purpose};
use std::path::Path;
use crate::error::{Result, SdkError};
use super::inputs::{Config, Input};

/// Process id of the SNAP function
pub const SNAP_PROCESS_ID: &str = "snap-function";

/// A SNAP GPT graph, held as its XML document
///
/// The graph is built with SNAP tooling; this type only carries it to the
/// service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    xml: String,
}

impl Graph {
    /// Wraps a graph XML document
    pub fn from_text(text: impl Into<String>) -> Result<Self> {
        let xml = text.into();
        if !xml.trim_start().starts_with('<') {
            return Err(SdkError::MalformedSnap(
                "graph does not look like an XML document".to_string(),
            ));
        }
        Ok(Self { xml })
    }

    /// Reads a graph XML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_text(std::fs::read_to_string(path)?)
    }

    pub fn as_xml(&self) -> &str {
        &self.xml
    }

    /// Transport form expected by the `snap_graph` input
    pub fn b64encode(&self) -> String {
        general_purpose::STANDARD.encode(self.xml.as_bytes())
    }

    /// Inverse of [`Graph::b64encode`]
    pub fn b64decode(encoded: &str) -> Result<Self> {
        let bytes = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| SdkError::MalformedSnap(e.to_string()))?;
        let xml = String::from_utf8(bytes).map_err(|e| SdkError::MalformedSnap(e.to_string()))?;
        Self::from_text(xml)
    }
}

/// Inputs of a SNAP process
#[derive(Debug, Clone, PartialEq)]
pub struct SnapInputs {
    pub snap_graph: Graph,
    pub eo_input: Vec<Input>,
    pub eo_config: Vec<Config>,
}

impl SnapInputs {
    pub fn new(snap_graph: Graph) -> Self {
        Self {
            snap_graph,
            eo_input: Vec::new(),
            eo_config: Vec::new(),
        }
    }

    pub fn with_input(mut self, input: Input) -> Self {
        self.eo_input.push(input);
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.eo_config.push(config);
        self
    }

    pub(crate) fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "snap_graph": self.snap_graph.b64encode(),
            "eo_input": serde_json::to_string(&self.eo_input)?,
            "eo_config": serde_json::to_string(&self.eo_config)?,
        }))
    }
}
