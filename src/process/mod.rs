//! Processes: server-registered functions and the payloads that invoke them

mod datatailor;
mod inputs;
mod shearwater;
mod snap;

pub use datatailor::{Chain, DataTailorInputs, Filter, Quicklook, RegionOfInterest, DATATAILOR_PROCESS_ID};
pub use inputs::{keystore_uri, Config, ConfigOption, Input, KEYSTORE_SCHEME};
pub use shearwater::{ShearWaterInputs, SHEARWATER_PROCESS_ID, VALID_AREAS};
pub use snap::{Graph, SnapInputs, SNAP_PROCESS_ID};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use crate::api::Api;
use crate::error::Result;
use crate::job::{Job, JobRunner, RunReport, RunnerConfig};

/// Process execution request
///
/// Every process kind produces this same envelope; only `inputs` differs.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ExecuteRequest {
    pub inputs: Value,
    pub outputs: Value,
    pub response: String,
    pub subscriber: Option<Value>,
}

/// Process description as returned by the service
#[derive(Deserialize, Debug, Clone)]
pub struct ProcessResponse {
    #[serde(rename = "processId")]
    pub process_id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub inputs: Value,
}

/// Process-specific inputs
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessInputs {
    Snap(SnapInputs),
    DataTailor(DataTailorInputs),
    ShearWater(ShearWaterInputs),
    /// Input schema of a process described by the service; submits no values
    Schema(Value),
}

impl ProcessInputs {
    fn to_value(&self) -> Result<Value> {
        match self {
            ProcessInputs::Snap(inputs) => inputs.to_value(),
            ProcessInputs::DataTailor(inputs) => inputs.to_value(),
            ProcessInputs::ShearWater(inputs) => Ok(serde_json::to_value(inputs)?),
            ProcessInputs::Schema(_) => Ok(Value::Object(Map::new())),
        }
    }
}

/// A remote function invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    pub process_id: String,
    pub version: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub inputs: ProcessInputs,
    /// Name of the key the outputs are written to
    pub output: Option<String>,
}

impl From<ProcessResponse> for Process {
    fn from(data: ProcessResponse) -> Self {
        Self {
            process_id: data.process_id,
            version: data.version,
            title: data.title,
            description: data.description,
            inputs: ProcessInputs::Schema(data.inputs),
            output: None,
        }
    }
}

impl Process {
    /// A process with no submitted inputs
    pub fn new(process_id: impl Into<String>) -> Self {
        Self::with_inputs(process_id, ProcessInputs::Schema(Value::Null))
    }

    pub fn with_inputs(process_id: impl Into<String>, inputs: ProcessInputs) -> Self {
        Self {
            process_id: process_id.into(),
            version: None,
            title: None,
            description: None,
            inputs,
            output: None,
        }
    }

    /// A SNAP graph execution
    ///
    /// # Example
    ///
    /// ```rust
    /// use eocanvas_rust_sdk::process::{Graph, Input, Process, SnapInputs};
    ///
    /// let graph = Graph::from_text("<graph id=\"g\"><version>1.0</version></graph>").unwrap();
    /// let process = Process::snap(
    ///     SnapInputs::new(graph).with_input(Input::new("img1", "https://example.com/S1.zip")),
    /// );
    /// assert_eq!(process.process_id, "snap-function");
    /// ```
    pub fn snap(inputs: SnapInputs) -> Self {
        Self::with_inputs(SNAP_PROCESS_ID, ProcessInputs::Snap(inputs))
    }

    /// A Data Tailor customisation
    pub fn data_tailor(inputs: DataTailorInputs) -> Self {
        Self::with_inputs(DATATAILOR_PROCESS_ID, ProcessInputs::DataTailor(inputs))
    }

    /// A ShearWater run; fails before any network call on invalid parameters
    pub fn shearwater(
        area: impl Into<String>,
        start_day: impl Into<String>,
        end_day: impl Into<String>,
    ) -> Result<Self> {
        let inputs = ShearWaterInputs::new(area, start_day, end_day)?;
        Ok(Self::with_inputs(SHEARWATER_PROCESS_ID, ProcessInputs::ShearWater(inputs)))
    }

    /// Writes the outputs to the storage referenced by the named key
    pub fn with_output(mut self, key_name: impl Into<String>) -> Self {
        self.output = Some(key_name.into());
        self
    }

    /// Builds the execution request
    pub fn prepare_inputs(&self) -> Result<ExecuteRequest> {
        let outputs = match &self.output {
            Some(key_name) => serde_json::json!({
                "output": {"format": {"schema": keystore_uri(key_name)}}
            }),
            None => Value::Object(Map::new()),
        };

        Ok(ExecuteRequest {
            inputs: self.inputs.to_value()?,
            outputs,
            response: "raw".to_string(),
            subscriber: None,
        })
    }

    /// Submits the process
    pub async fn submit(&self, api: &Api) -> Result<Job> {
        api.exec_process(self).await
    }

    /// Submits the process (unless `job` is given), waits for it and downloads its results
    pub async fn run(&self, api: &Api, job: Option<Job>, download_dir: Option<&Path>) -> Result<RunReport> {
        self.run_with_config(api, job, download_dir, RunnerConfig::default())
            .await
    }

    pub async fn run_with_config(
        &self,
        api: &Api,
        job: Option<Job>,
        download_dir: Option<&Path>,
        config: RunnerConfig,
    ) -> Result<RunReport> {
        let job = match job {
            Some(job) => job,
            None => self.submit(api).await?,
        };
        JobRunner::with_config(job, config).run(download_dir).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prepare_inputs_with_no_outputs() {
        let request = Process::new("fake_process").prepare_inputs().unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"inputs": {}, "outputs": {}, "response": "raw", "subscriber": null})
        );
    }

    #[test]
    fn test_prepare_inputs_with_outputs() {
        let request = Process::new("fake_process")
            .with_output("key")
            .prepare_inputs()
            .unwrap();
        assert_eq!(
            request.outputs,
            json!({"output": {"format": {"schema": "keystore://key"}}})
        );
    }

    #[test]
    fn test_shearwater_payload() {
        let request = Process::shearwater("Sindian", "1970-01-01", "1970-01-01")
            .unwrap()
            .prepare_inputs()
            .unwrap();
        assert_eq!(
            request.inputs,
            json!({"area": "Sindian", "startDay": "1970-01-01", "endDay": "1970-01-01"})
        );
        assert_eq!(request.response, "raw");
        assert_eq!(request.subscriber, None);
    }

    #[test]
    fn test_shearwater_invalid_area() {
        let err = Process::shearwater("unknown", "1970-01-01", "1970-01-01").unwrap_err();
        assert!(err.to_string().contains("unknown"));
    }

    #[test]
    fn test_data_tailor_with_input_key_and_output_key() {
        let inputs = DataTailorInputs::new(Chain::default())
            .with_input(Input::new("k", "v").with_keystore("input_key"));
        let request = Process::data_tailor(inputs)
            .with_output("output_key")
            .prepare_inputs()
            .unwrap();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "inputs": {
                    "epct_chain": "e30=",
                    "epct_input": r#"[{"k":"v","schema":"keystore://input_key"}]"#,
                },
                "outputs": {"output": {"format": {"schema": "keystore://output_key"}}},
                "response": "raw",
                "subscriber": null,
            })
        );
    }

    #[test]
    fn test_snap_envelope_shape() {
        let graph = Graph::from_text("<graph/>").unwrap();
        let request = Process::snap(SnapInputs::new(graph)).prepare_inputs().unwrap();
        assert_eq!(request.inputs["eo_input"], "[]");
        assert_eq!(request.inputs["eo_config"], "[]");
        assert_eq!(request.outputs, json!({}));
    }

    #[test]
    fn test_process_from_response() {
        let data: ProcessResponse = serde_json::from_value(json!({
            "processId": "snap-function",
            "version": "v0.11",
            "title": "snap-function",
            "inputs": {"snap_graph": {"title": "ESA SNAP GPT graph"}},
            "outputs": {},
        }))
        .unwrap();

        let process = Process::from(data);
        assert_eq!(process.process_id, "snap-function");
        assert_eq!(process.version.as_deref(), Some("v0.11"));
        assert!(matches!(process.inputs, ProcessInputs::Schema(_)));
        assert_eq!(process.prepare_inputs().unwrap().inputs, json!({}));
    }
}
