//! Parametric area/date-range process inputs

use chrono::NaiveDate;
use serde::Serialize;
use crate::error::{Result, SdkError};

/// Process id of the ShearWater demonstrator
pub const SHEARWATER_PROCESS_ID: &str = "shearwater-demo";

/// Areas the ShearWater process is trained for
pub const VALID_AREAS: &[&str] = &["Sindian"];

/// Inputs of the ShearWater process, validated at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShearWaterInputs {
    area: String,
    #[serde(rename = "startDay")]
    start_day: String,
    #[serde(rename = "endDay")]
    end_day: String,
}

fn check_date(field: &str, value: &str) -> Result<()> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        SdkError::Validation(format!("{} '{}' is not in YYYY-MM-DD format.", field, value))
    })?;
    Ok(())
}

impl ShearWaterInputs {
    pub fn new(
        area: impl Into<String>,
        start_day: impl Into<String>,
        end_day: impl Into<String>,
    ) -> Result<Self> {
        let area = area.into();
        let start_day = start_day.into();
        let end_day = end_day.into();

        if !VALID_AREAS.contains(&area.as_str()) {
            return Err(SdkError::Validation(format!(
                "Invalid area '{}'. Must be one of {:?}.",
                area, VALID_AREAS
            )));
        }
        check_date("start_day", &start_day)?;
        check_date("end_day", &end_day)?;

        Ok(Self {
            area,
            start_day,
            end_day,
        })
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn start_day(&self) -> &str {
        &self.start_day
    }

    pub fn end_day(&self) -> &str {
        &self.end_day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_inputs() {
        let inputs = ShearWaterInputs::new("Sindian", "1970-01-01", "1970-01-01").unwrap();
        assert_eq!(
            serde_json::to_value(&inputs).unwrap(),
            serde_json::json!({"area": "Sindian", "startDay": "1970-01-01", "endDay": "1970-01-01"})
        );
    }

    #[test]
    fn test_invalid_area() {
        let err = ShearWaterInputs::new("unknown", "1970-01-01", "1970-01-01").unwrap_err();
        assert!(err.to_string().contains("Invalid area 'unknown'"));
    }

    #[test]
    fn test_invalid_start_day() {
        let err = ShearWaterInputs::new("Sindian", "abc", "1970-01-01").unwrap_err();
        assert!(err.to_string().contains("start_day 'abc'"));
    }

    #[test]
    fn test_invalid_end_day() {
        let err = ShearWaterInputs::new("Sindian", "1970-01-01", "1970-13-01").unwrap_err();
        assert!(err.to_string().contains("end_day '1970-13-01'"));
    }
}
