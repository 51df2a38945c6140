//! Layer filter encoding
//!
//! The package name handed to the datasource is not a bare layer name but a
//! JSON object selecting the layer and its compatibility constraints:
//!
//! ```json
//! {"arn": "arn:aws:lambda:us-east-1:123456789012:layer:my-layer", "runtime": "python3.9", "architecture": "x86_64"}
//! ```

use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::datasource::error::DatasourceError;

/// Query selecting the versions of one layer
///
/// `None` constraints are not sent to the Lambda API at all, while `Some("")`
/// is forwarded as an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LayerFilter {
    pub arn: String,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub architecture: Option<String>,
}

impl LayerFilter {
    pub fn new(arn: impl Into<String>) -> Self {
        Self {
            arn: arn.into(),
            runtime: None,
            architecture: None,
        }
    }

    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = Some(runtime.into());
        self
    }

    pub fn with_architecture(mut self, architecture: impl Into<String>) -> Self {
        self.architecture = Some(architecture.into());
        self
    }

    /// Parses a serialized filter, requiring a string `arn` field
    pub fn decode(raw: &str) -> Result<Self, DatasourceError> {
        serde_json::from_str(raw).map_err(|e| DatasourceError::MalformedFilter(e.to_string()))
    }

    /// Serializes the filter as compact JSON with keys in a fixed order
    ///
    /// Absent constraints are omitted, so the output is stable for equal filters.
    pub fn encode(&self) -> String {
        let mut fields = Map::new();
        fields.insert("arn".to_string(), Value::from(self.arn.as_str()));
        if let Some(runtime) = &self.runtime {
            fields.insert("runtime".to_string(), Value::from(runtime.as_str()));
        }
        if let Some(architecture) = &self.architecture {
            fields.insert(
                "architecture".to_string(),
                Value::from(architecture.as_str()),
            );
        }
        Value::Object(fields).to_string()
    }
}

impl FromStr for LayerFilter {
    type Err = DatasourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
