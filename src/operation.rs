//! Normalized operation descriptors.

use indexmap::IndexMap;
use serde::Serialize;

use crate::types::{DataType, HttpMethod, ParamLocation};

/// One HTTP method + URL template pairing, keyed by operation id in a
/// [`crate::NormalizedSpec`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub method: HttpMethod,
    /// `basePath` followed by the path template, `{placeholders}` intact.
    pub url: String,
    /// Effective model of the request body or success response.
    ///
    /// `None` for delete-like operations or when no schema can be determined;
    /// [`crate::FILE_MODEL_NAME`] for file responses.
    pub model_name: Option<String>,
    /// Present only when the operation (or its path item) declares parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<OperationParams>,
}

/// URL parameters of an operation, split by location.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperationParams {
    pub path: IndexMap<String, ParamSpec>,
    pub query: IndexMap<String, ParamSpec>,
}

impl OperationParams {
    pub fn get(&self, location: ParamLocation) -> &IndexMap<String, ParamSpec> {
        match location {
            ParamLocation::Path => &self.path,
            ParamLocation::Query => &self.query,
        }
    }

    pub(crate) fn get_mut(&mut self, location: ParamLocation) -> &mut IndexMap<String, ParamSpec> {
        match location {
            ParamLocation::Path => &mut self.path,
            ParamLocation::Query => &mut self.query,
        }
    }
}

/// A URL parameter reduced to what validation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub required: bool,
}
