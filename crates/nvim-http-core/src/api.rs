//! API-info snapshot types.
//!
//! Neovim reports its API through `nvim_get_api_info`. Only the function
//! table matters to the gateway; other sections of the snapshot are ignored
//! when deserializing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of the remote API, fetched once from the session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    /// Declared remote functions
    #[serde(default)]
    pub functions: Vec<FunctionInfo>,

    /// Version block, kept opaque
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
}

impl ApiInfo {
    /// Create a snapshot from a list of functions
    pub fn new(functions: Vec<FunctionInfo>) -> Self {
        Self {
            functions,
            version: None,
        }
    }

    /// Parse a snapshot from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Find a function by name
    pub fn function(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// Descriptor of a single remote function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    /// Fully qualified name, e.g. `nvim_buf_get_lines`
    pub name: String,

    /// Declared parameters, in call order
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,

    /// Whether the function takes its receiver (buffer, window, tabpage) first
    #[serde(default)]
    pub method: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated_since: Option<u64>,
}

impl FunctionInfo {
    /// Create a descriptor with untyped parameters
    pub fn new<I, S>(name: impl Into<String>, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            parameters: parameters.into_iter().map(ParameterInfo::new).collect(),
            return_type: None,
            method: false,
            since: None,
            deprecated_since: None,
        }
    }

    /// Parameter names, in call order
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }
}

/// A declared parameter.
///
/// Neovim encodes parameters as `[type, name]` pairs; the object form
/// `{"type": .., "name": ..}` is accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawParameter")]
pub struct ParameterInfo {
    pub name: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl ParameterInfo {
    /// Create an untyped parameter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
        }
    }

    /// Set the declared type
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawParameter {
    Pair(String, String),
    Named {
        name: String,
        #[serde(rename = "type", default)]
        type_name: Option<String>,
    },
}

impl From<RawParameter> for ParameterInfo {
    fn from(raw: RawParameter) -> Self {
        match raw {
            RawParameter::Pair(type_name, name) => Self {
                name,
                type_name: Some(type_name),
            },
            RawParameter::Named { name, type_name } => Self { name, type_name },
        }
    }
}
