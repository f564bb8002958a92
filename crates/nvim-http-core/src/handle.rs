//! Handle and positional argument types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Editor object handle taken from the request path.
///
/// Handles are sent as msgpack extension types by the session, so they stay
/// distinct from plain integers all the way to the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleArgument {
    Window(i64),
    Buffer(i64),
    Tabpage(i64),
}

impl HandleArgument {
    /// Lowercase kind name ("window", "buffer", "tabpage")
    pub fn kind(&self) -> &'static str {
        match self {
            HandleArgument::Window(_) => "window",
            HandleArgument::Buffer(_) => "buffer",
            HandleArgument::Tabpage(_) => "tabpage",
        }
    }

    /// Numeric handle id
    pub fn id(&self) -> i64 {
        match self {
            HandleArgument::Window(id) | HandleArgument::Buffer(id) | HandleArgument::Tabpage(id) => *id,
        }
    }
}

impl fmt::Display for HandleArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleArgument::Window(id) => write!(f, "Window({})", id),
            HandleArgument::Buffer(id) => write!(f, "Buffer({})", id),
            HandleArgument::Tabpage(id) => write!(f, "Tabpage({})", id),
        }
    }
}

/// One positional argument of a remote call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Argument {
    Handle(HandleArgument),
    Value(Value),
}

impl From<HandleArgument> for Argument {
    fn from(handle: HandleArgument) -> Self {
        Argument::Handle(handle)
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Argument::Value(value)
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Handle(handle) => fmt::Display::fmt(handle, f),
            Argument::Value(value) => fmt::Display::fmt(value, f),
        }
    }
}
