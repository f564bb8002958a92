//! Core types for the Neovim HTTP gateway.
//!
//! This crate holds everything the gateway shares with the RPC session it
//! drives:
//! - API-info snapshot (functions and their declared parameters)
//! - Handle arguments (window/buffer/tabpage ids) and positional arguments
//! - The `RpcSession` trait and its response/error types

pub mod api;
pub mod error;
pub mod handle;
pub mod session;

pub use api::{ApiInfo, FunctionInfo, ParameterInfo};
pub use error::RpcError;
pub use handle::{Argument, HandleArgument};
pub use session::{session_fn, FnSession, RpcResponse, RpcSession};
