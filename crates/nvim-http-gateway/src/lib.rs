//! HTTP/REST gateway for the Neovim msgpack-RPC API.
//!
//! Every request is mapped onto a remote function by convention:
//! - `GET /var?name=x` calls `nvim_get_var("x")`
//! - `PUT /win/7/height` with body `{"height": 10}` calls `nvim_win_set_height(Window(7), 10)`
//! - `DELETE /buf/3` calls `nvim_buf_delete(Buffer(3), opts)`
//! - `POST /command` calls `nvim_command(...)`
//!
//! Positional arguments are filled by parameter name from the query string
//! (dotted keys nest) and the JSON object body. Results come back as JSON.

pub mod config;
pub mod error;
pub mod gateway;
pub mod pool;
pub mod resolver;
pub mod server;
pub mod sink;
pub mod table;

pub use config::StartOptions;
pub use error::{GatewayError, GatewayResult};
pub use gateway::{assemble_arguments, map_outcome, Gateway, PreparedCall};
pub use pool::ArgumentPool;
pub use resolver::{resolve, ResolvedCall};
pub use server::{build_runtime, serve, start, RunningGateway};
pub use sink::ResponseSink;
pub use table::ProcedureTable;
