//! Request translation and dispatch.
//!
//! Each request goes through the same stages: the method and path are
//! resolved to a function name, the name is looked up, the query string and
//! body are merged into an argument pool, positional arguments are filled
//! from the pool, and the call is handed to the session on a spawned task.
//! Whatever happens, exactly one response goes back through the
//! [`ResponseSink`].

use crate::config::StartOptions;
use crate::error::{json_response, text_response, GatewayError, GatewayResult};
use crate::pool::ArgumentPool;
use crate::resolver::resolve;
use crate::sink::ResponseSink;
use crate::table::ProcedureTable;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use bytes::Bytes;
use nvim_http_core::{ApiInfo, Argument, FunctionInfo, HandleArgument, RpcError, RpcResponse, RpcSession};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// HTTP front for one RPC session
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    procedures: ProcedureTable,
    session: Arc<dyn RpcSession>,
    request_timeout: Duration,
}

/// A validated call, ready to be invoked
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCall {
    pub name: String,
    pub arguments: Vec<Argument>,
}

impl Gateway {
    /// Create a gateway over `session`, indexing the functions in `info`
    pub fn new<S>(info: &ApiInfo, session: S, options: &StartOptions) -> Self
    where
        S: RpcSession + 'static,
    {
        Self::with_timeout(info, session, options.request_timeout())
    }

    /// Create a gateway with an explicit per-call timeout
    pub fn with_timeout<S>(info: &ApiInfo, session: S, request_timeout: Duration) -> Self
    where
        S: RpcSession + 'static,
    {
        let procedures = ProcedureTable::from_api_info(info);
        info!("Gateway indexed {} remote functions", procedures.len());

        Self {
            inner: Arc::new(GatewayInner {
                procedures,
                session: Arc::new(session),
                request_timeout,
            }),
        }
    }

    pub fn procedures(&self) -> &ProcedureTable {
        &self.inner.procedures
    }

    pub fn request_timeout(&self) -> Duration {
        self.inner.request_timeout
    }

    /// Axum router sending every request to this gateway.
    ///
    /// Request bodies are not size-capped; buffer replacements can be large.
    pub fn router(&self) -> Router {
        Router::new()
            .fallback(handle_request)
            .layer(DefaultBodyLimit::disable())
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone())
    }

    /// Handle one request and produce its response
    pub async fn handle(&self, method: Method, uri: Uri, body: Bytes) -> Response {
        info!("Got request: {} {}", method, uri);

        let (sink, receiver) = ResponseSink::channel();
        match self.prepare(&method, &uri, &body) {
            Ok(call) => self.dispatch(call, sink),
            Err(err) => {
                info!("Rejected {} {}: {}", method, uri, err);
                sink.complete(err.into_response());
            }
        }

        match receiver.await {
            Ok(response) => response,
            Err(_) => {
                error!("Dispatch for {} {} ended without a response", method, uri);
                text_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Request dropped before a response was produced".to_string(),
                )
            }
        }
    }

    /// Resolve and validate a request without invoking anything
    pub fn prepare(&self, method: &Method, uri: &Uri, body: &[u8]) -> GatewayResult<PreparedCall> {
        let resolved = resolve(method, uri.path())?;
        info!("Final method name: {}", resolved.name);

        let function = self
            .inner
            .procedures
            .get(&resolved.name)
            .ok_or_else(|| GatewayError::UnknownProcedure(resolved.name.clone()))?;

        let mut pool = match uri.query() {
            Some(query) => ArgumentPool::from_query(query)?,
            None => ArgumentPool::new(),
        };
        pool.merge_body(body)?;
        debug!("Argument pool: {:?}", pool);

        let arguments = assemble_arguments(function, resolved.handles, &pool)?;
        debug!("Arguments prepared: {:?}", arguments);

        Ok(PreparedCall {
            name: resolved.name,
            arguments,
        })
    }

    fn dispatch(&self, call: PreparedCall, sink: ResponseSink) {
        let timeout = self.inner.request_timeout;
        let invocation = self.inner.session.invoke(&call.name, call.arguments);
        let name = call.name;
        debug!("Dispatching {}", name);

        tokio::spawn(async move {
            let response = match tokio::time::timeout(timeout, invocation).await {
                Ok(outcome) => map_outcome(outcome),
                Err(_) => GatewayError::Timeout(timeout.as_millis() as u64).into_response(),
            };

            let status = response.status();
            if sink.complete(response) {
                info!("Completed {} with status {}", name, status);
            } else {
                debug!("Response for {} already written, dropping late completion", name);
            }
        });
    }
}

async fn handle_request(State(gateway): State<Gateway>, method: Method, uri: Uri, body: Bytes) -> Response {
    gateway.handle(method, uri, body).await
}

/// Build the positional argument list for `function`.
///
/// Handle arguments come first; every remaining parameter is looked up in
/// `pool` by name. The first missing name fails the whole call.
pub fn assemble_arguments(
    function: &FunctionInfo,
    handles: Vec<HandleArgument>,
    pool: &ArgumentPool,
) -> GatewayResult<Vec<Argument>> {
    let mut arguments: Vec<Argument> = handles.into_iter().map(Argument::from).collect();

    for parameter in function.parameters.iter().skip(arguments.len()) {
        match pool.get(&parameter.name) {
            Some(value) => arguments.push(Argument::Value(value.clone())),
            None => return Err(GatewayError::MissingArgument(parameter.name.clone())),
        }
    }

    if arguments.len() != function.parameters.len() {
        return Err(GatewayError::ArgumentCountMismatch {
            expected: function.parameters.len(),
            found: arguments.len(),
        });
    }

    Ok(arguments)
}

/// Map the outcome of a remote call to a response.
///
/// Session-level remote errors are client errors (400), while an in-band
/// error on an otherwise successful response is still a 200.
pub fn map_outcome(outcome: Result<RpcResponse, RpcError>) -> Response {
    match outcome {
        Ok(RpcResponse {
            error: Some(error), ..
        }) => {
            let body = match error {
                Value::String(message) => message,
                other => other.to_string(),
            };
            text_response(StatusCode::OK, body)
        }
        Ok(RpcResponse { result, error: None }) => match serde_json::to_vec(&result) {
            Ok(body) => json_response(StatusCode::OK, body),
            Err(err) => text_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        },
        Err(err) => GatewayError::from(err).into_response(),
    }
}
