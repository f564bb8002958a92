//! RPC session abstraction.
//!
//! The gateway never speaks msgpack-RPC itself. Whatever owns the editor
//! connection implements [`RpcSession`] and hands it to the gateway together
//! with the [`ApiInfo`](crate::ApiInfo) snapshot it already fetched.

use crate::error::RpcError;
use crate::handle::Argument;
use futures_util::future::BoxFuture;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Answer to a remote call that reached the editor
#[derive(Debug, Clone, PartialEq)]
pub struct RpcResponse {
    /// Result value (`null` for void functions)
    pub result: Value,
    /// In-band error carried next to the result
    pub error: Option<Value>,
}

impl RpcResponse {
    /// Successful response
    pub fn ok(result: Value) -> Self {
        Self {
            result,
            error: None,
        }
    }

    /// Response carrying an in-band error
    pub fn with_error(error: Value) -> Self {
        Self {
            result: Value::Null,
            error: Some(error),
        }
    }
}

/// A connected RPC session able to invoke remote functions.
///
/// Implementations must tolerate concurrent calls; request/response
/// correlation is theirs to handle.
pub trait RpcSession: Send + Sync {
    /// Invoke `method` with positional `args`
    fn invoke(&self, method: &str, args: Vec<Argument>) -> BoxFuture<'static, Result<RpcResponse, RpcError>>;
}

impl<T: RpcSession + ?Sized> RpcSession for Arc<T> {
    fn invoke(&self, method: &str, args: Vec<Argument>) -> BoxFuture<'static, Result<RpcResponse, RpcError>> {
        (**self).invoke(method, args)
    }
}

/// Session backed by a closure
pub struct FnSession<F> {
    handler: F,
}

/// Wrap a closure as an [`RpcSession`]
pub fn session_fn<F, Fut>(handler: F) -> FnSession<F>
where
    F: Fn(String, Vec<Argument>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RpcResponse, RpcError>> + Send + 'static,
{
    FnSession { handler }
}

impl<F, Fut> RpcSession for FnSession<F>
where
    F: Fn(String, Vec<Argument>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RpcResponse, RpcError>> + Send + 'static,
{
    fn invoke(&self, method: &str, args: Vec<Argument>) -> BoxFuture<'static, Result<RpcResponse, RpcError>> {
        Box::pin((self.handler)(method.to_string(), args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::HandleArgument;
    use serde_json::json;

    #[tokio::test]
    async fn test_fn_session() {
        let session = session_fn(|method, args| async move {
            Ok::<_, RpcError>(RpcResponse::ok(json!({"method": method, "argc": args.len()})))
        });

        let response = session
            .invoke("nvim_buf_line_count", vec![HandleArgument::Buffer(1).into()])
            .await
            .unwrap();
        assert_eq!(response.result, json!({"method": "nvim_buf_line_count", "argc": 1}));
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_arc_session() {
        let session: Arc<dyn RpcSession> = Arc::new(session_fn(|_, _| async {
            Err::<RpcResponse, _>(RpcError::transport("closed"))
        }));

        let err = session.invoke("nvim_get_mode", Vec::new()).await.unwrap_err();
        assert!(matches!(err, RpcError::Transport(_)));
    }
}
