//! Compatibility fixes for JSON-RPC HTTP responses.
//!
//! These fixes are applied at the HTTP level, before the RPC response is parsed.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use http_body_util::{BodyExt, Limited};
use hyper::{StatusCode, header};
use jsonrpsee::core::http_helpers::HttpError;
use jsonrpsee_http_client::{
    HttpBody, HttpRequest, HttpResponse,
    transport::{Error as TransportError, HttpBackend},
};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tower::Service;

/// Upper bound on the size of a wallet reply.
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// HTTP middleware that maps the wallet's replies to JSON-RPC 2.0.
///
/// [`jsonrpsee`] only supports JSON-RPC 2.0, while Huntercoin and its successors speak
/// bitcoind's "Bitcoin JSON-RPC": replies carry no `jsonrpc` member, always include both
/// `result` and `error` (one of them `null`), and RPC errors come with HTTP status 500 or
/// 404 instead of 200.
///
/// Replies that do not parse as a JSON-RPC response are passed through untouched, so that
/// `jsonrpsee` reports them (for example a 401 for bad credentials).
#[derive(Clone, Debug)]
pub(crate) struct HttpResponseMiddleware {
    service: HttpBackend,
}

impl Service<HttpRequest<HttpBody>> for HttpResponseMiddleware {
    type Response = HttpResponse<HttpBody>;
    type Error = TransportError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: HttpRequest<HttpBody>) -> Self::Future {
        let response = self.service.call(request);

        Box::pin(async move {
            let (mut parts, body) = response.await?.into_parts();
            let bytes = Limited::new(body, MAX_RESPONSE_SIZE)
                .collect()
                .await
                .map_err(|e| TransportError::Http(HttpError::Stream(e)))?
                .to_bytes()
                .to_vec();

            let bytes = match response_to_json_rpc_2(&bytes) {
                Some(rewritten) => {
                    parts.status = StatusCode::OK;
                    parts.headers.remove(header::CONTENT_LENGTH);
                    rewritten
                }
                None => bytes,
            };

            Ok::<_, TransportError>(HttpResponse::from_parts(parts, HttpBody::from(bytes)))
        })
    }
}

/// Implements [`tower::Layer`] for [`HttpResponseMiddleware`].
#[derive(Clone, Debug, Default)]
pub(crate) struct HttpResponseMiddlewareLayer {}

impl tower::Layer<HttpBackend> for HttpResponseMiddlewareLayer {
    type Service = HttpResponseMiddleware;

    fn layer(&self, service: HttpBackend) -> Self::Service {
        HttpResponseMiddleware { service }
    }
}

/// A version-agnostic JSON-RPC response.
#[derive(Debug, Deserialize, Serialize)]
struct JsonRpcResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    jsonrpc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Box<RawValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Box<RawValue>>,
    id: serde_json::Value,
}

impl JsonRpcResponse {
    fn into_2(mut self) -> Self {
        self.jsonrpc = Some("2.0".into());
        // `null` members parse as `None`. A 2.0 reply has exactly one of the two, and a
        // successful call may legitimately return `null`.
        if self.error.is_some() {
            self.result = None;
        } else {
            self.result = self.result.or_else(|| Some(RawValue::NULL.to_owned()));
        }
        self
    }
}

/// Rewrites a single JSON-RPC response of any version as a 2.0 response.
fn response_to_json_rpc_2(bytes: &[u8]) -> Option<Vec<u8>> {
    let response = serde_json::from_slice::<JsonRpcResponse>(bytes).ok()?;
    serde_json::to_vec(&response.into_2()).ok()
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::response_to_json_rpc_2;

    fn rewrite(reply: Value) -> Option<Value> {
        response_to_json_rpc_2(reply.to_string().as_bytes())
            .map(|bytes| serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn bitcoind_success_reply() {
        assert_eq!(
            rewrite(json!({"result": {"ismine": true}, "error": null, "id": 3})),
            Some(json!({"jsonrpc": "2.0", "result": {"ismine": true}, "id": 3})),
        );
    }

    #[test]
    fn bitcoind_null_result() {
        assert_eq!(
            rewrite(json!({"result": null, "error": null, "id": 0})),
            Some(json!({"jsonrpc": "2.0", "result": null, "id": 0})),
        );
    }

    #[test]
    fn bitcoind_error_reply() {
        assert_eq!(
            rewrite(json!({
                "result": null,
                "error": {"code": -13, "message": "Please enter the wallet passphrase"},
                "id": 1,
            })),
            Some(json!({
                "jsonrpc": "2.0",
                "error": {"code": -13, "message": "Please enter the wallet passphrase"},
                "id": 1,
            })),
        );
    }

    #[test]
    fn json_rpc_2_reply_is_unchanged() {
        let reply = json!({
            "jsonrpc": "2.0",
            "result": "5Kb8kLf9zgWQnogidDA76MzPL6TsZZY36hWXMssSzNydYXYB9KF",
            "id": 7,
        });
        assert_eq!(rewrite(reply.clone()), Some(reply));
    }

    #[test]
    fn other_bodies_pass_through() {
        assert_eq!(response_to_json_rpc_2(b""), None);
        assert_eq!(response_to_json_rpc_2(b"<html>401 Unauthorized</html>"), None);
        assert_eq!(rewrite(json!([1, 2, 3])), None);
    }
}
