//! JSON-RPC client for the storage engine.
//!
//! The engine connection is a single ordered channel: the client holds its
//! lock across each send/receive pair so that a reply is always matched
//! against the request that produced it. The pair runs on its own task, so a
//! caller that gives up waiting never leaves a reply unread on the stream.

use std::fmt;
use std::io;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{Result, RpcError};
use crate::transport::Transport;

const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    error: Option<ReplyError>,
    #[serde(default)]
    result: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ReplyError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

struct Connection {
    transport: Box<dyn Transport>,
    last_id: u64,
}

/// Client for the engine's JSON-RPC interface.
///
/// Request IDs start at 1 and increase by one per call, including calls
/// that fail.
pub struct RpcClient {
    conn: Arc<Mutex<Connection>>,
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient").finish_non_exhaustive()
    }
}

impl RpcClient {
    /// Create a client over the given transport.
    #[must_use]
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            conn: Arc::new(Mutex::new(Connection {
                transport: Box::new(transport),
                last_id: 0,
            })),
        }
    }

    /// Call `method` with `params` and decode the result.
    ///
    /// # Errors
    ///
    /// Returns an [`RpcError`] if the exchange fails, the reply echoes the
    /// wrong ID, the engine reports an error, or the result does not decode
    /// into `R`.
    pub async fn call<P, R>(&self, method: &str, params: &P) -> Result<R>
    where
        P: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params).map_err(|source| RpcError::Encode {
            method: method.to_string(),
            source,
        })?;
        self.exchange(method, Some(params)).await
    }

    /// Call a method that takes no parameters.
    ///
    /// # Errors
    ///
    /// See [`RpcClient::call`].
    pub async fn call_without_params<R>(&self, method: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        self.exchange(method, None).await
    }

    /// ID of the most recently sent request, zero before the first call.
    pub async fn last_request_id(&self) -> u64 {
        self.conn.lock().await.last_id
    }

    async fn exchange<R>(&self, method: &str, params: Option<Value>) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let conn = Arc::clone(&self.conn);
        let owned_method = method.to_string();
        let (id, raw) = tokio::spawn(round_trip(conn, owned_method, params))
            .await
            .map_err(|e| RpcError::Transport {
                method: method.to_string(),
                source: io::Error::other(e),
            })??;

        let reply: Reply = serde_json::from_slice(&raw).map_err(|e| RpcError::Decode {
            method: method.to_string(),
            reason: format!("malformed reply: {e}"),
        })?;

        if reply.id != id {
            tracing::warn!(method = %method, sent = id, received = reply.id, "Engine reply ID mismatch");
            return Err(RpcError::ProtocolMismatch {
                method: method.to_string(),
                sent: id,
                received: reply.id,
            });
        }

        if let Some(err) = reply.error {
            if err.code != 0 {
                tracing::debug!(method = %method, code = err.code, message = %err.message, "Engine rejected request");
                return Err(RpcError::EngineRejected {
                    method: method.to_string(),
                    code: err.code,
                    message: err.message,
                });
            }
        }

        let result = reply.result.ok_or_else(|| RpcError::Decode {
            method: method.to_string(),
            reason: "reply carries no result".to_string(),
        })?;
        tracing::debug!(method = %method, id, "Received engine reply");

        serde_json::from_value(result).map_err(|e| RpcError::Decode {
            method: method.to_string(),
            reason: format!("unexpected result shape: {e}"),
        })
    }
}

/// Send one request and read its reply under the connection lock.
///
/// Runs detached from the caller so the pair always completes once started.
async fn round_trip(
    conn: Arc<Mutex<Connection>>,
    method: String,
    params: Option<Value>,
) -> Result<(u64, Vec<u8>)> {
    let mut conn = conn.lock().await;
    conn.last_id += 1;
    let id = conn.last_id;

    let request = Request {
        jsonrpc: JSONRPC_VERSION,
        id,
        method: &method,
        params,
    };
    let bytes = match serde_json::to_vec(&request) {
        Ok(bytes) => bytes,
        Err(source) => return Err(RpcError::Encode { method, source }),
    };

    tracing::debug!(method = %method, id, "Sending engine request");
    let exchanged = match conn.transport.send(&bytes).await {
        Ok(()) => conn.transport.recv().await,
        Err(e) => Err(e),
    };
    match exchanged {
        Ok(raw) => Ok((id, raw)),
        Err(source) => Err(RpcError::Transport { method, source }),
    }
}
