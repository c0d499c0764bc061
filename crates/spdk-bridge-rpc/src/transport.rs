//! Byte transports to the storage engine.
//!
//! The engine speaks newline-agnostic JSON over a stream socket: one request
//! value out, one reply value back. [`StreamTransport`] frames replies by
//! reading until a complete JSON value is buffered.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use serde::de::IgnoredAny;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Default Unix socket the engine listens on.
pub const DEFAULT_SOCKET_PATH: &str = "/var/tmp/spdk.sock";

const READ_CHUNK: usize = 4096;

/// A bidirectional byte channel to the engine.
///
/// One `send` is always followed by exactly one `recv` under the client's
/// lock, so implementations do not need to pair requests and replies.
#[async_trait]
pub trait Transport: Send {
    /// Write one encoded request.
    async fn send(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Read one encoded reply.
    async fn recv(&mut self) -> io::Result<Vec<u8>>;
}

/// A transport over any async byte stream.
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: S,
    buffer: Vec<u8>,
}

impl<S> StreamTransport<S> {
    /// Wrap an already-connected stream.
    #[must_use]
    pub const fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
        }
    }
}

#[cfg(unix)]
impl StreamTransport<tokio::net::UnixStream> {
    /// Connect to the engine's Unix domain socket.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be connected.
    pub async fn connect_unix(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let stream = tokio::net::UnixStream::connect(path).await?;
        tracing::info!(path = %path.display(), "Connected to engine socket");
        Ok(Self::new(stream))
    }
}

impl StreamTransport<tokio::net::TcpStream> {
    /// Connect to the engine over TCP.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be connected.
    pub async fn connect_tcp(addr: &str) -> io::Result<Self> {
        let stream = tokio::net::TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        tracing::info!(addr = %addr, "Connected to engine over TCP");
        Ok(Self::new(stream))
    }
}

#[async_trait]
impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await
    }

    async fn recv(&mut self) -> io::Result<Vec<u8>> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(len) = complete_value_len(&self.buffer) {
                return Ok(self.buffer.drain(..len).collect());
            }
            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                self.buffer.clear();
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "EOF"));
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }
}

/// Length of the first complete JSON value in `buf`, if there is one.
///
/// Malformed input is handed back whole so the caller's decoder reports it.
fn complete_value_len(buf: &[u8]) -> Option<usize> {
    let mut values = serde_json::Deserializer::from_slice(buf).into_iter::<IgnoredAny>();
    match values.next() {
        Some(Ok(_)) => Some(values.byte_offset()),
        Some(Err(e)) if e.is_eof() => None,
        Some(Err(_)) => Some(buf.len()),
        None => None,
    }
}

/// Scripted transport for tests.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::collections::VecDeque;
    use std::io;
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::Value;

    use super::Transport;

    #[derive(Debug, Default)]
    struct MockState {
        replies: VecDeque<String>,
        requests: Vec<Value>,
        last_id: Option<u64>,
    }

    /// A transport that answers from a script of reply templates.
    ///
    /// Each `{id}` in a template is replaced with the ID of the request just
    /// sent. An empty template, or running out of templates, reads as EOF.
    /// Clones share the same script and request log.
    #[derive(Debug, Clone, Default)]
    pub struct MockTransport {
        state: Arc<Mutex<MockState>>,
    }

    impl MockTransport {
        /// Create a transport with an empty script.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a transport with the given reply templates.
        #[must_use]
        pub fn with_replies<I, R>(replies: I) -> Self
        where
            I: IntoIterator<Item = R>,
            R: Into<String>,
        {
            let mock = Self::new();
            for reply in replies {
                mock.push_reply(reply);
            }
            mock
        }

        /// Append a reply template to the script.
        pub fn push_reply(&self, reply: impl Into<String>) {
            self.state.lock().replies.push_back(reply.into());
        }

        /// Every request sent so far, decoded.
        #[must_use]
        pub fn requests(&self) -> Vec<Value> {
            self.state.lock().requests.clone()
        }

        /// Method names of every request sent so far, in order.
        #[must_use]
        pub fn methods(&self) -> Vec<String> {
            self.state
                .lock()
                .requests
                .iter()
                .filter_map(|r| r.get("method").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        }

        /// Number of requests sent so far.
        #[must_use]
        pub fn call_count(&self) -> usize {
            self.state.lock().requests.len()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
            let request: Value = serde_json::from_slice(bytes)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            let mut state = self.state.lock();
            state.last_id = request.get("id").and_then(Value::as_u64);
            state.requests.push(request);
            Ok(())
        }

        async fn recv(&mut self) -> io::Result<Vec<u8>> {
            let mut state = self.state.lock();
            let template = state.replies.pop_front().unwrap_or_default();
            if template.is_empty() {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "EOF"));
            }
            let id = state.last_id.unwrap_or_default().to_string();
            Ok(template.replace("{id}", &id).into_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_value_detection() {
        assert_eq!(complete_value_len(b""), None);
        assert_eq!(complete_value_len(b"  "), None);
        assert_eq!(complete_value_len(br#"{"id":1,"res"#), None);
        assert_eq!(complete_value_len(br#"{"id":1}"#), Some(8));
        assert_eq!(complete_value_len(br#"{"id":1}{"id":2}"#), Some(8));
        assert_eq!(complete_value_len(b"}garbage"), Some(8));
    }

    #[tokio::test]
    async fn stream_transport_frames_split_replies() {
        let (client, mut server) = tokio::io::duplex(64);
        let mut transport = StreamTransport::new(client);

        transport.send(br#"{"id":1}"#).await.unwrap();
        let mut got = [0u8; 8];
        server.read_exact(&mut got).await.unwrap();
        assert_eq!(&got, br#"{"id":1}"#);

        server.write_all(br#"{"id":1,"#).await.unwrap();
        server.write_all(br#""result":true}{"id":2}"#).await.unwrap();
        let first = transport.recv().await.unwrap();
        assert_eq!(first, br#"{"id":1,"result":true}"#.to_vec());
        let second = transport.recv().await.unwrap();
        assert_eq!(second, br#"{"id":2}"#.to_vec());
    }

    #[tokio::test]
    async fn stream_transport_eof() {
        let (client, server) = tokio::io::duplex(64);
        drop(server);
        let mut transport = StreamTransport::new(client);
        let err = transport.recv().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(err.to_string(), "EOF");
    }

    #[tokio::test]
    async fn mock_substitutes_request_id() {
        let mut mock = mock::MockTransport::with_replies([r#"{"id":{id},"result":true}"#, ""]);
        mock.send(br#"{"jsonrpc":"2.0","id":7,"method":"m"}"#)
            .await
            .unwrap();
        let reply = mock.recv().await.unwrap();
        assert_eq!(reply, br#"{"id":7,"result":true}"#.to_vec());

        mock.send(br#"{"jsonrpc":"2.0","id":8,"method":"m"}"#)
            .await
            .unwrap();
        let err = mock.recv().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(mock.methods(), vec!["m", "m"]);
    }
}
