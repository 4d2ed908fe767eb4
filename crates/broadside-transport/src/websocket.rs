//! WebSocket transport implementation using `tokio-tungstenite`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{
    ErrorResponse, Request, Response,
};
use tokio_tungstenite::tungstenite::http::{StatusCode, header};

use crate::{Connection, ConnectionId, Handshake, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Upper bound on how long a peer may take to complete the upgrade.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

type WsStream = WebSocketStream<TcpStream>;

/// Upgrade-request rules for the WebSocket listener.
#[derive(Debug, Clone)]
pub struct WebSocketConfig {
    /// The only request path that may be upgraded. A trailing slash is
    /// ignored when comparing, and the query string is never considered.
    pub path: String,

    /// Origins allowed to connect. `"*"` admits every origin. Requests
    /// without an `Origin` header (native clients) are always admitted.
    pub allowed_origins: Vec<String>,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            allowed_origins: vec!["*".to_string()],
        }
    }
}

impl WebSocketConfig {
    /// Returns `true` if `origin` is on the allow-list.
    pub fn origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed == origin)
    }

    /// Returns `true` if `requested` names the configured path.
    pub fn path_matches(&self, requested: &str) -> bool {
        requested.trim_end_matches('/') == self.path.trim_end_matches('/')
    }

    fn check_request(&self, req: &Request) -> Result<(), (StatusCode, String)> {
        let path = req.uri().path();
        if !self.path_matches(path) {
            return Err((StatusCode::NOT_FOUND, format!("no route for {path}")));
        }
        if let Some(origin) = req.headers().get(header::ORIGIN) {
            let allowed = origin
                .to_str()
                .map(|o| self.origin_allowed(o))
                .unwrap_or(false);
            if !allowed {
                return Err((
                    StatusCode::FORBIDDEN,
                    "origin not allowed".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: TcpListener,
    config: Arc<WebSocketConfig>,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(
        addr: &str,
        config: WebSocketConfig,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, path = %config.path, "WebSocket transport listening");
        Ok(Self {
            listener,
            config: Arc::new(config),
        })
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for WebSocketTransport {
    type Handshake = WebSocketHandshake;
    type Error = TransportError;

    /// Accepts the next TCP stream. The upgrade itself happens in
    /// [`WebSocketHandshake::complete`].
    async fn accept(&mut self) -> Result<Self::Handshake, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        Ok(WebSocketHandshake {
            stream,
            addr,
            config: Arc::clone(&self.config),
        })
    }
}

/// An accepted TCP stream waiting for its WebSocket upgrade.
pub struct WebSocketHandshake {
    stream: TcpStream,
    addr: SocketAddr,
    config: Arc<WebSocketConfig>,
}

impl WebSocketHandshake {
    /// Returns the remote peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Handshake for WebSocketHandshake {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    /// Runs the upgrade, enforcing the path and origin rules. Gives up
    /// after `HANDSHAKE_TIMEOUT`.
    async fn complete(self) -> Result<Self::Connection, Self::Error> {
        let Self {
            stream,
            addr,
            config,
        } = self;

        let callback =
            |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                match config.check_request(req) {
                    Ok(()) => Ok(resp),
                    Err((status, reason)) => {
                        tracing::debug!(%addr, %status, %reason, "rejecting upgrade");
                        let mut rejection = ErrorResponse::new(Some(reason));
                        *rejection.status_mut() = status;
                        Err(rejection)
                    }
                }
            };

        let ws = tokio::time::timeout(
            HANDSHAKE_TIMEOUT,
            tokio_tungstenite::accept_hdr_async(stream, callback),
        )
        .await
        .map_err(|_| TransportError::HandshakeTimedOut(addr))?
        .map_err(|e| {
            TransportError::AcceptFailed(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                e,
            ))
        })?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %addr, "accepted WebSocket connection");

        let (sink, stream) = ws.split();
        Ok(WebSocketConnection {
            id,
            addr,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }
}

/// A single WebSocket connection.
///
/// The socket is split so a handler can wait on `recv` while another
/// branch of the same `select!` sends.
pub struct WebSocketConnection {
    id: ConnectionId,
    addr: SocketAddr,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl WebSocketConnection {
    /// Returns the remote peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    /// Sends UTF-8 payloads as text frames and anything else as binary.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let msg = match std::str::from_utf8(data) {
            Ok(text) => Message::text(text.to_owned()),
            Err(_) => Message::Binary(data.to_vec().into()),
        };
        self.sink.lock().await.send(msg).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_str().as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
