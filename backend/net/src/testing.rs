//! In-process HTTP origin for tests.
//!
//! Serves one object at `/video` with HEAD + `Range` support and counts
//! every request, so callers can assert on probe and fetch traffic.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;

#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub body: Bytes,
    pub report_length: bool,
    pub honor_range: bool,
    pub range_status: Option<u16>,
    pub abort_body: bool,
}

impl ServerOptions {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            report_length: true,
            honor_range: true,
            range_status: None,
            abort_body: false,
        }
    }

    /// HEAD responses carry no `Content-Length`.
    pub fn without_length(mut self) -> Self {
        self.report_length = false;
        self
    }

    /// GET answers `200` with the full body regardless of `Range`.
    pub fn ignoring_range(mut self) -> Self {
        self.honor_range = false;
        self
    }

    /// GET sends the first half of the requested bytes, then drops the
    /// connection.
    pub fn aborting_body(mut self) -> Self {
        self.abort_body = true;
        self
    }

    /// Every GET answers with `status` and an empty body.
    pub fn with_range_status(mut self, status: u16) -> Self {
        self.range_status = Some(status);
        self
    }
}

struct ServerState {
    options: ServerOptions,
    heads: AtomicUsize,
    gets: AtomicUsize,
    ranges: Mutex<Vec<String>>,
}

pub struct RangeServer {
    base_url: Url,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl RangeServer {
    /// # Panics
    ///
    /// Panics if no loopback port can be bound.
    pub async fn start(options: ServerOptions) -> Self {
        let state = Arc::new(ServerState {
            options,
            heads: AtomicUsize::new(0),
            gets: AtomicUsize::new(0),
            ranges: Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route("/video", get(serve_range).head(serve_head))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("test listener address");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let server = axum::serve(listener, router).with_graceful_shutdown(async {
            shutdown_rx.await.ok();
        });
        tokio::spawn(async move {
            let _ = server.await;
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}")).expect("test server url"),
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn url(&self) -> Url {
        self.base_url.join("/video").expect("video url")
    }

    pub fn head_count(&self) -> usize {
        self.state.heads.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> usize {
        self.state.gets.load(Ordering::SeqCst)
    }

    /// `Range` header values in arrival order.
    pub fn ranges(&self) -> Vec<String> {
        self.state
            .ranges
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Drop for RangeServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_head(State(state): State<Arc<ServerState>>) -> Response {
    state.heads.fetch_add(1, Ordering::SeqCst);
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT_RANGES, "bytes".parse().unwrap());
    if state.options.report_length {
        headers.insert(
            header::CONTENT_LENGTH,
            state.options.body.len().to_string().parse().unwrap(),
        );
    }
    (StatusCode::OK, headers).into_response()
}

async fn serve_range(State(state): State<Arc<ServerState>>, req_headers: HeaderMap) -> Response {
    state.gets.fetch_add(1, Ordering::SeqCst);
    let range = req_headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if let (Some(r), Ok(mut log)) = (&range, state.ranges.lock()) {
        log.push(r.clone());
    }

    if let Some(status) = state.options.range_status {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return status.into_response();
    }

    let body = &state.options.body;
    let parsed = range.as_deref().and_then(|r| parse_range(r, body.len() as u64));
    match parsed {
        Some((start, end)) if state.options.honor_range => {
            let mut headers = HeaderMap::new();
            headers.insert(
                header::CONTENT_RANGE,
                format!("bytes {start}-{end}/{}", body.len()).parse().unwrap(),
            );
            let slice = body.slice(start as usize..=end as usize);
            if state.options.abort_body {
                return (StatusCode::PARTIAL_CONTENT, headers, aborted(slice)).into_response();
            }
            (StatusCode::PARTIAL_CONTENT, headers, slice).into_response()
        }
        _ => (StatusCode::OK, body.clone()).into_response(),
    }
}

fn aborted(slice: Bytes) -> Body {
    let half = slice.slice(..slice.len() / 2);
    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(half),
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "origin went away",
        )),
    ];
    Body::from_stream(futures::stream::iter(chunks))
}

fn parse_range(value: &str, len: u64) -> Option<(u64, u64)> {
    let spec = value.strip_prefix("bytes=")?;
    let (start, end) = spec.split_once('-')?;
    let start: u64 = start.parse().ok()?;
    let end = if end.is_empty() {
        len.checked_sub(1)?
    } else {
        end.parse::<u64>().ok()?.min(len.checked_sub(1)?)
    };
    (start <= end).then_some((start, end))
}
