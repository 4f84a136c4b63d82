// MCP over server-sent events: one stream per client, requests posted separately

use super::{ApiError, ApiResult};
use crate::config::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde::Deserialize;
use smartlead_mcp::protocol::JsonRpcResponse;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

const SESSION_BUFFER: usize = 32;
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Open SSE sessions, keyed by the id handed out in the `endpoint` event
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, mpsc::Sender<JsonRpcResponse>>>>,
}

impl SessionRegistry {
    fn open(&self) -> (Uuid, mpsc::Receiver<JsonRpcResponse>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, tx);
        (id, rx)
    }

    fn sender(&self, id: &Uuid) -> Option<mpsc::Sender<JsonRpcResponse>> {
        self.sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    fn close(&self, id: &Uuid) {
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id);
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Removes the session once its stream is dropped
struct SessionGuard {
    id: Uuid,
    registry: SessionRegistry,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.close(&self.id);
        info!(session = %self.id, "SSE client disconnected");
    }
}

/// GET /sse
pub async fn open_session(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (id, mut rx) = state.sessions.open();
    info!(session = %id, "SSE client connected");

    let guard = SessionGuard {
        id,
        registry: state.sessions.clone(),
    };
    let endpoint = format!("/message?sessionId={}", id);

    let stream = async_stream::stream! {
        let _guard = guard;
        yield Ok(Event::default().event("endpoint").data(endpoint));

        while let Some(response) = rx.recv().await {
            match serde_json::to_string(&response) {
                Ok(data) => yield Ok(Event::default().event("message").data(data)),
                Err(e) => warn!(session = %id, error = %e, "Dropping unserializable response"),
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL).text("ping"))
}

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
}

/// POST /message?sessionId=...; the answer goes out on the session's stream
pub async fn post_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> ApiResult<StatusCode> {
    let sender = state
        .sessions
        .sender(&query.session_id)
        .ok_or_else(|| ApiError::not_found(format!("Unknown session: {}", query.session_id)))?;

    let mcp = state.mcp.clone();
    let session = query.session_id;
    tokio::spawn(async move {
        if let Some(response) = mcp.handle_message(&body).await {
            if sender.send(response).await.is_err() {
                debug!(session = %session, "Session closed before response was sent");
            }
        }
    });

    Ok(StatusCode::ACCEPTED)
}
