//! HTTP/WebSocket surface: push-client endpoint, metric ingestion, and
//! reporting reads.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Json;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use gantry_ingest::{MetricIngestor, MetricValue};
use gantry_proto::TIME_LAYOUT;
use gantry_push::{
    Client, ClientRegistry, Envelope, PushError, PushTransport, StrategyFilter, StrategyItem,
};
use gantry_state::{LaneStateStore, LivenessTable};
use gantry_topology::TopologyResolver;

use crate::error::GatewayError;

/// Shared state behind the HTTP surface.
pub struct AppState {
    pub registry: Arc<ClientRegistry>,
    pub store: Arc<LaneStateStore>,
    pub liveness: Arc<LivenessTable>,
    pub topology: Arc<dyn TopologyResolver>,
    pub ingestor: Arc<MetricIngestor>,
    /// Applied to clients that register without their own strategy.
    pub default_strategy: Vec<StrategyItem>,
}

/// Builds the `/v1` router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/ws", get(ws_upgrade))
        .route("/push", post(push_metrics))
        .route("/stations", get(station_tree))
        .route("/stations/{id}/lanes", get(lanes_by_station))
        .route("/stations/{id}/core", get(core_by_station))
        .route("/liveness", get(liveness_map));

    Router::new()
        .nest("/v1", api)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Deserialize)]
struct WsParams {
    /// Comma-separated station identifiers.
    stations: String,
    /// Optional JSON-encoded strategy item array.
    strategy: Option<String>,
}

async fn ws_upgrade(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Result<Response, GatewayError> {
    let stations: HashSet<String> = params
        .stations
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if stations.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "at least one station subscription is required".to_string(),
        ));
    }
    let items: Vec<StrategyItem> = match params.strategy {
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|err| GatewayError::InvalidRequest(format!("bad strategy: {err}")))?,
        None => state.default_strategy.clone(),
    };
    let filter = StrategyFilter::from_items(items);
    Ok(ws.on_upgrade(move |socket| handle_push_socket(socket, state, stations, filter)))
}

/// Transport adapter writing enveloped payloads to a WebSocket sink.
struct WsTransport {
    sink: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl PushTransport for WsTransport {
    async fn send(&mut self, payload: &Value) -> Result<(), PushError> {
        let text = serde_json::to_string(payload)?;
        self.sink
            .send(Message::Text(text.into()))
            .await
            .map_err(|err| PushError::Transport(err.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.sink.close().await;
    }
}

async fn handle_push_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    stations: HashSet<String>,
    filter: StrategyFilter,
) {
    let (sink, stream) = socket.split();
    let client = state
        .registry
        .register(stations, filter, Box::new(WsTransport { sink }));
    info!(client_id = %client.id(), "push client connected");
    read_until_closed(stream, &client).await;
    client.mark_dead();
    debug!(client_id = %client.id(), "push client read side finished");
}

/// Reads inbound client messages; only a literal `"close"` payload (or the
/// socket closing) is acted on.
async fn read_until_closed(
    mut stream: impl futures::Stream<Item = Result<Message, axum::Error>> + Unpin,
    client: &Client,
) {
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if text.trim().trim_matches('"') == "close" {
                    info!(client_id = %client.id(), "push client requested close");
                    return;
                }
            }
            Ok(Message::Close(_)) | Err(_) => return,
            Ok(_) => {}
        }
    }
}

async fn push_metrics(
    State(state): State<Arc<AppState>>,
    Json(batch): Json<Vec<MetricValue>>,
) -> Json<Envelope> {
    let received = batch.len();
    state.ingestor.ingest(batch).await;
    Json(Envelope::ok(Value::from(received)))
}

async fn station_tree(State(state): State<Arc<AppState>>) -> Result<Json<Envelope>, GatewayError> {
    let tree = state.topology.station_tree();
    Ok(Json(Envelope::ok(to_value(&tree)?)))
}

async fn lanes_by_station(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, GatewayError> {
    let lanes = state.store.lanes_by_station(&id);
    Ok(Json(Envelope::ok(to_value(&lanes)?)))
}

async fn core_by_station(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, GatewayError> {
    let core = state.store.core_by_station(&id);
    Ok(Json(Envelope::ok(to_value(&core)?)))
}

async fn liveness_map(State(state): State<Arc<AppState>>) -> Result<Json<Envelope>, GatewayError> {
    let snapshot: HashMap<String, String> = state
        .liveness
        .snapshot()
        .into_iter()
        .map(|(lane, seen)| (lane, seen.format(TIME_LAYOUT).to_string()))
        .collect();
    Ok(Json(Envelope::ok(to_value(&snapshot)?)))
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, GatewayError> {
    serde_json::to_value(value).map_err(|err| {
        warn!(error = %err, "reporting payload serialization failed");
        GatewayError::Internal(err.to_string())
    })
}
