//! WebSocket server hosting tactical combat sessions.
//!
//! Protocol: every message is JSON, tagged by `"type"` (see the `protocol`
//! crate). The first message on a freshly opened socket must be
//! `authenticate`; nothing else is accepted until that succeeds.

mod auth;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tower_http::cors::CorsLayer;

use connection_manager::{heartbeat, ConnectionManager};
use core_types::{CloseReason, SessionId, UserId};
use protocol::{decode_client_message, ClientMessage, ErrorCode, ServerMessage};
use session_coordinator::{CoordinatorError, CoordinatorHandle, SessionRegistry};
use session_store::{MemoryStore, SessionStore, SledStore};

use auth::{AuthVerifier, DevAuthVerifier};

fn error_code_for(err: &CoordinatorError) -> ErrorCode {
    match err {
        CoordinatorError::SessionFull => ErrorCode::SessionFull,
        CoordinatorError::AlreadyJoined => ErrorCode::AlreadyJoined,
        CoordinatorError::NotAPlayer => ErrorCode::InvalidMessage,
        CoordinatorError::NotInLobby => ErrorCode::NotInLobby,
        CoordinatorError::NotReady => ErrorCode::NotReady,
        CoordinatorError::NotTheDm => ErrorCode::NotTheDm,
        CoordinatorError::SessionEnded => ErrorCode::InvalidMessage,
        CoordinatorError::Store(_) => ErrorCode::Internal,
        CoordinatorError::Sim(_) => ErrorCode::InvalidMessage,
    }
}

const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
struct AppState {
    registry: Arc<SessionRegistry>,
    store: Arc<dyn SessionStore>,
    connections: Arc<ConnectionManager>,
    auth: Arc<dyn AuthVerifier>,
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

struct ConnectedSession {
    session_id: SessionId,
    handle: CoordinatorHandle,
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let user_id = match authenticate(&mut socket, &state).await {
        Some(id) => id,
        None => return,
    };

    let mut registered = state.connections.register(user_id);
    let _ = state.connections.send(user_id, ServerMessage::Authenticated { user_id });

    let (pong_tx, pong_rx) = mpsc::channel(1);
    let heartbeat_task = tokio::spawn(heartbeat::run(state.connections.clone(), user_id, pong_rx));

    let mut current: Option<ConnectedSession> = None;

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let _ = pong_tx.try_send(());
                        if text.len() > protocol::MAX_MESSAGE_BYTES {
                            let _ = state.connections.send(user_id, ServerMessage::Closing { reason: CloseReason::PayloadTooLarge });
                            break;
                        }
                        handle_client_message(&state, user_id, &mut current, &text).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // binary/ping/pong frames are handled by axum already
                    Some(Err(_)) => break,
                }
            }
            outbound = registered.outbox_rx.recv() => {
                match outbound {
                    Some(message) => {
                        let json = serde_json::to_string(&message).expect("ServerMessage always serializes");
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            reason = &mut registered.kill_rx => {
                if let Ok(reason) = reason {
                    let json = serde_json::to_string(&ServerMessage::Closing { reason }).unwrap();
                    let _ = socket.send(Message::Text(json.into())).await;
                }
                break;
            }
        }
    }

    heartbeat_task.abort();
    state.connections.unregister(user_id);
    if let Some(session) = current {
        session.handle.disconnected(user_id).await;
    }
}

async fn authenticate(socket: &mut WebSocket, state: &AppState) -> Option<UserId> {
    let first = timeout(AUTH_TIMEOUT, socket.recv()).await.ok()??.ok()?;
    let Message::Text(text) = first else {
        return None;
    };
    let ClientMessage::Authenticate { token } = decode_client_message(&text).ok()? else {
        send_error(socket, ErrorCode::AuthRequired, "first message must be authenticate").await;
        return None;
    };
    match state.auth.verify(&token) {
        Ok(user_id) => Some(user_id),
        Err(_) => {
            send_error(socket, ErrorCode::AuthFailed, "invalid token").await;
            None
        }
    }
}

async fn send_error(socket: &mut WebSocket, code: ErrorCode, message: &str) {
    let msg = ServerMessage::Error { code, message: message.to_string() };
    let json = serde_json::to_string(&msg).unwrap();
    let _ = socket.send(Message::Text(json.into())).await;
}

async fn handle_client_message(state: &AppState, user_id: UserId, current: &mut Option<ConnectedSession>, text: &str) {
    let message = match decode_client_message(text) {
        Ok(m) => m,
        Err(err) => {
            let _ = state.connections.send(
                user_id,
                ServerMessage::Error { code: ErrorCode::from(&err), message: err.to_string() },
            );
            return;
        }
    };

    match message {
        ClientMessage::Authenticate { .. } => {
            let _ = state.connections.send(
                user_id,
                ServerMessage::Error { code: ErrorCode::InvalidMessage, message: "already authenticated".into() },
            );
        }
        ClientMessage::CreateGame { config } => {
            if let Err(err) = config.validate() {
                let _ = state.connections.send(
                    user_id,
                    ServerMessage::Error { code: ErrorCode::InvalidMessage, message: err.to_string() },
                );
                return;
            }
            match state
                .registry
                .create_session(config, user_id, state.store.clone(), state.connections.clone())
                .await
            {
                Ok((session_id, join_code, handle)) => {
                    let _ = handle.join(user_id, None).await;
                    let _ = state.connections.send(user_id, ServerMessage::SessionJoined { session_id, join_code });
                    *current = Some(ConnectedSession { session_id, handle });
                }
                Err(err) => {
                    let _ = state.connections.send(
                        user_id,
                        ServerMessage::Error { code: error_code_for(&err), message: err.to_string() },
                    );
                }
            }
        }
        ClientMessage::JoinGame { join_code, character_id } => {
            let Some((session_id, handle)) = state.registry.get_by_join_code(&join_code) else {
                let _ = state.connections.send(
                    user_id,
                    ServerMessage::Error { code: ErrorCode::SessionNotFound, message: join_code },
                );
                return;
            };
            match handle.join(user_id, character_id).await {
                Ok(()) => {
                    let _ = state.connections.send(user_id, ServerMessage::SessionJoined { session_id, join_code });
                    *current = Some(ConnectedSession { session_id, handle });
                }
                Err(err) => {
                    let _ = state.connections.send(
                        user_id,
                        ServerMessage::Error { code: error_code_for(&err), message: err.to_string() },
                    );
                }
            }
        }
        ClientMessage::LeaveGame => {
            if let Some(session) = current.take() {
                session.handle.leave(user_id).await;
            }
        }
        ClientMessage::Ready { ready } => {
            if let Some(session) = current.as_ref() {
                session.handle.set_ready(user_id, ready).await;
            }
        }
        ClientMessage::StartGame => {
            if let Some(session) = current.as_ref() {
                if let Err(err) = session.handle.start_game(user_id).await {
                    let _ = state.connections.send(
                        user_id,
                        ServerMessage::Error { code: error_code_for(&err), message: err.to_string() },
                    );
                }
            }
        }
        ClientMessage::Action { action } => {
            if let Some(session) = current.as_ref() {
                if let Err(reason) = session.handle.submit_action(user_id, action).await {
                    let _ = state.connections.send(user_id, ServerMessage::ActionRejected { reason });
                }
            }
        }
        ClientMessage::DmCommand { command } => {
            if let Some(session) = current.as_ref() {
                if let Err(err) = session.handle.submit_dm_command(user_id, command).await {
                    let _ = state.connections.send(
                        user_id,
                        ServerMessage::Error { code: error_code_for(&err), message: err.to_string() },
                    );
                }
            }
        }
        ClientMessage::RequestResync => {
            if let Some(session) = current.as_ref() {
                session.handle.request_resync(user_id).await;
            }
        }
        ClientMessage::Chat { text } => {
            if let Some(session) = current.as_ref() {
                session.handle.chat(user_id, text).await;
            }
        }
        ClientMessage::Ping => {
            let _ = state.connections.send(user_id, ServerMessage::Pong);
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn index() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html><head><title>combat session server</title></head>
<body>
<h1>Tactical combat session server</h1>
<p>Connect via WebSocket at <code>/ws</code>; the first message must be <code>{"type":"authenticate","token":"..."}</code>.</p>
</body></html>"#,
    )
}

fn build_store() -> Arc<dyn SessionStore> {
    match env::var("STORE_PATH") {
        Ok(path) => match SledStore::open(&path) {
            Ok(store) => {
                tracing::info!(path, "using sled-backed session store");
                Arc::new(store)
            }
            Err(err) => {
                tracing::error!(?err, path, "failed to open sled store, falling back to memory");
                Arc::new(MemoryStore::new())
            }
        },
        Err(_) => {
            tracing::info!("STORE_PATH not set, using in-memory session store");
            Arc::new(MemoryStore::new())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install metrics recorder");

    let state = AppState {
        registry: Arc::new(SessionRegistry::new()),
        store: build_store(),
        connections: Arc::new(ConnectionManager::new()),
        auth: Arc::new(DevAuthVerifier::default()),
    };

    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/metrics", get(move || std::future::ready(prometheus_handle.render())))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let port = env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()).unwrap_or(3030);
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap_or_else(|e| {
        eprintln!("Failed to bind to {addr}: {e}");
        eprintln!("Hint: kill the old process with `lsof -ti:{port} | xargs kill`");
        std::process::exit(1);
    });
    tracing::info!(addr, "game-server listening");
    axum::serve(listener, app).await.unwrap();
}
