use actix_web::{HttpRequest, HttpResponse, web};
use actix_ws::Message;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::auth::jwt;
use crate::auth::middleware::JwtSecret;
use crate::notify::protocol::ServerEvent;
use crate::notify::server::NotifyServer;

/// Query params for the WebSocket handshake endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// GET /api/notifications/ws?token=<jwt>
///
/// Upgrades the HTTP connection to a WebSocket and registers the user's
/// notification channel. Authenticates via query param token (browsers
/// can't send Authorization headers during the WebSocket handshake).
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<WsQuery>,
    secret: web::Data<JwtSecret>,
    notify: web::Data<Arc<NotifyServer>>,
) -> Result<HttpResponse, actix_web::Error> {
    // 1. Validate the JWT.
    let claims = jwt::validate_token(&query.token, &secret.0)
        .map_err(|e| actix_web::error::ErrorUnauthorized(format!("Invalid token: {e}")))?;

    let user_id = claims
        .user_id()
        .map_err(actix_web::error::ErrorUnauthorized)?;

    // 2. Upgrade to WebSocket.
    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;

    // 3. Register the notification channel for this user.
    let (conn_id, rx) = notify.register(user_id).await;
    tracing::debug!(%user_id, %conn_id, "notification channel registered");

    // 4. Spawn the WebSocket session task.
    let notify_clone = notify.get_ref().clone();
    actix_web::rt::spawn(handle_ws_session(
        session,
        msg_stream,
        rx,
        user_id,
        conn_id,
        notify_clone,
    ));

    Ok(response)
}

/// Drives the WebSocket session: pushes queued events to the client and
/// handles cleanup on disconnect. Notifications are one-way; inbound text
/// frames are ignored.
async fn handle_ws_session(
    mut session: actix_ws::Session,
    mut msg_stream: actix_ws::MessageStream,
    mut rx: mpsc::UnboundedReceiver<ServerEvent>,
    user_id: Uuid,
    conn_id: Uuid,
    notify: Arc<NotifyServer>,
) {
    loop {
        tokio::select! {
            // Control frames from the client.
            Some(msg) = msg_stream.next() => {
                match msg {
                    Ok(Message::Ping(bytes)) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => {
                        break;
                    }
                    Err(_) => {
                        break;
                    }
                    _ => {}
                }
            }
            // Outgoing event from the notify server to this client.
            Some(event) = rx.recv() => {
                let json = match serde_json::to_string(&event) {
                    Ok(j) => j,
                    Err(_) => continue,
                };
                if session.text(json).await.is_err() {
                    break;
                }
            }
            // Both channels closed — exit.
            else => break,
        }
    }

    // Clean up: drop this connection's channel.
    notify.deregister(user_id, conn_id).await;
    let _ = session.close(None).await;
}
