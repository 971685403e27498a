//! Presence endpoints: the live event stream and the admin snapshot.
//!
//! The stream is server-sent events. Authentication happens before the
//! response is committed, so a rejected handshake is an ordinary 401 and
//! never becomes a half-open stream. Once the stream is up, a guard keeps
//! the principal marked online; dropping the stream, gracefully or not,
//! drops the guard and records the offline transition.

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::{future, stream, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use stile_core::errors::{CoreError, HandshakeError};
use stile_core::repositories::{PrincipalRepository, RenewalStore};
use stile_core::services::PresenceGuard;

use crate::app::AppState;
use crate::handlers::error::error_response;

/// GET /api/v1/presence/events
pub async fn events<S, P>(
    state: web::Data<AppState<S, P>>,
    req: HttpRequest,
) -> HttpResponse
where
    S: RenewalStore + 'static,
    P: PrincipalRepository + 'static,
{
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let principal = match state.verifier.verify_bearer(bearer).await {
        Ok(principal) => principal,
        Err(CoreError::Auth(e)) => {
            return error_response(&CoreError::Handshake(HandshakeError::Rejected(e)))
        }
        Err(e) => return error_response(&e),
    };

    // Subscribe before the online transition so the subscriber sees its
    // own connect event.
    let rx = state.presence.subscribe();
    let guard = PresenceGuard::connect(state.presence.clone(), principal.id);

    let events = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        let frame = web::Bytes::from(format!("data: {}\n\n", json));
                        return Some((Ok::<_, actix_web::Error>(frame), (rx, guard)));
                    }
                    Err(e) => {
                        warn!("failed to serialize presence event: {}", e);
                        continue;
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "presence subscriber lagging");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    let opening = stream::once(future::ready(Ok(web::Bytes::from_static(
        b": connected\n\n",
    ))));

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(opening.chain(events))
}

/// GET /api/v1/presence — admin-only snapshot of the presence map
pub async fn snapshot<S, P>(state: web::Data<AppState<S, P>>) -> HttpResponse
where
    S: RenewalStore + 'static,
    P: PrincipalRepository + 'static,
{
    HttpResponse::Ok().json(serde_json::json!({
        "online": state.presence.online_count(),
        "entries": state.presence.snapshot(),
    }))
}
