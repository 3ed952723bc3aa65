//! Server-Sent Events (SSE) stream of characteristic changes.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};

use hapdemo_app::ports::{EventPublisher, KeyValueStore};
use hapdemo_domain::event::CharacteristicEvent;

use crate::api::auth::Controller;
use crate::state::AppState;

enum Item {
    Event(CharacteristicEvent),
    Shutdown(bool),
}

/// `GET /events` — SSE stream of characteristic events.
///
/// Subscribes to the event bus and sends JSON-encoded events as SSE
/// `data:` frames. The stream ends when the client
/// disconnects or the server shuts down, so that draining connections never
/// waits on an idle subscriber.
pub async fn stream<S, P>(
    State(state): State<AppState<S, P>>,
    Controller(controller): Controller,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    S: KeyValueStore + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    tracing::debug!(controller = %controller.controller, "event stream opened");
    let events = state.event_bus.subscribe("sse").into_stream().map(Item::Event);
    let shutdown = WatchStream::new(state.shutdown.receiver()).map(Item::Shutdown);

    let stream = events
        .merge(shutdown)
        .take_while(|item| !matches!(item, Item::Shutdown(true)))
        .filter_map(|item| match item {
            Item::Event(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().data(json))),
                Err(err) => {
                    tracing::warn!(%err, "failed to serialize event to JSON for SSE stream");
                    None
                }
            },
            Item::Shutdown(_) => None,
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
