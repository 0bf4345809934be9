use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use events::TripEvent;
use futures::stream::{SplitSink, SplitStream};
use futures::StreamExt;
use hub::message::{ClientMessage, Envelope};
use hub::{Filter, PumpExit, Session, SubscriptionId};
use log::*;
use service::AppState;
use tokio_util::sync::CancellationToken;

/// Upgrade a driver connection and hand it to its own hub session.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let session = Session::open(app_state.hub.clone(), Filter::Nothing)
        .with_max_lifetime(app_state.config.max_session_lifetime());
    let id = session.id().clone();
    let cancel = session.cancel_token();
    debug!("Driver channel opened for subscription {id}");

    let (sink, stream) = socket.split();
    let pump = tokio::spawn(pump_events(session, sink));

    read_messages(&app_state, &id, &cancel, stream).await;

    // Stops the pump if the read side finished first.
    cancel.cancel();
    match pump.await {
        Ok(exit) => debug!("Driver channel {id} closed ({exit:?})"),
        Err(e) => error!("Writer task of driver channel {id} failed: {e}"),
    }
}

async fn pump_events(mut session: Session, mut sink: SplitSink<WebSocket, Message>) -> PumpExit {
    let exit = session.pump(&mut sink, encode).await;
    session.close();
    exit
}

fn encode(trip_event: &TripEvent) -> Option<Message> {
    match Envelope::from(trip_event).to_json() {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            error!("Failed to serialize {} event: {e}", trip_event.kind());
            None
        }
    }
}

async fn read_messages(
    app_state: &AppState,
    id: &SubscriptionId,
    cancel: &CancellationToken,
    mut stream: SplitStream<WebSocket>,
) {
    loop {
        let message = tokio::select! {
            _ = cancel.cancelled() => break,
            message = stream.next() => message,
        };

        match message {
            Some(Ok(Message::Text(text))) => handle_client_message(app_state, id, text.as_str()),
            Some(Ok(Message::Close(_))) | None => {
                debug!("Driver closed channel {id}");
                break;
            }
            Some(Ok(Message::Binary(bytes))) => {
                warn!(
                    "Ignoring {} byte binary frame on driver channel {id}",
                    bytes.len()
                );
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
            Some(Err(e)) => {
                warn!("Read from driver channel {id} failed: {e}");
                break;
            }
        }
    }
}

fn handle_client_message(app_state: &AppState, id: &SubscriptionId, text: &str) {
    match ClientMessage::parse(text) {
        Ok(ClientMessage::Subscribe { driver_id }) => {
            if app_state.hub.update_filter(id, Filter::Driver(driver_id)) {
                info!("Subscription {id} now follows driver {driver_id}");
            }
        }
        Ok(ClientMessage::UpdateLocation {
            trip_id,
            latitude,
            longitude,
        }) => {
            if let Err(e) = domain::trip::update_location(
                app_state.store_ref(),
                &app_state.event_publisher,
                trip_id,
                latitude,
                longitude,
            ) {
                warn!("Location update for trip {trip_id} from {id} rejected: {e:?}");
            }
        }
        Err(e) => warn!("Ignoring malformed message on driver channel {id}: {e}"),
    }
}
