use async_stream::stream;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use events::TripEvent;
use hub::message::{Envelope, CONNECTED_EVENT, CONNECTED_MARKER, MESSAGE_EVENT};
use hub::{Filter, Session};
use log::*;
use service::AppState;
use std::convert::Infallible;

/// SSE handler streaming every trip event to an admin observer.
///
/// The session is owned by the response stream, so the subscription is
/// released as soon as the client goes away or the hub shuts down.
pub(crate) async fn stream_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    let mut session = Session::open(app_state.hub.clone(), Filter::All)
        .with_max_lifetime(app_state.config.max_session_lifetime());
    debug!("Establishing SSE connection for subscription {}", session.id());

    let stream = stream! {
        yield Ok::<Event, Infallible>(connected_event());

        while let Some(trip_event) = session.next_event().await {
            if let Some(event) = message_event(&trip_event) {
                yield Ok(event);
            }
        }

        debug!("SSE stream for subscription {} ended", session.id());
    };

    let keep_alive = KeepAlive::new().interval(app_state.config.sse_keep_alive());

    (
        [("x-accel-buffering", "no")],
        Sse::new(stream).keep_alive(keep_alive),
    )
}

fn connected_event() -> Event {
    Event::default()
        .event(CONNECTED_EVENT)
        .data(format!("\"{CONNECTED_MARKER}\""))
}

fn message_event(trip_event: &TripEvent) -> Option<Event> {
    match Envelope::from(trip_event).to_json() {
        Ok(json) => Some(Event::default().event(MESSAGE_EVENT).data(json)),
        Err(e) => {
            error!("Failed to serialize {} event: {e}", trip_event.kind());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::router::define_routes;
    use crate::test_support::{app_state, empty_request};
    use axum::http::{header, Method, StatusCode};
    use domain::trip_status::TripStatus;
    use events::TripEvent;
    use futures::StreamExt;
    use std::time::Duration;
    use tokio::time::timeout;
    use tower::ServiceExt;

    const WAIT: Duration = Duration::from_secs(2);

    fn trip(id: domain::Id, driver_id: domain::Id) -> domain::trips::Model {
        domain::trips::Model {
            id,
            dispatch_id: 1,
            driver_id,
            vehicle_id: 2,
            destination: "Karen".to_string(),
            recipient_name: "Kamau".to_string(),
            status: TripStatus::InProgress,
            latitude: -1.31,
            longitude: 36.7,
            last_updated: chrono::Utc::now(),
        }
    }

    /// Read body frames until `needle` shows up, returning everything read.
    async fn read_until(body: &mut axum::body::BodyDataStream, needle: &str) -> String {
        let mut seen = String::new();
        while !seen.contains(needle) {
            let chunk = timeout(WAIT, body.next())
                .await
                .expect("timed out waiting for SSE frame")
                .expect("stream ended early")
                .unwrap();
            seen.push_str(std::str::from_utf8(&chunk).unwrap());
        }
        seen
    }

    #[tokio::test]
    async fn stream_opens_with_connected_frame_and_headers() {
        let app_state = app_state();
        let hub = app_state.hub.clone();

        let response = define_routes(app_state)
            .oneshot(empty_request(Method::GET, "/admin/trips/stream"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
        assert_eq!(headers["x-accel-buffering"], "no");

        let mut body = response.into_body().into_data_stream();
        let frame = read_until(&mut body, "\n\n").await;
        assert!(frame.contains("event: connected"));
        assert!(frame.contains("data: \"SSE connected\""));
        assert_eq!(hub.subscription_count(), 1);
    }

    #[tokio::test]
    async fn stream_delivers_every_trip_in_publish_order() {
        let app_state = app_state();
        let hub = app_state.hub.clone();

        let response = define_routes(app_state)
            .oneshot(empty_request(Method::GET, "/admin/trips/stream"))
            .await
            .unwrap();
        let mut body = response.into_body().into_data_stream();
        read_until(&mut body, "SSE connected").await;

        hub.publish(TripEvent::location_changed(trip(1, 7)));
        hub.publish(TripEvent::completed(trip(2, 8)));

        let frames = read_until(&mut body, "trip_completed").await;
        let location = frames.find("location_update").unwrap();
        let completed = frames.find("trip_completed").unwrap();
        assert!(location < completed);
        assert!(frames.contains("event: message"));
        assert!(frames.contains(r#""tripId":2"#));
    }

    #[tokio::test]
    async fn dropping_the_response_unregisters() {
        let app_state = app_state();
        let hub = app_state.hub.clone();

        let response = define_routes(app_state)
            .oneshot(empty_request(Method::GET, "/admin/trips/stream"))
            .await
            .unwrap();
        let mut body = response.into_body().into_data_stream();
        read_until(&mut body, "SSE connected").await;
        assert_eq!(hub.subscription_count(), 1);

        drop(body);

        assert_eq!(hub.subscription_count(), 0);
        assert_eq!(hub.publish(TripEvent::created(trip(3, 7))).delivered, 0);
    }

    #[tokio::test]
    async fn hub_shutdown_ends_the_stream() {
        let app_state = app_state();
        let hub = app_state.hub.clone();

        let response = define_routes(app_state)
            .oneshot(empty_request(Method::GET, "/admin/trips/stream"))
            .await
            .unwrap();
        let mut body = response.into_body().into_data_stream();
        read_until(&mut body, "SSE connected").await;

        hub.shutdown();

        while let Some(chunk) = timeout(WAIT, body.next()).await.unwrap() {
            chunk.unwrap();
        }
        assert_eq!(hub.subscription_count(), 0);
    }

    #[tokio::test]
    async fn non_get_requests_are_rejected() {
        let response = define_routes(app_state())
            .oneshot(empty_request(Method::POST, "/admin/trips/stream"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
