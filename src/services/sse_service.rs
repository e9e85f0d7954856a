use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::{
    dto::{
        dashboard::DashboardSnapshot,
        sse::{COUNTDOWN_EVENT, DASHBOARD_EVENT, ServerEvent},
    },
    state::{SharedState, countdown::Countdown},
};

/// Receivers feeding one SSE client.
pub struct DashboardFeed {
    countdown: watch::Receiver<Countdown>,
    dashboard: Option<watch::Receiver<DashboardSnapshot>>,
}

/// Subscribe to countdown ticks only.
pub fn subscribe_countdown(state: &SharedState) -> DashboardFeed {
    DashboardFeed {
        countdown: state.countdown().subscribe(),
        dashboard: None,
    }
}

/// Subscribe to countdown ticks and dashboard snapshots.
pub fn subscribe_dashboard(state: &SharedState) -> DashboardFeed {
    DashboardFeed {
        countdown: state.countdown().subscribe(),
        dashboard: Some(state.dashboard_watcher()),
    }
}

fn encode<T: Serialize>(event: &'static str, payload: &T) -> Option<Event> {
    match ServerEvent::json(event, payload) {
        Ok(message) => Some(Event::default().event(message.event).data(message.data)),
        Err(err) => {
            warn!(error = %err, event, "failed to serialise SSE payload");
            None
        }
    }
}

/// Wait for the next dashboard change; pending forever without a dashboard receiver.
async fn dashboard_changed(
    receiver: &mut Option<watch::Receiver<DashboardSnapshot>>,
) -> Option<DashboardSnapshot> {
    match receiver {
        Some(receiver) => match receiver.changed().await {
            Ok(()) => Some(receiver.borrow_and_update().clone()),
            Err(_) => None,
        },
        None => std::future::pending().await,
    }
}

/// Convert a feed into an SSE response. The current values are sent first,
/// then every subsequent change.
pub fn to_sse_stream(feed: DashboardFeed) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);
    let DashboardFeed {
        mut countdown,
        mut dashboard,
    } = feed;

    tokio::spawn(async move {
        let initial_countdown = countdown.borrow_and_update().clone();
        let mut initial = Vec::with_capacity(2);
        if let Some(receiver) = dashboard.as_mut() {
            let snapshot = receiver.borrow_and_update().clone();
            initial.extend(encode(DASHBOARD_EVENT, &snapshot));
        }
        initial.extend(encode(COUNTDOWN_EVENT, &initial_countdown));
        for event in initial {
            if tx.send(Ok(event)).await.is_err() {
                return;
            }
        }

        loop {
            let event = tokio::select! {
                _ = tx.closed() => break,
                changed = countdown.changed() => match changed {
                    Ok(()) => {
                        let value = countdown.borrow_and_update().clone();
                        encode(COUNTDOWN_EVENT, &value)
                    }
                    Err(_) => break,
                },
                snapshot = dashboard_changed(&mut dashboard) => match snapshot {
                    Some(snapshot) => encode(DASHBOARD_EVENT, &snapshot),
                    None => break,
                },
            };

            if let Some(event) = event {
                if tx.send(Ok(event)).await.is_err() {
                    break;
                }
            }
        }

        debug!("dashboard SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
