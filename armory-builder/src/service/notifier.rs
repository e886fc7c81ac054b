//! Result notifier
//!
//! Reports build outcomes to the platform as events. Publishing is best
//! effort: a failed publish is logged and the worker keeps going.

use std::sync::Arc;
use tracing::{error, info};

use crate::outcome::{BuildEvent, BuildOutcome};
use crate::repository::EventRepository;

/// Publishes one event per terminal build outcome
pub struct ResultNotifier {
    events: Arc<dyn EventRepository>,
    source: String,
}

impl ResultNotifier {
    /// Creates a notifier labelling its error events with the worker language
    pub fn new(events: Arc<dyn EventRepository>, language: &str) -> Self {
        Self {
            events,
            source: format!("{} Build Server", language),
        }
    }

    pub async fn notify(&self, outcome: &BuildOutcome) {
        match outcome.to_event(&self.source) {
            BuildEvent::Succeeded(event) => {
                let payload_id = event.payload.id;
                match self.events.publish_succeeded(event).await {
                    Ok(()) => info!("Reported payload {} as built", payload_id),
                    Err(e) => error!("Failed to report build of payload {}: {:#}", payload_id, e),
                }
            }
            BuildEvent::Failed(event) => {
                error!("{}: {}", event.message, event.details);
                if let Err(e) = self.events.publish_failed(event).await {
                    error!("Failed to report build error: {:#}", e);
                }
            }
        }
    }
}
