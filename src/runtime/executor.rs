//! Chat runtime executor

use crate::backend::{BackendError, InferenceClient};
use crate::controller::{ConversationController, Effect, Event, TurnTicket, ViewModel};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Event loop around a `ConversationController`.
///
/// Network calls run as background tasks and report back through the event
/// channel, so other events keep being processed while a turn is in flight.
pub struct ChatRuntime<C>
where
    C: InferenceClient + 'static,
{
    controller: ConversationController,
    client: Arc<C>,
    request_timeout: Duration,
    event_tx: mpsc::Sender<Event>,
    event_rx: mpsc::Receiver<Event>,
    view_tx: watch::Sender<ViewModel>,
    /// Cancellation handle per outstanding turn
    in_flight: HashMap<Uuid, CancellationToken>,
}

impl<C> ChatRuntime<C>
where
    C: InferenceClient + 'static,
{
    pub fn new(controller: ConversationController, client: C, request_timeout: Duration) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (view_tx, _) = watch::channel(controller.view());
        Self {
            controller,
            client: Arc::new(client),
            request_timeout,
            event_tx,
            event_rx,
            view_tx,
            in_flight: HashMap::new(),
        }
    }

    /// Channel for submitting events
    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.event_tx.clone()
    }

    /// Receive a fresh `ViewModel` after every processed event
    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.view_tx.subscribe()
    }

    #[cfg(test)]
    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    /// Process events until `shutdown` fires, then tear down
    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!(endpoint = %self.client.endpoint(), "Starting chat runtime");

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                Some(event) = self.event_rx.recv() => self.dispatch(event),
            }
        }

        self.shutdown();
    }

    /// Wait for the next queued event and process it.
    /// Returns false once the channel is closed.
    #[cfg(test)]
    pub async fn process_next(&mut self) -> bool {
        match self.event_rx.recv().await {
            Some(event) => {
                self.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// Apply one event and execute the resulting effects
    pub fn dispatch(&mut self, event: Event) {
        if let Event::CompletionReceived { ticket, .. } = &event {
            self.in_flight.remove(&ticket.turn_id);
        }

        match self.controller.handle(event) {
            Ok(effects) => {
                for effect in effects {
                    self.execute_effect(effect);
                }
            }
            Err(e) => {
                // Validation failures are silent by contract
                tracing::debug!(error = %e, "Event rejected");
            }
        }

        self.view_tx.send_replace(self.controller.view());
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::RequestCompletion { ticket } => self.spawn_request(ticket),
            Effect::CancelCompletion { turn_id } => {
                if let Some(token) = self.in_flight.get(&turn_id) {
                    tracing::info!(turn_id = %turn_id, "Cancelling completion request");
                    token.cancel();
                }
            }
            Effect::PersistSessions => self.controller.store().save(),
        }
    }

    fn spawn_request(&mut self, ticket: TurnTicket) {
        let cancel_token = CancellationToken::new();
        self.in_flight.insert(ticket.turn_id, cancel_token.clone());

        let client = Arc::clone(&self.client);
        let event_tx = self.event_tx.clone();
        let timeout = self.request_timeout;

        tokio::spawn(async move {
            tracing::info!(
                session_id = %ticket.session_id,
                turn_id = %ticket.turn_id,
                "Making completion request (background)"
            );

            // Race the request against cancellation and the timeout
            let result = tokio::select! {
                biased;

                () = cancel_token.cancelled() => Err(BackendError::cancelled()),

                outcome = tokio::time::timeout(timeout, client.complete(&ticket.request)) => {
                    outcome.unwrap_or_else(|_| {
                        Err(BackendError::timeout(format!(
                            "No response within {}ms",
                            timeout.as_millis()
                        )))
                    })
                }
            };

            if event_tx
                .send(Event::CompletionReceived { ticket, result })
                .await
                .is_err()
            {
                tracing::debug!("Runtime stopped before the completion arrived");
            }
        });
    }

    /// Cancel outstanding requests and close the store
    pub fn shutdown(self) {
        for token in self.in_flight.values() {
            token.cancel();
        }
        tracing::info!(
            cancelled = self.in_flight.len(),
            "Chat runtime stopped"
        );
        self.controller.into_store().close();
    }
}
