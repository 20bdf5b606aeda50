use faqchat_bus::BusPublisher;
use faqchat_client::{FaqApi, TransportError};
use faqchat_schema::{Message, QueryResult, WidgetEvent, DEFAULT_GREETING};

use crate::WidgetState;

/// A query that has been accepted and is waiting for the transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty draft or a query already in flight; nothing happened.
    Ignored,
    Answered,
    Failed,
}

/// Owns the widget state and implements the chat interaction contract.
pub struct WidgetController {
    state: WidgetState,
    events: BusPublisher,
}

impl WidgetController {
    pub fn new(events: BusPublisher) -> Self {
        Self::with_greeting(DEFAULT_GREETING, events)
    }

    pub fn with_greeting(greeting: impl Into<String>, events: BusPublisher) -> Self {
        Self {
            state: WidgetState::with_greeting(greeting),
            events,
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn is_waiting(&self) -> bool {
        self.state.is_waiting
    }

    pub fn transcript(&self) -> &[Message] {
        &self.state.transcript
    }

    pub fn draft(&self) -> &str {
        &self.state.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.state.draft = text.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.state.draft.push(c);
    }

    pub fn pop_char(&mut self) {
        self.state.draft.pop();
    }

    /// Refills the input with a suggestion. The user still has to submit it.
    pub fn activate_suggestion(&mut self, suggestion: &str) {
        tracing::debug!(suggestion, "suggestion activated");
        self.set_draft(suggestion);
    }

    pub async fn toggle_open(&mut self) {
        if self.state.is_open {
            self.close().await;
        } else {
            self.open().await;
        }
    }

    pub async fn open(&mut self) {
        if self.state.is_open {
            return;
        }
        self.state.is_open = true;
        self.emit(WidgetEvent::BecameVisible).await;
    }

    pub async fn close(&mut self) {
        if !self.state.is_open {
            return;
        }
        self.state.is_open = false;
        self.emit(WidgetEvent::Hidden).await;
    }

    /// First half of a submit: records the user message and marks the widget
    /// as waiting. Returns `None` when the draft is blank or a query is
    /// already in flight.
    pub async fn begin_submit(&mut self) -> Option<PendingQuery> {
        let text = self.state.submittable_draft()?.to_string();

        self.append(Message::user(text.clone())).await;
        self.state.draft.clear();
        self.set_waiting(true).await;

        Some(PendingQuery { text })
    }

    /// Second half of a submit: records the answer, or the fixed error
    /// message, and always clears the waiting flag.
    pub async fn complete_submit(
        &mut self,
        outcome: Result<QueryResult, TransportError>,
    ) -> SubmitOutcome {
        if !self.state.is_waiting {
            tracing::warn!("query outcome arrived with no query in flight; discarded");
            return SubmitOutcome::Ignored;
        }

        let submitted = match outcome {
            Ok(result) => {
                tracing::debug!(
                    intent = ?result.intent,
                    suggestions = result.suggestions.len(),
                    "query answered"
                );
                self.append(Message::from_result(result)).await;
                SubmitOutcome::Answered
            }
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, "query failed");
                self.append(Message::communication_error()).await;
                SubmitOutcome::Failed
            }
        };

        self.set_waiting(false).await;
        submitted
    }

    /// Ends an in-flight query whose outcome will never arrive (for example
    /// the task running it died). Reported to the user like any failure.
    pub async fn fail_pending(&mut self, reason: &str) -> SubmitOutcome {
        if !self.state.is_waiting {
            return SubmitOutcome::Ignored;
        }
        tracing::warn!(reason, "query abandoned");
        self.append(Message::communication_error()).await;
        self.set_waiting(false).await;
        SubmitOutcome::Failed
    }

    /// Sends the current draft and records the outcome.
    pub async fn submit(&mut self, api: &dyn FaqApi) -> SubmitOutcome {
        let Some(pending) = self.begin_submit().await else {
            return SubmitOutcome::Ignored;
        };
        let outcome = api.submit_query(&pending.text).await;
        self.complete_submit(outcome).await
    }

    async fn append(&mut self, message: Message) {
        self.state.transcript.push(message);
        let len = self.state.transcript.len();
        self.emit(WidgetEvent::TranscriptChanged { len }).await;
    }

    async fn set_waiting(&mut self, waiting: bool) {
        self.state.is_waiting = waiting;
        self.emit(WidgetEvent::WaitingChanged { waiting }).await;
    }

    async fn emit(&self, event: WidgetEvent) {
        if let Err(e) = self.events.publish(event).await {
            tracing::warn!("failed to publish widget event: {e}");
        }
    }
}
