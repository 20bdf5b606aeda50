use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use faqchat_bus::{EventBus, Topic};
use faqchat_client::{FaqApi, TransportError};
use faqchat_schema::{QueryResult, Speaker, WidgetEvent};
use faqchat_widget::WidgetController;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::scroll::TranscriptScroll;

const PAGE_LINES: usize = 8;

/// Where key presses go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The floating trigger button on the host screen.
    Trigger,
    /// The panel's text input.
    Input,
}

pub struct WidgetReceivers {
    became_visible: mpsc::Receiver<WidgetEvent>,
    hidden: mpsc::Receiver<WidgetEvent>,
    transcript_changed: mpsc::Receiver<WidgetEvent>,
}

impl WidgetReceivers {
    pub async fn subscribe(bus: &EventBus) -> Self {
        Self {
            became_visible: bus.subscribe(Topic::BecameVisible).await,
            hidden: bus.subscribe(Topic::Hidden).await,
            transcript_changed: bus.subscribe(Topic::TranscriptChanged).await,
        }
    }

    fn drain_all(&mut self, app: &mut App) {
        while let Ok(event) = self.became_visible.try_recv() {
            app.handle_widget_event(event);
        }
        while let Ok(event) = self.hidden.try_recv() {
            app.handle_widget_event(event);
        }
        while let Ok(event) = self.transcript_changed.try_recv() {
            app.handle_widget_event(event);
        }
    }
}

pub struct App {
    pub(crate) widget: WidgetController,
    api: Arc<dyn FaqApi>,
    receivers: Option<WidgetReceivers>,
    in_flight: Option<JoinHandle<Result<QueryResult, TransportError>>>,
    pub(crate) focus: Focus,
    pub(crate) selected_suggestion: Option<usize>,
    pub(crate) scroll: TranscriptScroll,
    pub(crate) should_quit: bool,
}

impl App {
    pub async fn new(api: Arc<dyn FaqApi>, greeting: impl Into<String>) -> Self {
        let bus = EventBus::new(64);
        let receivers = WidgetReceivers::subscribe(&bus).await;
        Self {
            widget: WidgetController::with_greeting(greeting, bus.publisher()),
            api,
            receivers: Some(receivers),
            in_flight: None,
            focus: Focus::Trigger,
            selected_suggestion: None,
            scroll: TranscriptScroll::default(),
            should_quit: false,
        }
    }

    pub fn widget(&self) -> &WidgetController {
        &self.widget
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Applies bus notifications and any finished query. Called once per
    /// loop iteration before drawing.
    pub async fn tick(&mut self) {
        self.poll_in_flight().await;
        if let Some(mut receivers) = self.receivers.take() {
            receivers.drain_all(self);
            self.receivers = Some(receivers);
        }
    }

    fn handle_widget_event(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::BecameVisible if self.widget.is_open() => {
                self.focus = Focus::Input;
                self.scroll.request_scroll_to_bottom();
            }
            WidgetEvent::Hidden if !self.widget.is_open() => {
                self.focus = Focus::Trigger;
                self.selected_suggestion = None;
            }
            WidgetEvent::TranscriptChanged { .. } => {
                self.selected_suggestion = None;
                self.scroll.request_scroll_to_bottom();
            }
            WidgetEvent::BecameVisible
            | WidgetEvent::Hidden
            | WidgetEvent::WaitingChanged { .. } => {}
        }
    }

    async fn poll_in_flight(&mut self) {
        let finished = self
            .in_flight
            .as_ref()
            .is_some_and(|handle| handle.is_finished());
        if finished {
            if let Some(handle) = self.in_flight.take() {
                self.apply_outcome(handle).await;
            }
        }
    }

    /// Waits for the in-flight query, if any, and applies its outcome.
    pub async fn settle(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            self.apply_outcome(handle).await;
        }
        self.tick().await;
    }

    async fn apply_outcome(&mut self, handle: JoinHandle<Result<QueryResult, TransportError>>) {
        match handle.await {
            Ok(outcome) => {
                self.widget.complete_submit(outcome).await;
            }
            Err(e) => {
                self.widget.fail_pending(&e.to_string()).await;
            }
        }
    }

    async fn submit(&mut self) {
        let Some(pending) = self.widget.begin_submit().await else {
            return;
        };
        let api = self.api.clone();
        self.in_flight = Some(tokio::spawn(async move {
            api.submit_query(&pending.text).await
        }));
    }

    /// Suggestion links of the newest assistant message that has any.
    pub fn current_suggestions(&self) -> &[String] {
        self.widget
            .transcript()
            .iter()
            .rev()
            .find(|m| m.speaker == Speaker::Assistant && m.suggestions.is_some())
            .map(|m| m.suggestion_links())
            .unwrap_or(&[])
    }

    fn cycle_suggestion(&mut self, forward: bool) {
        let count = self.current_suggestions().len();
        if count == 0 {
            self.selected_suggestion = None;
            return;
        }
        self.selected_suggestion = Some(match (self.selected_suggestion, forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        });
    }

    pub async fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if key.code == KeyCode::F(2) {
            self.widget.toggle_open().await;
            return;
        }

        match self.focus {
            Focus::Trigger => match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Enter => self.widget.toggle_open().await,
                _ => {}
            },
            Focus::Input => self.on_input_key(key).await,
        }
    }

    async fn on_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.widget.close().await,
            KeyCode::Enter => {
                let selected = self
                    .selected_suggestion
                    .and_then(|i| self.current_suggestions().get(i).cloned());
                match selected {
                    Some(suggestion) => {
                        self.widget.activate_suggestion(&suggestion);
                        self.selected_suggestion = None;
                    }
                    None => self.submit().await,
                }
            }
            KeyCode::Tab => self.cycle_suggestion(true),
            KeyCode::BackTab => self.cycle_suggestion(false),
            KeyCode::Backspace => {
                self.selected_suggestion = None;
                self.widget.pop_char();
            }
            KeyCode::Char(c) => {
                self.selected_suggestion = None;
                self.widget.push_char(c);
            }
            KeyCode::Up => self.scroll.scroll_up(1),
            KeyCode::Down => self.scroll.scroll_down(1),
            KeyCode::PageUp => self.scroll.scroll_up(PAGE_LINES),
            KeyCode::PageDown => self.scroll.scroll_down(PAGE_LINES),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use faqchat_client::CatalogQuery;
    use faqchat_schema::{CatalogEntry, Intent, ServiceInfo, DEFAULT_GREETING};

    use super::*;

    /// Answers every query with the same canned result.
    struct CannedApi(QueryResult);

    #[async_trait]
    impl FaqApi for CannedApi {
        async fn submit_query(&self, _text: &str) -> Result<QueryResult, TransportError> {
            Ok(self.0.clone())
        }

        async fn search_catalog_page(
            &self,
            _query: &CatalogQuery,
        ) -> Result<Vec<CatalogEntry>, TransportError> {
            Ok(Vec::new())
        }

        async fn health(&self) -> Result<ServiceInfo, TransportError> {
            Ok(ServiceInfo {
                ok: true,
                service: "canned".into(),
                docs: None,
            })
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn app_answering(intent: Intent, suggestions: &[&str]) -> App {
        let api = CannedApi(QueryResult {
            answer: "Respuesta".into(),
            intent,
            confidence: 0.4,
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        });
        App::new(Arc::new(api), DEFAULT_GREETING).await
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.on_key(press(KeyCode::Char(c))).await;
        }
    }

    #[tokio::test]
    async fn input_focus_follows_became_visible() {
        let mut app = app_answering(Intent::Faq, &[]).await;
        assert_eq!(app.focus(), Focus::Trigger);

        app.on_key(press(KeyCode::F(2))).await;
        assert!(app.widget().is_open());
        // Focus moves only once the visibility notification is drained.
        assert_eq!(app.focus(), Focus::Trigger);

        app.tick().await;
        assert_eq!(app.focus(), Focus::Input);

        app.on_key(press(KeyCode::Esc)).await;
        app.tick().await;
        assert!(!app.widget().is_open());
        assert_eq!(app.focus(), Focus::Trigger);
    }

    #[tokio::test]
    async fn typing_while_closed_does_not_edit_draft() {
        let mut app = app_answering(Intent::Faq, &[]).await;
        app.on_key(press(KeyCode::Char('x'))).await;
        assert_eq!(app.widget().draft(), "");
    }

    #[tokio::test]
    async fn enter_submits_and_answer_arrives() {
        let mut app = app_answering(Intent::Faq, &[]).await;
        app.on_key(press(KeyCode::F(2))).await;
        app.tick().await;

        type_text(&mut app, "precios").await;
        app.on_key(press(KeyCode::Enter)).await;
        assert!(app.widget().is_waiting());
        assert_eq!(app.widget().transcript().len(), 2);

        // A second Enter while waiting does nothing.
        type_text(&mut app, "otra").await;
        app.on_key(press(KeyCode::Enter)).await;
        assert_eq!(app.widget().transcript().len(), 2);

        app.settle().await;
        assert!(!app.widget().is_waiting());
        assert_eq!(app.widget().transcript().len(), 3);
        assert_eq!(app.widget().draft(), "otra");
    }

    #[tokio::test]
    async fn tab_and_enter_refill_draft_from_suggestion() {
        let mut app = app_answering(Intent::FaqSuggest, &["¿Dónde veo mis facturas?", "precios"]).await;
        app.on_key(press(KeyCode::F(2))).await;
        app.tick().await;
        type_text(&mut app, "factura").await;
        app.on_key(press(KeyCode::Enter)).await;
        app.settle().await;

        app.on_key(press(KeyCode::Tab)).await;
        app.on_key(press(KeyCode::Tab)).await;
        assert_eq!(app.selected_suggestion, Some(1));
        app.on_key(press(KeyCode::BackTab)).await;
        assert_eq!(app.selected_suggestion, Some(0));

        app.on_key(press(KeyCode::Enter)).await;
        assert_eq!(app.widget().draft(), "¿Dónde veo mis facturas?");
        assert_eq!(app.widget().transcript().len(), 3);
        assert!(!app.widget().is_waiting());
    }

    #[tokio::test]
    async fn tab_without_suggestions_selects_nothing() {
        let mut app = app_answering(Intent::Faq, &[]).await;
        app.on_key(press(KeyCode::F(2))).await;
        app.tick().await;
        app.on_key(press(KeyCode::Tab)).await;
        assert_eq!(app.selected_suggestion, None);
    }

    #[tokio::test]
    async fn ctrl_c_quits_from_anywhere() {
        let mut app = app_answering(Intent::Faq, &[]).await;
        app.on_key(press(KeyCode::F(2))).await;
        app.tick().await;
        app.on_key(press(KeyCode::Char('q'))).await;
        assert!(!app.should_quit());
        assert_eq!(app.widget().draft(), "q");

        app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .await;
        assert!(app.should_quit());
    }
}
