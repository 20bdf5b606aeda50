use faqchat_schema::Message;

/// Everything the widget shows. Owned and mutated by `WidgetController` only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetState {
    pub is_open: bool,
    pub transcript: Vec<Message>,
    pub draft: String,
    /// True from the moment a query is sent until its outcome is recorded.
    pub is_waiting: bool,
}

impl WidgetState {
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            transcript: vec![Message::assistant(greeting)],
            ..Self::default()
        }
    }

    /// Trimmed draft, if it is worth sending.
    pub fn submittable_draft(&self) -> Option<&str> {
        if self.is_waiting {
            return None;
        }
        let text = self.draft.trim();
        (!text.is_empty()).then_some(text)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.transcript.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faqchat_schema::Speaker;

    #[test]
    fn greeting_seeds_transcript() {
        let state = WidgetState::with_greeting("hola");
        assert_eq!(state.transcript.len(), 1);
        assert_eq!(state.transcript[0].speaker, Speaker::Assistant);
        assert!(!state.is_open);
        assert!(!state.is_waiting);
    }

    #[test]
    fn whitespace_draft_is_not_submittable() {
        let mut state = WidgetState::with_greeting("hola");
        state.draft = " \t\n".into();
        assert_eq!(state.submittable_draft(), None);
    }

    #[test]
    fn waiting_blocks_submission() {
        let mut state = WidgetState::with_greeting("hola");
        state.draft = "facturas".into();
        assert_eq!(state.submittable_draft(), Some("facturas"));
        state.is_waiting = true;
        assert_eq!(state.submittable_draft(), None);
    }
}
