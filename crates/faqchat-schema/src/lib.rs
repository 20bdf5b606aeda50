use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Greeting every fresh widget transcript starts with.
pub const DEFAULT_GREETING: &str =
    "¡Hola! Pregúntame sobre contraseñas, facturas, precios o ventas.";

/// Fixed assistant text shown for any transport failure.
pub const COMMUNICATION_ERROR_TEXT: &str = "Ups, ocurrió un error llamando a la API.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

/// How the service answered a query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Confident match against a single catalog entry.
    Faq,
    /// Probable match; the suggestions are the closest catalog questions.
    FaqSuggest,
    /// No usable match; the suggestions are loose alternatives.
    Fallback,
    /// The catalog is empty.
    Empty,
}

/// Response body of `POST /api/chat/query`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    pub answer: String,
    pub intent: Intent,
    pub confidence: f64,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Framing shown in front of a message's suggestion links.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionFraming {
    /// "did you mean" for near matches.
    DidYouMean,
    /// Lower-confidence alternatives offered by a fallback answer.
    Alternatives,
}

impl SuggestionFraming {
    pub fn for_intent(intent: Intent) -> Self {
        match intent {
            Intent::Fallback => Self::Alternatives,
            Intent::Faq | Intent::FaqSuggest | Intent::Empty => Self::DidYouMean,
        }
    }
}

/// Suggestion links attached to an assistant message. `links` is never empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestionBlock {
    pub framing: SuggestionFraming,
    pub links: Vec<String>,
}

impl SuggestionBlock {
    pub fn from_result(result: &QueryResult) -> Option<Self> {
        if result.suggestions.is_empty() {
            return None;
        }
        Some(Self {
            framing: SuggestionFraming::for_intent(result.intent),
            links: result.suggestions.clone(),
        })
    }
}

/// One transcript entry. Never mutated once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub speaker: Speaker,
    pub text: String,
    #[serde(default)]
    pub suggestions: Option<SuggestionBlock>,
    pub at: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            suggestions: None,
            at: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
            suggestions: None,
            at: Utc::now(),
        }
    }

    pub fn from_result(result: QueryResult) -> Self {
        let suggestions = SuggestionBlock::from_result(&result);
        Self {
            speaker: Speaker::Assistant,
            text: result.answer,
            suggestions,
            at: Utc::now(),
        }
    }

    pub fn communication_error() -> Self {
        Self::assistant(COMMUNICATION_ERROR_TEXT)
    }

    pub fn suggestion_links(&self) -> &[String] {
        self.suggestions
            .as_ref()
            .map(|block| block.links.as_slice())
            .unwrap_or(&[])
    }
}

/// Catalog row returned by `GET /api/faq`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: i64,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub tags: Option<String>,
}

impl CatalogEntry {
    /// Splits the comma-separated `tags` column.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Response body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceInfo {
    pub ok: bool,
    pub service: String,
    #[serde(default)]
    pub docs: Option<String>,
}

/// Notifications the widget controller publishes to its view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// The panel went from closed to open. Published once per opening.
    BecameVisible,
    Hidden,
    TranscriptChanged { len: usize },
    WaitingChanged { waiting: bool },
}
