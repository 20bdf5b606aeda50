use faqchat_schema::{Message, Speaker, SuggestionFraming};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, Focus};

const PANEL_WIDTH: u16 = 60;
const PANEL_HEIGHT: u16 = 24;
const INPUT_PLACEHOLDER: &str = "Escribe tu pregunta…";

/// Text shown in front of a message's suggestion links.
pub fn framing_prefix(framing: SuggestionFraming) -> &'static str {
    match framing {
        SuggestionFraming::DidYouMean => "¿Te referías a: ",
        SuggestionFraming::Alternatives => "Sugerencias: ",
    }
}

pub fn render(frame: &mut Frame, app: &mut App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    render_host_page(frame, main_layout[0]);
    render_status_bar(frame, main_layout[1], app);

    if app.widget.is_open() {
        render_panel(frame, panel_area(main_layout[0]), app);
    }
}

fn panel_area(page: Rect) -> Rect {
    let width = PANEL_WIDTH.min(page.width);
    let height = PANEL_HEIGHT.min(page.height);
    Rect {
        x: page.x + page.width - width,
        y: page.y + page.height - height,
        width,
        height,
    }
}

fn render_host_page(frame: &mut Frame, area: Rect) {
    let welcome = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Bienvenido a mi demo",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(welcome, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let key = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let hint = Style::default().fg(Color::DarkGray);

    let hints = Paragraph::new(Line::from(vec![
        Span::styled(" [Ctrl-C]", key),
        Span::styled(" salir ", hint),
        Span::styled("[Tab]", key),
        Span::styled(" sugerencias ", hint),
        Span::styled("[↑↓]", key),
        Span::styled(" desplazar ", hint),
    ]));
    frame.render_widget(hints, area);

    let (label, color) = if app.widget.is_open() {
        ("[F2] Cerrar chat ", Color::DarkGray)
    } else {
        ("[F2] Abrir chat ", Color::Cyan)
    };
    let trigger_style = if app.focus == Focus::Trigger {
        Style::default()
            .fg(Color::Black)
            .bg(color)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    };
    let trigger = Paragraph::new(Line::from(Span::styled(label, trigger_style)))
        .alignment(Alignment::Right);
    frame.render_widget(trigger, area);
}

fn render_panel(frame: &mut Frame, area: Rect, app: &mut App) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Asistente · [Esc] × ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(inner);

    render_transcript(frame, rows[0], app);
    render_input_row(frame, rows[1], app);
}

fn render_transcript(frame: &mut Frame, area: Rect, app: &mut App) {
    let lines = transcript_lines(app, area.width.saturating_sub(2) as usize);
    let offset = app.scroll.resolve(lines.len(), area.height as usize);
    let transcript = Paragraph::new(lines).scroll((offset as u16, 0));
    frame.render_widget(transcript, area);
}

fn transcript_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let transcript = app.widget.transcript();
    let selectable = transcript
        .iter()
        .rposition(|m| m.speaker == Speaker::Assistant && m.suggestions.is_some());

    let mut lines = Vec::new();
    for (index, message) in transcript.iter().enumerate() {
        let selected = if Some(index) == selectable {
            app.selected_suggestion
        } else {
            None
        };
        push_message_lines(&mut lines, message, width, selected);
        lines.push(Line::from(""));
    }
    if app.widget.is_waiting() {
        lines.push(Line::from(Span::styled(
            " Asistente está escribiendo…",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }
    lines
}

fn push_message_lines(
    lines: &mut Vec<Line<'static>>,
    message: &Message,
    width: usize,
    selected: Option<usize>,
) {
    let (who, color) = match message.speaker {
        Speaker::User => ("Tú", Color::Cyan),
        Speaker::Assistant => ("Asistente", Color::Green),
    };
    lines.push(Line::from(vec![
        Span::styled(
            format!(" {who}"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}", message.at.with_timezone(&chrono::Local).format("%H:%M")),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    for row in wrap_text(&message.text, width) {
        lines.push(Line::from(format!("  {row}")));
    }

    let Some(block) = &message.suggestions else {
        return;
    };
    lines.push(Line::from(Span::styled(
        format!("  {}", framing_prefix(block.framing)),
        Style::default().fg(Color::Yellow),
    )));
    for (i, link) in block.links.iter().enumerate() {
        let style = if selected == Some(i) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::UNDERLINED)
        };
        for (n, row) in wrap_text(link, width.saturating_sub(4)).into_iter().enumerate() {
            let bullet = if n == 0 { "  › " } else { "    " };
            lines.push(Line::from(vec![Span::raw(bullet), Span::styled(row, style)]));
        }
    }
}

fn render_input_row(frame: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(10)])
        .split(area);

    let focused = app.focus == Focus::Input;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let input_inner = input_block.inner(cols[0]);

    let draft = app.widget.draft();
    let content = if draft.is_empty() {
        Span::styled(INPUT_PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else {
        let visible = input_inner.width.saturating_sub(1) as usize;
        let skip = draft.chars().count().saturating_sub(visible);
        Span::raw(draft.chars().skip(skip).collect::<String>())
    };
    frame.render_widget(Paragraph::new(Line::from(content)).block(input_block), cols[0]);

    let send = if app.widget.is_waiting() {
        Span::styled("…", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(
            "Enviar",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    };
    let send_button = Paragraph::new(Line::from(send))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(send_button, cols[1]);

    if focused && input_inner.width > 0 {
        let typed = draft.chars().count() as u16;
        let x = input_inner.x + typed.min(input_inner.width - 1);
        frame.set_cursor_position((x, input_inner.y));
    }
}

/// Greedy word wrap by character count. Words longer than `width` are split.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for paragraph in text.lines() {
        let mut row = String::new();
        let mut row_len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if row_len > 0 {
                    rows.push(std::mem::take(&mut row));
                    row_len = 0;
                }
                rows.push(word.drain(..width).collect());
            }
            let needed = if row_len == 0 { word.len() } else { row_len + 1 + word.len() };
            if needed > width && row_len > 0 {
                rows.push(std::mem::take(&mut row));
                row_len = 0;
            }
            if word.is_empty() {
                continue;
            }
            if row_len > 0 {
                row.push(' ');
                row_len += 1;
            }
            row.extend(word.iter());
            row_len += word.len();
        }
        rows.push(row);
    }

    if rows.is_empty() {
        rows.push(String::new());
    }
    rows
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use faqchat_client::{CatalogQuery, FaqApi, TransportError};
    use faqchat_schema::{CatalogEntry, Intent, QueryResult, ServiceInfo, DEFAULT_GREETING};
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;

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

    async fn app_with(intent: Intent, suggestions: &[&str]) -> App {
        let api = CannedApi(QueryResult {
            answer: "Configuración → Facturación.".into(),
            intent,
            confidence: 0.5,
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        });
        App::new(Arc::new(api), DEFAULT_GREETING).await
    }

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn ask(app: &mut App, text: &str) {
        app.widget.open().await;
        app.tick().await;
        app.widget.set_draft(text);
        app.on_key(crossterm::event::KeyEvent::from(crossterm::event::KeyCode::Enter))
            .await;
        app.settle().await;
    }

    #[tokio::test]
    async fn closed_widget_shows_only_trigger() {
        let mut app = app_with(Intent::Faq, &[]).await;
        let screen = draw(&mut app);
        assert!(screen.contains("Bienvenido a mi demo"));
        assert!(screen.contains("[F2] Abrir chat"));
        assert!(!screen.contains("Asistente"));
    }

    #[tokio::test]
    async fn open_widget_shows_greeting_and_placeholder() {
        let mut app = app_with(Intent::Faq, &[]).await;
        app.widget.open().await;
        app.tick().await;

        let screen = draw(&mut app);
        assert!(screen.contains("Asistente"));
        assert!(screen.contains("¡Hola!"));
        assert!(screen.contains(INPUT_PLACEHOLDER));
        assert!(screen.contains("Enviar"));
        assert!(screen.contains("[F2] Cerrar chat"));
    }

    #[tokio::test]
    async fn fallback_answer_renders_alternatives_label() {
        let mut app = app_with(Intent::Fallback, &["precios"]).await;
        ask(&mut app, "xyz").await;

        let screen = draw(&mut app);
        assert!(screen.contains("Sugerencias:"));
        assert!(screen.contains("› precios"));
        assert!(!screen.contains("¿Te referías a:"));
    }

    #[tokio::test]
    async fn faq_suggest_answer_renders_did_you_mean_label() {
        let mut app = app_with(Intent::FaqSuggest, &["¿Dónde veo mis facturas?"]).await;
        ask(&mut app, "factura").await;

        let screen = draw(&mut app);
        assert!(screen.contains("¿Te referías a:"));
        assert!(screen.contains("¿Dónde veo mis facturas?"));
    }

    #[tokio::test]
    async fn faq_answer_renders_no_label() {
        let mut app = app_with(Intent::Faq, &[]).await;
        ask(&mut app, "facturas").await;

        let screen = draw(&mut app);
        assert!(screen.contains("Configuración → Facturación."));
        assert!(!screen.contains("Sugerencias:"));
        assert!(!screen.contains("¿Te referías a:"));
    }

    #[tokio::test]
    async fn newest_message_stays_visible_in_long_transcript() {
        let mut app = app_with(Intent::Faq, &[]).await;
        for i in 0..12 {
            ask(&mut app, &format!("pregunta número {i}")).await;
        }

        let screen = draw(&mut app);
        assert!(screen.contains("pregunta número 11"));
        assert!(!screen.contains("¡Hola!"));
    }

    #[test]
    fn wrap_text_breaks_on_words() {
        assert_eq!(
            wrap_text("Lunes a viernes 8:00–18:00", 10),
            vec!["Lunes a", "viernes", "8:00–18:00"]
        );
    }

    #[test]
    fn wrap_text_splits_long_words() {
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_text_keeps_empty_text_as_one_row() {
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }
}
