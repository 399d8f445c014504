use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};

use crate::app::App;
use crate::models::{Popup, PopupKind};
use crate::theme::Theme;
use crate::utils::{clip_to_area, screen_layout};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Content slots of a popup, independent of where it is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupView {
    pub header: &'static str,
    pub body: Vec<Line<'static>>,
    pub footer: Option<&'static str>,
    pub is_error: bool,
}

pub fn popup_view(popup: &Popup, theme: &Theme, tick: usize) -> PopupView {
    match &popup.kind {
        PopupKind::Loading => PopupView {
            header: "Processing",
            body: vec![
                Line::from(Span::styled(SPINNER[tick % SPINNER.len()], theme.spinner)).centered(),
                Line::from("Analyzing selection...").centered(),
            ],
            footer: None,
            is_error: false,
        },
        PopupKind::Result(text) => PopupView {
            header: "Detailed Explanation",
            body: text.lines().map(|line| Line::from(line.to_string())).collect(),
            footer: Some("Click anywhere to close"),
            is_error: false,
        },
        PopupKind::Error(message) => PopupView {
            header: "Error",
            body: vec![Line::from(message.clone())],
            footer: Some("Click anywhere to close"),
            is_error: true,
        },
    }
}

pub fn render(f: &mut Frame, app: &App) {
    let (pane, footer) = screen_layout(f.area());
    render_document(f, app, pane);

    let help = Paragraph::new(
        "Drag to select and explain | Esc Close | c Copy explanation | ↑/↓ j/k PgUp/PgDn Scroll | q Quit",
    )
    .style(app.theme.footer);
    f.render_widget(help, footer);

    if let Some(popup) = app.controller.popup() {
        render_popup(f, popup, app.controller.popup_scroll(), &app.theme, app.tick);
    }
}

fn render_document(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let doc = &app.document;
    let height = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = (doc.scroll()..doc.line_count())
        .take(height)
        .map(|index| {
            let text = doc.line(index).unwrap_or_default();
            match doc.selection_range(index) {
                Some((start, end)) => {
                    let chars: Vec<char> = text.chars().collect();
                    Line::from(vec![
                        Span::styled(chars[..start].iter().collect::<String>(), theme.text),
                        Span::styled(chars[start..end].iter().collect::<String>(), theme.selection),
                        Span::styled(chars[end..].iter().collect::<String>(), theme.text),
                    ])
                }
                None => Line::from(Span::styled(text, theme.text)),
            }
        })
        .collect();

    let block = Block::default()
        .title(Span::styled(format!(" {} ", doc.title), theme.document_title))
        .borders(Borders::ALL)
        .style(theme.document_border);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Text column and scrollbar column inside a popup drawn at `area`.
fn popup_body_areas(area: Rect) -> (Rect, Rect) {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    let chunks = Layout::horizontal([Constraint::Min(1), Constraint::Length(1)]).split(inner);
    (chunks[0], chunks[1])
}

fn body_paragraph(view: &PopupView) -> Paragraph<'static> {
    Paragraph::new(view.body.clone()).wrap(Wrap { trim: true })
}

/// How many wrapped lines of the popup body can scroll off the top before the last
/// line sits on the bottom border, for a screen of size `screen`.
pub fn popup_max_scroll(popup: &Popup, theme: &Theme, screen: Rect) -> u16 {
    let Some(area) = clip_to_area(popup.position, popup.width, popup.height, screen) else {
        return 0;
    };
    let (text_area, _) = popup_body_areas(area);
    let view = popup_view(popup, theme, 0);
    let lines = body_paragraph(&view).line_count(text_area.width);
    lines
        .saturating_sub(text_area.height as usize)
        .min(u16::MAX as usize) as u16
}

fn render_popup(f: &mut Frame, popup: &Popup, scroll: u16, theme: &Theme, tick: usize) {
    let Some(area) = clip_to_area(popup.position, popup.width, popup.height, f.area()) else {
        return;
    };
    let view = popup_view(popup, theme, tick);
    let (border, header, text) = if view.is_error {
        (theme.error_border, theme.error_header, theme.error_text)
    } else {
        (theme.popup_border, theme.popup_header, theme.popup_text)
    };

    let mut block = Block::default()
        .title(Span::styled(format!(" {} ", view.header), header))
        .borders(Borders::ALL)
        .style(border);
    if let Some(footer) = view.footer {
        block = block.title_bottom(Line::from(Span::styled(footer, theme.popup_footer)).centered());
    }

    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let (text_area, bar_area) = popup_body_areas(area);
    let max_scroll = popup_max_scroll(popup, theme, f.area());
    let scroll = scroll.min(max_scroll);
    let para = body_paragraph(&view).style(text).scroll((scroll, 0));
    f.render_widget(para, text_area);

    if max_scroll > 0 {
        let mut state = ScrollbarState::default()
            .position(scroll as usize)
            .content_length(max_scroll as usize + 1);
        f.render_stateful_widget(
            Scrollbar::default().orientation(ScrollbarOrientation::VerticalRight),
            bar_area,
            &mut state,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::SelectionController;
    use crate::document::Document;
    use crate::models::{Point, Viewport};
    use crate::relay::RelayClient;
    use crate::utils::PopupGeometry;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        let (client, _requests) = RelayClient::channel();
        let geometry = PopupGeometry { width: 40, height: 8, offset: 2, flip_gap: 1, edge_margin: 1 };
        let controller = SelectionController::new(client, geometry, Viewport::new(80, 24));
        App::new(
            Document::from_text("notes.txt", "what is 2+2?\nphotosynthesis"),
            controller,
            Rect::new(0, 0, 80, 24),
        )
    }

    fn screen_sized(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn screen(app: &App) -> String {
        screen_sized(app, 80, 24)
    }

    #[test]
    fn test_renders_document_without_popup() {
        let a = app();
        let out = screen(&a);
        assert!(out.contains("notes.txt"));
        assert!(out.contains("what is 2+2?"));
        assert!(!out.contains("Processing"));
    }

    #[test]
    fn test_renders_loading_popup() {
        let mut a = app();
        a.controller.show_loading(Point::new(5, 2));
        let out = screen(&a);
        assert!(out.contains("Processing"));
        assert!(out.contains("Analyzing selection..."));
    }

    #[test]
    fn test_renders_result_popup_with_footer() {
        let mut a = app();
        a.controller.show_result("2+2 equals 4.", Point::new(5, 2));
        let out = screen(&a);
        assert!(out.contains("Detailed Explanation"));
        assert!(out.contains("2+2 equals 4."));
        assert!(out.contains("Click anywhere to close"));
    }

    #[test]
    fn test_renders_error_popup() {
        let mut a = app();
        a.controller.show_error("Gemini Error: quota exceeded", Point::new(5, 2));
        let out = screen(&a);
        assert!(out.contains(" Error "));
        assert!(out.contains("Gemini Error: quota exceeded"));
    }

    #[test]
    fn test_popup_larger_than_screen_is_clipped() {
        let mut a = app();
        a.resize(20, 6);
        a.controller.show_result("edge", Point::new(19, 5));
        let popup = a.controller.popup().unwrap();
        assert_eq!(popup.position, Point::new(1, 1));
        let out = screen_sized(&a, 20, 6);
        assert!(out.contains("edge"));
    }

    #[test]
    fn test_long_explanation_scrolls_to_its_tail() {
        let (client, _requests) = RelayClient::channel();
        let geometry = crate::config::Settings::from_sources(&[]).unwrap().popup;
        let controller = SelectionController::new(client, geometry, Viewport::new(120, 40));
        let mut a = App::new(Document::from_text("doc", "text"), controller, Rect::new(0, 0, 120, 40));

        let explanation = format!("{}ENDMARKER", "explanation ".repeat(50));
        a.controller.show_result(&explanation, Point::new(10, 5));
        let out = screen_sized(&a, 120, 40);
        assert!(out.contains("explanation explanation"));
        assert!(!out.contains("ENDMARKER"));

        let max = popup_max_scroll(a.controller.popup().unwrap(), &a.theme, Rect::new(0, 0, 120, 40));
        assert!(max > 0);
        assert!(a.scroll_popup(i32::from(max)));
        assert_eq!(a.controller.popup_scroll(), max);
        assert!(screen_sized(&a, 120, 40).contains("ENDMARKER"));

        // one more line past the end changes nothing
        a.scroll_popup(1);
        assert_eq!(a.controller.popup_scroll(), max);
    }

    #[test]
    fn test_short_explanation_has_nothing_to_scroll() {
        let mut a = app();
        a.controller.show_result("2+2 equals 4.", Point::new(5, 2));
        assert_eq!(popup_max_scroll(a.controller.popup().unwrap(), &a.theme, Rect::new(0, 0, 80, 24)), 0);
        a.scroll_popup(3);
        assert_eq!(a.controller.popup_scroll(), 0);
    }

    #[test]
    fn test_spinner_advances_with_tick() {
        let a = app();
        let popup = Popup {
            kind: PopupKind::Loading,
            anchor: Point::new(0, 0),
            position: Point::new(0, 0),
            width: 10,
            height: 4,
            generation: 1,
            dismiss_on_click: false,
        };
        let first = popup_view(&popup, &a.theme, 0);
        let second = popup_view(&popup, &a.theme, 1);
        assert_ne!(first.body[0], second.body[0]);
        assert_eq!(first.header, "Processing");
        assert!(first.footer.is_none());
    }
}
