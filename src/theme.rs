use ratatui::style::{Color, Modifier, Style};

pub struct Theme {
    pub document_border: Style,
    pub document_title: Style,
    pub text: Style,
    pub selection: Style,
    pub footer: Style,

    // Popup
    pub popup_border: Style,
    pub popup_header: Style,
    pub popup_text: Style,
    pub popup_footer: Style,
    pub error_border: Style,
    pub error_header: Style,
    pub error_text: Style,
    pub spinner: Style,
}

impl Default for Theme {
    fn default() -> Self {
        let slate = Color::Rgb(45, 55, 72);
        let maroon = Color::Rgb(116, 42, 42);
        Self {
            document_border: Style::default().fg(Color::Cyan),
            document_title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            text: Style::default().fg(Color::White),
            selection: Style::default().bg(Color::Yellow).fg(Color::Black),
            footer: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),

            popup_border: Style::default().fg(Color::Rgb(74, 85, 104)).bg(slate),
            popup_header: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            popup_text: Style::default().fg(Color::White).bg(slate),
            popup_footer: Style::default().fg(Color::Rgb(160, 174, 192)),
            error_border: Style::default().fg(Color::Rgb(155, 44, 44)).bg(maroon),
            error_header: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            error_text: Style::default().fg(Color::White).bg(maroon),
            spinner: Style::default().fg(Color::Rgb(52, 152, 219)).add_modifier(Modifier::BOLD),
        }
    }
}
