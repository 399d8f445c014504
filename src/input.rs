use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::App;
use crate::models::Point;

const WHEEL_LINES: isize = 3;

/// Routes a mouse event to the controller and the document selection.
pub fn handle_mouse(app: &mut App, event: MouseEvent) {
    let point = Point::new(event.column as i32, event.row as i32);
    match event.kind {
        MouseEventKind::Moved => app.controller.on_pointer_move(point),
        MouseEventKind::Down(MouseButton::Left) => {
            let on_popup = app.controller.popup_contains(point);
            app.controller.on_click(point);
            match app.doc_pos_at(point) {
                Some(pos) if !on_popup => app.document.begin_selection(pos),
                _ => app.document.clear_selection(),
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.controller.on_pointer_move(point);
            let pos = app.doc_pos_clamped(point);
            app.document.extend_selection(pos);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let selected = app.document.selected_text();
            app.controller.on_pointer_release(&selected);
        }
        MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
            let delta = if event.kind == MouseEventKind::ScrollUp { -WHEEL_LINES } else { WHEEL_LINES };
            let over_popup = app.controller.popup_contains(point);
            scroll(app, delta, over_popup);
        }
        _ => {}
    }
}

/// Scrolls the open result or error popup when `to_popup` is set, the document otherwise.
fn scroll(app: &mut App, delta: isize, to_popup: bool) {
    if !(to_popup && app.scroll_popup(delta as i32)) {
        app.document.scroll_by(delta);
    }
}

/// Handles a key press. Returns `false` when the app should quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return true;
    }
    let page = app.text_area().height.max(1) as isize;
    match key.code {
        KeyCode::Char('q') => return false,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return false,
        KeyCode::Char('c') => app.copy_explanation(),
        KeyCode::Esc => app.controller.dismiss(),
        KeyCode::Up | KeyCode::Char('k') => scroll(app, -1, true),
        KeyCode::Down | KeyCode::Char('j') => scroll(app, 1, true),
        KeyCode::PageUp => app.document.scroll_by(-page),
        KeyCode::PageDown => app.document.scroll_by(page),
        KeyCode::Home | KeyCode::Char('g') => app.document.scroll_by(-(app.document.line_count() as isize)),
        KeyCode::End | KeyCode::Char('G') => app.document.scroll_by(app.document.line_count() as isize),
        _ => {}
    }
    true
}
