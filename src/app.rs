use arboard::Clipboard;
use ratatui::layout::Rect;
use tracing::{info, warn};

use crate::controller::SelectionController;
use crate::document::{DocPos, Document};
use crate::models::{Point, PopupKind, Viewport};
use crate::theme::Theme;
use crate::ui;
use crate::utils::document_text_area;

/// Everything the event loop mutates: the page, the controller and the frame size.
pub struct App {
    pub document: Document,
    pub controller: SelectionController,
    pub theme: Theme,
    pub tick: usize,
    area: Rect,
}

impl App {
    pub fn new(document: Document, controller: SelectionController, area: Rect) -> Self {
        Self { document, controller, theme: Theme::default(), tick: 0, area }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.area = Rect::new(0, 0, width, height);
        self.controller.set_viewport(Viewport::new(width as i32, height as i32));
    }

    pub fn text_area(&self) -> Rect {
        document_text_area(self.area)
    }

    /// Document position under `point`, if it lies on the text area.
    pub fn doc_pos_at(&self, point: Point) -> Option<DocPos> {
        let area = self.text_area();
        let inside = point.x >= area.x as i32
            && point.x < area.right() as i32
            && point.y >= area.y as i32
            && point.y < area.bottom() as i32;
        inside.then(|| self.doc_pos_clamped(point))
    }

    /// Like [`App::doc_pos_at`] but snaps points outside the text area onto its edge,
    /// so a drag past the border keeps extending the selection.
    pub fn doc_pos_clamped(&self, point: Point) -> DocPos {
        let area = self.text_area();
        let row = (point.y - area.y as i32).clamp(0, area.height.saturating_sub(1) as i32);
        let col = (point.x - area.x as i32).clamp(0, area.width.saturating_sub(1) as i32);
        self.document.pos_at(row as usize, col as usize)
    }

    /// Scrolls the popup body, bounded by how much of it is hidden. Returns `false`
    /// when no result or error popup is open.
    pub fn scroll_popup(&mut self, delta: i32) -> bool {
        let max = self
            .controller
            .popup()
            .map_or(0, |popup| ui::popup_max_scroll(popup, &self.theme, self.area));
        self.controller.scroll_popup(delta, max)
    }

    /// Copies the explanation currently on screen, if any.
    pub fn copy_explanation(&self) {
        let Some(PopupKind::Result(text)) = self.controller.popup().map(|popup| &popup.kind) else {
            return;
        };
        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.clone())) {
            Ok(()) => info!(chars = text.chars().count(), "explanation copied"),
            Err(e) => warn!(error = %e, "clipboard unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::RelayClient;
    use crate::utils::PopupGeometry;

    fn app(text: &str) -> App {
        let (client, _requests) = RelayClient::channel();
        let geometry = PopupGeometry { width: 30, height: 8, offset: 2, flip_gap: 1, edge_margin: 1 };
        let controller = SelectionController::new(client, geometry, Viewport::new(80, 24));
        App::new(Document::from_text("doc", text), controller, Rect::new(0, 0, 80, 24))
    }

    #[test]
    fn test_doc_pos_at_maps_through_border() {
        let a = app("abc\ndef");
        assert_eq!(a.doc_pos_at(Point::new(1, 1)), Some(DocPos { line: 0, col: 0 }));
        assert_eq!(a.doc_pos_at(Point::new(3, 2)), Some(DocPos { line: 1, col: 2 }));
        assert_eq!(a.doc_pos_at(Point::new(0, 0)), None);
        assert_eq!(a.doc_pos_at(Point::new(5, 23)), None);
    }

    #[test]
    fn test_doc_pos_clamped_snaps_to_edge() {
        let a = app("abc\ndef");
        assert_eq!(a.doc_pos_clamped(Point::new(-4, 0)), DocPos { line: 0, col: 0 });
    }

    #[test]
    fn test_resize_updates_area() {
        let mut a = app("abc");
        a.resize(40, 10);
        assert_eq!(a.text_area(), Rect::new(1, 1, 38, 7));
    }
}
