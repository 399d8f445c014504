use ratatui::layout::{Constraint, Direction, Layout, Rect};
use serde::Deserialize;

use crate::models::{Point, Viewport};

/// Assumed popup footprint and the margins used to place it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PopupGeometry {
    pub width: i32,
    pub height: i32,
    /// Distance right of and below the anchor.
    pub offset: i32,
    /// Gap kept from the anchor when flipping to the left or above.
    pub flip_gap: i32,
    /// Minimum distance from the top and left edges.
    pub edge_margin: i32,
}

/// Top-left corner for a popup opened at `anchor`.
///
/// The popup goes below and to the right of the anchor, flips to the other side
/// on an axis where it would overflow the viewport, and is kept `edge_margin`
/// away from the left and top edges.
pub fn place_popup(anchor: Point, viewport: Viewport, geometry: &PopupGeometry) -> Point {
    let mut left = anchor.x + geometry.offset;
    let mut top = anchor.y + geometry.offset;

    if left + geometry.width > viewport.width {
        left = anchor.x - geometry.width - geometry.flip_gap;
    }
    if top + geometry.height > viewport.height {
        top = anchor.y - geometry.height - geometry.flip_gap;
    }

    Point::new(left.max(geometry.edge_margin), top.max(geometry.edge_margin))
}

/// Splits the frame into document pane and footer.
pub fn screen_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Text area of the document pane, inside its border.
pub fn document_text_area(area: Rect) -> Rect {
    let (pane, _) = screen_layout(area);
    Rect {
        x: pane.x + 1,
        y: pane.y + 1,
        width: pane.width.saturating_sub(2),
        height: pane.height.saturating_sub(2),
    }
}

/// Screen rectangle for a popup, clipped to `area`. `None` if nothing is visible.
pub fn clip_to_area(position: Point, width: i32, height: i32, area: Rect) -> Option<Rect> {
    let left = position.x.max(area.x as i32);
    let top = position.y.max(area.y as i32);
    let right = (position.x + width).min(area.right() as i32);
    let bottom = (position.y + height).min(area.bottom() as i32);
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect::new(left as u16, top as u16, (right - left) as u16, (bottom - top) as u16))
}
