/// Screen coordinate in terminal cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// A finished mouse selection: the trimmed text and where the pointer was released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEvent {
    pub text: String,
    pub point: Point,
}

impl SelectionEvent {
    /// Returns `None` when the selection is empty after trimming.
    pub fn capture(raw: &str, point: Point) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self { text: text.to_string(), point })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplanationResult {
    Explanation(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupKind {
    Loading,
    Result(String),
    Error(String),
}

/// The single floating popup. `anchor` is the selection point it was opened for,
/// `position` its current top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub kind: PopupKind,
    pub anchor: Point,
    pub position: Point,
    pub width: i32,
    pub height: i32,
    pub generation: u64,
    pub dismiss_on_click: bool,
}

impl Popup {
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.position.x
            && point.x < self.position.x + self.width
            && point.y >= self.position.y
            && point.y < self.position.y + self.height
    }

    pub fn is_loading(&self) -> bool {
        self.kind == PopupKind::Loading
    }
}
