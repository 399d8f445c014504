//! Selection controller: cursor tracking, popup lifecycle, and the bridge from
//! mouse selections to relay requests.

use tracing::{debug, warn};

use crate::models::{ExplanationResult, Point, Popup, PopupKind, SelectionEvent, Viewport};
use crate::relay::{RelayClient, RelayMessage};
use crate::utils::{PopupGeometry, place_popup};

pub struct SelectionController {
    cursor: Point,
    popup: Option<Popup>,
    hovering: bool,
    popup_scroll: u16,
    generation: u64,
    viewport: Viewport,
    geometry: PopupGeometry,
    relay: RelayClient,
}

impl SelectionController {
    pub fn new(relay: RelayClient, geometry: PopupGeometry, viewport: Viewport) -> Self {
        Self {
            cursor: Point::default(),
            popup: None,
            hovering: false,
            popup_scroll: 0,
            generation: 0,
            viewport,
            geometry,
            relay,
        }
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Lines of the popup body scrolled off the top.
    pub fn popup_scroll(&self) -> u16 {
        self.popup_scroll
    }

    /// Scrolls a result or error body by `delta` lines, never past `max`.
    /// Returns whether there was a popup to scroll.
    pub fn scroll_popup(&mut self, delta: i32, max: u16) -> bool {
        if !self.popup.as_ref().is_some_and(|popup| !popup.is_loading()) {
            return false;
        }
        self.popup_scroll = (self.popup_scroll as i32 + delta).clamp(0, max as i32) as u16;
        true
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn popup_contains(&self, point: Point) -> bool {
        self.popup.as_ref().is_some_and(|popup| popup.contains(point))
    }

    /// Tracks the pointer. While the pointer is not resting on the popup, the popup
    /// follows it.
    pub fn on_pointer_move(&mut self, point: Point) {
        self.cursor = point;

        let Some(inside) = self.popup.as_ref().map(|popup| popup.contains(point)) else {
            return;
        };
        if inside && !self.hovering {
            self.on_popup_enter();
        } else if !inside && self.hovering {
            self.on_popup_leave();
        }

        if !self.hovering {
            let position = place_popup(point, self.viewport, &self.geometry);
            if let Some(popup) = self.popup.as_mut() {
                popup.position = position;
            }
        }
    }

    pub fn on_popup_enter(&mut self) {
        self.hovering = true;
    }

    pub fn on_popup_leave(&mut self) {
        self.hovering = false;
    }

    /// Starts an explanation for the released selection. Returns whether a request
    /// was issued.
    pub fn on_pointer_release(&mut self, selected: &str) -> bool {
        let Some(event) = SelectionEvent::capture(selected, self.cursor) else {
            return false;
        };

        // The loading popup carries the generation of its request.
        self.generation += 1;
        let generation = self.generation;
        self.show_loading(event.point);

        if let Err(err) = self.relay.explain(generation, &event.text) {
            warn!(error = %err, "relay unavailable");
            self.show_error(&err.to_string(), event.point);
            return false;
        }
        debug!(generation, chars = event.text.chars().count(), "explanation requested");
        true
    }

    pub fn on_relay_message(&mut self, message: RelayMessage) {
        match message {
            RelayMessage::Trace(line) => debug!(target: "whatisthis::relay", "{}", line),
            RelayMessage::Explained { generation, result } => {
                let anchor = match self.popup.as_ref() {
                    Some(popup) if popup.is_loading() && popup.generation == generation => popup.anchor,
                    _ => {
                        debug!(generation, current = self.generation, "discarding stale explanation");
                        return;
                    }
                };
                match result {
                    ExplanationResult::Explanation(text) => self.show_result(&text, anchor),
                    ExplanationResult::Error(message) => self.show_error(&message, anchor),
                }
            }
        }
    }

    /// Click-to-dismiss. The handler belongs to the current result or error popup and
    /// fires once, on the first click outside it.
    pub fn on_click(&mut self, point: Point) {
        let armed = self
            .popup
            .as_ref()
            .is_some_and(|popup| popup.dismiss_on_click && !popup.contains(point));
        if armed {
            self.remove_popup();
        }
    }

    pub fn dismiss(&mut self) {
        self.remove_popup();
    }

    pub fn show_loading(&mut self, anchor: Point) {
        self.open(PopupKind::Loading, anchor, false);
    }

    pub fn show_result(&mut self, explanation: &str, anchor: Point) {
        self.open(PopupKind::Result(explanation.to_string()), anchor, true);
    }

    /// Error popups close like results: a click outside dismisses them.
    pub fn show_error(&mut self, message: &str, anchor: Point) {
        self.open(PopupKind::Error(message.to_string()), anchor, true);
    }

    pub fn remove_popup(&mut self) {
        self.popup = None;
        self.hovering = false;
        self.popup_scroll = 0;
    }

    fn open(&mut self, kind: PopupKind, anchor: Point, dismiss_on_click: bool) {
        self.remove_popup();
        self.popup = Some(Popup {
            kind,
            anchor,
            position: place_popup(anchor, self.viewport, &self.geometry),
            width: self.geometry.width,
            height: self.geometry.height,
            generation: self.generation,
            dismiss_on_click,
        });
    }
}
