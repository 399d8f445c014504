use std::fs;
use std::path::Path;

use anyhow::Result;
use unicode_width::UnicodeWidthChar;

const TAB_WIDTH: usize = 4;

/// Position inside the document, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DocPos {
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TextSelection {
    anchor: DocPos,
    head: DocPos,
    dragged: bool,
}

impl TextSelection {
    fn ordered(&self) -> (DocPos, DocPos) {
        if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }
}

/// The text shown in the main pane, with the user's mouse selection.
pub struct Document {
    pub title: String,
    lines: Vec<Vec<char>>,
    scroll: usize,
    selection: Option<TextSelection>,
}

impl Document {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let title = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_text(title, &text))
    }

    pub fn from_text(title: impl Into<String>, text: &str) -> Self {
        let mut lines: Vec<Vec<char>> = text
            .lines()
            .map(|line| line.replace('\t', &" ".repeat(TAB_WIDTH)).chars().collect())
            .collect();
        if lines.is_empty() {
            lines.push(Vec::new());
        }
        Self { title: title.into(), lines, scroll: 0, selection: None }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> Option<String> {
        self.lines.get(index).map(|chars| chars.iter().collect())
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.lines.len().saturating_sub(1) as isize;
        self.scroll = (self.scroll as isize + delta).clamp(0, max) as usize;
    }

    /// Maps a cell inside the text area (relative to its top-left) to a document position.
    /// Double-width characters cover two cells; both map to the same character.
    pub fn pos_at(&self, row: usize, col: usize) -> DocPos {
        let line = (self.scroll + row).min(self.lines.len() - 1);
        DocPos { line, col: char_at_cell(&self.lines[line], col) }
    }

    pub fn begin_selection(&mut self, pos: DocPos) {
        let pos = self.clamp(pos);
        self.selection = Some(TextSelection { anchor: pos, head: pos, dragged: false });
    }

    pub fn extend_selection(&mut self, pos: DocPos) {
        let pos = self.clamp(pos);
        if let Some(selection) = self.selection.as_mut() {
            selection.head = pos;
            selection.dragged = true;
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Selected characters, both ends inclusive, lines joined with `\n`.
    /// Empty until the pointer has been dragged.
    pub fn selected_text(&self) -> String {
        let Some(selection) = self.selection.filter(|s| s.dragged) else {
            return String::new();
        };
        let (start, end) = selection.ordered();

        (start.line..=end.line)
            .map(|line| {
                let chars = &self.lines[line];
                let from = if line == start.line { start.col } else { 0 };
                let to = if line == end.line { (end.col + 1).min(chars.len()) } else { chars.len() };
                if from >= to {
                    String::new()
                } else {
                    chars[from..to].iter().collect()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Highlighted column range `[start, end)` on `line`, if any.
    pub fn selection_range(&self, line: usize) -> Option<(usize, usize)> {
        let selection = self.selection.filter(|s| s.dragged)?;
        let (start, end) = selection.ordered();
        if line < start.line || line > end.line {
            return None;
        }
        let len = self.lines.get(line)?.len();
        let from = if line == start.line { start.col } else { 0 };
        let to = if line == end.line { (end.col + 1).min(len) } else { len };
        (from < to).then_some((from, to))
    }

    fn clamp(&self, pos: DocPos) -> DocPos {
        let line = pos.line.min(self.lines.len() - 1);
        let col = pos.col.min(self.lines[line].len().saturating_sub(1));
        DocPos { line, col }
    }
}

/// Index of the character drawn over `cell`, or the line length past its end.
fn char_at_cell(chars: &[char], cell: usize) -> usize {
    let mut right = 0;
    for (index, ch) in chars.iter().enumerate() {
        right += ch.width().unwrap_or(0);
        if cell < right {
            return index;
        }
    }
    chars.len()
}
