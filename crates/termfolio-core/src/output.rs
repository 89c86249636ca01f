#![forbid(unsafe_code)]

//! Output view: the scrollback of styled lines shown in the terminal panel.

use crate::command::Command;

/// Visual class of a whole line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineStyle {
    #[default]
    Plain,
    /// Echo of a submitted command, prompt included.
    CommandEcho,
    Error,
    Warning,
    Success,
    SectionHeader,
    /// Placeholder shown while a command is "executing".
    Loading,
    /// Preformatted art; never reflowed.
    AsciiArt,
}

/// Visual class of a run of text within a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    Text,
    /// Clicking runs the command.
    CommandLink(Command),
    Highlight,
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub kind: SpanKind,
}

impl Span {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: SpanKind::Text,
        }
    }

    #[must_use]
    pub fn link(command: Command) -> Self {
        Self {
            text: command.name().to_string(),
            kind: SpanKind::CommandLink(command),
        }
    }

    #[must_use]
    pub fn highlight(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: SpanKind::Highlight,
        }
    }

    #[must_use]
    pub fn url(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            text: label.into(),
            kind: SpanKind::Url(target.into()),
        }
    }
}

/// Identifies a loading placeholder so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadingId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputLine {
    pub spans: Vec<Span>,
    pub style: LineStyle,
    pub loading: Option<LoadingId>,
}

impl OutputLine {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            spans: vec![Span::text(text)],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn styled(text: impl Into<String>, style: LineStyle) -> Self {
        Self {
            spans: vec![Span::text(text)],
            style,
            loading: None,
        }
    }

    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_spans(spans: Vec<Span>) -> Self {
        Self {
            spans,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    /// Concatenated text of every span.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Commands linked from this line, in order.
    pub fn links(&self) -> impl Iterator<Item = Command> + '_ {
        self.spans.iter().filter_map(|span| match span.kind {
            SpanKind::CommandLink(cmd) => Some(cmd),
            _ => None,
        })
    }
}

/// Append-only scrollback with a scroll offset measured from the bottom.
#[derive(Debug, Clone, Default)]
pub struct OutputView {
    lines: Vec<OutputLine>,
    scroll_from_bottom: usize,
    revision: u64,
}

impl OutputView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[OutputLine] {
        &self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Bumped on every mutation; renderers use it to skip redraws.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn push(&mut self, line: OutputLine) {
        self.lines.push(line);
        self.revision += 1;
    }

    pub fn extend(&mut self, lines: impl IntoIterator<Item = OutputLine>) {
        self.lines.extend(lines);
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.scroll_from_bottom = 0;
        self.revision += 1;
    }

    /// Remove a loading placeholder. Missing ids are ignored.
    pub fn remove_loading(&mut self, id: LoadingId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.loading != Some(id));
        let removed = self.lines.len() != before;
        if removed {
            self.revision += 1;
        }
        removed
    }

    /// Jump back to the newest output.
    pub fn scroll_to_bottom(&mut self) {
        if self.scroll_from_bottom != 0 {
            self.scroll_from_bottom = 0;
            self.revision += 1;
        }
    }

    /// Scroll towards older output by `lines`.
    pub fn scroll_up(&mut self, lines: usize) {
        let max = self.lines.len().saturating_sub(1);
        self.scroll_from_bottom = (self.scroll_from_bottom + lines).min(max);
        self.revision += 1;
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(lines);
        self.revision += 1;
    }

    #[must_use]
    pub fn scroll_from_bottom(&self) -> usize {
        self.scroll_from_bottom
    }

    /// Lines visible in a window of `height` rows, oldest first.
    #[must_use]
    pub fn visible(&self, height: usize) -> &[OutputLine] {
        let end = self.lines.len().saturating_sub(self.scroll_from_bottom);
        let start = end.saturating_sub(height);
        &self.lines[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_with(n: usize) -> OutputView {
        let mut view = OutputView::new();
        for i in 0..n {
            view.push(OutputLine::new(format!("line {i}")));
        }
        view
    }

    #[test]
    fn visible_tracks_bottom() {
        let view = view_with(10);
        let visible: Vec<String> = view.visible(3).iter().map(OutputLine::plain_text).collect();
        assert_eq!(visible, vec!["line 7", "line 8", "line 9"]);
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut view = view_with(5);
        view.scroll_up(100);
        assert_eq!(view.scroll_from_bottom(), 4);
        assert_eq!(view.visible(2)[0].plain_text(), "line 0");
        view.scroll_down(100);
        assert_eq!(view.scroll_from_bottom(), 0);
    }

    #[test]
    fn loading_lines_are_removed_by_id() {
        let mut view = view_with(2);
        view.push(OutputLine {
            loading: Some(LoadingId(7)),
            ..OutputLine::styled("> Executing help", LineStyle::Loading)
        });
        assert!(view.remove_loading(LoadingId(7)));
        assert!(!view.remove_loading(LoadingId(7)));
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn links_are_extracted_in_order() {
        let line = OutputLine::from_spans(vec![
            Span::text("Try: "),
            Span::link(Command::Matrix),
            Span::text(", "),
            Span::link(Command::Hack),
        ]);
        assert_eq!(line.links().collect::<Vec<_>>(), vec![Command::Matrix, Command::Hack]);
        assert_eq!(line.plain_text(), "Try: matrix, hack");
    }

    #[test]
    fn clear_resets_scroll() {
        let mut view = view_with(5);
        view.scroll_up(2);
        let rev = view.revision();
        view.clear();
        assert!(view.is_empty());
        assert_eq!(view.scroll_from_bottom(), 0);
        assert!(view.revision() > rev);
    }
}
