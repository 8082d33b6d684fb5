//! Panel descriptions
//!
//! Widgets describe what they want on screen with these plain values; the
//! renderer decides how to draw them. Nothing here knows about terminals.

/// Foreground color of a span or border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tone {
    #[default]
    Default,
    /// Index into the 256-color terminal palette.
    Ansi(u8),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Span {
    pub text: String,
    pub tone: Tone,
    pub bold: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Span {
        Span {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn toned(text: impl Into<String>, tone: Tone) -> Span {
        Span {
            text: text.into(),
            tone,
            bold: false,
        }
    }

    pub fn bold(mut self) -> Span {
        self.bold = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn plain(text: impl Into<String>) -> Line {
        Line {
            spans: vec![Span::plain(text)],
        }
    }

    pub fn toned(text: impl Into<String>, tone: Tone) -> Line {
        Line {
            spans: vec![Span::toned(text, tone)],
        }
    }

    pub fn push(&mut self, span: Span) {
        self.spans.push(span);
    }

    pub fn with(mut self, span: Span) -> Line {
        self.spans.push(span);
        self
    }

    /// Width in character cells.
    pub fn width(&self) -> usize {
        self.spans.iter().map(|s| s.text.chars().count()).sum()
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// A bordered box of text lines.
///
/// `border: None` draws the body without a frame, which is how single-line
/// status bars are described. An `inset` is a nested panel drawn against the
/// right edge of the body area.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Panel {
    pub title: String,
    pub subtitle: Option<String>,
    pub border: Option<Tone>,
    pub body: Vec<Line>,
    pub align: Align,
    pub inset: Option<Box<Panel>>,
}

impl Panel {
    pub fn new(title: impl Into<String>, border: Tone) -> Panel {
        Panel {
            title: title.into(),
            border: Some(border),
            ..Default::default()
        }
    }

    pub fn bare(body: Vec<Line>, align: Align) -> Panel {
        Panel {
            body,
            align,
            ..Default::default()
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Panel {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn body(mut self, body: Vec<Line>, align: Align) -> Panel {
        self.body = body;
        self.align = align;
        self
    }

    pub fn inset(mut self, inset: Panel) -> Panel {
        self.inset = Some(Box::new(inset));
        self
    }

    /// Outer size needed to show the panel without clipping.
    pub fn natural_size(&self) -> (usize, usize) {
        let frame = if self.border.is_some() { 2 } else { 0 };
        let text_width = self.body.iter().map(Line::width).max().unwrap_or(0);
        let heading = self
            .title
            .chars()
            .count()
            .max(self.subtitle.as_deref().map_or(0, |s| s.chars().count()));
        let (inset_w, inset_h) = self.inset.as_ref().map_or((0, 0), |p| p.natural_size());
        (
            text_width.max(heading) + inset_w + frame,
            self.body.len().max(inset_h) + frame,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_width_counts_cells() {
        let line = Line::plain("⣿⣿ ").with(Span::toned("42°C", Tone::Ansi(5)));
        assert_eq!(line.width(), 7);
        assert_eq!(line.text(), "⣿⣿ 42°C");
    }

    #[test]
    fn natural_size_includes_frame_and_inset() {
        let inset = Panel::new("box", Tone::Ansi(7)).body(vec![Line::plain("abcd")], Align::Left);
        let panel = Panel::new("cpu", Tone::Ansi(4))
            .body(vec![Line::plain("xy"), Line::plain("z")], Align::Right)
            .inset(inset);
        assert_eq!(panel.natural_size(), (3 + 6 + 2, 3 + 2));
        assert_eq!(Panel::bare(vec![Line::plain("hi")], Align::Center).natural_size(), (2, 1));
    }
}
