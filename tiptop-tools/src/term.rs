//! Crossterm renderer
//!
//! Draws a composed [`Frame`] with queued crossterm commands and a single
//! flush, so a frame is never left half-written on screen.
//!
//! - Bordered panels get a square box with the title on the top edge and the
//!   subtitle on the bottom edge.
//! - An inset panel is drawn at its natural size against the right edge of
//!   its parent's body area.
//! - Text is clipped to its rectangle, never wrapped.

use std::io::{self, Stdout, Write};

use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::{cursor, terminal, QueueableCommand};
use tiptop::dashboard::{Edge, Frame, Rect, RenderError, Renderer};
use tiptop::panel::{Align, Line, Panel, Tone};

fn color(tone: Tone) -> Color {
    match tone {
        Tone::Default => Color::Reset,
        Tone::Ansi(n) => Color::AnsiValue(n),
    }
}

fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn cells(n: usize) -> u16 {
    n.min(u16::MAX as usize) as u16
}

pub struct TermRenderer<W: Write> {
    out: W,
    /// Fixed drawing area; the terminal size is queried when unset.
    size: Option<(u16, u16)>,
}

impl TermRenderer<Stdout> {
    pub fn stdout() -> TermRenderer<Stdout> {
        TermRenderer::new(io::stdout())
    }
}

impl<W: Write> TermRenderer<W> {
    pub fn new(out: W) -> TermRenderer<W> {
        TermRenderer { out, size: None }
    }

    pub fn with_size(out: W, width: u16, height: u16) -> TermRenderer<W> {
        TermRenderer {
            out,
            size: Some((width, height)),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn panel(&mut self, rect: Rect, panel: &Panel) -> io::Result<()> {
        if rect.is_empty() {
            return Ok(());
        }
        let mut inner = rect;
        if let Some(tone) = panel.border {
            if rect.width >= 2 && rect.height >= 2 {
                self.frame(rect, tone, &panel.title, panel.subtitle.as_deref())?;
                inner = Rect::new(rect.x + 1, rect.y + 1, rect.width - 2, rect.height - 2);
            }
        }

        let mut body = inner;
        if let Some(inset) = &panel.inset {
            let (width, height) = inset.natural_size();
            let (cut, rest) = inner.dock(Edge::Right, cells(width));
            let placed = Rect::new(cut.x, cut.y, cut.width, cut.height.min(cells(height)));
            self.panel(placed, inset)?;
            body = rest;
        }
        self.body(body, &panel.body, panel.align)
    }

    fn frame(&mut self, rect: Rect, tone: Tone, title: &str, subtitle: Option<&str>) -> io::Result<()> {
        let span = rect.width as usize - 2;
        let right = rect.x + rect.width - 1;
        let bottom = rect.y + rect.height - 1;

        self.out.queue(SetForegroundColor(color(tone)))?;
        self.out.queue(cursor::MoveTo(rect.x, rect.y))?;
        self.out.queue(Print(format!("┌{}┐", "─".repeat(span))))?;
        for y in rect.y + 1..bottom {
            self.out.queue(cursor::MoveTo(rect.x, y))?;
            self.out.queue(Print('│'))?;
            self.out.queue(cursor::MoveTo(right, y))?;
            self.out.queue(Print('│'))?;
        }
        self.out.queue(cursor::MoveTo(rect.x, bottom))?;
        self.out.queue(Print(format!("└{}┘", "─".repeat(span))))?;

        // Headings sit on the border, one cell in from the corner.
        for (y, text) in [(rect.y, Some(title)), (bottom, subtitle)] {
            let Some(text) = text.filter(|t| !t.is_empty()) else {
                continue;
            };
            if span < 3 {
                continue;
            }
            self.out.queue(cursor::MoveTo(rect.x + 1, y))?;
            self.out.queue(Print(format!(" {} ", clip(text, span - 2))))?;
        }
        self.out.queue(ResetColor)?;
        Ok(())
    }

    fn body(&mut self, rect: Rect, lines: &[Line], align: Align) -> io::Result<()> {
        if rect.is_empty() {
            return Ok(());
        }
        let room = rect.width as usize;
        for (row, line) in lines.iter().take(rect.height as usize).enumerate() {
            let width = line.width().min(room);
            let offset = match align {
                Align::Left => 0,
                Align::Center => (room - width) / 2,
                Align::Right => room - width,
            };
            self.out
                .queue(cursor::MoveTo(rect.x + cells(offset), rect.y + cells(row)))?;

            let mut left = width;
            for span in &line.spans {
                if left == 0 {
                    break;
                }
                let text = clip(&span.text, left);
                left -= text.chars().count();
                if span.bold {
                    self.out.queue(SetAttribute(Attribute::Bold))?;
                }
                if span.tone != Tone::Default {
                    self.out.queue(SetForegroundColor(color(span.tone)))?;
                }
                self.out.queue(Print(text))?;
                self.out.queue(ResetColor)?;
                if span.bold {
                    self.out.queue(SetAttribute(Attribute::Reset))?;
                }
            }
        }
        Ok(())
    }
}

impl<W: Write> Renderer for TermRenderer<W> {
    fn area(&self) -> Result<Rect, RenderError> {
        let (width, height) = match self.size {
            Some(size) => size,
            None => terminal::size()?,
        };
        Ok(Rect::new(0, 0, width, height))
    }

    fn draw(&mut self, frame: &Frame) -> Result<(), RenderError> {
        self.out.queue(cursor::MoveTo(0, 0))?;
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        for placement in &frame.placements {
            self.panel(placement.rect, &placement.panel)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiptop::dashboard::Placement;
    use tiptop::panel::Span;

    fn render(rect: Rect, panel: Panel) -> String {
        let mut renderer = TermRenderer::with_size(Vec::new(), 40, 10);
        let frame = Frame {
            area: renderer.area().unwrap(),
            placements: vec![Placement {
                region: "test".to_string(),
                rect,
                panel,
            }],
        };
        renderer.draw(&frame).unwrap();
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn area_uses_fixed_size() {
        let renderer = TermRenderer::with_size(Vec::new(), 120, 30);
        assert_eq!(renderer.area().unwrap(), Rect::new(0, 0, 120, 30));
    }

    #[test]
    fn bordered_panel() {
        let panel = Panel::new("cpu", Tone::Ansi(4))
            .subtitle("2400 MHz")
            .body(vec![Line::plain("abcdefghijklmnop")], Align::Left);
        let out = render(Rect::new(0, 0, 10, 3), panel);

        assert!(out.contains("┌────────┐"));
        assert!(out.contains("└────────┘"));
        assert!(out.contains(" cpu "));
        // subtitle clipped to fit between the corners
        assert!(out.contains(" 2400 "));
        assert!(!out.contains("2400 MHz"));
        // body clipped to the 8 inner cells
        assert!(out.contains("abcdefgh"));
        assert!(!out.contains("abcdefghi"));
        assert!(out.contains("\x1b[38;5;4m"));
    }

    #[test]
    fn centered_bare_line() {
        let panel = Panel::bare(vec![Line::plain("hello")], Align::Center);
        let out = render(Rect::new(0, 2, 20, 1), panel);
        // column 7, row 2, one-based
        assert!(out.contains("\x1b[3;8Hhello"));
        assert!(!out.contains('┌'));
    }

    #[test]
    fn right_aligned_body_beside_inset() {
        let inset = Panel::new("box", Tone::Ansi(7)).body(vec![Line::plain("ab")], Align::Left);
        let panel = Panel::new("outer", Tone::Ansi(4))
            .body(vec![Line::default().with(Span::plain("xy").bold())], Align::Right)
            .inset(inset);
        let out = render(Rect::new(0, 0, 20, 5), panel);

        // inset is 5 wide against the right edge of the 18-cell body area
        assert!(out.contains("\x1b[2;15H"));
        // outer body ends where the inset begins
        assert!(out.contains("\x1b[2;13H"));
        assert!(out.contains("xy"));
    }
}
