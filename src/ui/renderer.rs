/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen effects (jolt, screen shake) shift the composed frame sideways;
/// the flash paints over everything.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::domain::lines::{BUT_I_WONT_TEXT, FINAL_TEXT, QUESTION_TEXT, WAIT_TEXT};
use crate::domain::phase::{FinaleStep, Phase};
use crate::sim::show::Show;
use super::layout::{QuestionLayout, Rect};

// ── Palette ──

const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };
const SPOT_BG: Color = Color::Rgb { r: 58, g: 18, b: 38 };
const DARK_BG: Color = Color::Rgb { r: 4, g: 4, b: 6 };
const ROSE: Color = Color::Rgb { r: 255, g: 92, b: 138 };
const HOT_RED: Color = Color::Rgb { r: 255, g: 40, b: 60 };
const SOFT_PINK: Color = Color::Rgb { r: 240, g: 170, b: 190 };
const YES_BG: Color = Color::Rgb { r: 214, g: 51, b: 108 };
const DISABLED_BG: Color = Color::Rgb { r: 70, g: 60, b: 70 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const FLASH_BG: Color = Color::Rgb { r: 255, g: 255, b: 255 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn fill_bg(&mut self, bg: Color) {
        self.cells.fill(Cell::new(' ', Color::White, bg));
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y), keeping each cell's background.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            let bg = self.get(x + i, y).bg;
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn put_str_bg(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color) {
        let len = s.chars().count();
        self.put_str(self.width.saturating_sub(len) / 2, y, s, fg);
    }

    fn fill_rect(&mut self, r: &Rect, bg: Color) {
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                self.set(x as usize, y as usize, Cell::new(' ', Color::White, bg));
            }
        }
    }

    /// Shift every row sideways by `dx` columns, repeating the edge cell.
    fn shift_x(&mut self, dx: i32) {
        if dx == 0 || self.width == 0 { return; }
        let w = self.width;
        for row in self.cells.chunks_mut(w) {
            let n = (dx.unsigned_abs() as usize).min(w);
            if dx > 0 {
                let edge = row[0];
                row.rotate_right(n);
                row[..n].fill(edge);
            } else {
                let edge = row[w - 1];
                row.rotate_left(n);
                row[w - n..].fill(edge);
            }
        }
    }
}

// ── Big digits for the countdown ──

const DIGIT_FONT: [[&str; 5]; 10] = [
    ["###", "# #", "# #", "# #", "###"],
    [" # ", "## ", " # ", " # ", "###"],
    ["###", "  #", "###", "#  ", "###"],
    ["###", "  #", "###", "  #", "###"],
    ["# #", "# #", "###", "  #", "  #"],
    ["###", "#  ", "###", "  #", "###"],
    ["###", "#  ", "###", "# #", "###"],
    ["###", "  #", "  #", "  #", "  #"],
    ["###", "# #", "###", "# #", "###"],
    ["###", "# #", "###", "  #", "###"],
];
/// Each font pixel is two columns wide so digits look square.
const PIXEL_W: usize = 2;
const DIGIT_GAP: usize = 2;

// ── Renderer ──

/// Visual scene (phase, finale step, flash); a change forces a full repaint.
type Scene = (Phase, FinaleStep, bool);

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_scene: Option<Scene>,
    frame: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_scene: None,
            frame: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            DisableMouseCapture,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Where the question screen puts its buttons at the current size.
    pub fn question_layout(&self, show: &Show) -> QuestionLayout {
        QuestionLayout::compute(
            self.term_w.min(u16::MAX as usize) as u16,
            self.term_h.min(u16::MAX as usize) as u16,
            &show.target,
        )
    }

    pub fn render(&mut self, show: &Show) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.invalidate()?;
        }

        let scene: Scene = (show.phase, show.finale_step, show.flash);
        if self.last_scene != Some(scene) {
            self.invalidate()?;
            self.last_scene = Some(scene);
        }

        match show.phase {
            Phase::Intro => self.compose_intro(show),
            Phase::Question => self.compose_question(show),
            Phase::Finale => self.compose_finale(show),
        }

        if show.flash {
            self.front.fill_bg(FLASH_BG);
        }

        if show.jolt || show.screen_shake {
            let dx = if self.frame % 2 == 0 { 2 } else { -2 };
            self.front.shift_x(dx);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        self.frame = self.frame.wrapping_add(1);

        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.back.cells.fill(Cell::INVALID);
        queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Intro: spotlight + countdown ──

    fn compose_intro(&mut self, show: &Show) {
        let (w, h) = (self.front.width, self.front.height);
        self.front.fill_bg(BASE_BG);

        // Spotlight: an ellipse around the center, wider than tall.
        let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
        let (rx, ry) = ((w as f32 * 0.3).max(1.0), (h as f32 * 0.4).max(1.0));
        for y in 0..h {
            for x in 0..w {
                let dx = (x as f32 + 0.5 - cx) / rx;
                let dy = (y as f32 + 0.5 - cy) / ry;
                if dx * dx + dy * dy <= 1.0 {
                    self.front.set(x, y, Cell::new(' ', Color::White, SPOT_BG));
                }
            }
        }

        let digits: Vec<usize> = show
            .countdown
            .to_string()
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| d as usize)
            .collect();
        let glyph_w = 3 * PIXEL_W;
        let total_w = digits.len() * glyph_w + digits.len().saturating_sub(1) * DIGIT_GAP;
        let left = w.saturating_sub(total_w) / 2;
        let top = h.saturating_sub(5) / 2;
        let fg = if show.countdown <= 3 { HOT_RED } else { ROSE };

        for (i, &d) in digits.iter().enumerate() {
            let gx = left + i * (glyph_w + DIGIT_GAP);
            for (row, line) in DIGIT_FONT[d].iter().enumerate() {
                for (col, px) in line.chars().enumerate() {
                    if px != '#' { continue; }
                    for p in 0..PIXEL_W {
                        let x = gx + col * PIXEL_W + p;
                        let bg = self.front.get(x, top + row).bg;
                        self.front.set(x, top + row, Cell::new('█', fg, bg));
                    }
                }
            }
        }

        // The heart beats with the pulse: big for the first few frames of each second.
        let heart = if self.frame % 60 < 8 { "♥ ♥ ♥" } else { "♥" };
        self.front.put_centered(top + 7, heart, ROSE);
    }

    // ── Question: title, message, buttons ──

    fn compose_question(&mut self, show: &Show) {
        self.front.fill_bg(BASE_BG);
        let layout = self.question_layout(show);

        self.front.put_centered(layout.title_row as usize, QUESTION_TEXT, ROSE);

        if let Some(msg) = show.message {
            let text = format!(" {msg} ");
            let len = text.chars().count();
            let x = self.front.width.saturating_sub(len) / 2;
            self.front.put_str_bg(x, layout.message_row as usize, &text, Color::Black, MSG_BG);
        }

        let yes_bg = if show.finale_started { DISABLED_BG } else { YES_BG };
        self.draw_button(&layout.yes, "Yes", Color::White, yes_bg);
        self.draw_button(&layout.no, "No", SOFT_PINK, BASE_BG);

        let help = " Enter/Y: yes   Tab/N: no   Q: quit ";
        self.front.put_str(0, layout.help_row as usize, help, Color::DarkGrey);
    }

    fn draw_button(&mut self, r: &Rect, label: &str, fg: Color, bg: Color) {
        if r.is_empty() { return; }
        self.front.fill_rect(r, bg);
        let (x, y, w) = (r.x as usize, r.y as usize, r.w as usize);
        let inner = w.saturating_sub(2);

        if r.h >= 3 {
            let bar = "─".repeat(inner);
            self.front.put_str(x, y, &format!("┌{bar}┐"), fg);
            self.front.put_str(x, y + 1, &format!("│{label:^inner$}│"), fg);
            self.front.put_str(x, y + 2, &format!("└{bar}┘"), fg);
        } else {
            self.front.put_str(x, y, &format!("[{label:^inner$}]"), fg);
        }
    }

    // ── Finale ──

    fn compose_finale(&mut self, show: &Show) {
        self.front.fill_bg(DARK_BG);
        let mid = self.front.height / 2;

        match show.finale_step {
            FinaleStep::Freeze | FinaleStep::Flash => {}
            FinaleStep::Wait => self.front.put_centered(mid, WAIT_TEXT, HOT_RED),
            FinaleStep::DarkGlitch => self.compose_glitch(),
            FinaleStep::ButIWont => self.front.put_centered(mid, BUT_I_WONT_TEXT, Color::White),
            FinaleStep::TeasingLine => {
                if let Some(lines) = &show.lines {
                    self.front.put_centered(mid, lines.teasing, SOFT_PINK);
                }
            }
            FinaleStep::FinalScreen => {
                self.compose_grain();
                self.front.put_centered(mid.saturating_sub(1), FINAL_TEXT, Color::White);
                if let Some(lines) = &show.lines {
                    self.front.put_centered(mid + 1, lines.subtext, SOFT_PINK);
                }
            }
        }
    }

    /// Torn horizontal bands of block noise, different every frame.
    fn compose_glitch(&mut self) {
        const GLYPHS: [char; 8] = ['▓', '▒', '░', '█', '▌', '▐', '/', '#'];
        let mut rng = SmallRng::seed_from_u64(self.frame);
        for y in 0..self.front.height {
            let band = rng.random_ratio(1, 4);
            for x in 0..self.front.width {
                let hit = if band { rng.random_ratio(1, 3) } else { rng.random_ratio(1, 29) };
                if hit {
                    let ch = GLYPHS[rng.random_range(0..GLYPHS.len())];
                    let fg = if rng.random() { Color::Magenta } else { Color::Cyan };
                    self.front.set(x, y, Cell::new(ch, fg, DARK_BG));
                }
            }
        }
    }

    /// Sparse film grain, reshuffled every third frame.
    fn compose_grain(&mut self) {
        let mut rng = SmallRng::seed_from_u64(self.frame / 3);
        for y in 0..self.front.height {
            for x in 0..self.front.width {
                if rng.random_ratio(1, 40) {
                    self.front.set(x, y, Cell::new('·', Color::DarkGrey, DARK_BG));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &FrameBuffer, y: usize) -> String {
        (0..buf.width).map(|x| buf.get(x, y).ch).collect()
    }

    #[test]
    fn put_centered_centers() {
        let mut buf = FrameBuffer::new(11, 1);
        buf.put_centered(0, "abc", Color::White);
        assert_eq!(row_text(&buf, 0), "    abc    ");
    }

    #[test]
    fn put_str_clips_at_edge() {
        let mut buf = FrameBuffer::new(4, 1);
        buf.put_str(2, 0, "hello", Color::White);
        assert_eq!(row_text(&buf, 0), "  he");
    }

    #[test]
    fn shift_repeats_edge_cells() {
        let mut buf = FrameBuffer::new(5, 1);
        buf.put_str(0, 0, "abcde", Color::White);
        buf.shift_x(2);
        assert_eq!(row_text(&buf, 0), "aaabc");

        let mut buf = FrameBuffer::new(5, 1);
        buf.put_str(0, 0, "abcde", Color::White);
        buf.shift_x(-1);
        assert_eq!(row_text(&buf, 0), "bcdee");
    }

    #[test]
    fn shift_wider_than_row_is_safe() {
        let mut buf = FrameBuffer::new(3, 2);
        buf.put_str(0, 0, "xyz", Color::White);
        buf.shift_x(10);
        assert_eq!(row_text(&buf, 0), "xxx");
    }

    #[test]
    fn glitch_noise_repeats_within_a_frame() {
        let mut r = Renderer::new();
        r.front.resize(40, 10);
        let chars = |r: &Renderer| r.front.cells.iter().map(|c| c.ch).collect::<Vec<_>>();

        r.front.fill_bg(DARK_BG);
        r.compose_glitch();
        let first = chars(&r);
        assert!(first.iter().any(|&c| c != ' '));

        r.front.fill_bg(DARK_BG);
        r.compose_glitch();
        assert_eq!(chars(&r), first);
    }

    #[test]
    fn digit_font_rows_are_three_wide() {
        for glyph in DIGIT_FONT {
            for line in glyph {
                assert_eq!(line.chars().count(), 3);
            }
        }
    }
}
