//! GameView: draws a [`GameSnapshot`] into a framebuffer.
//!
//! Pure, no I/O. The board size comes from the snapshot so any configured
//! grid fits.

use crate::core::GameSnapshot;
use crate::fb::{Cell, CellStyle, FrameBuffer};
use crate::types::Rgb;

const PLAY_BG: Rgb = Rgb::new(30, 30, 40);
const SCREEN_BG: Rgb = Rgb::new(0, 0, 0);
const STACK_FG: Rgb = Rgb::new(150, 150, 160);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Board geometry resolved for one frame
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: u16,
    y: u16,
    w: u16,
    h: u16,
}

pub struct GameView {
    /// Board cell width in terminal columns
    cell_w: u16,
    /// Board cell height in terminal rows
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // Two columns per cell keeps cells roughly square.
        Self::new(2, 1)
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w,
            cell_h,
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Render into a reused framebuffer, resizing it to the viewport.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Cell::default());

        let frame = self.frame(snap, viewport);
        let play = CellStyle::new(Rgb::new(80, 80, 90), PLAY_BG);
        fb.fill_rect(
            frame.x + 1,
            frame.y + 1,
            frame.w.saturating_sub(2),
            frame.h.saturating_sub(2),
            ' ',
            play,
        );
        draw_border(fb, frame, CellStyle::new(Rgb::new(200, 200, 200), SCREEN_BG));

        let dot = CellStyle::new(Rgb::new(90, 90, 100), PLAY_BG);
        let stack = CellStyle::new(STACK_FG, PLAY_BG);
        for y in 0..snap.height {
            for x in 0..snap.width {
                let (ch, style) = if snap.is_filled(x, y) {
                    ('█', stack)
                } else {
                    ('·', dot)
                };
                self.fill_cell(fb, frame, x as i32, y as i32, ch, style);
            }
        }

        if let Some(active) = snap.active {
            let style = CellStyle::new(active.color, PLAY_BG).bold();
            for &(x, y) in &active.body {
                // Rows above the screen are not drawn.
                if x >= 0 && y >= 0 && (x as usize) < snap.width && (y as usize) < snap.height {
                    self.fill_cell(fb, frame, x, y, '█', style);
                }
            }
        }

        draw_side_panel(fb, snap, viewport, frame);

        if snap.game_over {
            draw_overlay_text(fb, frame, "GAME OVER");
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    /// Terminal position of the top-left border corner and the border size
    fn frame(&self, snap: &GameSnapshot, viewport: Viewport) -> Frame {
        let w = (snap.width as u16).saturating_mul(self.cell_w).saturating_add(2);
        let h = (snap.height as u16).saturating_mul(self.cell_h).saturating_add(2);
        let x = viewport.width.saturating_sub(w) / 2;
        let y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(h) / 2,
            AnchorY::Top => 0,
        };
        Frame { x, y, w, h }
    }

    fn fill_cell(&self, fb: &mut FrameBuffer, frame: Frame, x: i32, y: i32, ch: char, style: CellStyle) {
        let px = frame.x + 1 + x as u16 * self.cell_w;
        let py = frame.y + 1 + y as u16 * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }
}

fn draw_border(fb: &mut FrameBuffer, frame: Frame, style: CellStyle) {
    let Frame { x, y, w, h } = frame;
    if w < 2 || h < 2 {
        return;
    }
    let (right, bottom) = (x + w - 1, y + h - 1);

    fb.put_char(x, y, '┌', style);
    fb.put_char(right, y, '┐', style);
    fb.put_char(x, bottom, '└', style);
    fb.put_char(right, bottom, '┘', style);
    for cx in x + 1..right {
        fb.put_char(cx, y, '─', style);
        fb.put_char(cx, bottom, '─', style);
    }
    for cy in y + 1..bottom {
        fb.put_char(x, cy, '│', style);
        fb.put_char(right, cy, '│', style);
    }
}

fn draw_side_panel(fb: &mut FrameBuffer, snap: &GameSnapshot, viewport: Viewport, frame: Frame) {
    let panel_x = frame.x.saturating_add(frame.w).saturating_add(2);
    if viewport.width.saturating_sub(panel_x) < 8 {
        return;
    }

    let label = CellStyle::default().bold();
    let value = CellStyle::new(Rgb::new(200, 200, 200), SCREEN_BG);

    let mut y = frame.y;
    for (name, n) in [
        ("SCORE", snap.score),
        ("LEVEL", snap.level),
        ("LINES", snap.lines),
    ] {
        fb.put_str(panel_x, y, name, label);
        fb.put_u32(panel_x, y.saturating_add(1), n, value);
        y = y.saturating_add(3);
    }

    if let Some(active) = snap.active {
        fb.put_str(panel_x, y, "PIECE", label);
        fb.put_str(
            panel_x,
            y.saturating_add(1),
            active.kind.name(),
            CellStyle::new(active.color, SCREEN_BG).bold(),
        );
    }
}

fn draw_overlay_text(fb: &mut FrameBuffer, frame: Frame, text: &str) {
    let text_w = text.chars().count() as u16;
    let x = frame.x.saturating_add(frame.w.saturating_sub(text_w) / 2);
    let y = frame.y.saturating_add(frame.h / 2);
    let style = CellStyle::new(Rgb::new(255, 255, 255), SCREEN_BG).bold();
    fb.put_str(x, y, text, style);
}
