//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────┬─────────────────────┐
//! │                                      │  GESTURE  rock      │
//! │   camera view (640 × 480)            │  score 0.042        │
//! │                                      │                     │
//! │   skeleton per hand                  │  RANKING            │
//! │   fingertip trail                    │  1. rock   0.042    │
//! │                                      │  2. paper  0.611    │
//! │                                      │                     │
//! │                                      │  HANDS / LAST CMD   │
//! ├──────────────────────────────────────┴─────────────────────┤
//! │  status bar                                                │
//! │  key legend                                                │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pointer inside the camera view drives the simulated hand.  During a
//! rock-paper-scissors round the countdown and the result are drawn large
//! across the camera view.

use std::sync::mpsc::Sender;
use std::time::Instant;

use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use hand_pose::landmark::HAND_CONNECTIONS;
use hand_pose::synth::HandShape;
use hand_pose::LandmarkFrame;
use swipe_control::HandSlot;

use crate::app::AppState;
use crate::source::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const VIEW_W:     usize = 640;
pub const VIEW_H:     usize = 480;
const PANEL_W:        usize = 300;
pub const WIN_W:      usize = VIEW_W + PANEL_W;
pub const WIN_H:      usize = VIEW_H + 56;
const STATUS_Y:       usize = VIEW_H;
const BG_COLOR:       u32   = 0xFF1A1A2E;
const VIEW_BG:        u32   = 0xFF101018;
const PANEL_BG:       u32   = 0xFF16213E;
const TEXT_BG:        u32   = 0xFF0F3460;
const BONE_RIGHT:     u32   = 0xFF66CCFF;
const BONE_LEFT:      u32   = 0xFFFFAA66;
const JOINT_COLOR:    u32   = 0xFFFFFFFF;
const TRAIL_COLOR:    u32   = 0xFFFFD700;  // gold
const KNOWN_COLOR:    u32   = 0xFF66FF99;
const UNKNOWN_COLOR:  u32   = 0xFFFF6666;
const DIM_TEXT:       u32   = 0xFF888888;
const OVERLAY_COLOR:  u32   = 0xFFFFE4C4;
const OVERLAY_SCALE:  usize = 8;

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:   Window,
    buf:      Vec<u32>,
    sim_tx:   Sender<SimInput>,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            "Gesture Pilot",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll mouse and keyboard and translate to SimInput events.  The pointer
    /// is sent every call; it is the simulator's frame clock.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let mut inputs = Vec::new();

        if one_shot(Key::Q) {
            let _ = self.sim_tx.send(SimInput::Quit);
            return false;
        }

        let shape_keys = [Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5, Key::Key6];
        for (key, shape) in shape_keys.into_iter().zip(HandShape::all()) {
            if one_shot(key) { inputs.push(SimInput::Shape(shape)); }
        }
        if one_shot(Key::H) { inputs.push(SimInput::ToggleHand); }
        if one_shot(Key::B) { inputs.push(SimInput::ToggleSecondHand); }
        if one_shot(Key::G) { inputs.push(SimInput::StartGame); }
        // C must arrive before a shape key pressed in the same frame.
        if one_shot(Key::C) { inputs.insert(0, SimInput::ArmCapture); }

        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            inputs.push(SimInput::Pointer {
                x: (mx as f64 / VIEW_W as f64).clamp(0.0, 1.0),
                y: (my as f64 / VIEW_H as f64).clamp(0.0, 1.0),
            });
        }

        for input in inputs {
            let _ = self.sim_tx.send(input);
        }
        true
    }

    /// Render one frame.
    pub fn render(&mut self, app: &AppState) {
        // Clear
        self.buf.fill(BG_COLOR);
        self.fill_rect(0, 0, VIEW_W, VIEW_H, VIEW_BG);
        self.fill_rect(VIEW_W, 0, PANEL_W, VIEW_H, PANEL_BG);

        // ── Hands and trails ──────────────────────────────────────────────
        let frame = app.frame();
        for (slot, hand) in &frame.hands {
            let color = match slot {
                HandSlot::Right => BONE_RIGHT,
                HandSlot::Left  => BONE_LEFT,
            };
            self.draw_skeleton(hand, color);
        }
        for slot in HandSlot::all() {
            if let Some(session) = app.session(slot) {
                let pts: Vec<(i32, i32)> = session.tracker().trail().points()
                    .map(|p| (p.x.round() as i32, p.y.round() as i32))
                    .collect();
                for w in pts.windows(2) {
                    self.draw_line(w[0], w[1], TRAIL_COLOR);
                }
                for &(x, y) in &pts {
                    self.fill_square(x, y, 2, TRAIL_COLOR);
                }
            }
        }

        // ── Game overlay ──────────────────────────────────────────────────
        if let Some(text) = app.game().overlay(Instant::now()) {
            let w = text.chars().count() * 4 * OVERLAY_SCALE;
            let x = VIEW_W.saturating_sub(w) / 2;
            let y = (VIEW_H - 5 * OVERLAY_SCALE) / 2;
            self.draw_scaled(text, x, y, OVERLAY_SCALE, OVERLAY_COLOR);
        }

        // ── Side panel ────────────────────────────────────────────────────
        self.draw_panel(app);

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        self.draw_label(&app.status, 10, STATUS_Y + 12, 0xFFEEEEEE);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label(
            "mouse=move  1-6=rock/paper/scissors/point/phone/heart  H=hide  B=both hands  C+1-6=capture  G=rps  Q=quit",
            10, WIN_H - 16, DIM_TEXT,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Side panel ────────────────────────────────────────────────────────

    fn draw_panel(&mut self, app: &AppState) {
        let x = VIEW_W + 12;
        let mut y = 12;

        self.draw_label("GESTURE", x, y, 0xFFFFD700);
        y += 12;
        match app.label() {
            Some(result) => {
                let color = if result.is_known() { KNOWN_COLOR } else { UNKNOWN_COLOR };
                self.draw_label(&result.label.to_string(), x, y, color);
                self.draw_label(&format!("score {:.3}", result.score), x + 120, y, DIM_TEXT);
            }
            None => self.draw_label("-", x, y, DIM_TEXT),
        }
        y += 20;

        self.draw_label("RANKING", x, y, 0xFFFFD700);
        y += 12;
        let best = app.ranking().first().map(|s| s.score);
        for (rank, s) in app.ranking().iter().take(8).enumerate() {
            self.draw_label(&format!("{}. {}", rank + 1, s.gesture), x, y, 0xFFEEEEEE);
            self.draw_label(&format!("{:.3}", s.score), x + 120, y, DIM_TEXT);
            // Bar: shorter is closer.
            let rel = best.map_or(1.0, |b| if s.score > 0.0 { b / s.score } else { 1.0 });
            let w = (rel.clamp(0.0, 1.0) * 90.0) as usize;
            self.fill_rect(x + 170, y, w.max(1), 5, if rank == 0 { KNOWN_COLOR } else { 0xFF446688 });
            y += 10;
        }
        if app.ranking().is_empty() {
            let n = app.library().store().len();
            self.draw_label(&format!("({} exemplars)", n), x, y, DIM_TEXT);
            y += 10;
        }
        y += 14;

        self.draw_label("HANDS", x, y, 0xFFFFD700);
        y += 12;
        for slot in HandSlot::all() {
            self.draw_label(&format!("{}: {}", slot, app.hand_status(slot)), x, y, 0xFFEEEEEE);
            y += 10;
        }
        y += 14;

        self.draw_label("LAST COMMAND", x, y, 0xFFFFD700);
        y += 12;
        let last = app.last_fired().map_or_else(|| "-".to_string(), |f| f.describe());
        self.draw_label(&last, x, y, 0xFFEEEEEE);
        y += 24;

        self.draw_label("MEDIA", x, y, 0xFFFFD700);
        y += 12;
        let playing = if app.actions().media_playing() { "playing" } else { "paused" };
        let front = app.actions().current_app().unwrap_or("-");
        self.draw_label(&format!("{}  app: {}", playing, front), x, y, 0xFFEEEEEE);
        y += 24;

        if let Some(g) = app.capture_pending() {
            self.draw_label(&format!("capture armed: {}", g), x, y, UNKNOWN_COLOR);
        }
    }

    // ── Skeleton ──────────────────────────────────────────────────────────

    fn draw_skeleton(&mut self, hand: &LandmarkFrame, color: u32) {
        let px = |i: usize| hand.pixel(i, VIEW_W, VIEW_H);
        for &(a, b) in HAND_CONNECTIONS.iter() {
            self.draw_line(px(a), px(b), color);
        }
        for i in 0..hand.points().len() {
            let (x, y) = px(i);
            self.fill_square(x, y, 2, JOINT_COLOR);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    /// Square of half-size `r` centred on a view pixel, clipped to the view.
    fn fill_square(&mut self, cx: i32, cy: i32, r: i32, color: u32) {
        for y in cy - r..=cy + r {
            for x in cx - r..=cx + r {
                self.set_view_pixel(x, y, color);
            }
        }
    }

    /// Bresenham line in view coordinates.
    fn draw_line(&mut self, (x0, y0): (i32, i32), (x1, y1): (i32, i32), color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.set_view_pixel(x, y, color);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    fn set_view_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < VIEW_W && (y as usize) < VIEW_H {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    /// Minimal 3×5 bitmap font.
    /// Each character is encoded as 5 rows × 3 bits.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        self.draw_scaled(text, x, y, 1, color);
    }

    /// The bitmap font with every bit drawn as a `scale × scale` block.
    fn draw_scaled(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let advance = 4 * scale; // 3 wide + 1 gap
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += advance;
            if cx + advance > WIN_W { break; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c.to_ascii_lowercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '"' => [0b101, 0b101, 0b000, 0b000, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}
