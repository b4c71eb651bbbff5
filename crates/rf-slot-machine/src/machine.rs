//! Machine model
//!
//! The state a renderer reads every frame: reels with their cards, the
//! start/stop controls and the digit-reel score counter. No drawing happens
//! here; the renderer only feeds back control hit boxes.

use serde::{Deserialize, Serialize};

use rf_core::Seconds;

use crate::combination::Range;
use crate::config::GameConfig;
use crate::reel::ReelMotion;
use crate::symbols::{SYMBOL_COUNT, SymbolRow};

// ═══════════════════════════════════════════════════════════════════════════════
// INPUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Pointer event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    Move,
    Press,
}

/// Pointer event in window coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub kind: InputKind,
    pub x: f32,
    pub y: f32,
}

impl InputEvent {
    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            kind: InputKind::Move,
            x,
            y,
        }
    }

    pub fn pressed(x: f32, y: f32) -> Self {
        Self {
            kind: InputKind::Press,
            x,
            y,
        }
    }
}

/// Axis-aligned box, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONTROLS
// ═══════════════════════════════════════════════════════════════════════════════

/// Visual state of an on/off control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlState {
    Idle,
    Disabled,
    Focused,
    Clicked,
}

/// Start or stop button
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    state: ControlState,
    hitbox: Rect,
}

impl Control {
    /// Enabled control with an empty hit box
    pub fn new() -> Self {
        Self {
            state: ControlState::Idle,
            hitbox: Rect::default(),
        }
    }

    #[inline]
    pub fn state(&self) -> ControlState {
        self.state
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.state != ControlState::Disabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.state = match (enabled, self.state) {
            (true, ControlState::Disabled) => ControlState::Idle,
            (true, state) => state,
            (false, _) => ControlState::Disabled,
        };
    }

    pub fn hitbox(&self) -> Rect {
        self.hitbox
    }

    /// Set by the renderer after layout
    pub fn set_hitbox(&mut self, hitbox: Rect) {
        self.hitbox = hitbox;
    }

    /// Update the visual state; true when the control fired
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        if self.state == ControlState::Disabled {
            return false;
        }
        if !self.hitbox.contains(event.x, event.y) {
            self.state = ControlState::Idle;
            return false;
        }
        match event.kind {
            InputKind::Move => {
                self.state = ControlState::Focused;
                false
            }
            InputKind::Press => {
                self.state = ControlState::Clicked;
                true
            }
        }
    }
}

impl Default for Control {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REELS
// ═══════════════════════════════════════════════════════════════════════════════

/// Card cover colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CardColor {
    #[default]
    Normal,
    Highlighted,
}

/// One column of cards driven by a [`ReelMotion`]
#[derive(Debug, Clone, PartialEq)]
pub struct Reel {
    motion: ReelMotion,
    cards: Vec<CardColor>,
    lines: u8,
}

impl Reel {
    pub fn new(cards: usize, lines: u8) -> Self {
        Self {
            motion: ReelMotion::new(cards as f64),
            cards: vec![CardColor::Normal; cards],
            lines,
        }
    }

    /// Change the card count, re-wrapping the motion
    pub fn resize(&mut self, cards: usize) {
        self.motion.set_reel_length(cards as f64);
        self.cards.resize(cards, CardColor::Normal);
    }

    #[inline]
    pub fn motion(&self) -> &ReelMotion {
        &self.motion
    }

    #[inline]
    pub fn motion_mut(&mut self) -> &mut ReelMotion {
        &mut self.motion
    }

    pub fn lines(&self) -> u8 {
        self.lines
    }

    pub fn set_lines(&mut self, lines: u8) {
        self.lines = lines;
    }

    pub fn cards(&self) -> &[CardColor] {
        &self.cards
    }

    pub fn card(&self, index: usize) -> Option<CardColor> {
        self.cards.get(index).copied()
    }

    pub fn set_card(&mut self, index: usize, color: CardColor) {
        if let Some(card) = self.cards.get_mut(index) {
            *card = color;
        }
    }

    pub fn clear_highlight(&mut self) {
        self.cards.fill(CardColor::Normal);
    }

    /// Position of the bottom visible line
    ///
    /// The logical position is the middle line, so the view is shifted down
    /// by half the visible lines and wrapped into `[0, length)`.
    pub fn visual_position(&self) -> f64 {
        let length = self.motion.length();
        let position = self.motion.position() - (self.lines / 2) as f64;
        if position < 0.0 { position + length } else { position }
    }

    /// Card index under the middle line, once at rest
    pub fn card_at_middle(&self) -> usize {
        let cards = self.cards.len().max(1);
        (self.motion.position().round() as usize) % cards
    }

    pub fn update(&mut self, dt: f64) {
        self.motion.advance(dt);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCORE COUNTER
// ═══════════════════════════════════════════════════════════════════════════════

/// Digit reels rolling to the displayed score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCounter {
    reels: Vec<Reel>,
    score: u32,
    settle_time: Seconds,
}

impl ScoreCounter {
    pub fn new(digits: u8, settle_time: Seconds) -> Self {
        let reels = (0..digits)
            .map(|_| {
                let mut reel = Reel::new(10, 1);
                reel.motion_mut().set_min_speed(0.0);
                reel
            })
            .collect();
        Self {
            reels,
            score: 0,
            settle_time,
        }
    }

    /// Roll every digit reel to the new score, right to left
    ///
    /// Digits that don't fit are dropped.
    pub fn set_score(&mut self, score: u32) {
        self.score = score;
        let mut rest = score;
        for reel in self.reels.iter_mut().rev() {
            let digit = rest % 10;
            rest /= 10;
            reel.motion_mut().stop_in(digit as f64, self.settle_time.as_f64());
        }
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    /// Digits currently shown, most significant first
    pub fn shown_digits(&self) -> Vec<u8> {
        self.reels.iter().map(|r| r.card_at_middle() as u8).collect()
    }

    pub fn is_settled(&self) -> bool {
        self.reels.iter().all(|r| r.motion().is_at_rest())
    }

    pub fn update(&mut self, dt: f64) {
        for reel in &mut self.reels {
            reel.update(dt);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SLOT MACHINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Reels, controls and score counter
#[derive(Debug, Clone, PartialEq)]
pub struct SlotMachine {
    reels: Vec<Reel>,
    start: Control,
    stop: Control,
    score: ScoreCounter,
}

impl SlotMachine {
    pub fn new(config: &GameConfig) -> Self {
        let reels = (0..config.grid.reels)
            .map(|_| {
                let mut reel = Reel::new(SYMBOL_COUNT, config.grid.lines);
                let motion = reel.motion_mut();
                motion.set_min_speed(config.reel_min_cards_per_second());
                motion.set_max_speed(config.reel_max_cards_per_second());
                reel
            })
            .collect();

        Self {
            reels,
            start: Control::new(),
            stop: Control::new(),
            score: ScoreCounter::new(config.score_digits, config.timing.result_show),
        }
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    pub fn reels_mut(&mut self) -> &mut [Reel] {
        &mut self.reels
    }

    pub fn start_control(&self) -> &Control {
        &self.start
    }

    pub fn start_control_mut(&mut self) -> &mut Control {
        &mut self.start
    }

    pub fn stop_control(&self) -> &Control {
        &self.stop
    }

    pub fn stop_control_mut(&mut self) -> &mut Control {
        &mut self.stop
    }

    pub fn score_counter(&self) -> &ScoreCounter {
        &self.score
    }

    pub fn score_counter_mut(&mut self) -> &mut ScoreCounter {
        &mut self.score
    }

    pub fn all_reels_at_rest(&self) -> bool {
        self.reels.iter().all(|r| r.motion().is_at_rest())
    }

    /// Colour the cards of `row` that fall inside `range`
    pub fn highlight(&mut self, range: Range, row: &SymbolRow) {
        for i in range.indices() {
            if let (Some(reel), Some(symbol)) = (self.reels.get_mut(i), row.get(i)) {
                reel.set_card(symbol.index(), CardColor::Highlighted);
            }
        }
    }

    pub fn clear_highlight(&mut self) {
        for reel in &mut self.reels {
            reel.clear_highlight();
        }
    }

    /// Advance every reel and digit reel
    pub fn update(&mut self, dt: f64) {
        for reel in &mut self.reels {
            reel.update(dt);
        }
        self.score.update(dt);
    }
}
