//! Game controller
//!
//! A finite state machine sequencing one spin:
//!
//! ```text
//! Idle ─start─▶ SpeedUp ─timer─▶ StopWait ─stop/timeout─▶ SlowingDown ─timer─▶ Result
//!  ▲                ▲                                                            │
//!  └────────────────┴──────────────── show_result_time_out ─────────────────────┘
//! ```
//!
//! Transitions are decided by [`GameState::next`], a pure function of the
//! current state and the event. Entry actions (reel commands, control
//! toggling, timers) run in [`Game`] when the new state is constructed.

use std::sync::Arc;

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use rf_core::{Clock, MonotonicClock, Seconds};

use crate::combination::{self, CombinationResult, Range};
use crate::config::GameConfig;
use crate::machine::{InputEvent, SlotMachine};
use crate::symbols::{REEL_COUNT, SYMBOL_COUNT, Symbol, SymbolRow, format_row};
use crate::timing::TimerQueue;

// ═══════════════════════════════════════════════════════════════════════════════
// EVENTS & STATES
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything the controller reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEvent {
    StartPressed,
    StopPressed,
    EnableStopTimer,
    SpinTimeOut,
    ReelsStopped,
    ShowResultTimeOut,
}

/// Active controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Idle,
    SpeedUp,
    StopWait,
    /// Reels are stopping on the recorded row
    SlowingDown { stop_row: SymbolRow },
    /// Showing the outcome of `stop_row`
    Result { stop_row: SymbolRow, auto_spin: bool },
}

/// State without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateKind {
    Idle,
    SpeedUp,
    StopWait,
    SlowingDown,
    Result,
}

/// Requested next state, before its entry actions ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Idle,
    SpeedUp,
    StopWait,
    SlowingDown,
    Result { stop_row: SymbolRow },
}

impl GameState {
    pub fn kind(&self) -> StateKind {
        match self {
            GameState::Idle => StateKind::Idle,
            GameState::SpeedUp => StateKind::SpeedUp,
            GameState::StopWait => StateKind::StopWait,
            GameState::SlowingDown { .. } => StateKind::SlowingDown,
            GameState::Result { .. } => StateKind::Result,
        }
    }

    /// Transition table; `None` means the event is ignored
    pub fn next(&self, event: GameEvent, machine: &SlotMachine) -> Option<Transition> {
        use GameEvent::*;

        match (self, event) {
            (GameState::Idle, StartPressed) => Some(Transition::SpeedUp),
            // Row injected through `set_symbol_row`
            (GameState::Idle, ReelsStopped) => Some(Transition::Result {
                stop_row: read_symbol_row(machine),
            }),
            (GameState::SpeedUp, EnableStopTimer) => Some(Transition::StopWait),
            (GameState::StopWait, StopPressed | SpinTimeOut) => Some(Transition::SlowingDown),
            (GameState::SlowingDown { stop_row }, ReelsStopped) => Some(Transition::Result {
                stop_row: *stop_row,
            }),
            (GameState::Result { auto_spin: true, .. }, ShowResultTimeOut) => {
                Some(Transition::SpeedUp)
            }
            (GameState::Result { auto_spin: false, .. }, ShowResultTimeOut) => {
                Some(Transition::Idle)
            }
            _ => None,
        }
    }
}

/// Symbol under the middle line of every reel
pub fn read_symbol_row(machine: &SlotMachine) -> SymbolRow {
    let mut row = [Symbol::Seven; REEL_COUNT];
    for (slot, reel) in row.iter_mut().zip(machine.reels()) {
        *slot = Symbol::ALL[reel.card_at_middle() % SYMBOL_COUNT];
    }
    row
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATS
// ═══════════════════════════════════════════════════════════════════════════════

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub spins: u64,
    pub wins: u64,
    pub free_spins: u64,
    pub total_points: u64,
    pub best_points: u32,
}

impl GameStats {
    fn record(&mut self, result: &CombinationResult) {
        self.spins += 1;
        if result.is_win() {
            self.wins += 1;
        }
        if result.free_spin {
            self.free_spins += 1;
        }
        self.total_points += u64::from(result.points);
        self.best_points = self.best_points.max(result.points);
    }

    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        if self.spins > 0 {
            (self.wins as f64 / self.spins as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn average_points(&self) -> f64 {
        if self.spins > 0 {
            self.total_points as f64 / self.spins as f64
        } else {
            0.0
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GAME
// ═══════════════════════════════════════════════════════════════════════════════

/// Slot machine game controller
///
/// Owns the machine model, the timers and the RNG. Driven by `update(dt)`
/// once per frame and by `process_input` for pointer events.
pub struct Game<C: Clock = MonotonicClock> {
    config: Arc<GameConfig>,
    rng: StdRng,
    clock: C,
    timers: TimerQueue<GameEvent>,
    machine: SlotMachine,
    state: GameState,
    last_result: Option<CombinationResult>,
    highlighted: Option<Range>,
    stats: GameStats,
}

impl Game<MonotonicClock> {
    /// Wall-clock game with an entropy-seeded RNG
    pub fn new(config: Arc<GameConfig>) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock> Game<C> {
    /// Game on a custom clock with an entropy-seeded RNG
    pub fn with_clock(config: Arc<GameConfig>, clock: C) -> Self {
        Self::with_rng(config, clock, StdRng::from_os_rng())
    }

    /// Game on a custom clock with a fixed seed
    pub fn with_seed(config: Arc<GameConfig>, clock: C, seed: u64) -> Self {
        Self::with_rng(config, clock, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: Arc<GameConfig>, clock: C, rng: StdRng) -> Self {
        let machine = SlotMachine::new(&config);
        let mut game = Self {
            config,
            rng,
            clock,
            timers: TimerQueue::new(),
            machine,
            state: GameState::Idle,
            last_result: None,
            highlighted: None,
            stats: GameStats::default(),
        };
        game.state = game.enter(Transition::Idle);
        game
    }

    /// Reseed the RNG
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FRAME LOOP
    // ═══════════════════════════════════════════════════════════════════════════

    /// Advance one frame: fire due timers, then move the reels
    pub fn update(&mut self, dt: f64) {
        self.clock.tick(dt);
        let now = self.clock.now();

        for event in self.timers.take_expired(now) {
            log::trace!("Timer fired at {:.3}s: {event:?}", now.as_secs_f64());
            self.handle_event(event);
        }

        self.machine.update(dt);
    }

    /// Route a pointer event to the start and stop controls
    pub fn process_input(&mut self, event: &InputEvent) {
        if self.machine.start_control_mut().handle_input(event) {
            self.handle_event(GameEvent::StartPressed);
        }
        if self.machine.stop_control_mut().handle_input(event) {
            self.handle_event(GameEvent::StopPressed);
        }
    }

    /// Feed one event through the state machine
    pub fn handle_event(&mut self, event: GameEvent) {
        let Some(transition) = self.state.next(event, &self.machine) else {
            log::trace!("{:?} ignored in {:?}", event, self.state.kind());
            return;
        };
        log::debug!("{:?} --{event:?}--> {transition:?}", self.state.kind());
        self.state = self.enter(transition);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ENTRY ACTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    fn enter(&mut self, transition: Transition) -> GameState {
        match transition {
            Transition::Idle => {
                self.machine.start_control_mut().set_enabled(true);
                self.machine.stop_control_mut().set_enabled(false);
                GameState::Idle
            }
            Transition::SpeedUp => {
                self.machine.start_control_mut().set_enabled(false);
                self.clear_highlight();

                let speed_up = self.config.timing.speed_up;
                for reel in self.machine.reels_mut() {
                    let time = self.rng.random_range(speed_up.min.0..=speed_up.max.0);
                    reel.motion_mut().go_full_speed_in(time);
                }

                self.schedule(self.config.timing.min_spin, GameEvent::EnableStopTimer);
                GameState::SpeedUp
            }
            Transition::StopWait => {
                self.machine.stop_control_mut().set_enabled(true);
                self.schedule(self.config.timing.stop_wait(), GameEvent::SpinTimeOut);
                GameState::StopWait
            }
            Transition::SlowingDown => {
                self.machine.stop_control_mut().set_enabled(false);

                let stop = self.config.timing.stop;
                let mut stop_row = [Symbol::Seven; REEL_COUNT];
                let mut longest = 0.0_f64;
                for (reel, slot) in self.machine.reels_mut().iter_mut().zip(stop_row.iter_mut()) {
                    let time = self.rng.random_range(stop.min.0..=stop.max.0);
                    let index = self.rng.random_range(0..SYMBOL_COUNT);
                    reel.motion_mut().stop_in(index as f64, time);

                    *slot = Symbol::ALL[index];
                    longest = longest.max(time);
                }

                log::debug!("Stopping on [{}] within {longest:.3}s", format_row(&stop_row));
                self.schedule(Seconds(longest), GameEvent::ReelsStopped);
                GameState::SlowingDown { stop_row }
            }
            Transition::Result { stop_row } => {
                let result = combination::evaluate(stop_row, &self.config.payout);

                self.machine.score_counter_mut().set_score(result.points);
                if result.is_win() {
                    self.machine.highlight(result.range, &stop_row);
                    self.highlighted = Some(result.range);
                }

                log::info!(
                    "Spin result [{}]: {} points{}",
                    format_row(&stop_row),
                    result.points,
                    if result.free_spin { " + free spin" } else { "" }
                );

                self.stats.record(&result);
                self.last_result = Some(result);

                let timing = &self.config.timing;
                let delay = if result.free_spin {
                    timing.auto_spin_delay
                } else {
                    timing.result_show
                };
                self.schedule(delay, GameEvent::ShowResultTimeOut);

                GameState::Result {
                    stop_row,
                    auto_spin: result.free_spin,
                }
            }
        }
    }

    fn schedule(&mut self, after: Seconds, event: GameEvent) {
        let now = self.clock.now();
        self.timers.schedule(now, after, event);
    }

    fn clear_highlight(&mut self) {
        self.machine.clear_highlight();
        self.highlighted = None;
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ROW INJECTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Drop everything and stop the reels on `row`
    ///
    /// Pending timers are discarded and the controller returns to Idle; the
    /// result is scored once the reels have stopped.
    pub fn set_symbol_row(&mut self, row: SymbolRow) {
        log::debug!("Injecting row [{}]", format_row(&row));

        self.clear_highlight();
        self.timers.clear();
        self.state = self.enter(Transition::Idle);

        let time = self.config.timing.test_stop;
        for (reel, symbol) in self.machine.reels_mut().iter_mut().zip(row) {
            reel.motion_mut().stop_in(symbol.index() as f64, time.as_f64());
        }
        self.schedule(time, GameEvent::ReelsStopped);
    }

    /// Symbols currently under the middle line
    pub fn get_symbol_row(&self) -> SymbolRow {
        read_symbol_row(&self.machine)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_kind(&self) -> StateKind {
        self.state.kind()
    }

    /// Displayed score
    pub fn score(&self) -> u32 {
        self.machine.score_counter().score()
    }

    pub fn highlighted_range(&self) -> Option<Range> {
        self.highlighted
    }

    pub fn last_result(&self) -> Option<&CombinationResult> {
        self.last_result.as_ref()
    }

    pub fn machine(&self) -> &SlotMachine {
        &self.machine
    }

    /// Mutable machine, for the renderer to lay out control hit boxes
    pub fn machine_mut(&mut self) -> &mut SlotMachine {
        &mut self.machine
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = GameStats::default();
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn now(&self) -> std::time::Duration {
        self.clock.now()
    }
}
