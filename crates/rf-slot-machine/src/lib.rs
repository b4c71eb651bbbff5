//! # rf-slot-machine: Slot machine simulation core
//!
//! Spinning reels with jerk-limited stopping, a symbol-combination scorer and
//! a timer-driven game controller tying them together. Rendering and the
//! windowed input loop live outside this crate; they read the machine model
//! and feed `update(dt)` / `process_input` back in.
//!
//! ## Architecture
//!
//! ```text
//! Game (state machine + timers + RNG)
//!     │
//!     ├── SlotMachine
//!     │     ├── Reel × 5 ── ReelMotion ── SpeedLimitedMotion ── Motion
//!     │     ├── Control (start / stop)
//!     │     └── ScoreCounter (digit reels)
//!     │
//!     └── Combination (stopped row → points, free spin)
//! ```

pub mod combination;
pub mod config;
pub mod game;
pub mod machine;
pub mod motion;
pub mod reel;
pub mod symbols;
pub mod timing;

pub use combination::*;
pub use config::*;
pub use game::*;
pub use machine::*;
pub use motion::*;
pub use reel::*;
pub use symbols::*;
pub use timing::*;

pub use rf_core::{Clock, FrameClock, MonotonicClock, Seconds, SlotError, SlotResult};
