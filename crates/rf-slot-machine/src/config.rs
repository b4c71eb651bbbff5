//! Slot machine configuration
//!
//! Everything is fixed at build time through the profile constructors; the
//! value is built once and shared as `Arc<GameConfig>`.

use serde::{Deserialize, Serialize};

use rf_core::{SlotError, SlotResult};

use crate::symbols::{REEL_COUNT, SYMBOL_COUNT, Symbol};
use crate::timing::{TimingConfig, TimingProfile};

/// Grid layout (reels × visible lines)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of reels (columns)
    pub reels: u8,
    /// Number of visible lines per reel
    pub lines: u8,
}

impl GridSpec {
    /// Standard 5×3
    pub fn standard_5x3() -> Self {
        Self { reels: 5, lines: 3 }
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_5x3()
    }
}

/// Symbol values and multipliers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutConfig {
    /// Multiplier per symbol of the dominant equal run
    pub big_multiplier: u32,
    /// Multiplier per other symbol in the winning range
    pub small_multiplier: u32,
    /// Base value per symbol, in card order
    pub base_values: [u32; SYMBOL_COUNT],
}

impl PayoutConfig {
    #[inline]
    pub fn base_value(&self, symbol: Symbol) -> u32 {
        self.base_values[symbol.index()]
    }
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            big_multiplier: 5,
            small_multiplier: 2,
            base_values: Symbol::ALL.map(Symbol::base_value),
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Game name
    pub name: String,
    /// Grid layout
    pub grid: GridSpec,
    /// Cruise speed, displays per second
    pub reel_max_speed: f64,
    /// Crawl speed, displays per second
    pub reel_min_speed: f64,
    /// Digit reels on the score counter
    pub score_digits: u8,
    /// Controller durations
    pub timing: TimingConfig,
    /// Scoring
    pub payout: PayoutConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: "Slot Machine".into(),
            grid: GridSpec::default(),
            reel_max_speed: 5.0,
            reel_min_speed: 0.5,
            score_digits: 6,
            timing: TimingConfig::default(),
            payout: PayoutConfig::default(),
        }
    }
}

impl GameConfig {
    /// Normal gameplay
    pub fn normal() -> Self {
        Self::default()
    }

    /// Turbo timing, faster reels
    pub fn turbo() -> Self {
        Self {
            name: "Slot Machine (Turbo)".into(),
            reel_max_speed: 8.0,
            timing: TimingConfig::turbo(),
            ..Default::default()
        }
    }

    /// Short spins for automated runs
    pub fn studio() -> Self {
        Self {
            name: "Slot Machine (Studio)".into(),
            timing: TimingConfig::studio(),
            ..Default::default()
        }
    }

    /// Get config for a timing profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal | TimingProfile::Custom => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Studio => Self::studio(),
        }
    }

    /// Reel cruise speed in cards per second
    pub fn reel_max_cards_per_second(&self) -> f64 {
        self.reel_max_speed * self.grid.lines as f64
    }

    /// Reel crawl speed in cards per second
    pub fn reel_min_cards_per_second(&self) -> f64 {
        self.reel_min_speed * self.grid.lines as f64
    }

    pub fn validate(&self) -> SlotResult<()> {
        if self.grid.reels as usize != REEL_COUNT {
            return Err(SlotError::InvalidConfig(format!(
                "grid has {} reels, the machine is built for {REEL_COUNT}",
                self.grid.reels
            )));
        }
        if self.grid.lines == 0 || self.grid.lines as usize > SYMBOL_COUNT {
            return Err(SlotError::InvalidConfig(format!(
                "visible lines must be in 1..={SYMBOL_COUNT}, got {}",
                self.grid.lines
            )));
        }
        if !(self.reel_max_speed.is_finite() && self.reel_max_speed > 0.0) {
            return Err(SlotError::InvalidConfig(format!(
                "reel_max_speed must be positive, got {}",
                self.reel_max_speed
            )));
        }
        if !(self.reel_min_speed.is_finite() && self.reel_min_speed > 0.0)
            || self.reel_min_speed > self.reel_max_speed
        {
            return Err(SlotError::InvalidConfig(format!(
                "reel_min_speed must be in (0, {}], got {}",
                self.reel_max_speed, self.reel_min_speed
            )));
        }
        if self.score_digits == 0 || self.score_digits > 10 {
            return Err(SlotError::InvalidConfig(format!(
                "score_digits must be in 1..=10, got {}",
                self.score_digits
            )));
        }
        if self.payout.big_multiplier == 0 || self.payout.small_multiplier == 0 {
            return Err(SlotError::InvalidConfig("multipliers must be non-zero".into()));
        }
        self.timing.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_spec() {
        let grid = GridSpec::standard_5x3();
        assert_eq!((grid.reels, grid.lines), (5, 3));
        assert_eq!(GridSpec::default(), grid);
    }

    #[test]
    fn test_payout_defaults_follow_symbols() {
        let payout = PayoutConfig::default();
        assert_eq!(payout.big_multiplier, 5);
        assert_eq!(payout.small_multiplier, 2);
        assert_eq!(payout.base_value(Symbol::Seven), 32);
        assert_eq!(payout.base_value(Symbol::Emerald), 24);
    }

    #[test]
    fn test_profiles_are_valid() {
        for config in [GameConfig::normal(), GameConfig::turbo(), GameConfig::studio()] {
            assert!(config.validate().is_ok(), "{} should be valid", config.name);
        }
        assert_eq!(GameConfig::from_profile(TimingProfile::Studio), GameConfig::studio());
    }

    #[test]
    fn test_speeds_scale_by_lines() {
        let config = GameConfig::default();
        assert!((config.reel_max_cards_per_second() - 15.0).abs() < 0.001);
        assert!((config.reel_min_cards_per_second() - 1.5).abs() < 0.001);
    }

    #[test]
    fn test_validate_rejects_bad_overrides() {
        let config = GameConfig {
            grid: GridSpec { reels: 0, lines: 3 },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SlotError::InvalidConfig(_))));

        let config = GameConfig {
            reel_max_speed: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GameConfig {
            reel_min_speed: 10.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serializes() {
        let config = GameConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
