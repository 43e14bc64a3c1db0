use thiserror::Error;

use crate::cost::Time;

pub const DEFAULT_EXPANSION_LIMIT: usize = 10_000;
pub const DEFAULT_LOOKAHEAD: usize = 10;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Speed factor must be at least 1, got {0}")]
    SpeedFactorBelowOne(Time),
    #[error("Expansion limit must be positive")]
    ZeroExpansionLimit,
    #[error("Lookahead must be positive")]
    ZeroLookahead,
    #[error("Expansion time must be finite and non-negative, got {0}")]
    InvalidExpansionTime(f64),
}

/// The constants of one rescue run.
///
/// Passed by value into every planner and heuristic; nothing reads them from
/// anywhere else.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RescueConfig {
    /// Time to put on a kit (Q).
    pub equip_time: Time,
    /// Time to take a kit off (U).
    pub unequip_time: Time,
    /// Multiplier on edge weights while equipped (P).
    pub speed_factor: Time,
    /// Expansions Bounded A* may spend before giving up.
    pub expansion_limit: usize,
    /// Expansions Real-Time A* spends per decision (L).
    pub lookahead: usize,
    /// Time charged per expansion when planning is situated (T).
    pub expansion_time: f64,
}

impl RescueConfig {
    pub fn new(equip_time: Time, unequip_time: Time, speed_factor: Time) -> Self {
        Self {
            equip_time,
            unequip_time,
            speed_factor,
            ..Self::default()
        }
    }

    pub fn with_expansion_limit(mut self, expansion_limit: usize) -> Self {
        self.expansion_limit = expansion_limit;
        self
    }

    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn with_expansion_time(mut self, expansion_time: f64) -> Self {
        self.expansion_time = expansion_time;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speed_factor < 1 {
            return Err(ConfigError::SpeedFactorBelowOne(self.speed_factor));
        }
        if self.expansion_limit == 0 {
            return Err(ConfigError::ZeroExpansionLimit);
        }
        if self.lookahead == 0 {
            return Err(ConfigError::ZeroLookahead);
        }
        if !self.expansion_time.is_finite() || self.expansion_time < 0.0 {
            return Err(ConfigError::InvalidExpansionTime(self.expansion_time));
        }
        Ok(())
    }
}

impl Default for RescueConfig {
    fn default() -> Self {
        Self {
            equip_time: 0,
            unequip_time: 0,
            speed_factor: 1,
            expansion_limit: DEFAULT_EXPANSION_LIMIT,
            lookahead: DEFAULT_LOOKAHEAD,
            expansion_time: 0.0,
        }
    }
}
