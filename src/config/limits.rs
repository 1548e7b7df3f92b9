//! Soft limit configuration and types.

use serde::Deserialize;

use super::units::Steps;

/// Policy for handling limit violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum LimitPolicy {
    /// Reject moves that would exceed limits.
    #[default]
    Reject,
    /// Clamp target to nearest limit.
    Clamp,
}

/// Soft limits on the absolute position, in steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StepLimits {
    /// Minimum allowed position in steps.
    pub min_steps: i64,
    /// Maximum allowed position in steps.
    pub max_steps: i64,
    /// What to do when limit is exceeded.
    #[serde(default)]
    pub policy: LimitPolicy,
}

impl StepLimits {
    /// Create new step limits.
    pub fn new(min_steps: i64, max_steps: i64, policy: LimitPolicy) -> Self {
        Self {
            min_steps,
            max_steps,
            policy,
        }
    }

    /// Check if limits are valid (min < max).
    pub fn is_valid(&self) -> bool {
        self.min_steps < self.max_steps
    }

    /// Check if a position is within limits.
    pub fn contains(&self, position: Steps) -> bool {
        position.0 >= self.min_steps && position.0 <= self.max_steps
    }

    /// The limit nearest to an out-of-range position.
    pub fn nearest(&self, position: Steps) -> i64 {
        if position.0 < self.min_steps {
            self.min_steps
        } else {
            self.max_steps
        }
    }

    /// Apply limit policy to a target position.
    ///
    /// Returns `Some(position)` if valid or clamped, `None` if rejected.
    pub fn apply(&self, target: Steps) -> Option<Steps> {
        if self.contains(target) {
            Some(target)
        } else {
            match self.policy {
                LimitPolicy::Reject => None,
                LimitPolicy::Clamp => Some(Steps(self.nearest(target))),
            }
        }
    }
}
