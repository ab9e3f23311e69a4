//! Rate limit configuration types.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::IdentityClass;

/// Fixed-window limits for one rate-limited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowLimits {
    /// Window duration in seconds.
    pub window_secs: u32,
    /// Requests per window for guests (keyed by address).
    pub guest_limit: u32,
    /// Requests per window for authenticated users.
    pub user_limit: u32,
}

impl WindowLimits {
    /// Recipe generation: expensive, counted per hour.
    pub fn generation() -> Self {
        Self {
            window_secs: 3600,
            guest_limit: 5,
            user_limit: 20,
        }
    }

    /// Ingredient validation: cheap, counted per minute.
    pub fn validation() -> Self {
        Self {
            window_secs: 60,
            guest_limit: 30,
            user_limit: 120,
        }
    }

    /// The limit that applies to an identity class.
    pub fn limit_for(&self, class: IdentityClass) -> u32 {
        match class {
            IdentityClass::Guest => self.guest_limit,
            IdentityClass::Authenticated => self.user_limit,
        }
    }
}
