use crate::{AriaError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simulated "thinking" time before the assistant replies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ThinkingDelay {
    Fixed { ms: u64 },
    /// Uniformly drawn from `min_ms..=max_ms` on every turn
    Random { min_ms: u64, max_ms: u64 },
}

impl Default for ThinkingDelay {
    fn default() -> Self {
        ThinkingDelay::Random {
            min_ms: 1000,
            max_ms: 3000,
        }
    }
}

impl ThinkingDelay {
    /// Reply immediately
    pub fn none() -> Self {
        ThinkingDelay::Fixed { ms: 0 }
    }

    pub fn fixed(duration: Duration) -> Self {
        ThinkingDelay::Fixed {
            ms: duration.as_millis() as u64,
        }
    }

    /// Draw the delay for one turn
    pub fn sample(&self) -> Duration {
        match *self {
            ThinkingDelay::Fixed { ms } => Duration::from_millis(ms),
            ThinkingDelay::Random { min_ms, max_ms } if min_ms >= max_ms => {
                Duration::from_millis(min_ms)
            }
            ThinkingDelay::Random { min_ms, max_ms } => {
                Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let ThinkingDelay::Random { min_ms, max_ms } = *self {
            if min_ms > max_ms {
                return Err(AriaError::ConfigError(format!(
                    "Delay range is empty: {}ms > {}ms",
                    min_ms, max_ms
                )));
            }
        }
        Ok(())
    }
}
