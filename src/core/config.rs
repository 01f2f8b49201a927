//! Configuration for viewport behavior and transition pacing
//!
//! Options are plain serde structs with `Default` impls so hosts can load them
//! from JSON, and `TransitionPacing` offers presets for the default transition.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default upper bound on the length of a default transition, in seconds
pub const DEFAULT_MAX_TRANSITION_DURATION: f64 = 3.5;

/// Behavior of the viewport state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportOptions {
    /// Go idle when the user starts touching the map or a zoom gesture is recognized
    pub transitions_to_idle_upon_user_interaction: bool,
}

impl ViewportOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            transitions_to_idle_upon_user_interaction: true,
        }
    }
}

/// Options for the adaptive default transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultTransitionOptions {
    /// Longest allowed `delay + duration` of any dimension, in seconds.
    /// Longer transitions are scaled down uniformly.
    max_duration: f64,
}

impl DefaultTransitionOptions {
    pub fn new(max_duration: f64) -> Result<Self> {
        let options = Self { max_duration };
        options.validate()?;
        Ok(options)
    }

    pub fn max_duration(&self) -> f64 {
        self.max_duration
    }

    pub fn validate(&self) -> Result<()> {
        if !self.max_duration.is_finite() || self.max_duration < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "max_duration must be a finite, non-negative number of seconds (got {})",
                self.max_duration
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }
}

impl Default for DefaultTransitionOptions {
    fn default() -> Self {
        Self {
            max_duration: DEFAULT_MAX_TRANSITION_DURATION,
        }
    }
}

/// Pacing presets for the default transition
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TransitionPacing {
    Relaxed,
    #[default]
    Standard,
    Brisk,
    Custom(DefaultTransitionOptions),
}

impl TransitionPacing {
    pub fn resolve(&self) -> DefaultTransitionOptions {
        match self {
            Self::Relaxed => DefaultTransitionOptions { max_duration: 5.0 },
            Self::Standard => DefaultTransitionOptions {
                max_duration: DEFAULT_MAX_TRANSITION_DURATION,
            },
            Self::Brisk => DefaultTransitionOptions { max_duration: 1.5 },
            Self::Custom(options) => *options,
        }
    }
}
