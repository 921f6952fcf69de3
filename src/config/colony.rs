//! Kernel, timeline and production queue settings.

use serde::{Deserialize, Serialize};

/// Prefix of environment variables that override file or default settings.
pub const ENV_PREFIX: &str = "COLONY_";

/// Kernel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Per-task cost samples kept for averaging.
    pub cpu_history_len: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self { cpu_history_len: 10 }
    }
}

impl KernelConfig {
    /// Validate kernel settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.cpu_history_len == 0 {
            return Err("cpu_history_len must be greater than 0".into());
        }
        Ok(())
    }
}

/// Production timeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Ticks per cycle; equal to a unit's lifetime.
    pub cycle_length: u32,
    /// Fraction of the cycle that may be booked before the timeline counts as full.
    pub limiter: f64,
    /// Production ticks per body part.
    pub ticks_per_part: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            cycle_length: 1500,
            limiter: 0.8,
            ticks_per_part: 3,
        }
    }
}

impl TimelineConfig {
    /// Validate timeline settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.cycle_length == 0 {
            return Err("cycle_length must be greater than 0".into());
        }
        if !(self.limiter > 0.0 && self.limiter <= 1.0) {
            return Err("limiter must be in (0, 1]".into());
        }
        if self.ticks_per_part == 0 {
            return Err("ticks_per_part must be greater than 0".into());
        }
        Ok(())
    }
}

/// Production queue settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Per-owner production budget.
    pub capacity: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { capacity: 3000 }
    }
}

impl QueueConfig {
    /// Validate queue settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be greater than 0".into());
        }
        Ok(())
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Kernel settings.
    pub kernel: KernelConfig,
    /// Timeline settings.
    pub timeline: TimelineConfig,
    /// Production queue settings.
    pub production_queue: QueueConfig,
}

impl ColonyConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.kernel.validate().map_err(|e| format!("kernel invalid: {e}"))?;
        self.timeline
            .validate()
            .map_err(|e| format!("timeline invalid: {e}"))?;
        self.production_queue
            .validate()
            .map_err(|e| format!("production_queue invalid: {e}"))?;
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults overridden by `COLONY_*` variables, after loading `.env` if present.
    pub fn from_env() -> Result<Self, String> {
        // A missing .env file is fine; variables may come from the real environment.
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();
        cfg.apply_env_overrides(|name| std::env::var(name).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    ///
    /// Recognised: `COLONY_CPU_HISTORY_LEN`, `COLONY_CYCLE_LENGTH`, `COLONY_LIMITER`,
    /// `COLONY_TICKS_PER_PART`, `COLONY_QUEUE_CAPACITY`.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), String> {
        if let Some(v) = read(&lookup, "CPU_HISTORY_LEN")? {
            self.kernel.cpu_history_len = v;
        }
        if let Some(v) = read(&lookup, "CYCLE_LENGTH")? {
            self.timeline.cycle_length = v;
        }
        if let Some(v) = read(&lookup, "LIMITER")? {
            self.timeline.limiter = v;
        }
        if let Some(v) = read(&lookup, "TICKS_PER_PART")? {
            self.timeline.ticks_per_part = v;
        }
        if let Some(v) = read(&lookup, "QUEUE_CAPACITY")? {
            self.production_queue.capacity = v;
        }
        Ok(())
    }
}

fn read<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    suffix: &str,
) -> Result<Option<T>, String> {
    let name = format!("{ENV_PREFIX}{suffix}");
    match lookup(&name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{name}: cannot parse `{raw}`")),
    }
}
