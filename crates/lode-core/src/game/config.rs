use std::env;

/// Tunable constants for the belief model and the movement-based inference.
#[derive(Debug, Clone, Copy)]
pub struct BeliefConfig {
    /// Turns a POTENTIAL mark stays live before expiring back to UNKNOWN.
    pub mark_ttl: u32,
    /// Assumed amount when a yield is inferred on an unconfirmed cell.
    pub found_yield: u16,
    /// Homing cutoff: a same-row displacement strictly below this flags an
    /// enemy as returning to base. Tuned on one board scale; it may need to
    /// scale with board width, hence overridable rather than hard-coded.
    pub homing_dx: i32,
    /// Maximum age of a dug neighbor for it to count during homing inference.
    pub fresh_dig_age: u32,
}

impl Default for BeliefConfig {
    fn default() -> Self {
        Self {
            mark_ttl: 10,
            found_yield: 2,
            homing_dx: -2,
            fresh_dig_age: 3,
        }
    }
}

impl BeliefConfig {
    pub fn from_env() -> Self {
        Self::from_reader(|key| env::var(key).ok())
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base = Self::default();
        let mark_ttl = read("LODE_MARK_TTL")
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .map(|value| value.clamp(1, 100))
            .unwrap_or(base.mark_ttl);
        let found_yield = read("LODE_FOUND_YIELD")
            .and_then(|raw| raw.trim().parse::<u16>().ok())
            .map(|value| value.clamp(1, 10))
            .unwrap_or(base.found_yield);
        let homing_dx = read("LODE_HOMING_DX")
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .filter(|value| *value < 0)
            .unwrap_or(base.homing_dx);
        let fresh_dig_age = read("LODE_FRESH_DIG_AGE")
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .map(|value| value.clamp(1, 20))
            .unwrap_or(base.fresh_dig_age);

        Self {
            mark_ttl,
            found_yield,
            homing_dx,
            fresh_dig_age,
        }
    }
}
