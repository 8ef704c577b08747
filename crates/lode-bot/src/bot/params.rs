use std::env;

/// Tunable thresholds for the decision policy.
#[derive(Debug, Clone, Copy)]
pub struct BotParams {
    /// Request a new radar once the known-ore candidate count drops below
    /// this.
    pub low_ore_watermark: usize,
    /// Spacing of the staggered diagonal lattice used for radar placement.
    pub radar_spacing: i32,
    /// Coarse sub-lattice stride for exploratory digging; only cells whose
    /// coordinates are both multiples of the stride are probed blind.
    pub probe_stride: i32,
}

impl Default for BotParams {
    fn default() -> Self {
        Self {
            low_ore_watermark: 5,
            radar_spacing: 4,
            probe_stride: 3,
        }
    }
}

impl BotParams {
    pub fn from_env() -> Self {
        Self::from_reader(|key| env::var(key).ok())
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base = Self::default();
        let low_ore_watermark = read("LODE_ORE_WATERMARK")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .map(|value| value.clamp(1, 64))
            .unwrap_or(base.low_ore_watermark);
        let radar_spacing = read("LODE_RADAR_SPACING")
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .map(|value| value.clamp(2, 16))
            .unwrap_or(base.radar_spacing);
        let probe_stride = read("LODE_PROBE_STRIDE")
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .map(|value| value.clamp(1, 8))
            .unwrap_or(base.probe_stride);

        Self {
            low_ore_watermark,
            radar_spacing,
            probe_stride,
        }
    }
}
