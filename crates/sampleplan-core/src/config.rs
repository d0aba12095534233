//! Planner configuration.

use serde::{Deserialize, Serialize};

use crate::decode::PlatformTier;

/// Settings for a [`crate::decode::DecodePlanner`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Force a platform tier instead of asking the decoder. Useful for
    /// exercising the legacy strategies against a modern decoder.
    pub platform_tier: Option<PlatformTier>,
}

impl PlannerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform_tier(mut self, tier: PlatformTier) -> Self {
        self.platform_tier = Some(tier);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_defers_to_decoder() {
        assert_eq!(PlannerConfig::new().platform_tier, None);
    }

    #[test]
    fn test_with_platform_tier() {
        let config = PlannerConfig::new().with_platform_tier(PlatformTier::Legacy);
        assert_eq!(config.platform_tier, Some(PlatformTier::Legacy));
    }
}
