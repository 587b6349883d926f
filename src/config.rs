//! Configuration for balance computation

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::split::{RemainderPolicy, SplitAllocator};
use crate::types::*;
use crate::utils::money;

/// What to do when net balances do not add up to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZeroSumPolicy {
    /// Log a warning and plan transfers for whatever can be matched
    #[default]
    Tolerate,
    /// Fail the snapshot with [`BalanceError::UnbalancedLedger`]
    Reject,
}

/// Settings shared by the aggregator, the planner and the split allocator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Number of fractional digits money is presented with
    pub scale: i64,
    pub remainder_policy: RemainderPolicy,
    pub zero_sum_policy: ZeroSumPolicy,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            scale: money::DEFAULT_SCALE,
            remainder_policy: RemainderPolicy::default(),
            zero_sum_policy: ZeroSumPolicy::default(),
        }
    }
}

impl BalanceConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> BalanceResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BalanceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> BalanceResult<()> {
        if !(0..=8).contains(&self.scale) {
            return Err(BalanceError::Config(format!(
                "scale must be between 0 and 8, got {}",
                self.scale
            )));
        }
        Ok(())
    }

    /// Smallest representable amount at the configured scale
    pub fn minor_unit(&self) -> BigDecimal {
        money::minor_unit(self.scale)
    }

    /// Split allocator using this configuration
    pub fn allocator(&self) -> SplitAllocator {
        SplitAllocator::new(self.scale, self.remainder_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_config() {
        let config = BalanceConfig::default();
        assert_eq!(config.scale, 2);
        assert_eq!(config.remainder_policy, RemainderPolicy::FirstParticipants);
        assert_eq!(config.zero_sum_policy, ZeroSumPolicy::Tolerate);
        assert_eq!(config.minor_unit(), BigDecimal::from_str("0.01").unwrap());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = BalanceConfig::from_json(r#"{ "zero_sum_policy": "reject" }"#).unwrap();
        assert_eq!(config.scale, 2);
        assert_eq!(config.zero_sum_policy, ZeroSumPolicy::Reject);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let result = BalanceConfig::from_json("{ not json");
        assert!(matches!(result, Err(BalanceError::Config(_))));

        let result = BalanceConfig::from_json(r#"{ "scale": 42 }"#);
        assert!(matches!(result, Err(BalanceError::Config(_))));
    }
}
