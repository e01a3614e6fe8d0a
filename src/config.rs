//! Network parameters used for fee computation and address rendering

use crate::constants::{DEFAULT_HRP, MIN_GAS_PRICE};
use crate::error::{DrtxError, Result};
use bech32::Hrp;
use serde::{Deserialize, Serialize};

/// Gas and chain parameters of a target network
///
/// Deserializes from camelCase JSON; missing keys fall back to the local
/// development network defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkConfig {
    #[serde(rename = "chainID")]
    pub chain_id: String,
    pub min_gas_limit: u64,
    pub gas_per_data_byte: u64,
    /// Fraction of the gas price charged for unused execution gas, in `(0, 1]`
    pub gas_price_modifier: f64,
    /// Lowest gas price the network accepts
    pub min_gas_price: u64,
    /// Prefix addresses are rendered under when decoded from raw public keys
    pub address_hrp: String,
}

impl NetworkConfig {
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            ..Self::default()
        }
    }

    pub fn with_min_gas_limit(mut self, min_gas_limit: u64) -> Self {
        self.min_gas_limit = min_gas_limit;
        self
    }

    pub fn with_gas_per_data_byte(mut self, gas_per_data_byte: u64) -> Self {
        self.gas_per_data_byte = gas_per_data_byte;
        self
    }

    pub fn with_min_gas_price(mut self, min_gas_price: u64) -> Self {
        self.min_gas_price = min_gas_price;
        self
    }

    pub fn with_address_hrp(mut self, address_hrp: impl Into<String>) -> Self {
        self.address_hrp = address_hrp.into();
        self
    }

    pub fn with_gas_price_modifier(mut self, gas_price_modifier: f64) -> Self {
        self.gas_price_modifier = gas_price_modifier;
        self
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| DrtxError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chain_id.is_empty() {
            return Err(DrtxError::InvalidConfig("chain id must not be empty".to_string()));
        }

        if !(self.gas_price_modifier > 0.0 && self.gas_price_modifier <= 1.0) {
            return Err(DrtxError::InvalidConfig(format!(
                "gas price modifier must be in (0, 1], got {}",
                self.gas_price_modifier
            )));
        }

        Hrp::parse(&self.address_hrp).map_err(|e| {
            DrtxError::InvalidConfig(format!("invalid address prefix {:?}: {}", self.address_hrp, e))
        })?;

        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: "D".to_string(),
            min_gas_limit: 50_000,
            gas_per_data_byte: 1_500,
            gas_price_modifier: 0.01,
            min_gas_price: MIN_GAS_PRICE,
            address_hrp: DEFAULT_HRP.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NetworkConfig::default();
        assert_eq!(config.chain_id, "D");
        assert_eq!(config.min_gas_limit, 50_000);
        assert_eq!(config.gas_per_data_byte, 1_500);
        assert_eq!(config.address_hrp, "drt");
        assert_eq!(config.min_gas_price, 1_000_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            NetworkConfig::from_json(r#"{"chainID":"T","minGasLimit":10,"gasPriceModifier":0.5}"#)
                .unwrap();
        assert_eq!(config.chain_id, "T");
        assert_eq!(config.min_gas_limit, 10);
        assert_eq!(config.gas_price_modifier, 0.5);
        assert_eq!(config.gas_per_data_byte, 1_500);
    }

    #[test]
    fn test_rejects_out_of_range_modifier() {
        for modifier in [0.0, -0.1, 1.5, f64::NAN] {
            let config = NetworkConfig::default().with_gas_price_modifier(modifier);
            assert!(matches!(config.validate(), Err(DrtxError::InvalidConfig(_))));
        }
        assert!(NetworkConfig::default().with_gas_price_modifier(1.0).validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = NetworkConfig::new("T")
            .with_min_gas_limit(10)
            .with_gas_per_data_byte(2_000)
            .with_min_gas_price(500)
            .with_address_hrp("test");
        assert_eq!(config.chain_id, "T");
        assert_eq!(config.min_gas_limit, 10);
        assert_eq!(config.gas_per_data_byte, 2_000);
        assert_eq!(config.min_gas_price, 500);
        assert_eq!(config.address_hrp, "test");
        assert_eq!(config.gas_price_modifier, 0.01);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_address_prefix() {
        let config = NetworkConfig::default().with_address_hrp("");
        assert!(matches!(config.validate(), Err(DrtxError::InvalidConfig(_))));

        let err = NetworkConfig::from_json(r#"{"addressHrp":"dr t"}"#).unwrap_err();
        assert!(matches!(err, DrtxError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = NetworkConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, DrtxError::InvalidConfig(_)));
    }
}
