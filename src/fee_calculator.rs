//! Network fee calculator
//!
//! The fee has three parts. Moving balance costs `min_gas_limit` gas and
//! storing the payload costs `gas_per_data_byte` per byte, both at the full
//! gas price. Gas above that floor is execution budget and is charged at the
//! processing gas price, `floor(gas_price * gas_price_modifier)`.
//!
//! The modifier is held as an exact decimal fraction, read from the shortest
//! decimal spelling of the configured `f64` (`0.29` is 29/100, not the nearest
//! binary double). Truncation happens once, on the per-unit processing price,
//! and all other arithmetic is exact.

use crate::config::NetworkConfig;
use crate::error::{DrtxError, Result};
use crate::transaction::Transaction;
use num_bigint::BigUint;

/// Itemized fee of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeBreakdown {
    /// Gas units needed to move balance and store the payload
    pub required_gas: u128,
    /// `min_gas_limit * gas_price`
    pub movement_fee: BigUint,
    /// `data_units * gas_price`
    pub data_fee: BigUint,
    /// Excess gas charged at the processing gas price
    pub execution_fee: BigUint,
    pub total: BigUint,
}

/// Fee calculator bound to a network's gas parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeCalculator {
    min_gas_limit: u64,
    gas_per_data_byte: u64,
    min_gas_price: u64,
    modifier_numerator: BigUint,
    modifier_denominator: BigUint,
}

impl FeeCalculator {
    /// Create a calculator, rejecting a modifier outside `(0, 1]`
    pub fn new(min_gas_limit: u64, gas_per_data_byte: u64, gas_price_modifier: f64) -> Result<Self> {
        if !(gas_price_modifier > 0.0 && gas_price_modifier <= 1.0) {
            return Err(DrtxError::InvalidConfig(format!(
                "gas price modifier must be in (0, 1], got {}",
                gas_price_modifier
            )));
        }

        let (modifier_numerator, modifier_denominator) = decimal_fraction(gas_price_modifier)?;

        Ok(Self {
            min_gas_limit,
            gas_per_data_byte,
            min_gas_price: 0,
            modifier_numerator,
            modifier_denominator,
        })
    }

    /// Reject gas prices below `min_gas_price`
    pub fn with_min_gas_price(mut self, min_gas_price: u64) -> Self {
        self.min_gas_price = min_gas_price;
        self
    }

    pub fn from_config(config: &NetworkConfig) -> Result<Self> {
        Ok(Self::new(
            config.min_gas_limit,
            config.gas_per_data_byte,
            config.gas_price_modifier,
        )?
        .with_min_gas_price(config.min_gas_price))
    }

    /// Gas units charged for storing `data_len` payload bytes
    pub fn data_units(&self, data_len: usize) -> u128 {
        data_len as u128 * self.gas_per_data_byte as u128
    }

    /// Smallest gas limit the network accepts for a payload of `data_len` bytes
    pub fn required_gas_limit(&self, data_len: usize) -> u128 {
        self.min_gas_limit as u128 + self.data_units(data_len)
    }

    /// Gas price applied to execution gas, truncated toward zero
    pub fn processing_gas_price(&self, gas_price: u64) -> BigUint {
        BigUint::from(gas_price) * &self.modifier_numerator / &self.modifier_denominator
    }

    /// Compute the itemized fee
    pub fn calculate(&self, gas_price: u64, gas_limit: u64, data_len: usize) -> Result<FeeBreakdown> {
        if gas_price < self.min_gas_price {
            return Err(DrtxError::GasPriceTooLow {
                gas_price,
                min_gas_price: self.min_gas_price,
            });
        }

        let data_units = self.data_units(data_len);
        let required_gas = self.min_gas_limit as u128 + data_units;

        if (gas_limit as u128) < required_gas {
            return Err(DrtxError::NotEnoughGas {
                gas_limit,
                required: required_gas,
            });
        }

        let excess_gas = gas_limit as u128 - required_gas;
        let movement_fee = BigUint::from(self.min_gas_limit) * gas_price;
        let data_fee = BigUint::from(data_units) * gas_price;
        let execution_fee = BigUint::from(excess_gas) * self.processing_gas_price(gas_price);
        let total = &movement_fee + &data_fee + &execution_fee;

        Ok(FeeBreakdown {
            required_gas,
            movement_fee,
            data_fee,
            execution_fee,
            total,
        })
    }

    pub fn calculate_for(&self, transaction: &Transaction) -> Result<FeeBreakdown> {
        self.calculate(transaction.gas_price, transaction.gas_limit, transaction.data_len())
    }
}

/// Split a finite, non-negative `f64` into `numerator / 10^k` using its
/// shortest round-trip decimal spelling
fn decimal_fraction(value: f64) -> Result<(BigUint, BigUint)> {
    let text = value.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let digits = format!("{}{}", whole, fraction);
    let numerator = BigUint::parse_bytes(digits.as_bytes(), 10).ok_or_else(|| {
        DrtxError::InvalidConfig(format!("gas price modifier {} is not a decimal number", text))
    })?;
    let denominator = BigUint::from(10u32).pow(fraction.len() as u32);

    Ok((numerator, denominator))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator(min_gas_limit: u64) -> FeeCalculator {
        FeeCalculator::new(min_gas_limit, 1500, 0.01).unwrap()
    }

    #[test]
    fn test_fee_without_data() {
        let fee = calculator(10).calculate(500, 20, 0).unwrap();
        assert_eq!(fee.movement_fee, BigUint::from(5000u32));
        assert_eq!(fee.data_fee, BigUint::from(0u32));
        assert_eq!(fee.execution_fee, BigUint::from(50u32));
        assert_eq!(fee.total, BigUint::from(5050u32));
    }

    #[test]
    fn test_fee_with_data_at_required_limit() {
        let fee = calculator(10).calculate(500, 12_010, 8).unwrap();
        assert_eq!(fee.required_gas, 12_010);
        assert_eq!(fee.execution_fee, BigUint::from(0u32));
        assert_eq!(fee.total, BigUint::from(6_005_000u32));
    }

    #[test]
    fn test_not_enough_gas() {
        let err = calculator(50_000).calculate(1_000_000_000, 50_000, 17).unwrap_err();
        match err {
            DrtxError::NotEnoughGas { gas_limit, required } => {
                assert_eq!(gas_limit, 50_000);
                assert_eq!(required, 50_000 + 17 * 1500);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_processing_price_truncates() {
        let calc = calculator(10);
        // 150 * 0.01 = 1.5, charged as 1 per unit of execution gas
        assert_eq!(calc.processing_gas_price(150), BigUint::from(1u32));
        let fee = calc.calculate(150, 110, 0).unwrap();
        assert_eq!(fee.execution_fee, BigUint::from(100u32));
        assert_eq!(fee.total, BigUint::from(1_600u32));
    }

    #[test]
    fn test_modifier_is_exact_for_decimal_fractions() {
        // 0.29 is not representable in binary; 100 * 0.29 must still be 29
        let calc = FeeCalculator::new(0, 0, 0.29).unwrap();
        assert_eq!(calc.processing_gas_price(100), BigUint::from(29u32));
    }

    #[test]
    fn test_tiny_modifiers_are_kept_exactly() {
        let calc = FeeCalculator::new(10, 1500, 4e-7).unwrap();
        assert_eq!(calc.processing_gas_price(1_000_000_000), BigUint::from(400u32));

        let calc = FeeCalculator::new(10, 1500, 1.4e-6).unwrap();
        assert_eq!(calc.processing_gas_price(1_000_000_000), BigUint::from(1_400u32));

        // below one unit of processing price, execution gas is free
        let fee = calc.calculate(1_000, 110, 0).unwrap();
        assert_eq!(fee.execution_fee, BigUint::from(0u32));
    }

    #[test]
    fn test_min_gas_price() {
        let calc = calculator(10).with_min_gas_price(1_000_000_000);
        let err = calc.calculate(999_999_999, 10, 0).unwrap_err();
        assert!(matches!(
            err,
            DrtxError::GasPriceTooLow { gas_price: 999_999_999, min_gas_price: 1_000_000_000 }
        ));
        assert!(calc.calculate(1_000_000_000, 10, 0).is_ok());
    }

    #[test]
    fn test_large_gas_values_do_not_overflow() {
        let calc = FeeCalculator::new(50_000, 1_500, 1.0).unwrap();
        let fee = calc.calculate(u64::MAX, u64::MAX, 0).unwrap();
        assert_eq!(fee.total, BigUint::from(u64::MAX) * u64::MAX);
    }

    #[test]
    fn test_rejects_bad_modifier() {
        assert!(FeeCalculator::new(10, 1500, 0.0).is_err());
        assert!(FeeCalculator::new(10, 1500, 1.01).is_err());
        assert!(FeeCalculator::new(10, 1500, f64::NAN).is_err());
        assert!(FeeCalculator::new(10, 1500, 1e-9).is_ok());
    }
}
