//! Error types for drtx

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrtxError {
    /// The transaction record is malformed or inconsistent. The message names
    /// the offending field.
    #[error("Bad usage: {0}")]
    BadUsage(String),

    #[error("Not enough gas provided: gas limit is {gas_limit}, but at least {required} is needed")]
    NotEnoughGas {
        gas_limit: u64,
        required: u128,
    },

    #[error("Gas price too low: {gas_price} is below the network minimum of {min_gas_price}")]
    GasPriceTooLow {
        gas_price: u64,
        min_gas_price: u64,
    },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Invalid network configuration: {0}")]
    InvalidConfig(String),

    #[error("Signature error: {0}")]
    Signature(String),
}

impl From<bech32::primitives::decode::CheckedHrpstringError> for DrtxError {
    fn from(err: bech32::primitives::decode::CheckedHrpstringError) -> Self {
        DrtxError::InvalidAddress(err.to_string())
    }
}

impl From<prost::DecodeError> for DrtxError {
    fn from(err: prost::DecodeError) -> Self {
        DrtxError::Decoding(err.to_string())
    }
}

impl From<serde_json::Error> for DrtxError {
    fn from(err: serde_json::Error) -> Self {
        DrtxError::Encoding(err.to_string())
    }
}

impl From<hex::FromHexError> for DrtxError {
    fn from(err: hex::FromHexError) -> Self {
        DrtxError::Decoding(err.to_string())
    }
}

impl From<base64::DecodeError> for DrtxError {
    fn from(err: base64::DecodeError) -> Self {
        DrtxError::Decoding(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DrtxError>;
