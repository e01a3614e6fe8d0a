//! drtx - Dharitri Transaction Computer
//!
//! Prepares network transactions for signing and broadcast: validation,
//! canonical signing bytes, protobuf wire encoding, transaction hashing and
//! fee computation. No I/O is performed; every operation is a pure function
//! of the transaction record and the network parameters.

pub mod address;
pub mod computer;
pub mod config;
pub mod constants;
pub mod converter;
pub mod error;
pub mod fee_calculator;
pub mod serialization;
pub mod signing;
pub mod transaction;

pub use address::Address;
pub use computer::TransactionComputer;
pub use config::NetworkConfig;
pub use converter::BroadcastTransaction;
pub use error::{DrtxError, Result};
pub use fee_calculator::{FeeBreakdown, FeeCalculator};
pub use serialization::ProtoSerializer;
pub use signing::{Signer, SignerRole, UserSigner, UserVerifier, Verifier};
pub use transaction::{Transaction, TransactionBuilder};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::address::Address;
    pub use crate::computer::TransactionComputer;
    pub use crate::config::NetworkConfig;
    pub use crate::error::DrtxError;
    pub use crate::signing::{Signer, SignerRole, UserSigner, UserVerifier, Verifier};
    pub use crate::transaction::{Transaction, TransactionBuilder};
}
