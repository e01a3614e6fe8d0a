//! Network constants

/// Human-readable prefix of main network addresses
pub const DEFAULT_HRP: &str = "drt";

/// Raw public key length carried by every address
pub const PUBKEY_LENGTH: usize = 32;

/// Output size of both transaction digests
pub const DIGEST_SIZE: usize = 32;

pub const MIN_GAS_PRICE: u64 = 1_000_000_000;
pub const DEFAULT_TRANSACTION_VERSION: u32 = 2;
pub const DEFAULT_TRANSACTION_OPTIONS: u32 = 0;

/// Lowest version whose `options` field is honored by the network
pub const MIN_VERSION_WITH_OPTIONS: u32 = 2;

/// Options bit 0: the signature covers the Keccak-256 digest of the signing bytes
pub const OPTIONS_HASH_SIGN: u32 = 0b0001;
/// Options bit 1: the transaction carries a guardian co-signature
pub const OPTIONS_GUARDED: u32 = 0b0010;
