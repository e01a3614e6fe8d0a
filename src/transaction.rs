//! The mutable transaction record
//!
//! A [`Transaction`] is a plain owned value. The computer reads it to produce
//! signing bytes, wire bytes and hashes, and mutates it only through the
//! option-flag and signing helpers, which all take `&mut Transaction`.
//!
//! Every optional field is an `Option`. The builder normalizes empty strings
//! and empty byte sequences to `None`, so "absent" has exactly one
//! representation.

use crate::constants::{
    DEFAULT_TRANSACTION_OPTIONS, DEFAULT_TRANSACTION_VERSION, MIN_GAS_PRICE, OPTIONS_GUARDED,
    OPTIONS_HASH_SIGN,
};
use crate::error::{DrtxError, Result};
use num_bigint::BigUint;

/// A transaction as assembled by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    /// Transferred amount; never routed through a fixed-width type
    pub value: BigUint,
    /// Bech32 address of the sender
    pub sender: String,
    /// Bech32 address of the receiver
    pub receiver: String,
    pub sender_username: Option<String>,
    pub receiver_username: Option<String>,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub data: Option<Vec<u8>>,
    pub chain_id: String,
    pub version: u32,
    pub options: u32,
    pub guardian: Option<String>,
    pub relayer: Option<String>,
    pub signature: Option<Vec<u8>>,
    pub guardian_signature: Option<Vec<u8>>,
    pub relayer_signature: Option<Vec<u8>>,
}

impl Transaction {
    /// Create a transaction with the required fields and network defaults
    /// for everything else.
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        gas_limit: u64,
        chain_id: impl Into<String>,
    ) -> Self {
        Self {
            nonce: 0,
            value: BigUint::default(),
            sender: sender.into(),
            receiver: receiver.into(),
            sender_username: None,
            receiver_username: None,
            gas_price: MIN_GAS_PRICE,
            gas_limit,
            data: None,
            chain_id: chain_id.into(),
            version: DEFAULT_TRANSACTION_VERSION,
            options: DEFAULT_TRANSACTION_OPTIONS,
            guardian: None,
            relayer: None,
            signature: None,
            guardian_signature: None,
            relayer_signature: None,
        }
    }

    /// Payload bytes, or `None` when the payload is absent or empty
    pub fn data_bytes(&self) -> Option<&[u8]> {
        non_empty_bytes(&self.data)
    }

    pub fn data_len(&self) -> usize {
        self.data_bytes().map_or(0, <[u8]>::len)
    }

    pub fn sender_username(&self) -> Option<&str> {
        non_empty_str(&self.sender_username)
    }

    pub fn receiver_username(&self) -> Option<&str> {
        non_empty_str(&self.receiver_username)
    }

    pub fn guardian(&self) -> Option<&str> {
        non_empty_str(&self.guardian)
    }

    pub fn relayer(&self) -> Option<&str> {
        non_empty_str(&self.relayer)
    }

    pub fn is_hash_signed(&self) -> bool {
        self.options & OPTIONS_HASH_SIGN == OPTIONS_HASH_SIGN
    }

    pub fn is_guarded(&self) -> bool {
        self.options & OPTIONS_GUARDED == OPTIONS_GUARDED
    }
}

pub(crate) fn non_empty_str(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

pub(crate) fn non_empty_bytes(field: &Option<Vec<u8>>) -> Option<&[u8]> {
    field.as_deref().filter(|b| !b.is_empty())
}

fn some_str(value: impl Into<String>) -> Option<String> {
    Some(value.into()).filter(|s| !s.is_empty())
}

fn some_bytes(value: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
    Some(value.into()).filter(|b| !b.is_empty())
}

/// Transaction builder with fluent API
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    nonce: u64,
    value: BigUint,
    sender: Option<String>,
    receiver: Option<String>,
    sender_username: Option<String>,
    receiver_username: Option<String>,
    gas_price: Option<u64>,
    gas_limit: u64,
    data: Option<Vec<u8>>,
    chain_id: String,
    version: Option<u32>,
    options: u32,
    guardian: Option<String>,
    relayer: Option<String>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn value(mut self, value: impl Into<BigUint>) -> Self {
        self.value = value.into();
        self
    }

    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = some_str(sender);
        self
    }

    pub fn receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = some_str(receiver);
        self
    }

    pub fn sender_username(mut self, username: impl Into<String>) -> Self {
        self.sender_username = some_str(username);
        self
    }

    pub fn receiver_username(mut self, username: impl Into<String>) -> Self {
        self.receiver_username = some_str(username);
        self
    }

    pub fn gas_price(mut self, gas_price: u64) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = some_bytes(data);
        self
    }

    pub fn chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = chain_id.into();
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn options(mut self, options: u32) -> Self {
        self.options = options;
        self
    }

    pub fn guardian(mut self, guardian: impl Into<String>) -> Self {
        self.guardian = some_str(guardian);
        self
    }

    pub fn relayer(mut self, relayer: impl Into<String>) -> Self {
        self.relayer = some_str(relayer);
        self
    }

    /// Assemble the transaction. Field consistency (address format, chain id,
    /// options against version) is checked later, when the transaction is
    /// serialized for signing.
    pub fn build(self) -> Result<Transaction> {
        let sender = self
            .sender
            .ok_or_else(|| DrtxError::BadUsage("The `sender` field is not set".to_string()))?;
        let receiver = self
            .receiver
            .ok_or_else(|| DrtxError::BadUsage("The `receiver` field is not set".to_string()))?;

        let mut transaction = Transaction::new(sender, receiver, self.gas_limit, self.chain_id);
        transaction.nonce = self.nonce;
        transaction.value = self.value;
        transaction.sender_username = self.sender_username;
        transaction.receiver_username = self.receiver_username;
        transaction.gas_price = self.gas_price.unwrap_or(MIN_GAS_PRICE);
        transaction.data = self.data;
        transaction.version = self.version.unwrap_or(DEFAULT_TRANSACTION_VERSION);
        transaction.options = self.options;
        transaction.guardian = self.guardian;
        transaction.relayer = self.relayer;

        Ok(transaction)
    }
}
