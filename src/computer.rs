//! Transaction computer
//!
//! Derives everything the network needs from a [`Transaction`]:
//!
//! - the canonical JSON a signer signs ([`TransactionComputer::compute_bytes_for_signing`]),
//! - its Keccak-256 digest, signed instead of the JSON when options bit 0 is set,
//! - the bytes a verifier must check a signature against,
//! - the BLAKE2b-256 transaction hash over the signed wire encoding,
//! - the network fee.
//!
//! The computer holds no state. Option-flag helpers mutate the transaction
//! through `&mut` and nothing else.

use crate::address::Address;
use crate::config::NetworkConfig;
use crate::constants::{DIGEST_SIZE, MIN_VERSION_WITH_OPTIONS, OPTIONS_GUARDED, OPTIONS_HASH_SIGN};
use crate::error::{DrtxError, Result};
use crate::fee_calculator::{FeeBreakdown, FeeCalculator};
use crate::serialization::ProtoSerializer;
use crate::signing::{Signer, SignerRole, Verifier};
use crate::transaction::Transaction;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use num_bigint::BigUint;
use serde::Serialize;
use sha3::Keccak256;
use tracing::{debug, trace};

type Blake2b256 = Blake2b<U32>;

/// The object serialized for signing. Field order is the key order of the
/// signed JSON; absent optional fields produce no key at all.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SigningPayload<'a> {
    nonce: u64,
    value: String,
    receiver: &'a str,
    sender: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    receiver_username: Option<String>,
    gas_price: u64,
    gas_limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(rename = "chainID")]
    chain_id: &'a str,
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    guardian: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    relayer: Option<&'a str>,
}

impl<'a> SigningPayload<'a> {
    fn from_transaction(transaction: &'a Transaction) -> Self {
        Self {
            nonce: transaction.nonce,
            value: transaction.value.to_str_radix(10),
            receiver: &transaction.receiver,
            sender: &transaction.sender,
            sender_username: transaction.sender_username().map(|name| BASE64.encode(name)),
            receiver_username: transaction.receiver_username().map(|name| BASE64.encode(name)),
            gas_price: transaction.gas_price,
            gas_limit: transaction.gas_limit,
            data: transaction.data_bytes().map(|data| BASE64.encode(data)),
            chain_id: &transaction.chain_id,
            version: transaction.version,
            options: Some(transaction.options).filter(|options| *options != 0),
            guardian: transaction.guardian(),
            relayer: transaction.relayer(),
        }
    }
}

/// Stateless transaction computer
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionComputer {
    serializer: ProtoSerializer,
}

impl TransactionComputer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical JSON bytes the sender signs
    pub fn compute_bytes_for_signing(&self, transaction: &Transaction) -> Result<Vec<u8>> {
        self.ensure_fields(transaction)?;
        let bytes = serde_json::to_vec(&SigningPayload::from_transaction(transaction))?;
        trace!(nonce = transaction.nonce, len = bytes.len(), "serialized transaction for signing");
        Ok(bytes)
    }

    /// Keccak-256 digest of the signing bytes
    pub fn compute_hash_for_signing(&self, transaction: &Transaction) -> Result<[u8; DIGEST_SIZE]> {
        let bytes = self.compute_bytes_for_signing(transaction)?;
        Ok(digest_array::<Keccak256>(&bytes))
    }

    /// The bytes a signature must be checked against: the digest when the
    /// transaction is hash-signed, the raw signing bytes otherwise.
    pub fn compute_bytes_for_verifying(&self, transaction: &Transaction) -> Result<Vec<u8>> {
        if self.has_options_set_for_hash_signing(transaction) {
            return Ok(self.compute_hash_for_signing(transaction)?.to_vec());
        }
        self.compute_bytes_for_signing(transaction)
    }

    /// BLAKE2b-256 of the wire encoding, signatures included
    pub fn compute_transaction_hash(&self, transaction: &Transaction) -> Result<[u8; DIGEST_SIZE]> {
        let wire = self.serializer.serialize_transaction(transaction)?;
        let hash = digest_array::<Blake2b256>(&wire);
        debug!(nonce = transaction.nonce, hash = %hex::encode(hash), "computed transaction hash");
        Ok(hash)
    }

    /// Wire bytes for broadcast
    pub fn compute_wire_bytes(&self, transaction: &Transaction) -> Result<Vec<u8>> {
        self.serializer.serialize_transaction(transaction)
    }

    /// Total fee the network charges for `transaction`
    pub fn compute_transaction_fee(
        &self,
        transaction: &Transaction,
        config: &NetworkConfig,
    ) -> Result<BigUint> {
        Ok(self.compute_fee_breakdown(transaction, config)?.total)
    }

    pub fn compute_fee_breakdown(
        &self,
        transaction: &Transaction,
        config: &NetworkConfig,
    ) -> Result<FeeBreakdown> {
        let breakdown = FeeCalculator::from_config(config)?
            .calculate_for(transaction)
            .map_err(|err| {
                debug!(gas_limit = transaction.gas_limit, error = %err, "fee computation rejected");
                err
            })?;
        trace!(
            gas_limit = transaction.gas_limit,
            required_gas = %breakdown.required_gas,
            fee = %breakdown.total,
            "computed transaction fee"
        );
        Ok(breakdown)
    }

    pub fn has_options_set_for_guarded_transaction(&self, transaction: &Transaction) -> bool {
        transaction.options & OPTIONS_GUARDED == OPTIONS_GUARDED
    }

    pub fn has_options_set_for_hash_signing(&self, transaction: &Transaction) -> bool {
        transaction.options & OPTIONS_HASH_SIGN == OPTIONS_HASH_SIGN
    }

    /// Mark the transaction as signed over the hash of its signing bytes
    pub fn apply_options_for_hash_signing(&self, transaction: &mut Transaction) {
        raise_version(transaction);
        transaction.options |= OPTIONS_HASH_SIGN;
    }

    /// Attach a guardian and mark the transaction as guarded
    pub fn apply_guardian(&self, transaction: &mut Transaction, guardian: &str) -> Result<()> {
        ensure_address("guardian", guardian)?;
        raise_version(transaction);
        transaction.options |= OPTIONS_GUARDED;
        transaction.guardian = Some(guardian.to_string());
        Ok(())
    }

    /// Attach a fee-paying relayer
    pub fn apply_relayer(&self, transaction: &mut Transaction, relayer: &str) -> Result<()> {
        ensure_address("relayer", relayer)?;
        raise_version(transaction);
        transaction.relayer = Some(relayer.to_string());
        Ok(())
    }

    /// Sign as the sender
    pub fn sign_transaction<S: Signer + ?Sized>(
        &self,
        transaction: &mut Transaction,
        signer: &S,
    ) -> Result<()> {
        self.sign_as(transaction, SignerRole::Sender, signer)
    }

    /// Sign the transaction and store the signature in the slot of `role`.
    /// Guardian and relayer sign the same bytes as the sender.
    pub fn sign_as<S: Signer + ?Sized>(
        &self,
        transaction: &mut Transaction,
        role: SignerRole,
        signer: &S,
    ) -> Result<()> {
        match role {
            SignerRole::Guardian if transaction.guardian().is_none() => {
                return Err(DrtxError::Signature(
                    "cannot sign as guardian: the `guardian` field is not set".to_string(),
                ));
            }
            SignerRole::Relayer if transaction.relayer().is_none() => {
                return Err(DrtxError::Signature(
                    "cannot sign as relayer: the `relayer` field is not set".to_string(),
                ));
            }
            _ => {}
        }

        let message = self.compute_bytes_for_verifying(transaction)?;
        let signature = signer.sign(&message)?;
        debug!(nonce = transaction.nonce, field = role.field_name(), "signed transaction");

        let slot = match role {
            SignerRole::Sender => &mut transaction.signature,
            SignerRole::Guardian => &mut transaction.guardian_signature,
            SignerRole::Relayer => &mut transaction.relayer_signature,
        };
        *slot = Some(signature);
        Ok(())
    }

    /// Check the signature stored in the slot of `role`. A missing signature
    /// does not verify.
    pub fn verify_as<V: Verifier + ?Sized>(
        &self,
        transaction: &Transaction,
        role: SignerRole,
        verifier: &V,
    ) -> Result<bool> {
        let signature = match role {
            SignerRole::Sender => &transaction.signature,
            SignerRole::Guardian => &transaction.guardian_signature,
            SignerRole::Relayer => &transaction.relayer_signature,
        };
        let Some(signature) = signature.as_deref() else {
            debug!(field = role.field_name(), "no signature to verify");
            return Ok(false);
        };

        let message = self.compute_bytes_for_verifying(transaction)?;
        Ok(verifier.verify(&message, signature))
    }

    fn ensure_fields(&self, transaction: &Transaction) -> Result<()> {
        if Address::from_bech32(&transaction.sender).is_err() {
            debug!(sender = %transaction.sender, "rejected transaction with invalid sender");
            return Err(DrtxError::BadUsage(
                "Invalid `sender` field. Should be the bech32 address of the sender.".to_string(),
            ));
        }

        ensure_address("receiver", &transaction.receiver)?;

        if transaction.chain_id.is_empty() {
            debug!("rejected transaction without chain id");
            return Err(DrtxError::BadUsage("The `chainID` field is not set".to_string()));
        }

        if transaction.options != 0 && transaction.version < MIN_VERSION_WITH_OPTIONS {
            debug!(
                version = transaction.version,
                options = transaction.options,
                "rejected options on a transaction version that does not support them"
            );
            return Err(DrtxError::BadUsage(format!(
                "Non-empty transaction options requires transaction version >= {}",
                MIN_VERSION_WITH_OPTIONS
            )));
        }

        if let Some(guardian) = transaction.guardian() {
            ensure_address("guardian", guardian)?;
        }
        if let Some(relayer) = transaction.relayer() {
            ensure_address("relayer", relayer)?;
        }

        Ok(())
    }
}

fn digest_array<D: Digest>(data: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut output = [0u8; DIGEST_SIZE];
    output.copy_from_slice(&D::digest(data));
    output
}

fn raise_version(transaction: &mut Transaction) {
    if transaction.version < MIN_VERSION_WITH_OPTIONS {
        transaction.version = MIN_VERSION_WITH_OPTIONS;
    }
}

fn ensure_address(field: &str, text: &str) -> Result<()> {
    Address::from_bech32(text).map(|_| ()).map_err(|err| {
        debug!(field, value = text, "rejected invalid address");
        DrtxError::BadUsage(format!(
            "Invalid `{}` field. Should be a bech32 address: {}",
            field, err
        ))
    })
}
