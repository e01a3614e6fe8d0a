//! Protobuf wire encoding of transactions
//!
//! The network accepts and hashes transactions in a proto3 encoding of its
//! `Transaction` message. Tags and wire types below are the network's schema
//! and must not be renumbered: a mismatch still decodes, but as a different
//! transaction.
//!
//! Proto3 omits zero integers and empty byte strings, which lines up with the
//! omission rule of the signing JSON. `Options` and the guardian/relayer pairs
//! are additionally left out unless they are in use.

use crate::address::Address;
use crate::config::NetworkConfig;
use crate::error::{DrtxError, Result};
use crate::transaction::Transaction;
use num_bigint::BigUint;
use prost::Message;

/// The network's `Transaction` protobuf message
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoTransaction {
    #[prost(uint64, tag = "1")]
    pub nonce: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub rcv_addr: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub rcv_user_name: Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    pub snd_addr: Vec<u8>,
    #[prost(bytes = "vec", tag = "6")]
    pub snd_user_name: Vec<u8>,
    #[prost(uint64, tag = "7")]
    pub gas_price: u64,
    #[prost(uint64, tag = "8")]
    pub gas_limit: u64,
    #[prost(bytes = "vec", tag = "9")]
    pub data: Vec<u8>,
    #[prost(bytes = "vec", tag = "10")]
    pub chain_id: Vec<u8>,
    #[prost(uint32, tag = "11")]
    pub version: u32,
    #[prost(bytes = "vec", tag = "12")]
    pub signature: Vec<u8>,
    #[prost(uint32, tag = "13")]
    pub options: u32,
    #[prost(bytes = "vec", tag = "14")]
    pub guard_addr: Vec<u8>,
    #[prost(bytes = "vec", tag = "15")]
    pub guard_signature: Vec<u8>,
    #[prost(bytes = "vec", tag = "16")]
    pub relayer: Vec<u8>,
    #[prost(bytes = "vec", tag = "17")]
    pub relayer_signature: Vec<u8>,
}

/// Encode a transfer amount the way the network's big-integer caster does:
/// a sign byte followed by the big-endian magnitude, with zero written as
/// `[0x00, 0x00]`.
pub fn encode_value(value: &BigUint) -> Vec<u8> {
    if value.bits() == 0 {
        return vec![0x00, 0x00];
    }

    let magnitude = value.to_bytes_be();
    let mut bytes = Vec::with_capacity(magnitude.len() + 1);
    bytes.push(0x00);
    bytes.extend_from_slice(&magnitude);
    bytes
}

/// Decode a sign-prefixed amount; negative amounts are rejected
pub fn decode_value(bytes: &[u8]) -> Result<BigUint> {
    match bytes.split_first() {
        None => Ok(BigUint::default()),
        Some((0x00, magnitude)) => Ok(BigUint::from_bytes_be(magnitude)),
        Some((sign, _)) => Err(DrtxError::Decoding(format!(
            "unsupported sign byte {:#04x} in transaction value",
            sign
        ))),
    }
}

/// Resolve a bech32 field to its raw public key, naming the field on failure
pub(crate) fn address_field(field: &str, text: &str) -> Result<Vec<u8>> {
    Address::from_bech32(text)
        .map(|address| address.pubkey().to_vec())
        .map_err(|err| {
            DrtxError::BadUsage(format!(
                "Invalid `{}` field. Should be a bech32 address: {}",
                field, err
            ))
        })
}

/// Encoder/decoder between [`Transaction`] and its wire form
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtoSerializer;

impl ProtoSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Map a transaction onto the protobuf message
    pub fn to_proto_message(&self, transaction: &Transaction) -> Result<ProtoTransaction> {
        let mut proto = ProtoTransaction {
            nonce: transaction.nonce,
            value: encode_value(&transaction.value),
            rcv_addr: address_field("receiver", &transaction.receiver)?,
            rcv_user_name: transaction
                .receiver_username()
                .map(|name| name.as_bytes().to_vec())
                .unwrap_or_default(),
            snd_addr: address_field("sender", &transaction.sender)?,
            snd_user_name: transaction
                .sender_username()
                .map(|name| name.as_bytes().to_vec())
                .unwrap_or_default(),
            gas_price: transaction.gas_price,
            gas_limit: transaction.gas_limit,
            data: transaction.data_bytes().map(<[u8]>::to_vec).unwrap_or_default(),
            chain_id: transaction.chain_id.as_bytes().to_vec(),
            version: transaction.version,
            signature: transaction.signature.clone().unwrap_or_default(),
            ..Default::default()
        };

        if transaction.options != 0 {
            proto.options = transaction.options;
        }

        if let Some(guardian) = transaction.guardian() {
            proto.guard_addr = address_field("guardian", guardian)?;
            proto.guard_signature = transaction.guardian_signature.clone().unwrap_or_default();
        }

        if let Some(relayer) = transaction.relayer() {
            proto.relayer = address_field("relayer", relayer)?;
            proto.relayer_signature = transaction.relayer_signature.clone().unwrap_or_default();
        }

        Ok(proto)
    }

    /// Serialize the entire transaction, signatures included, to wire bytes
    pub fn serialize_transaction(&self, transaction: &Transaction) -> Result<Vec<u8>> {
        let proto = self.to_proto_message(transaction)?;
        Ok(proto.encode_to_vec())
    }

    /// Size in bytes of the wire encoding
    pub fn encoded_len(&self, transaction: &Transaction) -> Result<usize> {
        Ok(self.to_proto_message(transaction)?.encoded_len())
    }

    /// Decode wire bytes back into a transaction, rendering addresses under `hrp`
    pub fn deserialize_transaction(&self, bytes: &[u8], hrp: &str) -> Result<Transaction> {
        let proto = ProtoTransaction::decode(bytes)?;

        let receiver = pubkey_to_bech32("RcvAddr", &proto.rcv_addr, hrp)?;
        let sender = pubkey_to_bech32("SndAddr", &proto.snd_addr, hrp)?;
        let chain_id = utf8_field("ChainID", proto.chain_id)?;

        let mut transaction = Transaction::new(sender, receiver, proto.gas_limit, chain_id);
        transaction.nonce = proto.nonce;
        transaction.value = decode_value(&proto.value)?;
        transaction.sender_username = optional_utf8("SndUserName", proto.snd_user_name)?;
        transaction.receiver_username = optional_utf8("RcvUserName", proto.rcv_user_name)?;
        transaction.gas_price = proto.gas_price;
        transaction.data = optional_bytes(proto.data);
        transaction.version = proto.version;
        transaction.options = proto.options;
        transaction.signature = optional_bytes(proto.signature);

        if !proto.guard_addr.is_empty() {
            transaction.guardian = Some(pubkey_to_bech32("GuardAddr", &proto.guard_addr, hrp)?);
            transaction.guardian_signature = optional_bytes(proto.guard_signature);
        }

        if !proto.relayer.is_empty() {
            transaction.relayer = Some(pubkey_to_bech32("Relayer", &proto.relayer, hrp)?);
            transaction.relayer_signature = optional_bytes(proto.relayer_signature);
        }

        Ok(transaction)
    }

    /// Decode wire bytes with addresses rendered under the network's prefix
    pub fn deserialize_for_network(&self, bytes: &[u8], config: &NetworkConfig) -> Result<Transaction> {
        self.deserialize_transaction(bytes, &config.address_hrp)
    }
}

fn pubkey_to_bech32(field: &str, bytes: &[u8], hrp: &str) -> Result<String> {
    let pubkey = bytes.try_into().map_err(|_| {
        DrtxError::Decoding(format!("{} must be 32 bytes, got {}", field, bytes.len()))
    })?;
    Ok(Address::new(pubkey, hrp)?.to_bech32().to_string())
}

fn utf8_field(field: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|err| DrtxError::Decoding(format!("{} is not valid UTF-8: {}", field, err)))
}

fn optional_utf8(field: &str, bytes: Vec<u8>) -> Result<Option<String>> {
    if bytes.is_empty() {
        return Ok(None);
    }
    utf8_field(field, bytes).map(Some)
}

fn optional_bytes(bytes: Vec<u8>) -> Option<Vec<u8>> {
    Some(bytes).filter(|b| !b.is_empty())
}
