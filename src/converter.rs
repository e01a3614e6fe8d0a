//! JSON form of a signed transaction as submitted to the network's HTTP API
//!
//! Unlike the signing payload this form carries the signatures (hex) and is
//! parsed as well as produced. Absent optional fields are omitted.

use crate::error::{DrtxError, Result};
use crate::transaction::{non_empty_bytes, Transaction};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastTransaction {
    pub nonce: u64,
    pub value: String,
    pub receiver: String,
    pub sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_username: Option<String>,
    pub gas_price: u64,
    pub gas_limit: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(rename = "chainID")]
    pub chain_id: String,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relayer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relayer_signature: Option<String>,
}

impl BroadcastTransaction {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DrtxError::Decoding(e.to_string()))
    }
}

impl From<&Transaction> for BroadcastTransaction {
    fn from(transaction: &Transaction) -> Self {
        Self {
            nonce: transaction.nonce,
            value: transaction.value.to_string(),
            receiver: transaction.receiver.clone(),
            sender: transaction.sender.clone(),
            sender_username: transaction.sender_username().map(|name| BASE64.encode(name)),
            receiver_username: transaction.receiver_username().map(|name| BASE64.encode(name)),
            gas_price: transaction.gas_price,
            gas_limit: transaction.gas_limit,
            data: transaction.data_bytes().map(|data| BASE64.encode(data)),
            chain_id: transaction.chain_id.clone(),
            version: transaction.version,
            options: Some(transaction.options).filter(|options| *options != 0),
            guardian: transaction.guardian().map(str::to_string),
            relayer: transaction.relayer().map(str::to_string),
            signature: non_empty_bytes(&transaction.signature).map(hex::encode),
            guardian_signature: transaction
                .guardian()
                .and(non_empty_bytes(&transaction.guardian_signature))
                .map(hex::encode),
            relayer_signature: transaction
                .relayer()
                .and(non_empty_bytes(&transaction.relayer_signature))
                .map(hex::encode),
        }
    }
}

impl TryFrom<BroadcastTransaction> for Transaction {
    type Error = DrtxError;

    fn try_from(dto: BroadcastTransaction) -> Result<Self> {
        let value = BigUint::from_str(&dto.value)
            .map_err(|e| DrtxError::Decoding(format!("invalid value {:?}: {}", dto.value, e)))?;

        let mut transaction = Transaction::new(dto.sender, dto.receiver, dto.gas_limit, dto.chain_id);
        transaction.nonce = dto.nonce;
        transaction.value = value;
        transaction.sender_username = decode_username(dto.sender_username)?;
        transaction.receiver_username = decode_username(dto.receiver_username)?;
        transaction.gas_price = dto.gas_price;
        transaction.data = decode_optional(dto.data, |text| Ok(BASE64.decode(text)?))?;
        transaction.version = dto.version;
        transaction.options = dto.options.unwrap_or_default();
        transaction.guardian = dto.guardian.filter(|g| !g.is_empty());
        transaction.relayer = dto.relayer.filter(|r| !r.is_empty());
        transaction.signature = decode_optional(dto.signature, |text| Ok(hex::decode(text)?))?;
        transaction.guardian_signature =
            decode_optional(dto.guardian_signature, |text| Ok(hex::decode(text)?))?;
        transaction.relayer_signature =
            decode_optional(dto.relayer_signature, |text| Ok(hex::decode(text)?))?;

        Ok(transaction)
    }
}

fn decode_optional<F>(field: Option<String>, decode: F) -> Result<Option<Vec<u8>>>
where
    F: Fn(&str) -> Result<Vec<u8>>,
{
    match field.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => decode(text).map(|bytes| Some(bytes).filter(|b| !b.is_empty())),
    }
}

fn decode_username(field: Option<String>) -> Result<Option<String>> {
    let Some(bytes) = decode_optional(field, |text| Ok(BASE64.decode(text)?))? else {
        return Ok(None);
    };
    let name = String::from_utf8(bytes)
        .map_err(|e| DrtxError::Decoding(format!("username is not valid UTF-8: {}", e)))?;
    Ok(Some(name))
}
