//! Signing seam
//!
//! The computer never touches key material. Callers hand it anything that
//! implements [`Signer`] or [`Verifier`]; [`UserSigner`] and [`UserVerifier`]
//! are the Ed25519 implementations used by network accounts.

use crate::address::Address;
use crate::config::NetworkConfig;
use crate::constants::PUBKEY_LENGTH;
use crate::error::{DrtxError, Result};
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};

/// Produces signatures over arbitrary bytes
pub trait Signer {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// Checks signatures over arbitrary bytes
pub trait Verifier {
    fn verify(&self, message: &[u8], signature: &[u8]) -> bool;
}

/// Which signature slot of a transaction a signer fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerRole {
    Sender,
    Guardian,
    Relayer,
}

impl SignerRole {
    pub fn field_name(&self) -> &'static str {
        match self {
            SignerRole::Sender => "signature",
            SignerRole::Guardian => "guardianSignature",
            SignerRole::Relayer => "relayerSignature",
        }
    }
}

/// Ed25519 signer built from a 32-byte secret seed
pub struct UserSigner {
    signing_key: SigningKey,
}

impl UserSigner {
    pub fn from_secret_bytes(secret: &[u8]) -> Result<Self> {
        let seed: [u8; 32] = secret.try_into().map_err(|_| {
            DrtxError::Signature(format!("secret key must be 32 bytes, got {}", secret.len()))
        })?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    pub fn from_secret_hex(secret_hex: &str) -> Result<Self> {
        let secret = hex::decode(secret_hex)?;
        Self::from_secret_bytes(&secret)
    }

    pub fn public_key(&self) -> [u8; PUBKEY_LENGTH] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Address of this signer under the default prefix
    pub fn address(&self) -> Address {
        Address::from_pubkey(self.public_key())
    }

    /// Address of this signer under the network's configured prefix
    pub fn address_for(&self, config: &NetworkConfig) -> Result<Address> {
        Address::new(self.public_key(), &config.address_hrp)
    }

    pub fn verifier(&self) -> UserVerifier {
        UserVerifier {
            verifying_key: self.signing_key.verifying_key(),
        }
    }
}

impl Signer for UserSigner {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(self.signing_key.sign(message).to_bytes().to_vec())
    }
}

/// Ed25519 verifier for an account's public key
#[derive(Debug, Clone)]
pub struct UserVerifier {
    verifying_key: VerifyingKey,
}

impl UserVerifier {
    pub fn from_pubkey(pubkey: &[u8; PUBKEY_LENGTH]) -> Result<Self> {
        let verifying_key = VerifyingKey::from_bytes(pubkey)
            .map_err(|e| DrtxError::Signature(format!("invalid public key: {}", e)))?;
        Ok(Self { verifying_key })
    }

    pub fn from_address(address: &Address) -> Result<Self> {
        Self::from_pubkey(address.pubkey())
    }
}

impl Verifier for UserVerifier {
    fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        self.verifying_key.verify(message, &signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE_SECRET: &str = "413f42575f7f26fad3317a778771212fdb80245850981e48b58a4f25e344e8f9";
    const ALICE: &str = "drt1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssey5egf";

    #[test]
    fn test_signer_address() {
        let signer = UserSigner::from_secret_hex(ALICE_SECRET).unwrap();
        assert_eq!(signer.address().to_bech32(), ALICE);
        assert_eq!(signer.address_for(&NetworkConfig::default()).unwrap(), signer.address());

        let testnet = NetworkConfig::default().with_address_hrp("test");
        let address = signer.address_for(&testnet).unwrap();
        assert_eq!(address.hrp(), "test");
        assert_eq!(address.pubkey(), signer.address().pubkey());
    }

    #[test]
    fn test_sign_and_verify() {
        let signer = UserSigner::from_secret_hex(ALICE_SECRET).unwrap();
        let signature = signer.sign(b"hello").unwrap();
        assert_eq!(signature.len(), 64);

        let verifier = UserVerifier::from_address(&Address::from_bech32(ALICE).unwrap()).unwrap();
        assert!(verifier.verify(b"hello", &signature));
        assert!(!verifier.verify(b"hellO", &signature));
        assert!(!verifier.verify(b"hello", &signature[..63]));
    }

    #[test]
    fn test_rejects_short_secret() {
        assert!(matches!(
            UserSigner::from_secret_bytes(&[1u8; 31]),
            Err(DrtxError::Signature(_))
        ));
    }

    #[test]
    fn test_role_field_names() {
        assert_eq!(SignerRole::Sender.field_name(), "signature");
        assert_eq!(SignerRole::Guardian.field_name(), "guardianSignature");
        assert_eq!(SignerRole::Relayer.field_name(), "relayerSignature");
    }
}
