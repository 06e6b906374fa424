use crate::core::errors::ExchangeError;
use base64::engine::general_purpose;
use base64::Engine;
use ed25519_dalek::pkcs8::DecodePrivateKey as _;
use ed25519_dalek::Signer as _;
use hmac::{Hmac, Mac};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey as RsaSigningKey;
use rsa::pkcs8::DecodePrivateKey as _;
use rsa::signature::{SignatureEncoding, Signer as _};
use rsa::RsaPrivateKey;
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Which signing scheme the API key was registered with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeyType {
    #[default]
    Hmac,
    Rsa,
    Ed25519,
}

impl KeyType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hmac => "HMAC",
            Self::Rsa => "RSA",
            Self::Ed25519 => "ED25519",
        }
    }

    /// Build the signer for this key type from the configured secret
    ///
    /// # Arguments
    /// * `secret` - HMAC secret, RSA private key PEM (PKCS#8 or PKCS#1), or
    ///   Ed25519 PKCS#8 PEM / base64 seed
    ///
    /// # Returns
    /// A boxed [`Signer`], or [`ExchangeError::Signing`] when the key material
    /// does not parse
    pub fn signer(self, secret: &str) -> Result<Box<dyn Signer>, ExchangeError> {
        Ok(match self {
            Self::Hmac => Box::new(HmacSigner::new(secret)),
            Self::Rsa => Box::new(RsaSigner::from_pem(secret)?),
            Self::Ed25519 => Box::new(Ed25519Signer::from_key(secret)?),
        })
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HMAC" => Ok(Self::Hmac),
            "RSA" => Ok(Self::Rsa),
            "ED25519" => Ok(Self::Ed25519),
            other => Err(ExchangeError::Validation(format!(
                "unknown key type: {}",
                other
            ))),
        }
    }
}

/// Produces the `signature` parameter for a canonical string
///
/// The canonical string is the encoded query string followed directly by the
/// encoded form body. Implementations are pure: the same payload always yields
/// the same signature.
pub trait Signer: Send + Sync {
    fn key_type(&self) -> KeyType;

    fn sign(&self, payload: &str) -> Result<String, ExchangeError>;
}

/// Sign `payload` with a freshly parsed key of the given type
pub fn sign(key_type: KeyType, secret: &str, payload: &str) -> Result<String, ExchangeError> {
    key_type.signer(secret)?.sign(payload)
}

/// HMAC-SHA256 keyed by the raw secret bytes, hex encoded
pub struct HmacSigner {
    secret_key: Secret<String>,
}

impl HmacSigner {
    pub fn new(secret_key: &str) -> Self {
        Self {
            secret_key: Secret::new(secret_key.to_string()),
        }
    }
}

impl Signer for HmacSigner {
    fn key_type(&self) -> KeyType {
        KeyType::Hmac
    }

    fn sign(&self, payload: &str) -> Result<String, ExchangeError> {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.expose_secret().as_bytes())
            .map_err(|e| ExchangeError::Signing(format!("Invalid secret key: {}", e)))?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

/// RSA PKCS#1 v1.5 over SHA-256, base64 encoded
pub struct RsaSigner {
    signing_key: RsaSigningKey<Sha256>,
}

impl RsaSigner {
    /// Parse a PKCS#8 (`BEGIN PRIVATE KEY`) or PKCS#1 (`BEGIN RSA PRIVATE KEY`) PEM
    pub fn from_pem(pem: &str) -> Result<Self, ExchangeError> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| ExchangeError::Signing(format!("Invalid RSA private key: {}", e)))?;

        Ok(Self {
            signing_key: RsaSigningKey::<Sha256>::new(private_key),
        })
    }
}

impl Signer for RsaSigner {
    fn key_type(&self) -> KeyType {
        KeyType::Rsa
    }

    fn sign(&self, payload: &str) -> Result<String, ExchangeError> {
        let signature = self
            .signing_key
            .try_sign(payload.as_bytes())
            .map_err(|e| ExchangeError::Signing(format!("RSA signing failed: {}", e)))?;
        Ok(general_purpose::STANDARD.encode(signature.to_bytes()))
    }
}

/// Ed25519 over the canonical bytes, base64 encoded
pub struct Ed25519Signer {
    signing_key: ed25519_dalek::SigningKey,
}

impl Ed25519Signer {
    /// Accepts a PKCS#8 PEM or a base64-encoded 32-byte seed
    pub fn from_key(key: &str) -> Result<Self, ExchangeError> {
        let key = key.trim();
        if key.starts_with("-----BEGIN") {
            let signing_key = ed25519_dalek::SigningKey::from_pkcs8_pem(key).map_err(|e| {
                ExchangeError::Signing(format!("Invalid Ed25519 private key: {}", e))
            })?;
            return Ok(Self { signing_key });
        }

        let key_bytes = Zeroizing::new(general_purpose::STANDARD.decode(key).map_err(|e| {
            ExchangeError::Signing(format!("Invalid Ed25519 private key format: {}", e))
        })?);
        let seed: [u8; 32] = key_bytes.as_slice().try_into().map_err(|_| {
            ExchangeError::Signing(format!(
                "Invalid Ed25519 private key length: expected 32 bytes, got {}",
                key_bytes.len()
            ))
        })?;
        let seed = Zeroizing::new(seed);

        Ok(Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(&seed),
        })
    }

    pub fn verifying_key(&self) -> ed25519_dalek::VerifyingKey {
        self.signing_key.verifying_key()
    }
}

impl Signer for Ed25519Signer {
    fn key_type(&self) -> KeyType {
        KeyType::Ed25519
    }

    fn sign(&self, payload: &str) -> Result<String, ExchangeError> {
        let signature = self.signing_key.sign(payload.as_bytes());
        Ok(general_purpose::STANDARD.encode(signature.to_bytes()))
    }
}
