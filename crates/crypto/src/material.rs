//! # Matériel de clé
//!
//! Variante étiquetée remplaçant les conversions dynamiques vers « clé privée » / « clé
//! publique » : `as_private()` et `as_public()` renvoient une `Option` et n'échouent jamais.
//!
//! Les projections publiques RSA/DSA sont simulées (dérivation BLAKE3 du secret) ; seules les
//! clés Ed25519 portent une vraie clé publique.

use crate::key_type::{Family, KeyType};
use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use trousseau_core::{IntoTrousseauError, SecretBytes, TrousseauError, TrousseauResult};
use zeroize::Zeroize;

const DSA_PUBLIC_CONTEXT: &str = "trousseau 2024-05-01 dsa public projection";
const RSA_PUBLIC_CONTEXT: &str = "trousseau 2024-05-01 rsa public projection";

/// Clé symétrique (AES, HMAC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymmetricKey {
    key_type: KeyType,
    secret: SecretBytes,
}

/// Moitié privée d'une paire, avec sa projection publique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey {
    key_type: KeyType,
    secret: SecretBytes,
    public: PublicKey,
}

/// Moitié publique d'une paire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    key_type: KeyType,
    bytes: Vec<u8>,
}

/// Matériel de clé stocké dans le trousseau.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    /// Clé symétrique
    Symmetric(SymmetricKey),
    /// Clé privée asymétrique
    Private(PrivateKey),
    /// Clé publique asymétrique
    Public(PublicKey),
}

impl SymmetricKey {
    /// Construit une clé symétrique depuis ses octets.
    ///
    /// # Errors
    /// Échec si `key_type` n'est pas un type symétrique.
    pub fn from_bytes(key_type: KeyType, secret: Vec<u8>) -> TrousseauResult<Self> {
        if key_type.is_asymmetric() {
            return Err(type_mismatch(key_type, "symmetric"));
        }
        Ok(Self {
            key_type,
            secret: secret.into(),
        })
    }

    /// Type de la clé.
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Taille en bits.
    #[must_use]
    pub fn size(&self) -> u32 {
        bit_len(&self.secret)
    }

    /// Octets secrets (lecture seule).
    #[must_use]
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl PrivateKey {
    /// Construit une clé privée et dérive sa projection publique.
    ///
    /// # Errors
    /// Échec si `key_type` n'est pas un type privé, ou si le secret Ed25519 ne fait pas 32 octets.
    pub fn from_secret(key_type: KeyType, secret: Vec<u8>) -> TrousseauResult<Self> {
        let Some(public_type) = key_type.public_type().filter(|_| key_type.is_private()) else {
            return Err(type_mismatch(key_type, "private"));
        };
        let secret = SecretBytes::from(secret);
        let bytes = derive_public(key_type, &secret)?;
        Ok(Self {
            key_type,
            secret,
            public: PublicKey {
                key_type: public_type,
                bytes,
            },
        })
    }

    /// Type de la clé.
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Taille en bits.
    #[must_use]
    pub fn size(&self) -> u32 {
        bit_len(&self.secret)
    }

    /// Projection publique de la clé.
    #[must_use]
    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    /// Octets secrets (lecture seule).
    #[must_use]
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl PublicKey {
    /// Construit une clé publique depuis ses octets, sans validation.
    ///
    /// # Errors
    /// Échec si `key_type` n'est pas un type public.
    pub fn from_bytes(key_type: KeyType, bytes: Vec<u8>) -> TrousseauResult<Self> {
        if !key_type.is_public() {
            return Err(type_mismatch(key_type, "public"));
        }
        Ok(Self { key_type, bytes })
    }

    /// Type de la clé.
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Taille en bits.
    #[must_use]
    pub fn size(&self) -> u32 {
        bit_len(&self.bytes)
    }

    /// Octets publics.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl KeyMaterial {
    /// Type de la clé.
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        match self {
            KeyMaterial::Symmetric(k) => k.key_type(),
            KeyMaterial::Private(k) => k.key_type(),
            KeyMaterial::Public(k) => k.key_type(),
        }
    }

    /// Taille en bits.
    #[must_use]
    pub fn size(&self) -> u32 {
        match self {
            KeyMaterial::Symmetric(k) => k.size(),
            KeyMaterial::Private(k) => k.size(),
            KeyMaterial::Public(k) => k.size(),
        }
    }

    /// Vue « clé privée » si applicable.
    #[must_use]
    pub fn as_private(&self) -> Option<&PrivateKey> {
        match self {
            KeyMaterial::Private(k) => Some(k),
            _ => None,
        }
    }

    /// Vue « clé publique » si applicable.
    #[must_use]
    pub fn as_public(&self) -> Option<&PublicKey> {
        match self {
            KeyMaterial::Public(k) => Some(k),
            _ => None,
        }
    }

    /// Sérialise la clé en JSON.
    ///
    /// # Errors
    /// Échec si l'encodeur JSON échoue.
    pub fn to_json(&self) -> TrousseauResult<String> {
        serde_json::to_string(&self.record()).serialization()
    }

    /// Reconstruit une clé depuis sa forme JSON.
    ///
    /// La variante est choisie d'après le champ `type`. Pour une clé privée, la projection
    /// publique est recalculée et doit correspondre à `publicKey` si ce champ est présent.
    ///
    /// # Errors
    /// Échec si le JSON ou l'hexadécimal est invalide, si `size` ne correspond pas au matériel,
    /// ou si la projection publique diverge.
    pub fn from_json(text: &str) -> TrousseauResult<Self> {
        let record: KeyRecord = serde_json::from_str(text).serialization()?;
        let bytes = record.decode()?;
        match record.key_type {
            t if t.is_private() => {
                let key = PrivateKey::from_secret(t, bytes)?;
                if let Some(public) = &record.public_key {
                    if public.decode()? != key.public.bytes {
                        return Err(TrousseauError::Crypto(
                            "public projection mismatch".to_string(),
                        ));
                    }
                }
                Ok(KeyMaterial::Private(key))
            }
            t if t.is_public() => Ok(KeyMaterial::Public(PublicKey::from_bytes(t, bytes)?)),
            t => Ok(KeyMaterial::Symmetric(SymmetricKey::from_bytes(t, bytes)?)),
        }
    }

    fn record(&self) -> KeyRecord {
        match self {
            KeyMaterial::Symmetric(k) => KeyRecord::new(k.key_type, &k.secret, None),
            KeyMaterial::Private(k) => KeyRecord::new(
                k.key_type,
                &k.secret,
                Some(KeyRecord::new(k.public.key_type, &k.public.bytes, None)),
            ),
            KeyMaterial::Public(k) => KeyRecord::new(k.key_type, &k.bytes, None),
        }
    }
}

impl From<SymmetricKey> for KeyMaterial {
    fn from(key: SymmetricKey) -> Self {
        KeyMaterial::Symmetric(key)
    }
}

impl From<PrivateKey> for KeyMaterial {
    fn from(key: PrivateKey) -> Self {
        KeyMaterial::Private(key)
    }
}

impl From<PublicKey> for KeyMaterial {
    fn from(key: PublicKey) -> Self {
        KeyMaterial::Public(key)
    }
}

/// Forme JSON d'une clé ; le champ `material` est effacé à la destruction.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyRecord {
    #[serde(rename = "type")]
    key_type: KeyType,
    size: u32,
    material: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    public_key: Option<Box<KeyRecord>>,
}

impl KeyRecord {
    fn new(key_type: KeyType, bytes: &[u8], public_key: Option<KeyRecord>) -> Self {
        Self {
            key_type,
            size: bit_len(bytes),
            material: hex::encode(bytes),
            public_key: public_key.map(Box::new),
        }
    }

    fn decode(&self) -> TrousseauResult<Vec<u8>> {
        let bytes = hex::decode(&self.material).serialization()?;
        if bit_len(&bytes) != self.size {
            return Err(TrousseauError::Serialization(format!(
                "size {} does not match {} bytes of material",
                self.size,
                bytes.len()
            )));
        }
        Ok(bytes)
    }
}

impl Drop for KeyRecord {
    fn drop(&mut self) {
        self.material.zeroize();
    }
}

fn derive_public(key_type: KeyType, secret: &[u8]) -> TrousseauResult<Vec<u8>> {
    match key_type.family() {
        Family::Ed25519 => {
            let bytes: &[u8; 32] = secret.try_into().map_err(|_| {
                TrousseauError::Crypto(format!(
                    "Ed25519 secret must be 32 bytes, got {}",
                    secret.len()
                ))
            })?;
            Ok(SigningKey::from_bytes(bytes)
                .verifying_key()
                .to_bytes()
                .to_vec())
        }
        Family::Dsa => Ok(blake3_projection(DSA_PUBLIC_CONTEXT, secret)),
        Family::Rsa => Ok(blake3_projection(RSA_PUBLIC_CONTEXT, secret)),
        Family::Symmetric => Err(type_mismatch(key_type, "private")),
    }
}

fn blake3_projection(context: &str, secret: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; secret.len()];
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(secret);
    hasher.finalize_xof().fill(&mut out);
    out
}

fn bit_len(bytes: &[u8]) -> u32 {
    u32::try_from(bytes.len()).map_or(u32::MAX, |n| n.saturating_mul(8))
}

fn type_mismatch(key_type: KeyType, expected: &str) -> TrousseauError {
    TrousseauError::Crypto(format!("{key_type} is not a {expected} key type"))
}
