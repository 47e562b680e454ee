#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Coeur du trousseau — Types communs et erreurs
//!
//! **Documentation (FR)** : Ce crate fournit l'erreur typée partagée par le trousseau de test,
//! l'alias de numéro de version et un conteneur d'octets sensibles. Aucun secret n'est affiché
//! via `Display`/`Debug`. Les valeurs sensibles utilisent `zeroize`.

use thiserror::Error;
use zeroize::Zeroize;

/// Numéro de version d'une clé au sein d'un jeu de clés.
pub type Version = u32;

/// Bytes container that zeroizes its content on drop.
///
/// *Code in English; doc in French.*
#[derive(Default, Clone, PartialEq, Eq)]
pub struct SecretBytes(pub Vec<u8>);

impl core::ops::Deref for SecretBytes {
    type Target = Vec<u8>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl core::ops::DerefMut for SecretBytes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
impl Drop for SecretBytes {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl From<Vec<u8>> for SecretBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

// Pas de contenu dans Debug
impl core::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SecretBytes([REDACTED; {}])", self.0.len())
    }
}

/// Erreur commune du trousseau.
#[derive(Debug, Error)]
pub enum TrousseauError {
    /// Aucune clé privée enregistrée pour cette version.
    #[error("Key not found for version {version}")]
    KeyNotFound {
        /// Version demandée
        version: Version,
    },
    /// Aucun descripteur de version dans les métadonnées.
    #[error("Version {version} is not declared in metadata")]
    VersionNotDeclared {
        /// Version demandée
        version: Version,
    },
    /// Taille refusée par le type de clé.
    #[error("Unsupported size {size} for key type {key_type}")]
    UnsupportedKeySize {
        /// Nom du type de clé
        key_type: String,
        /// Taille demandée (bits)
        size: u32,
    },
    /// Erreur de (dé)sérialisation JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Erreur cryptographique encapsulée (message non-sensible).
    #[error("Crypto error: {0}")]
    Crypto(String),
    /// Configuration invalide (variable d'environnement, etc.).
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Résultat standardisé du trousseau.
pub type TrousseauResult<T> = Result<T, TrousseauError>;

/// Trait utilitaire pour normaliser les conversions d'erreur externes.
pub trait IntoTrousseauError<T> {
    /// Convertit une erreur de sérialisation en `TrousseauError`.
    ///
    /// # Errors
    /// Retourne `TrousseauError::Serialization` contenant le message d'erreur de la source.
    fn serialization(self) -> TrousseauResult<T>;
}

impl<T, E: core::fmt::Display> IntoTrousseauError<T> for Result<T, E> {
    fn serialization(self) -> TrousseauResult<T> {
        self.map_err(|e| TrousseauError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_bytes_deref() {
        let mut sb = SecretBytes(vec![1, 2, 3]);

        assert_eq!(sb.len(), 3);
        assert_eq!(&sb[..], &[1, 2, 3]);

        sb[1] = 99;
        assert_eq!(sb[1], 99);
    }

    #[test]
    fn test_secret_bytes_debug_is_redacted() {
        let sb = SecretBytes::from(vec![0xde, 0xad, 0xbe, 0xef]);
        let debug_str = format!("{sb:?}");
        assert_eq!(debug_str, "SecretBytes([REDACTED; 4])");
    }

    #[test]
    fn test_trousseau_error_display() {
        let err = TrousseauError::KeyNotFound { version: 3 };
        assert_eq!(err.to_string(), "Key not found for version 3");

        let err = TrousseauError::VersionNotDeclared { version: 7 };
        assert_eq!(err.to_string(), "Version 7 is not declared in metadata");

        let err = TrousseauError::UnsupportedKeySize {
            key_type: "AES".to_string(),
            size: 100,
        };
        assert_eq!(err.to_string(), "Unsupported size 100 for key type AES");

        let err = TrousseauError::Crypto("bad key".to_string());
        assert_eq!(err.to_string(), "Crypto error: bad key");

        let err = TrousseauError::Config("seed".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: seed");
    }

    #[test]
    fn test_into_trousseau_error_success() {
        let result: Result<i32, &str> = Ok(42);
        assert_eq!(result.serialization().unwrap(), 42);
    }

    #[test]
    fn test_into_trousseau_error_from_serde() {
        let parsed: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        match parsed.serialization() {
            Err(TrousseauError::Serialization(msg)) => assert!(!msg.is_empty()),
            other => panic!("Expected Serialization error, got {other:?}"),
        }
    }
}
