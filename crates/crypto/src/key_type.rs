//! Types de clés et tailles acceptées.
//!
//! Un `KeyType` est immuable : la taille de génération est passée explicitement à la fabrique
//! au lieu d'être stockée dans le type.

use serde::{Deserialize, Serialize};

/// Famille d'algorithme sous-jacente à un type de clé.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Family {
    Symmetric,
    Dsa,
    Rsa,
    Ed25519,
}

/// Types de clés supportés (nommage du schéma de métadonnées).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyType {
    /// Clé symétrique AES
    Aes,
    /// Clé symétrique HMAC-SHA1
    HmacSha1,
    /// Clé privée DSA
    DsaPriv,
    /// Clé publique DSA
    DsaPub,
    /// Clé privée RSA
    RsaPriv,
    /// Clé publique RSA
    RsaPub,
    /// Clé privée Ed25519
    Ed25519Priv,
    /// Clé publique Ed25519
    Ed25519Pub,
}

impl KeyType {
    /// Tous les types, dans l'ordre de déclaration.
    pub const ALL: [KeyType; 8] = [
        KeyType::Aes,
        KeyType::HmacSha1,
        KeyType::DsaPriv,
        KeyType::DsaPub,
        KeyType::RsaPriv,
        KeyType::RsaPub,
        KeyType::Ed25519Priv,
        KeyType::Ed25519Pub,
    ];

    /// Nom tel qu'il apparaît dans le JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            KeyType::Aes => "AES",
            KeyType::HmacSha1 => "HMAC_SHA1",
            KeyType::DsaPriv => "DSA_PRIV",
            KeyType::DsaPub => "DSA_PUB",
            KeyType::RsaPriv => "RSA_PRIV",
            KeyType::RsaPub => "RSA_PUB",
            KeyType::Ed25519Priv => "ED25519_PRIV",
            KeyType::Ed25519Pub => "ED25519_PUB",
        }
    }

    /// Tailles acceptées en bits. La première est la taille par défaut.
    #[must_use]
    pub const fn accepted_sizes(self) -> &'static [u32] {
        match self {
            KeyType::Aes => &[128, 192, 256],
            KeyType::HmacSha1 => &[256],
            KeyType::DsaPriv | KeyType::DsaPub => &[1024],
            KeyType::RsaPriv | KeyType::RsaPub => &[4096, 2048, 1024, 768, 512],
            KeyType::Ed25519Priv | KeyType::Ed25519Pub => &[256],
        }
    }

    /// Taille de génération par défaut (bits).
    #[must_use]
    pub const fn default_size(self) -> u32 {
        self.accepted_sizes()[0]
    }

    /// Indique si `size` fait partie des tailles acceptées.
    #[must_use]
    pub fn is_acceptable_size(self, size: u32) -> bool {
        self.accepted_sizes().contains(&size)
    }

    /// Vrai pour les types à paire de clés (privée/publique).
    #[must_use]
    pub const fn is_asymmetric(self) -> bool {
        !matches!(self.family(), Family::Symmetric)
    }

    /// Vrai pour la moitié privée d'un type asymétrique.
    #[must_use]
    pub const fn is_private(self) -> bool {
        matches!(
            self,
            KeyType::DsaPriv | KeyType::RsaPriv | KeyType::Ed25519Priv
        )
    }

    /// Vrai pour la moitié publique d'un type asymétrique.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, KeyType::DsaPub | KeyType::RsaPub | KeyType::Ed25519Pub)
    }

    /// Type de la projection publique (`None` pour les types symétriques).
    #[must_use]
    pub const fn public_type(self) -> Option<KeyType> {
        match self.family() {
            Family::Symmetric => None,
            Family::Dsa => Some(KeyType::DsaPub),
            Family::Rsa => Some(KeyType::RsaPub),
            Family::Ed25519 => Some(KeyType::Ed25519Pub),
        }
    }

    /// Type de la moitié privée (`None` pour les types symétriques).
    #[must_use]
    pub const fn private_type(self) -> Option<KeyType> {
        match self.family() {
            Family::Symmetric => None,
            Family::Dsa => Some(KeyType::DsaPriv),
            Family::Rsa => Some(KeyType::RsaPriv),
            Family::Ed25519 => Some(KeyType::Ed25519Priv),
        }
    }

    pub(crate) const fn family(self) -> Family {
        match self {
            KeyType::Aes | KeyType::HmacSha1 => Family::Symmetric,
            KeyType::DsaPriv | KeyType::DsaPub => Family::Dsa,
            KeyType::RsaPriv | KeyType::RsaPub => Family::Rsa,
            KeyType::Ed25519Priv | KeyType::Ed25519Pub => Family::Ed25519,
        }
    }
}

impl std::fmt::Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
