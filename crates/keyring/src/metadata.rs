//! # Métadonnées d'un jeu de clés
//!
//! Schéma JSON identique à celui d'un magasin réel : `name`, `purpose`, `type`, `versions`
//! (descripteurs `versionNumber`/`status`/`exportable`) et `encrypted`.

use serde::{Deserialize, Serialize};
use trousseau_core::{IntoTrousseauError, TrousseauResult, Version};
use trousseau_crypto::KeyType;

/// Usage cryptographique déclaré d'un jeu de clés.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyPurpose {
    /// Chiffrement et déchiffrement
    DecryptAndEncrypt,
    /// Chiffrement seul
    Encrypt,
    /// Signature et vérification
    SignAndVerify,
    /// Vérification seule
    Verify,
}

/// Étape du cycle de vie d'une version de clé.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyStatus {
    /// Version principale
    Primary,
    /// Version active
    Active,
    /// Version inactive
    Inactive,
    /// Version en attente de révocation
    ScheduledForRevocation,
}

/// Descripteur d'une version déclarée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyVersion {
    /// Numéro de version
    pub version_number: Version,
    /// Statut
    pub status: KeyStatus,
    /// Exportable hors du magasin
    pub exportable: bool,
}

impl KeyVersion {
    /// Construit un descripteur.
    #[must_use]
    pub fn new(version_number: Version, status: KeyStatus, exportable: bool) -> Self {
        Self {
            version_number,
            status,
            exportable,
        }
    }
}

/// Résultat d'un ajout de version dans les métadonnées.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionInsertion {
    /// Descripteur ajouté
    Added,
    /// Un descripteur existait déjà pour ce numéro ; rien n'a changé
    AlreadyPresent,
}

impl VersionInsertion {
    /// Vrai si le descripteur a été ajouté.
    #[must_use]
    pub fn is_added(self) -> bool {
        self == VersionInsertion::Added
    }
}

/// Métadonnées d'un jeu de clés.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    name: String,
    purpose: KeyPurpose,
    #[serde(rename = "type")]
    key_type: KeyType,
    #[serde(default)]
    versions: Vec<KeyVersion>,
    #[serde(default)]
    encrypted: bool,
}

impl KeyMetadata {
    /// Métadonnées vides (aucune version déclarée).
    pub fn new(name: impl Into<String>, purpose: KeyPurpose, key_type: KeyType) -> Self {
        Self {
            name: name.into(),
            purpose,
            key_type,
            versions: Vec::new(),
            encrypted: false,
        }
    }

    /// Nom du jeu de clés.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Usage déclaré.
    #[must_use]
    pub fn purpose(&self) -> KeyPurpose {
        self.purpose
    }

    /// Type de clé.
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Indique si les clés sont stockées chiffrées.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Marque les clés comme chiffrées (ou non).
    pub fn set_encrypted(&mut self, encrypted: bool) {
        self.encrypted = encrypted;
    }

    /// Descripteurs, dans l'ordre d'ajout.
    #[must_use]
    pub fn versions(&self) -> &[KeyVersion] {
        &self.versions
    }

    /// Ajoute un descripteur, sauf si ce numéro est déjà déclaré.
    ///
    /// Aucune règle de statut n'est appliquée : plusieurs versions `Primary` peuvent coexister.
    pub fn add_version(&mut self, version: KeyVersion) -> VersionInsertion {
        if self.version(version.version_number).is_some() {
            return VersionInsertion::AlreadyPresent;
        }
        self.versions.push(version);
        VersionInsertion::Added
    }

    /// Descripteur de `version_number`.
    #[must_use]
    pub fn version(&self, version_number: Version) -> Option<&KeyVersion> {
        self.versions
            .iter()
            .find(|v| v.version_number == version_number)
    }

    /// Retire le descripteur de `version_number` et le renvoie.
    pub fn remove_version(&mut self, version_number: Version) -> Option<KeyVersion> {
        let idx = self
            .versions
            .iter()
            .position(|v| v.version_number == version_number)?;
        Some(self.versions.remove(idx))
    }

    /// Première version marquée `Primary`.
    #[must_use]
    pub fn primary_version(&self) -> Option<&KeyVersion> {
        self.versions
            .iter()
            .find(|v| v.status == KeyStatus::Primary)
    }

    /// Sérialise en JSON.
    ///
    /// # Errors
    /// Échec si l'encodeur JSON échoue.
    pub fn to_json(&self) -> TrousseauResult<String> {
        serde_json::to_string(self).serialization()
    }

    /// Lit des métadonnées JSON.
    ///
    /// # Errors
    /// Échec si le texte n'est pas conforme au schéma.
    pub fn from_json(text: &str) -> TrousseauResult<Self> {
        serde_json::from_str(text).serialization()
    }
}
