//! # Registre de clés versionnées
//!
//! Double de test d'un magasin de clés : deux tables (privée et publique) indexées par numéro de
//! version, les métadonnées du jeu de clés et, optionnellement, des métadonnées d'export public.
//!
//! Les tables et les métadonnées ne sont **pas** synchronisées automatiquement. Seuls
//! [`VersionedKeyRegistry::add_key`] et [`VersionedKeyRegistry::add_key_with_size`] touchent les
//! deux. En particulier [`VersionedKeyRegistry::remove_key`] laisse le descripteur de version en
//! place, ce qui permet de construire des états incohérents pour tester les chemins d'erreur.

use crate::metadata::{KeyMetadata, KeyPurpose, KeyStatus, KeyVersion, VersionInsertion};
use crate::KeyReader;
use std::collections::HashMap;
use tracing::{debug, warn};
use trousseau_core::{TrousseauError, TrousseauResult, Version};
use trousseau_crypto::{FactoryConfig, KeyFactory, KeyMaterial, KeyType, RandomKeyFactory};

/// Trousseau en mémoire, versionné et mutable.
#[derive(Debug)]
pub struct VersionedKeyRegistry<F: KeyFactory = RandomKeyFactory> {
    keys: HashMap<Version, KeyMaterial>,
    public_keys: HashMap<Version, KeyMaterial>,
    kmd: KeyMetadata,
    public_kmd: Option<KeyMetadata>,
    factory: F,
}

impl VersionedKeyRegistry {
    /// Registre vide, fabrique alimentée par l'entropie du système.
    pub fn new(name: impl Into<String>, purpose: KeyPurpose, key_type: KeyType) -> Self {
        Self::with_factory(name, purpose, key_type, RandomKeyFactory::new())
    }

    /// Registre vide dont la fabrique suit `config`.
    pub fn with_config(
        name: impl Into<String>,
        purpose: KeyPurpose,
        key_type: KeyType,
        config: &FactoryConfig,
    ) -> Self {
        Self::with_factory(name, purpose, key_type, RandomKeyFactory::from_config(config))
    }
}

impl<F: KeyFactory> VersionedKeyRegistry<F> {
    /// Registre vide utilisant une fabrique fournie.
    pub fn with_factory(
        name: impl Into<String>,
        purpose: KeyPurpose,
        key_type: KeyType,
        factory: F,
    ) -> Self {
        Self {
            keys: HashMap::new(),
            public_keys: HashMap::new(),
            kmd: KeyMetadata::new(name, purpose, key_type),
            public_kmd: None,
            factory,
        }
    }

    /// Nom du jeu de clés.
    #[must_use]
    pub fn name(&self) -> &str {
        self.kmd.name()
    }

    /// Usage déclaré.
    #[must_use]
    pub fn purpose(&self) -> KeyPurpose {
        self.kmd.purpose()
    }

    /// Type de clé.
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        self.kmd.key_type()
    }

    /// Métadonnées courantes.
    #[must_use]
    pub fn key_metadata(&self) -> &KeyMetadata {
        &self.kmd
    }

    /// Métadonnées d'export public, si un export a été simulé.
    #[must_use]
    pub fn public_key_metadata(&self) -> Option<&KeyMetadata> {
        self.public_kmd.as_ref()
    }

    /// Remplace les métadonnées sans les confronter aux tables de clés.
    pub fn set_metadata(&mut self, kmd: KeyMetadata) {
        debug!(name = kmd.name(), "métadonnées remplacées");
        self.kmd = kmd;
    }

    /// Simule un export public en fixant ses métadonnées.
    pub fn set_public_key_metadata(&mut self, public_kmd: KeyMetadata) {
        debug!(name = public_kmd.name(), "métadonnées publiques fixées");
        self.public_kmd = Some(public_kmd);
    }

    /// Insère ou écrase une clé privée. Les métadonnées ne sont pas modifiées.
    pub fn set_key(&mut self, version: Version, key: KeyMaterial) {
        debug!(version, key_type = %key.key_type(), "clé enregistrée");
        self.keys.insert(version, key);
    }

    /// Insère ou écrase une clé publique. Les métadonnées ne sont pas modifiées.
    pub fn set_public_key(&mut self, version: Version, key: KeyMaterial) {
        debug!(version, key_type = %key.key_type(), "clé publique enregistrée");
        self.public_keys.insert(version, key);
    }

    /// Retire la clé privée de `version` et la renvoie.
    ///
    /// Le descripteur de version reste dans les métadonnées et la table publique n'est pas
    /// touchée : [`Self::status`] continue donc de répondre pour cette version.
    pub fn remove_key(&mut self, version: Version) -> Option<KeyMaterial> {
        let removed = self.keys.remove(&version);
        debug!(version, removed = removed.is_some(), "clé retirée");
        removed
    }

    /// Génère une clé à la taille par défaut du type, l'enregistre à `version` (en écrasant
    /// l'éventuelle clé existante) puis déclare `version` dans les métadonnées.
    ///
    /// La clé est écrasée même si le descripteur existait déjà ; le retour vaut alors
    /// [`VersionInsertion::AlreadyPresent`] et le statut d'origine est conservé.
    ///
    /// # Errors
    /// Échec si la fabrique ne peut pas générer la clé.
    pub fn add_key(
        &mut self,
        version: Version,
        status: KeyStatus,
    ) -> TrousseauResult<VersionInsertion> {
        let size = self.key_type().default_size();
        self.add_key_with_size(version, status, size)
    }

    /// Comme [`Self::add_key`], avec une taille explicite transmise à la fabrique.
    ///
    /// # Errors
    /// Échec si `size` n'est pas acceptée par le type du registre.
    pub fn add_key_with_size(
        &mut self,
        version: Version,
        status: KeyStatus,
        size: u32,
    ) -> TrousseauResult<VersionInsertion> {
        let key = self.factory.generate(self.kmd.key_type(), size)?;
        self.keys.insert(version, key);
        let inserted = self
            .kmd
            .add_version(KeyVersion::new(version, status, false));
        debug!(version, ?status, size, ?inserted, "clé générée");
        Ok(inserted)
    }

    /// Statut déclaré pour `version`.
    ///
    /// # Errors
    /// `VersionNotDeclared` si les métadonnées n'ont pas de descripteur pour `version`, même si
    /// une clé est présente dans la table.
    pub fn status(&self, version: Version) -> TrousseauResult<KeyStatus> {
        match self.kmd.version(version) {
            Some(v) => Ok(v.status),
            None => {
                warn!(version, "version absente des métadonnées");
                Err(TrousseauError::VersionNotDeclared { version })
            }
        }
    }

    /// Vrai si la table privée contient `version` (indépendant des métadonnées).
    #[must_use]
    pub fn exists_version(&self, version: Version) -> bool {
        self.keys.contains_key(&version)
    }

    /// Vrai si des métadonnées d'export public ont été fixées.
    #[must_use]
    pub fn exported_public_key_set(&self) -> bool {
        self.public_kmd.is_some()
    }

    /// Vrai si les deux tables ont une entrée pour `version` et que la clé publique est la
    /// projection de la clé privée. Toujours faux pour un type symétrique.
    #[must_use]
    pub fn has_public_key(&self, version: Version) -> bool {
        let private = self.keys.get(&version).and_then(KeyMaterial::as_private);
        let public = self.public_keys.get(&version).and_then(KeyMaterial::as_public);
        matches!((private, public), (Some(private), Some(public)) if private.public() == public)
    }

    /// Nombre de clés privées.
    #[must_use]
    pub fn num_keys(&self) -> usize {
        self.keys.len()
    }

    /// Taille (bits) de la clé stockée à `version`.
    ///
    /// # Errors
    /// `KeyNotFound` si la table privée n'a pas d'entrée pour `version`.
    pub fn key_size(&self, version: Version) -> TrousseauResult<u32> {
        self.stored(&self.keys, version).map(KeyMaterial::size)
    }

    /// JSON de la clé publique stockée à `version`.
    ///
    /// # Errors
    /// `KeyNotFound` si la table publique n'a pas d'entrée pour `version`.
    pub fn public_key(&self, version: Version) -> TrousseauResult<String> {
        self.stored(&self.public_keys, version)?.to_json()
    }

    fn stored<'a>(
        &self,
        table: &'a HashMap<Version, KeyMaterial>,
        version: Version,
    ) -> TrousseauResult<&'a KeyMaterial> {
        table.get(&version).ok_or_else(|| {
            warn!(version, name = self.kmd.name(), "clé introuvable");
            TrousseauError::KeyNotFound { version }
        })
    }
}

impl<F: KeyFactory> KeyReader for VersionedKeyRegistry<F> {
    fn key(&self, version: Version) -> TrousseauResult<String> {
        self.stored(&self.keys, version)?.to_json()
    }

    fn metadata(&self) -> TrousseauResult<String> {
        self.kmd.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trousseau_crypto::{PrivateKey, SymmetricKey};

    fn rsa_registry() -> VersionedKeyRegistry {
        VersionedKeyRegistry::with_config(
            "test",
            KeyPurpose::SignAndVerify,
            KeyType::RsaPriv,
            &FactoryConfig::default().with_seed(7),
        )
    }

    #[test]
    fn test_accessors() {
        let registry = rsa_registry();
        assert_eq!(registry.name(), "test");
        assert_eq!(registry.purpose(), KeyPurpose::SignAndVerify);
        assert_eq!(registry.key_type(), KeyType::RsaPriv);
        assert_eq!(registry.num_keys(), 0);
        assert!(!registry.exported_public_key_set());
        assert!(registry.public_key_metadata().is_none());
    }

    #[test]
    fn test_set_key_does_not_touch_metadata() {
        let mut registry =
            VersionedKeyRegistry::new("sym", KeyPurpose::DecryptAndEncrypt, KeyType::Aes);
        let key: KeyMaterial = SymmetricKey::from_bytes(KeyType::Aes, vec![1; 16])
            .unwrap()
            .into();
        registry.set_key(4, key.clone());
        assert!(registry.exists_version(4));
        assert_eq!(registry.key(4).unwrap(), key.to_json().unwrap());
        assert!(matches!(
            registry.status(4),
            Err(TrousseauError::VersionNotDeclared { version: 4 })
        ));
    }

    #[test]
    fn test_set_key_overwrites() {
        let mut registry = rsa_registry();
        let first: KeyMaterial = PrivateKey::from_secret(KeyType::RsaPriv, vec![1; 64])
            .unwrap()
            .into();
        let second: KeyMaterial = PrivateKey::from_secret(KeyType::RsaPriv, vec![2; 128])
            .unwrap()
            .into();
        registry.set_key(1, first);
        registry.set_key(1, second.clone());
        assert_eq!(registry.num_keys(), 1);
        assert_eq!(registry.key_size(1).unwrap(), 1024);
        assert_eq!(registry.key(1).unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn test_add_key_on_declared_version_overwrites_key() {
        let mut registry = rsa_registry();
        assert_eq!(
            registry.add_key_with_size(1, KeyStatus::Primary, 512).unwrap(),
            VersionInsertion::Added
        );
        let before = registry.key(1).unwrap();
        assert_eq!(
            registry.add_key_with_size(1, KeyStatus::Inactive, 768).unwrap(),
            VersionInsertion::AlreadyPresent
        );
        assert_ne!(registry.key(1).unwrap(), before);
        assert_eq!(registry.key_size(1).unwrap(), 768);
        assert_eq!(registry.status(1).unwrap(), KeyStatus::Primary);
        assert_eq!(registry.key_metadata().versions().len(), 1);
    }

    #[test]
    fn test_add_key_unsupported_size_leaves_state_untouched() {
        let mut registry = rsa_registry();
        let err = registry
            .add_key_with_size(1, KeyStatus::Active, 1000)
            .unwrap_err();
        assert!(matches!(
            err,
            TrousseauError::UnsupportedKeySize { size: 1000, .. }
        ));
        assert!(!registry.exists_version(1));
        assert!(registry.key_metadata().version(1).is_none());
    }

    #[test]
    fn test_key_not_found() {
        let registry = rsa_registry();
        assert!(matches!(
            registry.key(9),
            Err(TrousseauError::KeyNotFound { version: 9 })
        ));
        assert!(matches!(
            registry.key_size(9),
            Err(TrousseauError::KeyNotFound { version: 9 })
        ));
        assert!(matches!(
            registry.public_key(9),
            Err(TrousseauError::KeyNotFound { version: 9 })
        ));
    }

    #[test]
    fn test_has_public_key() {
        let mut registry = rsa_registry();
        let _ = registry.add_key_with_size(1, KeyStatus::Primary, 512).unwrap();
        assert!(!registry.has_public_key(1));

        let private = PrivateKey::from_secret(KeyType::RsaPriv, vec![8; 64]).unwrap();
        registry.set_key(2, private.clone().into());
        registry.set_public_key(2, private.public().clone().into());
        assert!(registry.has_public_key(2));
        assert_eq!(
            registry.public_key(2).unwrap(),
            KeyMaterial::from(private.public().clone()).to_json().unwrap()
        );

        // Projection d'une autre clé privée
        registry.set_public_key(1, private.public().clone().into());
        assert!(!registry.has_public_key(1));

        // Clé privée rangée dans la table publique
        registry.set_public_key(2, private.into());
        assert!(!registry.has_public_key(2));
    }

    #[test]
    fn test_has_public_key_symmetric_is_false() {
        let mut registry =
            VersionedKeyRegistry::new("hmac", KeyPurpose::SignAndVerify, KeyType::HmacSha1);
        let _ = registry.add_key(1, KeyStatus::Primary).unwrap();
        let key: KeyMaterial = SymmetricKey::from_bytes(KeyType::HmacSha1, vec![0; 32])
            .unwrap()
            .into();
        registry.set_key(1, key.clone());
        registry.set_public_key(1, key);
        assert!(!registry.has_public_key(1));
    }

    #[test]
    fn test_remove_key_keeps_public_table() {
        let mut registry = rsa_registry();
        let private = PrivateKey::from_secret(KeyType::RsaPriv, vec![8; 64]).unwrap();
        registry.set_key(1, private.clone().into());
        registry.set_public_key(1, private.public().clone().into());
        assert!(registry.remove_key(1).is_some());
        assert!(registry.remove_key(1).is_none());
        assert!(registry.public_key(1).is_ok());
        assert!(!registry.has_public_key(1));
    }

    #[test]
    fn test_metadata_replacement_is_unchecked() {
        let mut registry = rsa_registry();
        let _ = registry.add_key_with_size(1, KeyStatus::Primary, 512).unwrap();
        registry.set_metadata(KeyMetadata::new("other", KeyPurpose::Verify, KeyType::DsaPub));
        assert_eq!(registry.name(), "other");
        assert_eq!(registry.key_type(), KeyType::DsaPub);
        assert!(registry.exists_version(1));
        assert!(registry.status(1).is_err());
        assert_eq!(
            KeyMetadata::from_json(&registry.metadata().unwrap()).unwrap(),
            *registry.key_metadata()
        );
    }
}
