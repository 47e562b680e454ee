#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Trousseau versionné (double de test)
//!
//! **Documentation (FR)** : Ce crate remplace un magasin de clés persistant pendant les tests.
//! Tout est en mémoire : une table de clés privées et une table de clés publiques indexées par
//! numéro de version, les métadonnées du jeu de clés et d'éventuelles métadonnées d'export
//! public. Le code sous test ne voit que le trait [`KeyReader`] (DIP) ; le test pilote le
//! [`VersionedKeyRegistry`] directement pour construire l'état voulu, y compris des états
//! incohérents.

use trousseau_core::{TrousseauResult, Version};

pub mod metadata;
pub mod registry;

pub use metadata::{KeyMetadata, KeyPurpose, KeyStatus, KeyVersion, VersionInsertion};
pub use registry::VersionedKeyRegistry;

/// Lecture d'un magasin de clés, telle que la voit la bibliothèque sous test.
pub trait KeyReader {
    /// Clé sérialisée pour `version`.
    ///
    /// # Errors
    /// `KeyNotFound` si aucune clé n'existe pour cette version.
    fn key(&self, version: Version) -> TrousseauResult<String>;

    /// Métadonnées sérialisées du jeu de clés.
    ///
    /// # Errors
    /// Échec si la sérialisation échoue.
    fn metadata(&self) -> TrousseauResult<String>;
}
