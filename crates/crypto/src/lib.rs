#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Matériel de clé du trousseau
//!
//! **Documentation (FR)** : Ce crate décrit les types de clés (tailles acceptées, appariement
//! privé/public), le matériel de clé sous forme de variante étiquetée et la fabrique qui le
//! génère. Les consommateurs dépendent du trait [`KeyFactory`] (DIP) ; [`RandomKeyFactory`] est
//! l'implémentation par défaut, éventuellement déterministe via [`FactoryConfig`].

pub mod factory;
pub mod key_type;
pub mod material;

pub use factory::{FactoryConfig, KeyFactory, RandomKeyFactory, SEED_ENV_VAR};
pub use key_type::KeyType;
pub use material::{KeyMaterial, PrivateKey, PublicKey, SymmetricKey};
