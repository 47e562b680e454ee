//! # Fabrique de clés
//!
//! La taille de génération est un paramètre explicite de [`KeyFactory::generate`] : aucun état
//! partagé n'est modifié pendant la génération.

use crate::key_type::KeyType;
use crate::material::{KeyMaterial, PrivateKey, SymmetricKey};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::debug;
use trousseau_core::{TrousseauError, TrousseauResult};

/// Variable d'environnement lue par [`FactoryConfig::from_env`].
pub const SEED_ENV_VAR: &str = "TROUSSEAU_SEED";

/// Génère du matériel de clé pour un type et une taille donnés.
pub trait KeyFactory {
    /// Génère une clé de `size` bits.
    ///
    /// # Errors
    /// Échec si `size` n'est pas acceptée par `key_type`.
    fn generate(&mut self, key_type: KeyType, size: u32) -> TrousseauResult<KeyMaterial>;

    /// Génère une clé à la taille par défaut du type.
    ///
    /// # Errors
    /// Voir [`KeyFactory::generate`].
    fn generate_default(&mut self, key_type: KeyType) -> TrousseauResult<KeyMaterial> {
        self.generate(key_type, key_type.default_size())
    }
}

/// Configuration de la fabrique par défaut.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactoryConfig {
    /// Graine du générateur ; `None` tire l'entropie du système.
    pub seed: Option<u64>,
}

impl FactoryConfig {
    /// Fixe la graine (matériel reproductible d'un run à l'autre).
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Lit la configuration depuis `TROUSSEAU_SEED`.
    ///
    /// # Errors
    /// Échec si la variable est présente mais n'est pas un entier `u64`.
    pub fn from_env() -> TrousseauResult<Self> {
        parse_seed(std::env::var(SEED_ENV_VAR).ok().as_deref())
    }
}

fn parse_seed(value: Option<&str>) -> TrousseauResult<FactoryConfig> {
    let seed = match value.map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<u64>().map_err(|e| {
            TrousseauError::Config(format!("{SEED_ENV_VAR}={raw:?}: {e}"))
        })?),
    };
    Ok(FactoryConfig { seed })
}

/// Fabrique par défaut : octets aléatoires tirés d'un `StdRng`.
pub struct RandomKeyFactory {
    rng: StdRng,
}

impl RandomKeyFactory {
    /// Fabrique alimentée par l'entropie du système.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Fabrique déterministe.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Construit la fabrique décrite par `config`.
    #[must_use]
    pub fn from_config(config: &FactoryConfig) -> Self {
        config.seed.map_or_else(Self::new, Self::seeded)
    }

    fn random_bytes(&mut self, size: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; (size / 8) as usize];
        self.rng.fill_bytes(&mut bytes);
        bytes
    }
}

impl Default for RandomKeyFactory {
    fn default() -> Self {
        Self::new()
    }
}

// Pas d'état du générateur dans Debug
impl std::fmt::Debug for RandomKeyFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RandomKeyFactory([REDACTED])")
    }
}

impl KeyFactory for RandomKeyFactory {
    fn generate(&mut self, key_type: KeyType, size: u32) -> TrousseauResult<KeyMaterial> {
        if !key_type.is_acceptable_size(size) {
            return Err(TrousseauError::UnsupportedKeySize {
                key_type: key_type.to_string(),
                size,
            });
        }
        debug!(%key_type, size, "génération de clé");
        let bytes = self.random_bytes(size);
        match key_type.private_type() {
            None => Ok(SymmetricKey::from_bytes(key_type, bytes)?.into()),
            Some(_) if key_type.is_private() => {
                Ok(PrivateKey::from_secret(key_type, bytes)?.into())
            }
            // Une clé publique seule n'existe pas : on génère la paire et on garde la projection.
            Some(private_type) => {
                let private = PrivateKey::from_secret(private_type, bytes)?;
                Ok(private.public().clone().into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_sizes() {
        let mut factory = RandomKeyFactory::new();
        for t in KeyType::ALL {
            let key = factory.generate_default(t).unwrap();
            assert_eq!(key.key_type(), t);
            assert_eq!(key.size(), t.default_size());
        }
    }

    #[test]
    fn test_generate_every_accepted_size() {
        let mut factory = RandomKeyFactory::seeded(1);
        for size in KeyType::RsaPriv.accepted_sizes() {
            let key = factory.generate(KeyType::RsaPriv, *size).unwrap();
            assert_eq!(key.size(), *size);
            assert_eq!(key.as_private().unwrap().public().size(), *size);
        }
    }

    #[test]
    fn test_generate_rejects_unsupported_size() {
        let mut factory = RandomKeyFactory::new();
        let err = factory.generate(KeyType::Aes, 100).unwrap_err();
        assert!(matches!(
            err,
            TrousseauError::UnsupportedKeySize { size: 100, .. }
        ));
    }

    #[test]
    fn test_public_type_yields_public_material() {
        let mut factory = RandomKeyFactory::new();
        let key = factory.generate_default(KeyType::Ed25519Pub).unwrap();
        assert!(key.as_public().is_some());
        assert_eq!(key.size(), 256);
    }

    #[test]
    fn test_seeded_factory_is_reproducible() {
        let mut a = RandomKeyFactory::from_config(&FactoryConfig::default().with_seed(99));
        let mut b = RandomKeyFactory::seeded(99);
        let mut c = RandomKeyFactory::seeded(100);
        let ka = a.generate_default(KeyType::HmacSha1).unwrap();
        let kb = b.generate_default(KeyType::HmacSha1).unwrap();
        let kc = c.generate_default(KeyType::HmacSha1).unwrap();
        assert_eq!(ka, kb);
        assert_ne!(ka, kc);
    }

    #[test]
    fn test_parse_seed() {
        assert_eq!(parse_seed(None).unwrap(), FactoryConfig::default());
        assert_eq!(parse_seed(Some("  ")).unwrap(), FactoryConfig::default());
        assert_eq!(parse_seed(Some("42")).unwrap().seed, Some(42));
        assert!(matches!(
            parse_seed(Some("abc")),
            Err(TrousseauError::Config(_))
        ));
    }

    #[test]
    fn test_factory_debug_is_redacted() {
        let factory = RandomKeyFactory::seeded(5);
        assert_eq!(format!("{factory:?}"), "RandomKeyFactory([REDACTED])");
    }
}
