use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::warn;

use crate::algorithm::{normalize_name, Algorithm};
use crate::{crc, sums};

/// A checksum implementation registered at runtime.
///
/// `output_len` must not depend on input and must be cheap: frame extraction
/// queries it on every reconfiguration without computing anything.
pub trait Checksummer: Send + Sync {
    /// Length of the produced tail in bytes.
    fn output_len(&self) -> usize;

    /// Seed used when the caller does not pass one.
    fn default_seed(&self) -> u32 {
        0
    }

    /// Compute the tail for `data`. Must return exactly `output_len()` bytes.
    fn compute(&self, data: &[u8], seed: u32) -> Vec<u8>;
}

/// Name-keyed checksum registry.
///
/// Built-in algorithms are always present; [`register`](Self::register) adds
/// named external ones. The registry holds no per-call state, so one instance
/// can be shared across extractors behind an `Arc`.
#[derive(Clone, Default)]
pub struct ChecksumRegistry {
    external: HashMap<String, Arc<dyn Checksummer>>,
}

impl fmt::Debug for ChecksumRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.external.keys().collect();
        names.sort();
        f.debug_struct("ChecksumRegistry")
            .field("external", &names)
            .finish()
    }
}

impl ChecksumRegistry {
    /// Create a registry with only the built-in algorithms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an external algorithm under `name`.
    ///
    /// Returns `false` (and registers nothing) when `name` collides with a
    /// built-in algorithm. Re-registering an external name replaces it.
    pub fn register(&mut self, name: &str, checksummer: Arc<dyn Checksummer>) -> bool {
        if Algorithm::from_name(name).is_some() {
            return false;
        }
        self.external.insert(normalize_name(name), checksummer);
        true
    }

    /// Look up `name` without side effects.
    pub fn lookup(&self, name: &str) -> Option<Algorithm> {
        if let Some(algorithm) = Algorithm::from_name(name) {
            return Some(algorithm);
        }
        let key = normalize_name(name);
        self.external
            .contains_key(&key)
            .then_some(Algorithm::External(key))
    }

    /// Resolve `name`, falling back to [`Algorithm::None`] with a warning when
    /// it is not registered.
    pub fn resolve(&self, name: &str) -> Algorithm {
        match self.lookup(name) {
            Some(algorithm) => algorithm,
            None => {
                warn!(
                    algorithm = name,
                    "unknown checksum algorithm; integrity checks disabled"
                );
                Algorithm::None
            }
        }
    }

    /// Tail length for `algorithm`. Never runs the compute path.
    pub fn length_of(&self, algorithm: &Algorithm) -> usize {
        match algorithm {
            Algorithm::External(name) => self.external.get(name).map_or(0, |c| c.output_len()),
            builtin => builtin.builtin_len().unwrap_or(0),
        }
    }

    /// Seed applied when callers pass `None`.
    pub fn default_seed(&self, algorithm: &Algorithm) -> u32 {
        match algorithm {
            Algorithm::External(name) => self.external.get(name).map_or(0, |c| c.default_seed()),
            builtin => builtin.default_seed(),
        }
    }

    /// Compute the integrity tail of `data`.
    ///
    /// `seed` is truncated to the register width of the algorithm; Fletcher
    /// and SHA-256 ignore it.
    pub fn checksum(&self, algorithm: &Algorithm, data: &[u8], seed: Option<u32>) -> Vec<u8> {
        let seed = seed.unwrap_or_else(|| self.default_seed(algorithm));
        match algorithm {
            Algorithm::None => Vec::new(),
            Algorithm::Sum => vec![sums::sum8(data, seed as u8)],
            Algorithm::Xor => vec![sums::xor8(data, seed as u8)],
            Algorithm::Crc8 => vec![crc::crc8(data, seed as u8)],
            Algorithm::Crc16 => crc::crc16(data, seed as u16).to_le_bytes().to_vec(),
            Algorithm::Crc32 => crc::crc32(data, seed).to_le_bytes().to_vec(),
            Algorithm::Fletcher16 => sums::fletcher16(data).to_vec(),
            Algorithm::Fletcher32 => sums::fletcher32(data).to_vec(),
            #[cfg(feature = "digest")]
            Algorithm::Sha256 => crate::digest::sha256(data),
            Algorithm::External(name) => match self.external.get(name) {
                Some(checksummer) => checksummer.compute(data, seed),
                None => {
                    warn!(algorithm = %name, "external checksum algorithm not registered");
                    Vec::new()
                }
            },
        }
    }

    /// True when `expected` equals the computed tail. Always true for
    /// zero-length algorithms.
    pub fn validate(
        &self,
        algorithm: &Algorithm,
        data: &[u8],
        expected: &[u8],
        seed: Option<u32>,
    ) -> bool {
        if self.length_of(algorithm) == 0 {
            return true;
        }
        self.checksum(algorithm, data, seed) == expected
    }

    /// Built-in names followed by registered external names (sorted).
    pub fn supported_algorithms(&self) -> Vec<String> {
        let mut external: Vec<String> = self.external.keys().cloned().collect();
        external.sort();
        Algorithm::BUILTIN
            .iter()
            .map(|a| a.name().to_string())
            .chain(external)
            .collect()
    }

    /// True when `name` resolves without falling back.
    pub fn is_supported(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

fn default_registry() -> &'static ChecksumRegistry {
    static DEFAULT: OnceLock<ChecksumRegistry> = OnceLock::new();
    DEFAULT.get_or_init(ChecksumRegistry::new)
}

/// Compute a built-in checksum by name with the default seed.
pub fn checksum(name: &str, data: &[u8]) -> Vec<u8> {
    let registry = default_registry();
    registry.checksum(&registry.resolve(name), data, None)
}

/// Validate a built-in checksum by name with the default seed.
pub fn validate(name: &str, data: &[u8], expected: &[u8]) -> bool {
    let registry = default_registry();
    registry.validate(&registry.resolve(name), data, expected, None)
}

/// Tail length of a built-in algorithm by name (0 when unknown).
pub fn length_of(name: &str) -> usize {
    let registry = default_registry();
    registry.length_of(&registry.resolve(name))
}
