use std::fmt;

/// A checksum algorithm.
///
/// The built-in set is closed; [`Algorithm::External`] names an algorithm
/// registered at runtime with [`crate::ChecksumRegistry::register`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// No integrity tail.
    #[default]
    None,
    /// 8-bit truncated additive sum.
    Sum,
    /// 8-bit XOR of all bytes.
    Xor,
    /// CRC-8, polynomial 0x07, MSB-first.
    Crc8,
    /// CRC-16/MODBUS (0xA001 reflected), little-endian output.
    Crc16,
    /// CRC-32/IEEE 802.3, little-endian output.
    Crc32,
    /// Fletcher-16, `[sum2, sum1]`.
    Fletcher16,
    /// Fletcher-32 over big-endian words.
    Fletcher32,
    /// SHA-256 digest.
    #[cfg(feature = "digest")]
    Sha256,
    /// Runtime-registered algorithm, keyed by normalized name.
    External(String),
}

impl Algorithm {
    /// All built-in algorithms, in display order.
    pub const BUILTIN: &'static [Algorithm] = &[
        Algorithm::None,
        Algorithm::Sum,
        Algorithm::Xor,
        Algorithm::Crc8,
        Algorithm::Crc16,
        Algorithm::Crc32,
        Algorithm::Fletcher16,
        Algorithm::Fletcher32,
        #[cfg(feature = "digest")]
        Algorithm::Sha256,
    ];

    /// Parse a built-in algorithm name.
    ///
    /// Matching is case-insensitive and ignores `-` and `_`, so `"CRC-16"`,
    /// `"crc_16"` and `"crc16"` are equivalent. The empty string is `none`.
    pub fn from_name(name: &str) -> Option<Self> {
        let algorithm = match normalize_name(name).as_str() {
            "" | "none" => Algorithm::None,
            "sum" => Algorithm::Sum,
            "xor" => Algorithm::Xor,
            "crc8" => Algorithm::Crc8,
            "crc16" => Algorithm::Crc16,
            "crc32" => Algorithm::Crc32,
            "fletcher16" => Algorithm::Fletcher16,
            "fletcher32" => Algorithm::Fletcher32,
            #[cfg(feature = "digest")]
            "sha256" => Algorithm::Sha256,
            _ => return None,
        };
        Some(algorithm)
    }

    /// Canonical name.
    pub fn name(&self) -> &str {
        match self {
            Algorithm::None => "none",
            Algorithm::Sum => "sum",
            Algorithm::Xor => "xor",
            Algorithm::Crc8 => "crc8",
            Algorithm::Crc16 => "crc16",
            Algorithm::Crc32 => "crc32",
            Algorithm::Fletcher16 => "fletcher16",
            Algorithm::Fletcher32 => "fletcher32",
            #[cfg(feature = "digest")]
            Algorithm::Sha256 => "sha256",
            Algorithm::External(name) => name,
        }
    }

    /// Output length for built-in algorithms. `None` for external ones, whose
    /// length is only known to the registry.
    pub fn builtin_len(&self) -> Option<usize> {
        let len = match self {
            Algorithm::None => 0,
            Algorithm::Sum | Algorithm::Xor | Algorithm::Crc8 => 1,
            Algorithm::Crc16 | Algorithm::Fletcher16 => 2,
            Algorithm::Crc32 | Algorithm::Fletcher32 => 4,
            #[cfg(feature = "digest")]
            Algorithm::Sha256 => 32,
            Algorithm::External(_) => return None,
        };
        Some(len)
    }

    /// Seed used when the caller does not supply one.
    pub fn default_seed(&self) -> u32 {
        match self {
            Algorithm::Crc16 => 0xFFFF,
            Algorithm::Crc32 => 0xFFFF_FFFF,
            _ => 0,
        }
    }

    /// True for [`Algorithm::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Algorithm::None)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalize an algorithm name: trim, lowercase, drop `-` and `_`.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spelling_variants() {
        assert_eq!(Algorithm::from_name("CRC-16"), Some(Algorithm::Crc16));
        assert_eq!(Algorithm::from_name("crc_32"), Some(Algorithm::Crc32));
        assert_eq!(Algorithm::from_name(" Xor "), Some(Algorithm::Xor));
        assert_eq!(Algorithm::from_name("Fletcher-16"), Some(Algorithm::Fletcher16));
        assert_eq!(Algorithm::from_name(""), Some(Algorithm::None));
        assert_eq!(Algorithm::from_name("none"), Some(Algorithm::None));
        assert_eq!(Algorithm::from_name("crc64"), None);
    }

    #[test]
    fn builtin_lengths() {
        assert_eq!(Algorithm::None.builtin_len(), Some(0));
        assert_eq!(Algorithm::Sum.builtin_len(), Some(1));
        assert_eq!(Algorithm::Xor.builtin_len(), Some(1));
        assert_eq!(Algorithm::Crc8.builtin_len(), Some(1));
        assert_eq!(Algorithm::Crc16.builtin_len(), Some(2));
        assert_eq!(Algorithm::Crc32.builtin_len(), Some(4));
        assert_eq!(Algorithm::Fletcher32.builtin_len(), Some(4));
        assert_eq!(Algorithm::External("x".into()).builtin_len(), None);
    }

    #[test]
    fn names_roundtrip_through_parser() {
        for algorithm in Algorithm::BUILTIN {
            assert_eq!(Algorithm::from_name(algorithm.name()).as_ref(), Some(algorithm));
        }
    }
}
