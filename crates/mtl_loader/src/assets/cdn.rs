//! Content-hash to CDN shard routing
//!
//! Texture binaries are addressed by a 32-character content hash and spread
//! over eight hosts `t0`..`t7`. The host is picked by folding the hash's
//! character codes with XOR, so every client agrees on the shard without any
//! lookup table.

/// Number of shard hosts
pub const SHARD_COUNT: u32 = 8;

/// Characters of the hash that take part in routing
pub const HASH_LENGTH: usize = 32;

const SEED: u32 = 31;

/// Maps content hashes to shard host URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashSharder {
    domain: String,
}

impl HashSharder {
    /// Create a sharder for the given CDN domain (e.g. `rbxcdn.com`)
    pub fn new(domain: impl Into<String>) -> Self {
        Self { domain: domain.into() }
    }

    /// Shard index in `0..SHARD_COUNT` for a hash
    ///
    /// Hashes are expected to be fully provisioned. A shorter hash is folded
    /// over the characters it has and logged, never rejected.
    pub fn shard_index(hash: &str) -> u32 {
        // Character codes are UTF-16 units
        let mut units = 0;
        let folded = hash
            .encode_utf16()
            .take(HASH_LENGTH)
            .inspect(|_| units += 1)
            .fold(SEED, |acc, unit| acc ^ u32::from(unit));

        if units < HASH_LENGTH {
            log::warn!("Content hash '{}' is shorter than {} characters", hash, HASH_LENGTH);
        }

        folded % SHARD_COUNT
    }

    /// Full URL of the binary behind `hash`
    pub fn url_for(&self, hash: &str) -> String {
        format!("https://t{}.{}/{}", Self::shard_index(hash), self.domain, hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_shard_index_matches_manual_fold() {
        let expected = HASH.bytes().fold(31u32, |acc, b| acc ^ u32::from(b)) % 8;
        assert_eq!(HashSharder::shard_index(HASH), expected);
    }

    #[test]
    fn test_known_shard() {
        // Every character repeated twice cancels out under XOR, leaving the seed.
        assert_eq!(HashSharder::shard_index(HASH), 31 % 8);
        assert_eq!(
            HashSharder::new("rbxcdn.com").url_for(HASH),
            format!("https://t7.rbxcdn.com/{}", HASH)
        );
    }

    #[test]
    fn test_deterministic_and_in_range() {
        let hashes = [
            "ffffffffffffffffffffffffffffffff",
            "a1b2c3d4e5f60718293a4b5c6d7e8f90",
            "00000000000000000000000000000001",
        ];
        for hash in hashes {
            let first = HashSharder::shard_index(hash);
            assert!(first < SHARD_COUNT);
            // Independent of call order
            HashSharder::shard_index(HASH);
            assert_eq!(HashSharder::shard_index(hash), first);
        }
    }

    #[test]
    fn test_only_first_32_characters_count() {
        let long = format!("{}trailing-data", HASH);
        assert_eq!(HashSharder::shard_index(&long), HashSharder::shard_index(HASH));
        // The URL still carries the whole value
        assert!(HashSharder::new("cdn.test").url_for(&long).ends_with("trailing-data"));
    }

    #[test]
    fn test_single_character_flip() {
        // '0' (0x30) -> '1' (0x31) flips the lowest bit of the accumulator
        let flipped = format!("1{}", &HASH[1..]);
        assert_eq!(HashSharder::shard_index(&flipped), (31 ^ 1) % 8);
    }

    #[test]
    fn test_short_hash_does_not_panic() {
        assert!(HashSharder::shard_index("abc") < SHARD_COUNT);
    }
}
