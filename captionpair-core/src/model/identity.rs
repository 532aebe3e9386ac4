//! `src/model/identity.rs`
//!
//! Short opaque identifiers derived from a base name. Used to correlate UI
//! cells and pending async responses with their `MatchTable` entry.

use std::{fmt, num::ParseIntError, str::FromStr};

/// Dense, non-cryptographic identifier of a base name.
///
/// Rendered as a non-negative decimal string. Collisions are possible and
/// are not defended against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileHash(u32);

impl FileHash {
    /// Hash a base name.
    ///
    /// Classic `h * 31 + c` string hash over UTF-16 code units with 32-bit
    /// wrapping, folded to its absolute value.
    #[must_use]
    pub fn of(base_name: &str) -> Self {
        let hash = base_name.encode_utf16().fold(0_i32, |h, unit| {
            h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
        });

        Self(hash.unsigned_abs())
    }

    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileHash {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Self)
    }
}
