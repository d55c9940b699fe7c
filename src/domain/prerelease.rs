//! Prerelease identifiers of the form `<word>.<number>`
//!
//! Examples: `beta.1`, `rc.12`, `alpha_test.3`. The word part is a run of
//! word characters (letters, digits, underscore); the number is a plain
//! non-negative integer.

use std::cmp::Ordering;
use std::fmt;

/// A parsed prerelease identifier such as `beta.2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreRelease {
    /// The identifier word (`beta`, `rc`, ...)
    pub identifier: String,
    /// The iteration number that follows the final `.`
    pub number: u64,
}

impl PreRelease {
    /// Create a new prerelease value
    pub fn new(identifier: impl Into<String>, number: u64) -> Self {
        PreRelease {
            identifier: identifier.into(),
            number,
        }
    }

    /// Parse `<word>.<number>`.
    ///
    /// Returns `None` when the text does not have that shape, e.g. `beta`,
    /// `beta.x` or `my-beta.1`.
    pub fn parse(text: &str) -> Option<Self> {
        let (identifier, number) = text.rsplit_once('.')?;

        let valid_word = !identifier.is_empty()
            && identifier
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_');
        let valid_number = !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
        if !valid_word || !valid_number {
            return None;
        }

        Some(PreRelease {
            identifier: identifier.to_string(),
            number: number.parse().ok()?,
        })
    }

    /// Next iteration of the same identifier (`beta.1` -> `beta.2`)
    ///
    /// `None` when the number is already `u64::MAX`.
    pub fn increment(&self) -> Option<Self> {
        Some(PreRelease {
            identifier: self.identifier.clone(),
            number: self.number.checked_add(1)?,
        })
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.identifier, self.number)
    }
}

/// Order two raw prerelease strings.
///
/// When both parse as `<word>.<number>` with the same word, the numbers are
/// compared numerically so that `beta.10` sorts after `beta.2`. Every other
/// case, including ties, falls back to plain string ordering.
pub fn compare_prerelease(a: &str, b: &str) -> Ordering {
    if let (Some(left), Some(right)) = (PreRelease::parse(a), PreRelease::parse(b)) {
        if left.identifier == right.identifier {
            let by_number = left.number.cmp(&right.number);
            if by_number != Ordering::Equal {
                return by_number;
            }
        }
    }

    a.cmp(b)
}
