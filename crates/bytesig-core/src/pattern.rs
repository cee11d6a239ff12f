//! Pattern definitions and the byte-level matching primitive.
//!
//! A [`Pattern`] is a named byte signature with a per-byte wildcard mask and a
//! skip adjustment that converts a raw match position into the externally
//! meaningful address. A [`PatternSet`] is the immutable, validated collection
//! of patterns a single scan searches for.
//!
//! ## Signature notation
//!
//! Signatures are conventionally written as whitespace-separated hex bytes
//! with `??` marking wildcard positions:
//!
//! ```
//! use bytesig_core::Pattern;
//!
//! let pattern = Pattern::from_hex("GameStates", "48 8B ?? 05 ?? C3", 3)?;
//! assert_eq!(pattern.len(), 6);
//! # Ok::<(), bytesig_core::Error>(())
//! ```

use crate::error::{Error, Result};
use std::fmt;

/// A named byte signature with a wildcard mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    name: String,
    data: Vec<u8>,
    mask: Vec<bool>,
    bytes_to_skip: isize,
}

impl Pattern {
    /// Creates a pattern from raw data and mask.
    ///
    /// `mask[i] == true` means byte `i` must match exactly; `false` means
    /// "don't care". `bytes_to_skip` is added to a raw match position to
    /// produce the reported offset.
    pub fn new(
        name: impl Into<String>,
        data: Vec<u8>,
        mask: Vec<bool>,
        bytes_to_skip: isize,
    ) -> Result<Self> {
        let name = name.into();

        if data.len() != mask.len() {
            return Err(Error::MaskLengthMismatch {
                data_len: data.len(),
                mask_len: mask.len(),
                name,
            });
        }

        if data.is_empty() {
            return Err(Error::EmptyPattern { name });
        }

        Ok(Self {
            name,
            data,
            mask,
            bytes_to_skip,
        })
    }

    /// Parses a signature written as whitespace-separated hex bytes with
    /// `??` (or `?`) marking wildcard positions.
    pub fn from_hex(name: impl Into<String>, hex: &str, bytes_to_skip: isize) -> Result<Self> {
        let name = name.into();
        let mut data = Vec::new();
        let mut mask = Vec::new();

        for token in hex.split_whitespace() {
            if token == "??" || token == "?" {
                data.push(0);
                mask.push(false);
            } else {
                let byte = u8::from_str_radix(token, 16).map_err(|_| {
                    Error::pattern_parse(name.clone(), format!("invalid hex byte '{token}'"))
                })?;
                data.push(byte);
                mask.push(true);
            }
        }

        Self::new(name, data, mask, bytes_to_skip)
    }

    /// Returns the pattern name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the literal pattern bytes (wildcard positions hold zero)
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the wildcard mask
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Returns the skip adjustment applied to raw match positions
    pub fn bytes_to_skip(&self) -> isize {
        self.bytes_to_skip
    }

    /// Returns the pattern length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the pattern has no bytes (never constructible via
    /// [`Pattern::new`], which rejects empty data)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decides whether this pattern matches `buffer` at `position`.
    ///
    /// Only masked-true positions are compared; wildcard positions accept any
    /// byte. If fewer than `self.len()` bytes remain at `position`, the
    /// candidate is rejected without comparing anything.
    ///
    /// Comparison runs from both ends toward the middle so a mismatch near
    /// either edge terminates early; for odd lengths the middle byte is
    /// checked once up front.
    pub fn matches_at(&self, buffer: &[u8], position: usize) -> bool {
        let len = self.data.len();
        if buffer.len().saturating_sub(position) < len {
            return false;
        }

        let window = &buffer[position..position + len];

        if len % 2 == 1 {
            let mid = len / 2;
            if self.mask[mid] && window[mid] != self.data[mid] {
                return false;
            }
        }

        for l in 0..len / 2 {
            if self.mask[l] && window[l] != self.data[l] {
                return false;
            }

            let r = len - 1 - l;
            if self.mask[r] && window[r] != self.data[r] {
                return false;
            }
        }

        true
    }

    /// Renders the signature back into hex-with-wildcards notation
    pub fn to_hex_string(&self) -> String {
        self.data
            .iter()
            .zip(self.mask.iter())
            .map(|(byte, &fixed)| {
                if fixed {
                    format!("{byte:02X}")
                } else {
                    "??".to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.to_hex_string())
    }
}

/// An immutable, validated collection of patterns for one scan
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
    max_pattern_len: usize,
}

impl PatternSet {
    /// Creates a pattern set, rejecting duplicate names.
    pub fn new(patterns: Vec<Pattern>) -> Result<Self> {
        for (i, pattern) in patterns.iter().enumerate() {
            if patterns[..i].iter().any(|p| p.name == pattern.name) {
                return Err(Error::duplicate_name(pattern.name.clone()));
            }
        }

        let max_pattern_len = patterns.iter().map(Pattern::len).max().unwrap_or(0);

        Ok(Self {
            patterns,
            max_pattern_len,
        })
    }

    /// Returns the number of patterns in the set
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if the set contains no patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterates over the patterns in definition order
    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// Returns the pattern at `index`
    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    /// Returns the length of the longest pattern in the set
    pub fn max_pattern_len(&self) -> usize {
        self.max_pattern_len
    }

    /// Returns the number of extra bytes each chunk read must extend past its
    /// logical end so that a match starting near a chunk boundary is still
    /// fully visible within one read
    pub fn overlap(&self) -> usize {
        self.max_pattern_len.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_hex_with_wildcards() {
        let pattern = Pattern::from_hex("Test", "48 8B ?? 05 ? C3", 2).unwrap();
        assert_eq!(pattern.data(), &[0x48, 0x8B, 0x00, 0x05, 0x00, 0xC3]);
        assert_eq!(pattern.mask(), &[true, true, false, true, false, true]);
        assert_eq!(pattern.bytes_to_skip(), 2);
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        let err = Pattern::from_hex("Broken", "48 XZ", 0).unwrap_err();
        assert!(matches!(err, Error::PatternParse { .. }));
        assert!(err.to_string().contains("XZ"));
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let err = Pattern::new("Short", vec![1, 2, 3], vec![true, true], 0).unwrap_err();
        assert!(matches!(err, Error::MaskLengthMismatch { .. }));
    }

    #[test]
    fn test_new_rejects_empty() {
        let err = Pattern::new("Empty", vec![], vec![], 0).unwrap_err();
        assert!(matches!(err, Error::EmptyPattern { .. }));
    }

    #[test]
    fn test_matches_at_exact() {
        let pattern = Pattern::from_hex("P", "AA BB CC DD", 0).unwrap();
        let buffer = [0x00, 0xAA, 0xBB, 0xCC, 0xDD, 0x00];
        assert!(pattern.matches_at(&buffer, 1));
        assert!(!pattern.matches_at(&buffer, 0));
        assert!(!pattern.matches_at(&buffer, 2));
    }

    #[test]
    fn test_matches_at_wildcards_accept_any_byte() {
        let pattern = Pattern::from_hex("P", "AA ?? CC", 0).unwrap();
        let one = [0xAA, 0x00, 0xCC];
        let other = [0xAA, 0xFF, 0xCC];
        assert!(pattern.matches_at(&one, 0));
        assert!(pattern.matches_at(&other, 0));
    }

    #[test]
    fn test_matches_at_odd_length_middle_byte() {
        // masked middle must match
        let strict = Pattern::from_hex("P", "AA BB CC", 0).unwrap();
        assert!(strict.matches_at(&[0xAA, 0xBB, 0xCC], 0));
        assert!(!strict.matches_at(&[0xAA, 0x00, 0xCC], 0));

        // wildcard middle never rejects
        let loose = Pattern::from_hex("P", "AA ?? CC", 0).unwrap();
        assert!(loose.matches_at(&[0xAA, 0xBB, 0xCC], 0));
        assert!(loose.matches_at(&[0xAA, 0x00, 0xCC], 0));
    }

    #[test]
    fn test_matches_at_rejects_short_remainder() {
        let pattern = Pattern::from_hex("P", "AA BB CC DD", 0).unwrap();
        let buffer = [0xAA, 0xBB, 0xCC];
        assert!(!pattern.matches_at(&buffer, 0));
        assert!(!pattern.matches_at(&buffer, 10));
    }

    #[test]
    fn test_display_round_trip() {
        let pattern = Pattern::from_hex("Window", "E8 ?? ?? 00 01", -4).unwrap();
        assert_eq!(pattern.to_hex_string(), "E8 ?? ?? 00 01");
        assert_eq!(pattern.to_string(), "Window: E8 ?? ?? 00 01");
    }

    #[test]
    fn test_pattern_set_rejects_duplicate_names() {
        let a = Pattern::from_hex("Same", "AA", 0).unwrap();
        let b = Pattern::from_hex("Same", "BB", 0).unwrap();
        let err = PatternSet::new(vec![a, b]).unwrap_err();
        assert!(matches!(err, Error::DuplicateName { .. }));
    }

    #[test]
    fn test_pattern_set_overlap() {
        let set = PatternSet::new(vec![
            Pattern::from_hex("A", "AA BB", 0).unwrap(),
            Pattern::from_hex("B", "AA BB CC DD EE", 0).unwrap(),
        ])
        .unwrap();
        assert_eq!(set.max_pattern_len(), 5);
        assert_eq!(set.overlap(), 4);

        let empty = PatternSet::new(vec![]).unwrap();
        assert_eq!(empty.overlap(), 0);
    }
}
