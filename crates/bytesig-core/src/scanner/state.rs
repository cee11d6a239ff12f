//! Shared per-scan state and result aggregation.
//!
//! [`ScanState`] is the only mutable structure shared across scan workers.
//! It pairs a lock-free stop flag (consulted at the start of every unit of
//! work for cooperative cancellation) with a mutex-guarded record of found
//! offsets. The critical section is entered only when a pattern actually
//! matches, which is rare relative to the number of comparisons, so the lock
//! sees essentially no contention.
//!
//! The invariant enforced here: at most one true write per pattern. The first
//! recorded offset wins; recording the same offset again is a no-op (chunk
//! overlap regions are legitimately evaluated twice); recording a *different*
//! offset marks the pattern as non-unique and stops the scan.

use crate::error::{Error, Result};
use crate::pattern::PatternSet;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
struct StateInner {
    /// Found offset per pattern, indexed like the pattern set
    found: Vec<Option<usize>>,
    /// Pattern indices that matched at more than one offset
    duplicates: Vec<usize>,
    /// Patterns still unfound; zero triggers early-exit
    remaining: usize,
}

/// Mutable state shared by all workers of one scan
#[derive(Debug)]
pub(crate) struct ScanState {
    stop: AtomicBool,
    inner: Mutex<StateInner>,
}

impl ScanState {
    /// Creates empty state for a scan over `pattern_count` patterns
    pub(crate) fn new(pattern_count: usize) -> Self {
        Self {
            stop: AtomicBool::new(pattern_count == 0),
            inner: Mutex::new(StateInner {
                found: vec![None; pattern_count],
                duplicates: Vec::new(),
                remaining: pattern_count,
            }),
        }
    }

    /// Returns true once workers should stop picking up new units of work.
    ///
    /// Set when every pattern has been found, or when a non-unique pattern
    /// was detected. Work already in flight runs to completion; nothing is
    /// interrupted mid-comparison.
    pub(crate) fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Records a match of pattern `index` at `offset` (absolute in the
    /// buffer). First write wins; an identical re-record is a no-op; a
    /// conflicting offset marks the pattern non-unique and stops the scan.
    pub(crate) fn record(&self, index: usize, offset: usize) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match inner.found[index] {
            None => {
                inner.found[index] = Some(offset);
                inner.remaining -= 1;
                if inner.remaining == 0 {
                    self.stop.store(true, Ordering::Release);
                }
            }
            Some(previous) if previous == offset => {}
            Some(_) => {
                if !inner.duplicates.contains(&index) {
                    inner.duplicates.push(index);
                }
                self.stop.store(true, Ordering::Release);
            }
        }
    }

    /// Consumes the state and produces the final `name -> offset` mapping,
    /// with each pattern's skip adjustment applied.
    ///
    /// All-or-nothing: any non-unique pattern yields
    /// [`Error::NonUniquePattern`], any unfound pattern yields
    /// [`Error::PatternNotFound`]; no partial mapping is ever returned.
    /// Non-uniqueness takes priority, since a duplicated signature is the
    /// more fundamental defect in the pattern data.
    pub(crate) fn into_results(self, patterns: &PatternSet) -> Result<HashMap<String, usize>> {
        let inner = self
            .inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        if !inner.duplicates.is_empty() {
            let names = inner
                .duplicates
                .iter()
                .filter_map(|&i| patterns.get(i))
                .map(|p| p.name().to_string())
                .collect();
            return Err(Error::NonUniquePattern { names });
        }

        if inner.remaining > 0 {
            let names = inner
                .found
                .iter()
                .enumerate()
                .filter(|(_, offset)| offset.is_none())
                .filter_map(|(i, _)| patterns.get(i))
                .map(|p| p.name().to_string())
                .collect();
            return Err(Error::PatternNotFound { names });
        }

        let mut results = HashMap::with_capacity(patterns.len());
        for (pattern, offset) in patterns.iter().zip(inner.found.iter()) {
            let raw = offset.unwrap_or_default();
            let adjusted = raw
                .checked_add_signed(pattern.bytes_to_skip())
                .ok_or_else(|| Error::SkipOutOfRange {
                    name: pattern.name().to_string(),
                    offset: raw,
                    skip: pattern.bytes_to_skip(),
                })?;
            results.insert(pattern.name().to_string(), adjusted);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;

    fn two_patterns() -> PatternSet {
        PatternSet::new(vec![
            Pattern::from_hex("First", "AA BB", 0).unwrap(),
            Pattern::from_hex("Second", "CC DD", 3).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_completion_sets_stop() {
        let state = ScanState::new(2);
        assert!(!state.should_stop());

        state.record(0, 10);
        assert!(!state.should_stop());

        state.record(1, 20);
        assert!(state.should_stop());
    }

    #[test]
    fn test_into_results_applies_skip() {
        let patterns = two_patterns();
        let state = ScanState::new(2);
        state.record(0, 100);
        state.record(1, 200);

        let results = state.into_results(&patterns).unwrap();
        assert_eq!(results["First"], 100);
        assert_eq!(results["Second"], 203);
    }

    #[test]
    fn test_same_offset_re_record_is_idempotent() {
        let patterns = two_patterns();
        let state = ScanState::new(2);

        // same match observed from two overlapping chunk reads
        state.record(0, 100);
        state.record(0, 100);
        state.record(1, 200);

        let results = state.into_results(&patterns).unwrap();
        assert_eq!(results["First"], 100);
    }

    #[test]
    fn test_conflicting_offset_is_non_unique() {
        let patterns = two_patterns();
        let state = ScanState::new(2);

        state.record(0, 100);
        state.record(0, 500);
        assert!(state.should_stop());

        let err = state.into_results(&patterns).unwrap_err();
        match err {
            Error::NonUniquePattern { names } => assert_eq!(names, vec!["First".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unfound_patterns_are_named() {
        let patterns = two_patterns();
        let state = ScanState::new(2);
        state.record(0, 100);

        let err = state.into_results(&patterns).unwrap_err();
        match err {
            Error::PatternNotFound { names } => assert_eq!(names, vec!["Second".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_takes_priority_over_missing() {
        let patterns = two_patterns();
        let state = ScanState::new(2);

        state.record(0, 100);
        state.record(0, 500);

        let err = state.into_results(&patterns).unwrap_err();
        assert!(matches!(err, Error::NonUniquePattern { .. }));
    }

    #[test]
    fn test_empty_state_stops_immediately() {
        let state = ScanState::new(0);
        assert!(state.should_stop());

        let patterns = PatternSet::new(vec![]).unwrap();
        let results = state.into_results(&patterns).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_skip_below_zero_is_rejected() {
        let patterns = PatternSet::new(vec![Pattern::from_hex("Back", "AA BB", -8).unwrap()])
            .unwrap();
        let state = ScanState::new(1);
        state.record(0, 4);

        let err = state.into_results(&patterns).unwrap_err();
        assert!(matches!(err, Error::SkipOutOfRange { .. }));
    }
}
