//! Alert deduplication state.
//!
//! [`MonitorState`] remembers the last player count that triggered an alert.
//! It is a single slot on purpose: a count alerted long ago and seen again
//! after another qualifying count alerts again.

/// Outcome of observing a player count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The count qualifies and differs from the last alerted one, send an alert.
    Notify(u32),
    /// The count is below the threshold, alerting is armed again.
    Rearm,
    /// The count qualifies but was already alerted.
    Suppress,
}

/// Mutable state carried between two poll cycles.
///
/// `last_alerted_count` is `0` while armed, otherwise the count of the last
/// alert, which is always greater or equal to the threshold in use.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MonitorState {
    last_alerted_count: u32,
}

impl MonitorState {
    /// Create an armed [MonitorState].
    pub fn new() -> Self {
        Self::default()
    }

    /// Last count that triggered an alert, `0` when armed.
    pub fn last_alerted_count(&self) -> u32 {
        self.last_alerted_count
    }

    /// Applies one observation and commits the resulting state.
    ///
    /// # Arguments
    ///
    /// * `count` - Number of connected players just probed
    /// * `threshold` - Minimum number of players that qualifies for an alert
    pub fn observe(&mut self, count: u32, threshold: u32) -> Transition {
        if count >= threshold && count != self.last_alerted_count {
            self.last_alerted_count = count;
            Transition::Notify(count)
        } else if count < threshold {
            self.last_alerted_count = 0;
            Transition::Rearm
        } else {
            Transition::Suppress
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe_all(counts: &[u32], threshold: u32) -> Vec<Transition> {
        let mut state = MonitorState::new();
        counts
            .iter()
            .map(|count| state.observe(*count, threshold))
            .collect()
    }

    #[test]
    fn test_new_state_is_armed() {
        let state = MonitorState::new();
        assert_eq!(state.last_alerted_count(), 0);
    }

    #[test]
    fn test_constant_count_notifies_once() {
        assert_eq!(
            observe_all(&[12, 12, 12], 5),
            vec![
                Transition::Notify(12),
                Transition::Suppress,
                Transition::Suppress
            ]
        );
    }

    #[test]
    fn test_drop_below_threshold_rearms() {
        assert_eq!(
            observe_all(&[10, 2, 10], 5),
            vec![Transition::Notify(10), Transition::Rearm, Transition::Notify(10)]
        );
    }

    #[test]
    fn test_count_equal_to_threshold_qualifies() {
        let mut state = MonitorState::new();
        assert_eq!(state.observe(5, 5), Transition::Notify(5));
        assert_eq!(state.last_alerted_count(), 5);
        assert_eq!(state.observe(4, 5), Transition::Rearm);
        assert_eq!(state.last_alerted_count(), 0);
    }

    #[test]
    fn test_qualifying_count_change_notifies_again() {
        assert_eq!(
            observe_all(&[0, 6, 6, 3, 7], 5),
            vec![
                Transition::Rearm,
                Transition::Notify(6),
                Transition::Suppress,
                Transition::Rearm,
                Transition::Notify(7)
            ]
        );
    }

    #[test]
    fn test_decreasing_qualifying_count_notifies() {
        assert_eq!(
            observe_all(&[9, 7, 6], 5),
            vec![
                Transition::Notify(9),
                Transition::Notify(7),
                Transition::Notify(6)
            ]
        );
    }

    #[test]
    fn test_only_last_alerted_count_is_remembered() {
        // 8 was alerted before 9, it alerts again when coming back
        assert_eq!(
            observe_all(&[8, 9, 8], 5),
            vec![
                Transition::Notify(8),
                Transition::Notify(9),
                Transition::Notify(8)
            ]
        );
    }

    #[test]
    fn test_notifies_iff_qualifying_and_different_from_last() {
        let threshold = 4;
        let counts = [0, 4, 4, 5, 3, 3, 5, 5, 12, 0, 12, 1, 4];
        let mut state = MonitorState::new();

        for count in counts {
            let last = state.last_alerted_count();
            let expected_notify = count >= threshold && count != last;
            let transition = state.observe(count, threshold);

            assert_eq!(
                matches!(transition, Transition::Notify(_)),
                expected_notify,
                "count={count}, last={last}"
            );
            // The state is always armed or holding a qualifying alerted count
            assert!(state.last_alerted_count() == 0 || state.last_alerted_count() >= threshold);
        }
    }
}
