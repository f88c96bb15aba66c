//! Last observed line values per (group, signal kind).
//!
//! Only one previous reading is kept: edge detection is strictly
//! "previous vs current".  An entry that has never been written reads as
//! `None`, which the poller treats as "not yet initialized" and uses to
//! suppress firing on the very first successful read.

use super::channel::{IoGroup, LineValues, SignalKind, line_values};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotStore {
    entries: [[Option<LineValues>; SignalKind::COUNT]; 2],
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last recorded values, or `None` if this entry was never written.
    pub fn get(&self, group: IoGroup, kind: SignalKind) -> Option<&[f32]> {
        self.entries[group.slot()][kind.slot()].as_deref()
    }

    /// Overwrite the stored values and mark the entry initialized.
    pub fn update(&mut self, group: IoGroup, kind: SignalKind, values: &[f32]) {
        self.entries[group.slot()][kind.slot()] = Some(line_values(values));
    }

    pub fn is_initialized(&self, group: IoGroup, kind: SignalKind) -> bool {
        self.entries[group.slot()][kind.slot()].is_some()
    }

    /// Compare the stored controller digital inputs against a binary
    /// pattern such as `"10000000"`.
    ///
    /// The rightmost character addresses line 0.  Only the overlap between
    /// the pattern and the stored lines is compared; an uninitialized
    /// snapshot never matches.
    pub fn controller_digitals_match(&self, pattern: &str) -> bool {
        let Some(lines) = self.get(IoGroup::Controller, SignalKind::Digital) else {
            return false;
        };
        pattern
            .chars()
            .rev()
            .zip(lines)
            .all(|(bit, &value)| match bit {
                '0' => value == 0.0,
                '1' => value == 1.0,
                _ => false,
            })
    }
}
