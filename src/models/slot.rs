//! Time slot model and the conflict predicate.
//!
//! A slot is a recurring weekly occurrence: a set of teaching weeks, a
//! weekday, and an inclusive period range within that day.
//!
//! # Conflict Rule
//! Two slots conflict iff all of the following hold:
//! - both have a non-empty week set,
//! - they fall on the same weekday,
//! - their week sets intersect,
//! - their period ranges overlap (inclusive on both ends).
//!
//! A slot with no week data never conflicts with anything. Upstream loaders
//! degrade malformed week fields to an empty set, so this rule can hide a
//! real clash; `validation::data_quality_warnings` reports such slots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A weekly time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Teaching weeks (1-based). Empty = no week data.
    pub weeks: BTreeSet<u32>,
    /// Day of week, 1 (Monday) to 7 (Sunday). 0 = unknown.
    pub weekday: u8,
    /// First period (1-based, inclusive).
    pub start_period: u32,
    /// Last period (1-based, inclusive).
    pub end_period: u32,
}

impl TimeSlot {
    /// Creates a slot, swapping the period bounds if given in reverse.
    pub fn new(
        weeks: impl IntoIterator<Item = u32>,
        weekday: u8,
        start_period: u32,
        end_period: u32,
    ) -> Self {
        let (start_period, end_period) = if start_period <= end_period {
            (start_period, end_period)
        } else {
            (end_period, start_period)
        };
        Self {
            weeks: weeks.into_iter().collect(),
            weekday,
            start_period,
            end_period,
        }
    }

    /// Whether this slot carries week data.
    #[inline]
    pub fn has_weeks(&self) -> bool {
        !self.weeks.is_empty()
    }

    /// Earliest week, or 0 without week data.
    #[inline]
    pub fn main_week(&self) -> u32 {
        self.weeks.first().copied().unwrap_or(0)
    }

    /// Whether the inclusive period ranges overlap.
    #[inline]
    pub fn periods_overlap(&self, other: &Self) -> bool {
        !(self.end_period < other.start_period || other.end_period < self.start_period)
    }

    /// Same weekday and identical period range, weeks ignored.
    pub fn same_period(&self, other: &Self) -> bool {
        self.weekday == other.weekday
            && self.start_period == other.start_period
            && self.end_period == other.end_period
    }

    /// Whether two slots conflict. Symmetric.
    pub fn conflicts_with(&self, other: &Self) -> bool {
        if !self.has_weeks() || !other.has_weeks() {
            return false;
        }
        if self.weekday != other.weekday {
            return false;
        }
        if self.weeks.is_disjoint(&other.weeks) {
            return false;
        }
        self.periods_overlap(other)
    }
}
