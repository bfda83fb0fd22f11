//! Recurrence evaluation
//!
//! Decides whether a routine is due on a calendar day. This is the single
//! implementation used by the daily aggregation, the per-day routine list and
//! the CLI; nothing else re-derives the rule.
//!
//! Evaluation is total: a routine with an unknown frequency, a missing
//! `every_n_days`, or unreadable `week_days` is simply never due.

use chrono::NaiveDate;

use super::dates::{day_offset, weekday_index};
use crate::models::{Frequency, Routine};

/// Set of weekdays, bit `i` set for index `i` (0 = Sunday .. 6 = Saturday)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekDays(u8);

impl WeekDays {
    /// Build from stored indices; `None` if any index is outside 0..=6
    pub fn from_indices(indices: &[i64]) -> Option<Self> {
        let mut bits = 0u8;
        for &i in indices {
            if !(0..=6).contains(&i) {
                return None;
            }
            bits |= 1 << i;
        }
        Some(Self(bits))
    }

    pub fn contains(&self, index: u32) -> bool {
        index < 7 && self.0 & (1 << index) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Sorted, deduplicated indices
    pub fn indices(&self) -> Vec<i64> {
        (0..7).filter(|&i| self.contains(i)).map(i64::from).collect()
    }
}

/// A routine's cadence, fully resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    Daily,
    /// Due on `start` and every `n` days after it
    EveryNDays { n: u32, start: NaiveDate },
    SpecificDays(WeekDays),
}

impl Recurrence {
    /// Resolve a stored routine; `None` when its cadence can't be evaluated
    pub fn from_routine(routine: &Routine) -> Option<Self> {
        match routine.schedule()? {
            Frequency::Daily => Some(Recurrence::Daily),
            Frequency::EveryNDays => {
                let n = u32::try_from(routine.every_n_days?).ok().filter(|n| *n > 0)?;
                Some(Recurrence::EveryNDays {
                    n,
                    start: routine.created_on(),
                })
            }
            Frequency::SpecificDays => {
                let indices = routine.week_day_indices()?;
                WeekDays::from_indices(&indices).map(Recurrence::SpecificDays)
            }
        }
    }

    pub fn is_due(&self, date: NaiveDate) -> bool {
        match *self {
            Recurrence::Daily => true,
            Recurrence::EveryNDays { n, start } => {
                let offset = day_offset(start, date);
                offset >= 0 && offset % i64::from(n) == 0
            }
            Recurrence::SpecificDays(days) => days.contains(weekday_index(date)),
        }
    }
}

/// Whether `routine` is due on `date`
pub fn is_due(routine: &Routine, date: NaiveDate) -> bool {
    Recurrence::from_routine(routine).is_some_and(|r| r.is_due(date))
}

/// Routines from `routines` that are due on `date`, in input order
pub fn due_on<'a>(routines: &'a [Routine], date: NaiveDate) -> impl Iterator<Item = &'a Routine> + 'a {
    routines.iter().filter(move |r| is_due(r, date))
}
