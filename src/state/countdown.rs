use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

/// Half-hour start slots in a day.
pub const SLOTS_PER_DAY: usize = 48;
/// 19:00, the usual start of a show.
pub const DEFAULT_SLOT: usize = 38;

/// Standby page countdown to the start of the broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    SelectingTime {
        slot: usize,
    },
    Counting {
        slot: usize,
        target: NaiveDateTime,
        remaining: TimeDelta,
    },
    Live,
}

impl Default for Countdown {
    fn default() -> Self {
        Countdown::SelectingTime { slot: DEFAULT_SLOT }
    }
}

impl Countdown {
    pub fn is_counting(&self) -> bool {
        matches!(self, Countdown::Counting { .. })
    }

    pub fn next_slot(&mut self) {
        if let Countdown::SelectingTime { slot } = self {
            *slot = (*slot + 1) % SLOTS_PER_DAY;
        }
    }

    pub fn prev_slot(&mut self) {
        if let Countdown::SelectingTime { slot } = self {
            *slot = (*slot + SLOTS_PER_DAY - 1) % SLOTS_PER_DAY;
        }
    }

    /// Start counting toward the selected slot.
    pub fn confirm(&mut self, now: NaiveDateTime) {
        if let Countdown::SelectingTime { slot } = *self {
            let target = target_for(slot, now);
            *self = Countdown::Counting { slot, target, remaining: target - now };
        }
    }

    /// Recompute the remaining time from the wall clock. Returns true when
    /// the state changed.
    pub fn tick(&mut self, now: NaiveDateTime) -> bool {
        let Countdown::Counting { slot, target, remaining } = *self else {
            return false;
        };
        let left = target - now;
        if left <= TimeDelta::zero() {
            *self = Countdown::Live;
            return true;
        }
        if left.num_seconds() == remaining.num_seconds() {
            return false;
        }
        *self = Countdown::Counting { slot, target, remaining: left };
        true
    }

    /// Back to picking a time, keeping the previous choice.
    pub fn change_time(&mut self) {
        *self = match *self {
            Countdown::Counting { slot, .. } => Countdown::SelectingTime { slot },
            Countdown::Live => Countdown::default(),
            selecting => selecting,
        };
    }
}

pub fn slot_time(slot: usize) -> NaiveTime {
    let slot = slot % SLOTS_PER_DAY;
    NaiveTime::from_hms_opt((slot / 2) as u32, (slot % 2 * 30) as u32, 0).unwrap_or_default()
}

pub fn slot_label(slot: usize) -> String {
    slot_time(slot).format("%H:%M").to_string()
}

/// Today at the slot, or tomorrow if that moment has already passed.
pub fn target_for(slot: usize, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_time(slot_time(slot));
    if today <= now { today + TimeDelta::days(1) } else { today }
}

/// `HH:MM:SS`, clamped at zero.
pub fn format_remaining(remaining: TimeDelta) -> String {
    let total = remaining.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", total / 3600, total % 3600 / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn slots_cover_the_day_in_half_hours() {
        assert_eq!(slot_label(0), "00:00");
        assert_eq!(slot_label(1), "00:30");
        assert_eq!(slot_label(DEFAULT_SLOT), "19:00");
        assert_eq!(slot_label(SLOTS_PER_DAY - 1), "23:30");
    }

    #[test]
    fn slot_selection_wraps() {
        let mut countdown = Countdown::SelectingTime { slot: 0 };
        countdown.prev_slot();
        assert_eq!(countdown, Countdown::SelectingTime { slot: SLOTS_PER_DAY - 1 });
        countdown.next_slot();
        assert_eq!(countdown, Countdown::SelectingTime { slot: 0 });
    }

    #[test]
    fn target_is_today_when_still_ahead() {
        assert_eq!(target_for(DEFAULT_SLOT, at(18, 0, 0)), at(19, 0, 0));
    }

    #[test]
    fn target_rolls_to_tomorrow_when_past() {
        let target = target_for(DEFAULT_SLOT, at(19, 0, 0));
        assert_eq!(target, at(19, 0, 0) + TimeDelta::days(1));
        let target = target_for(2, at(20, 15, 0));
        assert_eq!(target.date(), NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert_eq!(target.time(), slot_time(2));
    }

    #[test]
    fn confirm_then_tick_down_to_live() {
        let mut countdown = Countdown::default();
        countdown.confirm(at(18, 59, 58));
        assert!(countdown.is_counting());
        assert!(matches!(countdown, Countdown::Counting { remaining, .. } if remaining.num_seconds() == 2));

        assert!(countdown.tick(at(18, 59, 59)));
        assert!(matches!(countdown, Countdown::Counting { remaining, .. } if remaining.num_seconds() == 1));
        assert!(!countdown.tick(at(18, 59, 59)));

        assert!(countdown.tick(at(19, 0, 0)));
        assert_eq!(countdown, Countdown::Live);
        assert!(!countdown.tick(at(19, 0, 5)));
    }

    #[test]
    fn change_time_returns_to_selection_with_same_slot() {
        let mut countdown = Countdown::SelectingTime { slot: 40 };
        countdown.confirm(at(12, 0, 0));
        countdown.change_time();
        assert_eq!(countdown, Countdown::SelectingTime { slot: 40 });

        countdown = Countdown::Live;
        countdown.change_time();
        assert_eq!(countdown, Countdown::default());
    }

    #[test]
    fn slot_keys_do_nothing_while_counting() {
        let mut countdown = Countdown::default();
        countdown.confirm(at(12, 0, 0));
        let before = countdown;
        countdown.next_slot();
        countdown.confirm(at(12, 0, 1));
        assert_eq!(countdown, before);
    }

    #[test]
    fn remaining_is_formatted_as_clock() {
        assert_eq!(format_remaining(TimeDelta::seconds(3 * 3600 + 5 * 60 + 9)), "03:05:09");
        assert_eq!(format_remaining(TimeDelta::seconds(-4)), "00:00:00");
    }
}
