//! Daily login streaks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_STREAK_BONUS: i64 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub streak: i64,
    /// Bonus to credit for this login. Zero when the user already logged in today.
    pub bonus: i64,
    pub advanced: bool,
}

/// Advance a login streak for a login on `today`.
///
/// A second login on the same day changes nothing. A login on the day after the
/// last one extends the streak; any longer gap (or a first login) restarts it at 1.
pub fn advance_streak(
    last_login: Option<NaiveDate>,
    streak: i64,
    today: NaiveDate,
    daily_bonus: i64,
) -> StreakUpdate {
    match last_login {
        Some(last) if last == today => StreakUpdate {
            streak,
            bonus: 0,
            advanced: false,
        },
        Some(last) if last.succ_opt() == Some(today) => StreakUpdate {
            streak: streak + 1,
            bonus: daily_bonus,
            advanced: true,
        },
        _ => StreakUpdate {
            streak: 1,
            bonus: daily_bonus,
            advanced: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_first_login_starts_streak() {
        let up = advance_streak(None, 0, day(1), 10);
        assert_eq!(up, StreakUpdate { streak: 1, bonus: 10, advanced: true });
    }

    #[test]
    fn test_same_day_is_noop() {
        let up = advance_streak(Some(day(5)), 4, day(5), 10);
        assert_eq!(up.streak, 4);
        assert_eq!(up.bonus, 0);
        assert!(!up.advanced);
    }

    #[test]
    fn test_consecutive_day_extends() {
        let up = advance_streak(Some(day(5)), 4, day(6), 10);
        assert_eq!(up.streak, 5);
        assert_eq!(up.bonus, 10);
    }

    #[test]
    fn test_gap_resets() {
        let up = advance_streak(Some(day(1)), 9, day(5), 10);
        assert_eq!(up.streak, 1);
        assert!(up.advanced);
    }

    #[test]
    fn test_month_boundary() {
        let last = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let up = advance_streak(Some(last), 2, day(1), 10);
        assert_eq!(up.streak, 3);
    }
}
