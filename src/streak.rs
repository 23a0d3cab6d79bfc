//! Daily step-goal streaks.
//!
//! A pure batch calculation over persisted daily totals. Records are bucketed
//! by calendar date; a day with no record counts as zero steps. Only the
//! `lookback_days` days ending at `today` are considered.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Date format of [`DailyStepRecord::date`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const MAX_LOOKBACK_DAYS: u32 = 36_500;

/// One persisted day of step totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStepRecord {
    /// Calendar date as `yyyy-MM-dd`.
    pub date: String,
    pub steps: i32,
    /// Goal in force when the day was recorded. Streaks use the caller's goal.
    pub goal: i32,
}

impl DailyStepRecord {
    pub fn new(date: NaiveDate, steps: i32, goal: i32) -> Self {
        Self {
            date: date.format(DATE_FORMAT).to_string(),
            steps,
            goal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreakConfig {
    /// Size of the window ending today, in days (today included).
    pub lookback_days: u32,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self { lookback_days: 365 }
    }
}

impl StreakConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback_days == 0 || self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(ConfigError::invalid_value(
                "lookback_days",
                format!("{} is outside [1, {}]", self.lookback_days, MAX_LOOKBACK_DAYS),
            ));
        }
        Ok(())
    }
}

/// Streak statistics for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakResult {
    /// Consecutive qualifying days ending today, or yesterday when today is still open.
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Most recent qualifying day in the window.
    pub last_streak_date: Option<NaiveDate>,
    /// Every qualifying day in the window, oldest first.
    pub streak_history: Vec<NaiveDate>,
}

/// Computes [`StreakResult`]s. Holds configuration only, so it is freely shareable.
#[derive(Debug, Clone, Default)]
pub struct StreakEngine {
    config: StreakConfig,
}

impl StreakEngine {
    pub fn new(config: StreakConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StreakConfig {
        &self.config
    }

    /// Streaks of days with at least `goal` steps, as of `today`.
    ///
    /// A day without a record counts as zero steps, so a goal of zero or
    /// less makes every day in the window qualify. Records outside the window
    /// and records whose date does not parse are ignored. When a date appears
    /// twice the larger total wins.
    pub fn calculate(&self, records: &[DailyStepRecord], goal: i32, today: NaiveDate) -> StreakResult {
        let window_start = today
            .checked_sub_days(Days::new(u64::from(self.config.lookback_days.max(1) - 1)))
            .unwrap_or(NaiveDate::MIN);

        let daily = bucket_by_date(records, window_start, today);
        let qualifies = |day: NaiveDate| daily.get(&day).copied().unwrap_or(0) >= goal;

        let mut streak_history = Vec::new();
        let mut longest_streak = 0u32;
        let mut run = 0u32;
        for day in window_start.iter_days().take_while(|day| *day <= today) {
            if qualifies(day) {
                run += 1;
                streak_history.push(day);
            } else {
                longest_streak = longest_streak.max(run);
                run = 0;
            }
        }
        longest_streak = longest_streak.max(run);

        // Today still counts as open until its goal is met.
        let mut cursor = if qualifies(today) {
            Some(today)
        } else {
            today.pred_opt()
        };
        let mut current_streak = 0u32;
        while let Some(day) = cursor {
            if day < window_start || !qualifies(day) {
                break;
            }
            current_streak += 1;
            cursor = day.pred_opt();
        }

        StreakResult {
            current_streak,
            longest_streak,
            last_streak_date: streak_history.last().copied(),
            streak_history,
        }
    }
}

fn bucket_by_date(
    records: &[DailyStepRecord],
    window_start: NaiveDate,
    today: NaiveDate,
) -> BTreeMap<NaiveDate, i32> {
    let mut daily = BTreeMap::new();
    for record in records {
        let date = match NaiveDate::parse_from_str(&record.date, DATE_FORMAT) {
            Ok(date) => date,
            Err(err) => {
                warn!(date = %record.date, %err, "skipping step record with unparsable date");
                continue;
            }
        };
        if date < window_start || date > today {
            continue;
        }
        daily
            .entry(date)
            .and_modify(|steps: &mut i32| {
                warn!(%date, "duplicate step record, keeping the larger total");
                *steps = (*steps).max(record.steps);
            })
            .or_insert(record.steps);
    }
    daily
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOAL: i32 = 8_000;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine() -> StreakEngine {
        StreakEngine::new(StreakConfig::default()).unwrap()
    }

    /// `steps[i]` is the total for `today - i` days.
    fn history(today: NaiveDate, steps: &[i32]) -> Vec<DailyStepRecord> {
        steps
            .iter()
            .enumerate()
            .map(|(i, s)| DailyStepRecord::new(today - Days::new(i as u64), *s, GOAL))
            .collect()
    }

    #[test]
    fn test_five_days_ending_yesterday_with_today_open() {
        let today = day(2024, 3, 10);
        let records = history(today, &[1_200, 9_000, 8_000, 12_000, 8_500, 10_000, 300]);
        let result = engine().calculate(&records, GOAL, today);
        assert_eq!(result.current_streak, 5);
        assert_eq!(result.last_streak_date, Some(day(2024, 3, 9)));
        assert_eq!(result.longest_streak, 5);
        assert_eq!(result.streak_history.first(), Some(&day(2024, 3, 5)));
        assert_eq!(result.streak_history.len(), 5);
    }

    #[test]
    fn test_today_met_extends_current() {
        let today = day(2024, 3, 10);
        let records = history(today, &[8_001, 9_000, 8_000]);
        let result = engine().calculate(&records, GOAL, today);
        assert_eq!(result.current_streak, 3);
        assert_eq!(result.last_streak_date, Some(today));
    }

    #[test]
    fn test_missing_day_breaks_streak() {
        let today = day(2024, 3, 10);
        let mut records = history(today, &[0, 9_000, 9_000]);
        // Gap on 03-07, then an older run of four.
        records.extend((4..8).map(|i| DailyStepRecord::new(today - Days::new(i), 10_000, GOAL)));
        let result = engine().calculate(&records, GOAL, today);
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.longest_streak, 4);
        assert_eq!(result.streak_history.len(), 6);
    }

    #[test]
    fn test_yesterday_missed_means_no_current_streak() {
        let today = day(2024, 3, 10);
        let records = history(today, &[500, 100, 9_000, 9_000]);
        let result = engine().calculate(&records, GOAL, today);
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 2);
        assert_eq!(result.last_streak_date, Some(day(2024, 3, 8)));
    }

    #[test]
    fn test_empty_history() {
        let result = engine().calculate(&[], GOAL, day(2024, 1, 1));
        assert_eq!(result, StreakResult::default());
    }

    #[test]
    fn test_window_bounds_the_scan() {
        let today = day(2024, 3, 10);
        let records = history(today, &[9_000; 10]);
        let engine = StreakEngine::new(StreakConfig { lookback_days: 4 }).unwrap();
        let result = engine.calculate(&records, GOAL, today);
        assert_eq!(result.current_streak, 4);
        assert_eq!(result.longest_streak, 4);
        assert_eq!(result.streak_history.first(), Some(&day(2024, 3, 7)));
    }

    #[test]
    fn test_bad_and_duplicate_dates() {
        let today = day(2024, 3, 10);
        let records = vec![
            DailyStepRecord { date: "yesterday".into(), steps: 50_000, goal: GOAL },
            DailyStepRecord::new(day(2024, 3, 9), 100, GOAL),
            DailyStepRecord::new(day(2024, 3, 9), 9_500, GOAL),
            DailyStepRecord::new(day(2024, 3, 11), 9_500, GOAL),
        ];
        let result = engine().calculate(&records, GOAL, today);
        assert_eq!(result.current_streak, 1);
        assert_eq!(result.streak_history, vec![day(2024, 3, 9)]);
    }

    #[test]
    fn test_zero_goal_qualifies_every_day_in_window() {
        let today = day(2024, 3, 10);
        let engine = StreakEngine::new(StreakConfig { lookback_days: 4 }).unwrap();
        let result = engine.calculate(&[], 0, today);
        assert_eq!(result.current_streak, 4);
        assert_eq!(result.longest_streak, 4);
        assert_eq!(result.last_streak_date, Some(today));
        assert_eq!(
            result.streak_history,
            vec![day(2024, 3, 7), day(2024, 3, 8), day(2024, 3, 9), today]
        );
    }

    #[test]
    fn test_goal_is_inclusive() {
        let today = day(2024, 3, 10);
        let result = engine().calculate(&history(today, &[GOAL, GOAL - 1]), GOAL, today);
        assert_eq!(result.current_streak, 1);
        assert_eq!(result.streak_history, vec![today]);
    }

    #[test]
    fn test_config_validation() {
        assert!(StreakEngine::new(StreakConfig { lookback_days: 0 }).is_err());
        assert!(StreakConfig::default().validate().is_ok());
    }
}
