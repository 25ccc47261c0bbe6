//! Daily schedule without catch-up

use crate::error::{PipelineError, Result};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Fires once a day at `hour:minute` UTC. Missed fire times are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySchedule {
    pub hour: u32,
    pub minute: u32,
}

impl Default for DailySchedule {
    fn default() -> Self {
        Self { hour: 8, minute: 0 }
    }
}

impl DailySchedule {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        let schedule = Self { hour, minute };
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn validate(&self) -> Result<()> {
        self.fire_time().map(|_| ())
    }

    fn fire_time(&self) -> Result<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).ok_or_else(|| {
            PipelineError::ConfigError(format!(
                "invalid daily schedule {:02}:{:02}",
                self.hour, self.minute
            ))
        })
    }

    /// Equivalent cron expression
    pub fn cron(&self) -> String {
        format!("{} {} * * *", self.minute, self.hour)
    }

    /// Next fire time strictly after `now`
    pub fn next_after(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let today = now.date_naive().and_time(self.fire_time()?).and_utc();
        if today > now {
            Ok(today)
        } else {
            Ok(today + Duration::days(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_is_eight_utc() {
        assert_eq!(DailySchedule::default().cron(), "0 8 * * *");
    }

    #[test]
    fn test_next_after_same_day() {
        let schedule = DailySchedule::default();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 6, 30, 0).unwrap();
        assert_eq!(
            schedule.next_after(now).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_next_after_rolls_over() {
        let schedule = DailySchedule::default();
        let at_fire = Utc.with_ymd_and_hms(2024, 2, 29, 8, 0, 0).unwrap();
        assert_eq!(
            schedule.next_after(at_fire).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
        );

        let evening = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(
            schedule.next_after(evening).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_invalid_time() {
        assert!(DailySchedule::new(24, 0).is_err());
        assert!(DailySchedule::new(7, 60).is_err());
    }
}
