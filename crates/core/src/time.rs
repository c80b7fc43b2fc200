use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::errors::DomainError;

pub const DEFAULT_TIME_ZONE: &str = "Asia/Bangkok";

pub fn parse_time_zone(name: &str) -> Result<Tz, DomainError> {
    name.trim().parse::<Tz>().map_err(|_| DomainError::InvalidTimeZone(name.to_owned()))
}

/// Source of "now" for confirmation timestamps.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;

    fn now_in(&self, zone: Tz) -> DateTime<Tz> {
        self.now_utc().with_timezone(&zone)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self(
            Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
                .single()
                .unwrap_or_else(Utc::now),
        )
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}
