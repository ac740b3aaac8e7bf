//! Clock abstraction and relative time labels.
//!
//! Post timestamps are turned into labels like "3 days ago" exactly once, when
//! the post detail arrives. Views never recompute them.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DAYS_PER_MONTH: f64 = 30.436875;
const DAYS_PER_YEAR: f64 = 365.2425;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

/// A clock frozen at `timestamp` (unix seconds). Out-of-range values pin to the epoch.
#[cfg_attr(not(test), allow(dead_code))]
pub fn fixed_clock(timestamp: i64) -> Arc<dyn Clock> {
    let at = Utc
        .timestamp_opt(timestamp, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH);
    Arc::new(FixedClock(at))
}

/// Parse the server's `created` column (`YYYY-MM-DD HH:MM:SS`, UTC).
pub fn parse_created(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), CREATED_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn format_relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(then).num_seconds();
    let phrase = relative_phrase(delta.unsigned_abs());
    if delta < 0 {
        format!("in {phrase}")
    } else {
        format!("{phrase} ago")
    }
}

fn relative_phrase(secs: u64) -> String {
    let s = secs as f64;
    let minutes = (s / 60.0).round() as u64;
    let hours = (s / 3_600.0).round() as u64;
    let days = (s / 86_400.0).round() as u64;
    let months = (s / 86_400.0 / DAYS_PER_MONTH).round() as u64;
    let years = (s / 86_400.0 / DAYS_PER_YEAR).round() as u64;

    if secs <= 44 {
        "a few seconds".into()
    } else if minutes <= 1 {
        "a minute".into()
    } else if minutes < 45 {
        format!("{minutes} minutes")
    } else if hours <= 1 {
        "an hour".into()
    } else if hours < 22 {
        format!("{hours} hours")
    } else if days <= 1 {
        "a day".into()
    } else if days < 26 {
        format!("{days} days")
    } else if months <= 1 {
        "a month".into()
    } else if months < 11 {
        format!("{months} months")
    } else if years <= 1 {
        "a year".into()
    } else {
        format!("{years} years")
    }
}
