//! Focus statistics over the session history.
//!
//! Only `work` records count toward focus time. Days are bucketed in the
//! caller's time zone.

use chrono::{Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::settings::{SessionKind, SessionRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Summary {
    pub today_work_sessions: u64,
    pub today_focus_secs: u64,
    pub total_work_sessions: u64,
    pub total_focus_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyFocus {
    pub date: NaiveDate,
    pub focus_secs: u64,
}

impl Summary {
    pub fn compute<Tz: TimeZone>(history: &[SessionRecord], today: NaiveDate, tz: &Tz) -> Self {
        let mut summary = Summary::default();
        for record in work_records(history) {
            let secs = u64::from(record.duration_spent);
            summary.total_work_sessions += 1;
            summary.total_focus_secs += secs;
            if local_date(record, tz) == today {
                summary.today_work_sessions += 1;
                summary.today_focus_secs += secs;
            }
        }
        summary
    }
}

/// Focus seconds for each of the seven days ending at `today`, oldest first.
pub fn weekly_focus<Tz: TimeZone>(
    history: &[SessionRecord],
    today: NaiveDate,
    tz: &Tz,
) -> Vec<DailyFocus> {
    (0..7u64)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .map(|date| DailyFocus {
            date,
            focus_secs: work_records(history)
                .filter(|r| local_date(r, tz) == date)
                .map(|r| u64::from(r.duration_spent))
                .sum(),
        })
        .collect()
}

/// `"{h}h {m}m"` once there is at least an hour, else `"{m}m"`.
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

fn work_records(history: &[SessionRecord]) -> impl Iterator<Item = &SessionRecord> {
    history.iter().filter(|r| r.kind == SessionKind::Work)
}

fn local_date<Tz: TimeZone>(record: &SessionRecord, tz: &Tz) -> NaiveDate {
    record.date.with_timezone(tz).date_naive()
}
