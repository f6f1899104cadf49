use std::collections::HashMap;

use chrono::NaiveDate;

use super::datetime::parse_date;
use super::Activity;
use crate::Result;

/// All activities that share one day-key, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    /// Original day-key, e.g. "April-11-2025"
    pub date: String,
    /// Short display date, e.g. "Apr 11"
    pub formatted_date: String,
    /// Weekday name, e.g. "Friday"
    pub day_of_week: String,
    /// Activities ordered by start-time string
    pub activities: Vec<Activity>,
    /// Parsed calendar date; only used to order days
    pub full_date: NaiveDate,
}

/// Group a flat activity list into per-day schedules.
///
/// Within a day activities are ordered by comparing the start-time strings
/// lexicographically, so "10:00" sorts before "9:00". Days are ordered by their
/// calendar date. Both sorts are stable.
pub fn group_activities_by_day(activities: &[Activity]) -> Result<Vec<DaySchedule>> {
    let mut order: Vec<&str> = Vec::new();
    let mut buckets: HashMap<&str, Vec<Activity>> = HashMap::new();
    for activity in activities {
        let key = activity.activity_day.as_str();
        buckets
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(activity.clone());
    }

    let mut days = Vec::with_capacity(order.len());
    for key in order {
        let mut day_activities = buckets.remove(key).unwrap_or_default();
        day_activities.sort_by(|a, b| a.activity_start_time.cmp(&b.activity_start_time));

        let full_date = parse_date(key)?;
        days.push(DaySchedule {
            date: key.to_string(),
            formatted_date: full_date.format("%b %-d").to_string(),
            day_of_week: full_date.format("%A").to_string(),
            activities: day_activities,
            full_date,
        });
    }

    days.sort_by_key(|d| d.full_date);
    log::debug!("grouped {} activities into {} days", activities.len(), days.len());
    Ok(days)
}
