//! Schedule domain: activities, day grouping, date helpers and color rules.

pub mod activity;
pub mod builder;
pub mod classify;
pub mod datetime;

pub use activity::Activity;
pub use builder::{group_activities_by_day, DaySchedule};
pub use classify::{activity_color, border_accent_color};
pub use datetime::{day_of_week, format_date, format_time, parse_date};
