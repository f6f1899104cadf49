use serde::{Deserialize, Deserializer, Serialize};

use crate::dom::style::parse_color;

/// Background value the feed uses when no explicit color was chosen.
pub const UNSET_BACKGROUND: &str = "#fff";

/// One scheduled event as published by the itinerary feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub activity_name: String,
    /// Day-key in "Month-Day-Year" form, e.g. "April-11-2025"
    pub activity_day: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub activity_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_detailed_content: Option<String>,
    /// "H:MM", 24-hour, no leading zero on the hour
    pub activity_start_time: String,
    pub activity_stop_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_background_color: Option<String>,
}

/// Reads a missing or `null` string as empty.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Activity {
    pub fn new(name: &str, day: &str, start: &str, stop: &str) -> Self {
        Self {
            activity_name: name.to_string(),
            activity_day: day.to_string(),
            activity_description: String::new(),
            activity_detailed_content: None,
            activity_start_time: start.to_string(),
            activity_stop_time: stop.to_string(),
            activity_background_color: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.activity_description = description.to_string();
        self
    }

    pub fn with_details(mut self, details: &str) -> Self {
        self.activity_detailed_content = Some(details.to_string());
        self
    }

    pub fn with_background(mut self, color: &str) -> Self {
        self.activity_background_color = Some(color.to_string());
        self
    }

    /// Explicit background color, ignoring the feed placeholder and anything
    /// that does not parse as a single CSS color.
    pub fn explicit_background(&self) -> Option<&str> {
        self.activity_background_color
            .as_deref()
            .map(str::trim)
            .filter(|c| *c != UNSET_BACKGROUND && parse_color(c).is_some())
    }

    /// Detailed content when present and non-empty.
    pub fn details(&self) -> Option<&str> {
        self.activity_detailed_content.as_deref().filter(|d| !d.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_feed_field_names() {
        let json = r##"{
            "activityName": "Breakfast",
            "activityDay": "April-4-2025",
            "activityDescription": "Morning meal",
            "activityStartTime": "7:00",
            "activityStopTime": "9:00",
            "activityBackgroundColor": "#fff",
            "activityDetailedContent": ""
        }"##;
        let a: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(a.activity_name, "Breakfast");
        assert_eq!(a.activity_day, "April-4-2025");
        assert_eq!(a.explicit_background(), None);
        assert_eq!(a.details(), None);
    }

    #[test]
    fn optional_fields_may_be_missing() {
        let json = r#"{"activityName":"Run","activityDay":"April-5-2025","activityStartTime":"6:00","activityStopTime":"7:00"}"#;
        let a: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(a.activity_description, "");
        assert!(a.activity_background_color.is_none());
    }

    #[test]
    fn null_description_reads_as_empty() {
        let json = r#"{"activityName":"Run","activityDay":"April-5-2025","activityDescription":null,"activityStartTime":"6:00","activityStopTime":"7:00"}"#;
        let a: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(a.activity_description, "");
    }

    #[test]
    fn explicit_background_is_kept() {
        let a = Activity::new("x", "April-4-2025", "1:00", "2:00").with_background("#123456");
        assert_eq!(a.explicit_background(), Some("#123456"));
        let a = a.with_background("rgb(1, 2, 3)");
        assert_eq!(a.explicit_background(), Some("rgb(1, 2, 3)"));
    }

    #[test]
    fn unparsable_background_is_dropped() {
        let base = Activity::new("x", "April-4-2025", "1:00", "2:00");
        for bad in ["#fff2cc; color: lime", "red;border-left:9px solid red", "url(x)", "not-a-color", ""] {
            assert_eq!(base.clone().with_background(bad).explicit_background(), None, "{}", bad);
        }
    }
}
