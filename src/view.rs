//! Calendar view state and schedule markup.
//!
//! [`ViewState`] holds everything the calendar screen shows and changes only
//! through [`ViewState::update`]. The markup produced by
//! [`render_schedule_html`] is what the export pipeline captures; it is
//! styled by [`SCHEDULE_CSS`].

use std::fmt::Write as _;
use std::str::FromStr;

use askama::Template;

use crate::export::ExportFormat;
use crate::schedule::{activity_color, border_accent_color, format_time, Activity, DaySchedule};
use crate::{Error, Result};

/// Days shown side by side in week mode
pub const WEEK_DAYS: usize = 8;

/// Id of the element the export pipeline captures
pub const SCHEDULE_ROOT_ID: &str = "schedule";

pub const LOAD_ERROR_MESSAGE: &str = "Failed to load itinerary data. Please try again later.";

/// Card descriptions longer than this many characters are cut short
const DESCRIPTION_PREVIEW_CHARS: usize = 50;

/// Stylesheet for the schedule markup. Only colors and borders matter to the
/// rasterizer; layout comes from the `grid`/`grid-cols-N` classes.
pub const SCHEDULE_CSS: &str = r#"
* { border-width: 0; border-style: solid; border-color: #e5e7eb }
.bg-white { background-color: #ffffff }
.bg-gray-800 { background-color: #1f2937 }
.text-white { color: #ffffff }
.text-gray-500 { color: #6b7280 }
.text-gray-600 { color: #4b5563 }
.text-gray-800 { color: #1f2937 }
.border-b { border-bottom-width: 1px }
.border-r { border-right-width: 1px }
.border-r-0 { border-right-width: 0 }
.border-l-4 { border-left-width: 4px }
.export-mode .day-header { border-bottom: 1px solid #374151 }
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Week,
    Day,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Week => ViewMode::Day,
            ViewMode::Day => ViewMode::Week,
        }
    }

    fn grid_class(self) -> &'static str {
        match self {
            ViewMode::Week => "grid-cols-8",
            ViewMode::Day => "grid-cols-1",
        }
    }

    fn text_sizes(self) -> TextSizes {
        match self {
            ViewMode::Week => TextSizes {
                weekday: "text-base",
                date: "text-sm",
                detail: "text-xs",
                name: "text-sm",
            },
            ViewMode::Day => TextSizes {
                weekday: "text-xl",
                date: "text-base",
                detail: "text-sm",
                name: "text-lg",
            },
        }
    }
}

impl FromStr for ViewMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "week" => Ok(ViewMode::Week),
            "day" => Ok(ViewMode::Day),
            other => Err(Error::InvalidData(format!("unknown view mode {:?}", other))),
        }
    }
}

/// Everything that can happen to the calendar screen
#[derive(Debug)]
pub enum Action {
    Loaded(Result<Vec<DaySchedule>>),
    ToggleViewMode,
    SelectDay(usize),
    PreviousDay,
    NextDay,
    OpenActivity(Activity),
    CloseActivity,
    ExportStarted,
    ExportFinished { format: ExportFormat, succeeded: bool },
}

/// State of the calendar screen
#[derive(Debug, Clone)]
pub struct ViewState {
    pub loading: bool,
    /// Message shown instead of the calendar after a failed load
    pub error: Option<String>,
    pub days: Vec<DaySchedule>,
    pub view_mode: ViewMode,
    /// Index into `days` shown in day mode
    pub selected_day: usize,
    /// Activity whose details are open
    pub selected_activity: Option<Activity>,
    pub export_in_progress: bool,
    /// Message reported after a failed export
    pub alert: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            loading: true,
            error: None,
            days: Vec::new(),
            view_mode: ViewMode::Week,
            selected_day: 0,
            selected_activity: None,
            export_in_progress: false,
            alert: None,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, action: Action) {
        match action {
            Action::Loaded(Ok(days)) => {
                self.loading = false;
                self.error = None;
                self.days = days;
                self.selected_day = self.clamp_day(self.selected_day);
            }
            Action::Loaded(Err(e)) => {
                log::error!("Error loading itinerary: {}", e);
                self.loading = false;
                self.error = Some(LOAD_ERROR_MESSAGE.to_string());
            }
            Action::ToggleViewMode => self.view_mode = self.view_mode.toggled(),
            Action::SelectDay(index) => self.selected_day = self.clamp_day(index),
            Action::PreviousDay => self.selected_day = self.selected_day.saturating_sub(1),
            Action::NextDay => self.selected_day = self.clamp_day(self.selected_day + 1),
            Action::OpenActivity(activity) => self.selected_activity = Some(activity),
            Action::CloseActivity => self.selected_activity = None,
            Action::ExportStarted => {
                self.export_in_progress = true;
                self.alert = None;
            }
            Action::ExportFinished { format, succeeded } => {
                self.export_in_progress = false;
                if !succeeded {
                    self.alert = Some(format!(
                        "Failed to generate {}. Please check the logs for errors.",
                        format
                    ));
                }
            }
        }
    }

    fn clamp_day(&self, index: usize) -> usize {
        index.min(self.days.len().saturating_sub(1))
    }

    /// Exports are offered once data is shown and no other export runs.
    pub fn can_export(&self) -> bool {
        !self.loading && self.error.is_none() && !self.export_in_progress
    }

    /// Days currently on screen: the first eight in week mode, the selected
    /// one in day mode.
    pub fn display_days(&self) -> &[DaySchedule] {
        match self.view_mode {
            ViewMode::Week => &self.days[..self.days.len().min(WEEK_DAYS)],
            ViewMode::Day => self
                .days
                .get(self.selected_day)
                .map(std::slice::from_ref)
                .unwrap_or(&[]),
        }
    }

    pub fn render_html(&self) -> Result<String> {
        render_schedule_html(self.display_days(), self.view_mode)
    }

    pub fn render_text(&self) -> String {
        render_text(self.display_days())
    }
}

struct TextSizes {
    weekday: &'static str,
    date: &'static str,
    detail: &'static str,
    name: &'static str,
}

struct CardView {
    background: String,
    border: &'static str,
    time_range: String,
    name: String,
    description: String,
}

struct DayColumn {
    column_class: &'static str,
    day_of_week: String,
    formatted_date: String,
    cards: Vec<CardView>,
}

#[derive(Template)]
#[template(path = "schedule.html")]
struct ScheduleTemplate {
    root_id: &'static str,
    grid_class: &'static str,
    sizes: TextSizes,
    days: Vec<DayColumn>,
}

fn time_range(activity: &Activity) -> String {
    format!(
        "{} - {}",
        format_time(&activity.activity_start_time),
        format_time(&activity.activity_stop_time)
    )
}

fn description_preview(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_PREVIEW_CHARS {
        let cut: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        description.to_string()
    }
}

/// Markup for the given days, wrapped in the `#schedule` export root.
pub fn render_schedule_html(days: &[DaySchedule], mode: ViewMode) -> Result<String> {
    let columns = days
        .iter()
        .enumerate()
        .map(|(i, day)| DayColumn {
            column_class: if i + 1 == days.len() { "border-r border-r-0" } else { "border-r" },
            day_of_week: day.day_of_week.clone(),
            formatted_date: day.formatted_date.clone(),
            cards: day
                .activities
                .iter()
                .map(|a| CardView {
                    background: activity_color(a),
                    border: border_accent_color(a),
                    time_range: time_range(a),
                    name: a.activity_name.clone(),
                    description: description_preview(&a.activity_description),
                })
                .collect(),
        })
        .collect();

    ScheduleTemplate {
        root_id: SCHEDULE_ROOT_ID,
        grid_class: mode.grid_class(),
        sizes: mode.text_sizes(),
        days: columns,
    }
    .render()
    .map_err(|e| Error::RenderError(format!("Failed to render schedule markup: {}", e)))
}

/// Full text of an activity as shown in its detail popup.
pub fn activity_details(activity: &Activity) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", activity.activity_name);
    let _ = writeln!(out, "Time: {}", time_range(activity));
    if !activity.activity_description.is_empty() {
        let _ = writeln!(out, "{}", activity.activity_description);
    }
    if let Some(details) = activity.details() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", details);
    }
    out
}

/// Plain-text calendar, one block per day.
pub fn render_text(days: &[DaySchedule]) -> String {
    let mut out = String::new();
    for (i, day) in days.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{} ({})", day.day_of_week, day.formatted_date);
        if day.activities.is_empty() {
            let _ = writeln!(out, "  No activities");
        }
        for activity in &day.activities {
            let _ = writeln!(out, "  {:<20} {}", time_range(activity), activity.activity_name);
            if !activity.activity_description.is_empty() {
                let _ = writeln!(
                    out,
                    "  {:<20} {}",
                    "",
                    description_preview(&activity.activity_description)
                );
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::style::StyleProperty;
    use crate::dom::Document;
    use crate::schedule::group_activities_by_day;

    fn days(n: u32) -> Vec<DaySchedule> {
        let activities: Vec<Activity> = (0..n)
            .map(|i| {
                Activity::new("Customer Session", &format!("April-{}-2025", i + 1), "9:00", "12:00")
                    .with_description("Serving juice")
            })
            .collect();
        group_activities_by_day(&activities).unwrap()
    }

    fn loaded(n: u32) -> ViewState {
        let mut state = ViewState::new();
        state.update(Action::Loaded(Ok(days(n))));
        state
    }

    #[test]
    fn starts_loading_in_week_mode() {
        let state = ViewState::new();
        assert!(state.loading);
        assert_eq!(state.view_mode, ViewMode::Week);
        assert!(!state.can_export());
    }

    #[test]
    fn failed_load_sets_fixed_message() {
        let mut state = ViewState::new();
        state.update(Action::Loaded(Err(Error::NetworkError("Failed to fetch: 500".into()))));
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some(LOAD_ERROR_MESSAGE));
        assert!(state.display_days().is_empty());
    }

    #[test]
    fn week_mode_shows_at_most_eight_days() {
        let state = loaded(10);
        assert_eq!(state.display_days().len(), 8);
        assert_eq!(state.display_days()[0].date, "April-1-2025");
        assert_eq!(loaded(3).display_days().len(), 3);
    }

    #[test]
    fn day_navigation_is_clamped() {
        let mut state = loaded(3);
        state.update(Action::ToggleViewMode);
        assert_eq!(state.view_mode, ViewMode::Day);

        state.update(Action::PreviousDay);
        assert_eq!(state.selected_day, 0);
        state.update(Action::NextDay);
        state.update(Action::NextDay);
        state.update(Action::NextDay);
        assert_eq!(state.selected_day, 2);
        state.update(Action::SelectDay(99));
        assert_eq!(state.selected_day, 2);

        let shown = state.display_days();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].date, "April-3-2025");
    }

    #[test]
    fn activity_popup_opens_and_closes() {
        let mut state = loaded(1);
        let activity = state.days[0].activities[0].clone();
        state.update(Action::OpenActivity(activity.clone()));
        assert_eq!(state.selected_activity, Some(activity));
        state.update(Action::CloseActivity);
        assert!(state.selected_activity.is_none());
    }

    #[test]
    fn export_flag_and_alert() {
        let mut state = loaded(1);
        assert!(state.can_export());
        state.update(Action::ExportStarted);
        assert!(!state.can_export());
        state.update(Action::ExportFinished { format: ExportFormat::Pdf, succeeded: false });
        assert!(state.can_export());
        assert_eq!(
            state.alert.as_deref(),
            Some("Failed to generate PDF. Please check the logs for errors.")
        );
        state.update(Action::ExportStarted);
        assert!(state.alert.is_none());
        state.update(Action::ExportFinished { format: ExportFormat::Png, succeeded: true });
        assert!(state.alert.is_none());
    }

    #[test]
    fn markup_has_cards_with_classifier_colors() {
        let activities = vec![
            Activity::new("Breakfast", "April-4-2025", "7:00", "9:00").with_description("Morning meal"),
            Activity::new("<Secret> Meeting", "April-4-2025", "13:30", "14:00"),
        ];
        let days = group_activities_by_day(&activities).unwrap();
        let html = render_schedule_html(&days, ViewMode::Week).unwrap();
        let doc = Document::from_html(&html, SCHEDULE_CSS);

        let root = doc.element_by_id(SCHEDULE_ROOT_ID).unwrap();
        let cards = doc.elements_with_class("activity-card");
        assert_eq!(cards.len(), 2);

        // start times sort as strings, so "13:30" lands before "7:00"
        assert!(doc.text_content(cards[0]).contains("<Secret> Meeting"));
        let breakfast = doc.inline_style(cards[1]).unwrap();
        assert_eq!(breakfast.get(StyleProperty::BackgroundColor), "#FFF2CC");
        assert_eq!(breakfast.get(StyleProperty::BorderColor), "#F59E0B");
        assert!(doc.text_content(cards[1]).contains("7:00 AM - 9:00 AM"));
        let meeting = doc.inline_style(cards[0]).unwrap();
        assert_eq!(meeting.get(StyleProperty::BackgroundColor), "#F4F6F8");
        assert!(doc.text_content(root).contains("Friday"));
        assert_eq!(doc.elements_with_class("grid-cols-8").len(), 2);
    }

    #[test]
    fn feed_color_cannot_add_declarations() {
        let activities = vec![Activity::new("Breakfast", "April-4-2025", "7:00", "9:00")
            .with_background("#fff2cc; border-left-color: red; color: lime")];
        let days = group_activities_by_day(&activities).unwrap();
        let html = render_schedule_html(&days, ViewMode::Week).unwrap();
        assert!(!html.contains("lime"));

        let doc = Document::from_html(&html, SCHEDULE_CSS);
        let cards = doc.elements_with_class("activity-card");
        let style = doc.inline_style(cards[0]).unwrap();
        assert_eq!(style.get(StyleProperty::BackgroundColor), "#FFF2CC");
        assert_eq!(style.get(StyleProperty::BorderLeftColor), "");
        assert_eq!(style.get(StyleProperty::Color), "");
    }

    #[test]
    fn empty_day_shows_placeholder() {
        let day = DaySchedule {
            activities: Vec::new(),
            ..days(1).remove(0)
        };
        let html = render_schedule_html(&[day], ViewMode::Day).unwrap();
        assert!(html.contains("No activities"));
        assert!(html.contains("grid-cols-1"));
    }

    #[test]
    fn long_descriptions_are_shortened() {
        let long = "x".repeat(60);
        assert_eq!(description_preview(&long), format!("{}...", "x".repeat(50)));
        assert_eq!(description_preview("short"), "short");
    }

    #[test]
    fn details_include_optional_content() {
        let a = Activity::new("Closing Ceremony", "April-11-2025", "14:00", "16:00")
            .with_description("Wrap-up event")
            .with_details("Final celebration");
        let text = activity_details(&a);
        assert!(text.starts_with("Closing Ceremony\nTime: 2:00 PM - 4:00 PM\nWrap-up event\n"));
        assert!(text.ends_with("Final celebration\n"));

        let plain = activity_details(&Activity::new("Breakfast", "April-11-2025", "7:00", "9:00"));
        assert_eq!(plain, "Breakfast\nTime: 7:00 AM - 9:00 AM\n");
    }

    #[test]
    fn text_rendering_lists_days() {
        let text = render_text(&days(2));
        assert!(text.starts_with("Tuesday (Apr 1)\n"));
        assert!(text.contains("9:00 AM - 12:00 PM"));
        assert!(text.contains("Wednesday (Apr 2)"));
    }
}
