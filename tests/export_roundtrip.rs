//! Export pipeline against the real schedule markup

use juice_itinerary::dom::style::StyleProperty;
use juice_itinerary::dom::{Document, NodeId};
use juice_itinerary::export::{ExportEngine, ExportFormat, ExportPhase, EXPORT_MODE_CLASS};
use juice_itinerary::loader::LoadedSchedule;
use juice_itinerary::rendering::{RasterOptions, Rasterizer};
use juice_itinerary::view::{render_schedule_html, ViewMode, SCHEDULE_CSS, SCHEDULE_ROOT_ID};
use juice_itinerary::{Activity, Error, ItineraryConfig, Result};

fn schedule_document(mode: ViewMode) -> (Document, NodeId) {
    let activities = vec![
        Activity::new("Daily Fruit Run", "April-4-2025", "6:00", "8:00").with_description("Tote bags"),
        Activity::new("Breakfast", "April-4-2025", "7:00", "9:00"),
        Activity::new("Museum Trip", "April-5-2025", "13:00", "17:00")
            .with_description("A long afternoon walking through the city museum and its gardens"),
    ];
    let schedule = LoadedSchedule::from_activities(activities).unwrap();
    let html = render_schedule_html(&schedule.days, mode).unwrap();
    let doc = Document::from_html(&html, SCHEDULE_CSS);
    let root = doc.element_by_id(SCHEDULE_ROOT_ID).unwrap();
    (doc, root)
}

fn inline_records(doc: &Document, root: NodeId) -> Vec<String> {
    doc.descendant_elements(root)
        .into_iter()
        .map(|id| {
            StyleProperty::ALL
                .iter()
                .map(|p| doc.inline_style(id).unwrap().get(*p).to_string())
                .collect::<Vec<_>>()
                .join("|")
        })
        .collect()
}

struct Rejecting;

impl Rasterizer for Rejecting {
    fn rasterize(&self, _doc: &Document, _root: NodeId, _options: &RasterOptions) -> Result<String> {
        Err(Error::RenderError("rejected".into()))
    }
}

#[tokio::test]
async fn test_png_export_restores_every_inline_value() {
    let (mut doc, root) = schedule_document(ViewMode::Week);
    let before = inline_records(&doc, root);

    let engine = ExportEngine::new(&ItineraryConfig::default());
    let artifact = engine.export(&mut doc, root, ExportFormat::Png).await.unwrap();

    assert_eq!(artifact.file_name, "juice-cafe-itinerary.png");
    assert_eq!(&artifact.bytes[..4], b"\x89PNG");
    assert_eq!(inline_records(&doc, root), before);
    assert!(!doc.element(root).unwrap().has_class(EXPORT_MODE_CLASS));
    assert_eq!(engine.phase(), ExportPhase::Idle);
}

#[tokio::test]
async fn test_pdf_export_in_day_view() {
    let (mut doc, root) = schedule_document(ViewMode::Day);
    let engine = ExportEngine::new(&ItineraryConfig::default());
    let artifact = engine.export(&mut doc, root, ExportFormat::Pdf).await.unwrap();
    assert_eq!(artifact.file_name, "juice-cafe-itinerary.pdf");
    assert!(artifact.bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_rejected_rasterization_still_restores() {
    let (mut doc, root) = schedule_document(ViewMode::Week);
    let before = inline_records(&doc, root);

    let engine = ExportEngine::with_backends(
        &ItineraryConfig::default(),
        Box::new(Rejecting),
        Box::new(juice_itinerary::export::pdf::PrintPdfGenerator::default()),
    );
    let err = engine.export(&mut doc, root, ExportFormat::Png).await.unwrap_err();
    assert!(matches!(err, Error::RenderError(_)));
    assert_eq!(inline_records(&doc, root), before);
    assert!(!doc.element(root).unwrap().has_class(EXPORT_MODE_CLASS));
    assert_eq!(engine.phase(), ExportPhase::Failed);

    // the engine is usable again after a failure
    let (mut doc, root) = schedule_document(ViewMode::Week);
    assert!(engine.export(&mut doc, root, ExportFormat::Png).await.is_err());
}

#[tokio::test]
async fn test_exported_file_lands_in_output_dir() {
    let dir = std::env::temp_dir().join(format!("juice-itinerary-it-{}", std::process::id()));
    let (mut doc, root) = schedule_document(ViewMode::Week);
    let engine = ExportEngine::new(&ItineraryConfig::default());
    let artifact = engine.export(&mut doc, root, ExportFormat::Png).await.unwrap();

    let path = artifact.save_to(&dir).unwrap();
    assert_eq!(path.file_name().unwrap(), "juice-cafe-itinerary.png");
    assert_eq!(std::fs::read(&path).unwrap(), artifact.bytes);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_hostile_feed_color_exports_cleanly() {
    let activities = vec![Activity::new("Breakfast", "April-4-2025", "7:00", "9:00")
        .with_background("#fff; border-left: 3000000000px solid red; border-right: 3000000000px solid red")];
    let schedule = LoadedSchedule::from_activities(activities).unwrap();
    let html = render_schedule_html(&schedule.days, ViewMode::Week).unwrap();
    assert!(!html.contains("3000000000px"));

    let mut doc = Document::from_html(&html, SCHEDULE_CSS);
    let root = doc.element_by_id(SCHEDULE_ROOT_ID).unwrap();
    let engine = ExportEngine::new(&ItineraryConfig::default());
    let artifact = engine.export(&mut doc, root, ExportFormat::Png).await.unwrap();
    assert_eq!(&artifact.bytes[..4], b"\x89PNG");
}

#[tokio::test]
async fn test_oversized_inline_borders_do_not_overflow_layout() {
    let mut doc = Document::from_html(
        "<div id=schedule><div style='border-left: 3000000000px solid red; border-right: 3000000000px solid red'>x</div></div>",
        "",
    );
    let root = doc.element_by_id("schedule").unwrap();
    let engine = ExportEngine::new(&ItineraryConfig::default());
    let artifact = engine.export(&mut doc, root, ExportFormat::Png).await.unwrap();
    assert_eq!(&artifact.bytes[..4], b"\x89PNG");
    assert_eq!(engine.phase(), ExportPhase::Idle);
}
