use juice_itinerary::export::snapshot::StyleSnapshot;
use juice_itinerary::rendering::{decode_data_url, BoxRasterizer, RasterOptions, Rasterizer};
use juice_itinerary::schedule::group_activities_by_day;
use juice_itinerary::view::{render_schedule_html, ViewMode, SCHEDULE_CSS, SCHEDULE_ROOT_ID};
use juice_itinerary::{dom::Document, Activity, Viewport};

const HEADER_GRAY: [u8; 3] = [0x1f, 0x29, 0x37];

fn contains_color(png: &[u8], rgb: [u8; 3]) -> bool {
    let img = image::load_from_memory(png).unwrap().to_rgb8();
    img.pixels().any(|p| p.0 == rgb)
}

#[test]
fn smoke_stylesheet_colors_need_capture() {
    let days = group_activities_by_day(&[Activity::new("Breakfast", "April-4-2025", "7:00", "9:00")]).unwrap();
    let html = render_schedule_html(&days, ViewMode::Day).unwrap();
    let mut doc = Document::from_html(&html, SCHEDULE_CSS);
    let root = doc.element_by_id(SCHEDULE_ROOT_ID).unwrap();

    let rasterizer = BoxRasterizer::new(Viewport { width: 320, height: 200 });
    let options = RasterOptions { pixel_ratio: 1, ..Default::default() };

    let plain = decode_data_url(&rasterizer.rasterize(&doc, root, &options).unwrap()).unwrap();
    assert!(!contains_color(&plain, HEADER_GRAY));
    // the card carries its colors inline already
    assert!(contains_color(&plain, [0xff, 0xf2, 0xcc]));

    let snapshot = StyleSnapshot::capture(&mut doc, root).unwrap();
    let pinned = decode_data_url(&rasterizer.rasterize(&doc, root, &options).unwrap()).unwrap();
    snapshot.restore(&mut doc).unwrap();
    assert!(contains_color(&pinned, HEADER_GRAY));
}
