#![cfg(feature = "cairo-backend")]

use chartkit::api::{ChartEngine, ConfigOverrides, FrameOutcome};
use chartkit::charts::ChartKind;
use chartkit::core::{CategoryData, Dataset, Segment, Viewport};
use chartkit::render::{CairoRenderer, Color, PangoTextMeasurer};

#[test]
fn cairo_renderer_draws_pie_arcs_and_exports_png() {
    let renderer = CairoRenderer::new(320, 240).expect("cairo renderer");
    let measurer = PangoTextMeasurer::new().expect("pango measurer");
    let mut engine =
        ChartEngine::new(renderer, measurer, Viewport::new(320, 240)).expect("engine init");

    let segments = vec![
        Segment::new(10.0, Color::rgb(0.9, 0.3, 0.2)),
        Segment::new(30.0, Color::rgb(0.2, 0.5, 0.9)),
    ];
    let overrides = ConfigOverrides::new().set("animation", false);
    let mut pass = engine.pie(&segments, &overrides).expect("pie").expect("pass");
    let outcome = engine.run_to_completion(&mut pass).expect("render");
    assert!(matches!(outcome, FrameOutcome::Completed(_)));
    assert!(engine.renderer().last_stats().arcs_drawn >= 2);

    let mut png = Vec::new();
    engine.renderer().write_png_to(&mut png).expect("png");
    assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[test]
fn still_export_renders_axes_text_through_pango() {
    let engine = ChartEngine::new(
        CairoRenderer::new(10, 10).expect("cairo renderer"),
        PangoTextMeasurer::new().expect("pango measurer"),
        Viewport::new(480, 320),
    )
    .expect("engine init");
    let data = CategoryData::new(["a", "b"]).with_dataset(Dataset::new("s", [1.0, 4.0]));

    let mut target = CairoRenderer::new(480, 320).expect("target renderer");
    engine
        .export_still(ChartKind::Bar, data, &ConfigOverrides::new(), &mut target)
        .expect("export");
    let stats = target.last_stats();
    assert!(stats.texts_drawn > 0);
    assert!(stats.rects_drawn >= 2);
}
