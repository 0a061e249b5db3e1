use chartkit::api::{ChartEngine, ConfigOverrides, FrameOutcome};
use chartkit::charts::ChartKind;
use chartkit::core::{CategoryData, Dataset, Segment, Viewport};
use chartkit::interaction::AnnotationEntry;
use chartkit::layout::HeuristicTextMeasurer;
use chartkit::render::{Color, DrawCommand, NullRenderer};
use chartkit::ChartError;

fn engine() -> ChartEngine<NullRenderer, HeuristicTextMeasurer> {
    ChartEngine::new(
        NullRenderer::default(),
        HeuristicTextMeasurer,
        Viewport::new(640, 400),
    )
    .expect("engine init")
}

fn sales() -> CategoryData {
    CategoryData::new(["Jan", "Feb", "Mar"])
        .with_dataset(Dataset::new("North", [12.0, 19.0, 3.0]))
        .with_dataset(Dataset::new("South", [7.0, 11.0, 5.0]))
}

fn shares() -> Vec<Segment> {
    vec![
        Segment::new(10.0, Color::rgb(0.9, 0.2, 0.2)).titled("A"),
        Segment::new(30.0, Color::rgb(0.2, 0.2, 0.9)).titled("B"),
    ]
}

#[test]
fn engine_rejects_empty_viewport() {
    let result = ChartEngine::new(
        NullRenderer::default(),
        HeuristicTextMeasurer,
        Viewport::new(0, 300),
    );
    assert!(matches!(result, Err(ChartError::InvalidViewport { .. })));
}

#[test]
fn animated_bar_pass_draws_every_step_then_records_annotations() {
    let mut engine = engine();
    let overrides = ConfigOverrides::new().set("animation_steps", 5);
    let mut pass = engine.bar(&sales(), &overrides).expect("bar").expect("pass");
    assert!(engine.context().registry().is_empty());

    let mut drawn = 0;
    let outcome = loop {
        match engine.render_next_frame(&mut pass).expect("frame") {
            FrameOutcome::Drawn(_) => drawn += 1,
            other => break other,
        }
    };
    assert_eq!(drawn, 4);
    assert!(matches!(outcome, FrameOutcome::Completed(frame) if frame.fraction == 1.0));
    assert_eq!(engine.renderer().frames_rendered, 5);
    assert_eq!(engine.context().registry().len(), 6);
    assert!(
        engine
            .context()
            .registry()
            .entries()
            .iter()
            .all(|entry| matches!(entry, AnnotationEntry::Rect { .. }))
    );
    assert_eq!(
        engine.render_next_frame(&mut pass).expect("after completion"),
        FrameOutcome::Exhausted
    );
}

#[test]
fn every_chart_type_completes_with_defaults() {
    let mut engine = engine();
    let no_animation = ConfigOverrides::new().set("animation", false);
    for kind in ChartKind::ALL {
        let mut pass = if kind.uses_segments() {
            engine.render(kind, shares(), &no_animation)
        } else {
            engine.render(kind, sales(), &no_animation)
        }
        .expect("prepare")
        .expect("pass");
        let outcome = engine.run_to_completion(&mut pass).expect("render");
        assert!(matches!(outcome, FrameOutcome::Completed(_)), "{kind}");
        assert!(!engine.context().registry().is_empty(), "{kind}");
        assert_eq!(engine.context().kind(), Some(kind));
    }
}

#[test]
fn mismatched_data_is_rejected_without_superseding() {
    let mut engine = engine();
    let mut pass = engine
        .line(&sales(), &ConfigOverrides::new())
        .expect("line")
        .expect("pass");
    let error = engine
        .render(ChartKind::Pie, sales(), &ConfigOverrides::new())
        .expect_err("pie needs segments");
    assert!(matches!(error, ChartError::InvalidData(_)));
    assert!(matches!(
        engine.render_next_frame(&mut pass).expect("frame"),
        FrameOutcome::Drawn(_)
    ));
}

#[test]
fn unknown_option_names_are_rejected() {
    let mut engine = engine();
    let overrides = ConfigOverrides::new().set("no_such_option", 1);
    assert!(matches!(
        engine.bar(&sales(), &overrides),
        Err(ChartError::InvalidConfig(_))
    ));
    assert!(engine.set_library_overrides(overrides).is_err());
}

#[test]
fn newer_pass_supersedes_older_one() {
    let mut engine = engine();
    let overrides = ConfigOverrides::new();
    let mut first = engine.bar(&sales(), &overrides).expect("bar").expect("pass");
    engine.render_next_frame(&mut first).expect("first frame");

    let mut second = engine.line(&sales(), &overrides).expect("line").expect("pass");
    assert!(second.generation() > first.generation());
    assert_eq!(
        engine.render_next_frame(&mut first).expect("stale frame"),
        FrameOutcome::Superseded
    );
    assert_eq!(engine.renderer().frames_rendered, 1);

    let outcome = engine.run_to_completion(&mut second).expect("render");
    assert!(matches!(outcome, FrameOutcome::Completed(_)));
    assert!(
        engine
            .context()
            .registry()
            .entries()
            .iter()
            .all(|entry| matches!(entry, AnnotationEntry::Point { .. }))
    );
}

#[test]
fn finish_pass_skips_to_the_final_frame() {
    let mut engine = engine();
    let mut pass = engine
        .doughnut(&shares(), &ConfigOverrides::new())
        .expect("doughnut")
        .expect("pass");
    engine.render_next_frame(&mut pass).expect("first frame");
    let outcome = engine.finish_pass(&mut pass).expect("finish");
    assert!(matches!(outcome, FrameOutcome::Completed(_)));
    assert!(pass.is_complete());
    assert_eq!(engine.renderer().frames_rendered, 2);
    assert_eq!(engine.context().registry().len(), 2);
}

#[test]
fn deferred_render_replays_once_when_visible() {
    let mut engine = engine();
    let overrides = ConfigOverrides::new().set("dynamic_display", true);
    assert!(engine.pie(&shares(), &overrides).expect("pie").is_none());
    assert!(engine.context().display().deferred.is_some());
    assert_eq!(engine.renderer().frames_rendered, 0);

    let mut pass = engine
        .set_visible(true)
        .expect("replay")
        .expect("deferred pass");
    assert_eq!(pass.kind(), ChartKind::Pie);
    assert!(engine.context().display().deferred.is_none());
    engine.run_to_completion(&mut pass).expect("render");

    assert!(engine.set_visible(false).expect("hide").is_none());
    assert!(engine.set_visible(true).expect("show").is_none());

    let visible_pass = engine.pie(&shares(), &overrides).expect("pie");
    assert!(visible_pass.is_some());
}

#[test]
fn pie_tooltip_reports_label_value_and_percentage() {
    let mut engine = engine();
    let overrides = ConfigOverrides::new()
        .set("animation", false)
        .set("annotate_display", true);
    let mut pass = engine.pie(&shares(), &overrides).expect("pie").expect("pass");
    engine.run_to_completion(&mut pass).expect("render");

    let entries = engine.context().registry().entries().to_vec();
    assert_eq!(entries.len(), 2);
    let first = entries[0].anchor();
    let tooltip = engine
        .tooltip_at(first.x, first.y)
        .expect("tooltip")
        .expect("hit");
    assert_eq!(tooltip.text, "A: 10 (25%)");

    let second = entries[1].anchor();
    let tooltip = engine
        .on_pointer_move(second.x, second.y)
        .expect("tooltip")
        .expect("hit");
    assert_eq!(tooltip.text, "B: 30 (75%)");
    assert_eq!(engine.context().hover().hovered(), Some(1));

    assert!(engine.tooltip_at(0.0, 0.0).expect("miss").is_none());
    engine.on_pointer_leave();
    assert!(engine.context().hover().cursor().is_none());
}

#[test]
fn tooltips_stay_hidden_unless_enabled() {
    let mut engine = engine();
    let overrides = ConfigOverrides::new().set("animation", false);
    let mut pass = engine.pie(&shares(), &overrides).expect("pie").expect("pass");
    engine.run_to_completion(&mut pass).expect("render");

    let anchor = engine.context().registry().entries()[0].anchor();
    assert!(engine.hit_test(anchor.x, anchor.y).is_some());
    assert!(engine.tooltip_at(anchor.x, anchor.y).expect("tooltip").is_none());
}

#[test]
fn custom_tooltip_template_and_separators_apply() {
    let mut engine = engine();
    let overrides = ConfigOverrides::new()
        .set("animation", false)
        .set("annotate_display", true)
        .set("annotate_label", "<%=dataset + '/' + label + '=' + value%>")
        .set("decimal_separator", ",")
        .set("thousand_separator", ".");
    let data = CategoryData::new(["Q1"]).with_dataset(Dataset::new("Revenue", [1234.5]));
    let mut pass = engine.bar(&data, &overrides).expect("bar").expect("pass");
    engine.run_to_completion(&mut pass).expect("render");

    let anchor = engine.context().registry().entries()[0].anchor();
    let tooltip = engine
        .tooltip_at(anchor.x, anchor.y)
        .expect("tooltip")
        .expect("hit");
    assert_eq!(tooltip.text, "Revenue/Q1=1.234,5");
}

#[test]
fn in_graph_data_labels_appear_on_the_final_frame_only() {
    let mut engine = engine();
    let overrides = ConfigOverrides::new()
        .set("animation_steps", 3)
        .set("in_graph_data_show", true);
    let mut pass = engine.bar(&sales(), &overrides).expect("bar").expect("pass");

    engine.render_next_frame(&mut pass).expect("first frame");
    let first_texts = engine
        .renderer()
        .last_frame
        .as_ref()
        .expect("frame")
        .texts()
        .iter()
        .filter(|text| text.text == "19")
        .count();
    assert_eq!(first_texts, 0);

    engine.run_to_completion(&mut pass).expect("render");
    let frame = engine.renderer().last_frame.as_ref().expect("frame");
    assert!(frame.texts().iter().any(|text| text.text == "19"));
}

#[test]
fn unknown_template_variables_fail_before_the_pass_starts() {
    let mut engine = engine();
    let mut pass = engine
        .bar(&sales(), &ConfigOverrides::new().set("animation_steps", 2))
        .expect("bar")
        .expect("pass");

    let bad_data_label = ConfigOverrides::new()
        .set("in_graph_data_show", true)
        .set("in_graph_data_template", "<%=nope%>");
    assert!(matches!(
        engine.bar(&sales(), &bad_data_label),
        Err(ChartError::Template { offset: 3, .. })
    ));
    let bad_tooltip = ConfigOverrides::new().set("annotate_label", "<%=label + vaule%>");
    assert!(matches!(
        engine.pie(&shares(), &bad_tooltip),
        Err(ChartError::Template { .. })
    ));
    assert!(matches!(
        engine.export_still(
            ChartKind::Bar,
            sales(),
            &bad_data_label,
            &mut NullRenderer::default()
        ),
        Err(ChartError::Template { .. })
    ));

    // The rejected calls neither superseded nor advanced the running pass.
    assert!(matches!(
        engine.render_next_frame(&mut pass).expect("frame"),
        FrameOutcome::Drawn(_)
    ));
    assert!(matches!(
        engine.render_next_frame(&mut pass).expect("final frame"),
        FrameOutcome::Completed(_)
    ));
    assert_eq!(engine.context().registry().len(), 6);
}

#[test]
fn export_still_leaves_the_chart_context_untouched() {
    let engine = engine();
    let mut target = NullRenderer::default();
    engine
        .export_still(ChartKind::PolarArea, shares(), &ConfigOverrides::new(), &mut target)
        .expect("export");

    assert_eq!(target.frames_rendered, 1);
    assert!(engine.context().registry().is_empty());
    assert_eq!(engine.context().generation().0, 0);
    let frame = target.last_frame.expect("frame");
    assert!(
        frame
            .commands
            .iter()
            .any(|command| matches!(command, DrawCommand::Arc(_)))
    );
}

#[test]
fn kind_layer_sits_between_library_and_call_overrides() {
    let mut engine = engine();
    engine
        .set_library_overrides(ConfigOverrides::new().set("graph_title", "Library"))
        .expect("library");
    engine
        .set_kind_overrides(
            ChartKind::Line,
            ConfigOverrides::new().set("graph_title", "Lines"),
        )
        .expect("kind");

    let line = engine
        .resolve_config(ChartKind::Line, &ConfigOverrides::new())
        .expect("line config");
    assert_eq!(line.graph_title, "Lines");
    let bar = engine
        .resolve_config(ChartKind::Bar, &ConfigOverrides::new())
        .expect("bar config");
    assert_eq!(bar.graph_title, "Library");
    let call = engine
        .resolve_config(
            ChartKind::Line,
            &ConfigOverrides::new().set("graph_title", "Call"),
        )
        .expect("call config");
    assert_eq!(call.graph_title, "Call");
}
