use std::cell::RefCell;
use std::rc::Rc;

use chartkit::ChartError;
use chartkit::api::{ChartEngine, ConfigOverrides};
use chartkit::charts::ChartKind;
use chartkit::core::{Segment, Viewport};
use chartkit::extensions::{ChartPlugin, PluginContext, PluginEvent};
use chartkit::layout::HeuristicTextMeasurer;
use chartkit::render::{Color, NullRenderer};

#[derive(Clone)]
struct RecordingPlugin {
    id: String,
    events: Rc<RefCell<Vec<(PluginEvent, PluginContext)>>>,
}

impl RecordingPlugin {
    fn new(id: impl Into<String>, events: Rc<RefCell<Vec<(PluginEvent, PluginContext)>>>) -> Self {
        Self {
            id: id.into(),
            events,
        }
    }
}

impl ChartPlugin for RecordingPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_event(&mut self, event: PluginEvent, context: PluginContext) {
        self.events.borrow_mut().push((event, context));
    }
}

fn event_kind(event: &PluginEvent) -> &'static str {
    match event {
        PluginEvent::PassStarted { .. } => "started",
        PluginEvent::FrameDrawn { .. } => "frame",
        PluginEvent::AnimationCompleted { .. } => "completed",
        PluginEvent::PassSuperseded { .. } => "superseded",
        PluginEvent::AnnotationHit { .. } => "hit",
        PluginEvent::RenderDeferred { .. } => "deferred",
    }
}

fn engine() -> ChartEngine<NullRenderer, HeuristicTextMeasurer> {
    ChartEngine::new(
        NullRenderer::default(),
        HeuristicTextMeasurer,
        Viewport::new(300, 300),
    )
    .expect("engine init")
}

fn shares() -> Vec<Segment> {
    vec![
        Segment::new(1.0, Color::rgb(1.0, 0.0, 0.0)).titled("left"),
        Segment::new(1.0, Color::rgb(0.0, 0.0, 1.0)).titled("right"),
    ]
}

#[test]
fn plugin_receives_deterministic_event_sequence() {
    let mut engine = engine();
    let events = Rc::new(RefCell::new(Vec::new()));
    engine
        .register_plugin(Box::new(RecordingPlugin::new("recorder", events.clone())))
        .expect("register plugin");

    let overrides = ConfigOverrides::new().set("animation_steps", 3);
    let mut first = engine
        .render(ChartKind::Pie, shares(), &overrides)
        .expect("pie")
        .expect("pass");
    engine.render_next_frame(&mut first).expect("frame");
    let mut second = engine
        .render(ChartKind::Doughnut, shares(), &overrides)
        .expect("doughnut")
        .expect("pass");
    engine.render_next_frame(&mut first).expect("stale");
    engine.render_next_frame(&mut first).expect("stale again");
    engine.run_to_completion(&mut second).expect("render");

    let kinds: Vec<_> = events
        .borrow()
        .iter()
        .map(|(event, _)| event_kind(event))
        .collect();
    assert_eq!(
        kinds,
        vec![
            "started",
            "frame",
            "started",
            "superseded",
            "frame",
            "frame",
            "frame",
            "completed",
        ]
    );

    let events = events.borrow();
    let (last_event, last_context) = events.last().expect("event");
    assert_eq!(
        *last_event,
        PluginEvent::AnimationCompleted {
            generation: second.generation()
        }
    );
    assert_eq!(last_context.kind, Some(ChartKind::Doughnut));
    assert_eq!(last_context.annotations_len, 2);
}

#[test]
fn pointer_entering_an_annotation_is_reported_once() {
    let mut engine = engine();
    let events = Rc::new(RefCell::new(Vec::new()));
    engine
        .register_plugin(Box::new(RecordingPlugin::new("recorder", events.clone())))
        .expect("register plugin");
    let mut pass = engine
        .pie(&shares(), &ConfigOverrides::new().set("animation", false))
        .expect("pie")
        .expect("pass");
    engine.run_to_completion(&mut pass).expect("render");
    events.borrow_mut().clear();

    let anchor = engine.context().registry().entries()[1].anchor();
    engine.on_pointer_move(anchor.x, anchor.y).expect("move");
    engine.on_pointer_move(anchor.x + 0.5, anchor.y).expect("move again");

    let events = events.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].0,
        PluginEvent::AnnotationHit {
            entry: 1,
            dataset_index: 0,
            index: 1,
        }
    );
}

#[test]
fn deferred_render_emits_event_with_out_of_view_context() {
    let mut engine = engine();
    let events = Rc::new(RefCell::new(Vec::new()));
    engine
        .register_plugin(Box::new(RecordingPlugin::new("recorder", events.clone())))
        .expect("register plugin");

    let overrides = ConfigOverrides::new().set("dynamic_display", true);
    assert!(engine.pie(&shares(), &overrides).expect("pie").is_none());

    let events = events.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].0,
        PluginEvent::RenderDeferred {
            kind: ChartKind::Pie
        }
    );
    assert!(!events[0].1.in_view);
}

#[test]
fn plugin_registry_rejects_empty_and_duplicate_ids() {
    let mut engine = engine();
    let events = Rc::new(RefCell::new(Vec::new()));

    let empty = engine.register_plugin(Box::new(RecordingPlugin::new("", events.clone())));
    assert!(matches!(empty, Err(ChartError::InvalidData(_))));

    engine
        .register_plugin(Box::new(RecordingPlugin::new("a", events.clone())))
        .expect("register");
    let duplicate = engine.register_plugin(Box::new(RecordingPlugin::new("a", events.clone())));
    assert!(matches!(duplicate, Err(ChartError::InvalidData(_))));

    assert_eq!(engine.plugin_count(), 1);
    assert!(engine.has_plugin("a"));
    assert!(engine.unregister_plugin("a"));
    assert!(!engine.unregister_plugin("a"));
    assert_eq!(engine.plugin_count(), 0);
}
