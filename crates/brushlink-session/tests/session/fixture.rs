use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use brushlink_core::{
    AppEvent, AxisDomain, EventBus, EventBusConfig, InteractionKind, Mark, MarkStore, Quad, Ray,
    SceneColliders, SurfaceTag, VisFrame,
};
use brushlink_highlight::EntityVisual;
use brushlink_interaction::{ControllerState, InputFrame, SelectionMode};
use brushlink_session::{SceneSetup, Session};
use brushlink_settings::Config;
use nalgebra::{Point2, Point3, Vector3};

pub const FRAME: Duration = Duration::from_millis(100);
pub const SLOW: Duration = Duration::from_millis(200);

pub fn marks() -> Vec<Mark> {
    vec![
        Mark::new(1, "P1", Point3::new(0.0, 0.5, 0.0)),
        Mark::new(2, "P2", Point3::new(0.1, 0.5, 0.0)),
        Mark::new(3, "P3", Point3::new(0.2, 0.5, 0.0)),
        Mark::new(4, "P4", Point3::new(0.5, 0.5, 0.0)),
    ]
}

pub fn scene() -> SceneSetup {
    let mut colliders = SceneColliders::new();
    colliders.add(Quad::new(
        VisFrame::identity(),
        Point2::new(-0.5, -0.5),
        Point2::new(1.0, 1.0),
        SurfaceTag::Brushable,
    ));
    SceneSetup {
        marks: MarkStore::new(
            VisFrame::identity(),
            AxisDomain::quantitative("Price", 0.0, 10.0),
            AxisDomain::quantitative("Rating", 0.0, 5.0),
            marks(),
        )
        .unwrap(),
        entities: ["P1", "P1 (1)", "P2", "P3", "P4_pack"]
            .iter()
            .map(|name| (name.to_string(), EntityVisual::default()))
            .collect(),
        colliders,
        x_track: (0.0, 1.0),
        y_track: (0.0, 1.0),
    }
}

pub fn config() -> Config {
    let mut config = Config::default();
    config.brushing.brush_radius = 0.06;
    config
}

pub fn session() -> (Session, Arc<EventBus>) {
    let bus = Arc::new(EventBus::with_config(EventBusConfig {
        enable_history: true,
        ..EventBusConfig::default()
    }));
    let session = Session::new(config(), scene(), bus.clone()).unwrap();
    (session, bus)
}

/// Right controller pointing straight at local (x, y) with trigger values.
pub fn aim(x: f32, y: f32, index: f32, hand: f32) -> InputFrame {
    InputFrame {
        left: ControllerState::default(),
        right: ControllerState {
            ray: Ray::new(Point3::new(x, y, -1.0), Vector3::z()),
            index_trigger: index,
            hand_trigger: hand,
        },
    }
}

pub fn names(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn interactions(bus: &EventBus) -> Vec<(InteractionKind, String)> {
    bus.history()
        .into_iter()
        .filter_map(|event| match event {
            AppEvent::Interaction(e) => Some((e.kind, e.comment)),
            _ => None,
        })
        .collect()
}

pub fn brushing_starts(bus: &EventBus) -> usize {
    interactions(bus)
        .iter()
        .filter(|(kind, comment)| *kind == InteractionKind::Brushing && comment == "Start")
        .count()
}

pub fn brush_p1_p2(session: &mut Session) {
    session.set_brush_point(Point3::new(0.05, 0.5, 0.0));
    assert!(session.start_brushing(SelectionMode::Add));
    session.tick(FRAME, &InputFrame::default());
    assert!(session.stop_brushing());
    assert_eq!(session.currently_brushed_names(), names(&["P1", "P2"]));
}
