use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context};
use brushlink::{
    init_logging, AppEvent, AxisDomain, Config, ControllerState, EntityVisual, EventBus,
    EventCategory, EventFilter, FilterAxisId, Handle, HandleRef, InputFrame, Mark, MarkRegistry,
    MarkStore, Material, MeshRenderer, Quad, Ray, Rgba, SceneColliders, SceneSetup, Session,
    SurfaceTag, TaskThreshold, ThresholdDirection, VisFrame, BUILD_DATE, VERSION,
};
use nalgebra::{Point2, Point3, UnitQuaternion, Vector3};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

const FRAME: Duration = Duration::from_millis(16);

const PRODUCTS: [(&str, f32, f32); 8] = [
    ("Muesli", 4.5, 4.1),
    ("Oats_pack", 2.0, 3.6),
    ("Granola", 6.8, 4.4),
    ("Cornflakes", 3.2, 2.9),
    ("Porridge", 1.5, 3.1),
    ("Bran", 2.7, 2.2),
    ("Puffed_Rice", 3.9, 3.4),
    ("Muesli (1)", 4.5, 4.1),
];

fn load_config() -> anyhow::Result<Config> {
    match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => Config::load_from_file(&path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(Config::load_or_default()?),
    }
}

fn scene() -> anyhow::Result<SceneSetup> {
    // The chart stands upright 1.5m in front of the user, turned slightly.
    let frame = VisFrame::new(
        Vector3::new(0.0, 1.2, 1.5),
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.2),
    );
    let x = AxisDomain::quantitative("Price", 0.0, 8.0);
    let y = AxisDomain::quantitative("Rating", 0.0, 5.0);

    let mut marks = Vec::new();
    for (i, (name, price, rating)) in PRODUCTS.iter().enumerate() {
        if name.contains(' ') {
            continue;
        }
        let local = Point3::new(price / 8.0 * 0.6 - 0.3, rating / 5.0 * 0.6 - 0.3, 0.0);
        let entity = name.trim_end_matches("_pack");
        marks.push(Mark::new(i as u32, entity, frame.to_world(&local)));
    }
    let marks = MarkStore::new(frame, x, y, marks)?;

    let entities = PRODUCTS
        .iter()
        .map(|(name, _, _)| {
            let visual = EntityVisual::new(vec![MeshRenderer::new(vec![
                Material::lit("Box", Rgba::rgb(0.8, 0.7, 0.5)),
                Material::lit("Label", Rgba::WHITE),
            ])]);
            (name.to_string(), visual)
        })
        .collect();

    let mut colliders = SceneColliders::new();
    colliders.add(Quad::new(
        frame,
        Point2::new(-0.35, -0.35),
        Point2::new(0.35, 0.35),
        SurfaceTag::Brushable,
    ));

    Ok(SceneSetup {
        marks,
        entities,
        colliders,
        x_track: (-0.3, 0.3),
        y_track: (-0.3, 0.3),
    })
}

/// A right-hand controller aimed at a local point on the chart.
fn aim(session: &Session, local: Point3<f32>, index: f32, hand: f32) -> InputFrame {
    let frame = session.registry().frame();
    let target = frame.to_world(&local);
    let origin = frame.to_world(&Point3::new(local.x, local.y, -0.6));
    InputFrame {
        left: ControllerState::default(),
        right: ControllerState {
            ray: Ray::new(origin, target - origin),
            index_trigger: index,
            hand_trigger: hand,
        },
    }
}

/// Writes interaction events as comma-separated lines, off the tick thread.
///
/// Returns the number of lines once the bus is gone.
fn spawn_trial_log(mut events: broadcast::Receiver<AppEvent>) -> thread::JoinHandle<usize> {
    thread::spawn(move || {
        let mut lines = 0;
        loop {
            match events.blocking_recv() {
                Ok(AppEvent::Interaction(event)) => {
                    lines += 1;
                    info!(
                        target: "trial_log",
                        "{:.3},{},{}",
                        event.at_seconds,
                        event.kind,
                        event.comment
                    );
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Trial log fell behind, {} events skipped", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
        lines
    })
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    info!("Brushlink {} (built {})", VERSION, BUILD_DATE);

    let config = load_config()?;
    let bus = Arc::new(EventBus::new());
    let trial_log = spawn_trial_log(bus.receiver());
    bus.subscribe(
        EventFilter::Categories(vec![EventCategory::Selection]),
        |event: AppEvent| info!("event: {}", event.description()),
    );

    let mut session = Session::new(config, scene()?, bus)?;

    // Sweep an additive brush across the upper half of the chart.
    for step in 0..30 {
        let x = -0.25 + step as f32 * 0.015;
        let frame = aim(&session, Point3::new(x, 0.2, 0.0), 0.9, 0.0);
        session.tick(FRAME, &frame);
    }
    session.tick(FRAME, &aim(&session, Point3::new(0.2, 0.2, 0.0), 0.0, 0.0));
    info!("Brushed: {:?}", session.currently_brushed_names());

    // Drag the price filter's max handle down to 4.0.
    let x_max = HandleRef::new(FilterAxisId::X, Handle::Max);
    session.begin_task(vec![TaskThreshold::quantitative(
        "Price",
        4.0,
        ThresholdDirection::Less,
    )]);
    session.grab_filter_handle(x_max)?;
    for step in 0..20 {
        let x = 0.3 - step as f32 * 0.015;
        session.tick(FRAME, &aim(&session, Point3::new(x, -0.32, 0.0), 0.0, 0.0));
    }
    session.release_filter_handle();
    session.tick(Duration::from_millis(200), &InputFrame::default());
    info!(
        "Filter max at {}, brushed after filtering: {:?}",
        session.filter().label(x_max),
        session.currently_brushed_names()
    );

    session.reset_trial();
    info!(
        "After reset: {} brushed, {} filtered out",
        session.currently_brushed_names().len(),
        session.registry().ineligible_ids().len()
    );

    // The session holds the last bus handle; dropping it closes the log.
    drop(session);
    let lines = trial_log
        .join()
        .map_err(|_| anyhow!("trial log thread panicked"))?;
    info!("Trial log wrote {} lines", lines);

    Ok(())
}
