use brushlink_core::{HighlightTechnique, InteractionKind};
use brushlink_interaction::{
    FilterAxisId, Handle, HandleRef, InputFrame, TaskThreshold, ThresholdDirection,
};

use crate::fixture::*;

#[test]
fn test_dragging_filter_evicts_brushed_marks() {
    let (mut session, bus) = session();
    brush_p1_p2(&mut session);

    let x_min = HandleRef::new(FilterAxisId::X, Handle::Min);
    session.grab_filter_handle(x_min).unwrap();
    let report = session.tick(SLOW, &aim(0.05, -0.4, 0.0, 0.0));
    assert_eq!(session.release_filter_handle(), Some(x_min));

    assert_eq!(report.evicted, 1);
    assert!((session.filter().position(x_min) - 0.05).abs() < 1e-6);
    assert_eq!(session.filter().label(x_min), "0.5");
    assert_eq!(session.currently_brushed_names(), names(&["P2"]));
    assert_eq!(session.directory().highlighted_names(), names(&["P2"]));
    assert_eq!(session.registry().ineligible_ids().len(), 1);

    let filter_events: Vec<String> = interactions(&bus)
        .into_iter()
        .filter(|(kind, _)| *kind == InteractionKind::Filter)
        .map(|(_, comment)| comment)
        .collect();
    assert_eq!(filter_events, vec!["Start", "End"]);
}

#[test]
fn test_threshold_past_domain_end_does_not_break_drag() {
    let (mut session, _bus) = session();
    session.begin_task(vec![TaskThreshold::quantitative(
        "Price",
        10.05,
        ThresholdDirection::More,
    )]);

    let x_max = HandleRef::new(FilterAxisId::X, Handle::Max);
    session.grab_filter_handle(x_max).unwrap();
    session.tick(SLOW, &aim(0.997, -0.4, 0.0, 0.0));
    session.release_filter_handle();

    assert_eq!(session.filter().position(x_max), 1.0);
    assert!(session.registry().ineligible_ids().is_empty());
}

#[test]
fn test_reset_trial_restores_clean_state() {
    let (mut session, _bus) = session();
    session.set_highlight_technique(HighlightTechnique::Link);
    brush_p1_p2(&mut session);
    let link_edges = session.directory().factory().link_board().borrow().edges().len();
    assert_eq!(link_edges, 3);

    session.move_filter_handle(HandleRef::new(FilterAxisId::X, Handle::Max), 0.3);
    session.tick(SLOW, &InputFrame::default());
    assert!(session.filter().is_active());

    session.reset_trial();
    assert!(session.currently_brushed_names().is_empty());
    assert!(session.directory().highlighted_names().is_empty());
    assert!(session.registry().ineligible_ids().is_empty());
    assert!(session.registry().brushed_ids().is_empty());
    assert!(!session.filter().is_active());
    assert!(session.directory().factory().link_board().borrow().edges().is_empty());
}
