use std::sync::Arc;

use brushlink_core::{AxisDomain, EventBus, InteractionKind};
use brushlink_interaction::FilterAxisId;
use brushlink_session::{Session, SessionError};

use crate::fixture::*;

#[test]
fn test_rebuild_drops_stale_selection() {
    let (mut session, bus) = session();
    brush_p1_p2(&mut session);

    let generation = session
        .rebuild_visualization(
            AxisDomain::quantitative("Calories", 0.0, 500.0),
            AxisDomain::quantitative("Rating", 0.0, 5.0),
            marks(),
        )
        .unwrap();
    assert_eq!(generation, 1);
    assert!(session.currently_brushed_names().is_empty());
    assert!(session.directory().highlighted_names().is_empty());
    assert_eq!(session.filter().axis(FilterAxisId::X).domain().field, "Calories");
    assert!(interactions(&bus)
        .iter()
        .any(|(kind, comment)| *kind == InteractionKind::DimensionChange
            && comment == "Calories / Rating"));
}

#[test]
fn test_layout_switch_keeps_brushed_names_lit() {
    let (mut session, _bus) = session();
    brush_p1_p2(&mut session);

    let first_p1 = session.directory().instances("P1").next().unwrap().id();
    let name_count = session.switch_layout(&[(first_p1, false)]);
    assert_eq!(name_count, 4);
    assert_eq!(session.directory().instances("P1").count(), 1);
    assert_eq!(session.directory().highlighted_names(), names(&["P1", "P2"]));
    assert!(session.directory().instances("P1").all(|e| e.is_highlighted()));
    assert!(!session.directory().entity(first_p1).unwrap().is_highlighted());
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = config();
    config.input.press_threshold = 1.5;
    let result = Session::new(config, scene(), Arc::new(EventBus::new()));
    assert!(matches!(result, Err(SessionError::Settings(_))));
}

#[test]
fn test_record_selection_checks_names() {
    let (mut session, bus) = session();
    assert!(session.record_selection("P4"));
    assert!(!session.record_selection("Tea"));
    assert_eq!(
        interactions(&bus),
        vec![(InteractionKind::ProductSelect, "P4".to_string())]
    );
}
