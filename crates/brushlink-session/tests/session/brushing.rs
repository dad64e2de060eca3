use brushlink_core::{AppEvent, HighlightTechnique, InteractionKind, SelectionEvent};

use crate::fixture::*;

#[test]
fn test_trigger_drives_brushing() {
    let (mut session, bus) = session();

    let report = session.tick(FRAME, &aim(0.05, 0.5, 0.9, 0.0));
    assert!(report.brush.is_some());
    assert_eq!(session.currently_brushed_names(), names(&["P1", "P2"]));
    assert_eq!(session.directory().highlighted_names(), names(&["P1", "P2"]));

    session.tick(FRAME, &aim(0.15, 0.5, 0.9, 0.0));
    session.tick(FRAME, &aim(0.15, 0.5, 0.0, 0.0));
    assert!(!session.brushing().is_brushing());
    assert_eq!(session.currently_brushed_names(), names(&["P1", "P2", "P3"]));

    assert_eq!(
        interactions(&bus),
        vec![
            (InteractionKind::Brushing, "Start".to_string()),
            (InteractionKind::Brushing, "End".to_string()),
        ]
    );
    let last_names = bus.history().into_iter().rev().find_map(|event| match event {
        AppEvent::Selection(SelectionEvent::NamesChanged { names }) => Some(names),
        _ => None,
    });
    assert_eq!(last_names, Some(vec!["P1".into(), "P2".into(), "P3".into()]));
}

#[test]
fn test_hand_trigger_subtracts() {
    let (mut session, _bus) = session();
    session.tick(FRAME, &aim(0.05, 0.5, 0.9, 0.0));
    session.tick(FRAME, &aim(0.15, 0.5, 0.9, 0.0));
    session.tick(FRAME, &aim(0.15, 0.5, 0.0, 0.0));

    session.tick(FRAME, &aim(0.05, 0.5, 0.0, 0.9));
    session.tick(FRAME, &aim(0.05, 0.5, 0.0, 0.0));
    assert_eq!(session.currently_brushed_names(), names(&["P3"]));
}

#[test]
fn test_off_target_press_locks_out() {
    let (mut session, _bus) = session();
    let report = session.tick(FRAME, &aim(3.0, 0.5, 0.9, 0.0));
    assert!(report.commands.is_empty());
    assert!(session.input().is_locked());

    session.tick(FRAME, &aim(0.05, 0.5, 0.9, 0.0));
    assert!(!session.brushing().is_brushing());

    session.tick(FRAME, &aim(0.05, 0.5, 0.0, 0.0));
    session.tick(FRAME, &aim(0.05, 0.5, 0.9, 0.0));
    assert!(session.brushing().is_brushing());
}

#[test]
fn test_external_stop_holds_until_trigger_released() {
    let (mut session, bus) = session();
    let held = aim(0.05, 0.5, 0.9, 0.0);
    session.tick(FRAME, &held);
    assert!(session.brushing().is_brushing());

    assert!(session.stop_brushing());
    let report = session.tick(FRAME, &held);
    assert!(report.commands.is_empty());
    assert!(!session.brushing().is_brushing());
    session.tick(FRAME, &aim(0.15, 0.5, 0.9, 0.0));
    assert!(!session.brushing().is_brushing());
    assert_eq!(brushing_starts(&bus), 1);

    session.tick(FRAME, &aim(0.15, 0.5, 0.0, 0.0));
    session.tick(FRAME, &aim(0.15, 0.5, 0.9, 0.0));
    assert!(session.brushing().is_brushing());
    assert_eq!(brushing_starts(&bus), 2);
}

#[test]
fn test_remove_all_while_held_keeps_the_brush_running() {
    let (mut session, bus) = session();
    session.tick(FRAME, &aim(0.05, 0.5, 0.9, 0.0));

    session.remove_all_brushing();
    assert!(session.currently_brushed_names().is_empty());
    assert!(session.directory().highlighted_names().is_empty());
    assert!(session.brushing().is_brushing());

    session.tick(FRAME, &aim(0.15, 0.5, 0.9, 0.0));
    assert_eq!(session.currently_brushed_names(), names(&["P2", "P3"]));
    assert_eq!(session.directory().highlighted_names(), names(&["P2", "P3"]));
    assert_eq!(brushing_starts(&bus), 1);
}

#[test]
fn test_technique_switch_mid_brush_keeps_directory_in_sync() {
    let (mut session, _bus) = session();
    let held = aim(0.05, 0.5, 0.9, 0.0);
    session.tick(FRAME, &held);

    session.set_highlight_technique(HighlightTechnique::Size);
    assert!(session.brushing().is_brushing());
    assert_eq!(
        session.directory().highlighted_names(),
        session.currently_brushed_names()
    );

    session.tick(FRAME, &held);
    assert_eq!(session.currently_brushed_names(), names(&["P1", "P2"]));
    assert_eq!(
        session.directory().highlighted_names(),
        session.currently_brushed_names()
    );
    assert!(session.directory().instances("P1").all(|e| {
        e.bound_technique() == Some(HighlightTechnique::Size) && e.is_highlighted()
    }));
}

#[test]
fn test_switching_technique_clears_selection() {
    let (mut session, _bus) = session();
    brush_p1_p2(&mut session);

    session.set_highlight_technique(HighlightTechnique::Color);
    assert!(session.currently_brushed_names().is_empty());
    assert!(session
        .directory()
        .entities()
        .iter()
        .all(|e| e.bound_technique() == Some(HighlightTechnique::Color) && !e.is_highlighted()));
}
