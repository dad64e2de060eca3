use std::collections::BTreeSet;

use brushlink_core::{AxisDomain, MarkId, MarkStore, VisFrame};
use brushlink_interaction::{
    reconcile, FilterAxisId, FilterEngine, Handle, HandleRef, SelectionMode, TaskThreshold,
    ThresholdDirection,
};
use brushlink_settings::FilterSettings;
use proptest::prelude::*;

fn id_set() -> impl Strategy<Value = BTreeSet<MarkId>> {
    proptest::collection::btree_set((0u32..40).prop_map(MarkId), 0..20)
}

fn handle() -> impl Strategy<Value = HandleRef> {
    (any::<bool>(), any::<bool>()).prop_map(|(x, min)| {
        HandleRef::new(
            if x { FilterAxisId::X } else { FilterAxisId::Y },
            if min { Handle::Min } else { Handle::Max },
        )
    })
}

/// One thing that can happen to the filter between checks.
#[derive(Debug, Clone)]
enum Step {
    Move(HandleRef, f32),
    Task(f32, f32, ThresholdDirection),
    Narrow(f32, f32),
}

/// Data values inside, on the edges of, and outside the starting domains.
fn task_value() -> impl Strategy<Value = f32> {
    prop_oneof![-5.0f32..15.0, Just(0.0f32), Just(5.0f32), Just(10.0f32), 10.0f32..10.1]
}

/// Track positions, biased towards the ends where snapping meets clamping.
fn position() -> impl Strategy<Value = f32> {
    prop_oneof![-1.0f32..2.0, 0.98f32..1.02, -0.02f32..0.02, 0.23f32..0.27]
}

fn direction() -> impl Strategy<Value = ThresholdDirection> {
    prop_oneof![
        Just(ThresholdDirection::Less),
        Just(ThresholdDirection::Lowest),
        Just(ThresholdDirection::More),
        Just(ThresholdDirection::Highest),
    ]
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => (handle(), position()).prop_map(|(h, p)| Step::Move(h, p)),
        1 => (task_value(), task_value(), direction()).prop_map(|(p, r, d)| Step::Task(p, r, d)),
        1 => (1.0f32..20.0, 0.5f32..10.0).prop_map(|(p, r)| Step::Narrow(p, r)),
    ]
}

proptest! {
    #[test]
    fn prop_additive_never_removes(old in id_set(), new in id_set()) {
        let result = reconcile(SelectionMode::Add, &old, &new);
        prop_assert_eq!(result, old.union(&new).copied().collect::<BTreeSet<_>>());
    }

    #[test]
    fn prop_subtractive_only_removes(old in id_set(), new in id_set()) {
        let result = reconcile(SelectionMode::Subtract, &old, &new);
        prop_assert!(result.is_subset(&old));
        prop_assert!(result.is_disjoint(&new));
        prop_assert_eq!(result, old.difference(&new).copied().collect::<BTreeSet<_>>());
    }

    #[test]
    fn prop_free_is_the_query(old in id_set(), new in id_set()) {
        prop_assert_eq!(reconcile(SelectionMode::Free, &old, &new), new);
    }

    #[test]
    fn prop_handles_stay_ordered(steps in proptest::collection::vec(step(), 1..60)) {
        let mut registry = MarkStore::new(
            VisFrame::identity(),
            AxisDomain::quantitative("Price", 0.0, 10.0),
            AxisDomain::quantitative("Rating", 0.0, 5.0),
            Vec::new(),
        ).unwrap();
        let mut filter = FilterEngine::new(
            FilterSettings::default(), 2.0, (0.0, 1.0), (-0.25, 0.25), &registry,
        ).unwrap();

        for step in steps {
            match step {
                Step::Move(handle, position) => filter.move_handle(handle, position),
                Step::Task(price, rating, direction) => filter.set_task(vec![
                    TaskThreshold::quantitative("Price", price, direction),
                    TaskThreshold::quantitative("Rating", rating, direction),
                ]),
                Step::Narrow(price_max, rating_max) => {
                    registry.rebuild(
                        AxisDomain::quantitative("Price", 0.0, price_max),
                        AxisDomain::quantitative("Rating", 0.0, rating_max),
                        Vec::new(),
                    ).unwrap();
                    filter.on_marks_rebuilt(&registry);
                }
            }
            for axis in [FilterAxisId::X, FilterAxisId::Y] {
                let range = filter.axis(axis).range();
                prop_assert!(range.track_min() <= range.min_pos());
                prop_assert!(range.min_pos() <= range.max_pos());
                prop_assert!(range.max_pos() <= range.track_max());
                if let Some(threshold) = range.threshold() {
                    prop_assert!(range.track_min() <= threshold && threshold <= range.track_max());
                }
            }
        }
    }
}
