use super::*;

fn add(index: u32, phase: Phase) -> AnimationItem {
    AnimationItem {
        index: StatementIndex(index),
        phase,
        directive: Directive::Add {
            target: Ident::new(format!("n{index}")),
        },
    }
}

fn play(index: u32, phase: Phase) -> AnimationItem {
    AnimationItem {
        index: StatementIndex(index),
        phase,
        directive: Directive::Play(PlayKind::Create {
            target: Ident::new(format!("n{index}")),
        }),
    }
}

fn plan(items: Vec<AnimationItem>) -> AnimationPlan {
    AnimationPlan::new(items, BTreeMap::new())
}

#[test]
fn phases_play_in_enum_order_regardless_of_insertion_order() {
    let plan = plan(vec![
        play(2, Phase::Secondary),
        add(0, Phase::Setup),
        play(1, Phase::Primary),
    ]);
    let phases: Vec<Phase> = plan.playback().iter().map(|b| b.phase).collect();
    assert_eq!(phases, [Phase::Setup, Phase::Primary, Phase::Secondary]);
}

#[test]
fn same_index_items_in_a_phase_form_one_simultaneous_batch() {
    let plan = plan(vec![
        play(5, Phase::Primary),
        play(3, Phase::Primary),
        play(5, Phase::Primary),
    ]);
    let batches = plan.playback();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].index(), Some(StatementIndex(3)));
    assert_eq!(batches[0].items.len(), 1);
    assert_eq!(batches[1].index(), Some(StatementIndex(5)));
    assert_eq!(batches[1].items.len(), 2);
}

#[test]
fn static_items_are_added_before_the_phase_plays() {
    let plan = plan(vec![
        play(1, Phase::Secondary),
        add(2, Phase::Secondary),
    ]);
    let batches = plan.playback();
    assert_eq!(batches.len(), 2);
    assert!(!batches[0].animated);
    assert!(batches[0].index().is_none());
    assert!(batches[1].animated);
}

#[test]
fn deferred_sweeps_materialize_against_current_handles() {
    let mut handles = BTreeMap::new();
    let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
    handles.insert(
        Ident::new("f"),
        Handle::new(Geometry::Curve {
            surface: Ident::synthetic("global-axis"),
            points: points.clone(),
        }),
    );

    let anim = DeferredAnim::SweepAlong {
        dot: Ident::new("d"),
        plot: Ident::new("f"),
        domain: SweepRange { from: 0.0, to: 1.0 },
    };
    let materialized = anim.materialize(&handles).unwrap();
    assert_eq!(materialized.target, Ident::new("d"));
    assert_eq!(materialized.waypoints, points);

    let missing = DeferredAnim::SweepAlong {
        dot: Ident::new("d"),
        plot: Ident::new("ghost"),
        domain: SweepRange { from: 0.0, to: 1.0 },
    };
    assert!(matches!(
        missing.materialize(&handles),
        Err(ScriptError::Graph(_))
    ));
}
