use std::collections::BTreeMap;

use kurbo::Point;

use crate::foundation::core::{Ident, StatementIndex, SweepRange};
use crate::foundation::error::{ScriptError, ScriptResult};
use crate::scene::handle::{Geometry, Handle};

/// Ordered playback stages.
///
/// Everything in one phase is scheduled before anything in the next,
/// regardless of the order nodes were resolved in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Phase {
    /// Container creation; never animated.
    Setup,
    /// The entity's own creation.
    Primary,
    /// Derived decorations (sweep dots, vertical line sets).
    Secondary,
    /// Reserved.
    Tertiary,
    /// End-of-scene teardown; reserved.
    Cleanup,
}

impl Phase {
    /// All phases in playback order.
    pub const ALL: [Phase; 5] = [
        Phase::Setup,
        Phase::Primary,
        Phase::Secondary,
        Phase::Tertiary,
        Phase::Cleanup,
    ];
}

/// One scheduled animation step.
#[derive(Clone, Debug, serde::Serialize)]
pub struct AnimationItem {
    /// The source statement this item came from.
    pub index: StatementIndex,
    /// The playback stage.
    pub phase: Phase,
    /// What to do when the item is reached.
    pub directive: Directive,
}

impl AnimationItem {
    /// Whether this item is added instantly when its phase begins rather
    /// than played.
    pub fn is_static(&self) -> bool {
        matches!(self.directive, Directive::Add { .. })
    }
}

/// What the renderer does with an item.
#[derive(Clone, Debug, serde::Serialize)]
pub enum Directive {
    /// Add the handle to the scene immediately.
    Add {
        /// The node to add.
        target: Ident,
    },
    /// Play an animation now.
    Play(PlayKind),
    /// Play lazily: the animation must read scene state as it is at play
    /// time, so it is materialized right before playback.
    Defer(DeferredAnim),
}

/// Ready-made animations.
#[derive(Clone, Debug, serde::Serialize)]
pub enum PlayKind {
    /// Draw the target's geometry in.
    Create {
        /// The node to draw.
        target: Ident,
    },
    /// Write the target text in.
    Write {
        /// The text node to write.
        target: Ident,
    },
    /// Morph the `from` node's drawable into the `to` node's.
    Morph {
        /// The node being replaced.
        from: Ident,
        /// The node carrying the target geometry.
        to: Ident,
    },
    /// Fade the target out of view.
    FadeOut {
        /// The node to remove.
        target: Ident,
    },
}

/// A lazily materialized animation.
///
/// Inputs are captured by value; [`DeferredAnim::materialize`] turns them
/// into a concrete animation against the handles as they stand at play
/// time.
#[derive(Clone, Debug, serde::Serialize)]
pub enum DeferredAnim {
    /// Sweep a tracked dot along a plotted curve.
    SweepAlong {
        /// The dot node to move.
        dot: Ident,
        /// The curve node to follow.
        plot: Ident,
        /// The domain the sweep covers.
        domain: SweepRange,
    },
}

impl DeferredAnim {
    /// Materialize against the current handles, immediately before playback.
    pub fn materialize(&self, handles: &BTreeMap<Ident, Handle>) -> ScriptResult<MaterializedAnim> {
        match self {
            Self::SweepAlong { dot, plot, .. } => {
                let handle = handles.get(plot).ok_or_else(|| {
                    ScriptError::graph(format!("sweep target `{plot}` has no handle"))
                })?;
                let Geometry::Curve { points, .. } = &handle.geometry else {
                    return Err(ScriptError::graph(format!(
                        "sweep target `{plot}` is not a curve"
                    )));
                };
                Ok(MaterializedAnim {
                    target: dot.clone(),
                    waypoints: points.clone(),
                })
            }
        }
    }
}

/// A deferred animation made concrete.
#[derive(Clone, Debug, serde::Serialize)]
pub struct MaterializedAnim {
    /// The node the animation moves.
    pub target: Ident,
    /// Positions to move through, in order.
    pub waypoints: Vec<Point>,
}

/// The finished, phase-bucketed animation plan handed to the renderer.
#[derive(Clone, Debug, serde::Serialize)]
pub struct AnimationPlan {
    items: Vec<AnimationItem>,
    handles: BTreeMap<Ident, Handle>,
}

impl AnimationPlan {
    pub(crate) fn new(items: Vec<AnimationItem>, handles: BTreeMap<Ident, Handle>) -> Self {
        Self { items, handles }
    }

    /// All items in resolution order.
    pub fn items(&self) -> &[AnimationItem] {
        &self.items
    }

    /// The flat collection of produced handles, for the layout step.
    pub fn handles(&self) -> &BTreeMap<Ident, Handle> {
        &self.handles
    }

    /// Look up one handle.
    pub fn handle(&self, id: &Ident) -> Option<&Handle> {
        self.handles.get(id)
    }

    /// Whether the plan schedules anything at all.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Phase-ordered playback steps.
    ///
    /// Per phase: static items are added first (one step), then animated
    /// items play sorted by statement index, with equal-index items grouped
    /// into a single simultaneous step.
    pub fn playback(&self) -> Vec<Batch> {
        let mut batches = Vec::new();
        for phase in Phase::ALL {
            let in_phase: Vec<&AnimationItem> =
                self.items.iter().filter(|i| i.phase == phase).collect();

            let statics: Vec<AnimationItem> = in_phase
                .iter()
                .filter(|i| i.is_static())
                .map(|i| (*i).clone())
                .collect();
            if !statics.is_empty() {
                batches.push(Batch {
                    phase,
                    animated: false,
                    items: statics,
                });
            }

            let mut animated: Vec<AnimationItem> = in_phase
                .iter()
                .filter(|i| !i.is_static())
                .map(|i| (*i).clone())
                .collect();
            animated.sort_by_key(|i| i.index);
            for group in group_by_index(animated) {
                batches.push(Batch {
                    phase,
                    animated: true,
                    items: group,
                });
            }
        }
        batches
    }
}

/// One playback step: either an instant add or a simultaneous play group.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Batch {
    /// The stage this step belongs to.
    pub phase: Phase,
    /// Whether the step plays (true) or adds instantly (false).
    pub animated: bool,
    /// The items in this step.
    pub items: Vec<AnimationItem>,
}

impl Batch {
    /// The shared statement index of an animated step.
    pub fn index(&self) -> Option<StatementIndex> {
        if self.animated {
            self.items.first().map(|i| i.index)
        } else {
            None
        }
    }
}

/// Split a sorted item list into runs sharing one statement index.
fn group_by_index(items: Vec<AnimationItem>) -> Vec<Vec<AnimationItem>> {
    let mut groups: Vec<Vec<AnimationItem>> = Vec::new();
    for item in items {
        match groups.last_mut() {
            Some(group) if group[0].index == item.index => group.push(item),
            _ => groups.push(vec![item]),
        }
    }
    groups
}

#[cfg(test)]
#[path = "../../tests/unit/scene/plan.rs"]
mod tests;
