//! Scene dependency graph and its fixed-point resolver.
//!
//! Entities stream in from the evaluator and become nodes keyed by id, with
//! dependency edges derived structurally per entity kind. Nodes live in an
//! arena addressed through a name → index table, so the worklist's stall
//! detection compares index sets instead of graph structure.

use std::collections::BTreeMap;

use kurbo::{Arc, BezPath, Point, Shape, Vec2};

use crate::eval::evaluator::{Evaluated, EvaluatedEntity, Plot};
use crate::foundation::core::{Direction, Ident, StatementIndex, SweepRange};
use crate::foundation::error::{ScriptError, ScriptResult};
use crate::foundation::math::{SAMPLE_COUNT, linspace, point_on_circle};
use crate::program::model::{
    ElbowDef, Entity, Extent, MathFunction, ObjectTransform, Position, SurfaceKind, SweepDot,
};
use crate::scene::handle::{Geometry, Handle, SegmentKind};
use crate::scene::plan::{AnimationItem, AnimationPlan, DeferredAnim, Directive, Phase, PlayKind};

/// A node in the scene dependency graph.
#[derive(Clone, Debug, serde::Serialize)]
pub struct SceneNode {
    /// The node's id; entity ids and bound names share one namespace.
    pub id: Ident,
    /// The statement that produced the node.
    pub index: StatementIndex,
    /// The node's value.
    pub value: NodeValue,
    /// Ids this node cannot resolve before.
    pub dependencies: Vec<Ident>,
    /// The renderer handle; set exactly once and never recomputed.
    pub handle: Option<Handle>,
}

/// What a scene node holds.
#[derive(Clone, Debug, serde::Serialize)]
pub enum NodeValue {
    /// A coordinate container.
    Surface(SurfaceKind),
    /// A refined function to plot.
    Plot(MathFunction),
    /// A renderable entity.
    Entity(Entity),
    /// A pending removal of the named entity.
    Clear(Ident),
}

/// The scene graph: node arena, id lookup, and accumulated plan items.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    lookup: BTreeMap<Ident, usize>,
    items: Vec<AnimationItem>,
}

impl SceneGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in registration order.
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// Look up a node by id.
    pub fn get(&self, id: &Ident) -> Option<&SceneNode> {
        self.lookup.get(id).map(|&i| &self.nodes[i])
    }

    /// Register one evaluated entity.
    pub fn insert(&mut self, entity: EvaluatedEntity) -> ScriptResult<()> {
        match entity.value {
            Evaluated::Plot(plot) => {
                let surface = self.ensure_surface(plot.function.surface(), entity.index);
                self.insert_plot(plot, entity.index, surface);
                Ok(())
            }
            Evaluated::Entity(e) => {
                let deps = entity_node_deps(&e);
                self.add_node(e.id().clone(), entity.index, NodeValue::Entity(e), deps);
                Ok(())
            }
            Evaluated::Group(group) => {
                self.add_node(
                    group.id.clone(),
                    entity.index,
                    NodeValue::Surface(group.kind.surface()),
                    Vec::new(),
                );
                for member in group.members {
                    self.insert_member(member, &group.id)?;
                }
                Ok(())
            }
            Evaluated::Clear(target) => {
                self.add_node(
                    Ident::synthetic(format!("clear-{}", entity.index)),
                    entity.index,
                    NodeValue::Clear(target.clone()),
                    vec![target],
                );
                Ok(())
            }
        }
    }

    fn insert_plot(&mut self, plot: Plot, index: StatementIndex, surface: Ident) {
        let id = plot.function.id().clone();
        self.add_node(
            id.clone(),
            index,
            NodeValue::Plot(plot.function),
            vec![surface],
        );
        if plot.tracked_dot {
            let dot_id = Ident::synthetic(format!("{id}::dot"));
            self.add_node(
                dot_id.clone(),
                index,
                NodeValue::Entity(Entity::SweepDot(SweepDot {
                    id: dot_id.clone(),
                    target: id.clone(),
                })),
                vec![id],
            );
        }
    }

    fn insert_member(&mut self, member: EvaluatedEntity, block: &Ident) -> ScriptResult<()> {
        match member.value {
            Evaluated::Plot(plot) => {
                self.insert_plot(plot, member.index, block.clone());
                Ok(())
            }
            Evaluated::Entity(e) => {
                let mut deps = entity_node_deps(&e);
                if matches!(e, Entity::Charge(_)) {
                    deps.push(block.clone());
                }
                self.add_node(e.id().clone(), member.index, NodeValue::Entity(e), deps);
                Ok(())
            }
            _ => Err(ScriptError::structure(format!(
                "block `{block}` may only contain plots and charges"
            ))),
        }
    }

    /// The shared surface for plots shown outside any block, created lazily
    /// the first time a surface of that kind is needed.
    fn ensure_surface(&mut self, kind: SurfaceKind, index: StatementIndex) -> Ident {
        let id = Ident::synthetic(match kind {
            SurfaceKind::Axis => "global-axis",
            SurfaceKind::Polar => "global-polar",
            SurfaceKind::Field => "global-field",
        });
        if !self.lookup.contains_key(&id) {
            self.add_node(id.clone(), index, NodeValue::Surface(kind), Vec::new());
        }
        id
    }

    fn add_node(
        &mut self,
        id: Ident,
        index: StatementIndex,
        value: NodeValue,
        dependencies: Vec<Ident>,
    ) {
        let node = SceneNode {
            id: id.clone(),
            index,
            value,
            dependencies,
            handle: None,
        };
        // Repeated references to one name converge on one node.
        match self.lookup.get(&id) {
            Some(&i) => self.nodes[i] = node,
            None => {
                self.lookup.insert(id, self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    /// Resolve every node with a fixed-point worklist.
    ///
    /// Each pass resolves all nodes whose dependencies are resolved. An
    /// empty pending set with unresolved nodes remaining, or a pending set
    /// repeating twice in a row, means the graph is stuck (cycle or missing
    /// dependency) and the run fails naming every unresolved id.
    #[tracing::instrument(skip(self))]
    pub fn resolve(&mut self) -> ScriptResult<()> {
        let mut previous: Option<Vec<usize>> = None;
        let mut stalls = 0usize;
        loop {
            let pending = self.pending();
            if pending.is_empty() {
                let unresolved = self.unresolved_ids();
                if unresolved.is_empty() {
                    return Ok(());
                }
                return Err(self.stuck_error(&unresolved));
            }
            if previous.as_deref() == Some(pending.as_slice()) {
                stalls += 1;
                if stalls >= 2 {
                    return Err(self.stuck_error(&self.unresolved_ids()));
                }
            } else {
                stalls = 0;
            }
            for &i in &pending {
                self.resolve_node(i)?;
            }
            previous = Some(pending);
        }
    }

    /// Consume the graph into the finished plan.
    pub fn into_plan(self) -> AnimationPlan {
        let handles = self
            .nodes
            .into_iter()
            .filter_map(|node| {
                let SceneNode { id, handle, .. } = node;
                handle.map(|h| (id, h))
            })
            .collect();
        AnimationPlan::new(self.items, handles)
    }

    /// Unresolved nodes whose dependencies are all resolved.
    fn pending(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| {
                node.handle.is_none()
                    && node.dependencies.iter().all(|dep| {
                        self.lookup
                            .get(dep)
                            .is_some_and(|&i| self.nodes[i].handle.is_some())
                    })
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn unresolved_ids(&self) -> Vec<Ident> {
        self.nodes
            .iter()
            .filter(|n| n.handle.is_none())
            .map(|n| n.id.clone())
            .collect()
    }

    fn stuck_error(&self, unresolved: &[Ident]) -> ScriptError {
        let names: Vec<&str> = unresolved.iter().map(|id| id.as_str()).collect();
        ScriptError::graph(format!(
            "unable to resolve scene dependencies; unresolved nodes: [{}]",
            names.join(", ")
        ))
    }

    /// Indices of nodes depending on `id`.
    fn dependants(&self, id: &Ident) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.dependencies.contains(id))
            .map(|(i, _)| i)
            .collect()
    }

    fn node_by_id(&self, id: &Ident) -> ScriptResult<&SceneNode> {
        self.lookup
            .get(id)
            .map(|&i| &self.nodes[i])
            .ok_or_else(|| ScriptError::graph(format!("unknown node `{id}`")))
    }

    fn resolved_handle(&self, id: &Ident) -> ScriptResult<&Handle> {
        self.node_by_id(id)?
            .handle
            .as_ref()
            .ok_or_else(|| ScriptError::graph(format!("dependency `{id}` is not resolved")))
    }

    fn resolve_node(&mut self, idx: usize) -> ScriptResult<()> {
        if self.nodes[idx].handle.is_some() {
            return Ok(());
        }
        self.resolve_position(idx)?;

        let node = self.nodes[idx].clone();
        let (handle, items) = match &node.value {
            NodeValue::Surface(kind) => self.resolve_surface(&node, *kind),
            NodeValue::Plot(function) => self.resolve_plot(&node, function)?,
            NodeValue::Entity(entity) => self.resolve_entity(&node, entity)?,
            NodeValue::Clear(target) => (
                Handle::new(Geometry::Tombstone),
                vec![AnimationItem {
                    index: node.index,
                    phase: Phase::Primary,
                    directive: Directive::Play(PlayKind::FadeOut {
                        target: target.clone(),
                    }),
                }],
            ),
        };
        self.nodes[idx].handle = Some(handle);
        self.items.extend(items);

        // Freshly resolved dots may unblock decorations anchored on them;
        // pulling those in is best-effort, the worklist retries the rest.
        if matches!(&self.nodes[idx].value, NodeValue::Entity(Entity::Dot(_))) {
            let id = self.nodes[idx].id.clone();
            for dependant in self.dependants(&id) {
                if let Err(err) = self.resolve_node(dependant) {
                    tracing::debug!(
                        node = %self.nodes[dependant].id,
                        %err,
                        "deferred dependant resolution to a later pass"
                    );
                }
            }
        }
        Ok(())
    }

    /// Rewrite an angle-relative position to an absolute coordinate before
    /// the node resolves. Direction-relative positions stay symbolic; the
    /// handle records the anchor for render-time adjacency.
    fn resolve_position(&mut self, idx: usize) -> ScriptResult<()> {
        let entity = match &self.nodes[idx].value {
            NodeValue::Entity(e) => e.clone(),
            _ => return Ok(()),
        };
        let Some(Position::AngleOn { anchor, angle }) = entity.position().cloned() else {
            return Ok(());
        };

        let anchor_node = self.node_by_id(&anchor)?;
        if !matches!(&anchor_node.value, NodeValue::Entity(Entity::Circle(_))) {
            return Err(ScriptError::type_error(format!(
                "angle-relative positions require a circle anchor, `{anchor}` is not one"
            )));
        }
        let handle = anchor_node
            .handle
            .as_ref()
            .ok_or_else(|| ScriptError::graph(format!("anchor `{anchor}` is not resolved")))?;
        let Geometry::Circle { center, radius } = &handle.geometry else {
            return Err(ScriptError::graph(format!(
                "anchor `{anchor}` resolved to a non-circle handle"
            )));
        };
        let point = point_on_circle(*center, *radius, angle);
        self.nodes[idx].value =
            NodeValue::Entity(entity.with_position(Position::Absolute(point)));
        Ok(())
    }

    /// A surface sizes itself to the union of its dependants' plot ranges.
    fn resolve_surface(&self, node: &SceneNode, kind: SurfaceKind) -> (Handle, Vec<AnimationItem>) {
        let mut x_range: Option<SweepRange> = None;
        let mut y_range: Option<SweepRange> = None;
        for other in &self.nodes {
            if other.dependencies.contains(&node.id)
                && let NodeValue::Plot(function) = &other.value
            {
                let (px, py) = plot_ranges(function);
                x_range = Some(x_range.map_or(px, |r| r.union(px)));
                y_range = Some(y_range.map_or(py, |r| r.union(py)));
            }
        }
        let empty = SweepRange { from: 0.0, to: 0.0 };
        let handle = Handle::new(Geometry::Surface {
            kind,
            x_range: x_range.unwrap_or(empty),
            y_range: y_range.unwrap_or(empty),
        });
        let items = vec![AnimationItem {
            index: node.index,
            phase: Phase::Setup,
            directive: Directive::Add {
                target: node.id.clone(),
            },
        }];
        (handle, items)
    }

    fn resolve_plot(
        &self,
        node: &SceneNode,
        function: &MathFunction,
    ) -> ScriptResult<(Handle, Vec<AnimationItem>)> {
        let surface = node.dependencies.first().cloned().ok_or_else(|| {
            ScriptError::graph(format!("plot `{}` has no container", node.id))
        })?;
        self.resolved_handle(&surface)?;

        let domain = function.domain().ok_or_else(|| {
            ScriptError::structure(format!("plot `{}` was not refined against a sweep", node.id))
        })?;
        let points = linspace(domain, SAMPLE_COUNT)
            .into_iter()
            .map(|t| function.sample_point(t))
            .collect::<ScriptResult<Vec<Point>>>()?;

        let handle = Handle::new(Geometry::Curve { surface, points });
        let items = vec![AnimationItem {
            index: node.index,
            phase: Phase::Primary,
            directive: Directive::Play(PlayKind::Create {
                target: node.id.clone(),
            }),
        }];
        Ok((handle, items))
    }

    fn resolve_entity(
        &self,
        node: &SceneNode,
        entity: &Entity,
    ) -> ScriptResult<(Handle, Vec<AnimationItem>)> {
        let create = |handle: Handle| {
            let items = vec![AnimationItem {
                index: node.index,
                phase: Phase::Primary,
                directive: Directive::Play(PlayKind::Create {
                    target: node.id.clone(),
                }),
            }];
            (handle, items)
        };

        match entity {
            Entity::Dot(e) => {
                let (at, align) = self.place(&e.position)?;
                Ok(create(Handle {
                    geometry: Geometry::Dot { at },
                    align,
                }))
            }
            Entity::Line(e) => {
                let (from, to) = self.endpoints(&e.extent)?;
                Ok(create(Handle::new(Geometry::Segment {
                    from,
                    to,
                    kind: SegmentKind::Line,
                })))
            }
            Entity::Arrow(e) => {
                let (from, to) = self.endpoints(&e.extent)?;
                Ok(create(Handle::new(Geometry::Segment {
                    from,
                    to,
                    kind: SegmentKind::Arrow,
                })))
            }
            Entity::Brace(e) => {
                let (from, to) = self.endpoints(&e.extent)?;
                Ok(create(Handle::new(Geometry::Segment {
                    from,
                    to,
                    kind: SegmentKind::Brace,
                })))
            }
            Entity::Elbow(e) => Ok(create(Handle::new(Geometry::Path(elbow_path(
                &e.definition,
            ))))),
            Entity::Square(e) => {
                let (center, align) = self.place(&e.position)?;
                let half = e.side / 2.0;
                Ok(create(Handle {
                    geometry: Geometry::Path(rect_path(center, half * 2.0, half * 2.0)),
                    align,
                }))
            }
            Entity::Rectangle(e) => {
                let (center, align) = self.place(&e.position)?;
                Ok(create(Handle {
                    geometry: Geometry::Path(rect_path(center, e.width, e.height)),
                    align,
                }))
            }
            Entity::RegularPolygon(e) => {
                let (center, align) = self.place(&e.position)?;
                Ok(create(Handle {
                    geometry: Geometry::Path(regular_polygon_path(center, e.radius, e.sides)),
                    align,
                }))
            }
            Entity::Polygon(e) => Ok(create(Handle::new(Geometry::Path(polygon_path(
                &e.points,
            ))))),
            Entity::Circle(e) => {
                let (center, align) = self.place(&e.position)?;
                Ok(create(Handle {
                    geometry: Geometry::Circle {
                        center,
                        radius: e.radius,
                    },
                    align,
                }))
            }
            Entity::Lens(e) => {
                let (center, align) = self.place(&e.position)?;
                Ok(create(Handle {
                    geometry: Geometry::Path(lens_path(center, e.focal_length, e.thickness)),
                    align,
                }))
            }
            Entity::Rays(e) => Ok(create(Handle::new(Geometry::LineSet {
                segments: ray_segments(e.from, e.to, e.count, e.direction),
            }))),
            Entity::Charge(e) => {
                let (center, align) = self.place(&e.position)?;
                Ok(create(Handle {
                    geometry: Geometry::Circle {
                        center,
                        radius: CHARGE_RADIUS,
                    },
                    align,
                }))
            }
            Entity::Text(e) => {
                let (at, align) = match &e.position {
                    Some(position) => {
                        let (point, align) = self.place(position)?;
                        (align.is_none().then_some(point), align)
                    }
                    None => (None, None),
                };
                let handle = Handle {
                    geometry: Geometry::Text {
                        content: e.content.clone(),
                        latex: e.latex,
                        at,
                    },
                    align,
                };
                let items = vec![AnimationItem {
                    index: node.index,
                    phase: Phase::Primary,
                    directive: Directive::Play(PlayKind::Write {
                        target: node.id.clone(),
                    }),
                }];
                Ok((handle, items))
            }
            Entity::SweepDot(e) => self.resolve_sweep_dot(node, e),
            Entity::VLines(e) => {
                let function = self.plot_of(&e.target)?;
                let domain = function.domain().ok_or_else(|| {
                    ScriptError::structure(format!("plot `{}` has no domain", e.target))
                })?;
                let mut segments = Vec::with_capacity(e.count as usize);
                for x in linspace(domain, e.count as usize) {
                    let top = function.sample_point(x)?;
                    segments.push((Point::new(top.x, 0.0), top));
                }
                let handle = Handle::new(Geometry::LineSet { segments });
                let items = vec![AnimationItem {
                    index: node.index,
                    phase: Phase::Secondary,
                    directive: Directive::Play(PlayKind::Create {
                        target: node.id.clone(),
                    }),
                }];
                Ok((handle, items))
            }
            Entity::Morph(m) => self.resolve_morph(node, m),
        }
    }

    fn resolve_sweep_dot(
        &self,
        node: &SceneNode,
        dot: &SweepDot,
    ) -> ScriptResult<(Handle, Vec<AnimationItem>)> {
        let function = self.plot_of(&dot.target)?;
        let domain = function.domain().ok_or_else(|| {
            ScriptError::structure(format!("plot `{}` has no domain", dot.target))
        })?;
        let start = function.sample_point(domain.from)?;

        let handle = Handle::new(Geometry::Dot { at: start });
        // The dot is added instantly; the sweep must read the dot as it
        // stands when its phase plays, so it stays deferred until then.
        let items = vec![
            AnimationItem {
                index: node.index,
                phase: Phase::Secondary,
                directive: Directive::Add {
                    target: node.id.clone(),
                },
            },
            AnimationItem {
                index: node.index,
                phase: Phase::Secondary,
                directive: Directive::Defer(DeferredAnim::SweepAlong {
                    dot: node.id.clone(),
                    plot: dot.target.clone(),
                    domain,
                }),
            },
        ];
        Ok((handle, items))
    }

    fn resolve_morph(
        &self,
        node: &SceneNode,
        morph: &ObjectTransform,
    ) -> ScriptResult<(Handle, Vec<AnimationItem>)> {
        let from_node = self.node_by_id(&morph.from)?;
        let NodeValue::Plot(from_fn) = &from_node.value else {
            return Err(ScriptError::type_error(format!(
                "can only morph plotted functions, `{}` is not one",
                morph.from
            )));
        };
        let surface = from_node.dependencies.first().cloned().ok_or_else(|| {
            ScriptError::graph(format!("plot `{}` has no container", morph.from))
        })?;
        self.resolved_handle(&morph.from)?;

        let mut to_fn = morph.to.clone();
        copy_ranges(from_fn, &mut to_fn)?;
        let domain = to_fn.domain().ok_or_else(|| {
            ScriptError::structure(format!("morph source `{}` was never swept", morph.from))
        })?;
        let points = linspace(domain, SAMPLE_COUNT)
            .into_iter()
            .map(|t| to_fn.sample_point(t))
            .collect::<ScriptResult<Vec<Point>>>()?;

        let handle = Handle::new(Geometry::Curve { surface, points });
        let items = vec![AnimationItem {
            index: node.index,
            phase: Phase::Primary,
            directive: Directive::Play(PlayKind::Morph {
                from: morph.from.clone(),
                to: node.id.clone(),
            }),
        }];
        Ok((handle, items))
    }

    /// The refined function behind a plot id.
    fn plot_of(&self, id: &Ident) -> ScriptResult<&MathFunction> {
        match &self.node_by_id(id)?.value {
            NodeValue::Plot(function) => Ok(function),
            _ => Err(ScriptError::type_error(format!(
                "expected `{id}` to be a plotted function"
            ))),
        }
    }

    /// Turn a declared position into a concrete point and adjacency record.
    fn place(&self, position: &Position) -> ScriptResult<(Point, Option<(Ident, Direction)>)> {
        match position {
            Position::Absolute(p) => Ok((*p, None)),
            Position::Relative { anchor, placement } => {
                self.resolved_handle(anchor)?;
                Ok((Point::ZERO, Some((anchor.clone(), *placement))))
            }
            Position::AngleOn { anchor, .. } => Err(ScriptError::graph(format!(
                "angle-relative position on `{anchor}` was not rewritten"
            ))),
        }
    }

    /// Concrete endpoints of a line-like extent.
    fn endpoints(&self, extent: &Extent) -> ScriptResult<(Point, Point)> {
        match extent {
            Extent::Coords { from, to } => Ok((*from, *to)),
            Extent::AngleLength { from, angle, length } => Ok((
                *from,
                *from + Vec2::new(angle.cos(), angle.sin()) * *length,
            )),
            Extent::Between { from, to } => {
                let start = self.anchor_of(from)?;
                let end = self.anchor_of(to)?;
                Ok((start, end))
            }
        }
    }

    fn anchor_of(&self, id: &Ident) -> ScriptResult<Point> {
        self.resolved_handle(id)?.anchor_point().ok_or_else(|| {
            ScriptError::graph(format!("`{id}` has no geometry to anchor on"))
        })
    }
}

/// Structural dependencies of a renderable entity.
fn entity_node_deps(entity: &Entity) -> Vec<Ident> {
    let mut deps = Vec::new();
    match entity {
        Entity::Line(e) => extent_node_deps(&e.extent, &mut deps),
        Entity::Arrow(e) => extent_node_deps(&e.extent, &mut deps),
        Entity::Brace(e) => extent_node_deps(&e.extent, &mut deps),
        Entity::SweepDot(e) => deps.push(e.target.clone()),
        Entity::VLines(e) => deps.push(e.target.clone()),
        Entity::Morph(e) => deps.push(e.from.clone()),
        _ => {}
    }
    if let Some(anchor) = entity.position().and_then(|p| p.anchor()) {
        deps.push(anchor.clone());
    }
    deps
}

fn extent_node_deps(extent: &Extent, deps: &mut Vec<Ident>) {
    if let Extent::Between { from, to } = extent {
        deps.push(from.clone());
        deps.push(to.clone());
    }
}

const CHARGE_RADIUS: f64 = 0.3;

/// Length of a rendered ray.
const RAY_LENGTH: f64 = 3.0;

fn plot_ranges(function: &MathFunction) -> (SweepRange, SweepRange) {
    let empty = SweepRange { from: 0.0, to: 0.0 };
    match function {
        MathFunction::Regular(f) => (f.domain.unwrap_or(empty), f.range.unwrap_or(empty)),
        MathFunction::Polar(f) => (f.domain.unwrap_or(empty), f.range.unwrap_or(empty)),
        MathFunction::Parametric(f) => (f.x_range.unwrap_or(empty), f.y_range.unwrap_or(empty)),
    }
}

fn copy_ranges(from: &MathFunction, to: &mut MathFunction) -> ScriptResult<()> {
    match (from, to) {
        (MathFunction::Regular(a), MathFunction::Regular(b)) => {
            b.domain = a.domain;
            b.range = a.range;
        }
        (MathFunction::Polar(a), MathFunction::Polar(b)) => {
            b.domain = a.domain;
            b.range = a.range;
        }
        (MathFunction::Parametric(a), MathFunction::Parametric(b)) => {
            b.domain = a.domain;
            b.x_range = a.x_range;
            b.y_range = a.y_range;
        }
        _ => {
            return Err(ScriptError::type_error(
                "cannot morph between functions of different kinds",
            ));
        }
    }
    Ok(())
}

fn rect_path(center: Point, width: f64, height: f64) -> BezPath {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let mut path = BezPath::new();
    path.move_to((center.x - hw, center.y - hh));
    path.line_to((center.x + hw, center.y - hh));
    path.line_to((center.x + hw, center.y + hh));
    path.line_to((center.x - hw, center.y + hh));
    path.close_path();
    path
}

fn regular_polygon_path(center: Point, radius: f64, sides: u32) -> BezPath {
    let mut path = BezPath::new();
    let n = sides.max(3);
    for k in 0..n {
        let angle = std::f64::consts::FRAC_PI_2 + std::f64::consts::TAU * f64::from(k) / f64::from(n);
        let vertex = point_on_circle(center, radius, angle);
        if k == 0 {
            path.move_to(vertex);
        } else {
            path.line_to(vertex);
        }
    }
    path.close_path();
    path
}

fn polygon_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    for (k, point) in points.iter().enumerate() {
        if k == 0 {
            path.move_to(*point);
        } else {
            path.line_to(*point);
        }
    }
    path.close_path();
    path
}

/// Two arms plus a small angle arc at the corner.
fn elbow_path(definition: &ElbowDef) -> BezPath {
    let (vertex, first, second) = match definition {
        ElbowDef::ThreePoint {
            vertex,
            first,
            second,
        } => (*vertex, *first, *second),
        ElbowDef::AngleLength { from, angle, length } => {
            let arm = *from + Vec2::new(angle.cos(), angle.sin()) * *length;
            let reference = *from + Vec2::new(*length, 0.0);
            (*from, reference, arm)
        }
    };

    let mut path = BezPath::new();
    path.move_to(first);
    path.line_to(vertex);
    path.line_to(second);

    let start_angle = (first - vertex).atan2();
    let end_angle = (second - vertex).atan2();
    let arc = Arc {
        center: vertex,
        radii: Vec2::new(ELBOW_ARC_RADIUS, ELBOW_ARC_RADIUS),
        start_angle,
        sweep_angle: end_angle - start_angle,
        x_rotation: 0.0,
    };
    for el in arc.to_path(ARC_TOLERANCE).elements() {
        path.push(*el);
    }
    path
}

const ELBOW_ARC_RADIUS: f64 = 0.4;
const ARC_TOLERANCE: f64 = 0.1;

/// A vesica-shaped lens outline: two opposing quadratic bulges.
fn lens_path(center: Point, focal_length: f64, thickness: f64) -> BezPath {
    let half_height = (focal_length.abs() / 2.0).max(thickness);
    let bulge = thickness;
    let top = Point::new(center.x, center.y + half_height);
    let bottom = Point::new(center.x, center.y - half_height);
    let mut path = BezPath::new();
    path.move_to(top);
    path.quad_to(Point::new(center.x + bulge, center.y), bottom);
    path.quad_to(Point::new(center.x - bulge, center.y), top);
    path.close_path();
    path
}

fn ray_segments(from: Point, to: Point, count: u32, direction: Direction) -> Vec<(Point, Point)> {
    let dir = match direction {
        Direction::Left => Vec2::new(-1.0, 0.0),
        Direction::Right => Vec2::new(1.0, 0.0),
        Direction::Above => Vec2::new(0.0, 1.0),
        Direction::Below => Vec2::new(0.0, -1.0),
    };
    let span = to - from;
    let count = count.max(1) as usize;
    let mut segments = Vec::with_capacity(count);
    for k in 0..count {
        let t = if count == 1 {
            0.5
        } else {
            k as f64 / (count - 1) as f64
        };
        let origin = from + span * t;
        segments.push((origin, origin + dir * RAY_LENGTH));
    }
    segments
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
