//! Scenescript is the execution core of a small declarative language for
//! mathematical and geometric animated scenes.
//!
//! A program defines named values (functions, points, shapes) and show
//! statements that turn those values into visible, animated entities,
//! optionally grouped into coordinate containers. This crate takes the typed
//! program produced by the front end and turns it into a phase-bucketed
//! animation plan for an external rendering engine.
//!
//! # Pipeline overview
//!
//! 1. **Inject**: `Program -> Program` (prove every reference defined,
//!    materialize used-but-never-shown values as implicit shows, renumber
//!    statement indices; [`resolve_dependencies`])
//! 2. **Evaluate**: `Program -> Vec<EvaluatedEntity>` (step through
//!    statements, refine functions against their sweeps; [`Evaluator`])
//! 3. **Resolve**: `EvaluatedEntity stream -> SceneGraph` (key entities by
//!    id, derive dependency edges, resolve in dependency order with stall
//!    detection; [`SceneGraph`])
//! 4. **Plan**: `SceneGraph -> AnimationPlan` (flat, phase-tagged,
//!    order-tagged items plus the handle collection for layout)
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: sampling uses a fixed point count, so the
//!   same program always produces the same plan.
//! - **Fail fast**: every error aborts the run; no partial plans.
//! - **Single-threaded**: one pipeline owns the store and the graph for the
//!   duration of a run; the worklist is the only suspension concept.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod eval;
mod expression;
mod foundation;
mod pipeline;
mod program;
mod scene;
mod store;

pub use eval::evaluator::{Evaluated, EvaluatedEntity, Evaluator, Group, Plot};
pub use expression::ast::{BinaryOp, Expr, Func, UnaryOp};
pub use foundation::core::{
    BezPath, Direction, Ident, Point, StatementIndex, SWEEP_EPSILON, SweepRange, Vec2,
};
pub use foundation::error::{ScriptError, ScriptResult};
pub use foundation::math::SAMPLE_COUNT;
pub use pipeline::compile_program;
pub use program::inject::resolve_dependencies;
pub use program::model::{
    Animatable, Animation, Arrow, Block, BlockKind, Brace, Charge, Circle, Clear, Definition, Dot,
    Elbow, ElbowDef, Entity, Extent, Lens, Line, MathFunction, MorphExpr, ObjectTransform,
    ParametricFunction, PolarFunction, Polygon, Position, Program, Rays, Rectangle,
    RegularFunction, RegularPolygon, Square, Statement, StatementKind, SurfaceKind, SweepDot, Text,
    Transform, VLines, Value,
};
pub use scene::graph::{NodeValue, SceneGraph, SceneNode};
pub use scene::handle::{Geometry, Handle, SegmentKind};
pub use scene::plan::{
    AnimationItem, AnimationPlan, Batch, DeferredAnim, Directive, MaterializedAnim, Phase,
    PlayKind,
};
pub use store::SymbolStore;
