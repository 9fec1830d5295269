use kurbo::Point;

use crate::expression::ast::Expr;
use crate::foundation::core::{Direction, Ident, StatementIndex, SweepRange};
use crate::foundation::error::{ScriptError, ScriptResult};

/// A complete program as produced by the front end.
///
/// The core does not re-validate grammar-level shape; it only checks
/// variable-reference semantics (see the injection pass).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Program {
    /// Statements in program order.
    pub statements: Vec<Statement>,
}

impl Program {
    /// Build a program, assigning contiguous indices in list order.
    pub fn new(kinds: Vec<StatementKind>) -> Self {
        Self {
            statements: kinds
                .into_iter()
                .enumerate()
                .map(|(i, kind)| Statement {
                    index: StatementIndex(i as u32),
                    kind,
                })
                .collect(),
        }
    }

    /// The statement carrying `index`, if any.
    pub fn statement_at(&self, index: StatementIndex) -> Option<&Statement> {
        self.statements.iter().find(|s| s.index == index)
    }
}

/// One indexed statement.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Statement {
    /// Ordering key; contiguous and unique after the injection pass.
    pub index: StatementIndex,
    /// What the statement does.
    pub kind: StatementKind,
}

/// The closed set of statement kinds.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum StatementKind {
    /// Bind a name to a value. Pure data; performs no evaluation.
    Definition(Definition),
    /// Show a value, optionally swept over a domain.
    Animation(Animation),
    /// A coordinate-container block grouping member show statements.
    Block(Block),
    /// Remove an entity's visual presence (bindings are kept).
    Clear(Clear),
}

/// A name → value binding.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Definition {
    /// The bound name.
    pub name: Ident,
    /// The bound value.
    pub value: Value,
}

/// Anything a definition can bind.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Value {
    /// A numeric literal.
    Number(f64),
    /// A math function.
    Function(MathFunction),
    /// A geometric or textual entity.
    Entity(Entity),
}

impl Value {
    /// The same value with its id replaced by `id`.
    ///
    /// Binding a definition stamps the bound name onto the value so the name
    /// and the entity id stay one and the same. Numbers carry no id.
    pub fn with_id(self, id: &Ident) -> Self {
        match self {
            Self::Number(n) => Self::Number(n),
            Self::Function(f) => Self::Function(f.with_id(id.clone())),
            Self::Entity(e) => Self::Entity(e.with_id(id.clone())),
        }
    }
}

/// The coordinate surface a plot is drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SurfaceKind {
    /// Cartesian axes.
    Axis,
    /// Polar plane.
    Polar,
    /// Electric field region.
    Field,
}

impl std::fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Axis => "axis",
            Self::Polar => "polar",
            Self::Field => "field",
        })
    }
}

/// A math function in one of the three supported forms.
///
/// Domain and range fields are `None` until the evaluator refines the
/// function against a sweep; refined copies are what reach the scene graph.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum MathFunction {
    /// `y = f(x)`.
    Regular(RegularFunction),
    /// `x = x(t), y = y(t)`.
    Parametric(ParametricFunction),
    /// `r = f(θ)`.
    Polar(PolarFunction),
}

impl MathFunction {
    /// The function's id.
    pub fn id(&self) -> &Ident {
        match self {
            Self::Regular(f) => &f.id,
            Self::Parametric(f) => &f.id,
            Self::Polar(f) => &f.id,
        }
    }

    /// The same function under a different id.
    pub fn with_id(mut self, id: Ident) -> Self {
        match &mut self {
            Self::Regular(f) => f.id = id,
            Self::Parametric(f) => f.id = id,
            Self::Polar(f) => f.id = id,
        }
        self
    }

    /// The surface kind this function is plotted on.
    pub fn surface(&self) -> SurfaceKind {
        match self {
            Self::Regular(_) | Self::Parametric(_) => SurfaceKind::Axis,
            Self::Polar(_) => SurfaceKind::Polar,
        }
    }

    /// The declared free-variable names.
    pub fn variables(&self) -> &[Ident] {
        match self {
            Self::Regular(f) => &f.variables,
            Self::Parametric(f) => &f.variables,
            Self::Polar(f) => &f.variables,
        }
    }

    /// The evaluation domain, once refined.
    pub fn domain(&self) -> Option<SweepRange> {
        match self {
            Self::Regular(f) => f.domain,
            Self::Parametric(f) => f.domain,
            Self::Polar(f) => f.domain,
        }
    }

    /// Sample the curve at parameter `t`, in Cartesian coordinates.
    ///
    /// This is the concrete callable derived from the (substituted)
    /// expressions; it requires every remaining free variable other than
    /// the sweep variable to be gone.
    pub fn sample_point(&self, t: f64) -> ScriptResult<Point> {
        let var = self.variables().first().cloned().ok_or_else(|| {
            ScriptError::structure(format!("function `{}` declares no sweep variable", self.id()))
        })?;
        match self {
            Self::Regular(f) => Ok(Point::new(t, f.expression.eval_at(&var, t)?)),
            Self::Polar(f) => {
                let r = f.expression.eval_at(&var, t)?;
                Ok(Point::new(r * t.cos(), r * t.sin()))
            }
            Self::Parametric(f) => {
                let (x_expr, y_expr) = match f.expressions.as_slice() {
                    [x, y] => (x, y),
                    _ => {
                        return Err(ScriptError::structure(format!(
                            "parametric function `{}` requires an x and a y component",
                            f.id
                        )));
                    }
                };
                Ok(Point::new(x_expr.eval_at(&var, t)?, y_expr.eval_at(&var, t)?))
            }
        }
    }
}

/// `y = f(x)`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RegularFunction {
    /// Stable id (the bound name, once defined).
    pub id: Ident,
    /// Free-variable names; the first is the sweep variable.
    pub variables: Vec<Ident>,
    /// The defining expression.
    pub expression: Expr,
    /// Evaluation domain, set by the evaluator.
    pub domain: Option<SweepRange>,
    /// Sampled value range, set by the evaluator.
    pub range: Option<SweepRange>,
}

/// `x = x(t), y = y(t)`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ParametricFunction {
    /// Stable id (the bound name, once defined).
    pub id: Ident,
    /// Free-variable names; the first is the sweep variable.
    pub variables: Vec<Ident>,
    /// Component expressions, x first then y.
    pub expressions: Vec<Expr>,
    /// Evaluation domain for the parameter, set by the evaluator.
    pub domain: Option<SweepRange>,
    /// Sampled x range, set by the evaluator.
    pub x_range: Option<SweepRange>,
    /// Sampled y range, set by the evaluator.
    pub y_range: Option<SweepRange>,
}

/// `r = f(θ)`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PolarFunction {
    /// Stable id (the bound name, once defined).
    pub id: Ident,
    /// Free-variable names; the first is the sweep variable.
    pub variables: Vec<Ident>,
    /// The defining expression.
    pub expression: Expr,
    /// Evaluation domain for θ, set by the evaluator.
    pub domain: Option<SweepRange>,
    /// Sampled r range, set by the evaluator.
    pub range: Option<SweepRange>,
}

/// Where an entity sits.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Position {
    /// An absolute coordinate.
    Absolute(Point),
    /// Adjacent to another entity in a given direction.
    Relative {
        /// The anchor entity.
        anchor: Ident,
        /// Which side of the anchor.
        placement: Direction,
    },
    /// On the rim of a circle entity at a given angle.
    AngleOn {
        /// The anchor circle.
        anchor: Ident,
        /// Angle in radians.
        angle: f64,
    },
}

impl Position {
    /// The anchor this position references, if it is relative.
    pub fn anchor(&self) -> Option<&Ident> {
        match self {
            Self::Absolute(_) => None,
            Self::Relative { anchor, .. } | Self::AngleOn { anchor, .. } => Some(anchor),
        }
    }
}

/// How a line-like entity spans space.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Extent {
    /// Between two absolute coordinates.
    Coords {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
    },
    /// Between two named entities.
    Between {
        /// Start entity.
        from: Ident,
        /// End entity.
        to: Ident,
    },
    /// From an origin along an angle for a length.
    AngleLength {
        /// Origin point.
        from: Point,
        /// Angle in radians.
        angle: f64,
        /// Length of the span.
        length: f64,
    },
}

/// How an elbow (angle marker) is defined.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum ElbowDef {
    /// Vertex plus a point on each arm.
    ThreePoint {
        /// The corner.
        vertex: Point,
        /// A point on the first arm.
        first: Point,
        /// A point on the second arm.
        second: Point,
    },
    /// An arm at an angle against a horizontal reference arm.
    AngleLength {
        /// The corner.
        from: Point,
        /// Angle in radians.
        angle: f64,
        /// Arm length.
        length: f64,
    },
}

/// A dot marking a single position.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Dot {
    /// Stable id.
    pub id: Ident,
    /// Where the dot sits.
    pub position: Position,
}

/// A straight line segment.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Line {
    /// Stable id.
    pub id: Ident,
    /// The span of the line.
    pub extent: Extent,
}

/// An arrow.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Arrow {
    /// Stable id.
    pub id: Ident,
    /// The span of the arrow.
    pub extent: Extent,
}

/// A curly brace spanning two points or entities.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Brace {
    /// Stable id.
    pub id: Ident,
    /// The span the brace covers.
    pub extent: Extent,
}

/// An angle marker between two arms.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Elbow {
    /// Stable id.
    pub id: Ident,
    /// How the arms are defined.
    pub definition: ElbowDef,
}

/// An axis-aligned square.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Square {
    /// Stable id.
    pub id: Ident,
    /// Center position.
    pub position: Position,
    /// Side length.
    pub side: f64,
}

/// An axis-aligned rectangle.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Rectangle {
    /// Stable id.
    pub id: Ident,
    /// Center position.
    pub position: Position,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// A regular polygon.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RegularPolygon {
    /// Stable id.
    pub id: Ident,
    /// Center position.
    pub position: Position,
    /// Circumradius.
    pub radius: f64,
    /// Number of sides.
    pub sides: u32,
}

/// An arbitrary polygon from explicit vertices.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Polygon {
    /// Stable id.
    pub id: Ident,
    /// Vertices in draw order.
    pub points: Vec<Point>,
}

/// A circle.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Circle {
    /// Stable id.
    pub id: Ident,
    /// Center position.
    pub position: Position,
    /// Radius.
    pub radius: f64,
}

/// A thin lens (optics).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Lens {
    /// Stable id.
    pub id: Ident,
    /// Center position.
    pub position: Position,
    /// Focal length.
    pub focal_length: f64,
    /// Lens thickness.
    pub thickness: f64,
}

/// A bundle of parallel rays (optics).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Rays {
    /// Stable id.
    pub id: Ident,
    /// Start of the emission span.
    pub from: Point,
    /// End of the emission span.
    pub to: Point,
    /// Number of rays.
    pub count: u32,
    /// Direction of propagation.
    pub direction: Direction,
}

/// A point charge (electric field blocks).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Charge {
    /// Stable id.
    pub id: Ident,
    /// Where the charge sits.
    pub position: Position,
    /// Signed magnitude; negative values are negative charges.
    pub magnitude: f64,
}

/// A piece of text, plain or LaTeX.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Text {
    /// Stable id.
    pub id: Ident,
    /// The text content.
    pub content: String,
    /// Optional placement; `None` leaves placement to the layout step.
    pub position: Option<Position>,
    /// Free-form render options (font size and the like).
    pub options: serde_json::Value,
    /// Whether the content is LaTeX source.
    pub latex: bool,
}

/// A tracked dot swept along a plotted curve.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SweepDot {
    /// Stable id.
    pub id: Ident,
    /// The plot the dot travels on.
    pub target: Ident,
}

/// Vertical lines dropped from a plotted curve to its axis.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct VLines {
    /// Stable id.
    pub id: Ident,
    /// The plot the lines drop from.
    pub target: Ident,
    /// How many lines.
    pub count: u32,
}

/// A morph from one bound function entity to a computed target.
///
/// Produced by the evaluator from a [`MorphExpr`]; never written by the
/// front end directly.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ObjectTransform {
    /// Stable id.
    pub id: Ident,
    /// The entity being morphed away from.
    pub from: Ident,
    /// The computed target function.
    pub to: MathFunction,
}

/// The closed set of renderable entities.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Entity {
    /// A dot.
    Dot(Dot),
    /// A line segment.
    Line(Line),
    /// An arrow.
    Arrow(Arrow),
    /// A curly brace.
    Brace(Brace),
    /// An angle marker.
    Elbow(Elbow),
    /// A square.
    Square(Square),
    /// A rectangle.
    Rectangle(Rectangle),
    /// A regular polygon.
    RegularPolygon(RegularPolygon),
    /// An arbitrary polygon.
    Polygon(Polygon),
    /// A circle.
    Circle(Circle),
    /// A thin lens.
    Lens(Lens),
    /// A ray bundle.
    Rays(Rays),
    /// A point charge.
    Charge(Charge),
    /// Text.
    Text(Text),
    /// A tracked dot on a curve.
    SweepDot(SweepDot),
    /// Vertical lines to a curve.
    VLines(VLines),
    /// A morph between entities.
    Morph(ObjectTransform),
}

impl Entity {
    /// The entity's id.
    pub fn id(&self) -> &Ident {
        match self {
            Self::Dot(e) => &e.id,
            Self::Line(e) => &e.id,
            Self::Arrow(e) => &e.id,
            Self::Brace(e) => &e.id,
            Self::Elbow(e) => &e.id,
            Self::Square(e) => &e.id,
            Self::Rectangle(e) => &e.id,
            Self::RegularPolygon(e) => &e.id,
            Self::Polygon(e) => &e.id,
            Self::Circle(e) => &e.id,
            Self::Lens(e) => &e.id,
            Self::Rays(e) => &e.id,
            Self::Charge(e) => &e.id,
            Self::Text(e) => &e.id,
            Self::SweepDot(e) => &e.id,
            Self::VLines(e) => &e.id,
            Self::Morph(e) => &e.id,
        }
    }

    /// The same entity under a different id.
    pub fn with_id(mut self, id: Ident) -> Self {
        match &mut self {
            Self::Dot(e) => e.id = id,
            Self::Line(e) => e.id = id,
            Self::Arrow(e) => e.id = id,
            Self::Brace(e) => e.id = id,
            Self::Elbow(e) => e.id = id,
            Self::Square(e) => e.id = id,
            Self::Rectangle(e) => e.id = id,
            Self::RegularPolygon(e) => e.id = id,
            Self::Polygon(e) => e.id = id,
            Self::Circle(e) => e.id = id,
            Self::Lens(e) => e.id = id,
            Self::Rays(e) => e.id = id,
            Self::Charge(e) => e.id = id,
            Self::Text(e) => e.id = id,
            Self::SweepDot(e) => e.id = id,
            Self::VLines(e) => e.id = id,
            Self::Morph(e) => e.id = id,
        }
        self
    }

    /// The entity's declared position, when it has one.
    pub fn position(&self) -> Option<&Position> {
        match self {
            Self::Dot(e) => Some(&e.position),
            Self::Square(e) => Some(&e.position),
            Self::Rectangle(e) => Some(&e.position),
            Self::RegularPolygon(e) => Some(&e.position),
            Self::Circle(e) => Some(&e.position),
            Self::Lens(e) => Some(&e.position),
            Self::Charge(e) => Some(&e.position),
            Self::Text(e) => e.position.as_ref(),
            _ => None,
        }
    }

    /// The same entity with its position replaced.
    ///
    /// Entities without a position field are returned unchanged; the
    /// resolver only calls this after [`Entity::position`] returned one.
    pub fn with_position(mut self, position: Position) -> Self {
        match &mut self {
            Self::Dot(e) => e.position = position,
            Self::Square(e) => e.position = position,
            Self::Rectangle(e) => e.position = position,
            Self::RegularPolygon(e) => e.position = position,
            Self::Circle(e) => e.position = position,
            Self::Lens(e) => e.position = position,
            Self::Charge(e) => e.position = position,
            Self::Text(e) => e.position = Some(position),
            _ => {}
        }
        self
    }
}

/// An expression-to-expression transform request.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MorphExpr {
    /// Source side; must name a bound function.
    pub from: Expr,
    /// Target side components: one expression for regular/polar targets,
    /// two for parametric ones. Bare symbols resolve to stored functions.
    pub to: Vec<Expr>,
}

/// What an animation statement shows.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Animatable {
    /// A reference to a bound name.
    Ref(Ident),
    /// An inline math function.
    Function(MathFunction),
    /// An expression-to-expression morph request.
    Morph(MorphExpr),
    /// An inline renderable entity.
    Entity(Entity),
}

/// A sweep refinement applied to an animation.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub enum Transform {
    /// Evaluate over this numeric domain.
    Sweep(SweepRange),
    /// Request a tracked dot along the curve.
    SweepDot,
}

/// A show statement.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Animation {
    /// What to show.
    pub instance: Animatable,
    /// Sweep refinements, in declaration order.
    pub transforms: Vec<Transform>,
}

impl Animation {
    /// An implicit zero-transform show of a bound name.
    pub fn implicit_show(name: Ident) -> Self {
        Self {
            instance: Animatable::Ref(name),
            transforms: Vec::new(),
        }
    }
}

/// The container kind of a block statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BlockKind {
    /// Cartesian axes container.
    Axis,
    /// Polar plane container.
    Polar,
    /// Electric field container.
    Field,
}

impl BlockKind {
    /// The surface this block kind provides.
    pub fn surface(self) -> SurfaceKind {
        match self {
            Self::Axis => SurfaceKind::Axis,
            Self::Polar => SurfaceKind::Polar,
            Self::Field => SurfaceKind::Field,
        }
    }
}

/// A named container statement grouping member show statements.
///
/// Members are global statement indices; member statements live in the
/// program's statement list and are evaluated only through their block.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Block {
    /// The container's id.
    pub id: Ident,
    /// Which container kind this is.
    pub kind: BlockKind,
    /// Indices of the member statements.
    pub members: Vec<StatementIndex>,
}

/// A clear command.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Clear {
    /// The entity to remove from view.
    pub target: Ident,
}

#[cfg(test)]
#[path = "../../tests/unit/program/model.rs"]
mod tests;
