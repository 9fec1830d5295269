use kurbo::{BezPath, Point, Shape};

use crate::foundation::core::{Direction, Ident, SweepRange};
use crate::program::model::SurfaceKind;

/// A renderer-opaque drawable produced by resolving a scene node.
///
/// The core guarantees handles are complete and internally consistent; the
/// external engine owns drawing and final layout.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Handle {
    /// The geometry payload the renderer draws.
    pub geometry: Geometry,
    /// Adjacency request: place this drawable next to the named anchor in
    /// the given direction. Consumed by the render step.
    pub align: Option<(Ident, Direction)>,
}

impl Handle {
    /// A free-standing handle.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            align: None,
        }
    }

    /// A handle placed adjacent to an anchor.
    pub fn aligned(geometry: Geometry, anchor: Ident, placement: Direction) -> Self {
        Self {
            geometry,
            align: Some((anchor, placement)),
        }
    }

    /// A representative point used when another entity anchors on this one.
    pub fn anchor_point(&self) -> Option<Point> {
        match &self.geometry {
            Geometry::Surface {
                x_range, y_range, ..
            } => Some(Point::new(x_range.center(), y_range.center())),
            Geometry::Curve { points, .. } => points.get(points.len() / 2).copied(),
            Geometry::Dot { at } => Some(*at),
            Geometry::Segment { from, to, .. } => Some(from.midpoint(*to)),
            Geometry::Path(path) => {
                let bbox = path.bounding_box();
                Some(bbox.center())
            }
            Geometry::Circle { center, .. } => Some(*center),
            Geometry::Text { at, .. } => *at,
            Geometry::LineSet { segments } => segments.first().map(|(a, b)| a.midpoint(*b)),
            Geometry::Tombstone => None,
        }
    }
}

/// Geometry payload variants, one per drawable shape class.
#[derive(Clone, Debug, serde::Serialize)]
pub enum Geometry {
    /// A coordinate container sized to its plots.
    Surface {
        /// Which surface this is.
        kind: SurfaceKind,
        /// Horizontal extent.
        x_range: SweepRange,
        /// Vertical extent.
        y_range: SweepRange,
    },
    /// A sampled function curve on a surface.
    Curve {
        /// The surface the curve belongs to.
        surface: Ident,
        /// Sampled points in curve order.
        points: Vec<Point>,
    },
    /// A single dot.
    Dot {
        /// The dot's position.
        at: Point,
    },
    /// A straight span between two points.
    Segment {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// How the span is drawn.
        kind: SegmentKind,
    },
    /// An arbitrary outline.
    Path(BezPath),
    /// A circle.
    Circle {
        /// Center point.
        center: Point,
        /// Radius.
        radius: f64,
    },
    /// A piece of text.
    Text {
        /// The text content.
        content: String,
        /// Whether the content is LaTeX source.
        latex: bool,
        /// Absolute position, when known.
        at: Option<Point>,
    },
    /// A set of independent line segments.
    LineSet {
        /// The segments.
        segments: Vec<(Point, Point)>,
    },
    /// Placeholder handle for nodes with no drawable of their own
    /// (clear commands).
    Tombstone,
}

/// How a [`Geometry::Segment`] is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum SegmentKind {
    /// A plain line.
    Line,
    /// An arrow with a tip at `to`.
    Arrow,
    /// A curly brace spanning the segment.
    Brace,
}
