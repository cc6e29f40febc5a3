//! Internal segment model shared by the emitter and the contour
//! reconstructor. Segments exist only for the duration of one decode
//! call; the buckets they live in are flat vectors, so neighbour
//! bookkeeping during reconstruction is done with indices.

use crate::geom::Point;

/// A twip coordinate carried in both morph frames. Flat decodes keep
/// the two frames identical; connectivity always goes by the start
/// frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FramePoint {
    pub start: Point,
    pub end: Point,
}

impl FramePoint {
    pub fn flat(p: Point) -> Self {
        Self { start: p, end: p }
    }
}

/// One edge record's geometry as stored in a single style bucket.
///
/// Reversed segments are traversed end-to-start at write-out time; the
/// coordinates themselves are never swapped, so endpoint equality
/// against the original points keeps working.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment {
    pub from: FramePoint,
    pub to: FramePoint,
    pub control: Option<FramePoint>,
    pub reversed: bool,
}

impl Segment {
    pub fn new(from: FramePoint, to: FramePoint, control: Option<FramePoint>) -> Self {
        Self {
            from,
            to,
            control,
            reversed: false,
        }
    }

    pub fn flipped(mut self) -> Self {
        self.reversed = !self.reversed;
        self
    }

    /// Effective first point in both frames, honoring the reversed flag.
    pub fn head(&self) -> FramePoint {
        if self.reversed {
            self.to
        } else {
            self.from
        }
    }

    /// Effective last point in both frames.
    pub fn tail(&self) -> FramePoint {
        if self.reversed {
            self.from
        } else {
            self.to
        }
    }

    /// Start-frame endpoint the segment effectively begins at; this is
    /// what the reconstructor matches on.
    pub fn start_point(&self) -> Point {
        self.head().start
    }

    /// Start-frame endpoint the segment effectively ends at.
    pub fn end_point(&self) -> Point {
        self.tail().start
    }
}

/// For a given style, the segments defined against it, in emission
/// order.
#[derive(Debug, Clone)]
pub(crate) struct SegmentSet<S> {
    pub style: S,
    pub segments: Vec<Segment>,
}

impl<S> SegmentSet<S> {
    pub fn new(style: S) -> Self {
        Self {
            style,
            segments: Vec::new(),
        }
    }
}

/// Snapshot of the fill/line tables active between two HasNewStyles
/// events, together with the segments collected while it was on top.
#[derive(Debug, Clone)]
pub(crate) struct StyleLayer<F, L> {
    pub fills: Vec<SegmentSet<F>>,
    pub lines: Vec<SegmentSet<L>>,
}

impl<F, L> StyleLayer<F, L> {
    pub fn new(fills: Vec<F>, lines: Vec<L>) -> Self {
        Self {
            fills: fills.into_iter().map(SegmentSet::new).collect(),
            lines: lines.into_iter().map(SegmentSet::new).collect(),
        }
    }
}
