//! Segment emitter: walks the edge-record stream maintaining the pen
//! and the three active style slots, and fans each edge out into the
//! per-style segment buckets of the current layer.
//!
//! The emitter always tracks both morph frames. Flat decodes drive it
//! with identical deltas on both sides, so the two pens stay in step
//! and the end-frame values are simply never read out.

use log::debug;

use crate::geom::Point;

use super::segment::{FramePoint, Segment, StyleLayer};
use super::DecodeError;

pub(crate) struct Emitter<F, L> {
    pen: Point,
    morph_pen: Point,
    left_fill: usize,
    right_fill: usize,
    line: usize,
    layer: StyleLayer<F, L>,
    layers: Vec<StyleLayer<F, L>>,
    /// Lazy fallback bucket for edges drawn while every slot is clear.
    default_segments: Vec<Segment>,
}

impl<F, L> Emitter<F, L> {
    pub fn new(fills: Vec<F>, lines: Vec<L>) -> Self {
        Self {
            pen: Point::ZERO,
            morph_pen: Point::ZERO,
            left_fill: 0,
            right_fill: 0,
            line: 0,
            layer: StyleLayer::new(fills, lines),
            layers: Vec::new(),
            default_segments: Vec::new(),
        }
    }

    /// HasNewStyles: freeze the current layer and start a fresh one.
    /// All three slots reset to "no style".
    pub fn begin_layer(&mut self, fills: Vec<F>, lines: Vec<L>) {
        debug!(
            "shape layer rollover: {} fills, {} lines",
            fills.len(),
            lines.len()
        );
        let closed = std::mem::replace(&mut self.layer, StyleLayer::new(fills, lines));
        self.layers.push(closed);
        self.left_fill = 0;
        self.right_fill = 0;
        self.line = 0;
    }

    pub fn set_left_fill(&mut self, slot: usize) -> Result<(), DecodeError> {
        if slot > self.layer.fills.len() {
            return Err(DecodeError::malformed(format!(
                "fill style 0 index {} out of range (table has {})",
                slot,
                self.layer.fills.len()
            )));
        }
        self.left_fill = slot;
        Ok(())
    }

    pub fn set_right_fill(&mut self, slot: usize) -> Result<(), DecodeError> {
        if slot > self.layer.fills.len() {
            return Err(DecodeError::malformed(format!(
                "fill style 1 index {} out of range (table has {})",
                slot,
                self.layer.fills.len()
            )));
        }
        self.right_fill = slot;
        Ok(())
    }

    pub fn set_line(&mut self, slot: usize) -> Result<(), DecodeError> {
        if slot > self.layer.lines.len() {
            return Err(DecodeError::malformed(format!(
                "line style index {} out of range (table has {})",
                slot,
                self.layer.lines.len()
            )));
        }
        self.line = slot;
        Ok(())
    }

    /// Absolute pen move in both frames (flat decoding).
    pub fn move_to(&mut self, p: Point) {
        self.set_pen(FramePoint::flat(p));
    }

    /// Absolute pen move in the start frame only.
    pub fn move_start(&mut self, p: Point) {
        self.pen = p;
    }

    /// Absolute pen move in the end frame only.
    pub fn move_end(&mut self, p: Point) {
        self.morph_pen = p;
    }

    /// Straight edge in both frames.
    pub fn straight_edge(&mut self, delta: Point, morph_delta: Point) {
        let from = self.frame_pen();
        let to = FramePoint {
            start: self.pen.offset(delta.x, delta.y),
            end: self.morph_pen.offset(morph_delta.x, morph_delta.y),
        };
        self.push_segment(Segment::new(from, to, None));
        self.set_pen(to);
    }

    /// Curved edge in both frames. Controls are pen-relative deltas,
    /// anchors are control-relative.
    pub fn curved_edge(
        &mut self,
        control_delta: Point,
        anchor_delta: Point,
        morph_control_delta: Point,
        morph_anchor_delta: Point,
    ) {
        let from = self.frame_pen();
        let control = FramePoint {
            start: self.pen.offset(control_delta.x, control_delta.y),
            end: self
                .morph_pen
                .offset(morph_control_delta.x, morph_control_delta.y),
        };
        let to = FramePoint {
            start: control.start.offset(anchor_delta.x, anchor_delta.y),
            end: control
                .end
                .offset(morph_anchor_delta.x, morph_anchor_delta.y),
        };
        self.push_segment(Segment::new(from, to, Some(control)));
        self.set_pen(to);
    }

    /// Start frame straight, end frame curved. The straight side is
    /// promoted to a degenerate curve whose control is the midpoint of
    /// its endpoints, so both frames share the curve kind.
    pub fn straight_curved_edge(
        &mut self,
        delta: Point,
        morph_control_delta: Point,
        morph_anchor_delta: Point,
    ) {
        let from = self.frame_pen();
        let start_to = self.pen.offset(delta.x, delta.y);
        let end_control = self
            .morph_pen
            .offset(morph_control_delta.x, morph_control_delta.y);
        let end_to = end_control.offset(morph_anchor_delta.x, morph_anchor_delta.y);
        let control = FramePoint {
            start: self.pen.midpoint(start_to),
            end: end_control,
        };
        let to = FramePoint {
            start: start_to,
            end: end_to,
        };
        self.push_segment(Segment::new(from, to, Some(control)));
        self.set_pen(to);
    }

    /// Start frame curved, end frame straight; mirror of
    /// `straight_curved_edge`.
    pub fn curved_straight_edge(
        &mut self,
        control_delta: Point,
        anchor_delta: Point,
        morph_delta: Point,
    ) {
        let from = self.frame_pen();
        let start_control = self.pen.offset(control_delta.x, control_delta.y);
        let start_to = start_control.offset(anchor_delta.x, anchor_delta.y);
        let end_to = self.morph_pen.offset(morph_delta.x, morph_delta.y);
        let control = FramePoint {
            start: start_control,
            end: self.morph_pen.midpoint(end_to),
        };
        let to = FramePoint {
            start: start_to,
            end: end_to,
        };
        self.push_segment(Segment::new(from, to, Some(control)));
        self.set_pen(to);
    }

    /// Closes the final layer and hands everything over for
    /// reconstruction.
    pub fn finish(self) -> (Vec<StyleLayer<F, L>>, Vec<Segment>) {
        let Self {
            mut layers,
            layer,
            default_segments,
            ..
        } = self;
        layers.push(layer);
        (layers, default_segments)
    }

    fn frame_pen(&self) -> FramePoint {
        FramePoint {
            start: self.pen,
            end: self.morph_pen,
        }
    }

    fn set_pen(&mut self, p: FramePoint) {
        self.pen = p.start;
        self.morph_pen = p.end;
    }

    /// Fans one edge out to the active slots. A right fill takes the
    /// segment forward, a left fill takes a reversed clone (the left
    /// side bounds its region with the opposite winding), a line takes
    /// it forward. With no slot active the edge lands in the
    /// one-per-shape default bucket.
    fn push_segment(&mut self, segment: Segment) {
        let mut emitted = false;
        if self.right_fill != 0 {
            self.layer.fills[self.right_fill - 1].segments.push(segment);
            emitted = true;
        }
        if self.left_fill != 0 {
            self.layer.fills[self.left_fill - 1]
                .segments
                .push(segment.flipped());
            emitted = true;
        }
        if self.line != 0 {
            self.layer.lines[self.line - 1].segments.push(segment);
            emitted = true;
        }
        if !emitted {
            if self.default_segments.is_empty() {
                debug!("edge with no active style, opening the default hairline path");
            }
            self.default_segments.push(segment);
        }
    }
}
