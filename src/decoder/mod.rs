//! Shape decoding: `DefineShape` / `DefineMorphShape` tags into the
//! render-ready `Shape` / `MorphShape` model.
//!
//! The pipeline runs style normalization, then the segment emitter
//! over the record stream(s), then the contour reconstructor per
//! style bucket. Morph tags drive the same emitter with a paired
//! cursor over the end-frame records.

mod contour;
mod emitter;
mod segment;
mod style;

use std::fmt;

use itertools::put_back;
use log::warn;

use crate::bitmap::BitmapDeps;
use crate::geom::Point;
use crate::shape::{
    Command, LineStyle, MorphCommand, MorphLineStyle, MorphPath, MorphPoint, MorphShape, Path,
    Shape,
};
use crate::tags::{DefineMorphShape, DefineShape, ShapeRecord, StyleChange};

use self::contour::RunCommand;
use self::emitter::Emitter;

// ========== Errors ==========

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A record is inconsistent with the rest of the tag: an
    /// out-of-range style index, or desynchronized morph streams.
    MalformedInput(String),
    /// A fill kind byte the normalizer does not cover.
    UnsupportedFillKind(u8),
    /// A line cap or join code byte the normalizer does not cover.
    UnsupportedLineKind(u8),
}

impl DecodeError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        DecodeError::MalformedInput(message.into())
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MalformedInput(message) => {
                write!(f, "malformed shape tag: {}", message)
            }
            DecodeError::UnsupportedFillKind(kind) => {
                write!(f, "unsupported fill kind byte 0x{:02x}", kind)
            }
            DecodeError::UnsupportedLineKind(kind) => {
                write!(f, "unsupported line cap/join byte 0x{:02x}", kind)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

// ========== Flat decoding ==========

/// Decodes a `DefineShape` tag. `deps` collects the bitmap ids the
/// shape references; decoded bitmap fills index into it.
pub fn decode_shape(tag: &DefineShape, deps: &mut BitmapDeps) -> Result<Shape, DecodeError> {
    let (fills, lines) = style::normalize_styles(&tag.styles, deps)?;
    let mut emitter = Emitter::new(fills, lines);

    for record in &tag.records {
        match record {
            ShapeRecord::StyleChange(change) => {
                if let Some(styles) = &change.new_styles {
                    let (fills, lines) = style::normalize_styles(styles, deps)?;
                    emitter.begin_layer(fills, lines);
                }
                apply_slot_changes(&mut emitter, change)?;
                if let Some(position) = change.move_to {
                    emitter.move_to(position);
                }
            }
            ShapeRecord::StraightEdge { delta_x, delta_y } => {
                let delta = Point::new(*delta_x, *delta_y);
                emitter.straight_edge(delta, delta);
            }
            ShapeRecord::CurvedEdge {
                control_delta_x,
                control_delta_y,
                anchor_delta_x,
                anchor_delta_y,
            } => {
                let control = Point::new(*control_delta_x, *control_delta_y);
                let anchor = Point::new(*anchor_delta_x, *anchor_delta_y);
                emitter.curved_edge(control, anchor, control, anchor);
            }
        }
    }

    let (layers, default_segments) = emitter.finish();
    let mut paths = Vec::new();
    for layer in layers {
        for set in layer.fills {
            if set.segments.is_empty() {
                continue;
            }
            paths.push(Path {
                commands: flat_commands(&contour::reconstruct(&set.segments)),
                fill: Some(set.style),
                line: None,
            });
        }
        for set in layer.lines {
            if set.segments.is_empty() {
                continue;
            }
            paths.push(Path {
                commands: flat_commands(&contour::reconstruct(&set.segments)),
                fill: None,
                line: Some(set.style),
            });
        }
    }
    if !default_segments.is_empty() {
        paths.push(Path {
            commands: flat_commands(&contour::reconstruct(&default_segments)),
            fill: None,
            line: Some(LineStyle::default_hairline()),
        });
    }
    Ok(Shape { paths })
}

// ========== Morph decoding ==========

/// Decodes a `DefineMorphShape` tag. The start-frame records drive the
/// walk; the end-frame stream advances through a cursor that backs up
/// when a pen move is not mirrored, and reuses the start record once
/// exhausted.
pub fn decode_morph_shape(
    tag: &DefineMorphShape,
    deps: &mut BitmapDeps,
) -> Result<MorphShape, DecodeError> {
    let (fills, lines) = style::normalize_morph_styles(&tag.styles, deps)?;
    let mut emitter = Emitter::new(fills, lines);
    let mut end_records = put_back(tag.morph_records.iter());

    for record in &tag.records {
        match record {
            ShapeRecord::StyleChange(change) => {
                if change.new_styles.is_some() {
                    return Err(DecodeError::malformed(
                        "morph shape redefines style tables mid-stream",
                    ));
                }
                apply_slot_changes(&mut emitter, change)?;
                if let Some(position) = change.move_to {
                    emitter.move_start(position);
                }
                // The end stream participates only when its own next
                // record is a style change; otherwise it stays put.
                match end_records.next() {
                    Some(ShapeRecord::StyleChange(end_change)) => {
                        if let Some(position) = end_change.move_to {
                            emitter.move_end(position);
                        }
                    }
                    Some(other) => end_records.put_back(other),
                    None => {}
                }
            }
            ShapeRecord::StraightEdge { delta_x, delta_y } => {
                let delta = Point::new(*delta_x, *delta_y);
                match end_records.next() {
                    Some(ShapeRecord::StraightEdge { delta_x, delta_y }) => {
                        emitter.straight_edge(delta, Point::new(*delta_x, *delta_y));
                    }
                    Some(ShapeRecord::CurvedEdge {
                        control_delta_x,
                        control_delta_y,
                        anchor_delta_x,
                        anchor_delta_y,
                    }) => {
                        emitter.straight_curved_edge(
                            delta,
                            Point::new(*control_delta_x, *control_delta_y),
                            Point::new(*anchor_delta_x, *anchor_delta_y),
                        );
                    }
                    Some(ShapeRecord::StyleChange(_)) => {
                        return Err(DecodeError::malformed(
                            "morph end stream has a style change where an edge was expected",
                        ));
                    }
                    None => {
                        warn!("morph end stream exhausted, reusing start straight edge");
                        emitter.straight_edge(delta, delta);
                    }
                }
            }
            ShapeRecord::CurvedEdge {
                control_delta_x,
                control_delta_y,
                anchor_delta_x,
                anchor_delta_y,
            } => {
                let control = Point::new(*control_delta_x, *control_delta_y);
                let anchor = Point::new(*anchor_delta_x, *anchor_delta_y);
                match end_records.next() {
                    Some(ShapeRecord::CurvedEdge {
                        control_delta_x,
                        control_delta_y,
                        anchor_delta_x,
                        anchor_delta_y,
                    }) => {
                        emitter.curved_edge(
                            control,
                            anchor,
                            Point::new(*control_delta_x, *control_delta_y),
                            Point::new(*anchor_delta_x, *anchor_delta_y),
                        );
                    }
                    Some(ShapeRecord::StraightEdge { delta_x, delta_y }) => {
                        emitter.curved_straight_edge(
                            control,
                            anchor,
                            Point::new(*delta_x, *delta_y),
                        );
                    }
                    Some(ShapeRecord::StyleChange(_)) => {
                        return Err(DecodeError::malformed(
                            "morph end stream has a style change where an edge was expected",
                        ));
                    }
                    None => {
                        warn!("morph end stream exhausted, reusing start curved edge");
                        emitter.curved_edge(control, anchor, control, anchor);
                    }
                }
            }
        }
    }

    let (layers, default_segments) = emitter.finish();
    let mut paths = Vec::new();
    for layer in layers {
        for set in layer.fills {
            if set.segments.is_empty() {
                continue;
            }
            paths.push(MorphPath {
                commands: morph_commands(&contour::reconstruct(&set.segments)),
                fill: Some(set.style),
                line: None,
            });
        }
        for set in layer.lines {
            if set.segments.is_empty() {
                continue;
            }
            paths.push(MorphPath {
                commands: morph_commands(&contour::reconstruct(&set.segments)),
                fill: None,
                line: Some(set.style),
            });
        }
    }
    if !default_segments.is_empty() {
        paths.push(MorphPath {
            commands: morph_commands(&contour::reconstruct(&default_segments)),
            fill: None,
            line: Some(MorphLineStyle::default_hairline()),
        });
    }
    Ok(MorphShape { paths })
}

fn apply_slot_changes<F, L>(
    emitter: &mut Emitter<F, L>,
    change: &StyleChange,
) -> Result<(), DecodeError> {
    if let Some(slot) = change.fill_style0 {
        emitter.set_left_fill(slot)?;
    }
    if let Some(slot) = change.fill_style1 {
        emitter.set_right_fill(slot)?;
    }
    if let Some(slot) = change.line_style {
        emitter.set_line(slot)?;
    }
    Ok(())
}

fn flat_commands(run: &[RunCommand]) -> Vec<Command> {
    run.iter()
        .map(|command| match *command {
            RunCommand::MoveTo(p) => Command::MoveTo(p.start),
            RunCommand::LineTo(p) => Command::LineTo(p.start),
            RunCommand::CurveTo { control, anchor } => Command::CurveTo {
                control: control.start,
                anchor: anchor.start,
            },
        })
        .collect()
}

fn morph_commands(run: &[RunCommand]) -> Vec<MorphCommand> {
    run.iter()
        .map(|command| match *command {
            RunCommand::MoveTo(p) => MorphCommand::MoveTo(morph_point(p)),
            RunCommand::LineTo(p) => MorphCommand::LineTo(morph_point(p)),
            RunCommand::CurveTo { control, anchor } => MorphCommand::CurveTo {
                control: morph_point(control),
                anchor: morph_point(anchor),
            },
        })
        .collect()
}

fn morph_point(p: segment::FramePoint) -> MorphPoint {
    MorphPoint {
        start: p.start,
        end: p.end,
    }
}
