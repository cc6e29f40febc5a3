//! Decoded, render-ready shape model.
//!
//! Everything here is immutable plain data produced by one decode
//! call. A renderer only needs to enumerate `paths`, and per path the
//! `commands` plus whichever of `fill` / `line` is set.

use crate::geom::Point;

// ========== Styles ==========

/// Straight sRGBA with components normalized to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    fn lerp(self, other: Color, ratio: f32) -> Color {
        Color {
            r: lerp(self.r, other.r, ratio),
            g: lerp(self.g, other.g, ratio),
            b: lerp(self.b, other.b, ratio),
            a: lerp(self.a, other.a, ratio),
        }
    }
}

/// 2x3 affine matrix in pixel space. The twip-to-pixel scale is baked
/// in by the style normalizer: 819.2 on the 2x2 part for gradients,
/// 0.05 for bitmaps, and translation divided by 20 either way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Matrix {
    fn lerp(self, other: Matrix, ratio: f32) -> Matrix {
        Matrix {
            a: lerp(self.a, other.a, ratio),
            b: lerp(self.b, other.b, ratio),
            c: lerp(self.c, other.c, ratio),
            d: lerp(self.d, other.d, ratio),
            tx: lerp(self.tx, other.tx, ratio),
            ty: lerp(self.ty, other.ty, ratio),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub ratio: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FillStyle {
    Solid {
        color: Color,
    },
    LinearGradient {
        matrix: Matrix,
        stops: Vec<GradientStop>,
    },
    RadialGradient {
        matrix: Matrix,
        stops: Vec<GradientStop>,
    },
    FocalGradient {
        matrix: Matrix,
        stops: Vec<GradientStop>,
        focal_point: f32,
    },
    Bitmap {
        /// Index into the shape's bitmap dependency set, not the tag id.
        bitmap: usize,
        matrix: Matrix,
        repeat: bool,
        smooth: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapStyle {
    Round,
    None,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStyle {
    Round,
    Bevel,
    Miter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    /// Stroke width in twips.
    pub width: i32,
    pub color: Color,
    pub start_cap: CapStyle,
    pub end_cap: CapStyle,
    pub join: JoinStyle,
    /// Stored as max(1.5, declared factor) * 2.
    pub miter_limit: f32,
    pub no_h_scale: bool,
    pub no_v_scale: bool,
    pub pixel_hinting: bool,
    /// Fill declared inside the line style. Preserved verbatim; the
    /// renderer decides whether to stroke with it.
    pub fill_override: Option<FillStyle>,
}

impl LineStyle {
    /// Fallback style for edges drawn while every style slot is
    /// clear: a fully transparent hairline.
    pub(crate) fn default_hairline() -> LineStyle {
        LineStyle {
            width: 20,
            color: Color::TRANSPARENT,
            start_cap: CapStyle::Round,
            end_cap: CapStyle::Round,
            join: JoinStyle::Round,
            miter_limit: 3.0,
            no_h_scale: false,
            no_v_scale: false,
            pixel_hinting: false,
            fill_override: None,
        }
    }
}

// ========== Commands and paths ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveTo(Point),
    LineTo(Point),
    CurveTo { control: Point, anchor: Point },
}

impl Command {
    pub fn end_point(&self) -> Point {
        match *self {
            Command::MoveTo(p) | Command::LineTo(p) => p,
            Command::CurveTo { anchor, .. } => anchor,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub commands: Vec<Command>,
    pub fill: Option<FillStyle>,
    pub line: Option<LineStyle>,
}

/// A decoded shape: a flat list of styled paths, earlier paths drawn
/// first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shape {
    pub paths: Vec<Path>,
}

// ========== Morph mirrors ==========

/// A twip point carried in both morph frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MorphPoint {
    pub start: Point,
    pub end: Point,
}

impl MorphPoint {
    pub fn sample(self, ratio: f32) -> Point {
        Point {
            x: lerp(self.start.x as f32, self.end.x as f32, ratio).round() as i32,
            y: lerp(self.start.y as f32, self.end.y as f32, ratio).round() as i32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphCommand {
    MoveTo(MorphPoint),
    LineTo(MorphPoint),
    CurveTo {
        control: MorphPoint,
        anchor: MorphPoint,
    },
}

impl MorphCommand {
    pub fn sample(&self, ratio: f32) -> Command {
        match *self {
            MorphCommand::MoveTo(p) => Command::MoveTo(p.sample(ratio)),
            MorphCommand::LineTo(p) => Command::LineTo(p.sample(ratio)),
            MorphCommand::CurveTo { control, anchor } => Command::CurveTo {
                control: control.sample(ratio),
                anchor: anchor.sample(ratio),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorphGradientStop {
    pub start_ratio: f32,
    pub end_ratio: f32,
    pub start_color: Color,
    pub end_color: Color,
}

impl MorphGradientStop {
    fn sample(self, ratio: f32) -> GradientStop {
        GradientStop {
            ratio: lerp(self.start_ratio, self.end_ratio, ratio),
            color: self.start_color.lerp(self.end_color, ratio),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MorphFillStyle {
    Solid {
        start_color: Color,
        end_color: Color,
    },
    LinearGradient {
        start_matrix: Matrix,
        end_matrix: Matrix,
        stops: Vec<MorphGradientStop>,
    },
    RadialGradient {
        start_matrix: Matrix,
        end_matrix: Matrix,
        stops: Vec<MorphGradientStop>,
    },
    FocalGradient {
        start_matrix: Matrix,
        end_matrix: Matrix,
        stops: Vec<MorphGradientStop>,
        start_focal_point: f32,
        end_focal_point: f32,
    },
    Bitmap {
        /// Index into the shape's bitmap dependency set.
        bitmap: usize,
        start_matrix: Matrix,
        end_matrix: Matrix,
        repeat: bool,
        smooth: bool,
    },
}

impl MorphFillStyle {
    pub fn sample(&self, ratio: f32) -> FillStyle {
        match self {
            MorphFillStyle::Solid {
                start_color,
                end_color,
            } => FillStyle::Solid {
                color: start_color.lerp(*end_color, ratio),
            },
            MorphFillStyle::LinearGradient {
                start_matrix,
                end_matrix,
                stops,
            } => FillStyle::LinearGradient {
                matrix: start_matrix.lerp(*end_matrix, ratio),
                stops: stops.iter().map(|stop| stop.sample(ratio)).collect(),
            },
            MorphFillStyle::RadialGradient {
                start_matrix,
                end_matrix,
                stops,
            } => FillStyle::RadialGradient {
                matrix: start_matrix.lerp(*end_matrix, ratio),
                stops: stops.iter().map(|stop| stop.sample(ratio)).collect(),
            },
            MorphFillStyle::FocalGradient {
                start_matrix,
                end_matrix,
                stops,
                start_focal_point,
                end_focal_point,
            } => FillStyle::FocalGradient {
                matrix: start_matrix.lerp(*end_matrix, ratio),
                stops: stops.iter().map(|stop| stop.sample(ratio)).collect(),
                focal_point: lerp(*start_focal_point, *end_focal_point, ratio),
            },
            MorphFillStyle::Bitmap {
                bitmap,
                start_matrix,
                end_matrix,
                repeat,
                smooth,
            } => FillStyle::Bitmap {
                bitmap: *bitmap,
                matrix: start_matrix.lerp(*end_matrix, ratio),
                repeat: *repeat,
                smooth: *smooth,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MorphLineStyle {
    pub start_width: i32,
    pub end_width: i32,
    pub start_color: Color,
    pub end_color: Color,
    pub start_cap: CapStyle,
    pub end_cap: CapStyle,
    pub join: JoinStyle,
    pub miter_limit: f32,
    pub no_h_scale: bool,
    pub no_v_scale: bool,
    pub pixel_hinting: bool,
    pub fill_override: Option<MorphFillStyle>,
}

impl MorphLineStyle {
    pub(crate) fn default_hairline() -> MorphLineStyle {
        MorphLineStyle {
            start_width: 20,
            end_width: 20,
            start_color: Color::TRANSPARENT,
            end_color: Color::TRANSPARENT,
            start_cap: CapStyle::Round,
            end_cap: CapStyle::Round,
            join: JoinStyle::Round,
            miter_limit: 3.0,
            no_h_scale: false,
            no_v_scale: false,
            pixel_hinting: false,
            fill_override: None,
        }
    }

    pub fn sample(&self, ratio: f32) -> LineStyle {
        LineStyle {
            width: lerp(self.start_width as f32, self.end_width as f32, ratio).round() as i32,
            color: self.start_color.lerp(self.end_color, ratio),
            start_cap: self.start_cap,
            end_cap: self.end_cap,
            join: self.join,
            miter_limit: self.miter_limit,
            no_h_scale: self.no_h_scale,
            no_v_scale: self.no_v_scale,
            pixel_hinting: self.pixel_hinting,
            fill_override: self
                .fill_override
                .as_ref()
                .map(|fill| fill.sample(ratio)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MorphPath {
    pub commands: Vec<MorphCommand>,
    pub fill: Option<MorphFillStyle>,
    pub line: Option<MorphLineStyle>,
}

impl MorphPath {
    pub fn sample(&self, ratio: f32) -> Path {
        Path {
            commands: self
                .commands
                .iter()
                .map(|command| command.sample(ratio))
                .collect(),
            fill: self.fill.as_ref().map(|fill| fill.sample(ratio)),
            line: self.line.as_ref().map(|line| line.sample(ratio)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MorphShape {
    pub paths: Vec<MorphPath>,
}

impl MorphShape {
    /// Interpolates between the start frame (`ratio` 0) and the end
    /// frame (`ratio` 1), component-wise over every point, color,
    /// matrix, width, and gradient ratio.
    pub fn sample(&self, ratio: f32) -> Shape {
        Shape {
            paths: self.paths.iter().map(|path| path.sample(ratio)).collect(),
        }
    }
}

fn lerp(a: f32, b: f32, ratio: f32) -> f32 {
    a * (1.0 - ratio) + b * ratio
}
