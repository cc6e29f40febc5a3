//! Style normalizer: raw tag styles to the decoded model.
//!
//! Pure except for the bitmap dependency set, which collects the ids
//! referenced by the shape in first-sight order so decoded bitmap
//! fills can carry indices instead of ids.

use crate::bitmap::BitmapDeps;
use crate::{shape, tags};

use super::DecodeError;

/// Twip-to-pixel pre-scale for gradient matrices (2^15 / 40).
const GRADIENT_MATRIX_SCALE: f32 = 819.2;
/// Twip-to-pixel pre-scale for bitmap matrices (1 / 20).
const BITMAP_MATRIX_SCALE: f32 = 0.05;
const TWIPS_PER_PIXEL: f32 = 20.0;

pub(crate) fn normalize_styles(
    styles: &tags::ShapeStyles,
    deps: &mut BitmapDeps,
) -> Result<(Vec<shape::FillStyle>, Vec<shape::LineStyle>), DecodeError> {
    let fills = styles
        .fill_styles
        .iter()
        .map(|style| normalize_fill(style, deps))
        .collect::<Result<Vec<_>, _>>()?;
    let lines = styles
        .line_styles
        .iter()
        .map(|style| normalize_line(style, deps))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((fills, lines))
}

pub(crate) fn normalize_morph_styles(
    styles: &tags::MorphShapeStyles,
    deps: &mut BitmapDeps,
) -> Result<(Vec<shape::MorphFillStyle>, Vec<shape::MorphLineStyle>), DecodeError> {
    let fills = styles
        .fill_styles
        .iter()
        .map(|style| normalize_morph_fill(style, deps))
        .collect::<Result<Vec<_>, _>>()?;
    let lines = styles
        .line_styles
        .iter()
        .map(|style| normalize_morph_line(style, deps))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((fills, lines))
}

pub(crate) fn normalize_fill(
    style: &tags::FillStyle,
    deps: &mut BitmapDeps,
) -> Result<shape::FillStyle, DecodeError> {
    Ok(match style {
        tags::FillStyle::Solid { color } => shape::FillStyle::Solid {
            color: normalize_color(*color),
        },
        tags::FillStyle::LinearGradient { matrix, gradient } => shape::FillStyle::LinearGradient {
            matrix: normalize_matrix(matrix, GRADIENT_MATRIX_SCALE),
            stops: normalize_stops(gradient),
        },
        tags::FillStyle::RadialGradient { matrix, gradient } => shape::FillStyle::RadialGradient {
            matrix: normalize_matrix(matrix, GRADIENT_MATRIX_SCALE),
            stops: normalize_stops(gradient),
        },
        tags::FillStyle::FocalGradient {
            matrix,
            gradient,
            focal_point,
        } => shape::FillStyle::FocalGradient {
            matrix: normalize_matrix(matrix, GRADIENT_MATRIX_SCALE),
            stops: normalize_stops(gradient),
            focal_point: *focal_point,
        },
        tags::FillStyle::Bitmap {
            bitmap_id,
            matrix,
            kind,
        } => {
            let (repeat, smooth) = bitmap_flags(*kind)?;
            shape::FillStyle::Bitmap {
                bitmap: deps.index_of(*bitmap_id),
                matrix: normalize_matrix(matrix, BITMAP_MATRIX_SCALE),
                repeat,
                smooth,
            }
        }
    })
}

pub(crate) fn normalize_line(
    style: &tags::LineStyle,
    deps: &mut BitmapDeps,
) -> Result<shape::LineStyle, DecodeError> {
    Ok(shape::LineStyle {
        width: style.width as i32,
        color: normalize_color(style.color),
        start_cap: cap_style(style.start_cap)?,
        end_cap: cap_style(style.end_cap)?,
        join: join_style(style.join)?,
        miter_limit: miter_limit(style.miter_limit_factor),
        no_h_scale: style.no_h_scale,
        no_v_scale: style.no_v_scale,
        pixel_hinting: style.pixel_hinting,
        fill_override: style
            .fill
            .as_ref()
            .map(|fill| normalize_fill(fill, deps))
            .transpose()?,
    })
}

fn normalize_morph_fill(
    style: &tags::MorphFillStyle,
    deps: &mut BitmapDeps,
) -> Result<shape::MorphFillStyle, DecodeError> {
    Ok(match style {
        tags::MorphFillStyle::Solid { color, morph_color } => shape::MorphFillStyle::Solid {
            start_color: normalize_color(*color),
            end_color: normalize_color(*morph_color),
        },
        tags::MorphFillStyle::LinearGradient {
            matrix,
            morph_matrix,
            gradient,
        } => shape::MorphFillStyle::LinearGradient {
            start_matrix: normalize_matrix(matrix, GRADIENT_MATRIX_SCALE),
            end_matrix: normalize_matrix(morph_matrix, GRADIENT_MATRIX_SCALE),
            stops: normalize_morph_stops(gradient),
        },
        tags::MorphFillStyle::RadialGradient {
            matrix,
            morph_matrix,
            gradient,
        } => shape::MorphFillStyle::RadialGradient {
            start_matrix: normalize_matrix(matrix, GRADIENT_MATRIX_SCALE),
            end_matrix: normalize_matrix(morph_matrix, GRADIENT_MATRIX_SCALE),
            stops: normalize_morph_stops(gradient),
        },
        tags::MorphFillStyle::FocalGradient {
            matrix,
            morph_matrix,
            gradient,
            focal_point,
            morph_focal_point,
        } => shape::MorphFillStyle::FocalGradient {
            start_matrix: normalize_matrix(matrix, GRADIENT_MATRIX_SCALE),
            end_matrix: normalize_matrix(morph_matrix, GRADIENT_MATRIX_SCALE),
            stops: normalize_morph_stops(gradient),
            start_focal_point: *focal_point,
            end_focal_point: *morph_focal_point,
        },
        tags::MorphFillStyle::Bitmap {
            bitmap_id,
            matrix,
            morph_matrix,
            kind,
        } => {
            let (repeat, smooth) = bitmap_flags(*kind)?;
            shape::MorphFillStyle::Bitmap {
                bitmap: deps.index_of(*bitmap_id),
                start_matrix: normalize_matrix(matrix, BITMAP_MATRIX_SCALE),
                end_matrix: normalize_matrix(morph_matrix, BITMAP_MATRIX_SCALE),
                repeat,
                smooth,
            }
        }
    })
}

fn normalize_morph_line(
    style: &tags::MorphLineStyle,
    deps: &mut BitmapDeps,
) -> Result<shape::MorphLineStyle, DecodeError> {
    Ok(shape::MorphLineStyle {
        start_width: style.width as i32,
        end_width: style.morph_width as i32,
        start_color: normalize_color(style.color),
        end_color: normalize_color(style.morph_color),
        start_cap: cap_style(style.start_cap)?,
        end_cap: cap_style(style.end_cap)?,
        join: join_style(style.join)?,
        miter_limit: miter_limit(style.miter_limit_factor),
        no_h_scale: style.no_h_scale,
        no_v_scale: style.no_v_scale,
        pixel_hinting: style.pixel_hinting,
        fill_override: style
            .fill
            .as_ref()
            .map(|fill| normalize_morph_fill(fill, deps))
            .transpose()?,
    })
}

fn normalize_color(color: tags::Color) -> shape::Color {
    shape::Color {
        r: color.r as f32 / 255.0,
        g: color.g as f32 / 255.0,
        b: color.b as f32 / 255.0,
        a: color.a as f32 / 255.0,
    }
}

fn normalize_matrix(matrix: &tags::Matrix, scale: f32) -> shape::Matrix {
    shape::Matrix {
        a: matrix.a * scale,
        b: matrix.b * scale,
        c: matrix.c * scale,
        d: matrix.d * scale,
        tx: matrix.tx as f32 / TWIPS_PER_PIXEL,
        ty: matrix.ty as f32 / TWIPS_PER_PIXEL,
    }
}

fn normalize_stops(gradient: &tags::Gradient) -> Vec<shape::GradientStop> {
    gradient
        .stops
        .iter()
        .map(|stop| shape::GradientStop {
            ratio: stop.ratio,
            color: normalize_color(stop.color),
        })
        .collect()
}

fn normalize_morph_stops(gradient: &tags::MorphGradient) -> Vec<shape::MorphGradientStop> {
    gradient
        .stops
        .iter()
        .map(|stop| shape::MorphGradientStop {
            start_ratio: stop.ratio,
            end_ratio: stop.morph_ratio,
            start_color: normalize_color(stop.color),
            end_color: normalize_color(stop.morph_color),
        })
        .collect()
}

fn bitmap_flags(kind: u8) -> Result<(bool, bool), DecodeError> {
    // (repeat, smooth)
    match kind {
        tags::BITMAP_FILL_REPEATING => Ok((true, true)),
        tags::BITMAP_FILL_CLIPPED => Ok((false, true)),
        tags::BITMAP_FILL_NONSMOOTHED_REPEATING => Ok((true, false)),
        tags::BITMAP_FILL_NONSMOOTHED_CLIPPED => Ok((false, false)),
        other => Err(DecodeError::UnsupportedFillKind(other)),
    }
}

fn cap_style(code: u8) -> Result<shape::CapStyle, DecodeError> {
    match code {
        tags::CAP_ROUND => Ok(shape::CapStyle::Round),
        tags::CAP_NONE => Ok(shape::CapStyle::None),
        tags::CAP_SQUARE => Ok(shape::CapStyle::Square),
        other => Err(DecodeError::UnsupportedLineKind(other)),
    }
}

fn join_style(code: u8) -> Result<shape::JoinStyle, DecodeError> {
    match code {
        tags::JOIN_ROUND => Ok(shape::JoinStyle::Round),
        tags::JOIN_BEVEL => Ok(shape::JoinStyle::Bevel),
        tags::JOIN_MITER => Ok(shape::JoinStyle::Miter),
        other => Err(DecodeError::UnsupportedLineKind(other)),
    }
}

fn miter_limit(factor: f32) -> f32 {
    factor.max(1.5) * 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_color_is_normalized() {
        let mut deps = BitmapDeps::new();
        let fill = normalize_fill(
            &tags::FillStyle::Solid {
                color: tags::Color::new(255, 0, 51, 128),
            },
            &mut deps,
        )
        .unwrap();
        let shape::FillStyle::Solid { color } = fill else {
            panic!("solid stays solid");
        };
        assert_eq!(color.r, 1.0);
        assert_eq!(color.g, 0.0);
        assert_eq!(color.b, 0.2);
        assert!((color.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_gradient_matrix_scale() {
        let mut deps = BitmapDeps::new();
        let fill = normalize_fill(
            &tags::FillStyle::LinearGradient {
                matrix: tags::Matrix {
                    a: 1.0,
                    b: 0.0,
                    c: 0.0,
                    d: 2.0,
                    tx: 40,
                    ty: -20,
                },
                gradient: tags::Gradient {
                    stops: vec![
                        tags::GradientStop {
                            ratio: 0.0,
                            color: tags::Color::new(0, 0, 0, 255),
                        },
                        tags::GradientStop {
                            ratio: 1.0,
                            color: tags::Color::new(255, 255, 255, 255),
                        },
                    ],
                },
            },
            &mut deps,
        )
        .unwrap();
        let shape::FillStyle::LinearGradient { matrix, stops } = fill else {
            panic!("gradient stays a gradient");
        };
        assert_eq!(matrix.a, 819.2);
        assert_eq!(matrix.d, 1638.4);
        assert_eq!(matrix.tx, 2.0);
        assert_eq!(matrix.ty, -1.0);
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].ratio, 0.0);
        assert_eq!(stops[1].ratio, 1.0);
    }

    #[test]
    fn test_bitmap_fill_kinds() {
        let matrix = tags::Matrix::IDENTITY;
        let cases = [
            (tags::BITMAP_FILL_REPEATING, true, true),
            (tags::BITMAP_FILL_CLIPPED, false, true),
            (tags::BITMAP_FILL_NONSMOOTHED_REPEATING, true, false),
            (tags::BITMAP_FILL_NONSMOOTHED_CLIPPED, false, false),
        ];
        for (kind, want_repeat, want_smooth) in cases {
            let mut deps = BitmapDeps::new();
            let fill = normalize_fill(
                &tags::FillStyle::Bitmap {
                    bitmap_id: 9,
                    matrix,
                    kind,
                },
                &mut deps,
            )
            .unwrap();
            let shape::FillStyle::Bitmap {
                bitmap,
                matrix,
                repeat,
                smooth,
            } = fill
            else {
                panic!("bitmap stays a bitmap");
            };
            assert_eq!(bitmap, 0);
            assert_eq!(repeat, want_repeat);
            assert_eq!(smooth, want_smooth);
            assert_eq!(matrix.a, 0.05);
        }
    }

    #[test]
    fn test_unknown_bitmap_kind_is_rejected() {
        let mut deps = BitmapDeps::new();
        let err = normalize_fill(
            &tags::FillStyle::Bitmap {
                bitmap_id: 9,
                matrix: tags::Matrix::IDENTITY,
                kind: 0x44,
            },
            &mut deps,
        )
        .unwrap_err();
        assert_eq!(err, DecodeError::UnsupportedFillKind(0x44));
    }

    #[test]
    fn test_bitmap_ids_become_indices() {
        let mut deps = BitmapDeps::new();
        let styles = tags::ShapeStyles {
            fill_styles: vec![
                tags::FillStyle::Bitmap {
                    bitmap_id: 40,
                    matrix: tags::Matrix::IDENTITY,
                    kind: tags::BITMAP_FILL_REPEATING,
                },
                tags::FillStyle::Bitmap {
                    bitmap_id: 17,
                    matrix: tags::Matrix::IDENTITY,
                    kind: tags::BITMAP_FILL_CLIPPED,
                },
                tags::FillStyle::Bitmap {
                    bitmap_id: 40,
                    matrix: tags::Matrix::IDENTITY,
                    kind: tags::BITMAP_FILL_CLIPPED,
                },
            ],
            line_styles: vec![],
        };
        let (fills, _) = normalize_styles(&styles, &mut deps).unwrap();
        let indices: Vec<usize> = fills
            .iter()
            .map(|fill| match fill {
                shape::FillStyle::Bitmap { bitmap, .. } => *bitmap,
                _ => panic!("all fills are bitmaps"),
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 0]);
        assert_eq!(deps.ids(), &[40, 17]);
    }

    #[test]
    fn test_miter_limit_floor() {
        let mut deps = BitmapDeps::new();
        let mut raw = tags::LineStyle::solid(20, tags::Color::new(0, 0, 0, 255));
        raw.join = tags::JOIN_MITER;
        raw.miter_limit_factor = 1.0;
        let line = normalize_line(&raw, &mut deps).unwrap();
        assert_eq!(line.miter_limit, 3.0);

        raw.miter_limit_factor = 4.0;
        let line = normalize_line(&raw, &mut deps).unwrap();
        assert_eq!(line.miter_limit, 8.0);
        assert_eq!(line.join, shape::JoinStyle::Miter);
    }

    #[test]
    fn test_unknown_cap_code_is_rejected() {
        let mut deps = BitmapDeps::new();
        let mut raw = tags::LineStyle::solid(20, tags::Color::new(0, 0, 0, 255));
        raw.start_cap = 7;
        let err = normalize_line(&raw, &mut deps).unwrap_err();
        assert_eq!(err, DecodeError::UnsupportedLineKind(7));
    }

    #[test]
    fn test_nested_line_fill_is_preserved() {
        let mut deps = BitmapDeps::new();
        let mut raw = tags::LineStyle::solid(40, tags::Color::new(0, 0, 0, 255));
        raw.fill = Some(tags::FillStyle::Bitmap {
            bitmap_id: 3,
            matrix: tags::Matrix::IDENTITY,
            kind: tags::BITMAP_FILL_REPEATING,
        });
        let line = normalize_line(&raw, &mut deps).unwrap();
        let Some(shape::FillStyle::Bitmap { bitmap, .. }) = line.fill_override else {
            panic!("nested fill carried through");
        };
        assert_eq!(bitmap, 0);
        assert_eq!(deps.ids(), &[3]);
    }

    #[test]
    fn test_morph_style_pairs_both_frames() {
        let mut deps = BitmapDeps::new();
        let styles = tags::MorphShapeStyles {
            fill_styles: vec![tags::MorphFillStyle::Solid {
                color: tags::Color::new(255, 0, 0, 255),
                morph_color: tags::Color::new(0, 0, 255, 255),
            }],
            line_styles: vec![tags::MorphLineStyle::solid(
                20,
                100,
                tags::Color::new(0, 0, 0, 255),
                tags::Color::new(255, 255, 255, 255),
            )],
        };
        let (fills, lines) = normalize_morph_styles(&styles, &mut deps).unwrap();
        let shape::MorphFillStyle::Solid {
            start_color,
            end_color,
        } = &fills[0]
        else {
            panic!("solid stays solid");
        };
        assert_eq!(start_color.r, 1.0);
        assert_eq!(end_color.b, 1.0);
        assert_eq!(lines[0].start_width, 20);
        assert_eq!(lines[0].end_width, 100);
    }
}
