//! Structural comparison of two page captures.
//!
//! Color is treated as noise: both captures are reduced to luma and scored
//! with mean structural similarity (MSSIM), so pure hue shifts and
//! color-profile drift do not register. Alongside the score, a diff image is
//! rendered: the baseline as backdrop, differing pixels painted in a flat
//! highlight color.

use std::io::Cursor;

use {
    image::{
        DynamicImage, GenericImageView, GrayImage, ImageFormat, ImageReader, Luma, Rgba,
        RgbaImage, imageops,
    },
    image_compare::Algorithm,
};

use crate::error::{DiffError, Result};

/// Brightness delta below which a pixel is left out of the highlight.
/// Filters anti-aliasing noise, and keeps the visualization consistent with
/// the scoring: pure hue shifts at equal luma do not highlight.
const DIFF_TOLERANCE: f64 = 16.0;

/// Flat color painted over differing pixels.
const DIFF_HIGHLIGHT: Rgba<u8> = Rgba([255, 0, 255, 255]);

/// Outcome of a successful comparison.
#[derive(Debug, Clone)]
pub struct Comparison {
    /// Structural mismatch in [0, 100]; 0.0 means visually identical.
    pub mismatch_percent: f64,
    /// PNG-encoded visualization highlighting differing regions.
    pub diff_png: Vec<u8>,
}

/// Compare two PNG-encoded captures of the same page.
///
/// Images of different dimensions are not an error: both are padded to the
/// union of their dimensions (black fill) before scoring, so content that
/// grew or shrank the page registers as mismatch.
pub fn compare_images(baseline_png: &[u8], current_png: &[u8]) -> Result<Comparison> {
    let baseline = decode("baseline", baseline_png)?;
    let current = decode("current", current_png)?;

    let width = baseline.width().max(current.width());
    let height = baseline.height().max(current.height());

    let base_gray = pad_gray(baseline.to_luma8(), width, height);
    let cur_gray = pad_gray(current.to_luma8(), width, height);

    let similarity =
        image_compare::gray_similarity_structure(&Algorithm::MSSIMSimple, &base_gray, &cur_gray)
            .map_err(|e| DiffError::Compare(format!("{e:?}")))?;
    let mismatch_percent = mismatch_from_score(similarity.score)?;

    let base_rgba = pad_rgba(&baseline, width, height);
    let cur_rgba = pad_rgba(&current, width, height);
    let diff_png = encode_png(render_diff(&base_rgba, &cur_rgba))?;

    Ok(Comparison {
        mismatch_percent,
        diff_png,
    })
}

fn decode(which: &'static str, data: &[u8]) -> Result<DynamicImage> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| DiffError::Decode(format!("{which}: {e}")))?
        .decode()
        .map_err(|e| DiffError::Decode(format!("{which}: {e}")))
}

/// Map an MSSIM score (1.0 = identical) to a mismatch percentage in [0, 100].
fn mismatch_from_score(score: f64) -> Result<f64> {
    if !score.is_finite() {
        return Err(DiffError::Compare(format!(
            "non-finite similarity score: {score}"
        )));
    }
    Ok((1.0 - score).clamp(0.0, 1.0) * 100.0)
}

fn pad_gray(img: GrayImage, width: u32, height: u32) -> GrayImage {
    if img.dimensions() == (width, height) {
        return img;
    }
    let mut canvas = GrayImage::from_pixel(width, height, Luma([0]));
    imageops::replace(&mut canvas, &img, 0, 0);
    canvas
}

fn pad_rgba(img: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let rgba = img.to_rgba8();
    if rgba.dimensions() == (width, height) {
        return rgba;
    }
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
    imageops::replace(&mut canvas, &rgba, 0, 0);
    canvas
}

/// Render the visual diff: the baseline as backdrop, pixels whose brightness
/// moved past the tolerance painted in the highlight color.
fn render_diff(baseline: &RgbaImage, current: &RgbaImage) -> RgbaImage {
    let (width, height) = baseline.dimensions();
    let mut diff = RgbaImage::new(width, height);

    for (x, y, out) in diff.enumerate_pixels_mut() {
        let a = baseline.get_pixel(x, y);
        let b = current.get_pixel(x, y);
        *out = if (luma(a) - luma(b)).abs() < DIFF_TOLERANCE {
            *a
        } else {
            DIFF_HIGHLIGHT
        };
    }

    diff
}

/// Rec. 601 luma of one pixel.
fn luma(px: &Rgba<u8>) -> f64 {
    0.299 * f64::from(px[0]) + 0.587 * f64::from(px[1]) + 0.114 * f64::from(px[2])
}

fn encode_png(img: RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| DiffError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}
