/*
 * This file is part of NOWPLAYING.
 *
 * NOWPLAYING is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * NOWPLAYING is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Afero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with NOWPLAYING.  If not, see <https://www.gnu.org/licenses/>.
 */

//! Plain RGBA compositing helpers. Nothing here allocates more than one image per call.

use image::{
    imageops::{self, FilterType},
    GenericImageView, Pixel, Rgba, RgbaImage,
};
use std::cmp;

pub type Rgb = [u8; 3];

/// Resize to exactly `width`x`height`, scaling each axis on its own.
#[inline]
pub fn stretch_to(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    imageops::resize(img, width, height, FilterType::CatmullRom)
}

// one pass of a running-sum box filter along rows (horizontal) or columns
#[inline]
fn box_pass(src: &RgbaImage, radius: u32, horizontal: bool) -> RgbaImage {
    let (width, height) = src.dimensions();
    let (len, lines) = if horizontal {
        (width, height)
    } else {
        (height, width)
    };
    let at = |line: u32, i: i64| -> Rgba<u8> {
        let i = i.max(0).min(len as i64 - 1) as u32;
        if horizontal {
            *src.get_pixel(i, line)
        } else {
            *src.get_pixel(line, i)
        }
    };

    let r = radius as i64;
    let window = (2 * r + 1) as u32;
    let mut out = RgbaImage::new(width, height);
    for line in 0..lines {
        let mut sum = [0u32; 4];
        for i in -r..=r {
            for (s, c) in sum.iter_mut().zip(at(line, i).0.iter()) {
                *s += *c as u32;
            }
        }

        for i in 0..len as i64 {
            let px = Rgba([
                (sum[0] / window) as u8,
                (sum[1] / window) as u8,
                (sum[2] / window) as u8,
                (sum[3] / window) as u8,
            ]);
            if horizontal {
                out.put_pixel(i as u32, line, px);
            } else {
                out.put_pixel(line, i as u32, px);
            }

            let (leaving, entering) = (at(line, i - r), at(line, i + r + 1));
            for c in 0..4 {
                sum[c] = sum[c] + entering[c] as u32 - leaving[c] as u32;
            }
        }
    }
    out
}

/// Box blur with edge pixels extended outward.
#[inline]
pub fn box_blur(img: &RgbaImage, radius: u32) -> RgbaImage {
    if radius == 0 || img.width() == 0 || img.height() == 0 {
        return img.clone();
    }
    box_pass(&box_pass(img, radius, true), radius, false)
}

/// Scale the colour channels by `factor`, leaving alpha alone.
#[inline]
pub fn brighten(img: &mut RgbaImage, factor: f32) {
    for pixel in img.pixels_mut() {
        for c in pixel.0.iter_mut().take(3) {
            *c = (*c as f32 * factor).round().max(0.0).min(255.0) as u8;
        }
    }
}

/// Top-to-bottom ramp from `start` towards `end`. `mask_peak` is how far the ramp gets by the last row.
#[inline]
pub fn vertical_gradient(width: u32, height: u32, start: Rgb, end: Rgb, mask_peak: u8) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    for y in 0..height {
        let mask = (mask_peak as u32 * y / cmp::max(height, 1)) as f32 / 255.0;
        let mut row = [0u8; 4];
        for c in 0..3 {
            row[c] = (start[c] as f32 + (end[c] as f32 - start[c] as f32) * mask).round() as u8;
        }
        row[3] = 255;
        for x in 0..width {
            img.put_pixel(x, y, Rgba(row));
        }
    }
    img
}

/// `base = base * (1 - alpha) + top * alpha` on every channel. Both images must be the same size.
#[inline]
pub fn blend(base: &mut RgbaImage, top: &RgbaImage, alpha: f32) {
    debug_assert_eq!(base.dimensions(), top.dimensions());
    for (b, t) in base.pixels_mut().zip(top.pixels()) {
        for c in 0..4 {
            b[c] = (b[c] as f32 * (1.0 - alpha) + t[c] as f32 * alpha).round() as u8;
        }
    }
}

// coverage of a pixel centre at `dist` from a circle edge of radius `radius`
#[inline]
fn coverage(dist: f32, radius: f32) -> f32 {
    (radius - dist + 0.5).max(0.0).min(1.0)
}

/// Cut a bordered disc out of the middle of `img`.
///
/// A square `crop_scale` times the diameter (clamped to the shorter side of
/// `img`) is taken from the centre, shrunk to fit inside the border, and put
/// on a disc of `border_color`. Everything outside the disc is transparent.
#[inline]
pub fn crop_center_circle(
    img: &RgbaImage,
    diameter: u32,
    border: u32,
    border_color: Rgb,
    crop_scale: f32,
) -> RgbaImage {
    let (width, height) = img.dimensions();
    let side = cmp::min(
        (diameter as f32 * crop_scale) as u32,
        cmp::min(width, height),
    )
    .max(1);
    let (cx, cy) = ((width - side) / 2, (height - side) / 2);

    let inner = diameter.saturating_sub(2 * border).max(1);
    let face = imageops::resize(
        &img.view(cx, cy, side, side).to_image(),
        inner,
        inner,
        FilterType::CatmullRom,
    );

    let outer_r = diameter as f32 / 2.0;
    let inner_r = inner as f32 / 2.0;
    let [br, bg, bb] = border_color;

    RgbaImage::from_fn(diameter, diameter, |x, y| {
        let dx = x as f32 + 0.5 - outer_r;
        let dy = y as f32 + 0.5 - outer_r;
        let dist = (dx * dx + dy * dy).sqrt();

        let outer = coverage(dist, outer_r);
        if outer <= 0.0 {
            return Rgba([0, 0, 0, 0]);
        }

        let mut px = Rgba([br, bg, bb, 255]);
        let inside = coverage(dist, inner_r);
        if inside > 0.0 {
            let (fx, fy) = (x as i64 - border as i64, y as i64 - border as i64);
            if fx >= 0 && fy >= 0 && (fx as u32) < inner && (fy as u32) < inner {
                let mut f = *face.get_pixel(fx as u32, fy as u32);
                f[3] = (f[3] as f32 * inside) as u8;
                px.blend(&f);
            }
        }
        px[3] = (px[3] as f32 * outer) as u8;
        px
    })
}

/// Alpha-blend one pixel of `color` at `alpha` coverage. Out of bounds is a no-op.
#[inline]
pub fn blend_pixel(img: &mut RgbaImage, x: i64, y: i64, color: Rgb, alpha: f32) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 || alpha <= 0.0 {
        return;
    }
    let [r, g, b] = color;
    let a = (alpha.min(1.0) * 255.0) as u8;
    img.get_pixel_mut(x as u32, y as u32).blend(&Rgba([r, g, b, a]));
}

/// Like `imageops::overlay`, but `top` may hang off any edge of `img`.
#[inline]
pub fn overlay_at(img: &mut RgbaImage, top: &RgbaImage, x: i64, y: i64) {
    let (width, height) = (img.width() as i64, img.height() as i64);
    for (tx, ty, px) in top.enumerate_pixels() {
        let (ix, iy) = (x + tx as i64, y + ty as i64);
        if ix >= 0 && iy >= 0 && ix < width && iy < height && px[3] > 0 {
            img.get_pixel_mut(ix as u32, iy as u32).blend(px);
        }
    }
}

/// Horizontal bar `thickness` pixels tall, centred on `y`, covering `x0..x1`.
#[inline]
pub fn draw_hline(img: &mut RgbaImage, x0: u32, x1: u32, y: u32, thickness: u32, color: Rgb) {
    let top = y as i64 - (thickness as i64 / 2);
    for yy in top..top + thickness as i64 {
        for xx in x0 as i64..x1 as i64 {
            blend_pixel(img, xx, yy, color, 1.0);
        }
    }
}

/// Filled, anti-aliased circle.
#[inline]
pub fn fill_circle(img: &mut RgbaImage, cx: i64, cy: i64, radius: u32, color: Rgb) {
    let r = radius as i64;
    for y in (cy - r - 1)..=(cy + r + 1) {
        for x in (cx - r - 1)..=(cx + r + 1) {
            let (dx, dy) = ((x - cx) as f32, (y - cy) as f32);
            let dist = (dx * dx + dy * dy).sqrt();
            blend_pixel(img, x, y, color, coverage(dist, radius as f32));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(px))
    }

    // resampling may be off by one
    fn close(a: [u8; 4], b: [u8; 4]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (*x as i16 - *y as i16).abs() <= 1)
    }

    #[test]
    fn stretch_ignores_aspect() {
        let img = solid(480, 360, [10, 20, 30, 255]);
        assert_eq!(stretch_to(&img, 1280, 720).dimensions(), (1280, 720));
    }

    #[test]
    fn blur_keeps_flat_images_flat() {
        let img = solid(50, 30, [100, 150, 200, 255]);
        let blurred = box_blur(&img, 20);
        assert!(blurred.pixels().all(|p| close(p.0, [100, 150, 200, 255])));
    }

    #[test]
    fn blur_spreads_a_hard_edge() {
        let img = RgbaImage::from_fn(41, 1, |x, _| {
            if x < 20 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let blurred = box_blur(&img, 5);
        let mid = blurred.get_pixel(20, 0)[0];
        assert!(mid > 0 && mid < 255);
        assert_eq!(blurred.get_pixel(0, 0)[0], 0);
        assert_eq!(blurred.get_pixel(40, 0)[0], 255);
    }

    #[test]
    fn brightness() {
        let mut img = solid(2, 2, [200, 100, 0, 77]);
        brighten(&mut img, 0.6);
        assert_eq!(img.get_pixel(1, 1).0, [120, 60, 0, 77]);
    }

    #[test]
    fn gradient_ramps_by_row() {
        let g = vertical_gradient(4, 100, [0, 0, 0], [255, 200, 100], 255);
        assert_eq!(g.get_pixel(3, 0).0, [0, 0, 0, 255]);
        let last = g.get_pixel(0, 99).0;
        assert!(last[0] > 240 && last[1] > 190 && last[2] > 90);

        let subtle = vertical_gradient(4, 100, [0, 0, 0], [255, 255, 255], 60);
        assert!(subtle.get_pixel(0, 99)[0] <= 60);
    }

    #[test]
    fn blend_mixes_all_channels() {
        let mut base = solid(1, 1, [0, 0, 0, 255]);
        blend(&mut base, &solid(1, 1, [200, 100, 40, 255]), 0.25);
        assert_eq!(base.get_pixel(0, 0).0, [50, 25, 10, 255]);
    }

    #[test]
    fn circle_crop_layout() {
        let src = solid(1280, 720, [0, 255, 0, 255]);
        let disc = crop_center_circle(&src, 400, 20, [255, 0, 0], 1.5);
        assert_eq!(disc.dimensions(), (400, 400));

        // corners are outside the disc
        assert_eq!(disc.get_pixel(0, 0)[3], 0);
        assert_eq!(disc.get_pixel(399, 399)[3], 0);
        // ring
        assert_eq!(disc.get_pixel(200, 5).0, [255, 0, 0, 255]);
        // face
        assert!(close(disc.get_pixel(200, 200).0, [0, 255, 0, 255]));
    }

    #[test]
    fn circle_crop_small_source() {
        let src = solid(120, 90, [0, 0, 255, 255]);
        let disc = crop_center_circle(&src, 400, 20, [255, 255, 255], 1.5);
        assert!(close(disc.get_pixel(200, 200).0, [0, 0, 255, 255]));
    }

    #[test]
    fn shapes_clip_to_image() {
        let mut img = solid(20, 20, [0, 0, 0, 255]);
        draw_hline(&mut img, 5, 50, 10, 9, [255, 0, 0]);
        assert_eq!(img.get_pixel(19, 10).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(4, 10).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(10, 6).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(10, 5).0, [0, 0, 0, 255]);

        fill_circle(&mut img, 0, 0, 5, [0, 0, 255]);
        overlay_at(&mut img, &solid(4, 4, [9, 9, 9, 255]), 18, -2);
        assert_eq!(img.get_pixel(19, 0).0, [9, 9, 9, 255]);
        assert_eq!(img.get_pixel(19, 2).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 1).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(19, 19).0, [0, 0, 0, 255]);
    }
}
