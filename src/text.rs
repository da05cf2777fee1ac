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

use crate::raster::{self, Rgb};
use image::{imageops, Rgba, RgbaImage};
use rusttype::{point, vector, Font, PositionedGlyph, Scale};

const SHADOW_OFFSET: (i64, i64) = (3, 3);
const SHADOW_BLUR: f32 = 5.0;

/// Split a title over two lines of fewer than `budget` characters each.
///
/// Words are packed in order. Once a word misses the first line it and
/// everything after it go on the second. A word that does not fit the
/// second line is skipped and packing carries on with the next word.
/// Words are never broken.
#[inline]
pub fn wrap_title(title: &str, budget: usize) -> [String; 2] {
    let mut lines = [String::new(), String::new()];
    let mut current = 0;

    for word in title.split_whitespace() {
        let word_len = word.chars().count();
        if word_len >= budget {
            // can never fit anywhere
            continue;
        }

        loop {
            let line = &mut lines[current];
            let needed = line.chars().count() + word_len + if line.is_empty() { 0 } else { 1 };
            if needed < budget {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(word);
                break;
            }
            if current + 1 == lines.len() {
                break;
            }
            current += 1;
        }
    }

    lines
}

// lay glyphs out along one baseline, kerning between pairs
#[inline]
fn layout_line(
    font: &Font<'static>,
    scale: Scale,
    text: &str,
    x: f32,
    y: f32,
) -> Vec<PositionedGlyph<'static>> {
    let ascent = font.v_metrics(scale).ascent;
    let start = point(x, y + ascent);

    text.chars()
        .map(|c| font.glyph(c).scaled(scale))
        .scan((None, 0.0f32), move |(last, caret), glyph| {
            if let Some(last) = last.take() {
                *caret += font.pair_kerning(scale, last, glyph.id());
            }
            let w = glyph.h_metrics().advance_width;
            let next = glyph.positioned(start + vector(*caret, 0.0));
            *last = Some(next.id());
            *caret += w;
            Some(next)
        })
        .collect()
}

/// Width in pixels `text` takes at `size`.
#[inline]
pub fn text_width(font: &Font<'static>, size: f32, text: &str) -> f32 {
    layout_line(font, Scale::uniform(size), text, 0.0, 0.0)
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

#[inline]
fn draw_glyphs(
    img: &mut RgbaImage,
    glyphs: &[PositionedGlyph<'static>],
    color: Rgb,
    dx: i64,
    dy: i64,
) {
    for glyph in glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|x, y, coverage| {
                raster::blend_pixel(
                    img,
                    bb.min.x as i64 + x as i64 + dx,
                    bb.min.y as i64 + y as i64 + dy,
                    color,
                    coverage,
                );
            });
        }
    }
}

/// Draw `text` with its top-left corner at `(x, y)`.
#[inline]
pub fn draw_text(
    img: &mut RgbaImage,
    font: &Font<'static>,
    size: f32,
    (x, y): (i64, i64),
    text: &str,
    color: Rgb,
) {
    let glyphs = layout_line(font, Scale::uniform(size), text, x as f32, y as f32);
    draw_glyphs(img, &glyphs, color, 0, 0);
}

/// `draw_text`, on top of a blurred black copy nudged down and to the right.
#[inline]
pub fn draw_text_with_shadow(
    img: &mut RgbaImage,
    font: &Font<'static>,
    size: f32,
    (x, y): (i64, i64),
    text: &str,
    color: Rgb,
) {
    let glyphs = layout_line(font, Scale::uniform(size), text, x as f32, y as f32);

    let bounds = glyphs
        .iter()
        .filter_map(|g| g.pixel_bounding_box())
        .fold(None, |acc: Option<(i64, i64, i64, i64)>, bb| {
            let (x0, y0, x1, y1) = (
                bb.min.x as i64,
                bb.min.y as i64,
                bb.max.x as i64,
                bb.max.y as i64,
            );
            Some(match acc {
                None => (x0, y0, x1, y1),
                Some((a, b, c, d)) => (a.min(x0), b.min(y0), c.max(x1), d.max(y1)),
            })
        });

    if let Some((x0, y0, x1, y1)) = bounds {
        // leave room for the blur to fade out
        let margin = (SHADOW_BLUR * 3.0).ceil() as i64;
        let (px, py) = (x0 - margin, y0 - margin);
        let mut patch = RgbaImage::from_pixel(
            (x1 - x0 + 2 * margin) as u32,
            (y1 - y0 + 2 * margin) as u32,
            Rgba([0, 0, 0, 0]),
        );
        draw_glyphs(&mut patch, &glyphs, [0, 0, 0], -px, -py);
        let shadow = imageops::blur(&patch, SHADOW_BLUR);
        raster::overlay_at(img, &shadow, px + SHADOW_OFFSET.0, py + SHADOW_OFFSET.1);
    }

    draw_glyphs(img, &glyphs, color, 0, 0);
}
