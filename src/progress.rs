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

use crate::{
    metadata::VideoDuration,
    raster::{self, Rgb},
};
use image::RgbaImage;

/// Colour of the bar for live streams.
pub const ATTENTION: Rgb = [255, 0, 0];
/// Colour of the unplayed part of the bar.
pub const REMAINING: Rgb = [255, 255, 255];

const PLAYED_THICKNESS: u32 = 9;
const REMAINING_THICKNESS: u32 = 8;
const MARKER_RADIUS: u32 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: u32,
    pub end: u32,
    pub thickness: u32,
    pub color: Rgb,
}

/// The duration bar under the channel line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// One solid bar, no scrubber position.
    Live { length: u32 },
    /// Played part in `accent`, the rest in `REMAINING`.
    Split { length: u32, played: u32, accent: Rgb },
}

impl Indicator {
    /// `sample` is a uniformly random number that picks the played fraction.
    #[inline]
    pub fn new(duration: &VideoDuration, length: u32, accent: Rgb, sample: u32) -> Self {
        match duration {
            VideoDuration::Live => Self::Live { length },
            VideoDuration::Timed(_) => Self::Split {
                length,
                played: played_length(length, sample),
                accent,
            },
        }
    }

    #[inline]
    pub fn segments(&self) -> Vec<Segment> {
        match *self {
            Self::Live { length } => vec![Segment {
                start: 0,
                end: length,
                thickness: PLAYED_THICKNESS,
                color: ATTENTION,
            }],
            Self::Split {
                length,
                played,
                accent,
            } => vec![
                Segment {
                    start: 0,
                    end: played,
                    thickness: PLAYED_THICKNESS,
                    color: accent,
                },
                Segment {
                    start: played,
                    end: length,
                    thickness: REMAINING_THICKNESS,
                    color: REMAINING,
                },
            ],
        }
    }

    /// Where the round marker sits, relative to the start of the bar.
    #[inline]
    pub fn marker(&self) -> (u32, Rgb) {
        match *self {
            Self::Live { length } => (length, ATTENTION),
            Self::Split { played, accent, .. } => (played, accent),
        }
    }

    /// Draw the bar starting at `(x, y)`, `y` being its centre line.
    #[inline]
    pub fn draw(&self, img: &mut RgbaImage, x: u32, y: u32) {
        for seg in self.segments() {
            raster::draw_hline(img, x + seg.start, x + seg.end, y, seg.thickness, seg.color);
        }
        let (at, color) = self.marker();
        raster::fill_circle(img, (x + at) as i64, y as i64, MARKER_RADIUS, color);
    }
}

/// Map `sample` to a length strictly between 15% and 85% of `total`.
#[inline]
pub fn played_length(total: u32, sample: u32) -> u32 {
    let total = total as u64;
    let lo = total * 15 / 100 + 1;
    let hi = (total * 85 + 99) / 100 - 1;
    if total == 0 || hi < lo {
        return (total / 2) as u32;
    }
    (lo + sample as u64 % (hi - lo + 1)) as u32
}
