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
    assets::Assets,
    metadata::VideoMetadata,
    progress::Indicator,
    raster::{self, Rgb},
    text,
};
use image::{imageops, RgbaImage};
use nanorand::{tls_rng, RNG};
use rusttype::Font;

pub const WIDTH: u32 = 1280;
pub const HEIGHT: u32 = 720;

const BLUR_RADIUS: u32 = 20;
const BRIGHTNESS: f32 = 0.6;
const GRADIENT_ALPHA: f32 = 0.25;
const GRADIENT_PEAK: u8 = 255;

const AVATAR_DIAMETER: u32 = 400;
const AVATAR_BORDER: u32 = 20;
const AVATAR_CROP_SCALE: f32 = 1.5;
const AVATAR_POS: (u32, u32) = (120, 160);

pub const TEXT_X: u32 = 565;
const TITLE_BUDGET: usize = 30;
const TITLE_SIZE: f32 = 45.0;
const TITLE_LINES_Y: [u32; 2] = [180, 230];
const BODY_SIZE: f32 = 30.0;
const CHANNEL_Y: u32 = 320;

pub const BAR_Y: u32 = 380;
pub const BAR_LENGTH: u32 = 580;
const CLOCK_Y: u32 = 400;
const DURATION_X: u32 = 1080;

const ICONS_POS: (u32, u32) = (565, 450);
const ICONS_SIZE: (u32, u32) = (580, 62);

const WHITE: Rgb = [255, 255, 255];

/// The random choices that make each render look a little different.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub gradient_start: Rgb,
    pub gradient_end: Rgb,
    pub accent: Rgb,
    pub played_sample: u32,
}

impl Palette {
    #[inline]
    pub fn random() -> Self {
        let mut rng = tls_rng();
        let mut color = || -> Rgb { [rng.generate(), rng.generate(), rng.generate()] };
        let (gradient_start, gradient_end, accent) = (color(), color(), color());
        Self {
            gradient_start,
            gradient_end,
            accent,
            played_sample: rng.generate(),
        }
    }
}

/// Lay the whole card out. `source` is the thumbnail exactly as downloaded.
#[inline]
pub fn compose(
    source: &RgbaImage,
    meta: &VideoMetadata,
    assets: &Assets,
    palette: &Palette,
) -> RgbaImage {
    // backdrop
    let stretched = raster::stretch_to(source, WIDTH, HEIGHT);
    let mut canvas = raster::box_blur(&stretched, BLUR_RADIUS);
    raster::brighten(&mut canvas, BRIGHTNESS);
    let gradient = raster::vertical_gradient(
        WIDTH,
        HEIGHT,
        palette.gradient_start,
        palette.gradient_end,
        GRADIENT_PEAK,
    );
    raster::blend(&mut canvas, &gradient, GRADIENT_ALPHA);

    // the disc is cut from the undistorted source
    let avatar = raster::crop_center_circle(
        source,
        AVATAR_DIAMETER,
        AVATAR_BORDER,
        palette.gradient_start,
        AVATAR_CROP_SCALE,
    );
    imageops::overlay(&mut canvas, &avatar, AVATAR_POS.0, AVATAR_POS.1);

    let x = TEXT_X as i64;
    let lines = text::wrap_title(&meta.title, TITLE_BUDGET);
    for (line, y) in lines.iter().zip(TITLE_LINES_Y.iter()) {
        text::draw_text_with_shadow(
            &mut canvas,
            &assets.title_font,
            TITLE_SIZE,
            (x, *y as i64),
            line,
            WHITE,
        );
    }
    text::draw_text_with_shadow(
        &mut canvas,
        &assets.body_font,
        BODY_SIZE,
        (x, CHANNEL_Y as i64),
        &format!("{}  |  {}", meta.channel, meta.views),
        WHITE,
    );

    Indicator::new(&meta.duration, BAR_LENGTH, palette.accent, palette.played_sample).draw(
        &mut canvas,
        TEXT_X,
        BAR_Y,
    );

    text::draw_text_with_shadow(
        &mut canvas,
        &assets.body_alt_font,
        BODY_SIZE,
        (x, CLOCK_Y as i64),
        "00:00",
        WHITE,
    );
    let label = meta.duration.to_string();
    text::draw_text_with_shadow(
        &mut canvas,
        &assets.body_alt_font,
        BODY_SIZE,
        (duration_label_x(&assets.body_alt_font, &label), CLOCK_Y as i64),
        &label,
        WHITE,
    );

    let icons = imageops::resize(
        &assets.icon_strip,
        ICONS_SIZE.0,
        ICONS_SIZE.1,
        imageops::FilterType::Triangle,
    );
    imageops::overlay(&mut canvas, &icons, ICONS_POS.0, ICONS_POS.1);

    canvas
}

// long labels are pulled left so they end with the bar
#[inline]
fn duration_label_x(font: &Font<'static>, label: &str) -> i64 {
    let bar_end = (TEXT_X + BAR_LENGTH) as f32;
    let width = text::text_width(font, BODY_SIZE, label);
    (DURATION_X as f32).min(bar_end - width).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::RendererConfig, metadata::VideoDuration};
    use image::Rgba;
    use std::{path::PathBuf, time::Duration};

    async fn assets() -> Assets {
        let cfg = RendererConfig {
            assets_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets"),
            ..Default::default()
        };
        Assets::load(&cfg, "test").await.unwrap()
    }

    fn meta(duration: VideoDuration) -> VideoMetadata {
        VideoMetadata {
            title: "Some Rather Long Song Title That Needs Two Lines".into(),
            duration,
            thumbnail_url: "https://i.ytimg.com/vi/abc/hqdefault.jpg".into(),
            views: "1.2M views".into(),
            channel: "Channel".into(),
        }
    }

    const PALETTE: Palette = Palette {
        gradient_start: [10, 20, 200],
        gradient_end: [200, 20, 10],
        accent: [0, 255, 0],
        played_sample: 7,
    };

    #[tokio::test]
    async fn timed_card() {
        let assets = assets().await;
        let source = RgbaImage::from_pixel(480, 360, Rgba([250, 200, 40, 255]));
        let card = compose(
            &source,
            &meta(VideoDuration::Timed(Duration::from_secs(213))),
            &assets,
            &PALETTE,
        );
        assert_eq!(card.dimensions(), (WIDTH, HEIGHT));

        // middle of the disc shows the source, its rim the border colour
        let face = card.get_pixel(AVATAR_POS.0 + 200, AVATAR_POS.1 + 200).0;
        assert!(face[0] >= 249 && face[1] >= 199 && face[1] <= 201);
        assert_eq!(card.get_pixel(AVATAR_POS.0 + 200, AVATAR_POS.1 + 5).0, [10, 20, 200, 255]);

        // start of the bar is the accent, the far end is white
        assert_eq!(card.get_pixel(TEXT_X + 5, BAR_Y).0, [0, 255, 0, 255]);
        assert_eq!(card.get_pixel(TEXT_X + BAR_LENGTH - 5, BAR_Y).0, [255, 255, 255, 255]);

        // the backdrop is darkened
        let corner = card.get_pixel(5, 5).0;
        assert!(corner[0] < 250);
        assert_eq!(corner[3], 255);
    }

    #[tokio::test]
    async fn duration_label_stays_inside_the_bar() {
        let assets = assets().await;
        let font = &assets.body_alt_font;
        assert_eq!(duration_label_x(font, "3:45"), DURATION_X as i64);

        let long = "123:45:06";
        let x = duration_label_x(font, long);
        assert!(x < DURATION_X as i64);
        let end = x as f32 + text::text_width(font, BODY_SIZE, long);
        assert!(end <= (TEXT_X + BAR_LENGTH) as f32 + 1.0);
    }

    #[tokio::test]
    async fn live_card() {
        let assets = assets().await;
        let source = RgbaImage::from_pixel(1280, 720, Rgba([40, 40, 40, 255]));
        let card = compose(&source, &meta(VideoDuration::Live), &assets, &PALETTE);

        for x in [TEXT_X + 5, TEXT_X + 300, TEXT_X + BAR_LENGTH - 5].iter() {
            assert_eq!(card.get_pixel(*x, BAR_Y).0, [255, 0, 0, 255]);
        }
    }
}
