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

use crate::config::RendererConfig;
use image::RgbaImage;
use rusttype::Font;
use std::path::Path;
use tokio::{
    fs::File,
    io::{AsyncReadExt, BufReader},
};

/// Fonts and images the layout draws with. Loaded once per `Context`.
pub struct Assets {
    pub body_font: Font<'static>,
    pub body_alt_font: Font<'static>,
    pub title_font: Font<'static>,
    pub icon_strip: RgbaImage,
}

impl Assets {
    #[inline]
    pub async fn load(cfg: &RendererConfig, log_target: &str) -> crate::Result<Self> {
        log::info!(target: log_target, "Loading assets from {:?}", &cfg.assets_dir);
        let body_font = load_font(&cfg.asset(&cfg.body_font)).await?;
        let body_alt_font = load_font(&cfg.asset(&cfg.body_alt_font)).await?;
        let title_font = load_font(&cfg.asset(&cfg.title_font)).await?;

        let icon_data = read_all(&cfg.asset(&cfg.icon_strip)).await?;
        let icon_strip = tokio::task::spawn_blocking(move || {
            crate::Result::Ok(image::load_from_memory(&icon_data)?.to_rgba8())
        })
        .await??;

        Ok(Self {
            body_font,
            body_alt_font,
            title_font,
            icon_strip,
        })
    }
}

#[inline]
async fn read_all(path: &Path) -> crate::Result<Vec<u8>> {
    let mut file = BufReader::new(File::open(path).await?);
    let mut data = vec![];
    file.read_to_end(&mut data).await?;
    Ok(data)
}

#[inline]
async fn load_font(path: &Path) -> crate::Result<Font<'static>> {
    let data = read_all(path).await?;
    Font::try_from_vec(data).ok_or_else(|| crate::Error::Font(path.to_path_buf()))
}
