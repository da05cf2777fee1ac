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

mod layout;

pub use layout::{compose, Palette, HEIGHT, WIDTH};

use crate::{
    context::Context,
    fetch::{self, HttpFetch},
    metadata::{self, VideoSearch},
    util::{random_suffix, ScratchFile},
};
use std::{path::PathBuf, sync::Arc};
use tokio::time::timeout;

/// Produces "now playing" cards and keeps them in the cache directory.
pub struct Renderer {
    ctx: Arc<Context>,
    search: Arc<dyn VideoSearch>,
    http: Arc<dyn HttpFetch>,
}

impl Renderer {
    #[inline]
    pub fn new(ctx: Arc<Context>, search: Arc<dyn VideoSearch>, http: Arc<dyn HttpFetch>) -> Self {
        Self { ctx, search, http }
    }

    #[inline]
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Path to the card for `video`, or `None` if one could not be made.
    ///
    /// Failures are logged, never returned. A failed render writes nothing to
    /// the cache, so the next call starts over.
    #[inline]
    pub async fn render(&self, video: &str) -> Option<PathBuf> {
        match self.try_render(video).await {
            Ok(path) => Some(path),
            Err(e) => {
                log::error!(
                    target: self.ctx.log_target(),
                    "Error generating thumbnail for {}: {}",
                    video,
                    e
                );
                log::debug!(target: self.ctx.log_target(), "{:?}", e);
                None
            }
        }
    }

    /// `render`, with the error handed back.
    #[inline]
    pub async fn try_render(&self, video: &str) -> crate::Result<PathBuf> {
        let video_id = metadata::video_id(video)?;
        let target = self.ctx.log_target();

        let cache_dir = self.ctx.cache_dir().clone();
        tokio::fs::create_dir_all(&cache_dir).await?;
        let cached = self.ctx.cache_path(&video_id);
        if tokio::fs::metadata(&cached)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            log::debug!(target: target, "Cache hit for {}", &video_id);
            return Ok(cached);
        }

        let cfg = self.ctx.config();
        let meta = timeout(
            cfg.lookup_timeout(),
            metadata::resolve(&*self.search, &video_id, target),
        )
        .await
        .map_err(|_| crate::Error::Timeout("metadata lookup"))??;
        log::info!(target: target, "Rendering {:?} ({})", &meta.title, &video_id);

        let downloaded = timeout(
            cfg.download_timeout(),
            fetch::fetch_thumbnail(
                &*self.http,
                &meta.thumbnail_url,
                &cache_dir,
                &video_id,
                target,
            ),
        )
        .await
        .map_err(|_| crate::Error::Timeout("thumbnail download"))??;
        let source = downloaded.decode().await?;
        std::mem::drop(downloaded);

        let assets = self.ctx.assets().await?;
        let palette = Palette::random();

        // write next to the final path and rename, so readers never see half a file.
        // the guard rides along with the writer so a dropped render can't strand it
        let partial = ScratchFile::new(
            cache_dir.join(format!(".{}.{}.partial", video_id, random_suffix())),
            target,
        );
        let dest = cached.clone();
        tokio::task::spawn_blocking(move || {
            let card = compose(&source, &meta, &assets, &palette);
            image::DynamicImage::ImageRgba8(card)
                .save_with_format(partial.path(), image::ImageFormat::Png)?;
            std::fs::rename(partial.path(), &dest)?;
            crate::Result::Ok(())
        })
        .await??;

        log::info!(target: target, "Thumbnail for {} saved to {:?}", &video_id, &cached);
        Ok(cached)
    }
}
