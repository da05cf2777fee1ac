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

use crate::{assets::Assets, config::RendererConfig};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::OnceCell;

/// Everything a render call needs besides its collaborators.
///
/// Built once by the caller and handed to the renderer; there is no
/// process-wide instance.
pub struct Context {
    config: RendererConfig,
    assets: OnceCell<Arc<Assets>>,
    log_target: String,
}

impl Context {
    #[inline]
    pub fn new(config: RendererConfig) -> Self {
        Self::with_log_target(config, "nowplaying")
    }

    #[inline]
    pub fn with_log_target(config: RendererConfig, log_target: impl Into<String>) -> Self {
        Self {
            config,
            assets: OnceCell::new(),
            log_target: log_target.into(),
        }
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Target every render log line is emitted under.
    #[inline]
    pub fn log_target(&self) -> &str {
        &self.log_target
    }

    /// Fonts and icons, read from disk the first time they are asked for.
    #[inline]
    pub async fn assets(&self) -> crate::Result<Arc<Assets>> {
        self.assets
            .get_or_try_init(|| async {
                Assets::load(&self.config, &self.log_target)
                    .await
                    .map(Arc::new)
            })
            .await
            .map(Arc::clone)
    }

    #[inline]
    pub fn cache_dir(&self) -> &PathBuf {
        &self.config.cache_dir
    }

    /// Where the finished image for `video_id` lives.
    #[inline]
    pub fn cache_path(&self, video_id: &str) -> PathBuf {
        self.config
            .cache_dir
            .join(format!("{}_{}.png", video_id, self.config.cache_version))
    }
}
