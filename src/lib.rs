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

//! "Now playing" cards for a music bot: look a video up, pull its thumbnail,
//! lay out a 1280x720 card and keep it on disk under the video id.

pub mod assets;
pub mod config;
pub mod context;
mod error;
pub mod fetch;
pub mod metadata;
pub mod progress;
pub mod raster;
pub mod text;
pub mod thumbnail;
pub mod util;
pub mod youtube;

pub use config::RendererConfig;
pub use context::Context;
pub use error::*;
pub use fetch::{HttpFetch, HyperFetcher};
pub use metadata::{SearchResult, VideoDuration, VideoMetadata, VideoSearch};
pub use thumbnail::Renderer;
pub use youtube::YouTubeDataApi;
