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

use clap::{App, Arg};
use nowplaying::{Context, HyperFetcher, Renderer, RendererConfig, YouTubeDataApi};
use std::{path::PathBuf, process, sync::Arc};

#[inline]
fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nowplaying")
        .join("config.json")
}

#[inline]
async fn entry(matches: clap::ArgMatches<'static>) -> nowplaying::Result<Option<PathBuf>> {
    let config_path = matches
        .value_of("config")
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let mut config = RendererConfig::load(&config_path).await?;

    if let Some(dir) = matches.value_of("cache-dir") {
        config.cache_dir = PathBuf::from(dir);
    }
    if let Some(dir) = matches.value_of("assets-dir") {
        config.assets_dir = PathBuf::from(dir);
    }
    if let Some(key) = matches.value_of("api-key") {
        config.youtube_api_key = Some(key.to_string());
    }

    let api_key = config.youtube_api_key.clone().ok_or_else(|| {
        nowplaying::Error::Msg(format!(
            "No YouTube API key, pass --api-key or set youtube_api_key in {:?}",
            &config_path
        ))
    })?;

    let ctx = Arc::new(Context::new(config));
    let http = Arc::new(HyperFetcher::with_log_target(ctx.log_target()));
    let search = Arc::new(YouTubeDataApi::new(api_key, http.clone()));
    let renderer = Renderer::new(ctx, search, http);

    let video = matches.value_of("VIDEO").unwrap_or_default();
    Ok(renderer.render(video).await)
}

fn main() {
    // sets up the logging framework
    env_logger::init();

    let matches = App::new("nowplaying")
        .about("Renders a \"now playing\" card for a YouTube video")
        .arg(
            Arg::with_name("config")
                .long("config")
                .takes_value(true)
                .value_name("FILE")
                .help("Config file (JSON)"),
        )
        .arg(
            Arg::with_name("cache-dir")
                .long("cache-dir")
                .takes_value(true)
                .value_name("DIR"),
        )
        .arg(
            Arg::with_name("assets-dir")
                .long("assets-dir")
                .takes_value(true)
                .value_name("DIR"),
        )
        .arg(
            Arg::with_name("api-key")
                .long("api-key")
                .takes_value(true)
                .value_name("KEY"),
        )
        .arg(
            Arg::with_name("VIDEO")
                .required(true)
                .help("Video id or YouTube URL"),
        )
        .get_matches();

    // start the tokio multi-threaded runtime
    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Unable to construct Tokio runtime")
        .block_on(entry(matches));

    match result {
        Ok(Some(path)) => println!("{}", path.display()),
        Ok(None) => process::exit(1),
        Err(e) => {
            log::error!("A fatal error occurred: {}", e);
            process::exit(1);
        }
    }
}
