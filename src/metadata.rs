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

use once_cell::sync::Lazy;
use regex::Regex;
use std::{fmt, time::Duration};

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("Regex failed to compile"));
static VIDEO_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("Regex failed to compile"));

const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_VIEWS: &str = "Unknown Views";
const UNKNOWN_CHANNEL: &str = "Unknown Channel";

/// One raw result as handed back by a search provider. Every field may be absent.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct SearchResult {
    pub title: Option<String>,
    pub duration: Option<String>,
    pub thumbnail_url: Option<String>,
    pub view_count_short: Option<String>,
    pub channel: Option<String>,
}

/// Looks videos up by id.
#[async_trait::async_trait]
pub trait VideoSearch: Send + Sync {
    /// Return the single best result for this id, or `None` if the provider knows nothing.
    async fn lookup(&self, video_id: &str) -> crate::Result<Option<SearchResult>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoDuration {
    Live,
    Timed(Duration),
}

impl VideoDuration {
    /// Parse `s`, `m:ss` or `h:mm:ss`. Anything saying "live" is `Live`.
    #[inline]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("live") {
            return Some(Self::Live);
        }

        let parts = text
            .split(':')
            .map(|p| p.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;
        let secs = match parts.as_slice() {
            [s] => *s,
            [m, s] if *s < 60 => m * 60 + s,
            [h, m, s] if *m < 60 && *s < 60 => h * 3600 + m * 60 + s,
            _ => return None,
        };
        Some(Self::Timed(Duration::from_secs(secs)))
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl fmt::Display for VideoDuration {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => f.write_str("Live"),
            Self::Timed(d) => {
                let total = d.as_secs();
                let (h, m, s) = (total / 3600, (total / 60) % 60, total % 60);
                if h > 0 {
                    write!(f, "{}:{:02}:{:02}", h, m, s)
                } else {
                    write!(f, "{}:{:02}", m, s)
                }
            }
        }
    }
}

/// Everything the layout needs to know about a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub duration: VideoDuration,
    pub thumbnail_url: String,
    pub views: String,
    pub channel: String,
}

/// Look `video_id` up and fill in whatever the provider left out.
#[inline]
pub async fn resolve(
    search: &dyn VideoSearch,
    video_id: &str,
    log_target: &str,
) -> crate::Result<VideoMetadata> {
    let result = search.lookup(video_id).await?.ok_or(crate::Error::NotFound)?;
    from_result(result, log_target)
}

#[inline]
fn from_result(result: SearchResult, log_target: &str) -> crate::Result<VideoMetadata> {
    let SearchResult {
        title,
        duration,
        thumbnail_url,
        view_count_short,
        channel,
    } = result;

    let thumbnail_url = thumbnail_url
        .as_deref()
        .and_then(|url| url.split('?').next())
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or(crate::Error::MissingThumbnail)?
        .to_string();

    let title = normalize_title(title.as_deref().unwrap_or(UNKNOWN_TITLE));

    let duration = match duration {
        None => VideoDuration::Live,
        Some(text) => VideoDuration::parse(&text).unwrap_or_else(|| {
            log::warn!(
                target: log_target,
                "Unparseable duration {:?}, treating it as live",
                text
            );
            VideoDuration::Live
        }),
    };

    Ok(VideoMetadata {
        title,
        duration,
        thumbnail_url,
        views: view_count_short.unwrap_or_else(|| UNKNOWN_VIEWS.to_string()),
        channel: channel.unwrap_or_else(|| UNKNOWN_CHANNEL.to_string()),
    })
}

/// Collapse every run of non-word characters into one space, then title-case.
#[inline]
pub fn normalize_title(title: &str) -> String {
    let spaced = NON_WORD.replace_all(title, " ");
    let mut prev_cased = false;
    let cased: String = spaced
        .chars()
        .flat_map(|c| {
            let upper = !prev_cased;
            prev_cased = c.is_alphabetic();
            let mapped: Vec<char> = if !c.is_alphabetic() {
                vec![c]
            } else if upper {
                c.to_uppercase().collect()
            } else {
                c.to_lowercase().collect()
            };
            mapped
        })
        .collect();
    cased.trim().to_string()
}

/// Pull the video id out of a bare id or a YouTube URL.
#[inline]
pub fn video_id(input: &str) -> crate::Result<String> {
    let input = input.trim();
    let candidate = match url::Url::parse(input) {
        Ok(url) => id_from_url(&url).unwrap_or_default(),
        Err(_) => input.to_string(),
    };

    if VIDEO_ID.is_match(&candidate) {
        Ok(candidate)
    } else {
        Err(crate::Error::InvalidVideoId(input.to_string()))
    }
}

#[inline]
fn id_from_url(url: &url::Url) -> Option<String> {
    let host = url.host_str()?.trim_start_matches("www.");
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    match host {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "m.youtube.com" | "music.youtube.com" => {
            match segments.next()? {
                "watch" => url
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned()),
                "shorts" | "live" | "embed" => segments.next().map(str::to_string),
                _ => None,
            }
        }
        _ => None,
    }
}
