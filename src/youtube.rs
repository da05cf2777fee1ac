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
    fetch::HttpFetch,
    metadata::{SearchResult, VideoSearch},
};
use std::{collections::HashMap, sync::Arc};

const API_ROOT: &str = "https://www.googleapis.com/youtube/v3/videos";

// best first
const THUMBNAIL_KEYS: &[&str] = &["maxres", "standard", "high", "medium", "default"];

#[derive(Debug, Default, serde::Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<Video>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Video {
    snippet: Option<Snippet>,
    content_details: Option<ContentDetails>,
    statistics: Option<Statistics>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: Option<String>,
    channel_title: Option<String>,
    live_broadcast_content: Option<String>,
    #[serde(default)]
    thumbnails: HashMap<String, Thumbnail>,
}

#[derive(Debug, serde::Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
}

/// `VideoSearch` backed by the YouTube Data API v3.
pub struct YouTubeDataApi {
    api_key: String,
    http: Arc<dyn HttpFetch>,
}

impl YouTubeDataApi {
    #[inline]
    pub fn new(api_key: String, http: Arc<dyn HttpFetch>) -> Self {
        Self { api_key, http }
    }

    #[inline]
    fn request_url(&self, video_id: &str) -> crate::Result<String> {
        let url = url::Url::parse_with_params(
            API_ROOT,
            &[
                ("part", "snippet,contentDetails,statistics"),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ],
        )
        .map_err(|_| crate::Error::Uri(API_ROOT.to_string()))?;
        Ok(url.into())
    }
}

#[async_trait::async_trait]
impl VideoSearch for YouTubeDataApi {
    async fn lookup(&self, video_id: &str) -> crate::Result<Option<SearchResult>> {
        let resp = self.http.get(&self.request_url(video_id)?).await?;
        if resp.status != 200 {
            return Err(crate::Error::Msg(format!(
                "YouTube API answered {} for {}",
                resp.status, video_id
            )));
        }

        let list: VideoListResponse = serde_json::from_slice(&resp.body)?;
        Ok(list.items.into_iter().next().map(into_result))
    }
}

#[inline]
fn into_result(video: Video) -> SearchResult {
    let Video {
        snippet,
        content_details,
        statistics,
    } = video;
    let mut snippet = snippet.unwrap_or_default();

    let live = snippet.live_broadcast_content.as_deref() == Some("live");
    let duration = if live {
        None
    } else {
        content_details
            .and_then(|c| c.duration)
            .and_then(|d| iso8601_to_clock(&d))
    };

    let thumbnail_url = THUMBNAIL_KEYS
        .iter()
        .find_map(|key| snippet.thumbnails.remove(*key))
        .map(|t| t.url);

    let view_count_short = statistics
        .and_then(|s| s.view_count)
        .and_then(|v| v.parse::<u64>().ok())
        .map(short_views);

    SearchResult {
        title: snippet.title,
        duration,
        thumbnail_url,
        view_count_short,
        channel: snippet.channel_title,
    }
}

/// `PT1H2M3S` to `1:02:03`. Zero-length durations mean a live stream and yield `None`.
#[inline]
pub fn iso8601_to_clock(iso: &str) -> Option<String> {
    let rest = iso.strip_prefix('P')?;
    let (date, time) = match rest.find('T') {
        Some(i) => (&rest[..i], &rest[i + 1..]),
        None => (rest, ""),
    };

    const DATE_UNITS: &[(char, u64)] = &[('D', 86400)];
    const TIME_UNITS: &[(char, u64)] = &[('H', 3600), ('M', 60), ('S', 1)];

    let mut total = 0u64;
    for (part, units) in [(date, DATE_UNITS), (time, TIME_UNITS)].iter() {
        let mut number = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() {
                number.push(c);
            } else {
                let (_, mult) = units.iter().find(|(u, _)| *u == c)?;
                total += number.parse::<u64>().ok()? * mult;
                number.clear();
            }
        }
        if !number.is_empty() {
            return None;
        }
    }

    if total == 0 {
        return None;
    }
    let (h, m, s) = (total / 3600, (total / 60) % 60, total % 60);
    Some(if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    })
}

/// `1234567` to `1.2M views`.
#[inline]
pub fn short_views(count: u64) -> String {
    const UNITS: &[(u64, &str)] = &[(1_000_000_000, "B"), (1_000_000, "M"), (1_000, "K")];

    match UNITS.iter().find(|(div, _)| count >= *div) {
        None => format!("{} views", count),
        Some((div, suffix)) => {
            let whole = count / div;
            let tenth = (count % div) * 10 / div;
            if whole >= 10 || tenth == 0 {
                format!("{}{} views", whole, suffix)
            } else {
                format!("{}.{}{} views", whole, tenth, suffix)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::CannedFetch;

    const SAMPLE: &str = r#"{
        "items": [{
            "snippet": {
                "title": "Song",
                "channelTitle": "Band",
                "liveBroadcastContent": "none",
                "thumbnails": {
                    "default": { "url": "https://i.ytimg.com/vi/abc/default.jpg" },
                    "high": { "url": "https://i.ytimg.com/vi/abc/hqdefault.jpg" }
                }
            },
            "contentDetails": { "duration": "PT4M13S" },
            "statistics": { "viewCount": "1534000" }
        }]
    }"#;

    #[test]
    fn iso_durations() {
        assert_eq!(iso8601_to_clock("PT4M13S").as_deref(), Some("4:13"));
        assert_eq!(iso8601_to_clock("PT1H2M3S").as_deref(), Some("1:02:03"));
        assert_eq!(iso8601_to_clock("PT45S").as_deref(), Some("0:45"));
        assert_eq!(iso8601_to_clock("P1DT1S").as_deref(), Some("24:00:01"));
        assert_eq!(iso8601_to_clock("P0D"), None);
        assert_eq!(iso8601_to_clock("PT4X"), None);
        assert_eq!(iso8601_to_clock("4:13"), None);
    }

    #[test]
    fn view_counts() {
        assert_eq!(short_views(987), "987 views");
        assert_eq!(short_views(1_000), "1K views");
        assert_eq!(short_views(1_534_000), "1.5M views");
        assert_eq!(short_views(25_900_000), "25M views");
        assert_eq!(short_views(2_000_000_000), "2B views");
    }

    #[tokio::test]
    async fn parses_video_list() {
        let http = Arc::new(CannedFetch::new(
            200,
            Some("application/json"),
            SAMPLE.as_bytes().to_vec(),
        ));
        let api = YouTubeDataApi::new("key".into(), http.clone());

        let result = api.lookup("abc").await.unwrap().unwrap();
        assert_eq!(result.title.as_deref(), Some("Song"));
        assert_eq!(result.channel.as_deref(), Some("Band"));
        assert_eq!(result.duration.as_deref(), Some("4:13"));
        assert_eq!(result.view_count_short.as_deref(), Some("1.5M views"));
        assert_eq!(
            result.thumbnail_url.as_deref(),
            Some("https://i.ytimg.com/vi/abc/hqdefault.jpg")
        );
        assert_eq!(http.calls(), 1);
    }

    #[tokio::test]
    async fn empty_list_is_none() {
        let http = Arc::new(CannedFetch::new(200, None, br#"{"items": []}"#.to_vec()));
        let api = YouTubeDataApi::new("key".into(), http);
        assert!(api.lookup("abc").await.unwrap().is_none());
    }

    #[test]
    fn live_has_no_duration() {
        let list: VideoListResponse = serde_json::from_str(
            r#"{"items": [{
                "snippet": { "liveBroadcastContent": "live" },
                "contentDetails": { "duration": "PT0S" }
            }]}"#,
        )
        .unwrap();
        let result = into_result(list.items.into_iter().next().unwrap());
        assert!(result.duration.is_none());
        assert!(result.thumbnail_url.is_none());
    }

    #[test]
    fn request_url_is_encoded() {
        let http = Arc::new(CannedFetch::new(200, None, vec![]));
        let api = YouTubeDataApi::new("k y".into(), http);
        let url = api.request_url("abc").unwrap();
        assert!(url.starts_with(API_ROOT));
        assert!(url.contains("id=abc"));
        assert!(url.contains("key=k+y"));
    }
}
