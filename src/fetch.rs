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

use crate::util::{random_suffix, ScratchFile};
use hyper::{client::HttpConnector, header::CONTENT_TYPE, Body, Client, Uri};
use hyper_rustls::HttpsConnector;
use image::{ImageFormat, RgbaImage};
use std::path::Path;

/// What came back from a GET.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Outbound HTTP, one GET at a time.
#[async_trait::async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get(&self, url: &str) -> crate::Result<HttpResponse>;
}

pub struct HyperFetcher {
    client: Client<HttpsConnector<HttpConnector>, Body>,
    log_target: String,
}

impl HyperFetcher {
    #[inline]
    pub fn new() -> Self {
        Self::with_log_target("nowplaying")
    }

    #[inline]
    pub fn with_log_target(log_target: impl Into<String>) -> Self {
        Self {
            client: Client::builder().build(HttpsConnector::with_native_roots()),
            log_target: log_target.into(),
        }
    }
}

impl Default for HyperFetcher {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HttpFetch for HyperFetcher {
    async fn get(&self, url: &str) -> crate::Result<HttpResponse> {
        let uri: Uri = url
            .parse()
            .map_err(|_| crate::Error::Uri(url.to_string()))?;
        // the query can hold credentials
        log::debug!(target: self.log_target.as_str(), "GET {}", loggable(&uri));

        let resp = self.client.get(uri).await?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = hyper::body::to_bytes(resp.into_body()).await?.to_vec();

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

/// `uri` without its query string.
#[inline]
pub fn loggable(uri: &Uri) -> String {
    format!(
        "{}://{}{}",
        uri.scheme_str().unwrap_or("?"),
        uri.authority().map(|a| a.as_str()).unwrap_or(""),
        uri.path()
    )
}

/// Raster formats we accept from the thumbnail host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbFormat {
    Jpeg,
    Png,
}

impl ThumbFormat {
    #[inline]
    pub fn from_content_type(content_type: Option<&str>) -> crate::Result<Self> {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .unwrap_or_default();
        match mime.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            "" => Err(crate::Error::UnsupportedFormat("<missing>".to_string())),
            _ => Err(crate::Error::UnsupportedFormat(mime)),
        }
    }

    #[inline]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    #[inline]
    fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

/// A downloaded thumbnail sitting in a scratch file. The file goes away with this value.
#[derive(Debug)]
pub struct DownloadedThumbnail {
    file: ScratchFile,
    format: ThumbFormat,
}

impl DownloadedThumbnail {
    #[inline]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Decode the scratch file into an RGBA raster.
    #[inline]
    pub async fn decode(&self) -> crate::Result<RgbaImage> {
        let data = tokio::fs::read(self.file.path()).await?;
        let format = self.format.image_format();
        tokio::task::spawn_blocking(move || {
            image::load_from_memory_with_format(&data, format)
                .map(|img| img.to_rgba8())
                .map_err(crate::Error::Decode)
        })
        .await?
    }
}

/// GET `url` and park the bytes in `scratch_dir`.
#[inline]
pub async fn fetch_thumbnail(
    fetcher: &dyn HttpFetch,
    url: &str,
    scratch_dir: &Path,
    video_id: &str,
    log_target: &str,
) -> crate::Result<DownloadedThumbnail> {
    let resp = fetcher.get(url).await?;
    if resp.status != 200 {
        return Err(crate::Error::Download(resp.status));
    }
    let format = ThumbFormat::from_content_type(resp.content_type.as_deref())?;

    let name = format!(
        "thumb_{}_{}.{}",
        video_id,
        random_suffix(),
        format.extension()
    );
    // guard first, so a failed or abandoned write still cleans up
    let file = ScratchFile::new(scratch_dir.join(name), log_target);
    tokio::fs::write(file.path(), &resp.body).await?;
    log::debug!(
        target: log_target,
        "Wrote {} thumbnail bytes to {:?}",
        resp.body.len(),
        file.path()
    );

    Ok(DownloadedThumbnail { file, format })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgba};
    use std::{
        path::PathBuf,
        sync::atomic::{AtomicUsize, Ordering},
    };

    /// Answers every GET with the same response.
    pub(crate) struct CannedFetch {
        pub response: HttpResponse,
        pub calls: AtomicUsize,
    }

    impl CannedFetch {
        pub(crate) fn new(status: u16, content_type: Option<&str>, body: Vec<u8>) -> Self {
            Self {
                response: HttpResponse {
                    status,
                    content_type: content_type.map(str::to_string),
                    body,
                },
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl HttpFetch for CannedFetch {
        async fn get(&self, _url: &str) -> crate::Result<HttpResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        let mut out = vec![];
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageOutputFormat::Png)
            .unwrap();
        out
    }

    pub(crate) fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nowplaying-{}-{}", tag, random_suffix()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn content_types() {
        assert_eq!(
            ThumbFormat::from_content_type(Some("image/jpeg")).unwrap(),
            ThumbFormat::Jpeg
        );
        assert_eq!(
            ThumbFormat::from_content_type(Some("Image/PNG; charset=binary")).unwrap(),
            ThumbFormat::Png
        );
        assert!(matches!(
            ThumbFormat::from_content_type(Some("image/webp")),
            Err(crate::Error::UnsupportedFormat(ct)) if ct == "image/webp"
        ));
        assert!(matches!(
            ThumbFormat::from_content_type(None),
            Err(crate::Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn logged_urls_drop_the_query() {
        let uri: Uri = "https://www.googleapis.com/youtube/v3/videos?id=abc&key=SECRET"
            .parse()
            .unwrap();
        let shown = loggable(&uri);
        assert_eq!(shown, "https://www.googleapis.com/youtube/v3/videos");
        assert!(!shown.contains("SECRET"));
    }

    #[tokio::test]
    async fn download_decode_and_cleanup() {
        let dir = temp_dir("fetch");
        let fetch = CannedFetch::new(200, Some("image/png"), png_bytes(32, 18));

        let thumb = fetch_thumbnail(&fetch, "https://x/y.png", &dir, "abc", "test")
            .await
            .unwrap();
        let path = thumb.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "png");

        let raster = thumb.decode().await.unwrap();
        assert_eq!(raster.dimensions(), (32, 18));

        drop(thumb);
        assert!(!path.exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn bad_status_writes_nothing() {
        let dir = temp_dir("fetch404");
        let fetch = CannedFetch::new(404, Some("text/html"), b"nope".to_vec());

        match fetch_thumbnail(&fetch, "https://x/y.png", &dir, "abc", "test").await {
            Err(crate::Error::Download(404)) => {}
            other => panic!("expected 404, got {:?}", other.map(|_| ())),
        }
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn corrupt_bytes_are_a_decode_error() {
        let dir = temp_dir("decode");
        let fetch = CannedFetch::new(200, Some("image/jpeg"), b"not a jpeg".to_vec());

        let thumb = fetch_thumbnail(&fetch, "https://x/y.jpg", &dir, "abc", "test")
            .await
            .unwrap();
        assert!(matches!(thumb.decode().await, Err(crate::Error::Decode(_))));
        drop(thumb);
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
        std::fs::remove_dir_all(&dir).ok();
    }
}
