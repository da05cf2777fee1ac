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

use image::ImageError;
use std::{fmt, io::Error as IoError, path::PathBuf};
use tokio::task::JoinError;

#[derive(Debug)]
pub enum Error {
    /// The search provider returned no result for the id.
    NotFound,
    /// The result carried no thumbnail URL.
    MissingThumbnail,
    /// The thumbnail server answered with something other than 200.
    Download(u16),
    UnsupportedFormat(String),
    /// The downloaded bytes could not be decoded into a raster.
    Decode(ImageError),
    Timeout(&'static str),
    InvalidVideoId(String),
    Font(PathBuf),
    Image(ImageError),
    Io(IoError),
    Http(hyper::Error),
    Uri(String),
    Json(serde_json::Error),
    Join(JoinError),
    Msg(String),
}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("No video results found"),
            Self::MissingThumbnail => f.write_str("Thumbnail not found"),
            Self::Download(status) => write!(f, "Failed to download thumbnail: {}", status),
            Self::UnsupportedFormat(ct) => write!(f, "Unsupported thumbnail content type: {}", ct),
            Self::Decode(i) => write!(f, "Unable to decode thumbnail: {}", i),
            Self::Timeout(stage) => write!(f, "Timed out during {}", stage),
            Self::InvalidVideoId(id) => write!(f, "Not a valid video id: {:?}", id),
            Self::Font(p) => write!(f, "Invalid font file: {}", p.display()),
            Self::Image(i) => fmt::Display::fmt(i, f),
            Self::Io(i) => fmt::Display::fmt(i, f),
            Self::Http(h) => fmt::Display::fmt(h, f),
            Self::Uri(u) => write!(f, "Invalid URI: {}", u),
            Self::Json(j) => fmt::Display::fmt(j, f),
            Self::Join(j) => fmt::Display::fmt(j, f),
            Self::Msg(s) => f.write_str(s),
        }
    }
}

impl std::error::Error for Error {
    #[inline]
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(i) | Self::Image(i) => Some(i),
            Self::Io(i) => Some(i),
            Self::Http(h) => Some(h),
            Self::Json(j) => Some(j),
            Self::Join(j) => Some(j),
            _ => None,
        }
    }
}

impl From<IoError> for Error {
    #[inline]
    fn from(i: IoError) -> Error {
        Self::Io(i)
    }
}

impl From<ImageError> for Error {
    #[inline]
    fn from(i: ImageError) -> Error {
        Self::Image(i)
    }
}

impl From<hyper::Error> for Error {
    #[inline]
    fn from(h: hyper::Error) -> Error {
        Self::Http(h)
    }
}

impl From<serde_json::Error> for Error {
    #[inline]
    fn from(j: serde_json::Error) -> Error {
        Self::Json(j)
    }
}

impl From<JoinError> for Error {
    #[inline]
    fn from(j: JoinError) -> Error {
        Self::Join(j)
    }
}

pub type Result<T = ()> = std::result::Result<T, Error>;
