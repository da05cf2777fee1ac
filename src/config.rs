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

use std::{
    io::ErrorKind,
    mem,
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};

/// Paths and limits used by the renderer.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub cache_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub body_font: PathBuf,
    pub body_alt_font: PathBuf,
    pub title_font: PathBuf,
    pub icon_strip: PathBuf,
    pub cache_version: String,
    pub lookup_timeout_secs: u64,
    pub download_timeout_secs: u64,
    pub youtube_api_key: Option<String>,
}

impl Default for RendererConfig {
    #[inline]
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            assets_dir: PathBuf::from("assets"),
            body_font: PathBuf::from("fonts/body.ttf"),
            body_alt_font: PathBuf::from("fonts/body_alt.ttf"),
            title_font: PathBuf::from("fonts/title.ttf"),
            icon_strip: PathBuf::from("play_icons.png"),
            cache_version: "v4".to_string(),
            lookup_timeout_secs: 15,
            download_timeout_secs: 15,
            youtube_api_key: None,
        }
    }
}

impl RendererConfig {
    /// Load the config from a JSON file. A missing file yields the defaults.
    #[inline]
    pub async fn load(path: &Path) -> crate::Result<Self> {
        let mut jsonfile = match File::open(path).await {
            Ok(j) => j,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No config at {:?}, using defaults", path);
                return Ok(Default::default());
            }
            Err(e) => return Err(e.into()),
        };
        let mut jsondata = vec![];
        jsonfile.read_to_end(&mut jsondata).await?;
        mem::drop(jsonfile);

        let cfg = serde_json::from_slice(&jsondata)?;
        Ok(cfg)
    }

    #[inline]
    pub async fn save(&self, path: &Path) -> crate::Result {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(self)?;
        let mut f = File::create(path).await?;
        f.write_all(&data).await?;
        Ok(())
    }

    #[inline]
    pub fn asset(&self, relative: &Path) -> PathBuf {
        self.assets_dir.join(relative)
    }

    #[inline]
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    #[inline]
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: RendererConfig =
            serde_json::from_str(r#"{ "cache_dir": "/tmp/np", "lookup_timeout_secs": 3 }"#)
                .unwrap();
        assert_eq!(cfg.cache_dir, PathBuf::from("/tmp/np"));
        assert_eq!(cfg.lookup_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.download_timeout(), Duration::from_secs(15));
        assert_eq!(cfg.cache_version, "v4");
        assert_eq!(
            cfg.asset(&cfg.icon_strip),
            PathBuf::from("assets/play_icons.png")
        );
    }

    #[tokio::test]
    async fn saved_config_loads_back() {
        let path = std::env::temp_dir()
            .join(format!("nowplaying-config-{}", crate::util::random_suffix()))
            .join("config.json");
        let cfg = RendererConfig {
            youtube_api_key: Some("secret".into()),
            cache_version: "v5".into(),
            ..Default::default()
        };
        cfg.save(&path).await.unwrap();

        let loaded = RendererConfig::load(&path).await.unwrap();
        assert_eq!(loaded.youtube_api_key.as_deref(), Some("secret"));
        assert_eq!(loaded.cache_version, "v5");
        tokio::fs::remove_dir_all(path.parent().unwrap()).await.ok();
    }

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("nowplaying-does-not-exist").join("config.json");
        let cfg = RendererConfig::load(&path).await.unwrap();
        assert_eq!(cfg.cache_dir, PathBuf::from("cache"));
        assert!(cfg.youtube_api_key.is_none());
    }
}
