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

use nanorand::{tls_rng, RNG};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Random token for file names that must not collide between concurrent renders.
#[inline]
pub fn random_suffix() -> String {
    format!("{:016x}", tls_rng().generate::<u64>())
}

/// A file that is removed when this guard goes out of scope, whichever way that happens.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    log_target: String,
}

impl ScratchFile {
    #[inline]
    pub fn new(path: PathBuf, log_target: impl Into<String>) -> Self {
        Self {
            path,
            log_target: log_target.into(),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    #[inline]
    fn drop(&mut self) {
        // runs on cancellation too, so this has to stay synchronous
        match fs::remove_file(&self.path) {
            Ok(()) => log::debug!(
                target: self.log_target.as_str(),
                "Removed scratch file {:?}",
                &self.path
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                target: self.log_target.as_str(),
                "Unable to remove scratch file {:?}: {}",
                &self.path,
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixes_differ() {
        assert_ne!(random_suffix(), random_suffix());
        assert_eq!(random_suffix().len(), 16);
    }

    #[test]
    fn scratch_file_removed_on_drop() {
        let path = std::env::temp_dir().join(format!("nowplaying-scratch-{}", random_suffix()));
        fs::write(&path, b"bytes").unwrap();
        {
            let guard = ScratchFile::new(path.clone(), "test");
            assert!(guard.path().exists());
        }
        assert!(!path.exists());

        // never created is fine too
        drop(ScratchFile::new(path.clone(), "test"));
    }
}
