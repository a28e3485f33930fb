//! Caller-owned table of loaded profiles, keyed by profile URL.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::LoadError;
use crate::model::SiteProfile;
use crate::storage::{load_profile, PROFILE_FILE_NAME};
use crate::validate::ValidationOptions;

/// Profiles keyed by their `url`. Iteration is ordered by URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, SiteProfile>,
}

/// Outcome of [`ProfileRegistry::load_dir`].
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Files that loaded and were inserted.
    pub loaded: Vec<PathBuf>,
    /// Files that failed, with the reason. These are not inserted.
    pub failures: Vec<(PathBuf, LoadError)>,
}

impl LoadReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl ProfileRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a profile, returning the one it displaced for the same URL.
    pub fn insert(&mut self, profile: SiteProfile) -> Option<SiteProfile> {
        self.profiles.insert(profile.url().to_owned(), profile)
    }

    #[must_use]
    pub fn get(&self, url: &str) -> Option<&SiteProfile> {
        self.profiles.get(url)
    }

    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.profiles.contains_key(url)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SiteProfile> {
        self.profiles.values()
    }

    /// Load every `<site dir>/pv_to_atc.json` directly under `root`.
    ///
    /// A file that fails to load is logged and recorded in the report; the
    /// scan continues with the next site directory. Site directories are
    /// visited in name order so duplicate URLs resolve deterministically
    /// (the last directory wins).
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] only if `root` itself cannot be listed.
    pub fn load_dir(
        &mut self,
        root: &Path,
        options: ValidationOptions,
    ) -> Result<LoadReport, LoadError> {
        let read_err = |source| LoadError::Read {
            path: root.display().to_string(),
            source,
        };

        let mut site_dirs = Vec::new();
        for entry in std::fs::read_dir(root).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if path.is_dir() {
                site_dirs.push(path);
            }
        }
        site_dirs.sort();

        let mut report = LoadReport::default();
        for dir in site_dirs {
            let file = dir.join(PROFILE_FILE_NAME);
            if !file.is_file() {
                tracing::debug!(dir = %dir.display(), "no profile file in site directory");
                continue;
            }

            match load_profile(&file, options) {
                Ok(profile) => {
                    if let Some(previous) = self.insert(profile) {
                        tracing::warn!(
                            url = previous.url(),
                            path = %file.display(),
                            "profile replaced an earlier one with the same url"
                        );
                    }
                    report.loaded.push(file);
                }
                Err(error) => {
                    tracing::warn!(path = %file.display(), %error, "skipping invalid site profile");
                    report.failures.push((file, error));
                }
            }
        }

        tracing::info!(
            root = %root.display(),
            loaded = report.loaded.len(),
            failed = report.failures.len(),
            "site profile directory scanned"
        );
        Ok(report)
    }
}
