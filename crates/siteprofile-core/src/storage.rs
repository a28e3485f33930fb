//! On-disk layout of profile files.
//!
//! Each profile lives at `<root>/<dir name>/pv_to_atc.json`, where the
//! directory name is the profile URL with its scheme and every `/` removed
//! (`https://www.grass-direct.co.uk/` becomes `www.grass-direct.co.uk`).

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::LoadError;
use crate::model::SiteProfile;
use crate::validate::{validate_with, ValidationOptions};

/// File name of the product-view-to-add-to-cart profile inside a site directory.
pub const PROFILE_FILE_NAME: &str = "pv_to_atc.json";

/// Directory name used to store the profile for `url`.
#[must_use]
pub fn profile_dir_name(url: &str) -> String {
    url.replace("https://", "")
        .replace("http://", "")
        .replace('/', "")
}

/// Full path of the profile file for `url` under `root`.
#[must_use]
pub fn profile_path(root: &Path, url: &str) -> PathBuf {
    root.join(profile_dir_name(url)).join(PROFILE_FILE_NAME)
}

/// Parse profile text into an untyped tree. `.yaml`/`.yml` files go through
/// `serde_yaml`; everything else is read as JSON.
///
/// # Errors
///
/// Returns [`LoadError::Json`] or [`LoadError::Yaml`] when the text does not parse.
pub fn parse_document(text: &str, format: DocumentFormat, context: &str) -> Result<Value, LoadError> {
    match format {
        DocumentFormat::Json => serde_json::from_str(text).map_err(|source| LoadError::Json {
            context: context.to_owned(),
            source,
        }),
        DocumentFormat::Yaml => serde_yaml::from_str(text).map_err(|source| LoadError::Yaml {
            context: context.to_owned(),
            source,
        }),
    }
}

/// Serialization format of a profile file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a file extension, case-insensitively.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(DocumentFormat::Json),
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }
}

/// Read, parse and validate one profile file.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be read, has an unsupported
/// extension, does not parse, or fails validation.
pub fn load_profile(path: &Path, options: ValidationOptions) -> Result<SiteProfile, LoadError> {
    let context = path.display().to_string();
    let format = DocumentFormat::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat {
        path: context.clone(),
    })?;

    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: context.clone(),
        source,
    })?;
    let raw = parse_document(&text, format, &context)?;

    let profile =
        validate_with(&raw, options).map_err(|source| LoadError::Invalid { context, source })?;
    tracing::debug!(path = %path.display(), url = profile.url(), "loaded site profile");
    Ok(profile)
}

/// Write `profile` as pretty-printed JSON to its place under `root`,
/// creating the site directory if needed. Returns the written path.
///
/// # Errors
///
/// Returns [`LoadError::UnsafeProfilePath`] if the URL's directory name is
/// empty, `.`, `..`, or contains a backslash, and [`LoadError::Write`] on
/// filesystem failures.
pub fn save_profile(root: &Path, profile: &SiteProfile) -> Result<PathBuf, LoadError> {
    let dir_name = profile_dir_name(profile.url());
    if matches!(dir_name.as_str(), "" | "." | "..") || dir_name.contains('\\') {
        return Err(LoadError::UnsafeProfilePath {
            url: profile.url().to_owned(),
        });
    }
    let path = root.join(dir_name).join(PROFILE_FILE_NAME);
    let write_err = |source| LoadError::Write {
        path: path.display().to_string(),
        source,
    };

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(write_err)?;
    }
    let mut body = serde_json::to_string_pretty(profile).map_err(|source| LoadError::Json {
        context: profile.url().to_owned(),
        source,
    })?;
    body.push('\n');
    std::fs::write(&path, body).map_err(write_err)?;

    tracing::info!(path = %path.display(), url = profile.url(), "saved site profile");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;

    #[test]
    fn dir_name_strips_scheme_and_slashes() {
        assert_eq!(
            profile_dir_name("https://www.grass-direct.co.uk/"),
            "www.grass-direct.co.uk"
        );
        assert_eq!(
            profile_dir_name("http://shop.example/en/gb/"),
            "shop.exampleengb"
        );
    }

    #[test]
    fn profile_path_nests_file_under_dir_name() {
        let path = profile_path(Path::new("/srv/selectors"), "https://shop.example/");
        assert_eq!(path, Path::new("/srv/selectors/shop.example/pv_to_atc.json"));
    }

    #[test]
    fn format_from_path() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("a/pv_to_atc.json")),
            Some(DocumentFormat::Json)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("a/profile.YML")),
            Some(DocumentFormat::Yaml)
        );
        assert_eq!(DocumentFormat::from_path(Path::new("a/profile.txt")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("a/profile")), None);
    }

    #[test]
    fn yaml_documents_parse_to_the_same_tree() {
        let yaml = r##"
url: "https://shop.example/"
elements:
  hasCookieBanner: false
  checkout:
    button:
      elementType: checkoutButton
      selectors:
        primary: "#checkout"
        secondary: [".checkout", "a[href='/checkout']"]
      priority: 1
"##;
        let raw = parse_document(yaml, DocumentFormat::Yaml, "inline").unwrap();
        let profile = validate(&raw).unwrap();
        let button = profile.elements().checkout().unwrap().button().unwrap();
        assert_eq!(button.selectors().primary(), "#checkout");
        assert_eq!(button.selectors().secondary().len(), 2);
    }

    #[test]
    fn malformed_json_reports_context() {
        let err = parse_document("{ not json", DocumentFormat::Json, "broken.json").unwrap_err();
        assert!(matches!(err, LoadError::Json { ref context, .. } if context == "broken.json"));
    }

    #[test]
    fn unsupported_extension_is_rejected_before_reading() {
        let err = load_profile(Path::new("/nonexistent/profile.txt"), ValidationOptions::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
    }
}
