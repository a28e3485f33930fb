//! Site profile schema and validator.
//!
//! A site profile records, for one e-commerce page, the selectors an external
//! automation engine needs to find the cookie banner, add-to-cart and checkout
//! controls, and any popups in the way. This crate validates profile documents
//! into immutable typed records and manages them on disk; it never touches a
//! browser or the network.

pub mod config;
pub mod error;
pub mod model;
pub mod path;
pub mod registry;
pub mod response;
pub mod storage;
pub mod validate;

pub use config::{load_app_config, load_app_config_from_env, AppConfig};
pub use error::{ConfigError, ErrorKind, LoadError, ValidationError};
pub use model::{
    ButtonSection, CaptureDate, ConsentChoices, CookieConsent, ElementKind, ElementLocator,
    PageElements, PopupLocator, ProductSection, SelectorSet, SiteProfile,
};
pub use path::FieldPath;
pub use registry::{LoadReport, ProfileRegistry};
pub use response::{extract_fenced_json, parse_analysis_response};
pub use storage::{
    load_profile, profile_dir_name, profile_path, save_profile, DocumentFormat, PROFILE_FILE_NAME,
};
pub use validate::{validate, validate_with, ValidationOptions};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn records_are_shareable_across_threads() {
        assert_send_sync::<SiteProfile>();
        assert_send_sync::<ProfileRegistry>();
        assert_send_sync::<ValidationError>();
    }
}
