//! Single-pass validation of an untyped JSON tree into a [`SiteProfile`].
//!
//! Checks run in document order and stop at the first violation. Root fields
//! come first (`url`, `elements`, `timestamp`, `notes`), then the element
//! sections: `hasCookieBanner`, `cookies`, `product`, `addtocart`, `checkout`
//! and `popups`. A JSON `null` is treated the same as an absent field.
//!
//! Unknown fields are ignored unless [`ValidationOptions::strict`] is set. In
//! lenient mode, object-valued entries under `cookies`, `addtocart` and
//! `checkout` that have no named slot are still validated as locators and
//! kept in the section's `extra` map; other unknown values are skipped.
//! Booleans under `cookies` other than the three consent flags are skipped
//! too, even under a named action. Every entry of `product` besides `url`
//! must be a locator.

use std::collections::BTreeMap;
use std::num::NonZeroU64;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::model::{
    ButtonSection, CaptureDate, ConsentChoices, CookieConsent, ElementKind, ElementLocator,
    PageElements, PopupLocator, ProductSection, SelectorSet, SiteProfile,
};
use crate::path::FieldPath;

const ROOT_KEYS: [&str; 4] = ["url", "timestamp", "elements", "notes"];
const ELEMENT_KEYS: [&str; 6] = [
    "hasCookieBanner",
    "cookies",
    "product",
    "addtocart",
    "checkout",
    "popups",
];
const LOCATOR_KEYS: [&str; 4] = ["elementType", "selectors", "location", "priority"];
const POPUP_KEYS: [&str; 3] = ["trigger", "dismissal", "frequency"];
const SELECTOR_KEYS: [&str; 3] = ["primary", "secondary", "xpath"];

/// Knobs for [`validate_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Reject fields that are not part of the schema instead of ignoring them.
    pub strict: bool,
}

impl ValidationOptions {
    #[must_use]
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// Validate a parsed profile document with default (lenient) options.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered, carrying the offending
/// field path and reason.
pub fn validate(raw: &Value) -> Result<SiteProfile, ValidationError> {
    validate_with(raw, ValidationOptions::default())
}

/// Validate a parsed profile document.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered, carrying the offending
/// field path and reason.
pub fn validate_with(
    raw: &Value,
    options: ValidationOptions,
) -> Result<SiteProfile, ValidationError> {
    Checker {
        strict: options.strict,
    }
    .profile(raw)
}

struct Checker {
    strict: bool,
}

impl Checker {
    fn profile(&self, raw: &Value) -> Result<SiteProfile, ValidationError> {
        let root = FieldPath::root();
        let obj = object(raw, &root)?;

        let url = non_empty_string(required(obj, "url", &root)?, &root.key("url"))?;
        let elements_path = root.key("elements");
        let elements_obj = object(required(obj, "elements", &root)?, &elements_path)?;

        let timestamp = match present(obj, "timestamp") {
            Some(value) => Some(capture_date(value, &root.key("timestamp"))?),
            None => None,
        };
        let notes = match present(obj, "notes") {
            Some(value) => string_list(value, &root.key("notes"), false)?,
            None => Vec::new(),
        };

        let elements = self.elements(elements_obj, &elements_path)?;
        self.reject_unknown(obj, &root, &ROOT_KEYS)?;

        Ok(SiteProfile {
            url,
            timestamp,
            elements,
            notes,
        })
    }

    fn elements(
        &self,
        obj: &Map<String, Value>,
        path: &FieldPath,
    ) -> Result<PageElements, ValidationError> {
        let has_cookie_banner = match present(obj, "hasCookieBanner") {
            Some(value) => boolean(value, &path.key("hasCookieBanner"))?,
            None => false,
        };

        let cookies = match present(obj, "cookies") {
            Some(value) => Some(self.cookies(value, &path.key("cookies"))?),
            None => None,
        };
        let product = match present(obj, "product") {
            Some(value) => Some(self.product(value, &path.key("product"))?),
            None => None,
        };
        let add_to_cart = match present(obj, "addtocart") {
            Some(value) => Some(self.button_section(value, &path.key("addtocart"))?),
            None => None,
        };
        let checkout = match present(obj, "checkout") {
            Some(value) => Some(self.button_section(value, &path.key("checkout"))?),
            None => None,
        };
        let popups = match present(obj, "popups") {
            Some(value) => self.popups(value, &path.key("popups"))?,
            None => Vec::new(),
        };

        self.reject_unknown(obj, path, &ELEMENT_KEYS)?;

        Ok(PageElements {
            has_cookie_banner,
            cookies,
            product,
            add_to_cart,
            checkout,
            popups,
        })
    }

    fn cookies(&self, value: &Value, path: &FieldPath) -> Result<CookieConsent, ValidationError> {
        let obj = object(value, path)?;
        let mut cookies = CookieConsent::default();
        let mut choices = ConsentChoices::default();

        for (key, entry) in obj {
            if entry.is_null() {
                continue;
            }
            let at = path.key(key);

            let flag = match key.as_str() {
                "marketingChoices" => Some(&mut choices.marketing),
                "analyticsChoices" => Some(&mut choices.analytics),
                "functionalChoices" => Some(&mut choices.functional),
                _ => None,
            };
            if let Some(flag) = flag {
                *flag = boolean(entry, &at)?;
                continue;
            }

            let known = CookieConsent::ACTIONS.contains(&key.as_str());
            if entry.is_boolean() {
                // Consent categories beyond the three known ones have nowhere
                // to go in the typed record.
                if !known && self.strict {
                    return Err(ValidationError::unknown(at));
                }
                continue;
            }

            let Some(locator) = self.section_entry(entry, &at, known)? else {
                continue;
            };
            match cookies.slot_mut(key) {
                Some(slot) => *slot = Some(locator),
                None => {
                    cookies.extra.insert(key.clone(), locator);
                }
            }
        }

        cookies.choices = choices;
        Ok(cookies)
    }

    fn product(&self, value: &Value, path: &FieldPath) -> Result<ProductSection, ValidationError> {
        let obj = object(value, path)?;
        let url = string(required(obj, "url", path)?, &path.key("url"))?;

        let mut product = ProductSection {
            url,
            stock: None,
            price: None,
            add_to_cart: None,
            extra: BTreeMap::new(),
        };

        for (key, entry) in obj {
            if key == "url" || entry.is_null() {
                continue;
            }
            let at = path.key(key);
            if self.strict && !ProductSection::SLOTS.contains(&key.as_str()) {
                return Err(ValidationError::unknown(at));
            }
            let locator = self.locator(entry, &at, &[])?;
            match product.slot_mut(key) {
                Some(slot) => *slot = Some(locator),
                None => {
                    product.extra.insert(key.clone(), locator);
                }
            }
        }

        Ok(product)
    }

    fn button_section(
        &self,
        value: &Value,
        path: &FieldPath,
    ) -> Result<ButtonSection, ValidationError> {
        let obj = object(value, path)?;
        let mut section = ButtonSection::default();

        for (key, entry) in obj {
            if entry.is_null() {
                continue;
            }
            let at = path.key(key);
            let known = ButtonSection::SLOTS.contains(&key.as_str());
            let Some(locator) = self.section_entry(entry, &at, known)? else {
                continue;
            };
            match section.slot_mut(key) {
                Some(slot) => *slot = Some(locator),
                None => {
                    section.extra.insert(key.clone(), locator);
                }
            }
        }

        Ok(section)
    }

    fn popups(&self, value: &Value, path: &FieldPath) -> Result<Vec<PopupLocator>, ValidationError> {
        let items = array(value, path)?;
        let mut popups = Vec::with_capacity(items.len());

        for (i, item) in items.iter().enumerate() {
            let at = path.index(i);
            let locator = self.locator(item, &at, &POPUP_KEYS)?;
            // `locator` already proved this is an object.
            let obj = object(item, &at)?;

            let trigger = string(required(obj, "trigger", &at)?, &at.key("trigger"))?;
            let dismissal = optional_string(obj, "dismissal", &at)?;
            let frequency = optional_string(obj, "frequency", &at)?;

            popups.push(PopupLocator::new(locator, trigger, dismissal, frequency));
        }

        Ok(popups)
    }

    /// A named slot must hold a locator. Other keys are rejected in strict
    /// mode; leniently, objects among them are validated as locators and
    /// anything else is skipped.
    fn section_entry(
        &self,
        entry: &Value,
        at: &FieldPath,
        known: bool,
    ) -> Result<Option<ElementLocator>, ValidationError> {
        if !known {
            if self.strict {
                return Err(ValidationError::unknown(at.clone()));
            }
            if !entry.is_object() {
                return Ok(None);
            }
        }
        self.locator(entry, at, &[]).map(Some)
    }

    /// Validate the shared locator fields. `extra_keys` are additional keys the
    /// caller handles itself and that strict mode must not reject.
    fn locator(
        &self,
        value: &Value,
        path: &FieldPath,
        extra_keys: &[&str],
    ) -> Result<ElementLocator, ValidationError> {
        let obj = object(value, path)?;

        let element_type = non_empty_string(
            required(obj, "elementType", path)?,
            &path.key("elementType"),
        )?;

        let selectors_path = path.key("selectors");
        let selectors_obj = object(required(obj, "selectors", path)?, &selectors_path)?;
        let selectors = self.selectors(selectors_obj, &selectors_path)?;

        let location = optional_string(obj, "location", path)?;

        let priority = match present(obj, "priority") {
            Some(value) => Some(priority(value, &path.key("priority"))?),
            None => None,
        };

        if self.strict {
            for key in obj.keys() {
                let key = key.as_str();
                if !LOCATOR_KEYS.contains(&key) && !extra_keys.contains(&key) {
                    return Err(ValidationError::unknown(path.key(key)));
                }
            }
        }

        Ok(ElementLocator::new(
            ElementKind::from_tag(&element_type),
            selectors,
            location,
            priority,
        ))
    }

    fn selectors(
        &self,
        obj: &Map<String, Value>,
        path: &FieldPath,
    ) -> Result<SelectorSet, ValidationError> {
        let primary = non_empty_string(required(obj, "primary", path)?, &path.key("primary"))?;
        let secondary = match present(obj, "secondary") {
            Some(value) => string_list(value, &path.key("secondary"), true)?,
            None => Vec::new(),
        };
        let xpath = match present(obj, "xpath") {
            Some(value) => Some(non_empty_string(value, &path.key("xpath"))?),
            None => None,
        };

        self.reject_unknown(obj, path, &SELECTOR_KEYS)?;

        Ok(SelectorSet::new(primary, secondary, xpath))
    }

    fn reject_unknown(
        &self,
        obj: &Map<String, Value>,
        path: &FieldPath,
        allowed: &[&str],
    ) -> Result<(), ValidationError> {
        if !self.strict {
            return Ok(());
        }
        match obj.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(key) => Err(ValidationError::unknown(path.key(key))),
            None => Ok(()),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The value under `key`, treating `null` as absent.
fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn required<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    parent: &FieldPath,
) -> Result<&'a Value, ValidationError> {
    present(obj, key).ok_or_else(|| ValidationError::missing(parent.key(key)))
}

fn object<'a>(value: &'a Value, path: &FieldPath) -> Result<&'a Map<String, Value>, ValidationError> {
    value
        .as_object()
        .ok_or_else(|| ValidationError::wrong_type(path.clone(), "object", type_name(value)))
}

fn array<'a>(value: &'a Value, path: &FieldPath) -> Result<&'a Vec<Value>, ValidationError> {
    value
        .as_array()
        .ok_or_else(|| ValidationError::wrong_type(path.clone(), "array", type_name(value)))
}

fn boolean(value: &Value, path: &FieldPath) -> Result<bool, ValidationError> {
    value
        .as_bool()
        .ok_or_else(|| ValidationError::wrong_type(path.clone(), "boolean", type_name(value)))
}

fn string(value: &Value, path: &FieldPath) -> Result<String, ValidationError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| ValidationError::wrong_type(path.clone(), "string", type_name(value)))
}

/// A string with at least one non-whitespace character.
fn non_empty_string(value: &Value, path: &FieldPath) -> Result<String, ValidationError> {
    let s = string(value, path)?;
    if s.trim().is_empty() {
        return Err(ValidationError::empty(path.clone()));
    }
    Ok(s)
}

fn optional_string(
    obj: &Map<String, Value>,
    key: &str,
    parent: &FieldPath,
) -> Result<Option<String>, ValidationError> {
    present(obj, key)
        .map(|value| string(value, &parent.key(key)))
        .transpose()
}

fn string_list(
    value: &Value,
    path: &FieldPath,
    non_empty: bool,
) -> Result<Vec<String>, ValidationError> {
    array(value, path)?
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let at = path.index(i);
            if non_empty {
                non_empty_string(item, &at)
            } else {
                string(item, &at)
            }
        })
        .collect()
}

fn priority(value: &Value, path: &FieldPath) -> Result<NonZeroU64, ValidationError> {
    if !value.is_number() {
        return Err(ValidationError::wrong_type(
            path.clone(),
            "integer",
            type_name(value),
        ));
    }
    value
        .as_u64()
        .and_then(NonZeroU64::new)
        .ok_or_else(|| ValidationError::invalid_number(path.clone(), value))
}

fn capture_date(value: &Value, path: &FieldPath) -> Result<CaptureDate, ValidationError> {
    let raw = non_empty_string(value, path)?;
    let date = parse_date(raw.trim())
        .ok_or_else(|| ValidationError::invalid_date(path.clone(), &raw))?;
    Ok(CaptureDate::new(raw, date))
}

/// Accepts a bare date, an RFC 3339 timestamp, or a naive date-time.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
