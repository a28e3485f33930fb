//! Typed site profile records.
//!
//! Values of these types are only produced by [`crate::validate`], so every
//! invariant the validator checks (non-empty primary selector, positive
//! priority, parseable timestamp) holds for any instance a caller can hold.
//! Fields are private and exposed through read-only accessors.

use std::collections::BTreeMap;
use std::num::NonZeroU64;

use chrono::NaiveDate;
use serde::Serialize;

use crate::path::FieldPath;

/// Kind of UI element a locator points at.
///
/// The set is open: tags this crate does not know are kept verbatim in
/// [`ElementKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    CookieAccept,
    CookieDecline,
    CookiePreferences,
    CookieSettings,
    StockStatus,
    Price,
    AddToCart,
    Cart,
    CheckoutButton,
    LocationPopup,
    Other(String),
}

impl ElementKind {
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "cookieAccept" => ElementKind::CookieAccept,
            "cookieDecline" => ElementKind::CookieDecline,
            "cookiePreferences" => ElementKind::CookiePreferences,
            "cookieSettings" => ElementKind::CookieSettings,
            "stockStatus" => ElementKind::StockStatus,
            "price" => ElementKind::Price,
            "addToCart" => ElementKind::AddToCart,
            "cart" => ElementKind::Cart,
            "checkoutButton" => ElementKind::CheckoutButton,
            "locationPopup" => ElementKind::LocationPopup,
            other => ElementKind::Other(other.to_owned()),
        }
    }

    /// The tag as written in profile documents.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            ElementKind::CookieAccept => "cookieAccept",
            ElementKind::CookieDecline => "cookieDecline",
            ElementKind::CookiePreferences => "cookiePreferences",
            ElementKind::CookieSettings => "cookieSettings",
            ElementKind::StockStatus => "stockStatus",
            ElementKind::Price => "price",
            ElementKind::AddToCart => "addToCart",
            ElementKind::Cart => "cart",
            ElementKind::CheckoutButton => "checkoutButton",
            ElementKind::LocationPopup => "locationPopup",
            ElementKind::Other(tag) => tag,
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ElementKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One primary selector plus ordered fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorSet {
    primary: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    secondary: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    xpath: Option<String>,
}

impl SelectorSet {
    pub(crate) fn new(primary: String, secondary: Vec<String>, xpath: Option<String>) -> Self {
        Self {
            primary,
            secondary,
            xpath,
        }
    }

    #[must_use]
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Fallback selectors, in the order the document lists them.
    #[must_use]
    pub fn secondary(&self) -> &[String] {
        &self.secondary
    }

    #[must_use]
    pub fn xpath(&self) -> Option<&str> {
        self.xpath.as_deref()
    }
}

/// How to find one UI element on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementLocator {
    element_type: ElementKind,
    selectors: SelectorSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<NonZeroU64>,
}

impl ElementLocator {
    pub(crate) fn new(
        element_type: ElementKind,
        selectors: SelectorSet,
        location: Option<String>,
        priority: Option<NonZeroU64>,
    ) -> Self {
        Self {
            element_type,
            selectors,
            location,
            priority,
        }
    }

    #[must_use]
    pub fn element_type(&self) -> &ElementKind {
        &self.element_type
    }

    #[must_use]
    pub fn selectors(&self) -> &SelectorSet {
        &self.selectors
    }

    /// Human description of where the element sits. Documentation only.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Lower is tried first. `None` means no ordering preference.
    #[must_use]
    pub fn priority(&self) -> Option<NonZeroU64> {
        self.priority
    }
}

/// A locator for a popup, with a description of what makes it appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupLocator {
    #[serde(flatten)]
    locator: ElementLocator,
    trigger: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dismissal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency: Option<String>,
}

impl PopupLocator {
    pub(crate) fn new(
        locator: ElementLocator,
        trigger: String,
        dismissal: Option<String>,
        frequency: Option<String>,
    ) -> Self {
        Self {
            locator,
            trigger,
            dismissal,
            frequency,
        }
    }

    #[must_use]
    pub fn locator(&self) -> &ElementLocator {
        &self.locator
    }

    /// What causes the popup to show, e.g. `"Page load"`.
    #[must_use]
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// How the popup is dismissed, if the author noted it.
    #[must_use]
    pub fn dismissal(&self) -> Option<&str> {
        self.dismissal.as_deref()
    }

    /// Any frequency limit the author noted (once per session, ...).
    #[must_use]
    pub fn frequency(&self) -> Option<&str> {
        self.frequency.as_deref()
    }
}

/// Which consent categories the cookie banner lets the visitor toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConsentChoices {
    #[serde(rename = "marketingChoices")]
    pub marketing: bool,
    #[serde(rename = "analyticsChoices")]
    pub analytics: bool,
    #[serde(rename = "functionalChoices")]
    pub functional: bool,
}

/// Locators for the cookie banner's consent actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieConsent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) accept: Option<ElementLocator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) preferences: Option<ElementLocator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) decline: Option<ElementLocator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) settings: Option<ElementLocator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) accept_all: Option<ElementLocator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reject_all: Option<ElementLocator>,
    #[serde(flatten)]
    pub(crate) extra: BTreeMap<String, ElementLocator>,
    #[serde(flatten)]
    pub(crate) choices: ConsentChoices,
}

impl CookieConsent {
    pub(crate) const ACTIONS: [&'static str; 6] = [
        "accept",
        "preferences",
        "decline",
        "settings",
        "acceptAll",
        "rejectAll",
    ];

    pub(crate) fn slot_mut(&mut self, action: &str) -> Option<&mut Option<ElementLocator>> {
        match action {
            "accept" => Some(&mut self.accept),
            "preferences" => Some(&mut self.preferences),
            "decline" => Some(&mut self.decline),
            "settings" => Some(&mut self.settings),
            "acceptAll" => Some(&mut self.accept_all),
            "rejectAll" => Some(&mut self.reject_all),
            _ => None,
        }
    }

    #[must_use]
    pub fn accept(&self) -> Option<&ElementLocator> {
        self.accept.as_ref()
    }

    #[must_use]
    pub fn preferences(&self) -> Option<&ElementLocator> {
        self.preferences.as_ref()
    }

    #[must_use]
    pub fn decline(&self) -> Option<&ElementLocator> {
        self.decline.as_ref()
    }

    #[must_use]
    pub fn settings(&self) -> Option<&ElementLocator> {
        self.settings.as_ref()
    }

    #[must_use]
    pub fn accept_all(&self) -> Option<&ElementLocator> {
        self.accept_all.as_ref()
    }

    #[must_use]
    pub fn reject_all(&self) -> Option<&ElementLocator> {
        self.reject_all.as_ref()
    }

    #[must_use]
    pub fn choices(&self) -> ConsentChoices {
        self.choices
    }

    /// Look up a consent action by its document key (`"accept"`, `"rejectAll"`, ...),
    /// including actions this crate has no named slot for.
    #[must_use]
    pub fn get(&self, action: &str) -> Option<&ElementLocator> {
        match action {
            "accept" => self.accept(),
            "preferences" => self.preferences(),
            "decline" => self.decline(),
            "settings" => self.settings(),
            "acceptAll" => self.accept_all(),
            "rejectAll" => self.reject_all(),
            other => self.extra.get(other),
        }
    }

    /// Every consent action present, named slots first, then extras by key.
    pub fn actions(&self) -> impl Iterator<Item = (&str, &ElementLocator)> {
        Self::ACTIONS
            .into_iter()
            .filter_map(move |name| self.get(name).map(|loc| (name, loc)))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

/// The product detail page chosen for the funnel and its locators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSection {
    pub(crate) url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) stock: Option<ElementLocator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) price: Option<ElementLocator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) add_to_cart: Option<ElementLocator>,
    #[serde(flatten)]
    pub(crate) extra: BTreeMap<String, ElementLocator>,
}

impl ProductSection {
    pub(crate) const SLOTS: [&'static str; 3] = ["stock", "price", "addToCart"];

    pub(crate) fn slot_mut(&mut self, name: &str) -> Option<&mut Option<ElementLocator>> {
        match name {
            "stock" => Some(&mut self.stock),
            "price" => Some(&mut self.price),
            "addToCart" => Some(&mut self.add_to_cart),
            _ => None,
        }
    }

    /// Path of the product page, relative to the profile URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn stock(&self) -> Option<&ElementLocator> {
        self.stock.as_ref()
    }

    #[must_use]
    pub fn price(&self) -> Option<&ElementLocator> {
        self.price.as_ref()
    }

    #[must_use]
    pub fn add_to_cart(&self) -> Option<&ElementLocator> {
        self.add_to_cart.as_ref()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ElementLocator> {
        match name {
            "stock" => self.stock(),
            "price" => self.price(),
            "addToCart" => self.add_to_cart(),
            other => self.extra.get(other),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &ElementLocator)> {
        Self::SLOTS
            .into_iter()
            .filter_map(move |name| self.get(name).map(|loc| (name, loc)))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

/// A `button` / `cart` pair of locators, used for both the add-to-cart
/// confirmation and the checkout step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ButtonSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) button: Option<ElementLocator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) cart: Option<ElementLocator>,
    #[serde(flatten)]
    pub(crate) extra: BTreeMap<String, ElementLocator>,
}

impl ButtonSection {
    pub(crate) const SLOTS: [&'static str; 2] = ["button", "cart"];

    pub(crate) fn slot_mut(&mut self, name: &str) -> Option<&mut Option<ElementLocator>> {
        match name {
            "button" => Some(&mut self.button),
            "cart" => Some(&mut self.cart),
            _ => None,
        }
    }

    #[must_use]
    pub fn button(&self) -> Option<&ElementLocator> {
        self.button.as_ref()
    }

    #[must_use]
    pub fn cart(&self) -> Option<&ElementLocator> {
        self.cart.as_ref()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ElementLocator> {
        match name {
            "button" => self.button(),
            "cart" => self.cart(),
            other => self.extra.get(other),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &ElementLocator)> {
        Self::SLOTS
            .into_iter()
            .filter_map(move |name| self.get(name).map(|loc| (name, loc)))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

/// Every located element on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElements {
    pub(crate) has_cookie_banner: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) cookies: Option<CookieConsent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) product: Option<ProductSection>,
    #[serde(rename = "addtocart", skip_serializing_if = "Option::is_none")]
    pub(crate) add_to_cart: Option<ButtonSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) checkout: Option<ButtonSection>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) popups: Vec<PopupLocator>,
}

impl PageElements {
    #[must_use]
    pub fn has_cookie_banner(&self) -> bool {
        self.has_cookie_banner
    }

    #[must_use]
    pub fn cookies(&self) -> Option<&CookieConsent> {
        self.cookies.as_ref()
    }

    #[must_use]
    pub fn product(&self) -> Option<&ProductSection> {
        self.product.as_ref()
    }

    /// The cart confirmation shown after adding a product (`addtocart` key).
    #[must_use]
    pub fn add_to_cart(&self) -> Option<&ButtonSection> {
        self.add_to_cart.as_ref()
    }

    #[must_use]
    pub fn checkout(&self) -> Option<&ButtonSection> {
        self.checkout.as_ref()
    }

    /// Popups in document order.
    #[must_use]
    pub fn popups(&self) -> &[PopupLocator] {
        &self.popups
    }
}

/// The authoring date of a profile, kept as written alongside its parsed date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDate {
    raw: String,
    date: NaiveDate,
}

impl CaptureDate {
    pub(crate) fn new(raw: String, date: NaiveDate) -> Self {
        Self { raw, date }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Serialize for CaptureDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Locators and notes for one target page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteProfile {
    pub(crate) url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) timestamp: Option<CaptureDate>,
    pub(crate) elements: PageElements,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) notes: Vec<String>,
}

impl SiteProfile {
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn timestamp(&self) -> Option<&CaptureDate> {
        self.timestamp.as_ref()
    }

    #[must_use]
    pub fn elements(&self) -> &PageElements {
        &self.elements
    }

    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Every locator in the profile with its document path. Sections come in
    /// the order cookies, product, addtocart, checkout, then popups. Within a
    /// section the named slots come first in their fixed order, followed by
    /// any extra entries sorted by key; popups keep their array order.
    #[must_use]
    pub fn locators(&self) -> Vec<(FieldPath, &ElementLocator)> {
        let base = FieldPath::root().key("elements");
        let mut out = Vec::new();

        if let Some(cookies) = &self.elements.cookies {
            let at = base.key("cookies");
            out.extend(cookies.actions().map(|(k, loc)| (at.key(k), loc)));
        }
        if let Some(product) = &self.elements.product {
            let at = base.key("product");
            out.extend(product.entries().map(|(k, loc)| (at.key(k), loc)));
        }
        if let Some(section) = &self.elements.add_to_cart {
            let at = base.key("addtocart");
            out.extend(section.entries().map(|(k, loc)| (at.key(k), loc)));
        }
        if let Some(section) = &self.elements.checkout {
            let at = base.key("checkout");
            out.extend(section.entries().map(|(k, loc)| (at.key(k), loc)));
        }
        let at = base.key("popups");
        out.extend(
            self.elements
                .popups
                .iter()
                .enumerate()
                .map(|(i, popup)| (at.index(i), popup.locator())),
        );

        out
    }

    /// Same as [`Self::locators`], stably ordered by priority with
    /// unprioritized locators last. Ties keep the order of [`Self::locators`].
    #[must_use]
    pub fn locators_by_priority(&self) -> Vec<(FieldPath, &ElementLocator)> {
        let mut all = self.locators();
        all.sort_by_key(|(_, loc)| loc.priority().map_or(u64::MAX, NonZeroU64::get));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_kind_round_trips_known_tags() {
        for tag in [
            "cookieAccept",
            "cookieDecline",
            "cookiePreferences",
            "cookieSettings",
            "stockStatus",
            "price",
            "addToCart",
            "cart",
            "checkoutButton",
            "locationPopup",
        ] {
            let kind = ElementKind::from_tag(tag);
            assert!(!matches!(kind, ElementKind::Other(_)), "{tag} should be known");
            assert_eq!(kind.as_str(), tag);
        }
    }

    #[test]
    fn element_kind_keeps_unknown_tags_verbatim() {
        let kind = ElementKind::from_tag("newsletterPopup");
        assert_eq!(kind, ElementKind::Other("newsletterPopup".to_owned()));
        assert_eq!(kind.to_string(), "newsletterPopup");
    }

    #[test]
    fn consent_choices_serialize_with_document_keys() {
        let choices = ConsentChoices {
            marketing: true,
            analytics: false,
            functional: true,
        };
        let value = serde_json::to_value(choices).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "marketingChoices": true,
                "analyticsChoices": false,
                "functionalChoices": true
            })
        );
    }
}
