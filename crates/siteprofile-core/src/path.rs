//! Dotted field paths used to point at a location inside a profile document.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Key(String),
    Index(usize),
}

/// A path into a profile document, rendered as
/// `elements.popups[0].selectors.primary`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The empty path, pointing at the document root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path extended with an object key.
    #[must_use]
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(key.to_owned()));
        Self { segments }
    }

    /// Returns a new path extended with an array index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last object key in the path, if any.
    #[must_use]
    pub fn last_key(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|s| match s {
            Segment::Key(k) => Some(k.as_str()),
            Segment::Index(_) => None,
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(k) if i == 0 => f.write_str(k)?,
                Segment::Key(k) => write!(f, ".{k}")?,
                Segment::Index(n) => write!(f, "[{n}]")?,
            }
        }
        Ok(())
    }
}

impl serde::Serialize for FieldPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_keys_with_dots() {
        let path = FieldPath::root()
            .key("elements")
            .key("product")
            .key("addToCart")
            .key("selectors")
            .key("primary");
        assert_eq!(path.to_string(), "elements.product.addToCart.selectors.primary");
    }

    #[test]
    fn renders_indices_with_brackets() {
        let path = FieldPath::root()
            .key("elements")
            .key("popups")
            .index(2)
            .key("trigger");
        assert_eq!(path.to_string(), "elements.popups[2].trigger");
    }

    #[test]
    fn root_renders_placeholder() {
        assert!(FieldPath::root().is_root());
        assert_eq!(FieldPath::root().to_string(), "<root>");
    }

    #[test]
    fn last_key_skips_indices() {
        let path = FieldPath::root().key("secondary").index(1);
        assert_eq!(path.last_key(), Some("secondary"));
        assert_eq!(FieldPath::root().last_key(), None);
    }
}
