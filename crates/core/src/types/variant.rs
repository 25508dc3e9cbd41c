//! Garment variant attributes: size and colour.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a variant attribute.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantError {
    /// The size is not one of S, M, L, XL, XXL.
    #[error("unknown size: {0}")]
    UnknownSize(String),
    /// The colour name is blank.
    #[error("color cannot be empty")]
    EmptyColor,
}

/// T-shirt size.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Size {
    #[serde(rename = "S")]
    Small,
    #[serde(rename = "M")]
    Medium,
    #[default]
    #[serde(rename = "L")]
    Large,
    #[serde(rename = "XL")]
    ExtraLarge,
    #[serde(rename = "XXL")]
    DoubleExtraLarge,
}

impl Size {
    /// All sizes in display order.
    pub const ALL: [Self; 5] = [
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::ExtraLarge,
        Self::DoubleExtraLarge,
    ];

    /// Short label (`"S"` … `"XXL"`), identical to the serialized form.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Small => "S",
            Self::Medium => "M",
            Self::Large => "L",
            Self::ExtraLarge => "XL",
            Self::DoubleExtraLarge => "XXL",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Size {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|size| size.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| VariantError::UnknownSize(s.to_owned()))
    }
}

/// A colour name such as `"Black"` or `"Navy"`.
///
/// Stored trimmed and never empty. Comparison is exact: the catalog's
/// spelling is canonical and becomes part of a line item's identity key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Parse a colour name.
    ///
    /// # Errors
    ///
    /// Returns [`VariantError::EmptyColor`] if the name is blank.
    pub fn parse(s: &str) -> Result<Self, VariantError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VariantError::EmptyColor);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the colour name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Color {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = VariantError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_size_serde_labels() {
        let json = serde_json::to_string(&Size::ALL).unwrap();
        assert_eq!(json, r#"["S","M","L","XL","XXL"]"#);
        let size: Size = serde_json::from_str("\"XXL\"").unwrap();
        assert_eq!(size, Size::DoubleExtraLarge);
    }

    #[test]
    fn test_size_from_str_is_case_insensitive() {
        assert_eq!("xl".parse::<Size>().unwrap(), Size::ExtraLarge);
        assert_eq!(" m ".parse::<Size>().unwrap(), Size::Medium);
        assert!(matches!(
            "XXXL".parse::<Size>(),
            Err(VariantError::UnknownSize(_))
        ));
    }

    #[test]
    fn test_default_size_is_large() {
        assert_eq!(Size::default(), Size::Large);
    }

    #[test]
    fn test_color_parse() {
        assert_eq!(Color::parse("  Navy ").unwrap().as_str(), "Navy");
        assert_eq!(Color::parse("   "), Err(VariantError::EmptyColor));
        assert!(serde_json::from_str::<Color>("\"\"").is_err());
    }
}
