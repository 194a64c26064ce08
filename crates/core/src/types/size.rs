//! Garment sizes.

use serde::{Deserialize, Serialize};

use super::id::SizeId;

/// Error returned when a string is not one of the fixed size names.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown size: {0} (expected one of XS, S, M, L, XL, XXL)")]
pub struct UnknownSize(pub String);

/// Size names offered by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SizeName {
    XS,
    S,
    M,
    L,
    XL,
    XXL,
}

impl SizeName {
    /// All sizes, smallest first.
    pub const ALL: [Self; 6] = [Self::XS, Self::S, Self::M, Self::L, Self::XL, Self::XXL];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::XS => "XS",
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::XL => "XL",
            Self::XXL => "XXL",
        }
    }
}

impl std::fmt::Display for SizeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SizeName {
    type Err = UnknownSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSize(s.to_owned()))
    }
}

/// A size variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub id: SizeId,
    pub name: SizeName,
}

impl Size {
    /// Create a size variant with a fresh id.
    #[must_use]
    pub fn new(name: SizeName) -> Self {
        Self {
            id: SizeId::generate(),
            name,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("xl".parse::<SizeName>().unwrap(), SizeName::XL);
        assert_eq!(" XXL ".parse::<SizeName>().unwrap(), SizeName::XXL);
        assert!("XXXL".parse::<SizeName>().is_err());
    }

    #[test]
    fn test_serde_uses_uppercase_names() {
        let size: Size = serde_json::from_str(r#"{"id":"s1","name":"XS"}"#).unwrap();
        assert_eq!(size.name, SizeName::XS);
    }
}
