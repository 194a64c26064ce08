//! Catalog partitions.

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known catalog partition.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown gender: {0}")]
pub struct UnknownGender(pub String);

/// Coarse catalog partition used purely for filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Women,
    Men,
    /// Seasonal pseudo-gender for winter clothing.
    ColdWeather,
}

impl Gender {
    /// All partitions in navigation order.
    pub const ALL: [Self; 3] = [Self::Women, Self::Men, Self::ColdWeather];

    /// Wire value stored in the data store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Women => "women",
            Self::Men => "men",
            Self::ColdWeather => "cold_weather",
        }
    }

    /// Label shown to shoppers and in the admin tools.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Women => "Mujer",
            Self::Men => "Hombre",
            Self::ColdWeather => "Ropa de Frío",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Gender {
    type Err = UnknownGender;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "women" => Ok(Self::Women),
            "men" => Ok(Self::Men),
            "cold_weather" => Ok(Self::ColdWeather),
            _ => Err(UnknownGender(s.to_owned())),
        }
    }
}

/// Key of a section image: a catalog partition or the main banner.
///
/// Serialized as the bare wire value (`"women"`, `"main_banner"`, ...) because
/// the data store keeps both kinds in the same `gender` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SectionKey {
    Gender(Gender),
    MainBanner,
}

impl SectionKey {
    const MAIN_BANNER: &'static str = "main_banner";

    /// Every section key, main banner first.
    pub const ALL: [Self; 4] = [
        Self::MainBanner,
        Self::Gender(Gender::Women),
        Self::Gender(Gender::Men),
        Self::Gender(Gender::ColdWeather),
    ];

    /// Wire value stored in the data store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gender(gender) => gender.as_str(),
            Self::MainBanner => Self::MAIN_BANNER,
        }
    }
}

impl std::fmt::Display for SectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SectionKey {
    type Err = UnknownGender;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::MAIN_BANNER {
            return Ok(Self::MainBanner);
        }
        s.parse().map(Self::Gender)
    }
}

impl From<Gender> for SectionKey {
    fn from(gender: Gender) -> Self {
        Self::Gender(gender)
    }
}

impl From<SectionKey> for String {
    fn from(key: SectionKey) -> Self {
        key.as_str().to_owned()
    }
}

impl TryFrom<String> for SectionKey {
    type Error = UnknownGender;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_wire_values() {
        assert_eq!(
            serde_json::to_string(&Gender::ColdWeather).unwrap(),
            "\"cold_weather\""
        );
        assert_eq!("men".parse::<Gender>().unwrap(), Gender::Men);
        assert!("kids".parse::<Gender>().is_err());
    }

    #[test]
    fn test_section_key_shares_gender_column() {
        let banner: SectionKey = serde_json::from_str("\"main_banner\"").unwrap();
        assert_eq!(banner, SectionKey::MainBanner);

        let women: SectionKey = serde_json::from_str("\"women\"").unwrap();
        assert_eq!(women, SectionKey::Gender(Gender::Women));
        assert_eq!(serde_json::to_string(&women).unwrap(), "\"women\"");
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Gender::ColdWeather.display_name(), "Ropa de Frío");
    }
}
