use serde::{Deserialize, Serialize};

/// Platforms the listing pages can be browsed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Ps4,
    Ps5,
    Switch,
    #[serde(rename = "xboxone")]
    XboxOne,
    XboxSeriesX,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Ps4,
        Platform::Ps5,
        Platform::Switch,
        Platform::XboxOne,
        Platform::XboxSeriesX,
    ];

    /// Short code used on the command line and in listing URLs.
    pub fn code(self) -> &'static str {
        match self {
            Platform::Ps4 => "ps4",
            Platform::Ps5 => "ps5",
            Platform::Switch => "switch",
            Platform::XboxOne => "xboxone",
            Platform::XboxSeriesX => "xbox-series-x",
        }
    }

    /// Label as printed on the site and stored in `Games.Platform`.
    pub fn label(self) -> &'static str {
        match self {
            Platform::Ps4 => "PlayStation 4",
            Platform::Ps5 => "PlayStation 5",
            Platform::Switch => "Switch",
            Platform::XboxOne => "Xbox One",
            Platform::XboxSeriesX => "Xbox Series X",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    /// Match a scraped label, tolerating case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(wanted))
    }

    pub fn codes() -> Vec<&'static str> {
        Self::ALL.iter().map(|p| p.code()).collect()
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_lookup() {
        for p in Platform::ALL {
            assert_eq!(Platform::from_code(p.code()), Some(p));
        }
        assert_eq!(Platform::from_code("PS4"), None);
        assert_eq!(Platform::from_code("none"), None);
    }

    #[test]
    fn scraped_labels_are_matched_loosely() {
        assert_eq!(Platform::from_label(" PlayStation 5 "), Some(Platform::Ps5));
        assert_eq!(Platform::from_label("xbox one"), Some(Platform::XboxOne));
        assert_eq!(Platform::from_label("Stadia"), None);
    }

    #[test]
    fn serialized_names_match_codes() {
        for p in Platform::ALL {
            assert_eq!(serde_json::to_value(p).unwrap(), p.code());
        }
    }
}
