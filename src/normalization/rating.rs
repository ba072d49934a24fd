use serde::{Deserialize, Serialize};

/// ESRB content rating as shown on a game's detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentRating {
    E,
    #[serde(rename = "E10+")]
    E10Plus,
    T,
    M,
}

impl ContentRating {
    pub const ALL: [ContentRating; 4] = [
        ContentRating::E,
        ContentRating::E10Plus,
        ContentRating::T,
        ContentRating::M,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentRating::E => "E",
            ContentRating::E10Plus => "E10+",
            ContentRating::T => "T",
            ContentRating::M => "M",
        }
    }

    /// Exact, case-sensitive match; stored values use the canonical spelling.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == raw)
    }
}

impl std::fmt::Display for ContentRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
