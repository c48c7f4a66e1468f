use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

pub mod entry;

pub use entry::{parse_minutes, CatalogEntry, EntryFields, ValidFields, MAX_PERIOD};

/// Field a catalog search is restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    /// Every text field
    All,
    Label,
    Format,
    Number,
    Composer,
    Work,
    Performers,
}

impl SearchField {
    /// Text fields covered by `SearchField::All`
    pub const TEXT_FIELDS: [SearchField; 6] = [
        SearchField::Label,
        SearchField::Format,
        SearchField::Number,
        SearchField::Composer,
        SearchField::Work,
        SearchField::Performers,
    ];

    /// The values this field contributes for `entry`
    pub fn values<'a>(&self, entry: &'a CatalogEntry) -> Vec<&'a str> {
        match self {
            SearchField::All => Self::TEXT_FIELDS
                .iter()
                .flat_map(|f| f.values(entry))
                .collect(),
            SearchField::Label => vec![entry.label.as_str()],
            SearchField::Format => vec![entry.format.as_str()],
            SearchField::Number => vec![entry.number.as_str()],
            SearchField::Composer => vec![entry.composer.as_str()],
            SearchField::Work => vec![entry.work.as_str()],
            SearchField::Performers => vec![entry.performers.as_str()],
        }
    }
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "*" => Ok(SearchField::All),
            "label" => Ok(SearchField::Label),
            "format" => Ok(SearchField::Format),
            "number" => Ok(SearchField::Number),
            "composer" => Ok(SearchField::Composer),
            "work" => Ok(SearchField::Work),
            "performers" => Ok(SearchField::Performers),
            other => Err(format!("unknown search field {:?}", other)),
        }
    }
}

impl Display for SearchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SearchField::All => "*",
            SearchField::Label => "label",
            SearchField::Format => "format",
            SearchField::Number => "number",
            SearchField::Composer => "composer",
            SearchField::Work => "work",
            SearchField::Performers => "performers",
        };
        write!(f, "{}", name)
    }
}

/// Body of `POST /record/search`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default = "default_search_field")]
    pub search_field: String,
    #[serde(default)]
    pub query_text: String,
}

fn default_search_field() -> String {
    "*".to_string()
}

/// All three recommendation lists for one source entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationSet {
    pub composer: Vec<CatalogEntry>,
    pub period: Vec<CatalogEntry>,
    pub disc: Vec<CatalogEntry>,
}
