use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Highest stylistic period a catalog entry can carry
pub const MAX_PERIOD: u8 = 6;

/// One physical recording of one musical work
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub label: String,
    pub format: String,
    pub number: String,
    pub period: Option<u8>,
    pub composer: String,
    pub work: String,
    /// Soloists, then conductor, then ensemble
    pub performers: String,
    /// Duration in minutes, kept as entered
    pub time: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The editable field set of an entry, as posted by the client
///
/// Create and update both carry the whole set; an update replaces every field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntryFields {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub number: String,
    #[serde(default, deserialize_with = "lenient_period")]
    pub period: Option<i64>,
    #[serde(default)]
    pub composer: String,
    #[serde(default)]
    pub work: String,
    #[serde(default)]
    pub performers: String,
    #[serde(default, deserialize_with = "lenient_time")]
    pub time: Option<String>,
}

impl CatalogEntry {
    /// Builds a fresh entry from already validated fields
    pub fn new(id: Uuid, fields: ValidFields) -> Self {
        let now = Utc::now();
        let ValidFields(f) = fields;
        Self {
            id,
            label: f.label,
            format: f.format,
            number: f.number,
            period: f.period.map(|p| p as u8),
            composer: f.composer,
            work: f.work,
            performers: f.performers,
            time: f.time,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every editable field, keeping id and creation time
    pub fn replace_fields(&mut self, fields: ValidFields) {
        let ValidFields(f) = fields;
        self.label = f.label;
        self.format = f.format;
        self.number = f.number;
        self.period = f.period.map(|p| p as u8);
        self.composer = f.composer;
        self.work = f.work;
        self.performers = f.performers;
        self.time = f.time;
        self.updated_at = Utc::now();
    }

    /// Duration in minutes, if `time` holds a finite positive number
    pub fn minutes(&self) -> Option<f64> {
        parse_minutes(self.time.as_deref()?)
    }
}

/// Parses a free-text duration. Zero, negative and non-finite values count as absent.
pub fn parse_minutes(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|m| m.is_finite() && *m > 0.0)
}

/// `EntryFields` that passed validation
///
/// Only `EntryFields::validate` constructs this, so stores can trust its contents.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidFields(EntryFields);

impl ValidFields {
    pub fn period(&self) -> Option<u8> {
        self.0.period.map(|p| p as u8)
    }

    pub fn fields(&self) -> &EntryFields {
        &self.0
    }
}

impl EntryFields {
    /// Trims text fields and checks the period range
    pub fn validate(self) -> Result<ValidFields, String> {
        if let Some(period) = self.period {
            if !(0..=MAX_PERIOD as i64).contains(&period) {
                return Err(format!(
                    "period must be between 0 and {}, got {}",
                    MAX_PERIOD, period
                ));
            }
        }

        let time = self
            .time
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(ValidFields(EntryFields {
            label: self.label.trim().to_string(),
            format: self.format.trim().to_string(),
            number: self.number.trim().to_string(),
            period: self.period,
            composer: self.composer.trim().to_string(),
            work: self.work.trim().to_string(),
            performers: self.performers.trim().to_string(),
            time,
        }))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

/// The entry form posts the period radio value as a string
fn lenient_period<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Int(n)) => Ok(Some(n)),
        Some(NumberOrText::Float(f)) if f.fract() == 0.0 => Ok(Some(f as i64)),
        Some(NumberOrText::Float(f)) => Err(de::Error::custom(format!(
            "period must be a whole number, got {}",
            f
        ))),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("period must be a number, got {:?}", s))),
    }
}

fn lenient_time<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        None => None,
        Some(NumberOrText::Int(n)) => Some(n.to_string()),
        Some(NumberOrText::Float(f)) => Some(f.to_string()),
        Some(NumberOrText::Text(s)) => Some(s),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_period_accepts_string_and_number() {
        let from_text: EntryFields = serde_json::from_value(json!({ "period": "3" })).unwrap();
        let from_number: EntryFields = serde_json::from_value(json!({ "period": 3 })).unwrap();
        assert_eq!(from_text.period, Some(3));
        assert_eq!(from_number.period, Some(3));
    }

    #[test]
    fn test_empty_period_is_absent() {
        let fields: EntryFields = serde_json::from_value(json!({ "period": "" })).unwrap();
        assert_eq!(fields.period, None);
    }

    #[test]
    fn test_non_numeric_period_is_rejected() {
        let result = serde_json::from_value::<EntryFields>(json!({ "period": "baroque" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_numeric_time_is_kept_as_text() {
        let fields: EntryFields = serde_json::from_value(json!({ "time": 32.5 })).unwrap();
        assert_eq!(fields.time.as_deref(), Some("32.5"));
    }

    #[test]
    fn test_missing_fields_default() {
        let fields: EntryFields = serde_json::from_value(json!({})).unwrap();
        assert_eq!(fields, EntryFields::default());
    }

    #[test]
    fn test_validate_rejects_out_of_range_period() {
        let fields = EntryFields {
            period: Some(7),
            ..Default::default()
        };
        assert!(fields.validate().is_err());

        let fields = EntryFields {
            period: Some(-1),
            ..Default::default()
        };
        assert!(fields.validate().is_err());
    }

    #[test]
    fn test_validate_trims_text() {
        let fields = EntryFields {
            composer: "  Brahms ".to_string(),
            time: Some("   ".to_string()),
            period: Some(6),
            ..Default::default()
        };
        let valid = fields.validate().unwrap();
        assert_eq!(valid.fields().composer, "Brahms");
        assert_eq!(valid.fields().time, None);
        assert_eq!(valid.period(), Some(6));
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes("32.5"), Some(32.5));
        assert_eq!(parse_minutes(" 40 "), Some(40.0));
        assert_eq!(parse_minutes("0"), None);
        assert_eq!(parse_minutes("-3"), None);
        assert_eq!(parse_minutes("NaN"), None);
        assert_eq!(parse_minutes("about an hour"), None);
    }

    #[test]
    fn test_replace_fields_keeps_identity() {
        let original = CatalogEntry::new(
            Uuid::new_v4(),
            EntryFields {
                composer: "Brahms".to_string(),
                ..Default::default()
            }
            .validate()
            .unwrap(),
        );
        let mut updated = original.clone();
        updated.replace_fields(
            EntryFields {
                composer: "Schumann".to_string(),
                ..Default::default()
            }
            .validate()
            .unwrap(),
        );

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.composer, "Schumann");
        assert!(updated.updated_at >= original.updated_at);
    }
}
