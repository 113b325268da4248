use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============ Form Models ============

/// One named party supplied to a prediction request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Display name. Required and non-blank after trimming.
    pub name: String,
    /// Age in years, optional unless the form policy requires it.
    pub age: Option<u32>,
    /// Date of birth, optional unless the form policy requires it.
    pub date_of_birth: Option<NaiveDate>,
}

impl Subject {
    /// Creates a subject carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: None,
            date_of_birth: None,
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_date_of_birth(mut self, dob: NaiveDate) -> Self {
        self.date_of_birth = Some(dob);
        self
    }
}

/// An ordered pair of subjects sent to the Prediction Service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    pub primary: Subject,
    pub secondary: Subject,
}

impl PredictionRequest {
    pub fn new(primary: Subject, secondary: Subject) -> Self {
        Self { primary, secondary }
    }

    /// Flattens the pair into the wire body of `POST /predict`.
    pub fn to_payload(&self) -> PredictionPayload {
        PredictionPayload {
            primary_name: self.primary.name.clone(),
            primary_age: self.primary.age,
            primary_dob: self.primary.date_of_birth,
            secondary_name: self.secondary.name.clone(),
            secondary_age: self.secondary.age,
            secondary_dob: self.secondary.date_of_birth,
        }
    }
}

// ============ Wire Models ============

/// JSON body of `POST /predict`. Absent optional fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionPayload {
    pub primary_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_dob: Option<NaiveDate>,
    pub secondary_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_dob: Option<NaiveDate>,
}

/// A scored pair returned by the Prediction Service.
///
/// Accepts both the generic field names and the ones the deployed service
/// emits (`boy_name`, `girl_name`, `prediction_score`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Server-assigned identifier, when the service persists predictions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(alias = "boy_name")]
    pub primary_name: String,
    #[serde(alias = "girl_name")]
    pub secondary_name: String,
    #[serde(alias = "prediction_score")]
    pub score: i64,
    #[serde(default, alias = "boy_age", skip_serializing_if = "Option::is_none")]
    pub primary_age: Option<u32>,
    #[serde(default, alias = "boy_dob", skip_serializing_if = "Option::is_none")]
    pub primary_dob: Option<String>,
    #[serde(default, alias = "girl_age", skip_serializing_if = "Option::is_none")]
    pub secondary_age: Option<u32>,
    #[serde(default, alias = "girl_dob", skip_serializing_if = "Option::is_none")]
    pub secondary_dob: Option<String>,
}

impl PredictionResult {
    /// Builds a bare result; mostly useful for ranking and tests.
    pub fn new(primary_name: impl Into<String>, secondary_name: impl Into<String>, score: i64) -> Self {
        Self {
            id: None,
            primary_name: primary_name.into(),
            secondary_name: secondary_name.into(),
            score,
            primary_age: None,
            primary_dob: None,
            secondary_age: None,
            secondary_dob: None,
        }
    }
}

/// A prediction result paired with the label its score maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledPrediction {
    #[serde(flatten)]
    pub result: PredictionResult,
    pub label: String,
}

/// A stored text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Server-assigned identifier; the only stable handle for deletion.
    pub id: i64,
    pub text: String,
    /// Creation time. Offset-less timestamps are read as UTC.
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Accepts RFC 3339 timestamps as well as naive ISO ones such as
/// `2025-01-02T10:00:00.123456`, which the Notes Service emits.
fn deserialize_lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| Some(naive.and_utc()))
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

// ============ Ranked Results ============

/// Prediction results ordered by score, highest first.
///
/// Only constructed through [`crate::ranking::rank`], so the ordering
/// invariant always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RankedMatchList(pub(crate) Vec<PredictionResult>);

impl RankedMatchList {
    /// The highest-scoring result, if any.
    pub fn best(&self) -> Option<&PredictionResult> {
        self.0.first()
    }

    pub fn as_slice(&self) -> &[PredictionResult] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PredictionResult> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<PredictionResult> {
        self.0
    }
}

impl<'a> IntoIterator for &'a RankedMatchList {
    type Item = &'a PredictionResult;
    type IntoIter = std::slice::Iter<'a, PredictionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_omits_missing_metadata() {
        let request = PredictionRequest::new(Subject::named("Ana"), Subject::named("Bia"));
        let body = serde_json::to_value(request.to_payload()).unwrap();

        assert_eq!(
            body,
            json!({ "primary_name": "Ana", "secondary_name": "Bia" })
        );
    }

    #[test]
    fn test_payload_includes_metadata() {
        let dob = NaiveDate::from_ymd_opt(1999, 1, 1).unwrap();
        let request = PredictionRequest::new(
            Subject::named("Ana").with_age(25).with_date_of_birth(dob),
            Subject::named("Bia").with_age(23),
        );
        let body = serde_json::to_value(request.to_payload()).unwrap();

        assert_eq!(body["primary_age"], 25);
        assert_eq!(body["primary_dob"], "1999-01-01");
        assert_eq!(body["secondary_age"], 23);
        assert!(body.get("secondary_dob").is_none());
    }

    #[test]
    fn test_result_accepts_service_field_names() {
        let raw = json!({
            "id": 4,
            "boy_name": "Ravi",
            "boy_age": 25,
            "boy_dob": "1999-01-01",
            "girl_name": "Mira",
            "girl_age": 23,
            "girl_dob": "2001-01-01",
            "prediction_score": 77
        });
        let result: PredictionResult = serde_json::from_value(raw).unwrap();

        assert_eq!(result.id, Some(4));
        assert_eq!(result.primary_name, "Ravi");
        assert_eq!(result.secondary_name, "Mira");
        assert_eq!(result.score, 77);
        assert_eq!(result.secondary_age, Some(23));
    }

    #[test]
    fn test_result_accepts_generic_field_names() {
        let raw = json!({ "primary_name": "A", "secondary_name": "B", "score": -3 });
        let result: PredictionResult = serde_json::from_value(raw).unwrap();

        assert_eq!(result, PredictionResult::new("A", "B", -3));
    }

    #[test]
    fn test_note_with_naive_timestamp() {
        let raw = json!({ "id": 1, "text": "milk", "created_at": "2025-01-02T10:00:00.123456" });
        let note: Note = serde_json::from_value(raw).unwrap();

        let expected = NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_micro_opt(10, 0, 0, 123_456)
            .unwrap()
            .and_utc();
        assert_eq!(note.created_at, Some(expected));
    }

    #[test]
    fn test_note_with_offset_timestamp() {
        let raw = json!({ "id": 2, "text": "eggs", "created_at": "2025-01-02T12:00:00+02:00" });
        let note: Note = serde_json::from_value(raw).unwrap();

        let expected = NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            .and_utc();
        assert_eq!(note.created_at, Some(expected));
    }

    #[test]
    fn test_note_with_null_timestamp() {
        let raw = json!({ "id": 3, "text": "bread", "created_at": null });
        let note: Note = serde_json::from_value(raw).unwrap();
        assert!(note.created_at.is_none());
    }

    #[test]
    fn test_note_without_timestamp() {
        let note: Note = serde_json::from_value(json!({ "id": 1, "text": "milk" })).unwrap();
        assert_eq!(note.id, 1);
        assert!(note.created_at.is_none());
    }
}
