use crate::errors::ClientError;
use crate::models::{PredictionResult, RankedMatchList};
use std::cmp::Reverse;

/// Stable-sorts results by score, highest first.
///
/// Results with equal scores keep their input order, so the outcome never
/// depends on the order in which responses arrived.
pub fn rank(mut results: Vec<PredictionResult>) -> RankedMatchList {
    results.sort_by_key(|r| Reverse(r.score));
    RankedMatchList(results)
}

/// Reduces `score` into `[0, len)`, also for negative scores.
pub fn normalize_index(score: i64, len: usize) -> Result<usize, ClientError> {
    if len == 0 {
        return Err(ClientError::InvalidConfiguration(
            "label list is empty".to_string(),
        ));
    }
    Ok(score.rem_euclid(len as i64) as usize)
}

/// Picks the label at `score mod labels.len()`.
pub fn map_score_to_label<S: AsRef<str>>(score: i64, labels: &[S]) -> Result<&str, ClientError> {
    let index = normalize_index(score, labels.len())?;
    Ok(labels[index].as_ref())
}
