use crate::api_client::MatchApiClient;
use crate::errors::ClientError;
use crate::form_state::FormState;
use crate::models::{PredictionRequest, PredictionResult, RankedMatchList, Subject};
use crate::ranking::rank;
use crate::validation::{filter_candidates, require_non_blank, MISSING_CANDIDATES, MISSING_FIXED_NAME};
use futures::future::try_join_all;
use std::str::FromStr;

pub const RANKING_FAILED: &str = "Failed to find your best match. Please try again.";

/// How the per-candidate requests are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// One request at a time, in input order.
    #[default]
    Sequential,
    /// All requests in flight together. Ranking is unaffected.
    Concurrent,
}

impl FromStr for RequestMode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(RequestMode::Sequential),
            "concurrent" => Ok(RequestMode::Concurrent),
            other => Err(ClientError::InvalidConfiguration(format!(
                "unknown request mode '{}' (expected sequential or concurrent)",
                other
            ))),
        }
    }
}

/// Scores one fixed subject against a list of candidate names and ranks them.
///
/// All-or-nothing: the first failed request discards every result gathered
/// so far and the previous ranking stays in place.
pub struct MultiCandidateRanker {
    client: MatchApiClient,
    mode: RequestMode,
    state: FormState,
    results: RankedMatchList,
}

impl MultiCandidateRanker {
    pub fn new(client: MatchApiClient) -> Self {
        Self::with_mode(client, RequestMode::default())
    }

    pub fn with_mode(client: MatchApiClient, mode: RequestMode) -> Self {
        Self {
            client,
            mode,
            state: FormState::default(),
            results: RankedMatchList::default(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// The ranking from the last fully successful submission.
    pub fn results(&self) -> &RankedMatchList {
        &self.results
    }

    /// Requests a score for every non-blank candidate and ranks the outcome.
    pub async fn submit<S: AsRef<str>>(
        &mut self,
        fixed: &Subject,
        candidates: &[S],
    ) -> Result<RankedMatchList, ClientError> {
        let fixed_name = match require_non_blank(&fixed.name, MISSING_FIXED_NAME) {
            Ok(name) => name.to_string(),
            Err(e) => return Err(self.state.reject(e)),
        };

        let candidates = filter_candidates(candidates);
        if candidates.is_empty() {
            return Err(self
                .state
                .reject(ClientError::Validation(MISSING_CANDIDATES.to_string())));
        }

        let fixed = Subject {
            name: fixed_name,
            ..fixed.clone()
        };
        let requests: Vec<PredictionRequest> = candidates
            .into_iter()
            .map(|name| PredictionRequest::new(fixed.clone(), Subject::named(name)))
            .collect();

        tracing::info!(
            "Ranking {} candidates for {} ({:?})",
            requests.len(),
            fixed.name,
            self.mode
        );

        let guard = self.state.begin();
        match fetch_all(&self.client, self.mode, &requests).await {
            Ok(collected) => {
                self.results = rank(collected);
                guard.succeed();
                Ok(self.results.clone())
            }
            Err(e) => {
                tracing::error!("Failed to rank candidates: {}", e);
                Err(guard.fail(ClientError::Request(RANKING_FAILED.to_string())))
            }
        }
    }
}

/// Returns results in request order; stops at the first error.
async fn fetch_all(
    client: &MatchApiClient,
    mode: RequestMode,
    requests: &[PredictionRequest],
) -> Result<Vec<PredictionResult>, ClientError> {
    match mode {
        RequestMode::Sequential => {
            let mut collected = Vec::with_capacity(requests.len());
            for request in requests {
                collected.push(client.predict(request).await?);
            }
            Ok(collected)
        }
        // try_join_all keeps input order and drops the remaining futures on failure
        RequestMode::Concurrent => try_join_all(requests.iter().map(|r| client.predict(r))).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_mode_parsing() {
        assert_eq!("Concurrent".parse::<RequestMode>().unwrap(), RequestMode::Concurrent);
        assert_eq!(" sequential ".parse::<RequestMode>().unwrap(), RequestMode::Sequential);
        assert!("parallel".parse::<RequestMode>().is_err());
    }

    #[tokio::test]
    async fn test_blank_fixed_name_sends_nothing() {
        // Port 9 is never contacted: validation fails first.
        let client =
            MatchApiClient::new("http://127.0.0.1:9", std::time::Duration::from_secs(1)).unwrap();
        let mut ranker = MultiCandidateRanker::new(client);

        let err = ranker.submit(&Subject::named(" "), &["X"]).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(ranker.state().error(), Some(MISSING_FIXED_NAME));
        assert!(!ranker.state().is_loading());
    }

    #[tokio::test]
    async fn test_all_blank_candidates_rejected() {
        let client =
            MatchApiClient::new("http://127.0.0.1:9", std::time::Duration::from_secs(1)).unwrap();
        let mut ranker = MultiCandidateRanker::new(client);

        let err = ranker.submit(&Subject::named("Me"), &["", "  "]).await.unwrap_err();

        assert!(err.is_validation());
        assert!(ranker.results().is_empty());
    }
}
