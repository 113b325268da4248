use crate::api_client::MatchApiClient;
use crate::config::Config;
use crate::errors::ClientError;
use crate::form_state::FormState;
use crate::models::{LabeledPrediction, PredictionResult, Subject};
use crate::ranking::map_score_to_label;
use crate::validation::{prepare_pair, FormPolicy, MetadataDefaults};

pub const PREDICTION_FAILED: &str = "Failed to get prediction. Please try again.";

/// Form that scores exactly one subject pair per submission.
pub struct SinglePairPredictor {
    client: MatchApiClient,
    policy: FormPolicy,
    defaults: MetadataDefaults,
    labels: Vec<String>,
    state: FormState,
    result: Option<PredictionResult>,
}

impl SinglePairPredictor {
    pub fn new(client: MatchApiClient, policy: FormPolicy) -> Self {
        Self {
            client,
            policy,
            defaults: MetadataDefaults::default(),
            labels: Vec::new(),
            state: FormState::default(),
            result: None,
        }
    }

    pub fn from_config(client: MatchApiClient, config: &Config) -> Self {
        Self::new(client, config.form_policy)
            .with_defaults(config.metadata_defaults)
            .with_labels(config.labels.clone())
    }

    pub fn with_defaults(mut self, defaults: MetadataDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// The last successful result. Failed submissions leave it untouched.
    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    /// Validates the pair and sends one prediction request.
    pub async fn submit(
        &mut self,
        primary: &Subject,
        secondary: &Subject,
    ) -> Result<PredictionResult, ClientError> {
        let request = match prepare_pair(primary, secondary, self.policy, &self.defaults) {
            Ok(request) => request,
            Err(e) => return Err(self.state.reject(e)),
        };

        let guard = self.state.begin();
        match self.client.predict(&request).await {
            Ok(result) => {
                self.result = Some(result.clone());
                guard.succeed();
                Ok(result)
            }
            Err(e) => {
                tracing::error!("Failed to predict: {}", e);
                Err(guard.fail(ClientError::Request(PREDICTION_FAILED.to_string())))
            }
        }
    }

    /// Like [`submit`](Self::submit), then maps the score onto the configured labels.
    ///
    /// An empty label list is rejected before any request is sent.
    pub async fn submit_labeled(
        &mut self,
        primary: &Subject,
        secondary: &Subject,
    ) -> Result<LabeledPrediction, ClientError> {
        if self.labels.is_empty() {
            return Err(self.state.reject(ClientError::InvalidConfiguration(
                "label list is empty".to_string(),
            )));
        }

        let result = self.submit(primary, secondary).await?;
        let label = map_score_to_label(result.score, self.labels.as_slice())?.to_string();
        Ok(LabeledPrediction { result, label })
    }
}
