use crate::api_client::MatchApiClient;
use crate::errors::ClientError;
use crate::form_state::FormState;
use crate::models::{PredictionResult, RankedMatchList};
use crate::ranking::rank;

pub const HISTORY_LOAD_FAILED: &str = "Failed to load previous predictions.";
pub const HISTORY_DELETE_FAILED: &str = "Failed to delete prediction.";

/// Predictions already stored by the Prediction Service.
pub struct PredictionHistory {
    client: MatchApiClient,
    state: FormState,
    predictions: Vec<PredictionResult>,
}

impl PredictionHistory {
    pub fn new(client: MatchApiClient) -> Self {
        Self {
            client,
            state: FormState::default(),
            predictions: Vec::new(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Stored predictions in server order.
    pub fn predictions(&self) -> &[PredictionResult] {
        &self.predictions
    }

    /// The stored predictions ranked by score, highest first.
    pub fn ranked(&self) -> RankedMatchList {
        rank(self.predictions.clone())
    }

    pub async fn load(&mut self) -> Result<&[PredictionResult], ClientError> {
        let guard = self.state.begin();
        match self.client.list_predictions().await {
            Ok(predictions) => {
                self.predictions = predictions;
                guard.succeed();
                Ok(self.predictions.as_slice())
            }
            Err(e) => {
                tracing::error!("Failed to load predictions: {}", e);
                Err(guard.fail(ClientError::Request(HISTORY_LOAD_FAILED.to_string())))
            }
        }
    }

    /// Deletes a stored prediction and drops it from the local list.
    pub async fn delete(&mut self, id: i64) -> Result<(), ClientError> {
        let guard = self.state.begin();
        match self.client.delete_prediction(id).await {
            Ok(()) => {
                self.predictions.retain(|p| p.id != Some(id));
                guard.succeed();
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to delete prediction {}: {}", id, e);
                Err(guard.fail(ClientError::Request(HISTORY_DELETE_FAILED.to_string())))
            }
        }
    }
}
