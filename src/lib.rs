//! Match Predictor Client Library
//!
//! Client-side orchestration for a remote compatibility Prediction Service
//! and a Notes Service: required-field validation, request issuing, ranking
//! of prediction results, score-to-label mapping and a local notes cache.
//!
//! # Modules
//!
//! - `api_client`: HTTP client for both services.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `form_state`: Loading/error status shared by every form.
//! - `history`: Previously stored predictions.
//! - `models`: Subjects, requests, results and notes.
//! - `notes`: Notes cache.
//! - `predictor`: Single-pair predictor.
//! - `ranker`: Multi-candidate ranker.
//! - `ranking`: Stable ranking and score-to-label mapping.
//! - `validation`: Required-field checks.

pub mod api_client;
pub mod config;
pub mod errors;
pub mod form_state;
pub mod history;
pub mod models;
pub mod notes;
pub mod predictor;
pub mod ranker;
pub mod ranking;
pub mod validation;
