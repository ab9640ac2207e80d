/// This module contains the structs returned by the HTTP endpoints.
/// They are serialized as JSON objects for the mobile client.
/// The field names become the JSON keys, so they must stay in sync with the client.

use serde::{Deserialize, Serialize};

use crate::predictions::Prediction;

/// The body of a successful `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PredictResponse
{
    /// The display form of the top label, e.g. "Golden Retriever".
    pub label: String,
    /// The top label's score, in [0, 1].
    pub confidence: f32,
}

impl From<&Prediction> for PredictResponse
{
    fn from(prediction: &Prediction) -> Self
    {
        PredictResponse
        {
            label: prediction.display_label(),
            confidence: prediction.score,
        }
    }
}

/// The body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ErrorResponse<T>
{
    pub error: T,
}
