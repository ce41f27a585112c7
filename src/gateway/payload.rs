use serde::{Deserialize, Serialize};

/// Body of `POST /predict`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PredictRequest {
    pub profile_text: String,
}

/// Successful `POST /predict` response.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PredictResponse {
    pub score: f64,
}
