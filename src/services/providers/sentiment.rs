/// Text sentiment classification
///
/// The classifier itself is a separately trained model consumed as a black
/// box; the core only owns the decision threshold. The shipped implementation
/// calls a model server over HTTP.
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Scores at or above this are Positive
pub const POSITIVE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
}

/// Classification outcome: the label plus the model's raw score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub confidence: f64,
}

impl Sentiment {
    /// Applies the decision threshold to a raw model score
    pub fn from_score(score: f64) -> Self {
        let label = if score >= POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Negative
        };
        Self {
            label,
            confidence: score,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> AppResult<Sentiment>;
}

/// Classifier backed by an HTTP model server exposing POST /predict
#[derive(Clone)]
pub struct HttpSentimentClassifier {
    http_client: HttpClient,
    api_url: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct PredictResponse {
    score: f64,
}

impl HttpSentimentClassifier {
    pub fn new(api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
        }
    }
}

#[async_trait::async_trait]
impl SentimentClassifier for HttpSentimentClassifier {
    async fn classify(&self, text: &str) -> AppResult<Sentiment> {
        let url = format!("{}/predict", self.api_url);
        let response = self
            .http_client
            .post(&url)
            .json(&PredictRequest { text })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "sentiment model server returned status {}",
                status
            )));
        }

        let prediction: PredictResponse = response.json().await?;
        Ok(Sentiment::from_score(prediction.score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_inclusive_for_positive() {
        let sentiment = Sentiment::from_score(0.5);
        assert_eq!(sentiment.label, SentimentLabel::Positive);
        assert_eq!(sentiment.confidence, 0.5);
    }

    #[test]
    fn test_below_threshold_is_negative() {
        let sentiment = Sentiment::from_score(0.49);
        assert_eq!(sentiment.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(Sentiment::from_score(1.0).label, SentimentLabel::Positive);
        assert_eq!(Sentiment::from_score(0.0).label, SentimentLabel::Negative);
    }

    #[test]
    fn test_predict_response_deserializes() {
        let prediction: PredictResponse = serde_json::from_str(r#"{"score":0.87}"#).unwrap();
        assert_eq!(prediction.score, 0.87);
    }
}
