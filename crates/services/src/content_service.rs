use std::env;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use wordtrail_core::model::{QuizQuestion, Topic};
use wordtrail_core::parser;

use crate::error::ContentServiceError;

/// How a topic should be rendered by the generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    /// Plain explanation of the topic.
    Explain,
    /// Explanation plus quiz blocks.
    Quiz,
    /// Next beat of a branching dialogue.
    Branch,
}

impl ContentMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Explain => "explain",
            Self::Quiz => "quiz",
            Self::Branch => "branch",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ContentConfig {
    pub base_url: String,
    pub api_token: String,
    pub language: String,
}

impl ContentConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_token = env::var("WORDTRAIL_API_TOKEN").ok()?;
        if api_token.trim().is_empty() {
            return None;
        }
        let base_url = env::var("WORDTRAIL_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.wordtrail.app/v1".into());
        let language = env::var("WORDTRAIL_LANGUAGE").unwrap_or_else(|_| "en".into());
        Some(Self {
            base_url,
            api_token,
            language,
        })
    }
}

/// Output of one generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedContent {
    pub explanation: Option<String>,
    pub quiz_raw: Vec<String>,
}

impl GeneratedContent {
    /// Parse the raw quiz blocks into validated questions, dropping rejects.
    #[must_use]
    pub fn quiz_questions(&self) -> Vec<QuizQuestion> {
        parser::parse_blocks(&self.quiz_raw)
    }
}

/// Default deadline for branch requests. Explanation and quiz fetches wait
/// unbounded, but a stalled dialogue beat holds the whole exchange hostage,
/// so branch calls get a deadline and are treated as failed past it.
pub const BRANCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the `generate_content` collaborator.
#[derive(Clone)]
pub struct ContentService {
    client: Client,
    config: Option<ContentConfig>,
    branch_timeout: Duration,
}

impl ContentService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ContentConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<ContentConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
            branch_timeout: BRANCH_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_branch_timeout(mut self, timeout: Duration) -> Self {
        self.branch_timeout = timeout;
        self
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Generate explanation and/or quiz content for a topic.
    ///
    /// `prior_explanation` carries the text the new content should build on.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError` when the service is disabled, the
    /// request fails, the backend blocks the call (401/429), or the response
    /// carries neither an explanation nor quiz blocks.
    pub async fn generate(
        &self,
        topic: &Topic,
        mode: ContentMode,
        prior_explanation: Option<&str>,
    ) -> Result<GeneratedContent, ContentServiceError> {
        self.call(topic, mode, prior_explanation, None).await
    }

    /// Continue a branching dialogue with the user's chosen option.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::generate`], plus a timeout (surfaced as
    /// `ContentServiceError::Http`) when the dialogue beat takes longer than
    /// the branch deadline.
    pub async fn branch(
        &self,
        topic: &Topic,
        choice: &str,
        prior_explanation: Option<&str>,
    ) -> Result<GeneratedContent, ContentServiceError> {
        self.call(topic, ContentMode::Branch, prior_explanation, Some(choice))
            .await
    }

    async fn call(
        &self,
        topic: &Topic,
        mode: ContentMode,
        prior_explanation: Option<&str>,
        choice: Option<&str>,
    ) -> Result<GeneratedContent, ContentServiceError> {
        let config = self.config.as_ref().ok_or(ContentServiceError::Disabled)?;

        let url = format!("{}/generate", config.base_url.trim_end_matches('/'));
        let payload = GenerateRequest {
            topic: topic.as_str(),
            mode: mode.as_str(),
            language: &config.language,
            prior_explanation,
            choice,
        };

        let mut request = self
            .client
            .post(url)
            .bearer_auth(&config.api_token)
            .json(&payload);
        if mode == ContentMode::Branch {
            request = request.timeout(self.branch_timeout);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::UNAUTHORIZED => return Err(ContentServiceError::AuthRequired),
            StatusCode::TOO_MANY_REQUESTS => {
                warn!(topic = topic.as_str(), "content generation rate limited");
                return Err(ContentServiceError::RateLimited);
            }
            status if !status.is_success() => {
                return Err(ContentServiceError::HttpStatus(status));
            }
            _ => {}
        }

        let body: GenerateResponse = response.json().await?;
        let content = GeneratedContent {
            explanation: body
                .explanation
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
            quiz_raw: body.quiz_raw,
        };

        if content.explanation.is_none() && content.quiz_raw.is_empty() {
            return Err(ContentServiceError::EmptyResponse);
        }
        Ok(content)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    topic: &'a str,
    mode: &'a str,
    language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    prior_explanation: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    choice: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    explanation: Option<String>,
    #[serde(default)]
    quiz_raw: Vec<String>,
}
