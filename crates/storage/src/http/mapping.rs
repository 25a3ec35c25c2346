use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use wordtrail_core::model::{Profile, StreakId, StreakRecord, Topic};

use crate::repository::StorageError;

pub(crate) fn ser<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn net(e: reqwest::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Map a response status onto the storage error taxonomy. 401 and 429 get
/// their own variants because the session bridge reacts to them.
pub(crate) fn check_status(status: StatusCode) -> Result<(), StorageError> {
    if status.is_success() {
        return Ok(());
    }
    Err(match status {
        StatusCode::UNAUTHORIZED => StorageError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => StorageError::RateLimited,
        StatusCode::NOT_FOUND => StorageError::NotFound,
        other => StorageError::Http {
            status: other.as_u16(),
        },
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveStreakRequest<'a> {
    pub words: Vec<&'a str>,
    pub score: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveStreakResponse {
    #[serde(default)]
    pub streak_history: Vec<StreakRecordDto>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StreakRecordDto {
    pub id: String,
    pub words: Vec<String>,
    pub score: u32,
    pub completed_at: DateTime<Utc>,
}

impl StreakRecordDto {
    pub(crate) fn into_record(self) -> Result<StreakRecord, StorageError> {
        let id: StreakId = self.id.parse().map_err(ser)?;
        let words = self
            .words
            .into_iter()
            .map(Topic::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ser)?;
        StreakRecord::from_persisted(id, words, self.score, self.completed_at).map_err(ser)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveAttemptRequest<'a> {
    pub topic: &'a str,
    pub question_index: usize,
    pub selected_option_key: char,
    pub is_correct: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ToggleFavoriteRequest<'a> {
    pub topic: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileResponse {
    #[serde(default)]
    pub explored_words: Vec<String>,
    #[serde(default)]
    pub favorite_words: Vec<String>,
    #[serde(default)]
    pub streak_history: Vec<StreakRecordDto>,
}

impl ProfileResponse {
    pub(crate) fn into_profile(self) -> Result<Profile, StorageError> {
        let explored_words = topics(self.explored_words)?;
        let favorite_words = topics(self.favorite_words)?;
        let streak_history = self
            .streak_history
            .into_iter()
            .map(StreakRecordDto::into_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Profile {
            explored_words,
            favorite_words,
            streak_history,
        })
    }
}

fn topics(raw: Vec<String>) -> Result<Vec<Topic>, StorageError> {
    raw.into_iter()
        .map(|word| Topic::new(word).map_err(ser))
        .collect()
}
