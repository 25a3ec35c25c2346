use async_trait::async_trait;

use wordtrail_core::model::{StreakRecord, Topic};

use super::HttpRepository;
use super::mapping::{SaveStreakRequest, SaveStreakResponse, StreakRecordDto, check_status, net};
use crate::repository::{StorageError, StreakRepository};

#[async_trait]
impl StreakRepository for HttpRepository {
    async fn save_streak(
        &self,
        words: &[Topic],
        score: u32,
    ) -> Result<Vec<StreakRecord>, StorageError> {
        let payload = SaveStreakRequest {
            words: words.iter().map(Topic::as_str).collect(),
            score,
        };

        let response = self
            .authorize(self.client().post(self.url("/streaks")))
            .json(&payload)
            .send()
            .await
            .map_err(net)?;
        check_status(response.status())?;

        let body: SaveStreakResponse = response.json().await.map_err(net)?;
        body.streak_history
            .into_iter()
            .map(StreakRecordDto::into_record)
            .collect()
    }
}
