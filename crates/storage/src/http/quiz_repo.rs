use async_trait::async_trait;

use wordtrail_core::model::{QuizAttempt, Topic};

use super::HttpRepository;
use super::mapping::{SaveAttemptRequest, check_status, net};
use crate::repository::{QuizAttemptRepository, StorageError};

#[async_trait]
impl QuizAttemptRepository for HttpRepository {
    async fn save_attempt(
        &self,
        topic: &Topic,
        attempt: &QuizAttempt,
    ) -> Result<(), StorageError> {
        let payload = SaveAttemptRequest {
            topic: topic.as_str(),
            question_index: attempt.question_index,
            selected_option_key: attempt.selected.as_char(),
            is_correct: attempt.is_correct,
        };

        let response = self
            .authorize(self.client().post(self.url("/quiz-attempts")))
            .json(&payload)
            .send()
            .await
            .map_err(net)?;
        check_status(response.status())
    }
}
