use async_trait::async_trait;

use wordtrail_core::model::{Profile, Topic};

use super::HttpRepository;
use super::mapping::{ProfileResponse, ToggleFavoriteRequest, check_status, net};
use crate::repository::{FavoriteRepository, ProfileRepository, StorageError};

#[async_trait]
impl FavoriteRepository for HttpRepository {
    async fn toggle_favorite(&self, topic: &Topic) -> Result<(), StorageError> {
        let payload = ToggleFavoriteRequest {
            topic: topic.as_str(),
        };

        let response = self
            .authorize(self.client().post(self.url("/favorites/toggle")))
            .json(&payload)
            .send()
            .await
            .map_err(net)?;
        check_status(response.status())
    }
}

#[async_trait]
impl ProfileRepository for HttpRepository {
    async fn fetch_profile(&self) -> Result<Profile, StorageError> {
        let response = self
            .authorize(self.client().get(self.url("/profile")))
            .send()
            .await
            .map_err(net)?;
        check_status(response.status())?;

        let body: ProfileResponse = response.json().await.map_err(net)?;
        body.into_profile()
    }
}
