use std::sync::Arc;

use tasklane_db::models::{Activity, NewActivity};
use tasklane_db::repositories::ActivityStore;
use tracing::info;

use super::{parse_id, require_text};
use crate::error::ApiError;
use crate::utils::non_empty;

const ENTITY: &str = "Activity";

pub struct ActivityService {
    store: Arc<dyn ActivityStore>,
}

impl ActivityService {
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Activity>, ApiError> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, raw_id: &str) -> Result<Activity, ApiError> {
        let id = parse_id(ENTITY, raw_id)?;
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(ENTITY, raw_id))
    }

    pub async fn create(
        &self,
        title: Option<String>,
        email: Option<String>,
    ) -> Result<Activity, ApiError> {
        let title = require_text("title", title)?;
        let activity = self
            .store
            .create(&NewActivity {
                title,
                email: non_empty(email),
            })
            .await?;

        info!("Activity {} created", activity.id);
        Ok(activity)
    }

    /// `title` is mandatory; `email` only replaces the stored value when
    /// non-empty.
    pub async fn update(
        &self,
        raw_id: &str,
        title: Option<String>,
        email: Option<String>,
    ) -> Result<Activity, ApiError> {
        let title = require_text("title", title)?;
        let mut activity = self.get(raw_id).await?;

        activity.title = title;
        if let Some(email) = non_empty(email) {
            activity.email = Some(email);
        }

        self.store
            .update(&activity)
            .await?
            .ok_or_else(|| ApiError::not_found(ENTITY, raw_id))
    }

    pub async fn delete(&self, raw_id: &str) -> Result<(), ApiError> {
        let id = parse_id(ENTITY, raw_id)?;
        match self.store.delete_cascade(id).await? {
            Some(cascaded) => {
                info!("Activity {} deleted, {} todos cascaded", id, cascaded);
                Ok(())
            }
            None => Err(ApiError::not_found(ENTITY, raw_id)),
        }
    }
}
