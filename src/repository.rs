use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::models::poll_models::{NewPoll, Poll};
use crate::store::Store;
use crate::utils::error::{AppError, AppResult};

/// Poll records and their options.
#[derive(Clone)]
pub struct PollRepository {
    store: Arc<dyn Store>,
}

impl PollRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create_poll(
        &self,
        title: &str,
        description: Option<&str>,
        team_name: &str,
        created_by: &str,
        option_texts: &[String],
    ) -> AppResult<Poll> {
        let draft = NewPoll::validate(title, description, team_name, created_by, option_texts)?;
        let poll = draft.into_poll(Utc::now());

        self.store.insert_poll(&poll).await?;

        info!(
            poll_id = %poll.id,
            team = %poll.team_name,
            options = poll.options.len(),
            "poll created"
        );
        Ok(poll)
    }

    pub async fn get_poll(&self, poll_id: &str) -> AppResult<Poll> {
        self.store
            .find_poll(poll_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Poll not found".to_string()))
    }

    pub async fn list_polls_for_team(&self, team_name: &str) -> AppResult<Vec<Poll>> {
        self.store.find_polls_by_team(team_name).await
    }

    /// Deletes the poll with its options and votes. Only the owning team may delete.
    pub async fn delete_poll(&self, poll_id: &str, requesting_team: &str) -> AppResult<Poll> {
        let poll = self.get_poll(poll_id).await?;

        if poll.team_name != requesting_team {
            return Err(AppError::AuthorizationError(
                "Only the owning team can delete this poll".to_string(),
            ));
        }

        if !self.store.delete_poll_cascade(poll_id).await? {
            return Err(AppError::NotFound("Poll not found".to_string()));
        }

        info!(poll_id, team = requesting_team, "poll deleted");
        Ok(poll)
    }

    pub async fn set_active(&self, poll_id: &str, active: bool) -> AppResult<()> {
        if !self.store.set_active(poll_id, active).await? {
            return Err(AppError::NotFound("Poll not found".to_string()));
        }
        Ok(())
    }

    pub async fn set_show_results(&self, poll_id: &str, show: bool) -> AppResult<()> {
        if !self.store.set_show_results(poll_id, show).await? {
            return Err(AppError::NotFound("Poll not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn repository() -> PollRepository {
        PollRepository::new(Arc::new(MemoryStore::new()))
    }

    fn options(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn create_then_get() {
        let repo = repository();
        let poll = repo
            .create_poll("Lunch", Some("Friday"), "Alpha", "m1", &options(&["Pizza", "Sushi"]))
            .await
            .unwrap();

        let fetched = repo.get_poll(&poll.id).await.unwrap();
        assert_eq!(fetched, poll);
        assert_eq!(fetched.description.as_deref(), Some("Friday"));
    }

    #[tokio::test]
    async fn unknown_poll_is_not_found() {
        let repo = repository();
        assert!(matches!(repo.get_poll("missing").await, Err(AppError::NotFound(_))));
        assert!(matches!(
            repo.set_active("missing", false).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_requires_owning_team() {
        let repo = repository();
        let poll = repo
            .create_poll("Lunch", None, "Alpha", "m1", &options(&["Pizza", "Sushi"]))
            .await
            .unwrap();

        let denied = repo.delete_poll(&poll.id, "Beta").await;
        assert!(matches!(denied, Err(AppError::AuthorizationError(_))));
        assert!(repo.get_poll(&poll.id).await.is_ok());

        repo.delete_poll(&poll.id, "Alpha").await.unwrap();
        assert!(matches!(repo.get_poll(&poll.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn toggles_are_idempotent() {
        let repo = repository();
        let poll = repo
            .create_poll("Lunch", None, "Alpha", "m1", &options(&["Pizza", "Sushi"]))
            .await
            .unwrap();

        repo.set_show_results(&poll.id, true).await.unwrap();
        repo.set_show_results(&poll.id, true).await.unwrap();
        repo.set_active(&poll.id, false).await.unwrap();
        repo.set_active(&poll.id, false).await.unwrap();

        let fetched = repo.get_poll(&poll.id).await.unwrap();
        assert!(fetched.show_results);
        assert!(!fetched.is_active);
    }
}
