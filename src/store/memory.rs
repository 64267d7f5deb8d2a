use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::{PollStore, VoteStore};
use crate::models::{poll_models::Poll, vote_record_models::VoteRecord};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Default)]
struct Tables {
    polls: HashMap<String, Poll>,
    /// Keyed by `(poll_id, voter_id)`; the key is the one-vote guard.
    votes: HashMap<(String, String), VoteRecord>,
}

/// Process-local backend. Every mutation happens under a single write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| AppError::InternalError("Poll store lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| AppError::InternalError("Poll store lock poisoned".to_string()))
    }
}

#[async_trait]
impl PollStore for MemoryStore {
    async fn insert_poll(&self, poll: &Poll) -> AppResult<()> {
        let mut tables = self.write()?;
        if tables.polls.contains_key(&poll.id) {
            return Err(AppError::InternalError(format!(
                "Poll id {} already exists",
                poll.id
            )));
        }
        tables.polls.insert(poll.id.clone(), poll.clone());
        Ok(())
    }

    async fn find_poll(&self, poll_id: &str) -> AppResult<Option<Poll>> {
        Ok(self.read()?.polls.get(poll_id).cloned())
    }

    async fn find_polls_by_team(&self, team_name: &str) -> AppResult<Vec<Poll>> {
        let mut polls: Vec<Poll> = self
            .read()?
            .polls
            .values()
            .filter(|poll| poll.team_name == team_name)
            .cloned()
            .collect();
        polls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(polls)
    }

    async fn delete_poll_cascade(&self, poll_id: &str) -> AppResult<bool> {
        let mut tables = self.write()?;
        if tables.polls.remove(poll_id).is_none() {
            return Ok(false);
        }
        tables.votes.retain(|(vote_poll, _), _| vote_poll != poll_id);
        Ok(true)
    }

    async fn set_active(&self, poll_id: &str, active: bool) -> AppResult<bool> {
        let mut tables = self.write()?;
        Ok(match tables.polls.get_mut(poll_id) {
            Some(poll) => {
                poll.is_active = active;
                true
            }
            None => false,
        })
    }

    async fn set_show_results(&self, poll_id: &str, show: bool) -> AppResult<bool> {
        let mut tables = self.write()?;
        Ok(match tables.polls.get_mut(poll_id) {
            Some(poll) => {
                poll.show_results = show;
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl VoteStore for MemoryStore {
    async fn record_vote(&self, vote: &VoteRecord) -> AppResult<Poll> {
        let mut tables = self.write()?;
        let key = (vote.poll_id.clone(), vote.voter_id.clone());

        if tables.votes.contains_key(&key) {
            return Err(AppError::AlreadyVoted(
                "You have already voted in this poll".to_string(),
            ));
        }

        let poll = tables
            .polls
            .get_mut(&vote.poll_id)
            .ok_or_else(|| AppError::NotFound("Poll not found".to_string()))?;

        if !poll.is_active {
            return Err(AppError::PollClosed(
                "Poll is closed. Voting is not allowed".to_string(),
            ));
        }

        let option = poll
            .options
            .iter_mut()
            .find(|option| option.id == vote.option_id)
            .ok_or_else(|| AppError::BadRequest("Invalid option id for this poll".to_string()))?;

        option.votes += 1;
        poll.show_results = true;
        let updated = poll.clone();

        tables.votes.insert(key, vote.clone());
        Ok(updated)
    }

    async fn find_vote(&self, poll_id: &str, voter_id: &str) -> AppResult<Option<VoteRecord>> {
        let key = (poll_id.to_string(), voter_id.to_string());
        Ok(self.read()?.votes.get(&key).cloned())
    }

    async fn find_votes_by_poll(&self, poll_id: &str) -> AppResult<Vec<VoteRecord>> {
        let mut votes: Vec<VoteRecord> = self
            .read()?
            .votes
            .values()
            .filter(|vote| vote.poll_id == poll_id)
            .cloned()
            .collect();
        votes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(votes)
    }

    async fn find_votes_by_voter(
        &self,
        team_name: &str,
        voter_id: &str,
    ) -> AppResult<Vec<VoteRecord>> {
        Ok(self
            .read()?
            .votes
            .values()
            .filter(|vote| vote.team_name == team_name && vote.voter_id == voter_id)
            .cloned()
            .collect())
    }
}
