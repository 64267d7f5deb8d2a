use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::models::{poll_models::Poll, vote_record_models::VoteRecord};
use crate::store::{tally, Store};
use crate::utils::error::{AppError, AppResult};

/// One vote per `(poll, voter)`, and the option counters those votes drive.
#[derive(Clone)]
pub struct VoteLedger {
    store: Arc<dyn Store>,
}

impl VoteLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn has_voted(&self, poll_id: &str, voter_id: &str) -> AppResult<bool> {
        Ok(self.store.find_vote(poll_id, voter_id).await?.is_some())
    }

    pub async fn vote_of(&self, poll_id: &str, voter_id: &str) -> AppResult<Option<VoteRecord>> {
        self.store.find_vote(poll_id, voter_id).await
    }

    /// Every vote this member has cast within the team.
    pub async fn votes_by_member(&self, team_name: &str, voter_id: &str) -> AppResult<Vec<VoteRecord>> {
        self.store.find_votes_by_voter(team_name, voter_id).await
    }

    /// The backend performs the duplicate check, the insert, the increment and
    /// the reveal as one unit; a second call for the same voter gets
    /// `AlreadyVoted`. Returns the vote and the poll as of that vote.
    pub async fn cast_vote(
        &self,
        poll_id: &str,
        option_id: &str,
        voter_id: &str,
        team_name: &str,
    ) -> AppResult<(VoteRecord, Poll)> {
        let vote = VoteRecord::new(poll_id, option_id, voter_id, team_name);

        match self.store.record_vote(&vote).await {
            Ok(poll) => {
                info!(poll_id, option_id, voter = voter_id, "vote recorded");
                Ok((vote, poll))
            }
            Err(AppError::AlreadyVoted(msg)) => {
                debug!(poll_id, voter = voter_id, "duplicate vote rejected");
                Err(AppError::AlreadyVoted(msg))
            }
            Err(e) => Err(e),
        }
    }

    /// Counts derived from the vote records, every option present.
    pub async fn votes_for_poll(&self, poll_id: &str) -> AppResult<HashMap<String, u32>> {
        let poll = self
            .store
            .find_poll(poll_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Poll not found".to_string()))?;
        let votes = self.store.find_votes_by_poll(poll_id).await?;

        Ok(tally(&poll, &votes))
    }
}
