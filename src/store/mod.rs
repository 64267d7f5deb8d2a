//! Persistence seams for polls and votes.
//!
//! [`PollStore`] owns poll records with their embedded options;
//! [`VoteStore`] owns vote records and the option counters they drive.
//! A backend implements both so that a cascading delete and a vote can each
//! run as one atomic unit.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::models::{poll_models::Poll, vote_record_models::VoteRecord};
use crate::utils::error::AppResult;

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[async_trait]
pub trait PollStore: Send + Sync {
    async fn insert_poll(&self, poll: &Poll) -> AppResult<()>;

    async fn find_poll(&self, poll_id: &str) -> AppResult<Option<Poll>>;

    /// Newest first.
    async fn find_polls_by_team(&self, team_name: &str) -> AppResult<Vec<Poll>>;

    /// Removes the poll and every vote recorded against it.
    /// Returns `false` when no such poll existed.
    async fn delete_poll_cascade(&self, poll_id: &str) -> AppResult<bool>;

    /// Returns `false` when no such poll existed.
    async fn set_active(&self, poll_id: &str, active: bool) -> AppResult<bool>;

    /// Returns `false` when no such poll existed.
    async fn set_show_results(&self, poll_id: &str, show: bool) -> AppResult<bool>;
}

#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Records the vote, increments its option and marks results visible as
    /// one unit, returning the poll as it stands after the vote.
    ///
    /// Fails with `AlreadyVoted` if `(poll_id, voter_id)` is taken, `NotFound`
    /// for an unknown poll, `PollClosed` for an inactive one and `BadRequest`
    /// for an option outside the poll.
    async fn record_vote(&self, vote: &VoteRecord) -> AppResult<Poll>;

    async fn find_vote(&self, poll_id: &str, voter_id: &str) -> AppResult<Option<VoteRecord>>;

    async fn find_votes_by_poll(&self, poll_id: &str) -> AppResult<Vec<VoteRecord>>;

    async fn find_votes_by_voter(
        &self,
        team_name: &str,
        voter_id: &str,
    ) -> AppResult<Vec<VoteRecord>>;
}

pub trait Store: PollStore + VoteStore {}

impl<T: PollStore + VoteStore> Store for T {}

/// Counts per option id, with every option of the poll present.
pub fn tally(poll: &Poll, votes: &[VoteRecord]) -> HashMap<String, u32> {
    let mut counts: HashMap<String, u32> = poll
        .options
        .iter()
        .map(|option| (option.id.clone(), 0))
        .collect();

    for vote in votes.iter().filter(|vote| vote.poll_id == poll.id) {
        if let Some(count) = counts.get_mut(&vote.option_id) {
            *count += 1;
        }
    }

    counts
}
