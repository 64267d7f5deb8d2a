use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    error::UNKNOWN_TRANSACTION_COMMIT_RESULT,
    options::{IndexOptions, ReturnDocument},
    Client, ClientSession, Collection, Database, IndexModel,
};
use tracing::{debug, info, warn};

use super::{PollStore, VoteStore};
use crate::models::{poll_models::Poll, vote_record_models::VoteRecord};
use crate::utils::error::{is_duplicate_key, is_transient_transaction, AppError, AppResult};

const POLLS: &str = "polls";
const VOTE_RECORDS: &str = "vote_records";
const MAX_TRANSACTION_ATTEMPTS: u32 = 5;
const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// Failure inside a transaction body. Driver errors keep their labels so a
/// write conflict can be told apart from a rejection.
enum TxnError {
    Rejected(AppError),
    Driver(mongodb::error::Error),
}

impl From<mongodb::error::Error> for TxnError {
    fn from(err: mongodb::error::Error) -> Self {
        TxnError::Driver(err)
    }
}

impl From<AppError> for TxnError {
    fn from(err: AppError) -> Self {
        TxnError::Rejected(err)
    }
}

/// MongoDB backend. Options are embedded in the poll document; votes live
/// in `vote_records` behind a unique `(poll_id, voter_id)` index. Votes and
/// cascading deletes run in multi-document transactions, so the server must
/// be a replica set.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    pub fn new(client: Client, db: Database) -> Self {
        Self { client, db }
    }

    fn polls(&self) -> Collection<Poll> {
        self.db.collection::<Poll>(POLLS)
    }

    fn votes(&self) -> Collection<VoteRecord> {
        self.db.collection::<VoteRecord>(VOTE_RECORDS)
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let one_vote_per_voter = IndexModel::builder()
            .keys(doc! { "poll_id": 1, "voter_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("poll_voter_unique".to_string())
                    .build(),
            )
            .build();
        self.votes().create_index(one_vote_per_voter).await?;

        let by_voter = IndexModel::builder()
            .keys(doc! { "team_name": 1, "voter_id": 1 })
            .build();
        self.votes().create_index(by_voter).await?;

        let by_team = IndexModel::builder()
            .keys(doc! { "team_name": 1, "created_at": -1 })
            .build();
        self.polls().create_index(by_team).await?;

        info!("MongoDB indexes ensured");
        Ok(())
    }

    async fn record_vote_in(
        &self,
        session: &mut ClientSession,
        vote: &VoteRecord,
    ) -> Result<Poll, TxnError> {
        let poll = self
            .polls()
            .find_one(doc! { "_id": &vote.poll_id })
            .session(&mut *session)
            .await?
            .ok_or_else(|| AppError::NotFound("Poll not found".to_string()))?;

        if !poll.is_active {
            return Err(AppError::PollClosed(
                "Poll is closed. Voting is not allowed".to_string(),
            )
            .into());
        }
        if poll.option(&vote.option_id).is_none() {
            return Err(AppError::BadRequest("Invalid option id for this poll".to_string()).into());
        }

        if let Err(e) = self.votes().insert_one(vote).session(&mut *session).await {
            if is_duplicate_key(&e) {
                return Err(AppError::AlreadyVoted(
                    "You have already voted in this poll".to_string(),
                )
                .into());
            }
            return Err(e.into());
        }

        // the increment and the reveal commit together with the vote
        let updated = self
            .polls()
            .find_one_and_update(
                doc! { "_id": &vote.poll_id, "is_active": true, "options.id": &vote.option_id },
                doc! {
                    "$inc": { "options.$.votes": 1 },
                    "$set": { "show_results": true },
                },
            )
            .return_document(ReturnDocument::After)
            .session(&mut *session)
            .await?;

        updated.ok_or_else(|| {
            AppError::PollClosed("Poll was closed while voting".to_string()).into()
        })
    }

    async fn delete_in(&self, session: &mut ClientSession, poll_id: &str) -> Result<bool, TxnError> {
        let deleted = self
            .polls()
            .delete_one(doc! { "_id": poll_id })
            .session(&mut *session)
            .await?;

        if deleted.deleted_count == 0 {
            return Ok(false);
        }

        let votes = self
            .votes()
            .delete_many(doc! { "poll_id": poll_id })
            .session(&mut *session)
            .await?;

        debug!(poll_id, removed_votes = votes.deleted_count, "cascade delete staged");
        Ok(true)
    }
}

/// Commits or aborts one transaction attempt. `None` means the attempt lost a
/// write conflict and the whole body should run again.
async fn settle<T>(
    session: &mut ClientSession,
    outcome: Result<T, TxnError>,
    attempt: u32,
) -> Option<AppResult<T>> {
    let can_retry = attempt < MAX_TRANSACTION_ATTEMPTS;

    match outcome {
        Ok(value) => {
            let mut commits = 1;
            loop {
                match session.commit_transaction().await {
                    Ok(()) => return Some(Ok(value)),
                    Err(e)
                        if e.contains_label(UNKNOWN_TRANSACTION_COMMIT_RESULT)
                            && commits < MAX_COMMIT_ATTEMPTS =>
                    {
                        warn!(error = %e, commits, "commit result unknown, retrying commit");
                        commits += 1;
                    }
                    Err(e) if is_transient_transaction(&e) && can_retry => {
                        warn!(error = %e, attempt, "transaction conflict on commit, retrying");
                        return None;
                    }
                    Err(e) => return Some(Err(e.into())),
                }
            }
        }
        Err(TxnError::Rejected(e)) => {
            abort(session).await;
            Some(Err(e))
        }
        Err(TxnError::Driver(e)) => {
            abort(session).await;
            if is_transient_transaction(&e) && can_retry {
                warn!(error = %e, attempt, "transaction conflict, retrying");
                None
            } else {
                Some(Err(e.into()))
            }
        }
    }
}

async fn abort(session: &mut ClientSession) {
    if let Err(e) = session.abort_transaction().await {
        debug!(error = %e, "abort after failed transaction attempt");
    }
}

fn conflicts_exhausted() -> AppError {
    AppError::DatabaseError("Transaction kept conflicting with concurrent writes".to_string())
}

#[async_trait]
impl PollStore for MongoStore {
    async fn insert_poll(&self, poll: &Poll) -> AppResult<()> {
        self.polls().insert_one(poll).await?;
        Ok(())
    }

    async fn find_poll(&self, poll_id: &str) -> AppResult<Option<Poll>> {
        Ok(self.polls().find_one(doc! { "_id": poll_id }).await?)
    }

    async fn find_polls_by_team(&self, team_name: &str) -> AppResult<Vec<Poll>> {
        let cursor = self
            .polls()
            .find(doc! { "team_name": team_name })
            .sort(doc! { "created_at": -1 })
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn delete_poll_cascade(&self, poll_id: &str) -> AppResult<bool> {
        let mut session = self.client.start_session().await?;

        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            session.start_transaction().await?;
            let outcome = self.delete_in(&mut session, poll_id).await;
            if let Some(result) = settle(&mut session, outcome, attempt).await {
                return result;
            }
        }
        Err(conflicts_exhausted())
    }

    async fn set_active(&self, poll_id: &str, active: bool) -> AppResult<bool> {
        let result = self
            .polls()
            .update_one(doc! { "_id": poll_id }, doc! { "$set": { "is_active": active } })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn set_show_results(&self, poll_id: &str, show: bool) -> AppResult<bool> {
        let result = self
            .polls()
            .update_one(doc! { "_id": poll_id }, doc! { "$set": { "show_results": show } })
            .await?;
        Ok(result.matched_count > 0)
    }
}

#[async_trait]
impl VoteStore for MongoStore {
    async fn record_vote(&self, vote: &VoteRecord) -> AppResult<Poll> {
        let mut session = self.client.start_session().await?;

        // a retried duplicate lands on the unique index and becomes AlreadyVoted
        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            session.start_transaction().await?;
            let outcome = self.record_vote_in(&mut session, vote).await;
            if let Some(result) = settle(&mut session, outcome, attempt).await {
                return result;
            }
        }
        Err(conflicts_exhausted())
    }

    async fn find_vote(&self, poll_id: &str, voter_id: &str) -> AppResult<Option<VoteRecord>> {
        Ok(self
            .votes()
            .find_one(doc! { "poll_id": poll_id, "voter_id": voter_id })
            .await?)
    }

    async fn find_votes_by_poll(&self, poll_id: &str) -> AppResult<Vec<VoteRecord>> {
        let cursor = self
            .votes()
            .find(doc! { "poll_id": poll_id })
            .sort(doc! { "created_at": 1 })
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn find_votes_by_voter(
        &self,
        team_name: &str,
        voter_id: &str,
    ) -> AppResult<Vec<VoteRecord>> {
        let cursor = self
            .votes()
            .find(doc! { "team_name": team_name, "voter_id": voter_id })
            .await?;

        Ok(cursor.try_collect().await?)
    }
}
