//! Voting engine: visibility, eligibility, vote submission and result reveal.
//!
//! Every operation takes the caller's [`Identity`] explicitly. Mutations
//! publish a [`PollEvent`] so subscribers can re-fetch; reads are idempotent
//! and safe to repeat at any time.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::identity::Identity;
use crate::ledger::VoteLedger;
use crate::models::{poll_models::Poll, vote_record_models::VoteRecord};
use crate::repository::PollRepository;
use crate::store::Store;
use crate::utils::error::{AppError, AppResult};

pub mod eligibility;
pub mod events;
pub mod results;
pub mod view;

pub use eligibility::{can_view, eligibility, Eligibility};
pub use events::{PollEvent, PollEventKind};
pub use results::{percentage, results_visible, winning_option};
pub use view::{OptionView, PollFilter, PollView, ViewMode};

const EVENT_CAPACITY: usize = 256;

pub struct VotingEngine {
    repository: PollRepository,
    ledger: VoteLedger,
    events: broadcast::Sender<PollEvent>,
}

impl VotingEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            repository: PollRepository::new(Arc::clone(&store)),
            ledger: VoteLedger::new(store),
            events,
        }
    }

    pub fn repository(&self) -> &PollRepository {
        &self.repository
    }

    pub fn ledger(&self) -> &VoteLedger {
        &self.ledger
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PollEvent> {
        self.events.subscribe()
    }

    fn publish(&self, poll: &Poll, kind: PollEventKind) {
        // no subscribers is fine
        let _ = self.events.send(PollEvent::new(&poll.id, &poll.team_name, kind));
    }

    /// Fetches a poll the caller's team may see. Polls of other teams are
    /// reported as missing rather than forbidden.
    async fn visible_poll(&self, poll_id: &str, identity: &Identity) -> AppResult<Poll> {
        let team = identity.require_team()?;
        let poll = self.repository.get_poll(poll_id).await?;
        if !can_view(&poll, Some(team)) {
            debug!(poll_id, team, "poll hidden from foreign team");
            return Err(AppError::NotFound("Poll not found".to_string()));
        }
        Ok(poll)
    }

    fn require_owner(poll: &Poll, identity: &Identity, action: &str) -> AppResult<()> {
        let team = identity.require_team()?;
        if poll.team_name != team {
            return Err(AppError::AuthorizationError(format!(
                "Only the owning team can {} this poll",
                action
            )));
        }
        Ok(())
    }

    async fn vote_of(&self, poll: &Poll, identity: &Identity) -> AppResult<Option<VoteRecord>> {
        match identity.member_name() {
            Some(member) => self.ledger.vote_of(&poll.id, member).await,
            None => Ok(None),
        }
    }

    fn view_for(poll: &Poll, identity: &Identity, vote: Option<VoteRecord>) -> PollView {
        let eligibility = eligibility(poll, identity, vote.is_some());
        PollView::build(poll, eligibility, vote.map(|v| v.option_id))
    }

    pub async fn create_poll(
        &self,
        identity: &Identity,
        title: &str,
        description: Option<&str>,
        option_texts: &[String],
    ) -> AppResult<PollView> {
        let (team, member) = identity.require_member()?;
        let poll = self
            .repository
            .create_poll(title, description, team, member, option_texts)
            .await?;

        self.publish(&poll, PollEventKind::Created);
        Ok(Self::view_for(&poll, identity, None))
    }

    pub async fn can_vote(&self, poll: &Poll, identity: &Identity) -> AppResult<Eligibility> {
        let has_voted = match identity.member_name() {
            Some(member) => self.ledger.has_voted(&poll.id, member).await?,
            None => false,
        };
        Ok(eligibility(poll, identity, has_voted))
    }

    pub async fn poll_view(&self, poll_id: &str, identity: &Identity) -> AppResult<PollView> {
        let poll = self.visible_poll(poll_id, identity).await?;
        let vote = self.vote_of(&poll, identity).await?;
        Ok(Self::view_for(&poll, identity, vote))
    }

    /// The caller's team polls, newest first, narrowed by `filter`.
    pub async fn list_polls(&self, identity: &Identity, filter: &PollFilter) -> AppResult<Vec<PollView>> {
        let team = identity.require_team()?;
        let polls = self.repository.list_polls_for_team(team).await?;

        let votes: HashMap<String, VoteRecord> = match identity.member_name() {
            Some(member) => self
                .ledger
                .votes_by_member(team, member)
                .await?
                .into_iter()
                .map(|vote| (vote.poll_id.clone(), vote))
                .collect(),
            None => HashMap::new(),
        };

        let voted: HashSet<&str> = votes.keys().map(String::as_str).collect();
        let selected: Vec<&Poll> = polls
            .iter()
            .filter(|poll| match filter.view {
                ViewMode::All => true,
                ViewMode::Mine => identity.member_name() == Some(poll.created_by.as_str()),
                ViewMode::Voted => voted.contains(poll.id.as_str()),
            })
            .filter(|poll| filter.matches_search(poll))
            .collect();

        Ok(selected
            .into_iter()
            .map(|poll| Self::view_for(poll, identity, votes.get(&poll.id).cloned()))
            .collect())
    }

    /// Records the caller's vote; the same write reveals results to the whole team.
    pub async fn submit_vote(
        &self,
        poll_id: &str,
        option_id: &str,
        identity: &Identity,
    ) -> AppResult<PollView> {
        let poll = self.visible_poll(poll_id, identity).await?;

        if let Some(rejection) = self.can_vote(&poll, identity).await?.into_error() {
            return Err(rejection);
        }
        if poll.option(option_id).is_none() {
            return Err(AppError::BadRequest("Invalid option id for this poll".to_string()));
        }

        let (team, member) = identity.require_member()?;
        let (vote, updated) = self.ledger.cast_vote(&poll.id, option_id, member, team).await?;
        if !poll.show_results {
            info!(poll_id, "results revealed by first vote");
        }

        self.publish(&updated, PollEventKind::Voted);
        Ok(Self::view_for(&updated, identity, Some(vote)))
    }

    pub async fn reveal_results(&self, poll_id: &str, identity: &Identity) -> AppResult<PollView> {
        let poll = self.repository.get_poll(poll_id).await?;
        Self::require_owner(&poll, identity, "reveal results of")?;

        self.repository.set_show_results(&poll.id, true).await?;
        info!(poll_id, "results revealed");

        let updated = self.repository.get_poll(&poll.id).await?;
        self.publish(&updated, PollEventKind::ResultsRevealed);
        let vote = self.vote_of(&updated, identity).await?;
        Ok(Self::view_for(&updated, identity, vote))
    }

    /// Stops voting. There is no reopen path here.
    pub async fn close_poll(&self, poll_id: &str, identity: &Identity) -> AppResult<PollView> {
        let poll = self.repository.get_poll(poll_id).await?;
        Self::require_owner(&poll, identity, "close")?;

        self.repository.set_active(&poll.id, false).await?;
        info!(poll_id, "poll closed");

        let updated = self.repository.get_poll(&poll.id).await?;
        self.publish(&updated, PollEventKind::Closed);
        let vote = self.vote_of(&updated, identity).await?;
        Ok(Self::view_for(&updated, identity, vote))
    }

    pub async fn delete_poll(&self, poll_id: &str, identity: &Identity) -> AppResult<()> {
        let team = identity.require_team()?;
        let deleted = self.repository.delete_poll(poll_id, team).await?;
        self.publish(&deleted, PollEventKind::Deleted);
        Ok(())
    }

    pub async fn own_vote(&self, poll_id: &str, identity: &Identity) -> AppResult<Option<VoteRecord>> {
        let poll = self.visible_poll(poll_id, identity).await?;
        self.vote_of(&poll, identity).await
    }

    /// Ledger-derived counts, once results are visible to the caller.
    pub async fn results(&self, poll_id: &str, identity: &Identity) -> AppResult<HashMap<String, u32>> {
        let poll = self.visible_poll(poll_id, identity).await?;
        let vote = self.vote_of(&poll, identity).await?;

        if !results_visible(&poll, vote.is_some()) {
            return Err(AppError::AuthorizationError(
                "Results are hidden until you vote or they are revealed".to_string(),
            ));
        }

        self.ledger.votes_for_poll(&poll.id).await
    }
}
