use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::models::poll_models::Poll;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    Eligible,
    AlreadyVoted,
    PollInactive,
    MissingIdentity,
}

impl Eligibility {
    /// The rejection to surface when a vote is attempted anyway.
    pub fn into_error(self) -> Option<AppError> {
        match self {
            Eligibility::Eligible => None,
            Eligibility::AlreadyVoted => Some(AppError::AlreadyVoted(
                "You have already voted in this poll".to_string(),
            )),
            Eligibility::PollInactive => Some(AppError::PollClosed(
                "Poll is closed. Voting is not allowed".to_string(),
            )),
            Eligibility::MissingIdentity => Some(AppError::MissingIdentity(
                "Team name and member name are required to vote".to_string(),
            )),
        }
    }
}

/// Polls are only visible inside their own team; anonymous viewers see nothing.
pub fn can_view(poll: &Poll, requesting_team: Option<&str>) -> bool {
    requesting_team.is_some_and(|team| team == poll.team_name)
}

/// First failing check wins: identity, then poll state, then the ledger.
pub fn eligibility(poll: &Poll, identity: &Identity, has_voted: bool) -> Eligibility {
    if !identity.is_complete() {
        Eligibility::MissingIdentity
    } else if !poll.is_active {
        Eligibility::PollInactive
    } else if has_voted {
        Eligibility::AlreadyVoted
    } else {
        Eligibility::Eligible
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::poll_models::NewPoll;

    fn poll() -> Poll {
        NewPoll::validate("Q", None, "Alpha", "m1", &["a".to_string(), "b".to_string()])
            .unwrap()
            .into_poll(Utc::now())
    }

    #[test]
    fn view_is_team_scoped() {
        let poll = poll();
        assert!(can_view(&poll, Some("Alpha")));
        assert!(!can_view(&poll, Some("Beta")));
        assert!(!can_view(&poll, None));
    }

    #[test]
    fn identity_is_checked_first() {
        let mut poll = poll();
        poll.is_active = false;
        let anonymous = Identity::new(Some("Alpha"), None);
        assert_eq!(eligibility(&poll, &anonymous, true), Eligibility::MissingIdentity);
    }

    #[test]
    fn inactive_beats_already_voted() {
        let mut poll = poll();
        poll.is_active = false;
        let member = Identity::member("Alpha", "m1");
        assert_eq!(eligibility(&poll, &member, true), Eligibility::PollInactive);
    }

    #[test]
    fn eligible_until_voted() {
        let poll = poll();
        let member = Identity::member("Alpha", "m2");
        assert_eq!(eligibility(&poll, &member, false), Eligibility::Eligible);
        assert_eq!(eligibility(&poll, &member, true), Eligibility::AlreadyVoted);
        assert!(Eligibility::Eligible.into_error().is_none());
        assert!(matches!(
            Eligibility::AlreadyVoted.into_error(),
            Some(AppError::AlreadyVoted(_))
        ));
    }
}
