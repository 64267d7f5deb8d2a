use serde::{Deserialize, Serialize};

/// Change notification published after every successful mutation.
/// Subscribers re-fetch the poll; the event carries no state of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollEvent {
    pub poll_id: String,
    pub team_name: String,
    pub kind: PollEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollEventKind {
    Created,
    Voted,
    ResultsRevealed,
    Closed,
    Deleted,
}

impl PollEvent {
    pub fn new(poll_id: &str, team_name: &str, kind: PollEventKind) -> Self {
        Self {
            poll_id: poll_id.to_string(),
            team_name: team_name.to_string(),
            kind,
        }
    }
}
