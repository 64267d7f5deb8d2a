//! Who is acting: a free-text team name and member name.
//!
//! Names are not verified. A blank name counts as absent.

use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub team_name: Option<String>,
    pub member_name: Option<String>,
}

impl Identity {
    pub fn new(team_name: Option<&str>, member_name: Option<&str>) -> Self {
        Self {
            team_name: normalize(team_name),
            member_name: normalize(member_name),
        }
    }

    pub fn member(team_name: &str, member_name: &str) -> Self {
        Self::new(Some(team_name), Some(member_name))
    }

    pub fn team(&self) -> Option<&str> {
        self.team_name.as_deref()
    }

    pub fn member_name(&self) -> Option<&str> {
        self.member_name.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.team_name.is_some() && self.member_name.is_some()
    }

    pub fn require_team(&self) -> AppResult<&str> {
        self.team()
            .ok_or_else(|| AppError::MissingIdentity("Join a team first".to_string()))
    }

    /// Both names, as required to create polls and vote.
    pub fn require_member(&self) -> AppResult<(&str, &str)> {
        match (self.team(), self.member_name()) {
            (Some(team), Some(member)) => Ok((team, member)),
            _ => Err(AppError::MissingIdentity(
                "Team name and member name are required".to_string(),
            )),
        }
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
