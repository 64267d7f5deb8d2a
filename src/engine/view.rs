use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::eligibility::Eligibility;
use super::results::{percentage, results_visible, winning_option};
use crate::models::poll_models::Poll;

/// What the presentation layer renders for one poll and one viewer.
/// Tallies are `None` while results are hidden from this viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub team_name: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub show_results: bool,
    pub results_visible: bool,
    pub eligibility: Eligibility,
    pub voted_option_id: Option<String>,
    pub total_votes: Option<u32>,
    pub winning_option_id: Option<String>,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionView {
    pub id: String,
    pub text: String,
    pub votes: Option<u32>,
    pub percentage: Option<f64>,
    pub is_winning: bool,
}

impl PollView {
    pub fn build(poll: &Poll, eligibility: Eligibility, voted_option_id: Option<String>) -> Self {
        let visible = results_visible(poll, voted_option_id.is_some());
        let total = poll.total_votes();
        let winner = if visible {
            winning_option(poll).map(|option| option.id.clone())
        } else {
            None
        };

        let options = poll
            .options
            .iter()
            .map(|option| OptionView {
                id: option.id.clone(),
                text: option.text.clone(),
                votes: visible.then_some(option.votes),
                percentage: visible.then(|| percentage(option.votes, total)),
                is_winning: winner.as_deref() == Some(option.id.as_str()),
            })
            .collect();

        Self {
            id: poll.id.clone(),
            title: poll.title.clone(),
            description: poll.description.clone(),
            team_name: poll.team_name.clone(),
            created_by: poll.created_by.clone(),
            created_at: poll.created_at,
            is_active: poll.is_active,
            show_results: poll.show_results,
            results_visible: visible,
            eligibility,
            voted_option_id,
            total_votes: visible.then_some(total),
            winning_option_id: winner,
            options,
        }
    }
}

/// Parsed case-insensitively from the `view` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    All,
    /// Created by the current member.
    Mine,
    /// Voted on by the current member.
    Voted,
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ViewMode::All),
            "mine" | "my" => Ok(ViewMode::Mine),
            "voted" => Ok(ViewMode::Voted),
            _ => Err(format!("Unknown view mode: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for ViewMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PollFilter {
    #[serde(default)]
    pub view: ViewMode,
    pub search: Option<String>,
}

impl PollFilter {
    /// Case-insensitive match on title or description; an empty term matches everything.
    pub fn matches_search(&self, poll: &Poll) -> bool {
        let term = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => term.to_lowercase(),
            _ => return true,
        };

        poll.title.to_lowercase().contains(&term)
            || poll
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term))
    }
}
