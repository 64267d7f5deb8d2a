use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Poll {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub team_name: String,
    pub created_by: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub show_results: bool,
    pub options: Vec<PollOption>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PollOption {
    pub id: String,
    pub text: String,
    pub votes: u32,
}

impl Poll {
    pub fn option(&self, option_id: &str) -> Option<&PollOption> {
        self.options.iter().find(|option| option.id == option_id)
    }

    pub fn total_votes(&self) -> u32 {
        self.options.iter().map(|option| option.votes).sum()
    }
}

/// Validated input for a new poll. Ids and timestamps are assigned by [`NewPoll::into_poll`].
#[derive(Debug, Clone)]
pub struct NewPoll {
    pub title: String,
    pub description: Option<String>,
    pub team_name: String,
    pub created_by: String,
    pub options: Vec<String>,
}

impl NewPoll {
    pub fn validate(
        title: &str,
        description: Option<&str>,
        team_name: &str,
        created_by: &str,
        option_texts: &[String],
    ) -> AppResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::ValidationError("Poll title must not be empty".to_string()));
        }

        // blank rows from the form are ignored
        let options: Vec<String> = option_texts
            .iter()
            .map(|text| text.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .collect();

        if options.len() < 2 {
            return Err(AppError::ValidationError(
                "Enter at least 2 options to choose from".to_string(),
            ));
        }

        let mut deduped_options: Vec<&String> = Vec::with_capacity(options.len());
        for option in &options {
            if !deduped_options.contains(&option) {
                deduped_options.push(option);
            }
        }

        if deduped_options.len() != options.len() {
            return Err(AppError::ValidationError("Poll options must be unique".to_string()));
        }

        Ok(Self {
            title: title.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            team_name: team_name.to_string(),
            created_by: created_by.to_string(),
            options,
        })
    }

    pub fn into_poll(self, now: DateTime<Utc>) -> Poll {
        Poll {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            description: self.description,
            team_name: self.team_name,
            created_by: self.created_by,
            created_at: now,
            is_active: true,
            show_results: false,
            options: self
                .options
                .into_iter()
                .map(|text| PollOption {
                    id: Uuid::new_v4().to_string(),
                    text,
                    votes: 0,
                })
                .collect(),
        }
    }
}
