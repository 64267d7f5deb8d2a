use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VoteRecord {
    #[serde(rename = "_id")]
    pub id: String,

    pub poll_id: String,

    pub option_id: String,

    pub voter_id: String,

    pub team_name: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl VoteRecord {
    pub fn new(poll_id: &str, option_id: &str, voter_id: &str, team_name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            poll_id: poll_id.to_string(),
            option_id: option_id.to_string(),
            voter_id: voter_id.to_string(),
            team_name: team_name.to_string(),
            created_at: Utc::now(),
        }
    }
}
