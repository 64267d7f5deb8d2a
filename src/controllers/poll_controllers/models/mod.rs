use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
pub struct CreatePollRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub options: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct CastVoteRequest {
    pub option_id: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct VoteStatusResponse {
    pub has_voted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ResultsResponse {
    pub poll_id: String,
    pub total_votes: u32,
    pub counts: HashMap<String, u32>,
}
