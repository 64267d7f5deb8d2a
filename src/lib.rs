//! Team-scoped polling: members of a named team create polls, cast one
//! vote per poll and watch the tallies.
//!
//! [`engine::VotingEngine`] holds the rules. It sits on a
//! [`repository::PollRepository`] and a [`ledger::VoteLedger`], both backed
//! by a [`store::Store`] (in-memory or MongoDB). [`routes::app`] exposes the
//! engine over HTTP.

pub mod config;
pub mod controllers;
pub mod db;
pub mod engine;
pub mod identity;
pub mod ledger;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;
