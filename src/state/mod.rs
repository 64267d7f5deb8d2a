use std::sync::Arc;

use crate::engine::VotingEngine;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<VotingEngine>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            engine: Arc::new(VotingEngine::new(store)),
        }
    }
}
