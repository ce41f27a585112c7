use std::sync::Arc;

use crate::scoring::ProfileScorer;

/// Shared handler state. Cloned per request; the scorer itself is never copied.
#[derive(Clone, Debug)]
pub struct AppState {
    pub scorer: Arc<ProfileScorer>,
}

impl AppState {
    pub fn new(scorer: ProfileScorer) -> Self {
        Self {
            scorer: Arc::new(scorer),
        }
    }
}
