use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    engine::{Clock, QuizEngine, SystemClock},
    store::QuizStore,
};

#[derive(Clone)]
pub struct AppState {
    pub engine: QuizEngine,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn QuizStore>, config: Config) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), config)
    }

    pub fn with_clock(store: Arc<dyn QuizStore>, clock: Arc<dyn Clock>, config: Config) -> Self {
        Self {
            engine: QuizEngine::new(store, clock),
            config,
        }
    }
}

impl FromRef<AppState> for QuizEngine {
    fn from_ref(state: &AppState) -> Self {
        state.engine.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
