use std::sync::Arc;

use common::ContestStore;
use executor::CodeExecutor;

use crate::anti_cheat::SimilarityScanner;
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::judge::Judge;
use crate::rounds::RoundService;

/// The contest services wired against one store, executor and clock.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn ContestStore>,
    pub rounds: Arc<RoundService>,
    pub judge: Arc<Judge>,
    pub scanner: Arc<SimilarityScanner>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn ContestStore>,
        executor: Arc<dyn CodeExecutor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let rounds = Arc::new(RoundService::new(store.clone(), clock.clone()));
        let judge = Arc::new(Judge::new(
            store.clone(),
            executor,
            rounds.clone(),
            &config,
        ));
        let scanner = Arc::new(SimilarityScanner::new(
            store.clone(),
            clock,
            &config.anti_cheat,
        ));
        Self {
            config,
            store,
            rounds,
            judge,
            scanner,
        }
    }
}
