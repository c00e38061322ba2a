//! Wiring for the analytics, dashboard, forecast and risk services

use crate::analytics::{DashboardService, SpendingAnalyticsService};
use crate::config::Config;
use crate::forecast::ForecastService;
use crate::predict::PredictorClient;
use crate::resilience::{CallStats, ResilientCaller};
use crate::risk::RiskAssessmentService;
use crate::store::SharedStore;

/// The user-facing services sharing one store, predictor and caller
#[derive(Clone)]
pub struct Services {
    pub spending: SpendingAnalyticsService,
    pub dashboard: DashboardService,
    pub forecast: ForecastService,
    pub risk: RiskAssessmentService,
    predictor: PredictorClient,
    caller: ResilientCaller,
}

impl Services {
    pub fn new(store: SharedStore, predictor: PredictorClient, config: &Config) -> Self {
        let store_timeout = config.store.query_timeout();
        let caller = ResilientCaller::new(config.predictor.timeout());

        Self {
            spending: SpendingAnalyticsService::new(store.clone(), store_timeout),
            dashboard: DashboardService::new(store.clone(), store_timeout),
            forecast: ForecastService::new(
                store.clone(),
                predictor.clone(),
                caller.clone(),
                store_timeout,
            ),
            risk: RiskAssessmentService::new(
                store,
                predictor.clone(),
                caller.clone(),
                store_timeout,
            ),
            predictor,
            caller,
        }
    }

    /// Build with an HTTP predictor from `config`
    pub fn from_config(store: SharedStore, config: &Config) -> Self {
        Self::new(store, PredictorClient::from_config(&config.predictor), config)
    }

    pub fn predictor(&self) -> &PredictorClient {
        &self.predictor
    }

    /// Primary/fallback counts across forecast and risk calls
    pub fn call_stats(&self) -> CallStats {
        self.caller.stats()
    }
}
