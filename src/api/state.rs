use std::sync::Arc;

use crate::application::RecommendationService;
use crate::infrastructure::{AppConfig, ServiceContext};

#[derive(Clone)]
pub struct AppState {
    pub recommendation: Arc<RecommendationService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(recommendation: Arc<RecommendationService>, config: Arc<AppConfig>) -> Self {
        Self {
            recommendation,
            config,
        }
    }

    pub fn from_context(context: &ServiceContext) -> Self {
        Self::new(
            Arc::new(context.recommendation_service()),
            context.config.clone(),
        )
    }
}
