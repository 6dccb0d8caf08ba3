//! Shared service wiring

use crate::config::AppConfig;
use chrono::Utc;
use conftrack_analytics::Aggregator;
use conftrack_core::{
    AccountLinker, DocumentSink, IdentityResolver, Mailer, RegistrationIntake, ReviewWorkflow,
};
use conftrack_store::Store;
use std::sync::Arc;

/// Everything the route handlers share. Cheap to clone.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn Store>,
    pub intake: Arc<RegistrationIntake>,
    pub resolver: Arc<IdentityResolver>,
    pub reviews: Arc<ReviewWorkflow>,
    pub linker: Arc<AccountLinker>,
    pub aggregator: Arc<Aggregator>,
}

impl AppContext {
    /// Wire every service over the given collaborators.
    #[must_use]
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn Store>,
        sink: Arc<dyn DocumentSink>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let window = config.dedup.window(Utc::now());
        let intake = RegistrationIntake::new(Arc::clone(&store), sink, Arc::clone(&mailer), window);

        Self {
            intake: Arc::new(intake),
            resolver: Arc::new(IdentityResolver::new(Arc::clone(&store))),
            reviews: Arc::new(ReviewWorkflow::new(
                Arc::clone(&store),
                mailer,
                config.review_config(),
            )),
            linker: Arc::new(AccountLinker::new(Arc::clone(&store))),
            aggregator: Arc::new(Aggregator::new(Arc::clone(&store), config.analytics_config())),
            store,
        }
    }
}
