use crate::{
    abstract_trait::payment::DynPaymentGateway,
    config::myconfig::Config,
    di::{DependenciesInject, Repositories},
    gateway::VnPayGateway,
};
use chrono::Duration;
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::DynJwtService,
    config::{ConnectionPool, JwtConfig},
    utils::{SystemMetrics, run_metrics_collector},
};
use std::{fmt, sync::Arc};

#[derive(Clone)]
pub struct AppState {
    pub di_container: DependenciesInject,
    pub jwt_config: DynJwtService,
    pub registry: Arc<Registry>,
    pub system_metrics: Arc<SystemMetrics>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("deps", &self.di_container)
            .field("registry", &self.registry)
            .field("system_metrics", &self.system_metrics)
            .finish()
    }
}

impl AppState {
    pub fn new(pool: ConnectionPool, config: &Config) -> Self {
        let state = Self::with_repositories(
            Repositories::postgres(pool),
            Arc::new(VnPayGateway::new(config.gateway.clone())),
            Arc::new(JwtConfig::new(&config.jwt_secret)),
            Duration::seconds(config.idempotency_window_secs),
        );

        tokio::spawn(run_metrics_collector(state.system_metrics.clone()));

        state
    }

    /// Wires the services onto the given storage; no background tasks are started.
    pub fn with_repositories(
        repos: Repositories,
        gateway: DynPaymentGateway,
        jwt_config: DynJwtService,
        idempotency_window: Duration,
    ) -> Self {
        let mut registry = Registry::default();
        let system_metrics = Arc::new(SystemMetrics::new());

        let di_container =
            DependenciesInject::new(repos, gateway, idempotency_window, &mut registry);

        system_metrics.register(&mut registry);

        Self {
            di_container,
            jwt_config,
            registry: Arc::new(registry),
            system_metrics,
        }
    }
}
