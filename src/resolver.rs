use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    api::DynRouter,
    config::RoutingConfig,
    entities::{Coordinates, Route},
    error::{timeout_error, Error},
};

/// Marks a routing request as in flight until dropped.
struct LoadingGuard {
    in_flight: Arc<AtomicUsize>,
}

impl LoadingGuard {
    fn acquire(in_flight: &Arc<AtomicUsize>) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);

        Self {
            in_flight: in_flight.clone(),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Resolves a driving route, degrading to a straight-line estimate.
pub struct RouteResolver {
    router: DynRouter,
    timeout: Duration,
    fallback_speed_kmh: f64,
    in_flight: Arc<AtomicUsize>,
}

impl RouteResolver {
    pub fn new(router: DynRouter, config: &RoutingConfig) -> Self {
        Self {
            router,
            timeout: config.timeout,
            fallback_speed_kmh: config.fallback_speed_kmh,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Never fails: routing errors and timeouts produce [`Route::Estimated`].
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, origin: Coordinates, destination: Coordinates) -> Route {
        let _loading = LoadingGuard::acquire(&self.in_flight);

        match self.fetch(origin, destination).await {
            Ok(route) => route,
            Err(err) => {
                tracing::warn!("routing failed ({}), falling back to straight-line estimate", err);
                Route::estimate(&origin, &destination, self.fallback_speed_kmh)
            }
        }
    }

    async fn fetch(&self, origin: Coordinates, destination: Coordinates) -> Result<Route, Error> {
        let request = self.router.driving_route(origin, destination);
        let routed = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| timeout_error())??;

        tracing::info!(
            "routed {} m in {} s over {} points",
            routed.distance,
            routed.duration,
            routed.path.0.len()
        );

        Ok(routed.into())
    }
}
