//! Routing facade for link components and other UI code.
//!
//! Lets the view layer navigate, build URLs and ask about activeness without
//! touching router internals. Every collaborator is injected at construction.

use std::sync::Arc;

use tracing::{debug, warn};

use super::active::ActiveRouteResolver;
use super::transition::{route_args, HistoryMethod, TransitionHandle, TransitionRequest};
use super::{Context, Navigator, QueryParams, RouterQuery, RouterState};
use crate::error::Result;

pub struct RoutingService {
    router: Arc<dyn RouterQuery>,
    navigator: Arc<dyn Navigator>,
    resolver: ActiveRouteResolver,
}

impl RoutingService {
    pub fn new(router: Arc<dyn RouterQuery>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            resolver: ActiveRouteResolver::new(Arc::clone(&router)),
            router,
            navigator,
        }
    }

    pub fn available_routes(&self) -> Vec<String> {
        self.router.route_names()
    }

    pub fn has_route(&self, route_name: &str) -> bool {
        self.router.has_route(route_name)
    }

    /// Starts a transition; `replace` swaps the current history entry instead of pushing.
    pub fn transition_to(
        &self,
        route_name: &str,
        models: &[Context],
        query_params: QueryParams,
        replace: bool,
    ) -> Result<TransitionHandle> {
        let method = if replace {
            HistoryMethod::Replace
        } else {
            HistoryMethod::Push
        };
        debug!(route = %route_name, models = models.len(), ?method, "Starting transition");

        let request = TransitionRequest {
            route_name: route_name.to_string(),
            models: models.to_vec(),
            query_params,
            method,
        };
        self.navigator.transition(request).inspect_err(|err| {
            warn!(route = %route_name, error = %err, "Transition was not started");
        })
    }

    pub fn normalize_query_params(
        &self,
        route_name: &str,
        models: &[Context],
        query_params: &mut QueryParams,
    ) {
        self.navigator
            .normalize_query_params(route_name, models, query_params);
    }

    /// URL for the route. The caller's query params are never modified.
    pub fn generate_url(
        &self,
        route_name: &str,
        models: &[Context],
        query_params: &QueryParams,
    ) -> Result<String> {
        let mut visible_query_params = query_params.clone();

        if !self.navigator.is_engine_route(route_name) {
            self.normalize_query_params(route_name, models, &mut visible_query_params);
        }

        let args = route_args(route_name, models, visible_query_params);
        self.navigator.generate(&args)
    }

    pub fn is_active_for_route(
        &self,
        contexts: &[Context],
        query_params: &QueryParams,
        route_name: &str,
        router_state: &dyn RouterState,
        is_current_when_specified: bool,
    ) -> Result<bool> {
        self.resolver.is_active_for_route(
            contexts,
            query_params,
            route_name,
            router_state,
            is_current_when_specified,
        )
    }

    pub fn resolver(&self) -> &ActiveRouteResolver {
        &self.resolver
    }
}
