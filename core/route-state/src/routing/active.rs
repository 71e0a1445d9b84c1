//! Decides whether a link target is the active route.
//!
//! Links often point at a resource (`posts`) that the router silently expands
//! to its default child (`posts.index`). When the child declares dynamic
//! segments, the link supplies more contexts than `posts` alone could ever
//! consume; the only route that can take them is the leaf, so the check is
//! promoted to the leaf name before the router state is asked.

use std::sync::Arc;

use tracing::debug;

use super::contexts::compute_max_contexts;
use super::{Context, QueryParams, RouterQuery, RouterState};
use crate::error::{Result, RouteError};

/// Stateless resolver over an injected [`RouterQuery`].
#[derive(Clone)]
pub struct ActiveRouteResolver {
    router: Arc<dyn RouterQuery>,
}

impl ActiveRouteResolver {
    pub fn new(router: Arc<dyn RouterQuery>) -> Self {
        Self { router }
    }

    /// Route name that should actually be checked for `route_name` with
    /// `context_count` contexts: the name itself, or the chain's leaf when the
    /// name cannot consume that many contexts.
    pub fn effective_route_name(&self, route_name: &str, context_count: usize) -> Result<String> {
        let chain = self.router.resolve_handler_chain(route_name)?;
        let leaf = chain
            .last()
            .ok_or_else(|| RouteError::RouteNotFound(route_name.to_string()))?;
        let maximum_contexts = compute_max_contexts(route_name, &chain);

        if context_count > maximum_contexts {
            debug!(
                route = %route_name,
                leaf = %leaf.name,
                contexts = context_count,
                maximum_contexts,
                "Promoting active-route check to leaf"
            );
            return Ok(leaf.name.clone());
        }

        Ok(route_name.to_string())
    }

    /// Whether (`route_name`, `contexts`, `query_params`) is active in `router_state`.
    ///
    /// `is_current_when_specified` pins exact matching: ancestors of the
    /// current route no longer count as active. Unknown route names fail with
    /// [`RouteError::RouteNotFound`].
    pub fn is_active_for_route(
        &self,
        contexts: &[Context],
        query_params: &QueryParams,
        route_name: &str,
        router_state: &dyn RouterState,
        is_current_when_specified: bool,
    ) -> Result<bool> {
        let route_name = self.effective_route_name(route_name, contexts.len())?;
        Ok(router_state.is_active_intent(
            &route_name,
            contexts,
            query_params,
            !is_current_when_specified,
        ))
    }
}
