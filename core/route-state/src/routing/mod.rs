//! Active-route resolution and the routing facade built around it.
//!
//! The router itself is never reached through global state. Every piece of it
//! this module needs is a trait handed in by the caller:
//!
//! - [`RouterQuery`]: route name → ordered handler chain (the recognizer)
//! - [`RouterState`]: the router's current state, answering "is this intent active?"
//! - [`Navigator`]: the transition engine and URL generator
//!
//! [`ActiveRouteResolver`] is a pure function of its inputs plus a
//! `RouterQuery`. [`RoutingService`] bundles the three collaborators behind
//! the API that link components consume.

mod active;
mod contexts;
mod service;
mod transition;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

pub use active::ActiveRouteResolver;
pub use contexts::compute_max_contexts;
pub use service::RoutingService;
pub use transition::{route_args, HistoryMethod, RouteArgs, TransitionHandle, TransitionRequest};

/// A model supplied for a dynamic segment. Opaque to this crate.
pub type Context = Value;

/// Query parameter name → value.
pub type QueryParams = BTreeMap<String, Value>;

/// One entry of a resolved handler chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerInfo {
    pub name: String,
    /// Dynamic segments this handler consumes, one context each.
    #[serde(default)]
    pub dynamic_segment_names: Vec<String>,
}

impl HandlerInfo {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        dynamic_segment_names: impl IntoIterator<Item = S>,
    ) -> Self {
        HandlerInfo {
            name: name.into(),
            dynamic_segment_names: dynamic_segment_names.into_iter().map(Into::into).collect(),
        }
    }

    /// A handler with no dynamic segments.
    pub fn static_route(name: impl Into<String>) -> Self {
        HandlerInfo {
            name: name.into(),
            dynamic_segment_names: Vec::new(),
        }
    }

    pub fn segment_count(&self) -> usize {
        self.dynamic_segment_names.len()
    }
}

/// The route recognizer.
pub trait RouterQuery: Send + Sync {
    /// Handler chain from root to leaf for `route_name`.
    ///
    /// Must fail with [`RouteError::RouteNotFound`](crate::RouteError::RouteNotFound)
    /// for unknown names and must never return an empty chain.
    fn resolve_handler_chain(&self, route_name: &str) -> Result<Vec<HandlerInfo>>;

    /// Every recognizable route name.
    fn route_names(&self) -> Vec<String>;

    fn has_route(&self, route_name: &str) -> bool {
        self.resolve_handler_chain(route_name).is_ok()
    }
}

/// The router's current state.
pub trait RouterState {
    /// Whether `route_name` with `contexts` and `query_params` matches the
    /// current state. With `allow_ancestor_match` false only the current leaf
    /// route can match.
    fn is_active_intent(
        &self,
        route_name: &str,
        contexts: &[Context],
        query_params: &QueryParams,
        allow_ancestor_match: bool,
    ) -> bool;
}

/// The transition engine and URL generator.
pub trait Navigator: Send + Sync {
    /// Starts a transition. Retries, aborts and redirects are the engine's business.
    fn transition(&self, request: TransitionRequest) -> Result<TransitionHandle>;

    /// Fills in defaults and drops params the target route does not declare.
    fn normalize_query_params(
        &self,
        route_name: &str,
        models: &[Context],
        query_params: &mut QueryParams,
    );

    fn generate(&self, args: &RouteArgs) -> Result<String>;

    /// Engine routes own their query params; they are passed through untouched.
    fn is_engine_route(&self, _route_name: &str) -> bool {
        false
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils {
    use super::*;
    use crate::error::RouteError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Router query backed by a fixed table of chains.
    #[derive(Default)]
    pub struct StaticChains {
        chains: HashMap<String, Vec<HandlerInfo>>,
    }

    impl StaticChains {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_chain(mut self, route_name: &str, chain: Vec<HandlerInfo>) -> Self {
            self.chains.insert(route_name.to_string(), chain);
            self
        }
    }

    impl RouterQuery for StaticChains {
        fn resolve_handler_chain(&self, route_name: &str) -> Result<Vec<HandlerInfo>> {
            self.chains
                .get(route_name)
                .cloned()
                .ok_or_else(|| RouteError::RouteNotFound(route_name.to_string()))
        }

        fn route_names(&self) -> Vec<String> {
            let mut names: Vec<_> = self.chains.keys().cloned().collect();
            names.sort();
            names
        }
    }

    /// One recorded `is_active_intent` call.
    #[derive(Debug, Clone, PartialEq)]
    pub struct IntentCall {
        pub route_name: String,
        pub contexts: Vec<Context>,
        pub query_params: QueryParams,
        pub allow_ancestor_match: bool,
    }

    /// Router state that records every question and answers with a fixed verdict.
    pub struct RecordingState {
        pub answer: bool,
        pub calls: Mutex<Vec<IntentCall>>,
    }

    impl RecordingState {
        pub fn answering(answer: bool) -> Self {
            Self {
                answer,
                calls: Mutex::new(vec![]),
            }
        }

        pub fn last_call(&self) -> Option<IntentCall> {
            self.calls.lock().unwrap().last().cloned()
        }
    }

    impl RouterState for RecordingState {
        fn is_active_intent(
            &self,
            route_name: &str,
            contexts: &[Context],
            query_params: &QueryParams,
            allow_ancestor_match: bool,
        ) -> bool {
            self.calls.lock().unwrap().push(IntentCall {
                route_name: route_name.to_string(),
                contexts: contexts.to_vec(),
                query_params: query_params.clone(),
                allow_ancestor_match,
            });
            self.answer
        }
    }

    /// Navigator that records transitions and renders URLs as `/name/model...?k=v`.
    #[derive(Default)]
    pub struct RecordingNavigator {
        pub engine_routes: Vec<String>,
        /// Query params every normalization adds.
        pub defaults: QueryParams,
        pub transitions: Mutex<Vec<TransitionRequest>>,
        pub reject: bool,
    }

    impl Navigator for RecordingNavigator {
        fn transition(&self, request: TransitionRequest) -> Result<TransitionHandle> {
            if self.reject {
                return Err(RouteError::NavigationFailed {
                    route: request.route_name.clone(),
                    details: "rejected by test navigator".to_string(),
                });
            }
            self.transitions.lock().unwrap().push(request.clone());
            Ok(TransitionHandle::new(request))
        }

        fn normalize_query_params(
            &self,
            _route_name: &str,
            _models: &[Context],
            query_params: &mut QueryParams,
        ) {
            for (key, value) in &self.defaults {
                query_params
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }

        fn generate(&self, args: &RouteArgs) -> Result<String> {
            let mut url = format!("/{}", args.route_name.replace('.', "/"));
            for model in &args.models {
                url.push('/');
                match model {
                    Value::String(s) => url.push_str(s),
                    other => url.push_str(&other.to_string()),
                }
            }
            let query: Vec<String> = args
                .query_params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            if !query.is_empty() {
                url.push('?');
                url.push_str(&query.join("&"));
            }
            Ok(url)
        }

        fn is_engine_route(&self, route_name: &str) -> bool {
            self.engine_routes.iter().any(|r| r == route_name)
        }
    }
}
