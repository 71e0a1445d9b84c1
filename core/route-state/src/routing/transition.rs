//! Values exchanged with the transition engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Context, QueryParams};

/// How a completed transition records itself in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMethod {
    #[default]
    Push,
    Replace,
}

/// Everything the engine needs to start a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub route_name: String,
    pub models: Vec<Context>,
    pub query_params: QueryParams,
    pub method: HistoryMethod,
}

/// Cancellable handle to an in-flight transition.
///
/// Clones share one abort flag, so whoever holds a copy can cancel it.
#[derive(Debug, Clone)]
pub struct TransitionHandle {
    request: TransitionRequest,
    aborted: Arc<AtomicBool>,
}

impl TransitionHandle {
    pub fn new(request: TransitionRequest) -> Self {
        Self {
            request,
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn request(&self) -> &TransitionRequest {
        &self.request
    }

    pub fn method(&self) -> HistoryMethod {
        self.request.method
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// Positional arguments for URL generation: route name, models, then query params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteArgs {
    pub route_name: String,
    pub models: Vec<Context>,
    pub query_params: QueryParams,
}

pub fn route_args(route_name: &str, models: &[Context], query_params: QueryParams) -> RouteArgs {
    RouteArgs {
        route_name: route_name.to_string(),
        models: models.to_vec(),
        query_params,
    }
}
