//! # route-state
//!
//! Transient per-route state and active-route resolution for client-side
//! routers.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Nothing here blocks or yields.
//! - **Injected collaborators**: The route recognizer, the router's current
//!   state and the transition engine are traits passed in by the caller. No
//!   global router is ever looked up.
//! - **Bring your own locking**: [`BucketCache`] is plain `&mut self` storage;
//!   [`SharedBucketCache`] puts the whole structure behind one mutex.
//! - **Presence, not truthiness**: a stored `false`, `0` or `""` is a hit.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use route_state::{ActiveRouteResolver, BucketCache, RouteMap, RouterSnapshot};
//!
//! let mut cache = BucketCache::new();
//! cache.stash("posts.post", "scroll", 120);
//! assert_eq!(cache.lookup("posts.post", "scroll", 0), 120);
//!
//! let routes = Arc::new(RouteMap::load(path)?);
//! let resolver = ActiveRouteResolver::new(routes.clone());
//! let current = RouterSnapshot::for_route(routes.as_ref(), "posts.post", vec![json!(1)], qps)?;
//! let active = resolver.is_active_for_route(&[json!(1)], &qps, "posts", &current, false)?;
//! ```

pub mod cache;
pub mod error;
pub mod patterns;
pub mod route_map;
pub mod routing;
pub mod snapshot;

pub use cache::{BucketCache, SharedBucketCache};
pub use error::{Result, RouteError};
pub use route_map::{RouteDefinition, RouteMap, RouteMapFile};
pub use routing::{
    compute_max_contexts, route_args, ActiveRouteResolver, Context, HandlerInfo, HistoryMethod,
    Navigator, QueryParams, RouteArgs, RouterQuery, RouterState, RoutingService,
    TransitionHandle, TransitionRequest,
};
pub use snapshot::RouterSnapshot;
