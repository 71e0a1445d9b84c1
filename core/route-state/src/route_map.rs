//! Declarative route map: the reference [`RouterQuery`].
//!
//! # File Format
//!
//! ```json
//! {
//!   "routes": [
//!     { "name": "posts" },
//!     { "name": "posts.index" },
//!     { "name": "posts.post", "segments": ["post_id"] }
//!   ]
//! }
//! ```
//!
//! Nesting comes from the dotted names. A route's handler chain is each of its
//! declared dotted prefixes from root to leaf; a route with a declared `index`
//! child resolves through to that child, the way a resource link lands on
//! `resource.index`.
//!
//! # Validation
//!
//! Loading rejects malformed names, duplicate declarations and routes whose
//! parent is missing. A bad route map is a configuration bug, so nothing is
//! silently skipped.

use std::collections::HashMap;
use std::path::Path;

use fs_err as fs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, RouteError};
use crate::patterns::{RE_ROUTE_NAME, RE_SEGMENT_NAME};
use crate::routing::{HandlerInfo, RouterQuery};

const INDEX_ROUTE: &str = "index";

/// One declared route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteDefinition {
    pub name: String,
    /// Dynamic segment names, in path order.
    #[serde(default)]
    pub segments: Vec<String>,
}

impl RouteDefinition {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        segments: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }
}

/// The on-disk JSON structure for a route map.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteMapFile {
    pub routes: Vec<RouteDefinition>,
}

/// Validated, immutable route table.
#[derive(Debug, Clone)]
pub struct RouteMap {
    routes: Vec<RouteDefinition>,
    by_name: HashMap<String, usize>,
}

impl RouteMap {
    pub fn from_definitions(routes: Vec<RouteDefinition>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(routes.len());

        for (position, route) in routes.iter().enumerate() {
            validate_definition(route)?;
            if by_name.insert(route.name.clone(), position).is_some() {
                return Err(RouteError::DuplicateRoute(route.name.clone()));
            }
        }

        for route in &routes {
            if let Some((parent, _)) = route.name.rsplit_once('.') {
                if !by_name.contains_key(parent) {
                    return Err(RouteError::MissingParentRoute {
                        route: route.name.clone(),
                        parent: parent.to_string(),
                    });
                }
            }
        }

        Ok(Self { routes, by_name })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: RouteMapFile = serde_json::from_str(content).map_err(|source| RouteError::Json {
            context: "parsing route map".to_string(),
            source,
        })?;
        Self::from_definitions(file.routes)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| RouteError::Io {
            context: "reading route map".to_string(),
            source,
        })?;

        if content.trim().is_empty() {
            return Err(RouteError::ConfigMalformed {
                path: path.to_path_buf(),
                details: "file is empty".to_string(),
            });
        }

        let file: RouteMapFile =
            serde_json::from_str(&content).map_err(|e| RouteError::ConfigMalformed {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;
        let map = Self::from_definitions(file.routes)?;

        debug!(path = %path.display(), routes = map.len(), "Loaded route map");
        Ok(map)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn get(&self, route_name: &str) -> Option<&RouteDefinition> {
        self.by_name.get(route_name).map(|&i| &self.routes[i])
    }

    fn handler(&self, route_name: &str) -> Option<HandlerInfo> {
        self.get(route_name)
            .map(|route| HandlerInfo::new(route.name.as_str(), route.segments.iter().cloned()))
    }
}

impl RouterQuery for RouteMap {
    fn resolve_handler_chain(&self, route_name: &str) -> Result<Vec<HandlerInfo>> {
        if !self.by_name.contains_key(route_name) {
            return Err(RouteError::RouteNotFound(route_name.to_string()));
        }

        let mut chain = Vec::new();
        let mut end = 0;
        for segment in route_name.split('.') {
            end += segment.len();
            // Parents are validated on load, so every prefix resolves.
            chain.extend(self.handler(&route_name[..end]));
            end += 1;
        }

        let index_name = format!("{route_name}.{INDEX_ROUTE}");
        chain.extend(self.handler(&index_name));

        Ok(chain)
    }

    fn route_names(&self) -> Vec<String> {
        self.routes.iter().map(|route| route.name.clone()).collect()
    }

    fn has_route(&self, route_name: &str) -> bool {
        self.by_name.contains_key(route_name)
    }
}

fn validate_definition(route: &RouteDefinition) -> Result<()> {
    if !RE_ROUTE_NAME.is_match(&route.name) {
        return Err(RouteError::InvalidRouteName {
            name: route.name.clone(),
            reason: "expected dot-separated identifiers".to_string(),
        });
    }

    for segment in &route.segments {
        if !RE_SEGMENT_NAME.is_match(segment) {
            return Err(RouteError::InvalidRouteName {
                name: route.name.clone(),
                reason: format!("invalid dynamic segment name {segment:?}"),
            });
        }
    }

    Ok(())
}
