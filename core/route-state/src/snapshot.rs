//! Point-in-time view of the router's current route: the reference [`RouterState`].

use serde_json::{Number, Value};

use crate::error::{Result, RouteError};
use crate::routing::{Context, HandlerInfo, QueryParams, RouterQuery, RouterState};

const INDEX_SUFFIX: &str = ".index";

/// The current handler chain with the params each dynamic segment was entered with.
#[derive(Debug, Clone)]
pub struct RouterSnapshot {
    chain: Vec<HandlerInfo>,
    params: Vec<Context>,
    query_params: QueryParams,
}

impl RouterSnapshot {
    /// `params` lists one value per dynamic segment, root to leaf.
    pub fn new(
        chain: Vec<HandlerInfo>,
        params: Vec<Context>,
        query_params: QueryParams,
    ) -> Result<Self> {
        let leaf = chain
            .last()
            .ok_or(RouteError::EmptyHandlerChain)?;
        let expected: usize = chain.iter().map(HandlerInfo::segment_count).sum();
        if params.len() != expected {
            return Err(RouteError::ParamCountMismatch {
                route: leaf.name.clone(),
                expected,
                actual: params.len(),
            });
        }

        Ok(Self {
            chain,
            params,
            query_params,
        })
    }

    /// Snapshot of `route_name` as resolved by `router`.
    pub fn for_route(
        router: &dyn RouterQuery,
        route_name: &str,
        params: Vec<Context>,
        query_params: QueryParams,
    ) -> Result<Self> {
        let chain = router.resolve_handler_chain(route_name)?;
        if chain.is_empty() {
            return Err(RouteError::RouteNotFound(route_name.to_string()));
        }
        Self::new(chain, params, query_params)
    }

    pub fn current_route_name(&self) -> &str {
        // Non-empty by construction.
        self.chain.last().map(|h| h.name.as_str()).unwrap_or_default()
    }

    pub fn handler_names(&self) -> impl Iterator<Item = &str> {
        self.chain.iter().map(|h| h.name.as_str())
    }

    pub fn query_params(&self) -> &QueryParams {
        &self.query_params
    }

    /// A non-leaf handler still counts as exact when only its own index child follows it.
    fn is_exact_position(&self, position: usize) -> bool {
        let tail = &self.chain[position + 1..];
        match tail {
            [] => true,
            [index] => {
                index.name.strip_suffix(INDEX_SUFFIX) == Some(self.chain[position].name.as_str())
            }
            _ => false,
        }
    }
}

impl RouterState for RouterSnapshot {
    fn is_active_intent(
        &self,
        route_name: &str,
        contexts: &[Context],
        query_params: &QueryParams,
        allow_ancestor_match: bool,
    ) -> bool {
        let Some(position) = self.chain.iter().position(|h| h.name == route_name) else {
            return false;
        };

        if !allow_ancestor_match && !self.is_exact_position(position) {
            return false;
        }

        // Supplied contexts bind to the deepest segments up to the matched handler.
        let available: usize = self.chain[..=position]
            .iter()
            .map(HandlerInfo::segment_count)
            .sum();
        if contexts.len() > available {
            return false;
        }
        let bound = &self.params[available - contexts.len()..available];
        if !contexts
            .iter()
            .zip(bound)
            .all(|(context, param)| context_matches(context, param))
        {
            return false;
        }

        query_params
            .iter()
            .all(|(key, value)| self.query_params.get(key) == Some(value))
    }
}

fn context_matches(context: &Value, param: &Value) -> bool {
    if context == param {
        return true;
    }
    match (identity(context), identity(param)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// String form used to compare models with raw params: `7`, `7.0`, `"7"` and
/// `{"id": 7}` agree.
fn identity(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_identity(n)),
        Value::Object(fields) => match fields.get("id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(number_identity(n)),
            _ => None,
        },
        _ => None,
    }
}

// Integers keep full precision; floats use `f64` display, which drops a zero fraction.
fn number_identity(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64()
            .map(|f| f.to_string())
            .unwrap_or_else(|| n.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route_map::RouteMap;
    use crate::routing::test_utils::StaticChains;
    use serde_json::json;

    fn routes() -> RouteMap {
        RouteMap::from_json_str(
            r#"{"routes":[
                {"name":"posts"},
                {"name":"posts.index"},
                {"name":"posts.post","segments":["post_id"]},
                {"name":"posts.post.comments","segments":["page"]}
            ]}"#,
        )
        .unwrap()
    }

    fn on_comments() -> RouterSnapshot {
        let mut query_params = QueryParams::new();
        query_params.insert("sort".to_string(), json!("new"));
        RouterSnapshot::for_route(
            &routes(),
            "posts.post.comments",
            vec![json!(5), json!(2)],
            query_params,
        )
        .unwrap()
    }

    #[test]
    fn test_param_count_must_match_chain() {
        let err = RouterSnapshot::for_route(&routes(), "posts.post", vec![], QueryParams::new())
            .unwrap_err();
        assert!(matches!(
            err,
            RouteError::ParamCountMismatch {
                expected: 1,
                actual: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_current_route_name_is_leaf() {
        let snapshot = on_comments();
        assert_eq!(snapshot.current_route_name(), "posts.post.comments");
        assert_eq!(
            snapshot.handler_names().collect::<Vec<_>>(),
            vec!["posts", "posts.post", "posts.post.comments"]
        );
    }

    #[test]
    fn test_ancestor_matches_only_when_allowed() {
        let snapshot = on_comments();
        assert!(snapshot.is_active_intent("posts.post", &[json!(5)], &QueryParams::new(), true));
        assert!(!snapshot.is_active_intent("posts.post", &[json!(5)], &QueryParams::new(), false));
    }

    #[test]
    fn test_contexts_bind_to_deepest_segments() {
        let snapshot = on_comments();
        let empty = QueryParams::new();
        assert!(snapshot.is_active_intent("posts.post.comments", &[json!(2)], &empty, false));
        assert!(snapshot.is_active_intent(
            "posts.post.comments",
            &[json!(5), json!(2)],
            &empty,
            false
        ));
        assert!(!snapshot.is_active_intent("posts.post.comments", &[json!(5)], &empty, false));
    }

    #[test]
    fn test_too_many_contexts_never_match() {
        let snapshot = on_comments();
        assert!(!snapshot.is_active_intent(
            "posts.post",
            &[json!(1), json!(5)],
            &QueryParams::new(),
            true
        ));
    }

    #[test]
    fn test_model_identity_matches_raw_param() {
        let snapshot = on_comments();
        let empty = QueryParams::new();
        assert!(snapshot.is_active_intent("posts.post", &[json!({"id": 5})], &empty, true));
        assert!(snapshot.is_active_intent("posts.post", &[json!("5")], &empty, true));
        assert!(!snapshot.is_active_intent("posts.post", &[json!({"id": 6})], &empty, true));
        assert!(!snapshot.is_active_intent("posts.post", &[json!(null)], &empty, true));
    }

    #[test]
    fn test_float_context_matches_integer_param() {
        let snapshot = on_comments();
        let empty = QueryParams::new();
        assert!(snapshot.is_active_intent("posts.post", &[json!(5.0)], &empty, true));
        assert!(snapshot.is_active_intent("posts.post", &[json!({"id": 5.0})], &empty, true));
        assert!(snapshot.is_active_intent("posts.post", &[json!("5")], &empty, true));
        assert!(!snapshot.is_active_intent("posts.post", &[json!(5.5)], &empty, true));
    }

    #[test]
    fn test_empty_chain_is_rejected() {
        let err = RouterSnapshot::new(vec![], vec![], QueryParams::new()).unwrap_err();
        assert!(matches!(err, RouteError::EmptyHandlerChain));
        assert_eq!(err.to_string(), "Handler chain is empty");
    }

    #[test]
    fn test_for_route_names_route_with_empty_chain() {
        let router = StaticChains::new().with_chain("broken", vec![]);
        let err = RouterSnapshot::for_route(&router, "broken", vec![], QueryParams::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "Route not found: broken");
    }

    #[test]
    fn test_query_params_must_be_subset() {
        let snapshot = on_comments();
        let mut matching = QueryParams::new();
        matching.insert("sort".to_string(), json!("new"));
        let mut differing = QueryParams::new();
        differing.insert("sort".to_string(), json!("old"));
        let mut unknown = QueryParams::new();
        unknown.insert("filter".to_string(), json!("all"));

        assert!(snapshot.is_active_intent("posts", &[], &matching, true));
        assert!(!snapshot.is_active_intent("posts", &[], &differing, true));
        assert!(!snapshot.is_active_intent("posts", &[], &unknown, true));
    }

    #[test]
    fn test_resource_is_exact_on_its_index() {
        let snapshot =
            RouterSnapshot::for_route(&routes(), "posts", vec![], QueryParams::new()).unwrap();
        assert_eq!(snapshot.current_route_name(), "posts.index");
        assert!(snapshot.is_active_intent("posts", &[], &QueryParams::new(), false));
        assert!(snapshot.is_active_intent("posts.index", &[], &QueryParams::new(), false));
    }

    #[test]
    fn test_route_outside_chain_is_inactive() {
        let snapshot = on_comments();
        assert!(!snapshot.is_active_intent("about", &[], &QueryParams::new(), true));
    }
}
