//! route-check: inspect route maps and active-route decisions from a shell.
//!
//! ## Subcommands
//!
//! - `routes`: List every route declared in a route map
//! - `chain`: Print a route's handler chain and how many contexts it consumes
//! - `active`: Answer whether a link target is active for a given current route

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use route_state::{
    compute_max_contexts, ActiveRouteResolver, Context, QueryParams, RouteError, RouteMap,
    RouterQuery, RouterSnapshot,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "route-check")]
#[command(about = "Route map and active-route diagnostics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List declared routes
    Routes {
        /// Route map JSON file
        #[arg(long, value_name = "FILE")]
        routes: PathBuf,
    },

    /// Show the handler chain for a route
    Chain {
        #[arg(long, value_name = "FILE")]
        routes: PathBuf,

        /// Route name (e.g., posts.post)
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Check whether a link target is active
    Active {
        #[arg(long, value_name = "FILE")]
        routes: PathBuf,

        /// Current route name
        #[arg(long)]
        current: String,

        /// JSON array of the current route's dynamic segment params
        #[arg(long, default_value = "[]")]
        params: String,

        /// JSON object of the current query params
        #[arg(long, default_value = "{}")]
        query: String,

        /// Link target route name
        #[arg(long)]
        target: String,

        /// JSON array of contexts supplied by the link
        #[arg(long, default_value = "[]")]
        contexts: String,

        /// JSON object of query params supplied by the link
        #[arg(long, default_value = "{}")]
        target_query: String,

        /// Require an exact match (no ancestor matching)
        #[arg(long)]
        current_when: bool,
    },
}

#[derive(Debug, thiserror::Error)]
enum CheckError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("Invalid JSON for --{arg}: {source}")]
    Argument {
        arg: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Routes { routes } => list_routes(&routes),
        Commands::Chain { routes, name } => show_chain(&routes, &name),
        Commands::Active {
            routes,
            current,
            params,
            query,
            target,
            contexts,
            target_query,
            current_when,
        } => check_active(
            &routes,
            &current,
            &params,
            &query,
            &target,
            &contexts,
            &target_query,
            current_when,
        ),
    };

    if let Err(err) = outcome {
        tracing::error!(error = %err, "route-check failed");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let debug_enabled = env::var("ROUTE_CHECK_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn list_routes(path: &Path) -> Result<(), CheckError> {
    let map = RouteMap::load(path)?;
    for name in map.route_names() {
        println!("{name}");
    }
    Ok(())
}

fn show_chain(path: &Path, name: &str) -> Result<(), CheckError> {
    let map = RouteMap::load(path)?;
    let chain = map.resolve_handler_chain(name)?;

    for handler in &chain {
        if handler.dynamic_segment_names.is_empty() {
            println!("  {}", handler.name);
        } else {
            println!(
                "  {} (:{})",
                handler.name,
                handler.dynamic_segment_names.join(", :")
            );
        }
    }
    println!("maximum contexts: {}", compute_max_contexts(name, &chain));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn check_active(
    path: &Path,
    current: &str,
    params: &str,
    query: &str,
    target: &str,
    contexts: &str,
    target_query: &str,
    current_when: bool,
) -> Result<(), CheckError> {
    let map = Arc::new(RouteMap::load(path)?);

    let snapshot = RouterSnapshot::for_route(
        map.as_ref(),
        current,
        parse_arg("params", params)?,
        parse_arg("query", query)?,
    )?;
    let contexts: Vec<Context> = parse_arg("contexts", contexts)?;
    let target_query: QueryParams = parse_arg("target-query", target_query)?;

    let resolver = ActiveRouteResolver::new(map);
    let checked = resolver.effective_route_name(target, contexts.len())?;
    let active =
        resolver.is_active_for_route(&contexts, &target_query, target, &snapshot, current_when)?;

    println!("current: {}", snapshot.current_route_name());
    println!("checked: {checked}");
    println!("active: {active}");
    Ok(())
}

fn parse_arg<T: serde::de::DeserializeOwned>(
    arg: &'static str,
    raw: &str,
) -> Result<T, CheckError> {
    serde_json::from_str(raw).map_err(|source| CheckError::Argument { arg, source })
}
