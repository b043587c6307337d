//! metaroute - Command-line entry point
//!
//! Two operator workflows: validate a routing configuration ahead of
//! deployment, and dry-run a single resolution to see where a prompt would be
//! delegated and why.

use clap::{Parser, Subcommand, ValueEnum};
use metaroute::config::RouterConfig;
use metaroute::observability::init_default_logging;
use metaroute::routing::{AgentRegistry, RouteResolver, RoutingContext};
use metaroute::validation::SemanticValidator;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

/// Declarative prompt routing across meta-agent identities
#[derive(Parser)]
#[command(name = "metaroute")]
#[command(about = "Declarative routing of task prompts across meta-agent identities")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and report every error and warning
    Validate {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Dry-run one resolution and print the chosen route
    Route {
        /// Identity whose rules to evaluate
        #[arg(long)]
        identity: String,
        /// The task prompt
        #[arg(long)]
        prompt: String,
        /// Project directory for project-context matchers
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
        /// Print the full per-rule evaluation trace
        #[arg(long)]
        trace: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_default_logging();

    let config = match load_configuration(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load configuration: {e}");
            process::exit(1);
        }
    };

    let exit_code = match cli.command {
        Commands::Validate { format } => run_validate(&config, format),
        Commands::Route {
            identity,
            prompt,
            project_dir,
            trace,
        } => run_route(&config, &identity, &prompt, project_dir, trace),
    };

    process::exit(exit_code);
}

fn load_configuration(config_path: &Option<PathBuf>) -> Result<RouterConfig, Box<dyn std::error::Error>> {
    match config_path {
        Some(path) => {
            info!("loading configuration from: {}", path.display());
            Ok(RouterConfig::load_from_file(path)?)
        }
        None => {
            let default_paths = ["metaroute.toml", "config/metaroute.toml"];
            for path_str in default_paths {
                let path = PathBuf::from(path_str);
                if path.exists() {
                    info!("loading configuration from: {}", path.display());
                    return Ok(RouterConfig::load_from_file(&path)?);
                }
            }
            Err("no configuration file found; pass one with -c/--config or create metaroute.toml".into())
        }
    }
}

fn run_validate(config: &RouterConfig, format: OutputFormat) -> i32 {
    let report = SemanticValidator::new(config).validate();

    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("failed to serialize report: {e}");
                return 1;
            }
        },
        OutputFormat::Text => {
            for err in &report.errors {
                println!("error: {err}");
            }
            for warning in &report.warnings {
                println!("warning: {warning}");
            }
            if report.is_valid() {
                println!(
                    "configuration valid ({} agents, {} warnings)",
                    config.agents.len(),
                    report.warnings.len()
                );
            } else {
                println!("configuration invalid: {} error(s)", report.errors.len());
            }
        }
    }

    if report.is_valid() {
        0
    } else {
        1
    }
}

fn run_route(
    config: &RouterConfig,
    identity: &str,
    prompt: &str,
    project_dir: PathBuf,
    trace: bool,
) -> i32 {
    // refuse to route over a configuration that fails validation
    let report = SemanticValidator::new(config).validate();
    if !report.is_valid() {
        for err in &report.errors {
            error!("{err}");
        }
        error!("configuration rejected, not routing");
        return 1;
    }

    let registry = AgentRegistry::from_config(config);
    let resolver = RouteResolver::default();
    let context = RoutingContext::new(prompt, project_dir);

    let definition = match registry.get(identity) {
        Some(definition) => definition,
        None => {
            error!("identity '{identity}' is not registered");
            return 2;
        }
    };

    let (route, evaluations) = if trace {
        resolver.resolve_traced(identity, &definition.rules, &context)
    } else {
        (resolver.resolve(identity, &definition.rules, &context), vec![])
    };

    if trace {
        for (i, step) in evaluations.iter().enumerate() {
            println!(
                "rule[{i}] {} -> {}",
                step.matcher_kind,
                if step.matched { "match" } else { "no match" }
            );
        }
    }

    match route {
        Some(route) => {
            println!("route: {identity} -> {}", route.target);
            println!("matcher: {} ({})", route.matcher_kind, route.matched);
            0
        }
        None => {
            println!("no rule matched for '{identity}'");
            0
        }
    }
}
