use anyhow::{bail, Context, Result};
use clap::Parser;
use grindgraph::cli::{Cli, OutputFormat};
use grindgraph::json_output::JsonOutput;
use grindgraph::text_output::{render_call_tree, render_function_table};
use grindgraph::{parse_file, CallGraph, ParserConfig};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Build the parser configuration from the config file and CLI overrides
fn load_config(args: &Cli) -> Result<ParserConfig> {
    let mut config = match &args.config {
        Some(path) => ParserConfig::from_toml(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ParserConfig::default(),
    };

    if let Some(marker) = &args.main_marker {
        config = config.with_main_marker(marker.clone());
    }
    if args.resolve_forward_calls {
        config = config.with_forward_calls(true);
    }

    config.validate()?;
    Ok(config)
}

/// Pick the requested event, or the first one the dump declares
fn select_event(graph: &CallGraph, requested: Option<&str>) -> Result<String> {
    match requested {
        Some(name) => {
            if graph.events().index_of(name).is_none() {
                bail!(
                    "Unknown event '{}'. Declared events: {}",
                    name,
                    graph.events().names().join(", ")
                );
            }
            Ok(name.to_string())
        }
        None => match graph.events().names().first() {
            Some(name) => Ok(name.clone()),
            None => bail!("Profile declares no events (missing 'events:' line)"),
        },
    }
}

fn print_text(graph: &CallGraph, args: &Cli) -> Result<()> {
    let event = select_event(graph, args.event.as_deref())?;

    match graph.main_function() {
        Some(main) => {
            println!("=== Call Tree ({}) ===", event);
            print!("{}", render_call_tree(main, &event, args.depth)?);
            println!();
        }
        None => eprintln!("No entry point found in profile; showing function table only."),
    }

    println!("=== Functions by inclusive {} ===", event);
    print!("{}", render_function_table(graph, &event, args.top)?);
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(&args)?;
    let graph = parse_file(&args.file, &config)
        .with_context(|| format!("Failed to parse profile {}", args.file.display()))?;

    match args.format {
        OutputFormat::Json => {
            if let Some(event) = &args.event {
                select_event(&graph, Some(event))?;
            }
            println!("{}", JsonOutput::from_graph(&graph).to_json()?);
        }
        OutputFormat::Text => print_text(&graph, &args)?,
    }

    Ok(())
}
