mod cli;

use gool::{catalog, config, pipeline, summary};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use pipeline::RunContext;
use std::path::Path;
use std::sync::Arc;

async fn list_videos(patterns: &[String], config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let ctx = RunContext::from_config(&config)?;

    // Listing never deletes anything
    let report = catalog::build(&ctx.dirs, patterns, false)?;

    let rows = summary::collect_rows(&report.catalog, ctx.cutlists.as_ref()).await;
    print!("{}", summary::render(&rows));
    Ok(())
}

async fn process_videos(patterns: &[String], config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let ctx = Arc::new(RunContext::from_config(&config)?);

    let mut catalog = catalog::build(&ctx.dirs, patterns, ctx.cleanup)?.catalog;

    pipeline::process(Arc::clone(&ctx), &mut catalog).await;

    let rows = summary::collect_rows(&catalog, ctx.cutlists.as_ref()).await;
    print!("{}", summary::render(&rows));

    let failures = summary::render_failures(&catalog);
    if !failures.is_empty() {
        println!("\nFailed videos (diagnostics in {}):", ctx.dirs.log.display());
        print!("{}", failures);
    }
    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    // Respect RUST_LOG env var if set. Without a log file only warnings
    // reach the terminal, which belongs to the progress bars.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "gool=debug,gool_av=debug,gool_common=debug".to_string()
        } else if log_file.is_some() {
            "gool=info,gool_av=info,gool_common=info".to_string()
        } else {
            "warn".to_string()
        }
    });

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {:?}", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(&env_filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(&env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::List { patterns } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(list_videos(&patterns, cli.config.as_deref()))
        }
        Commands::Process { patterns } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(process_videos(&patterns, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
    }
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let tools = gool_av::check_tools(
        config.decoder.path.as_deref(),
        config.tools.mkvmerge_path.as_deref(),
    );
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Videos needing them will fail.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            config::load_config_or_default(None)?
        }
    };

    println!("✓ Configuration is valid");
    println!("  Working directory: {}", config.resolved_working_dir().display());
    println!("  Parallel videos: {}", config.max_parallel);
    println!("  Cleanup: {}", config.cleanup);
    println!("  Cutlist server: {}", config.cutlist.base_url());
    println!(
        "  OTR account: {}",
        if config.decoder.username.is_empty() {
            "not configured"
        } else {
            config.decoder.username.as_str()
        }
    );

    Ok(())
}
