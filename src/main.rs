use clap::Parser;
use reportctl::cli::{self, Commands};
use reportctl::config;
use reportctl::errors::ReportError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let log_level = match (cli.global.quiet, cli.global.verbose) {
        (true, 0) => "warn",
        (_, 0) => "info",
        (_, 1) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.global.no_color)
        .with_writer(std::io::stderr)
        .init();

    if cli.global.no_color {
        console::set_colors_enabled(false);
    }

    let global = cli.global.clone();
    let result = match cli.command {
        Commands::Templates(args) => cli::templates::handle_templates(&global, args).await,
        Commands::Check(args) => cli::check::handle_check(&global, args).await,
        Commands::Widgets(args) => cli::widgets::handle_widgets(&global, args).await,
        Commands::Generate(args) => cli::generate::handle_generate(&global, args).await,
        Commands::Serve(args) => cli::serve::handle_serve(&global, args).await,
        Commands::Validate(args) => handle_validate(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(e: &ReportError) -> i32 {
    match e {
        ReportError::Config(_) | ReportError::Yaml(_) => 2,
        ReportError::Validation(_) | ReportError::Incompatible(_) => 3,
        ReportError::Permission(_) | ReportError::Authentication(_) => 4,
        ReportError::ConnectionLost(_) => 5,
        _ => 1,
    }
}

async fn handle_validate(args: cli::commands::ValidateArgs) -> Result<(), ReportError> {
    let path = std::path::PathBuf::from(&args.file);
    let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
        ReportError::Config(format!("Cannot read {}: {}", path.display(), e))
    })?;
    let yaml: serde_yaml::Value = serde_yaml::from_str(&content)?;
    let warnings = config::schema_warnings(&yaml)?;
    config::parse_config(&path).await?;

    println!("Configuration is valid: {}", args.file);
    for w in &warnings {
        println!("  warning: {}", w);
    }
    Ok(())
}
