use anyhow::Result;
use camino::Utf8Path;
use clap::Parser;

use pattern_sight::cli::{Cli, Commands, OutputFormat};
use pattern_sight::config::ConfigService;
use pattern_sight::error::{ErrorCode, SightError};
use pattern_sight::report::{self, Export, catalog, markdown};
use pattern_sight::service::AppService;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        let (code, message) = classify_error(&e);
        let error = serde_json::json!({
            "error": { "code": code, "message": message }
        });
        println!("{}", serde_json::to_string(&error).unwrap());
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn classify_error(e: &anyhow::Error) -> (String, String) {
    if let Some(se) = e.downcast_ref::<SightError>() {
        (se.code.to_string(), se.message.clone())
    } else {
        (ErrorCode::IoError.to_string(), e.to_string())
    }
}

fn serialize_output(value: &impl serde::Serialize, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

fn split_list(list: Option<&str>) -> Vec<String> {
    list.map(|s| {
        s.split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

fn emit(content: &str, output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).map_err(|e| {
                SightError::new(ErrorCode::IoError, format!("Failed to write {path}: {e}"))
            })?;
            eprintln!("Report written to: {path}");
        }
        None => println!("{content}"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

fn run(cli: Cli) -> Result<()> {
    let pretty = cli.pretty;

    // Load configuration
    let config = ConfigService::load(cli.config.as_deref())?;

    // Initialize logging if debug mode (CLI flag or config)
    if cli.debug || config.debug {
        pattern_sight::logger::init(&config)?;
    }

    let service = AppService::new(config.analysis.clone());

    match cli.command {
        Commands::Init { path } => {
            let config_path = if let Some(p) = path {
                ConfigService::generate_at(&p)?;
                p
            } else {
                ConfigService::generate_default()?;
                ConfigService::default_path()
            };
            eprintln!("Configuration file created at: {}", config_path.display());
            Ok(())
        }
        Commands::Analyze {
            dir,
            components,
            format,
            output,
            docs,
            catalog,
        } => cmd_analyze(
            &service,
            dir.as_deref(),
            components.as_deref(),
            format,
            Outputs {
                report: output.as_deref(),
                docs: docs.as_deref(),
                catalog: catalog.as_deref(),
            },
            pretty,
        ),
        Commands::Extract {
            template,
            styles,
            name,
        } => cmd_extract(&service, &template, styles.as_deref(), name.as_deref(), pretty),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Where `analyze` writes its artifacts.
struct Outputs<'a> {
    report: Option<&'a str>,
    docs: Option<&'a str>,
    catalog: Option<&'a str>,
}

fn cmd_analyze(
    service: &AppService,
    dir: Option<&str>,
    components: Option<&str>,
    format: OutputFormat,
    outputs: Outputs<'_>,
    pretty: bool,
) -> Result<()> {
    let result = match (dir, components) {
        (_, Some(manifest)) => service.analyze_manifest(manifest)?,
        (Some(dir), None) => service.analyze_dir(dir)?,
        (None, None) => {
            return Err(SightError::invalid_request("One of --dir or --components is required").into());
        }
    };

    if let Some(dir) = outputs.docs {
        let written = report::write_pages(Utf8Path::new(dir), &markdown::render(&result))?;
        eprintln!("Documentation written to: {dir} ({} files)", written.len());
    }
    if let Some(dir) = outputs.catalog {
        let written = report::write_pages(Utf8Path::new(dir), &catalog::render(&result))?;
        eprintln!("Catalog written to: {dir} ({} files)", written.len());
    }

    let content = match format {
        OutputFormat::Json => Export::now(&result)?.to_json(pretty)?,
        OutputFormat::Text => report::render_text(&result),
    };
    emit(&content, outputs.report)
}

fn cmd_extract(
    service: &AppService,
    template: &str,
    styles: Option<&str>,
    name: Option<&str>,
    pretty: bool,
) -> Result<()> {
    let styles = split_list(styles);
    let result = service.extract(template, &styles, name)?;
    println!("{}", serialize_output(&result, pretty)?);
    Ok(())
}
