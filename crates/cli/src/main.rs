//! OpenAPI Normalizer CLI
//!
//! Command-line interface for resolving `$ref` pointers in OpenAPI 3.0.x
//! documents.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use openapi_normalizer_common::{ComponentCategory, OpenApiVersion};
use openapi_normalizer_parser::{OpenApi, OpenApiParser};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "openapi-normalizer")]
#[command(version, about = "Resolve $ref pointers in OpenAPI 3.0.x documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every local reference and print the self-contained document
    #[command(after_help = "EXAMPLES:\n  \
        # Print the resolved document as JSON\n  \
        openapi-normalizer resolve --spec petstore.yaml\n\n  \
        # Write YAML, keeping the components section\n  \
        openapi-normalizer resolve \\\n    \
        --spec petstore.yaml \\\n    \
        --format yaml \\\n    \
        --include-components \\\n    \
        --output petstore.resolved.yaml\n\n  \
        # Validate a document that omits its version with the 3.0.1 model\n  \
        openapi-normalizer resolve --spec legacy.json --assume-version 3.0.1")]
    Resolve {
        /// Path to the OpenAPI document (.json, .yaml or .yml)
        #[arg(short, long)]
        spec: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Keep the components section in the output
        #[arg(long)]
        include_components: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Validate against this OpenAPI version instead of the declared one
        #[arg(long)]
        assume_version: Option<OpenApiVersion>,
    },

    /// Check that a document resolves and validates
    #[command(after_help = "EXAMPLES:\n  \
        openapi-normalizer validate --spec petstore.yaml")]
    Validate {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        spec: PathBuf,

        /// Validate against this OpenAPI version instead of the declared one
        #[arg(long)]
        assume_version: Option<OpenApiVersion>,
    },

    /// Resolve the components section and report per-category results
    #[command(after_help = "EXAMPLES:\n  \
        openapi-normalizer components --spec petstore.yaml\n\n  \
        # Include the resolution trace\n  \
        RUST_LOG=openapi_normalizer=trace openapi-normalizer components --spec petstore.yaml")]
    Components {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        spec: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Yaml => write!(f, "YAML"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Resolve {
            spec,
            format,
            include_components,
            output,
            assume_version,
        } => {
            resolve_command(ResolveConfig {
                spec_path: spec.as_path(),
                format,
                include_components,
                output: output.as_deref(),
                assume_version,
                verbose: cli.verbose,
            })?;
        }
        Commands::Validate {
            spec,
            assume_version,
        } => {
            validate_command(spec.as_path(), assume_version, cli.verbose)?;
        }
        Commands::Components { spec } => {
            components_command(spec.as_path(), cli.verbose)?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("openapi_normalizer={default_level}"))),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_parser(spec_path: &Path, assume_version: Option<OpenApiVersion>) -> Result<OpenApiParser> {
    let parser = OpenApiParser::from_file(spec_path)
        .with_context(|| format!("Failed to load OpenAPI document {}", spec_path.display()))?;
    Ok(match assume_version {
        Some(version) => parser.with_version(version),
        None => parser,
    })
}

fn load_api(spec_path: &Path, assume_version: Option<OpenApiVersion>) -> Result<OpenApi> {
    load_parser(spec_path, assume_version)?
        .parse()
        .context("Failed to resolve OpenAPI document")
}

/// Settings of the `resolve` subcommand
struct ResolveConfig<'a> {
    spec_path: &'a Path,
    format: OutputFormat,
    include_components: bool,
    output: Option<&'a Path>,
    assume_version: Option<OpenApiVersion>,
    verbose: bool,
}

// Status lines go to stderr so stdout carries only the document.
fn resolve_command(config: ResolveConfig) -> Result<()> {
    eprintln!(
        "{} Resolving OpenAPI document: {}",
        "→".cyan(),
        config.spec_path.display()
    );

    if config.verbose {
        eprintln!("  Format: {}", config.format);
        eprintln!("  Include components: {}", config.include_components);
        if let Some(version) = config.assume_version {
            eprintln!("  Assumed version: {}", version);
        }
    }

    let api = load_api(config.spec_path, config.assume_version)?;
    let document = api
        .to_clean_value(config.include_components)
        .context("Failed to serialize resolved document")?;

    let rendered = match config.format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&document).context("Failed to render JSON")? + "\n"
        }
        OutputFormat::Yaml => serde_yaml::to_string(&document).context("Failed to render YAML")?,
    };

    match config.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Wrote resolved document to {}",
                "✓".green(),
                path.display().to_string().yellow()
            );
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

fn validate_command(
    spec_path: &Path,
    assume_version: Option<OpenApiVersion>,
    verbose: bool,
) -> Result<()> {
    println!("{} Validating: {}", "→".cyan(), spec_path.display());

    let api = load_api(spec_path, assume_version)?;

    println!("\n{}", "✓ Document is valid!".green().bold());
    println!("  Title: {}", api.info.title.yellow());
    println!("  API version: {}", api.info.version.yellow());
    println!("  OpenAPI: {}", api.openapi);
    println!("  Paths: {}", api.paths.len());

    if verbose {
        println!("\n{}", "Paths:".bold());
        for (path, item) in &api.paths {
            let methods: Vec<&str> = item.operations().map(|(method, _)| method).collect();
            println!("  • {} ({})", path.cyan(), methods.join(", "));
        }
    }

    Ok(())
}

fn components_command(spec_path: &Path, verbose: bool) -> Result<()> {
    println!("{} Resolving components: {}", "→".cyan(), spec_path.display());

    let state = load_parser(spec_path, None)?
        .resolve_components()
        .context("Failed to resolve components")?;

    println!("\n{}", "✓ Components resolved!".green().bold());
    println!("\n{}", "Components:".bold());
    for category in ComponentCategory::ALL {
        let resolved = state.resolved(category);
        if resolved.is_empty() {
            continue;
        }
        println!("  {}: {}", category.to_string().cyan(), resolved.len());
        if verbose {
            for key in resolved.keys() {
                println!("    • {}", key);
            }
        }
    }

    println!("\n  Total: {}", state.resolved_count());
    println!("  Consolidation rounds: {}", state.rounds());

    let self_references = state.self_references();
    if !self_references.is_empty() {
        println!("\n{}", "Self references:".bold());
        for reference in self_references {
            println!("  • {}", reference.yellow());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PETS: &str = r##"openapi: 3.0.3
info:
  title: Pets
  version: "1"
paths:
  /pets:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Pet"
components:
  schemas:
    Pet:
      type: object
      properties:
        name:
          type: string
"##;

    #[test]
    fn test_resolve_arguments() {
        let cli = Cli::try_parse_from([
            "openapi-normalizer",
            "resolve",
            "--spec",
            "api.yaml",
            "--format",
            "yaml",
            "--include-components",
            "--assume-version",
            "3.0.1",
        ])
        .unwrap();

        match cli.command {
            Commands::Resolve {
                format,
                include_components,
                assume_version,
                output,
                ..
            } => {
                assert_eq!(format, OutputFormat::Yaml);
                assert!(include_components);
                assert_eq!(assume_version, Some(OpenApiVersion::V3_0_1));
                assert!(output.is_none());
            }
            _ => panic!("expected the resolve subcommand"),
        }
    }

    #[test]
    fn test_unsupported_assumed_version_is_rejected() {
        let result = Cli::try_parse_from([
            "openapi-normalizer",
            "validate",
            "--spec",
            "api.yaml",
            "--assume-version",
            "3.1.0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let spec_path = dir.path().join("pets.yaml");
        let output = dir.path().join("pets.resolved.json");
        fs::write(&spec_path, PETS).unwrap();

        resolve_command(ResolveConfig {
            spec_path: &spec_path,
            format: OutputFormat::Json,
            include_components: false,
            output: Some(&output),
            assume_version: None,
            verbose: false,
        })
        .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert!(written.get("components").is_none());
        assert_eq!(
            written["paths"]["/pets"]["get"]["responses"]["200"]["content"]["application/json"]
                ["schema"]["properties"]["name"]["type"],
            "string"
        );
    }

    #[test]
    fn test_resolve_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_api(&dir.path().join("missing.yaml"), None).unwrap_err();
        assert!(err.to_string().contains("Failed to load OpenAPI document"));
    }
}
