use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "pattern-sight",
    version,
    about = "UI component pattern detection and analysis CLI for Angular projects"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Pretty-print JSON output (default: compact)
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect, group and score UI patterns across components
    Analyze {
        /// Angular project directory to scan for *.component.ts files
        #[arg(short, long, required_unless_present = "components")]
        dir: Option<String>,

        /// JSON file with an array of {className, template, styles} records
        #[arg(long, conflicts_with = "dir")]
        components: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Also write Markdown documentation into this directory
        #[arg(long, value_name = "DIR")]
        docs: Option<String>,

        /// Also write an HTML pattern catalog into this directory
        #[arg(long, value_name = "DIR")]
        catalog: Option<String>,
    },

    /// List the raw pattern instances of a single template
    Extract {
        /// Path to the template file
        #[arg(short, long)]
        template: String,

        /// Comma-separated stylesheet paths
        #[arg(short, long)]
        styles: Option<String>,

        /// Component class name (default: template file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Generate default configuration file
    Init {
        /// Write to this path instead of the default location
        #[arg(long)]
        path: Option<std::path::PathBuf>,
    },
}
