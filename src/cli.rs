//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// roadtrip - conversational road trip planner
#[derive(Parser)]
#[command(
    name = "roadtrip",
    about = "Plan European road trips by chatting with an LLM",
    version,
    after_help = "Logs are written to: ~/.local/share/roadtrip/logs/roadtrip.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Start an interactive planning session
    Chat {
        /// First message to send
        #[arg(value_name = "PROMPT")]
        prompt: Option<String>,
    },

    /// Print the saved trip
    Show {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete the saved trip
    Reset,

    /// Search well-rated restaurants near a point
    Places {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Search keyword (defaults to the configured query)
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Print the tool definitions sent to the model
    Tools,
}

/// Output format for show
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Where the log file lives
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roadtrip")
        .join("logs")
        .join("roadtrip.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["roadtrip"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_chat() {
        let cli = Cli::parse_from(["roadtrip", "chat"]);
        assert!(matches!(cli.command, Some(Command::Chat { prompt: None })));

        let cli = Cli::parse_from(["roadtrip", "chat", "Two weeks in Italy"]);
        match cli.command {
            Some(Command::Chat { prompt }) => assert_eq!(prompt.as_deref(), Some("Two weeks in Italy")),
            _ => panic!("Expected Chat command"),
        }
    }

    #[test]
    fn test_cli_parse_show() {
        let cli = Cli::parse_from(["roadtrip", "show"]);
        assert!(matches!(cli.command, Some(Command::Show { format: OutputFormat::Text })));

        let cli = Cli::parse_from(["roadtrip", "show", "--format", "json"]);
        assert!(matches!(cli.command, Some(Command::Show { format: OutputFormat::Json })));
    }

    #[test]
    fn test_cli_parse_reset_and_tools() {
        assert!(matches!(Cli::parse_from(["roadtrip", "reset"]).command, Some(Command::Reset)));
        assert!(matches!(Cli::parse_from(["roadtrip", "tools"]).command, Some(Command::Tools)));
    }

    #[test]
    fn test_cli_parse_places_negative_coordinates() {
        let cli = Cli::parse_from(["roadtrip", "places", "--lat", "38.72", "--lng", "-9.14", "-q", "bifana"]);
        match cli.command {
            Some(Command::Places { lat, lng, query }) => {
                assert_eq!(lat, 38.72);
                assert_eq!(lng, -9.14);
                assert_eq!(query.as_deref(), Some("bifana"));
            }
            _ => panic!("Expected Places command"),
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("table".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["roadtrip", "-c", "/path/to/config.yml", "show"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
    }
}
