//! CLI module for Jamak.

pub mod commands;
pub mod interrupt;
mod output;
pub mod preflight;

pub use output::{mask_secret, Output};

use clap::{Args, Parser, Subcommand};

/// Jamak - YouTube Caption Retrieval and Refinement
///
/// Fetches human-authored captions for a YouTube video and corrects them with an LLM.
/// The name "Jamak" comes from the Korean word for "subtitles."
#[derive(Parser, Debug)]
#[command(name = "jamak")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by commands that refine a transcript.
#[derive(Args, Debug, Clone)]
pub struct RefineArgs {
    /// Refine segment by segment with neighbor context (needs timed captions)
    #[arg(short, long)]
    pub segments: bool,

    /// Output format (text, json, srt, vtt)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Maximum concurrent LLM calls (overrides config)
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// On LLM failure, write the unrefined captions instead of failing
    #[arg(long)]
    pub keep_original_on_error: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the preferred human-authored captions of a video
    Caption {
        /// YouTube watch URL (must carry a v= parameter)
        url: String,

        /// Caption languages in priority order, comma separated (e.g. "ko,en")
        #[arg(short, long, value_delimiter = ',')]
        lang: Vec<String>,

        /// Correct the captions with the LLM before writing them
        #[arg(short, long)]
        refine: bool,

        #[command(flatten)]
        refine_args: RefineArgs,
    },

    /// Show a video's title, channel and description
    Describe {
        /// YouTube watch URL
        url: String,
    },

    /// Refine a local caption file (SRT, WebVTT, SBV or plain text)
    Refine {
        /// Caption file to refine
        input: String,

        #[command(flatten)]
        refine_args: RefineArgs,
    },

    /// Extract a recipe from a cooking video's captions
    Recipe {
        /// YouTube watch URL
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        url: Option<String>,

        /// Read captions from a local file instead of YouTube
        #[arg(long)]
        file: Option<String>,

        /// Correct the captions before extracting the recipe
        #[arg(short, long)]
        refine: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_caption_command() {
        let cli = Cli::parse_from([
            "jamak",
            "caption",
            "https://www.youtube.com/watch?v=abc",
            "--lang",
            "ja,en",
            "--refine",
            "--segments",
            "--format",
            "srt",
        ]);

        match cli.command {
            Commands::Caption {
                url,
                lang,
                refine,
                refine_args,
            } => {
                assert_eq!(url, "https://www.youtube.com/watch?v=abc");
                assert_eq!(lang, vec!["ja", "en"]);
                assert!(refine);
                assert!(refine_args.segments);
                assert_eq!(refine_args.format, "srt");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_recipe_needs_url_or_file() {
        assert!(Cli::try_parse_from(["jamak", "recipe"]).is_err());
        assert!(Cli::try_parse_from(["jamak", "recipe", "--file", "a.srt"]).is_ok());
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
