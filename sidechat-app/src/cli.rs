//! CLI definitions for the sidechat binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use sidechat_providers::ProviderKind;
use sidechat_session::TranscriptMode;
use url::Url;

/// Drive consumer AI chat sites through a WebDriver session.
#[derive(Parser)]
#[command(name = "sidechat")]
#[command(about = "Automate AI chat sites: send prompts, transfer files, transcribe replies")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (YAML); `SIDECHAT__*` env vars override it
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Chat page to attach to; the site is detected from its hostname
    #[arg(long, global = true)]
    pub url: Option<Url>,

    /// Open this site at its new-conversation page instead of giving --url
    #[arg(long, global = true, value_parser = parse_site)]
    pub site: Option<ProviderKind>,

    /// Duplicate log events to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Send one prompt and wait for the reply to settle
    Send {
        /// Prompt text
        message: String,

        /// Print the extracted reply once it settles
        #[arg(long)]
        retrieve: bool,
    },

    /// Send a text file in enveloped, paragraph-safe parts
    SendFile {
        /// File to transfer
        path: PathBuf,

        /// Name announced in the envelopes (default: the file name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Send every prompt from a separator-delimited prompt file, in order
    RunBatch {
        /// Prompt file (prompts separated by the configured separator line)
        path: PathBuf,
    },

    /// Extract the conversation and print or write it
    Transcribe {
        /// Which side of each turn to include
        #[arg(long, value_enum, default_value_t = TranscribeMode::Responses)]
        mode: TranscribeMode,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Navigate to the site's new-conversation page
    NewChat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum TranscribeMode {
    Responses,
    Prompts,
    Both,
}

impl From<TranscribeMode> for TranscriptMode {
    fn from(mode: TranscribeMode) -> Self {
        match mode {
            TranscribeMode::Responses => TranscriptMode::ResponsesOnly,
            TranscribeMode::Prompts => TranscriptMode::PromptsOnly,
            TranscribeMode::Both => TranscriptMode::Both,
        }
    }
}

fn parse_site(raw: &str) -> Result<ProviderKind, String> {
    let wanted = raw.to_ascii_lowercase();
    ProviderKind::all()
        .iter()
        .copied()
        .find(|kind| kind.name() == wanted)
        .ok_or_else(|| {
            let known: Vec<&str> = ProviderKind::all().iter().map(|k| k.name()).collect();
            format!("unknown site '{raw}' (expected one of: {})", known.join(", "))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn site_names_parse_case_insensitively() {
        assert_eq!(parse_site("gemini"), Ok(ProviderKind::Gemini));
        assert_eq!(parse_site("Claude"), Ok(ProviderKind::Claude));
        assert!(parse_site("chatgpt").is_err());
    }

    #[test]
    fn run_batch_takes_a_path() {
        let cli = Cli::try_parse_from(["sidechat", "run-batch", "prompts.txt"]).unwrap();
        assert!(matches!(cli.command, Command::RunBatch { .. }));
    }
}
