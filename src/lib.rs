mod chat;
mod client;
mod config;
mod error;
mod history;
mod models;
mod orchestrator;
mod preferences;
mod render;
mod storage;
mod utils;

// Re-export types needed for the public API
pub use chat::{ChatSession, PendingQuery, QueryOutcome, FALLBACK_REPLY};
pub use client::{segment_url, Backend, HttpBackend};
pub use config::{Config, SERVICE_URL_ENV};
pub use error::{ClientError, Result};
pub use history::{HistoryStore, HISTORY_KEY, HISTORY_LIMIT};
pub use models::{
    parse_chat_response, parse_process_response, ChatMessage, ChatReply, ChatRequest, Language,
    ProcessRequest, ResultModel, Role, Segment,
};
pub use orchestrator::{share_text, Job, JobStatus, RequestOrchestrator};
pub use preferences::{Preferences, DARK_MODE_KEY};
pub use render::{
    format_seconds, render_result, segment_row, DownloadRef, ResultView, SegmentRow, SourceCell,
    NO_SOURCE, NO_SUMMARY,
};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use utils::{check_upload, is_supported_video_format, save_markdown_export};

// Re-export command line types
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "YTAChunker segmentation client", long_about = None)]
#[command(after_help = "Examples:
  ytachunker process https://youtu.be/<id>
  ytachunker process https://youtu.be/<id> --manual --language es --chat
  ytachunker history
  ytachunker history-remove https://youtu.be/<id>
  ytachunker download 3
  ytachunker theme")]
pub struct Args {
    /// Command to execute
    #[arg(value_enum)]
    pub command: Option<Command>,

    /// Video URL, segment number or file path, depending on the command
    #[arg(name = "TARGET")]
    pub target: Option<String>,

    /// Transcribe with an explicit language instead of auto-detection
    #[arg(short, long)]
    pub manual: bool,

    /// Language used with --manual (defaults to the configured language)
    #[arg(short, long, value_enum)]
    pub language: Option<Language>,

    /// Open a chat about the segments after a successful job
    #[arg(short, long)]
    pub chat: bool,

    /// Write the segments to a Markdown file
    #[arg(short, long, value_name = "FILE")]
    pub export: Option<std::path::PathBuf>,

    /// Service base address, overriding the config file
    #[arg(long)]
    pub service_url: Option<String>,

    /// Show segment text in the result table
    #[arg(short, long)]
    pub verbose: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            command: Some(Command::Info),
            target: None,
            manual: false,
            language: None,
            chat: false,
            export: None,
            service_url: None,
            verbose: false,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Submit a video for segmentation
    Process,
    /// List recently processed videos
    History,
    /// Remove one video from the history
    HistoryRemove,
    /// Forget all recently processed videos
    HistoryClear,
    /// Download the audio of one segment (1-based)
    Download,
    /// Upload a local video file
    Upload,
    /// Toggle dark mode
    Theme,
    /// Show service information and available commands
    Info,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process_with_options() {
        let args = Args::try_parse_from([
            "ytachunker",
            "process",
            "https://youtu.be/abc",
            "--manual",
            "--language",
            "fr",
            "--chat",
        ])
        .unwrap();

        assert_eq!(args.command, Some(Command::Process));
        assert_eq!(args.target.as_deref(), Some("https://youtu.be/abc"));
        assert!(args.manual);
        assert_eq!(args.language, Some(Language::Fr));
        assert!(args.chat);
    }

    #[test]
    fn test_parse_kebab_case_commands() {
        let args = Args::try_parse_from(["ytachunker", "history-clear"]).unwrap();
        assert_eq!(args.command, Some(Command::HistoryClear));
    }
}
