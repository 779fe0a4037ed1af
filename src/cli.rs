use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Default, Parser, Serialize)]
#[command(name = "hackboard", about = "Hackathon leaderboard console")]
pub struct Cli {
    /// YAML file with local settings (defaults to `hackboard.yaml` when present)
    #[arg(long)]
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Max log level: TRACE, DEBUG, INFO, WARN or ERROR
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_level: Option<String>,
}
