use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// URL of the chapter reader page to start from (must be http/https).
    #[arg(value_name = "URL")]
    pub url: String,

    /// HTML layout of the target site.
    #[arg(long, value_enum, env = "CBTRIP_LAYOUT", default_value_t = Layout::Current)]
    pub layout: Layout,

    /// Directory archives are written under (`<out>/<title>/<title> <chapter>.cbt`).
    #[arg(long, default_value = ".")]
    pub out: String,

    /// Per-request timeout. Requests never time out when unset.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Also accept plain-http image URLs (local mirrors).
    #[arg(long)]
    pub allow_http: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    /// Reader with a `chapter | title` heading and a list-group chapter index.
    Current,
    /// Reader with a side chapter list marking the current entry.
    Legacy,
}
