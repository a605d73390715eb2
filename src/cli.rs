use std::path::PathBuf;

use clap::{Parser, Subcommand};

use elite_panel::form::MetadataRow;

/// Admin panel for the screenshot gallery
#[derive(Parser)]
#[command(name = "elite-panel")]
#[command(about = "Manage gallery categories and upload screenshots", long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides config and ELITE_PANEL_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,
    /// API key sent as the `key` query parameter
    #[arg(long, global = true)]
    pub key: Option<String>,
    /// Config file (default: panel.toml in the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List categories
    Categories {
        /// Print as an indented tree
        #[arg(long)]
        tree: bool,
    },
    /// Create a category
    CreateCategory {
        #[arg(short, long)]
        name: String,
        /// Parent category path (root if omitted)
        #[arg(short, long, default_value = "")]
        parent: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Create a screenshot record and upload its image
    Upload {
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Category path (root if omitted)
        #[arg(short, long, default_value = "")]
        category: String,
        /// Metadata as KEY=VALUE; repeatable
        #[arg(short, long = "meta")]
        meta: Vec<MetadataRow>,
        /// Image file to upload
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_collects_repeated_meta_in_order() {
        let cli = Cli::try_parse_from([
            "elite-panel", "--key", "k", "upload", "-n", "Shot", "--meta", "size=10", "--meta", "=x", "shot.png",
        ])
        .unwrap();
        assert_eq!(cli.key.as_deref(), Some("k"));
        match cli.command {
            Commands::Upload { name, category, meta, file, .. } => {
                assert_eq!(name, "Shot");
                assert_eq!(category, "");
                assert_eq!(meta, vec![MetadataRow::new("size", "10"), MetadataRow::new("", "x")]);
                assert_eq!(file, PathBuf::from("shot.png"));
            }
            _ => panic!("expected upload"),
        }
    }

    #[test]
    fn malformed_meta_is_rejected() {
        assert!(Cli::try_parse_from(["elite-panel", "upload", "-n", "x", "--meta", "oops", "f.png"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["elite-panel", "categories", "--tree", "--url", "http://h"]).unwrap();
        assert_eq!(cli.url.as_deref(), Some("http://h"));
        assert!(matches!(cli.command, Commands::Categories { tree: true }));
    }
}
