mod cli;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use elite_panel::config::PanelConfig;
use elite_panel::types::{category_tree, Category};
use elite_panel::view::SelectId;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut cfg = PanelConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.url { cfg.base_url = url; }
    if let Some(key) = cli.key { cfg.api_key = Some(key); }
    if let Some(secs) = cli.timeout { cfg.timeout_secs = Some(secs); }

    let panel = elite_panel::connect(&cfg)?;

    let ok = match cli.command {
        Commands::Categories { tree } => {
            let ok = panel.init().await;
            let categories: Vec<Category> = panel
                .view()
                .options(SelectId::UploadCategory)
                .into_iter()
                .filter(|o| !o.value.is_empty())
                .map(|o| Category { path: o.value, name: o.label, parent: None })
                .collect();
            if tree {
                for (depth, c) in category_tree(&categories) {
                    println!("{}{} ({})", "  ".repeat(depth), c.name, c.path);
                }
            } else {
                for c in &categories {
                    println!("{}\t{}", c.path, c.name);
                }
            }
            ok
        }
        Commands::CreateCategory { name, parent, description } => {
            panel.view().fill_category(&name, &parent, &description);
            panel.on_create_category_submit().await
        }
        Commands::Upload { name, description, category, meta, file } => {
            let file = elite_panel::read_upload_file(&file, cfg.max_upload_bytes).await?;
            panel.view().fill_upload(&name, &description, &category, Some(file));
            for (i, row) in meta.iter().enumerate() {
                panel.on_metadata_add();
                panel.view().fill_metadata_row(i, &row.name, &row.value);
            }
            let outcome = panel.on_upload_submit().await;
            if let elite_panel::controller::UploadOutcome::Uploaded { path } = &outcome {
                println!("{path}");
            }
            outcome.is_uploaded()
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
