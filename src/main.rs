mod batch;
mod browser;
mod documents;
mod extract;
mod fetch;
mod model;
mod report;
#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "grant_scraper", about = "Grant opportunity scraper for government and utility sites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape URLs and write a Markdown report
    Run {
        /// URLs to scrape
        urls: Vec<String>,
        /// File with one URL per line (blank lines and # comments skipped)
        #[arg(short = 'f', long)]
        file: Option<PathBuf>,
        /// Report output path
        #[arg(short, long, default_value = "grant_research_results.md")]
        output: PathBuf,
        /// Also write the raw results as JSON next to the report
        #[arg(long)]
        json: bool,
        /// Skip the headless browser and fetch everything with plain HTTP
        #[arg(long)]
        no_browser: bool,
    },
    /// Run the field extractor over a local HTML or text file and print JSON
    Extract {
        path: PathBuf,
        /// Treat the input as HTML and strip it to visible text first
        #[arg(long)]
        html: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            urls,
            file,
            output,
            json,
            no_browser,
        } => {
            let urls = collect_urls(urls, file.as_deref())?;
            if urls.is_empty() {
                bail!("no URLs given; pass them as arguments or via --file");
            }
            println!("Scraping {} URLs...", urls.len());

            let runner = batch::BatchRunner::init(!no_browser)?;
            let results = runner.run(&urls).await;

            let report = report::format_results(&results);
            std::fs::write(&output, &report)
                .with_context(|| format!("cannot write {}", output.display()))?;
            info!("Report saved to {}", output.display());

            if json {
                let json_path = output.with_extension("json");
                std::fs::write(&json_path, serde_json::to_vec_pretty(&results)?)
                    .with_context(|| format!("cannot write {}", json_path.display()))?;
                info!("Raw results saved to {}", json_path.display());
            }

            let ok = results.iter().filter(|r| r.success).count();
            println!(
                "Done: {} of {} URLs scraped, report written to {}",
                ok,
                results.len(),
                output.display()
            );
            Ok(())
        }
        Commands::Extract { path, html } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let text = if html {
                extract::text::html_to_text(&raw)
            } else {
                raw
            };
            let info = extract::extract_grant_info(&text);
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn collect_urls(mut urls: Vec<String>, file: Option<&std::path::Path>) -> Result<Vec<String>> {
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read URL file {}", path.display()))?;
        urls.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(str::to_string),
        );
    }
    Ok(urls)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
