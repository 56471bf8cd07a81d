mod config;
mod error;
mod models;
mod pipeline;
mod report;
mod scraper;
mod utils;
mod validation;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;
use crate::pipeline::{CrawlOptions, Crawler};
use crate::scraper::SoldPricesScraper;
use crate::validation::ValidPostcode;

#[derive(Parser)]
#[command(
    name = "house-prices",
    about = "Most expensive recent house sales for a UK postcode",
    version
)]
struct Cli {
    /// Postcode to look up (prompted for when omitted)
    #[arg(short, long, env = "HOUSE_PRICES_POSTCODE")]
    postcode: Option<ValidPostcode>,

    /// Only count sales from the last N years
    #[arg(short, long)]
    years: Option<u32>,

    /// How many sales to report
    #[arg(short, long)]
    top: Option<usize>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "house_prices=warn,warn",
        1 => "house_prices=info,warn",
        2 => "house_prices=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;
    if let Some(years) = cli.years {
        config.report.years = years;
    }
    if let Some(top) = cli.top {
        config.report.top_n = top;
    }

    let postcode = match cli.postcode {
        Some(postcode) => postcode,
        None => ask_postcode()?,
    };

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping before the next page");
            on_ctrl_c.cancel();
        }
    });

    let scraper = SoldPricesScraper::new(&config.scraper).context("Failed to build scraper")?;
    let crawler = Crawler::new(
        scraper,
        CrawlOptions {
            state_marker: config.scraper.state_marker.clone(),
            sale_selection: config.scraper.sale_selection,
            years: config.report.years,
            as_of: Utc::now().naive_utc(),
        },
    );

    let result = {
        let _t = utils::Timer::start(format!("Sold prices for {}", postcode));
        if cli.json {
            // Output is meant for piping; keep the terminal quiet.
            crawler.crawl(&postcode, &cancel).await
        } else {
            let progress = progress_bar()?;
            let result = crawler
                .crawl_with_progress(&postcode, &cancel, |p| {
                    progress.set_length(u64::from(p.total_pages()));
                    progress.set_position(u64::from(p.current_page.saturating_sub(p.first_page).saturating_add(1)));
                })
                .await;
            progress.finish_and_clear();
            result
        }
    };

    let result = match result {
        Ok(r) => r,
        Err(e) => {
            let msg = format!(
                "Lookup for {} broke on page {} ({} page(s) read)",
                postcode,
                e.page(),
                e.pages_processed()
            );
            return Err(anyhow::Error::new(e).context(msg));
        }
    };

    let top = report::top_expensive(&result.properties, config.report.top_n);
    info!("Reporting {} of {} in-window sales", top.len(), result.properties.len());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&top)?);
    } else {
        print!("{}", report::render_table(postcode.as_str(), &result, &top, config.report.years));
    }

    Ok(())
}

/// Prompt until the input is a valid postcode.
fn ask_postcode() -> Result<ValidPostcode> {
    loop {
        let raw: String = Input::new()
            .with_prompt("Enter the postcode you want to fetch information for")
            .allow_empty(true)
            .interact_text()?;

        match validation::validate(&raw) {
            Ok(postcode) => return Ok(postcode),
            Err(e) => eprintln!("{}", e),
        }
    }
}

fn progress_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.green/dim}] page {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    Ok(pb)
}
