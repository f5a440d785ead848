// src/main.rs
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use facets_lib::display::query::MapViewport;
use facets_lib::engine::{FacetEngine, FacetView};
use facets_lib::models::{Dimension, FilterState, RawRecord, UndeterminedCountryPolicy};
use facets_lib::source::{
    FetchOutcome, FileRecordSource, HttpRecordSource, RecordSource, RequestCoordinator,
};
use facets_lib::utils::engine_config::EngineConfig;
use facets_lib::utils::env::load_env;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(author, version, about = "Deduplicate property records and compute map facets", long_about = None)]
struct FacetArgs {
    /// JSON file of raw records (bare array or API envelope)
    #[arg(long, conflicts_with = "url")]
    input: Option<PathBuf>,

    /// Property API endpoint (defaults to PROPERTY_SOURCE_URL)
    #[arg(long)]
    url: Option<String>,

    /// Country filter value, repeatable (US, CA, ...)
    #[arg(long)]
    country: Vec<String>,

    /// State filter value, repeatable (abbreviation or full name)
    #[arg(long)]
    state: Vec<String>,

    /// Unit type filter value, repeatable
    #[arg(long = "unit-type")]
    unit_type: Vec<String>,

    /// Rate category filter value, repeatable (e.g. "$150-$249")
    #[arg(long = "rate-category")]
    rate_category: Vec<String>,

    /// Map page query string, e.g. "state=Utah&unitType=Yurt&lat=38.5&lon=-109.5"
    #[arg(long)]
    query: Option<String>,

    /// include | exclude properties with an undetermined country when both countries are selected
    #[arg(long)]
    undetermined: Option<UndeterminedCountryPolicy>,

    /// Count properties that have no coordinates
    #[arg(long)]
    include_unmapped: bool,

    /// Use the mobile default zoom
    #[arg(long)]
    mobile: bool,

    /// Print the full view as JSON
    #[arg(long)]
    json: bool,

    #[arg(long)]
    no_progress: bool,
}

impl FacetArgs {
    fn apply_overrides(&self, config: &mut EngineConfig) {
        if let Some(policy) = self.undetermined {
            config.undetermined_country = policy;
        }
        if self.include_unmapped {
            config.counts_require_coordinates = false;
        }
        if self.url.is_some() {
            config.source_url = self.url.clone();
        }
        if self.no_progress || self.json {
            config.progress_enabled = false;
        }
    }

    fn filter_state(&self) -> FilterState {
        let mut filter = FilterState::from_query(self.query.as_deref().unwrap_or(""));
        for (dimension, values) in [
            (Dimension::Country, &self.country),
            (Dimension::State, &self.state),
            (Dimension::UnitType, &self.unit_type),
            (Dimension::RateCategory, &self.rate_category),
        ] {
            for value in values {
                filter.insert(dimension, value);
            }
        }
        filter
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    filter: &'a FilterState,
    viewport: MapViewport,
    view: &'a FacetView,
}

async fn fetch_records<S: RecordSource>(
    coordinator: &RequestCoordinator,
    source: S,
) -> Result<Vec<RawRecord>> {
    match coordinator.fetch(Arc::new(source)).await? {
        FetchOutcome::Completed { records, .. } => Ok(records),
        FetchOutcome::Superseded { request_id } => {
            Err(anyhow!("Fetch {} was superseded before it completed", request_id))
        }
    }
}

/// The engine filters locally; counts need the full record set.
fn unfiltered_source(url: &str) -> Result<HttpRecordSource> {
    HttpRecordSource::new(url)
}

fn create_spinner(enabled: bool) -> Result<Option<ProgressBar>> {
    if !enabled {
        return Ok(None);
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .context("Invalid spinner template")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(Some(pb))
}

fn print_summary(view: &FacetView, filter: &FilterState, viewport: &MapViewport) {
    println!(
        "{} of {} properties displayed ({} markers)",
        view.displayed.len(),
        view.total_properties,
        view.markers.len()
    );
    if !filter.is_unconstrained() {
        println!("Active filter: {}", filter.to_query());
    }
    println!(
        "Viewport: {:.4}, {:.4} at zoom {}{}",
        viewport.lat,
        viewport.lon,
        viewport.zoom,
        if viewport.fit_bounds { " (fit to markers)" } else { "" }
    );
    if let (true, Some(bounds)) = (viewport.fit_bounds, view.bounds) {
        println!(
            "Marker bounds: S {:.4} W {:.4} N {:.4} E {:.4}",
            bounds.south, bounds.west, bounds.north, bounds.east
        );
    }

    for dimension in Dimension::ALL {
        println!("\n{}:", dimension);
        let selected = filter.values(dimension);
        for facet in view.counts.get(dimension) {
            let marker = if selected.contains(&facet.value) { "*" } else { " " };
            println!("  {} {:<28} {:>6}", marker, facet.value, facet.count);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    load_env();
    let args = FacetArgs::parse();
    let start_time = Instant::now();

    let mut config = EngineConfig::from_env();
    args.apply_overrides(&mut config);
    config.log_config();

    let filter = args.filter_state();
    // Centre from --query, state filter from both --query and flags
    let viewport_query = match &args.query {
        Some(query) => format!("{}&{}", query.trim_start_matches('?'), filter.to_query()),
        None => filter.to_query(),
    };
    let viewport = MapViewport::from_query(&viewport_query, args.mobile);

    let spinner = create_spinner(config.progress_enabled)?;
    if let Some(pb) = &spinner {
        pb.set_message("Fetching property records...");
    }

    let coordinator = RequestCoordinator::new();
    let records = match (&args.input, &config.source_url) {
        (Some(path), _) => fetch_records(&coordinator, FileRecordSource::new(path)).await?,
        (None, Some(url)) => {
            fetch_records(&coordinator, unfiltered_source(url)?).await?
        }
        (None, None) => {
            return Err(anyhow!(
                "No record source: pass --input or --url, or set PROPERTY_SOURCE_URL"
            ))
        }
    };

    if let Some(pb) = &spinner {
        pb.set_message(format!("Processing {} records...", records.len()));
    }

    let mut engine = FacetEngine::new(&config);
    let view = engine.process(&records, &filter);

    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }

    if args.json {
        let output = JsonOutput {
            filter: &filter,
            viewport,
            view: &view,
        };
        let json = serde_json::to_string_pretty(&output).context("Failed to serialize view")?;
        println!("{}", json);
    } else {
        print_summary(&view, &filter, &viewport);
    }

    info!(
        "Processed {} records into {} properties in {:.2?}",
        records.len(),
        view.total_properties,
        start_time.elapsed()
    );
    Ok(())
}
