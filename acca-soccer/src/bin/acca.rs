use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::Parser;
use rustc_hash::FxHashMap;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info, warn};

use acca::file::{ReadJsonFile, WriteJsonFile};
use acca::timed::Timed;
use acca_soccer::data::{FixtureFile, MockSource};
use acca_soccer::domain::{Fixture, FixtureId, Score};
use acca_soccer::feed::{Client, ClientConfig};
use acca_soccer::pipeline::{self, Pipeline};
use acca_soccer::sets::{self, Band, BetSet};
use acca_soccer::{data, print};

const TOKEN_VAR: &str = "FOOTBALL_DATA_KEY";

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// file to source rated fixtures from
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// use the built-in mock fixtures
    #[clap(long)]
    mock: bool,

    /// download fixtures from football-data.org (token in FOOTBALL_DATA_KEY)
    #[clap(short = 'd', long)]
    download: bool,

    /// days ahead to download fixtures for
    #[clap(long, default_value = "1")]
    days: u32,

    /// JSON configuration file
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// legs per set
    #[clap(long)]
    legs: Option<usize>,

    /// minimum single-bet probability
    #[clap(long = "min-bet")]
    min_bet: Option<f64>,

    /// minimum combined set probability
    #[clap(long = "min-set")]
    min_set: Option<f64>,

    /// maximum sets returned
    #[clap(long = "max-sets")]
    max_sets: Option<usize>,

    /// only show sets within a probability band, e.g. 0.5..0.6 (repeatable)
    #[clap(long)]
    band: Vec<Band>,

    /// only show sets whose legs are all from a league (repeatable)
    #[clap(long)]
    league: Vec<String>,

    /// print the markets of every fixture
    #[clap(long)]
    markets: bool,

    /// write the sets as JSON
    #[clap(short = 'o', long)]
    output: Option<PathBuf>,

    /// settle the sets against a JSON map of fixture id to final score
    #[clap(long)]
    results: Option<PathBuf>,

    /// settle the sets against final scores downloaded from football-data.org
    #[clap(long)]
    check: bool,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        let sources = [self.file.is_some(), self.mock, self.download]
            .into_iter()
            .filter(|&selected| selected)
            .count();
        if sources > 1 {
            bail!("at most one of the -f, --mock and -d flags may be specified");
        }
        if self.results.is_some() && self.check {
            bail!("the --results and --check flags are mutually exclusive");
        }
        Ok(())
    }

    fn apply_overrides(&self, config: &mut pipeline::Config) {
        if let Some(legs) = self.legs {
            config.sets.legs = legs;
        }
        if let Some(min_bet) = self.min_bet {
            config.bets.min_prob = min_bet;
        }
        if let Some(min_set) = self.min_set {
            config.sets.min_prob = min_set;
        }
        if let Some(max_sets) = self.max_sets {
            config.sets.max_sets = max_sets;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let mut config = match &args.config {
        None => pipeline::Config::default(),
        Some(path) => pipeline::Config::load(path)?,
    };
    args.apply_overrides(&mut config);
    let pipeline = Pipeline::try_from(config)?;

    let fixtures = read_fixtures(&args).await?;
    info!("modelling {} fixtures", fixtures.len());
    if args.markets {
        print_markets(&pipeline, &fixtures);
    }

    let report = Timed::call(|| pipeline.run(&fixtures));
    info!("generated sets in {:.3}s", report.elapsed.as_secs_f64());
    let report = report.value;
    println!(
        "Candidates:\n{}",
        Console::default().render(&print::tabulate_families(&report.candidates.by_family()))
    );

    let sets = sets::in_leagues(sets::within(report.selection.sets, &args.band), &args.league);
    if sets.is_empty() {
        match sets::describe_filters(&args.band, &args.league) {
            None => warn!(
                "no sets found; active thresholds: {}",
                pipeline.config().thresholds()
            ),
            Some(filters) => warn!(
                "no sets found; active thresholds: {}; filtered to {filters}",
                pipeline.config().thresholds()
            ),
        }
    } else {
        println!(
            "Sets:\n{}",
            Console::default().render(&print::tabulate_sets(&sets))
        );
    }

    if let Some(path) = &args.output {
        sets.write_json_file(path)?;
        info!("wrote {} sets to {}", sets.len(), path.display());
    }

    let results = if let Some(path) = &args.results {
        Some(FxHashMap::<FixtureId, Score>::read_json_file(path)?)
    } else if args.check {
        Some(download_results(&sets).await?)
    } else {
        None
    };
    if let Some(results) = results {
        println!(
            "Settlement:\n{}",
            Console::default().render(&print::tabulate_settlement(&sets, &results))
        );
    }
    Ok(())
}

async fn read_fixtures(args: &Args) -> Result<Vec<Fixture>, Box<dyn Error>> {
    if let Some(path) = &args.file {
        return Ok(FixtureFile::read(path)?.fixtures);
    }
    if args.download {
        match download_fixtures(args.days).await {
            Ok(fixtures) if !fixtures.is_empty() => return Ok(fixtures),
            Ok(_) => warn!("no fixtures scheduled; falling back to mock fixtures"),
            Err(err) => warn!("download failed: {err}; falling back to mock fixtures"),
        }
    }
    Ok(MockSource::default().rated())
}

fn client() -> anyhow::Result<Client> {
    let token = env::var(TOKEN_VAR).map_err(|_| anyhow!("{TOKEN_VAR} is not set"))?;
    Ok(Client::new(&token, ClientConfig::default())?)
}

async fn download_fixtures(days: u32) -> anyhow::Result<Vec<Fixture>> {
    let client = client()?;
    let today = chrono::Utc::now().date_naive();
    let download = client.download(today, days).await?;
    Ok(data::assemble(&download, &download)?)
}

async fn download_results(sets: &[BetSet]) -> anyhow::Result<FxHashMap<FixtureId, Score>> {
    let mut fixture_ids = sets
        .iter()
        .flat_map(|set| set.legs.iter().map(|leg| leg.fixture_id))
        .collect::<Vec<_>>();
    fixture_ids.sort_unstable();
    fixture_ids.dedup();
    let client = client()?;
    let results = client.final_scores(fixture_ids).await;
    info!("{} fixtures have finished", results.len());
    Ok(results)
}

fn print_markets(pipeline: &Pipeline, fixtures: &[Fixture]) {
    for fixture in fixtures {
        match pipeline.calculator().calculate_fixture(fixture) {
            Ok(markets) => println!(
                "{} ({:.2} : {:.2}):\n{}",
                fixture.label(),
                fixture.home_xg,
                fixture.away_xg,
                Console::default().render(&print::tabulate_markets(
                    &markets,
                    &pipeline.config().bets.margin
                ))
            ),
            Err(err) => warn!("{}: {err}", fixture.label()),
        }
    }
}
