use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pricing_navigator::config::{Config, ConfigOverrides};
use pricing_navigator::economics::{
    margin_snapshot, unit_cost, HumanReview, InferenceCost, LlmPreset, MarginInputs,
    MarginSnapshot, QuoteTerms, UnitCostBreakdown, UnitCostInputs, TARGET_MARGIN_PCT,
};
use pricing_navigator::engine::{
    ClassificationResult, QuoteOutcome, RecommendationResult, ScorecardResult, ValueReport,
};
use pricing_navigator::output::csv::{
    classification_to_csv, comparables_to_csv, recommendations_to_csv, scorecard_to_csv,
    value_metrics_to_csv, value_position_to_csv,
};
use pricing_navigator::output::json::render_json;
use pricing_navigator::output::table::{
    render_catalog_table, render_classification_table, render_comparables_table,
    render_margin_table, render_principles, render_quote_table, render_recommendations_table,
    render_scorecard_table, render_unit_cost_table, render_value_metrics_table,
    render_value_position_table,
};
use pricing_navigator::profile::{load_profile_input, ProfileInput};
use pricing_navigator::reference::{export_builtin, load_catalog, CatalogId, Comparable};
use pricing_navigator::server::run_server;
use pricing_navigator::{BusinessProfile, Engine, Evaluation};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "pricing-navigator",
    about = "Pricing strategy recommendations for AI products"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// JSON or TOML reference tables replacing the built-in dataset.
    #[arg(short, long)]
    reference: Option<String>,
    #[arg(long)]
    threshold: Option<f64>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args, Clone, Default)]
struct ProfileArgs {
    /// Profile record (.json or .toml); flags below are layered on top.
    #[arg(long)]
    profile: Option<PathBuf>,
    #[arg(long)]
    product: Option<String>,
    #[arg(long)]
    customer: Option<String>,
    #[arg(long)]
    stage: Option<String>,
    #[arg(long, value_delimiter = ',')]
    usage: Vec<String>,
    #[arg(long = "capability", value_delimiter = ',')]
    capabilities: Vec<String>,
    /// Numeric cost signal as `name=value`; repeatable.
    #[arg(long = "signal", value_parser = parse_signal)]
    signals: Vec<(String, f64)>,
    #[arg(long)]
    notes: Option<String>,
}

impl ProfileArgs {
    fn build(&self) -> Result<BusinessProfile> {
        let mut input = match &self.profile {
            Some(path) => load_profile_input(path)?,
            None => ProfileInput::default(),
        };
        input.merge(ProfileInput {
            product: self.product.clone(),
            customer_type: self.customer.clone(),
            revenue_stage: self.stage.clone(),
            usage_patterns: self.usage.clone(),
            capabilities: self.capabilities.clone(),
            cost_signals: self.signals.iter().cloned().collect(),
            notes: self.notes.clone(),
        });
        input.validate().context("invalid business profile")
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify the product into a business-model archetype.
    Classify {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Rank value metrics and place the profile on the value framework.
    Values {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Recommend pricing models and list the excluded ones.
    Recommend {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Score pricing health across the checklist dimensions.
    Health {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    Evaluate {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Price the top recommendation (or `--model`) for a deal.
    Quote {
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long)]
        cost: f64,
        #[arg(long, default_value_t = TARGET_MARGIN_PCT)]
        margin: f64,
        #[arg(long = "deal-size")]
        deal_size: f64,
        #[arg(long)]
        model: Option<String>,
    },
    Margin {
        #[arg(long)]
        cost: f64,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        units: f64,
        #[arg(long, default_value_t = 1.0)]
        customers: f64,
    },
    #[command(name = "unit-cost")]
    UnitCost {
        #[arg(long)]
        preset: Option<LlmPreset>,
        #[arg(long)]
        tokens: Option<f64>,
        #[arg(long, default_value_t = 1.0)]
        calls: f64,
        #[arg(long = "cost-per-1k")]
        cost_per_1k: Option<f64>,
        #[arg(long = "monthly-spend")]
        monthly_spend: Option<f64>,
        #[arg(long = "units-per-month")]
        units_per_month: Option<f64>,
        #[arg(long = "review-pct")]
        review_pct: Option<f64>,
        #[arg(long = "review-minutes", default_value_t = 5.0)]
        review_minutes: f64,
        #[arg(long = "hourly-cost", default_value_t = 50.0)]
        hourly_cost: f64,
        #[arg(long, default_value_t = 0.0)]
        infra: f64,
        #[arg(long = "monthly-units", default_value_t = 1000.0)]
        monthly_units: f64,
    },
    /// Comparable AI companies and how they price.
    Comps {
        #[arg(long)]
        archetype: Option<String>,
    },
    /// Summarize the loaded reference data.
    Catalog {
        /// Write the built-in dataset to this path (.json or .toml).
        #[arg(long)]
        export: Option<PathBuf>,
    },
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    let (host, port) = match &cli.command {
        Commands::Serve { host, port } => (host.clone(), *port),
        _ => (None, None),
    };
    config.apply_overrides(ConfigOverrides {
        reference_path: cli.reference.clone(),
        confidence_threshold: cli.threshold,
        host,
        port,
    });

    match &cli.command {
        Commands::Config { init, show } => {
            return handle_config_command(*init, *show, &config, &config_path);
        }
        Commands::Serve { .. } => {
            let bind = config.bind_address();
            let addr: SocketAddr = bind
                .parse()
                .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
            let engine = load_engine(&config)?;
            return run_server(engine, config, addr).await;
        }
        Commands::Margin {
            cost,
            price,
            units,
            customers,
        } => {
            let snapshot = margin_snapshot(&MarginInputs {
                cost_per_unit: *cost,
                price_per_unit: *price,
                units_per_customer: *units,
                customers: *customers,
            })?;
            return print_margin(&snapshot, cli.output);
        }
        Commands::UnitCost {
            preset,
            tokens,
            calls,
            cost_per_1k,
            monthly_spend,
            units_per_month,
            review_pct,
            review_minutes,
            hourly_cost,
            infra,
            monthly_units,
        } => {
            let inference = match (monthly_spend, tokens) {
                (Some(spend), _) => InferenceCost::MonthlyBill {
                    monthly_spend: *spend,
                    units_per_month: units_per_month.unwrap_or(*monthly_units),
                },
                (None, Some(tokens)) => {
                    let rate = match (cost_per_1k, preset) {
                        (Some(rate), _) => *rate,
                        (None, Some(preset)) => preset.cost_per_1k_tokens(),
                        (None, None) => {
                            return Err(anyhow!("--tokens needs --preset or --cost-per-1k"))
                        }
                    };
                    InferenceCost::Tokens {
                        tokens_per_call: *tokens,
                        cost_per_1k_tokens: rate,
                        calls_per_unit: *calls,
                    }
                }
                (None, None) => {
                    return Err(anyhow!(
                        "inference cost needs either --tokens or --monthly-spend"
                    ))
                }
            };
            let breakdown = unit_cost(&UnitCostInputs {
                inference,
                human_review: review_pct.map(|pct| HumanReview {
                    review_pct: pct,
                    minutes_per_review: *review_minutes,
                    hourly_cost: *hourly_cost,
                }),
                monthly_infra: *infra,
                monthly_units: *monthly_units,
            })?;
            return print_unit_cost(&breakdown, cli.output);
        }
        _ => {}
    }

    let engine = load_engine(&config)?;
    match &cli.command {
        Commands::Classify { profile } => {
            let profile = profile.build()?;
            print_classification(&engine.classify(&profile), cli.output)?;
        }
        Commands::Values { profile } => {
            let profile = profile.build()?;
            print_values(&engine.values(&profile), cli.output)?;
        }
        Commands::Recommend { profile } => {
            let profile = profile.build()?;
            let classification = engine.classify(&profile);
            let ranking = engine.map_value_metrics(&profile, &classification);
            let result = engine.recommend(&profile, &classification, &ranking);
            print_recommendations(&result, cli.output)?;
            let archetype = classification.archetype_name();
            if let (OutputFormat::Table, Some(name)) = (cli.output, archetype) {
                let principles = engine.principles(&classification);
                if !principles.is_empty() {
                    println!("{}", render_principles(name, &principles));
                }
            }
        }
        Commands::Health { profile } => {
            let profile = profile.build()?;
            print_scorecard(&engine.score(&profile), cli.output)?;
        }
        Commands::Evaluate { profile } => {
            let profile = profile.build()?;
            print_evaluation(&engine.evaluate(&profile), cli.output)?;
        }
        Commands::Quote {
            profile,
            cost,
            margin,
            deal_size,
            model,
        } => {
            let profile = profile.build()?;
            let terms = QuoteTerms {
                cost_per_unit: *cost,
                target_margin_pct: *margin,
                annual_deal_size: *deal_size,
            };
            let model = model.as_deref().map(|raw| CatalogId::new(raw.trim()));
            let outcome = engine.quote(&profile, &terms, model.as_ref())?;
            print_quote(&outcome, cli.output)?;
        }
        Commands::Comps { archetype } => {
            let archetype = archetype.as_deref().map(|raw| CatalogId::new(raw.trim()));
            if let Some(id) = &archetype {
                if engine.catalog().archetype(id).is_none() {
                    return Err(anyhow!("unknown archetype `{id}`"));
                }
            }
            let comparables: Vec<_> = engine.catalog().comparables_for(archetype.as_ref()).collect();
            print_comparables(&comparables, cli.output)?;
        }
        Commands::Catalog { export } => {
            if let Some(path) = export {
                export_builtin(path)?;
                println!("Wrote built-in reference data to {}", path.display());
            }
            let summary = engine.catalog().summary();
            match cli.output {
                OutputFormat::Table => {
                    println!("{}", render_catalog_table(&summary));
                    println!("Reference data valid.");
                }
                OutputFormat::Json => println!("{}", render_json(&summary)?),
                OutputFormat::Csv => {
                    warn!("CSV output for catalog not implemented, using JSON");
                    println!("{}", render_json(&summary)?);
                }
            }
        }
        Commands::Config { .. }
        | Commands::Serve { .. }
        | Commands::Margin { .. }
        | Commands::UnitCost { .. } => unreachable!("handled before the engine is loaded"),
    }

    Ok(())
}

fn load_engine(config: &Config) -> Result<Engine> {
    let reference_path = config.resolved_reference_path();
    let catalog = load_catalog(reference_path.as_deref())?;
    let engine = Engine::new(catalog, config.engine_settings())
        .context("invalid engine settings in config")?;
    info!(
        reference = %engine.catalog().version(),
        threshold = engine.settings().confidence_threshold,
        "engine ready"
    );
    Ok(engine)
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &Path) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn parse_signal(raw: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for signal `{}`: {e}", name.trim()))?;
    Ok((name.trim().to_string(), value))
}

fn print_classification(result: &ClassificationResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_classification_table(result)),
        OutputFormat::Json => println!("{}", render_json(result)?),
        OutputFormat::Csv => print!("{}", classification_to_csv(result)?),
    }
    Ok(())
}

fn print_values(report: &ValueReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", render_value_metrics_table(&report.value_metrics));
            println!("{}", render_value_position_table(&report.value_position));
        }
        OutputFormat::Json => println!("{}", render_json(report)?),
        OutputFormat::Csv => {
            print!("{}", value_metrics_to_csv(&report.value_metrics)?);
            println!();
            print!("{}", value_position_to_csv(&report.value_position)?);
        }
    }
    Ok(())
}

fn print_recommendations(result: &RecommendationResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_recommendations_table(result)),
        OutputFormat::Json => println!("{}", render_json(result)?),
        OutputFormat::Csv => print!("{}", recommendations_to_csv(result)?),
    }
    Ok(())
}

fn print_scorecard(result: &ScorecardResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_scorecard_table(result)),
        OutputFormat::Json => println!("{}", render_json(result)?),
        OutputFormat::Csv => print!("{}", scorecard_to_csv(result)?),
    }
    Ok(())
}

fn print_evaluation(evaluation: &Evaluation, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", render_classification_table(&evaluation.classification));
            println!("{}", render_value_metrics_table(&evaluation.value_metrics));
            println!("{}", render_value_position_table(&evaluation.value_position));
            println!("{}", render_recommendations_table(&evaluation.recommendation));
            println!("{}", render_scorecard_table(&evaluation.scorecard));
        }
        OutputFormat::Json => println!("{}", render_json(evaluation)?),
        OutputFormat::Csv => {
            warn!("CSV output for evaluate not implemented, using JSON");
            println!("{}", render_json(evaluation)?);
        }
    }
    Ok(())
}

fn print_quote(outcome: &QuoteOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => match &outcome.quote {
            Some(quoted) => println!("{}", render_quote_table(&quoted.name, &quoted.quote)),
            None => println!(
                "{}",
                render_recommendations_table(&outcome.recommendation)
            ),
        },
        OutputFormat::Json => println!("{}", render_json(outcome)?),
        OutputFormat::Csv => {
            warn!("CSV output for quote not implemented, using JSON");
            println!("{}", render_json(outcome)?);
        }
    }
    Ok(())
}

fn print_margin(snapshot: &MarginSnapshot, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_margin_table(snapshot)),
        OutputFormat::Json => println!("{}", render_json(snapshot)?),
        OutputFormat::Csv => {
            warn!("CSV output for margin not implemented, using JSON");
            println!("{}", render_json(snapshot)?);
        }
    }
    Ok(())
}

fn print_unit_cost(breakdown: &UnitCostBreakdown, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_unit_cost_table(breakdown)),
        OutputFormat::Json => println!("{}", render_json(breakdown)?),
        OutputFormat::Csv => {
            warn!("CSV output for unit-cost not implemented, using JSON");
            println!("{}", render_json(breakdown)?);
        }
    }
    Ok(())
}

fn print_comparables(comparables: &[&Comparable], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_comparables_table(comparables)),
        OutputFormat::Json => println!("{}", render_json(comparables)?),
        OutputFormat::Csv => print!("{}", comparables_to_csv(comparables)?),
    }
    Ok(())
}
