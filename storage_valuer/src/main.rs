use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::path::PathBuf;
use storage_valuer::data_loader::parse_date;
use storage_valuer::{ContractScenario, DataLoader, PriceModel, Schedule};

#[derive(Parser)]
#[command(name = "storage_valuer")]
#[command(about = "Estimate natural gas prices and value storage contracts")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary", global = true)]
    output: OutputFormat,

    /// Name of the date column in the price table
    #[arg(long, default_value = "Dates", global = true)]
    date_column: String,

    /// Name of the price column in the price table
    #[arg(long, default_value = "Prices", global = true)]
    price_column: String,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate the price on a date (YYYY-MM-DD)
    Estimate {
        #[arg(short, long)]
        data: PathBuf,

        #[arg(long)]
        date: String,
    },

    /// Forecast month-end prices after the last observation
    Extrapolate {
        #[arg(short, long)]
        data: PathBuf,

        #[arg(short, long, default_value = "12")]
        months: usize,
    },

    /// Value a storage contract described by a JSON scenario
    Value {
        /// Scenario JSON with injections, withdrawals and parameters
        #[arg(short, long, required_unless_present = "example", conflicts_with = "example")]
        scenario: Option<PathBuf>,

        /// Value the built-in May/November example contract
        #[arg(long)]
        example: bool,

        /// Re-price both schedules from this price table before valuing
        #[arg(long)]
        reprice_from: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
    Summary,
}

fn load_model(args: &Args, path: &PathBuf) -> Result<PriceModel> {
    let loader = DataLoader::new(&args.date_column, &args.price_column);
    let series = loader
        .load_series(path)
        .with_context(|| format!("Failed to load prices from {:?}", path))?;
    Ok(PriceModel::new(series))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match &args.command {
        Command::Estimate { data, date } => {
            let model = load_model(&args, data)?;
            let date = parse_date(date)?;
            let price = model.estimate_price(date);

            match args.output {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "date": date, "price": price }));
                }
                OutputFormat::Csv => {
                    println!("Date,Price");
                    println!("{},{:.4}", date, price);
                }
                OutputFormat::Summary => {
                    let method = if date < model.min_date() || date > model.max_date() {
                        "regression"
                    } else {
                        "interpolation"
                    };
                    println!("Estimated price on {}: {:.4} ({})", date, price, method);
                }
            }
        }
        Command::Extrapolate { data, months } => {
            let model = load_model(&args, data)?;
            let forecast = model.extrapolate(*months);
            info!("Extrapolated {} months after {}", forecast.len(), model.max_date());

            match args.output {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&forecast)?);
                }
                OutputFormat::Csv => {
                    println!("Date,Price");
                    for point in &forecast {
                        println!("{},{:.4}", point.date, point.price);
                    }
                }
                OutputFormat::Summary => {
                    let fit = model.fit_by_index();
                    println!("Price Forecast");
                    println!("==============");
                    println!("Trend: {:+.4} per period from {:.4}", fit.slope, fit.intercept);
                    for point in &forecast {
                        println!("  {}: {:.4}", point.date, point.price);
                    }
                }
            }
        }
        Command::Value {
            scenario,
            example,
            reprice_from,
        } => {
            let mut contract = match scenario {
                Some(path) if !*example => ContractScenario::from_json_file(path)
                    .with_context(|| format!("Failed to read scenario {:?}", path))?,
                _ => ContractScenario::example()?,
            };

            if let Some(path) = reprice_from {
                let model = load_model(&args, path)?;
                let injection_dates: Vec<_> = contract.injections.dates().collect();
                let withdrawal_dates: Vec<_> = contract.withdrawals.dates().collect();
                contract.injections = Schedule::priced_by(&injection_dates, &model)?;
                contract.withdrawals = Schedule::priced_by(&withdrawal_dates, &model)?;
            }

            let valuation = contract.valuate()?;

            match args.output {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&valuation)?);
                }
                OutputFormat::Csv => {
                    println!("Kind,Date,UnitPrice,Rate,FixedCost");
                    for event in &valuation.events {
                        println!(
                            "{:?},{},{:.4},{:.0},{:.2}",
                            event.kind, event.date, event.unit_price, event.rate, event.fixed_cost
                        );
                    }
                }
                OutputFormat::Summary => {
                    println!("Storage Contract Valuation");
                    println!("==========================");
                    println!("Sale revenue:        ${:>16.2}", valuation.sale_revenue);
                    println!("Purchase cost:       ${:>16.2}", valuation.purchase_cost);
                    println!(
                        "Storage cost:        ${:>16.2} ({} months)",
                        valuation.storage_cost, valuation.storage_months
                    );
                    println!("Injection/withdrawal:${:>16.2}", valuation.injection_withdrawal_cost);
                    println!("Transportation:      ${:>16.2}", valuation.transportation_cost);
                    println!();
                    println!("The value of the contract is: ${:.2}", valuation.value);

                    if !valuation.diagnostics.is_empty() {
                        println!();
                        println!("Skipped events:");
                        for diagnostic in &valuation.diagnostics {
                            println!("  {}", diagnostic);
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
