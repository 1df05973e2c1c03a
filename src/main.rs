use anyhow::Result;
use std::path::PathBuf;

mod batch_valuation;
mod price_report;
mod price_visualization;

const DEFAULT_FORECAST_MONTHS: usize = 12;

fn print_usage() {
    println!("Usage:");
    println!("  --report <prices.csv> [output_dir] [months]   Seasonality and forecast tables");
    println!("  --plot <prices.csv> [output_dir] [months]     Price history and seasonality charts");
    println!("  --batch <scenario_glob> [output_dir]          Value contract scenarios in parallel");
    println!("  --example                                     Value the May/November example contract");
}

fn main() -> Result<()> {
    env_logger::init();

    // Set Rayon to use all available cores
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_cpus::get())
        .build_global()?;

    let args: Vec<String> = std::env::args().collect();

    let output_dir = |idx: usize, default: &str| {
        PathBuf::from(args.get(idx).map(String::as_str).unwrap_or(default))
    };
    let months = |idx: usize| {
        args.get(idx)
            .and_then(|m| m.parse().ok())
            .unwrap_or(DEFAULT_FORECAST_MONTHS)
    };

    if args.len() > 2 && args[1] == "--report" {
        let input = PathBuf::from(&args[2]);
        price_report::generate_price_report(&input, &output_dir(3, "price_report"), months(4))?;
    } else if args.len() > 2 && args[1] == "--plot" {
        let input = PathBuf::from(&args[2]);
        price_visualization::generate_price_charts(&input, &output_dir(3, "price_report/charts"), months(4))?;
    } else if args.len() > 2 && args[1] == "--batch" {
        batch_valuation::value_all_scenarios(&args[2], &output_dir(3, "contract_valuations"))?;
    } else if args.len() > 1 && args[1] == "--example" {
        let valuation = storage_valuer::ContractScenario::example()?.valuate()?;
        for diagnostic in &valuation.diagnostics {
            println!("{}", diagnostic);
        }
        println!("The value of the contract is: ${:.2}", valuation.value);
    } else {
        print_usage();
    }

    Ok(())
}
