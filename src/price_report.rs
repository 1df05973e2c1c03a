use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use storage_valuer::{DataLoader, MonthlyAverage, PriceModel, PricePoint};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Serialize)]
struct ForecastRow {
    #[serde(rename = "Dates")]
    date: String,
    #[serde(rename = "Prices")]
    price: f64,
}

pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("???")
}

pub fn load_model(csv_path: &Path) -> Result<PriceModel> {
    let series = DataLoader::default()
        .load_series(csv_path)
        .with_context(|| format!("Failed to load price table {:?}", csv_path))?;
    Ok(PriceModel::new(series))
}

/// Print seasonality and forecast tables, and write both as CSV into `output_dir`.
pub fn generate_price_report(csv_path: &Path, output_dir: &Path, months: usize) -> Result<()> {
    println!("📈 Natural Gas Price Report");
    println!("{}", "=".repeat(60));

    let model = load_model(csv_path)?;
    println!(
        "Loaded {} observations from {} to {}",
        model.series().len(),
        model.min_date(),
        model.max_date()
    );

    let profile = model.monthly_profile();
    print_monthly_profile(&profile);

    let forecast = model.extrapolate(months);
    print_forecast(&model, &forecast);

    std::fs::create_dir_all(output_dir)?;
    write_monthly_profile(&profile, &output_dir.join("monthly_profile.csv"))?;
    write_forecast(&forecast, &output_dir.join("forecast.csv"))?;

    println!("\n✅ Report written to {:?}", output_dir);
    Ok(())
}

fn print_monthly_profile(profile: &[MonthlyAverage]) {
    println!("\n🗓️  Average Price by Month");
    println!("{}", "-".repeat(40));

    let overall = profile.iter().map(|m| m.average_price).sum::<f64>() / profile.len().max(1) as f64;

    for month in profile {
        let premium = month.average_price - overall;
        println!(
            "  {}  {:>8.3}  {:>+7.3}  ({} obs)",
            month_name(month.month),
            month.average_price,
            premium,
            month.observations
        );
    }
}

fn print_forecast(model: &PriceModel, forecast: &[PricePoint]) {
    let fit = model.fit_by_index();

    println!("\n🔮 Linear Forecast ({:+.4} per month)", fit.slope);
    println!("{}", "-".repeat(40));
    for point in forecast {
        println!("  {}  {:>8.3}", point.date, point.price);
    }
}

fn write_monthly_profile(profile: &[MonthlyAverage], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for month in profile {
        writer.serialize(month)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_forecast(forecast: &[PricePoint], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for point in forecast {
        writer.serialize(ForecastRow {
            date: point.date.format("%m/%d/%y").to_string(),
            price: point.price,
        })?;
    }
    writer.flush()?;
    Ok(())
}
