use anyhow::Result;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use storage_valuer::{MonthlyAverage, PriceModel, PricePoint};

use crate::price_report::{load_model, month_name};

pub struct PriceVisualizer {
    output_dir: PathBuf,
}

impl PriceVisualizer {
    pub fn new(output_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(output_dir)?;

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    pub fn generate_all_visualizations(&self, model: &PriceModel, months: usize) -> Result<()> {
        println!("📊 Generating Natural Gas Price Charts");
        println!("{}", "=".repeat(60));

        let forecast = model.extrapolate(months);
        self.generate_price_history_chart(model.series().points(), &forecast)?;
        self.generate_seasonality_chart(&model.monthly_profile())?;

        Ok(())
    }

    fn generate_price_history_chart(&self, history: &[PricePoint], forecast: &[PricePoint]) -> Result<()> {
        println!("\n📈 Generating price history and forecast chart...");

        let output_path = self.output_dir.join("price_forecast.png");
        let root = BitMapBackend::new(&output_path, (1000, 600)).into_drawing_area();
        root.fill(&WHITE)?;

        let all_points = || history.iter().chain(forecast.iter());
        let (Some(first), Some(last)) = (all_points().next(), all_points().last()) else {
            return Ok(());
        };

        let min_price = all_points().map(|p| p.price).fold(f64::INFINITY, f64::min);
        let max_price = all_points().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
        let padding = ((max_price - min_price) * 0.1).max(0.1);

        let mut chart = ChartBuilder::on(&root)
            .caption("Natural Gas Price Forecast", ("sans-serif", 30).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(first.date..last.date, (min_price - padding)..(max_price + padding))?;

        chart.configure_mesh()
            .x_desc("Date")
            .y_desc("Price")
            .draw()?;

        chart.draw_series(LineSeries::new(history.iter().map(|p| (p.date, p.price)), &BLUE))?
            .label("Historical Prices")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &BLUE));

        chart.draw_series(history.iter().map(|p| Circle::new((p.date, p.price), 3, BLUE.filled())))?;

        if !forecast.is_empty() {
            chart.draw_series(LineSeries::new(forecast.iter().map(|p| (p.date, p.price)), &RED))?
                .label("Extrapolated Prices")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &RED));

            chart.draw_series(forecast.iter().map(|p| Cross::new((p.date, p.price), 4, &RED)))?;
        }

        chart.configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        println!("  Saved {:?}", output_path);

        Ok(())
    }

    fn generate_seasonality_chart(&self, profile: &[MonthlyAverage]) -> Result<()> {
        println!("\n🗓️  Generating monthly seasonality chart...");

        if profile.is_empty() {
            return Ok(());
        }

        let output_path = self.output_dir.join("monthly_seasonality.png");
        let root = BitMapBackend::new(&output_path, (800, 500)).into_drawing_area();
        root.fill(&WHITE)?;

        let max_price = profile.iter().map(|m| m.average_price).fold(0.0, f64::max);

        let mut chart = ChartBuilder::on(&root)
            .caption("Average Natural Gas Prices by Month", ("sans-serif", 30).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((1u32..13u32).into_segmented(), 0.0..(max_price * 1.1))?;

        chart.configure_mesh()
            .disable_x_mesh()
            .x_desc("Month")
            .y_desc("Average Price")
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(m) | SegmentValue::Exact(m) => month_name(*m).to_string(),
                SegmentValue::Last => String::new(),
            })
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.mix(0.7).filled())
                .margin(8)
                .data(profile.iter().map(|m| (m.month, m.average_price))),
        )?;

        root.present()?;
        println!("  Saved {:?}", output_path);

        Ok(())
    }
}

pub fn generate_price_charts(csv_path: &Path, output_dir: &Path, months: usize) -> Result<()> {
    let model = load_model(csv_path)?;
    let visualizer = PriceVisualizer::new(output_dir)?;
    visualizer.generate_all_visualizations(&model, months)
}
