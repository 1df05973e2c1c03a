use crate::error::{Result, ValuationError};
use crate::models::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use log::{info, warn};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DATE_FORMATS: [&str; 3] = ["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"];

/// Parse `10/31/20`, `10/31/2020` or `2020-10-31`.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| ValuationError::DateParse {
            value: trimmed.to_string(),
        })
}

/// Reads a two-column date/price table into a sorted [`PriceSeries`].
pub struct DataLoader {
    date_column: String,
    price_column: String,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new("Dates", "Prices")
    }
}

impl DataLoader {
    pub fn new(date_column: &str, price_column: &str) -> Self {
        Self {
            date_column: date_column.to_string(),
            price_column: price_column.to_string(),
        }
    }

    pub fn load_series<P: AsRef<Path>>(&self, path: P) -> Result<PriceSeries> {
        let file = File::open(path.as_ref())?;
        let series = self.read_series(file)?;

        info!(
            "Loaded {} prices from {} ({} to {})",
            series.len(),
            path.as_ref().display(),
            series.first().date,
            series.last().date
        );

        Ok(series)
    }

    /// Rows with a blank date or price are skipped; anything else that
    /// fails to parse is an error.
    pub fn read_series<R: Read>(&self, reader: R) -> Result<PriceSeries> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let date_idx = self.column_index(&headers, &self.date_column)?;
        let price_idx = self.column_index(&headers, &self.price_column)?;

        let mut points = Vec::new();

        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;

            match (record.get(date_idx), record.get(price_idx)) {
                (Some(date), Some(price)) if !date.is_empty() && !price.is_empty() => {
                    let date = parse_date(date)?;
                    let price = price.parse::<f64>().map_err(|_| ValuationError::PriceParse {
                        value: price.to_string(),
                    })?;
                    points.push(PricePoint::new(date, price));
                }
                _ => warn!("Skipping incomplete price row {}", row + 1),
            }
        }

        PriceSeries::sorted(points)
    }

    fn column_index(&self, headers: &csv::StringRecord, name: &str) -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ValuationError::MissingColumn {
                name: name.to_string(),
            })
    }
}
