use crate::calendar::{add_months, month_ends_from, ordinal};
use crate::models::{PricePoint, PriceSeries};
use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordinary least squares line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Returns `None` for empty or mismatched inputs. A single point, or
    /// inputs with no spread in `x`, give a flat line through the mean of `y`.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        if xs.is_empty() || xs.len() != ys.len() {
            return None;
        }

        let n = xs.len() as f64;
        let mean_x = xs.iter().sum::<f64>() / n;
        let mean_y = ys.iter().sum::<f64>() / n;

        let (sxy, sxx) = xs
            .iter()
            .zip(ys)
            .fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
                let dx = x - mean_x;
                (sxy + dx * (y - mean_y), sxx + dx * dx)
            });

        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };

        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Mean observed price for one calendar month across all years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAverage {
    pub month: u32,
    pub average_price: f64,
    pub observations: usize,
}

/// Point-in-time price estimates over a historical price series.
///
/// Both regression lines are fitted once, when the model is built:
/// price against ordinal date (used for estimates outside the observed
/// range) and price against record index (used for forward extrapolation).
#[derive(Debug, Clone)]
pub struct PriceModel {
    series: PriceSeries,
    ordinals: Vec<f64>,
    prices: Vec<f64>,
    fit_by_date: LinearFit,
    fit_by_index: LinearFit,
}

impl PriceModel {
    pub fn new(series: PriceSeries) -> Self {
        let ordinals: Vec<f64> = series.points().iter().map(|p| ordinal(p.date)).collect();
        let prices: Vec<f64> = series.points().iter().map(|p| p.price).collect();
        let indices: Vec<f64> = (0..prices.len()).map(|i| i as f64).collect();

        let flat = LinearFit {
            slope: 0.0,
            intercept: series.first().price,
        };
        let fit_by_date = LinearFit::fit(&ordinals, &prices).unwrap_or(flat);
        let fit_by_index = LinearFit::fit(&indices, &prices).unwrap_or(flat);

        debug!(
            "Fitted {} observations: {:.6}/day by date, {:.6}/record by index",
            prices.len(),
            fit_by_date.slope,
            fit_by_index.slope
        );

        Self {
            series,
            ordinals,
            prices,
            fit_by_date,
            fit_by_index,
        }
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn min_date(&self) -> NaiveDate {
        self.series.first().date
    }

    pub fn max_date(&self) -> NaiveDate {
        self.series.last().date
    }

    pub fn fit_by_date(&self) -> LinearFit {
        self.fit_by_date
    }

    pub fn fit_by_index(&self) -> LinearFit {
        self.fit_by_index
    }

    /// Estimate the price on `date`.
    ///
    /// Inside the observed range this interpolates linearly between the two
    /// bracketing observations and returns observed prices exactly. Outside it
    /// evaluates the whole-series regression on ordinal date.
    pub fn estimate_price(&self, date: NaiveDate) -> f64 {
        let x = ordinal(date);

        if date < self.min_date() || date > self.max_date() {
            return self.fit_by_date.predict(x);
        }

        // ordinals[upper - 1] <= x, and upper >= 1 because x >= ordinals[0]
        let upper = self.ordinals.partition_point(|v| *v <= x);
        let lower = upper - 1;

        if self.ordinals[lower] == x || upper >= self.ordinals.len() {
            return self.prices[lower];
        }

        let (x0, x1) = (self.ordinals[lower], self.ordinals[upper]);
        let (y0, y1) = (self.prices[lower], self.prices[upper]);

        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }

    pub fn estimate_curve(&self, dates: &[NaiveDate]) -> Vec<PricePoint> {
        dates
            .iter()
            .map(|date| PricePoint::new(*date, self.estimate_price(*date)))
            .collect()
    }

    /// Forecast `periods` month-end prices after the last observation.
    ///
    /// Observations are treated as equally spaced by record order, so the
    /// forecast for period `k` is the index regression at `len + k`.
    pub fn extrapolate(&self, periods: usize) -> Vec<PricePoint> {
        let start = add_months(self.max_date(), 1);
        let base = self.prices.len();

        month_ends_from(start, periods)
            .into_iter()
            .enumerate()
            .map(|(offset, date)| {
                PricePoint::new(date, self.fit_by_index.predict((base + offset) as f64))
            })
            .collect()
    }

    /// Average observed price per calendar month, months without data omitted.
    pub fn monthly_profile(&self) -> Vec<MonthlyAverage> {
        let mut by_month: BTreeMap<u32, (f64, usize)> = BTreeMap::new();

        for point in self.series.points() {
            let entry = by_month.entry(point.date.month()).or_insert((0.0, 0));
            entry.0 += point.price;
            entry.1 += 1;
        }

        by_month
            .into_iter()
            .map(|(month, (total, observations))| MonthlyAverage {
                month,
                average_price: total / observations as f64,
                observations,
            })
            .collect()
    }
}
