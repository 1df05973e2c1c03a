use crate::error::{Result, ValuationError};
use crate::price_model::PriceModel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(alias = "Dates")]
    pub date: NaiveDate,
    #[serde(alias = "Prices")]
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Observed prices, strictly increasing by date with at least one point.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Validate points that are expected to already be in date order.
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(ValuationError::EmptySeries);
        }

        for (index, pair) in points.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(ValuationError::UnsortedDates {
                    index: index + 1,
                    previous: pair[0].date,
                    current: pair[1].date,
                });
            }
        }

        if let Some(bad) = points.iter().find(|p| !p.price.is_finite()) {
            return Err(ValuationError::NonFinitePrice { date: bad.date });
        }

        Ok(Self { points })
    }

    /// Sort by date, then validate. Duplicate dates are still rejected.
    pub fn sorted(mut points: Vec<PricePoint>) -> Result<Self> {
        points.sort_by_key(|p| p.date);
        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> PricePoint {
        self.points[0]
    }

    pub fn last(&self) -> PricePoint {
        self.points[self.points.len() - 1]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Injection,
    Withdrawal,
}

/// An injection or withdrawal that was committed during a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageEvent {
    pub kind: EventKind,
    pub date: NaiveDate,
    pub unit_price: f64,
    pub rate: f64,
    /// Injection/withdrawal fee plus transportation fee for this operation.
    pub fixed_cost: f64,
}

impl StorageEvent {
    /// Gas value moved by the event: cost for injections, revenue for withdrawals.
    pub fn notional(&self) -> f64 {
        self.rate * self.unit_price
    }
}

/// Serialized form of a [`Schedule`]: parallel date and price lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub dates: Vec<NaiveDate>,
    pub prices: Vec<f64>,
}

/// One side of a contract: dates paired with the unit price on each date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleRecord", into = "ScheduleRecord")]
pub struct Schedule {
    entries: Vec<PricePoint>,
    by_date: BTreeMap<NaiveDate, f64>,
}

impl Schedule {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            by_date: BTreeMap::new(),
        }
    }

    /// Pair `dates[i]` with `prices[i]`.
    pub fn from_parts(dates: &[NaiveDate], prices: &[f64]) -> Result<Self> {
        if dates.len() != prices.len() {
            return Err(ValuationError::ScheduleLengthMismatch {
                dates: dates.len(),
                prices: prices.len(),
            });
        }

        Self::from_points(
            dates
                .iter()
                .zip(prices)
                .map(|(date, price)| PricePoint::new(*date, *price))
                .collect(),
        )
    }

    /// When a date repeats, the first listed price is the one used for lookups.
    pub fn from_points(entries: Vec<PricePoint>) -> Result<Self> {
        if let Some(bad) = entries.iter().find(|p| !p.price.is_finite()) {
            return Err(ValuationError::NonFinitePrice { date: bad.date });
        }

        let mut by_date = BTreeMap::new();
        for entry in &entries {
            by_date.entry(entry.date).or_insert(entry.price);
        }

        Ok(Self { entries, by_date })
    }

    /// Price each date from the model's estimate for that day.
    pub fn priced_by(dates: &[NaiveDate], model: &PriceModel) -> Result<Self> {
        Self::from_points(model.estimate_curve(dates))
    }

    pub fn price_on(&self, date: NaiveDate) -> Option<f64> {
        self.by_date.get(&date).copied()
    }

    pub fn entries(&self) -> &[PricePoint] {
        &self.entries
    }

    /// Distinct scheduled dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.by_date.keys().copied()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.by_date.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.by_date.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<ScheduleRecord> for Schedule {
    type Error = ValuationError;

    fn try_from(record: ScheduleRecord) -> Result<Self> {
        Self::from_parts(&record.dates, &record.prices)
    }
}

impl From<Schedule> for ScheduleRecord {
    fn from(schedule: Schedule) -> Self {
        Self {
            dates: schedule.entries.iter().map(|p| p.date).collect(),
            prices: schedule.entries.iter().map(|p| p.price).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractParameters {
    /// Volume added by one injection (MMBtu).
    pub injection_rate: f64,
    /// Volume removed by one withdrawal (MMBtu).
    pub withdrawal_rate: f64,
    pub max_storage: f64,
    /// Charged once per month-end between first injection and last withdrawal.
    pub storage_cost: f64,
    pub injection_withdrawal_cost: f64,
    pub transportation_cost: f64,
}

impl ContractParameters {
    pub fn new(
        injection_rate: f64,
        withdrawal_rate: f64,
        max_storage: f64,
        storage_cost: f64,
        injection_withdrawal_cost: f64,
        transportation_cost: f64,
    ) -> Self {
        Self {
            injection_rate,
            withdrawal_rate,
            max_storage,
            storage_cost,
            injection_withdrawal_cost,
            transportation_cost,
        }
    }

    /// 1,000,000 MMBtu per operation into 3,000,000 MMBtu of capacity.
    pub fn example() -> Self {
        Self::new(1e6, 1e6, 3e6, 100_000.0, 10_000.0, 50_000.0)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("injection_rate", self.injection_rate),
            ("withdrawal_rate", self.withdrawal_rate),
            ("max_storage", self.max_storage),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ValuationError::InvalidParameter { name, value });
            }
        }

        let non_negative = [
            ("storage_cost", self.storage_cost),
            ("injection_withdrawal_cost", self.injection_withdrawal_cost),
            ("transportation_cost", self.transportation_cost),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ValuationError::InvalidParameter { name, value });
            }
        }

        Ok(())
    }

    /// Fixed fees charged on every committed injection or withdrawal.
    pub fn per_operation_cost(&self) -> f64 {
        self.injection_withdrawal_cost + self.transportation_cost
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    InsufficientCapacity {
        volume: f64,
        max_storage: f64,
        rate: f64,
    },
    InsufficientInventory {
        volume: f64,
        rate: f64,
    },
}

/// A scheduled event that was skipped by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub date: NaiveDate,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::InsufficientCapacity {
                volume,
                max_storage,
                rate,
            } => write!(
                f,
                "Insufficient storage space on {}: holding {:.0} of {:.0}, cannot inject {:.0}",
                self.date, volume, max_storage, rate
            ),
            DiagnosticKind::InsufficientInventory { volume, rate } => write!(
                f,
                "Insufficient gas stored on {}: holding {:.0}, cannot withdraw {:.0}",
                self.date, volume, rate
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractValuation {
    pub value: f64,

    pub sale_revenue: f64,
    pub purchase_cost: f64,
    pub storage_cost: f64,
    pub storage_months: u32,
    pub injection_withdrawal_cost: f64,
    pub transportation_cost: f64,

    pub final_volume: f64,
    pub events: Vec<StorageEvent>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ContractValuation {
    pub fn total_costs(&self) -> f64 {
        self.purchase_cost
            + self.storage_cost
            + self.injection_withdrawal_cost
            + self.transportation_cost
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }
}

/// Everything needed to value one contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractScenario {
    pub injections: Schedule,
    pub withdrawals: Schedule,
    pub parameters: ContractParameters,
}

impl ContractScenario {
    /// Three May injections at 2.0/2.1/2.2 and three November withdrawals at 3.0/3.1/3.2.
    pub fn example() -> Result<Self> {
        let date = |month, day| {
            NaiveDate::from_ymd_opt(2023, month, day).ok_or_else(|| ValuationError::DateParse {
                value: format!("2023-{:02}-{:02}", month, day),
            })
        };

        let injections =
            Schedule::from_parts(&[date(5, 1)?, date(5, 2)?, date(5, 3)?], &[2.0, 2.1, 2.2])?;
        let withdrawals =
            Schedule::from_parts(&[date(11, 1)?, date(11, 2)?, date(11, 3)?], &[3.0, 3.1, 3.2])?;

        Ok(Self {
            injections,
            withdrawals,
            parameters: ContractParameters::example(),
        })
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
