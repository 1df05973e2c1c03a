pub mod calendar;
pub mod data_loader;
pub mod error;
pub mod models;
pub mod price_model;
pub mod valuer;

pub use data_loader::DataLoader;
pub use error::{Result, ValuationError};
pub use models::{
    ContractParameters, ContractScenario, ContractValuation, Diagnostic, DiagnosticKind,
    EventKind, PricePoint, PriceSeries, Schedule, StorageEvent,
};
pub use price_model::{LinearFit, MonthlyAverage, PriceModel};
pub use valuer::StorageContractValuer;
