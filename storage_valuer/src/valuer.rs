use crate::calendar::count_month_ends;
use crate::error::Result;
use crate::models::{
    ContractParameters, ContractScenario, ContractValuation, Diagnostic, DiagnosticKind,
    EventKind, Schedule, StorageEvent,
};
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::BTreeSet;

/// Running totals while walking the event timeline.
#[derive(Debug, Default)]
struct SimulationState {
    volume: f64,
    purchase_cost: f64,
    sale_revenue: f64,
    injection_withdrawal_cost: f64,
    transportation_cost: f64,
    events: Vec<StorageEvent>,
    diagnostics: Vec<Diagnostic>,
}

impl SimulationState {
    fn charge_operation(&mut self, params: &ContractParameters) {
        self.injection_withdrawal_cost += params.injection_withdrawal_cost;
        self.transportation_cost += params.transportation_cost;
    }

    fn skip(&mut self, date: NaiveDate, kind: DiagnosticKind) {
        let diagnostic = Diagnostic { date, kind };
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

/// Values an injection/withdrawal storage contract by simulating the
/// scheduled events in date order.
pub struct StorageContractValuer {
    params: ContractParameters,
}

impl StorageContractValuer {
    pub fn new(params: ContractParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn parameters(&self) -> &ContractParameters {
        &self.params
    }

    /// Net contract value: revenue minus purchases, storage and per-operation fees.
    pub fn value(&self, injections: &Schedule, withdrawals: &Schedule) -> f64 {
        self.valuate(injections, withdrawals).value
    }

    /// Run the simulation and return the full cash-flow breakdown.
    pub fn valuate(&self, injections: &Schedule, withdrawals: &Schedule) -> ContractValuation {
        let timeline: BTreeSet<NaiveDate> = injections.dates().chain(withdrawals.dates()).collect();
        let mut state = SimulationState::default();

        for date in timeline {
            // same-day injection is settled before the withdrawal
            if let Some(price) = injections.price_on(date) {
                self.inject(&mut state, date, price);
            }
            if let Some(price) = withdrawals.price_on(date) {
                self.withdraw(&mut state, date, price);
            }
        }

        let storage_months = self.storage_months(injections, withdrawals);
        let storage_cost = self.params.storage_cost * storage_months as f64;

        let value = state.sale_revenue
            - state.purchase_cost
            - storage_cost
            - state.injection_withdrawal_cost
            - state.transportation_cost;

        info!(
            "Valued contract at {:.2} ({} injections, {} withdrawals, {} skipped, {} storage months)",
            value,
            state.events.iter().filter(|e| e.kind == EventKind::Injection).count(),
            state.events.iter().filter(|e| e.kind == EventKind::Withdrawal).count(),
            state.diagnostics.len(),
            storage_months
        );

        ContractValuation {
            value,
            sale_revenue: state.sale_revenue,
            purchase_cost: state.purchase_cost,
            storage_cost,
            storage_months,
            injection_withdrawal_cost: state.injection_withdrawal_cost,
            transportation_cost: state.transportation_cost,
            final_volume: state.volume,
            events: state.events,
            diagnostics: state.diagnostics,
        }
    }

    fn inject(&self, state: &mut SimulationState, date: NaiveDate, price: f64) {
        let rate = self.params.injection_rate;

        if state.volume > self.params.max_storage - rate {
            state.skip(
                date,
                DiagnosticKind::InsufficientCapacity {
                    volume: state.volume,
                    max_storage: self.params.max_storage,
                    rate,
                },
            );
            return;
        }

        state.volume += rate;
        state.purchase_cost += rate * price;
        state.charge_operation(&self.params);
        state.events.push(StorageEvent {
            kind: EventKind::Injection,
            date,
            unit_price: price,
            rate,
            fixed_cost: self.params.per_operation_cost(),
        });

        debug!("{}: injected {:.0} at {:.4}, holding {:.0}", date, rate, price, state.volume);
    }

    fn withdraw(&self, state: &mut SimulationState, date: NaiveDate, price: f64) {
        let rate = self.params.withdrawal_rate;

        if state.volume < rate {
            state.skip(
                date,
                DiagnosticKind::InsufficientInventory {
                    volume: state.volume,
                    rate,
                },
            );
            return;
        }

        state.volume -= rate;
        state.sale_revenue += rate * price;
        state.charge_operation(&self.params);
        state.events.push(StorageEvent {
            kind: EventKind::Withdrawal,
            date,
            unit_price: price,
            rate,
            fixed_cost: self.params.per_operation_cost(),
        });

        debug!("{}: withdrew {:.0} at {:.4}, holding {:.0}", date, rate, price, state.volume);
    }

    /// Month-ends between the first injection and the last withdrawal.
    /// Zero when either side of the contract has no dates.
    fn storage_months(&self, injections: &Schedule, withdrawals: &Schedule) -> u32 {
        match (injections.first_date(), withdrawals.last_date()) {
            (Some(first), Some(last)) => count_month_ends(first, last),
            _ => 0,
        }
    }
}

/// Value a contract in one call: validates `params`, then simulates.
pub fn value(injections: &Schedule, withdrawals: &Schedule, params: &ContractParameters) -> Result<f64> {
    let valuer = StorageContractValuer::new(params.clone())?;
    Ok(valuer.value(injections, withdrawals))
}

impl ContractScenario {
    pub fn valuate(&self) -> Result<ContractValuation> {
        let valuer = StorageContractValuer::new(self.parameters.clone())?;
        Ok(valuer.valuate(&self.injections, &self.withdrawals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValuationError;
    use crate::models::PricePoint;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule(points: &[(NaiveDate, f64)]) -> Schedule {
        Schedule::from_points(points.iter().map(|(d, p)| PricePoint::new(*d, *p)).collect()).unwrap()
    }

    #[test]
    fn test_example_contract_value() {
        let valuation = ContractScenario::example().unwrap().valuate().unwrap();

        assert!((valuation.sale_revenue - 9_300_000.0).abs() < 1e-6);
        assert!((valuation.purchase_cost - 6_300_000.0).abs() < 1e-6);
        assert_eq!(valuation.storage_months, 6);
        assert!((valuation.storage_cost - 600_000.0).abs() < 1e-6);
        assert!((valuation.injection_withdrawal_cost - 60_000.0).abs() < 1e-6);
        assert!((valuation.transportation_cost - 300_000.0).abs() < 1e-6);
        assert!((valuation.value - 2_040_000.0).abs() < 1e-6);

        assert_eq!(valuation.final_volume, 0.0);
        assert_eq!(valuation.events.len(), 6);
        assert!(valuation.diagnostics.is_empty());
    }

    #[test]
    fn test_over_capacity_injection_is_skipped() {
        let mut params = ContractParameters::example();
        params.max_storage = 2e6;
        let valuer = StorageContractValuer::new(params).unwrap();

        let injections = schedule(&[
            (date(2023, 5, 1), 2.0),
            (date(2023, 5, 2), 2.1),
            (date(2023, 5, 3), 2.2),
        ]);
        let valuation = valuer.valuate(&injections, &Schedule::empty());

        assert_eq!(valuation.final_volume, 2e6);
        assert!((valuation.purchase_cost - 1e6 * (2.0 + 2.1)).abs() < 1e-6);
        assert!((valuation.injection_withdrawal_cost - 20_000.0).abs() < 1e-9);
        assert!((valuation.transportation_cost - 100_000.0).abs() < 1e-9);
        assert_eq!(valuation.diagnostics.len(), 1);
        assert_eq!(valuation.diagnostics[0].date, date(2023, 5, 3));
        assert!(matches!(
            valuation.diagnostics[0].kind,
            DiagnosticKind::InsufficientCapacity { .. }
        ));
        assert!(valuation.diagnostics[0].to_string().contains("2023-05-03"));
    }

    #[test]
    fn test_injection_filling_exactly_to_capacity_is_allowed() {
        let mut params = ContractParameters::example();
        params.max_storage = 1e6;
        let valuer = StorageContractValuer::new(params).unwrap();

        let valuation = valuer.valuate(&schedule(&[(date(2023, 5, 1), 2.0)]), &Schedule::empty());
        assert_eq!(valuation.final_volume, 1e6);
        assert!(valuation.diagnostics.is_empty());
    }

    #[test]
    fn test_withdrawal_without_inventory_is_skipped() {
        let valuer = StorageContractValuer::new(ContractParameters::example()).unwrap();
        let injections = schedule(&[(date(2023, 5, 2), 2.0)]);
        let withdrawals = schedule(&[(date(2023, 5, 1), 3.0), (date(2023, 6, 1), 3.5)]);

        let valuation = valuer.valuate(&injections, &withdrawals);

        assert_eq!(valuation.diagnostics.len(), 1);
        assert_eq!(valuation.diagnostics[0].date, date(2023, 5, 1));
        assert!(matches!(
            valuation.diagnostics[0].kind,
            DiagnosticKind::InsufficientInventory { .. }
        ));
        assert_eq!(valuation.count(EventKind::Withdrawal), 1);
        assert!((valuation.sale_revenue - 3.5e6).abs() < 1e-6);
        // May 31 only
        assert_eq!(valuation.storage_months, 1);
    }

    #[test]
    fn test_same_day_injection_settles_before_withdrawal() {
        let valuer = StorageContractValuer::new(ContractParameters::example()).unwrap();
        let injections = schedule(&[(date(2023, 7, 1), 2.0)]);
        let withdrawals = schedule(&[(date(2023, 7, 1), 2.5)]);

        let valuation = valuer.valuate(&injections, &withdrawals);

        assert!(valuation.diagnostics.is_empty());
        assert_eq!(valuation.events[0].kind, EventKind::Injection);
        assert_eq!(valuation.events[1].kind, EventKind::Withdrawal);
        assert_eq!(valuation.storage_months, 0);
        let expected = 2.5e6 - 2.0e6 - 2.0 * 60_000.0;
        assert!((valuation.value - expected).abs() < 1e-6);
    }

    #[test]
    fn test_repeated_date_uses_first_price_once() {
        let valuer = StorageContractValuer::new(ContractParameters::example()).unwrap();
        let injections = schedule(&[(date(2023, 5, 1), 2.0), (date(2023, 5, 1), 9.0)]);

        let valuation = valuer.valuate(&injections, &Schedule::empty());

        assert_eq!(valuation.count(EventKind::Injection), 1);
        assert!((valuation.purchase_cost - 2e6).abs() < 1e-6);
    }

    #[test]
    fn test_empty_schedules_have_no_storage_months() {
        let valuer = StorageContractValuer::new(ContractParameters::example()).unwrap();
        let injections = schedule(&[(date(2023, 5, 1), 2.0)]);

        let only_injections = valuer.valuate(&injections, &Schedule::empty());
        assert_eq!(only_injections.storage_months, 0);
        assert!((only_injections.value + 2e6 + 60_000.0).abs() < 1e-6);

        let nothing = valuer.valuate(&Schedule::empty(), &Schedule::empty());
        assert_eq!(nothing.value, 0.0);
        assert!(nothing.events.is_empty());
    }

    #[test]
    fn test_value_rejects_invalid_parameters() {
        let mut params = ContractParameters::example();
        params.injection_rate = -1.0;
        let result = value(&Schedule::empty(), &Schedule::empty(), &params);
        assert!(matches!(
            result,
            Err(ValuationError::InvalidParameter { name: "injection_rate", .. })
        ));
    }

    #[test]
    fn test_free_function_matches_valuer() {
        let scenario = ContractScenario::example().unwrap();
        let direct = value(&scenario.injections, &scenario.withdrawals, &scenario.parameters).unwrap();
        assert!((direct - 2_040_000.0).abs() < 1e-6);
    }
}
