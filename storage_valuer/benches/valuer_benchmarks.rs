use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use storage_valuer::{
    ContractParameters, PriceModel, PricePoint, PriceSeries, Schedule, StorageContractValuer,
};

fn monthly_series(months: usize) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2010, 1, 31).unwrap();
    let dates = storage_valuer::calendar::month_ends_from(start, months);

    let points = dates
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let seasonal = ((i % 12) as f64 / 12.0 * std::f64::consts::TAU).cos();
            PricePoint::new(date, 10.0 + 0.02 * i as f64 + seasonal)
        })
        .collect();

    PriceSeries::new(points).unwrap()
}

fn benchmark_estimate_price(c: &mut Criterion) {
    let model = PriceModel::new(monthly_series(240));
    let inside = NaiveDate::from_ymd_opt(2015, 6, 14).unwrap();
    let outside = NaiveDate::from_ymd_opt(2035, 6, 14).unwrap();

    c.bench_function("estimate_price_interpolated", |b| {
        b.iter(|| black_box(model.estimate_price(black_box(inside))));
    });

    c.bench_function("estimate_price_regression", |b| {
        b.iter(|| black_box(model.estimate_price(black_box(outside))));
    });
}

fn benchmark_model_fit(c: &mut Criterion) {
    let series = monthly_series(240);

    c.bench_function("fit_price_model_240", |b| {
        b.iter(|| black_box(PriceModel::new(series.clone())));
    });
}

fn benchmark_contract_valuation(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    let injection_dates: Vec<_> = (0..180).map(|d| start + Duration::days(d)).collect();
    let withdrawal_dates: Vec<_> = (180..365).map(|d| start + Duration::days(d)).collect();

    let model = PriceModel::new(monthly_series(240));
    let injections = Schedule::priced_by(&injection_dates, &model).unwrap();
    let withdrawals = Schedule::priced_by(&withdrawal_dates, &model).unwrap();

    let params = ContractParameters::new(1e5, 1e5, 1e7, 50_000.0, 1_000.0, 2_000.0);
    let valuer = StorageContractValuer::new(params).unwrap();

    c.bench_function("value_daily_contract_one_year", |b| {
        b.iter(|| black_box(valuer.valuate(&injections, &withdrawals)));
    });
}

criterion_group!(
    benches,
    benchmark_estimate_price,
    benchmark_model_fit,
    benchmark_contract_valuation
);
criterion_main!(benches);
