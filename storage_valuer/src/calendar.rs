use chrono::{Datelike, Months, NaiveDate};

/// Day count with 0001-01-01 as day 1.
pub fn ordinal(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next_first| next_first.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Same day `months` later, clamped to the last day of a shorter month.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Number of month-end dates falling inside the closed interval `[start, end]`.
pub fn count_month_ends(start: NaiveDate, end: NaiveDate) -> u32 {
    if start > end {
        return 0;
    }

    let months_between = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    let closing = if end == month_end(end) { 1 } else { 0 };

    months_between as u32 + closing
}

/// `count` consecutive month-ends, the first being the month-end on or after `start`.
pub fn month_ends_from(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut current = month_end(start);

    for _ in 0..count {
        dates.push(current);
        current = match current.succ_opt() {
            Some(next) => month_end(next),
            None => break,
        };
    }

    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_end() {
        assert_eq!(month_end(date(2024, 2, 10)), date(2024, 2, 29));
        assert_eq!(month_end(date(2023, 2, 1)), date(2023, 2, 28));
        assert_eq!(month_end(date(2023, 12, 31)), date(2023, 12, 31));
    }

    #[test]
    fn test_add_months_clamps() {
        assert_eq!(add_months(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(add_months(date(2024, 9, 30), 1), date(2024, 10, 30));
    }

    #[test]
    fn test_count_month_ends() {
        // May 31 through Oct 31
        assert_eq!(count_month_ends(date(2023, 5, 1), date(2023, 11, 3)), 6);
        assert_eq!(count_month_ends(date(2023, 5, 31), date(2023, 5, 31)), 1);
        assert_eq!(count_month_ends(date(2023, 5, 2), date(2023, 5, 30)), 0);
        assert_eq!(count_month_ends(date(2023, 11, 3), date(2023, 5, 1)), 0);
        assert_eq!(count_month_ends(date(2022, 12, 15), date(2024, 1, 31)), 14);
    }

    #[test]
    fn test_month_ends_from() {
        let dates = month_ends_from(date(2024, 10, 30), 4);
        assert_eq!(
            dates,
            vec![
                date(2024, 10, 31),
                date(2024, 11, 30),
                date(2024, 12, 31),
                date(2025, 1, 31)
            ]
        );
        assert!(month_ends_from(date(2024, 10, 30), 0).is_empty());
    }

    #[test]
    fn test_ordinal_matches_common_era_count() {
        assert_eq!(ordinal(date(1, 1, 1)), 1.0);
        assert_eq!(ordinal(date(2020, 1, 2)) - ordinal(date(2020, 1, 1)), 1.0);
    }
}
