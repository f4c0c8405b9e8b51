mod common;

use common::{date, dec, sample_table};
use rust_decimal::Decimal;
use sales_dashboard::data::{FilterCriteria, SalesRecord, SalesTable};
use sales_dashboard::stats::{Aggregator, GroupKey, Period};
use std::collections::BTreeMap;

#[test]
fn sums_by_category() {
    let table = SalesTable::from_records(vec![
        SalesRecord::new(date(2024, 1, 1), dec("60"), "A"),
        SalesRecord::new(date(2024, 1, 2), dec("50"), "B"),
        SalesRecord::new(date(2024, 1, 3), dec("40"), "A"),
    ]);

    let result = Aggregator::aggregate(&table, GroupKey::Category);
    let expected: BTreeMap<String, Decimal> =
        [("A".to_string(), dec("100")), ("B".to_string(), dec("50"))].into();
    assert_eq!(result.sums(), expected);

    let a = result.get("A").unwrap();
    assert_eq!(a.count, 2);
    assert_eq!(a.mean, Some(dec("50")));
}

#[test]
fn group_sums_add_up_to_total() {
    let table = sample_table();
    let total: Decimal = table.iter().map(|r| r.amount).sum();

    for key in [
        GroupKey::Category,
        GroupKey::Region,
        GroupKey::Customer,
        GroupKey::Period(Period::Day),
        GroupKey::Period(Period::Week),
        GroupKey::Period(Period::Month),
    ] {
        let result = Aggregator::aggregate(&table, key);
        assert_eq!(result.total(), total, "{key:?}");
        assert_eq!(result.count(), table.len() as u64, "{key:?}");
    }
}

#[test]
fn missing_region_groups_as_unspecified() {
    let result = Aggregator::aggregate(&sample_table(), GroupKey::Region);
    let keys: Vec<&str> = result.groups.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["(unspecified)", "North", "South"]);
    assert_eq!(result.get("(unspecified)").unwrap().sum, dec("30.00"));
}

#[test]
fn monthly_trend_is_chronological() {
    let result = Aggregator::aggregate(&sample_table(), GroupKey::Period(Period::Month));
    let keys: Vec<&str> = result.groups.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["2024-01", "2024-02"]);
    assert_eq!(result.groups[0].sum, dec("225.75"));
    assert_eq!(result.groups[0].bucket, Some(date(2024, 1, 1)));
    assert_eq!(result.groups[1].sum, dec("50.00"));
}

#[test]
fn weekly_buckets_start_on_monday() {
    let result = Aggregator::aggregate(&sample_table(), GroupKey::Period(Period::Week));
    // 2024-01-01 and 2024-01-03 share the ISO week starting Monday 2024-01-01.
    let first = &result.groups[0];
    assert_eq!(first.key, "2024-W01");
    assert_eq!(first.count, 2);
    assert_eq!(first.sum, dec("150.50"));
}

#[test]
fn top_n_orders_by_sum_descending() {
    let result = Aggregator::aggregate(&sample_table(), GroupKey::Category);
    let top: Vec<String> = result.top_n(2).into_iter().map(|g| g.key).collect();
    assert_eq!(top, vec!["Widget", "Gadget"]);
    assert_eq!(result.top_n(10).len(), 3);
}

#[test]
fn kpis_for_table() {
    let kpis = Aggregator::kpis(&sample_table());
    assert_eq!(kpis.total_sales, dec("275.75"));
    assert_eq!(kpis.average_sale, Some(dec("55.15")));
    assert_eq!(kpis.transactions, 5);
    assert_eq!(kpis.unique_products, 3);
    assert_eq!(kpis.total_quantity, 9);
    assert_eq!(kpis.first_date, Some(date(2024, 1, 1)));
    assert_eq!(kpis.last_date, Some(date(2024, 2, 10)));
}

#[test]
fn empty_table_has_no_groups() {
    let empty = FilterCriteria::new()
        .with_categories(Vec::<String>::new())
        .apply(&sample_table());

    assert!(Aggregator::aggregate(&empty, GroupKey::Category).is_empty());
    let kpis = Aggregator::kpis(&empty);
    assert_eq!(kpis.total_sales, Decimal::ZERO);
    assert_eq!(kpis.average_sale, None);
    assert_eq!(kpis.transactions, 0);
}
