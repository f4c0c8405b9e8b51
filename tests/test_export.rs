mod common;

use common::{date, sample_table, Fixture, SAMPLE_CSV};
use sales_dashboard::charts::{ChartData, StaticChartRenderer};
use sales_dashboard::config::{CoercionPolicy, LoadOptions};
use sales_dashboard::data::{load_sales, FilterCriteria, SourceRef};
use sales_dashboard::error::ExportError;
use sales_dashboard::export::{DataExporter, SummaryFormat, SummaryReport};
use sales_dashboard::stats::Period;
use std::fs;

#[test]
fn default_file_name_carries_the_date() {
    assert_eq!(
        DataExporter::default_file_name(date(2024, 3, 9)),
        "sales_data_filtered_20240309.csv"
    );
}

#[test]
fn csv_keeps_exact_amounts_in_date_order() {
    let bytes = DataExporter::csv_bytes(&sample_table()).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "Date,Sales,Category");
    assert_eq!(lines[1], "2024-01-01,50.50,Gadget");
    assert_eq!(lines[2], "2024-01-03,100.00,Widget");
    assert_eq!(lines.len(), 6);
}

#[test]
fn csv_uses_source_headers_for_filtered_rows() {
    let fx = Fixture::new();
    let input = fx.write("sales.csv", SAMPLE_CSV);
    let validated = load_sales(
        &SourceRef::Local(input),
        &LoadOptions::new().policy(CoercionPolicy::Strict),
    )
    .unwrap();

    let filtered = FilterCriteria::new()
        .with_categories(["Gadget"])
        .apply(&validated.table);
    let out = fx.path("out.csv");
    DataExporter::save_csv(&filtered, &out).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Order Date,Product,Region,Revenue,Qty");
    assert_eq!(lines[1], "2024-01-01,Gadget,South,50.50,1");
    assert_eq!(lines[2], "2024-02-10,Gadget,,30.00,2");
    assert_eq!(lines.len(), 3);
}

#[test]
fn csv_keeps_unbound_source_columns() {
    let fx = Fixture::new();
    let input = fx.write(
        "sales.csv",
        "Date,Sales,Category,Region,Customer,Discount,Notes\n\
         2024-01-01,10,A,North,Acme,0.1,rush\n\
         2024-01-02,20,B,,Globex,,\n",
    );
    let validated = load_sales(&SourceRef::Local(input), &LoadOptions::default()).unwrap();

    let bytes = DataExporter::csv_bytes(&validated.table).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Date,Sales,Category,Region,Customer,Discount,Notes");
    assert_eq!(lines[1], "2024-01-01,10,A,North,Acme,0.1,rush");
    assert_eq!(lines[2], "2024-01-02,20,B,,Globex,,");
}

#[test]
fn summary_csv_lists_describe_statistics() {
    let report = SummaryReport::from_table(&sample_table());
    let mut buf = Vec::new();
    DataExporter::write_summary(&report, SummaryFormat::Csv, &mut buf).unwrap();

    let text = String::from_utf8(buf).unwrap();
    let names: Vec<&str> = text
        .lines()
        .map(|l| l.split(',').next().unwrap_or_default())
        .collect();
    assert_eq!(
        names,
        vec!["statistic", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]
    );
    assert!(text.lines().next().unwrap().ends_with(",Sales"));
}

#[test]
fn summary_json_includes_kpis() {
    let fx = Fixture::new();
    let path = fx.path("summary.json");
    assert_eq!(SummaryFormat::from_path(&path), SummaryFormat::Json);

    DataExporter::save_summary(&sample_table(), &path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(value["column"], "Sales");
    assert_eq!(value["statistics"]["count"], 5);
    assert_eq!(value["kpis"]["transactions"], 5);
    assert_eq!(value["kpis"]["total_sales"], "275.75");
    assert_eq!(value["kpis"]["first_date"], "2024-01-01");
}

#[test]
fn empty_view_has_nothing_to_export() {
    let fx = Fixture::new();
    let empty = FilterCriteria::new()
        .with_categories(["Nothing"])
        .apply(&sample_table());

    let err = DataExporter::save_summary(&empty, &fx.path("summary.csv")).unwrap_err();
    assert!(matches!(err, ExportError::NoData(_)));

    let data = ChartData::build(&empty, Period::Month, 10);
    let err = StaticChartRenderer::render_png(&data, &fx.path("charts.png"), 800, 600).unwrap_err();
    assert!(matches!(err, ExportError::NoData(_)));
}

#[test]
fn chart_data_follows_filters() {
    let table = sample_table();
    let filtered = FilterCriteria::new().with_regions(["North"]).apply(&table);
    let data = ChartData::build(&filtered, Period::Month, 5);

    assert_eq!(data.kpis.transactions, 2);
    assert_eq!(data.trend.len(), 2);
    assert_eq!(data.top_products.labels, vec!["Widget", "Gizmo"]);
    assert_eq!(data.summary.count, 2);
}
