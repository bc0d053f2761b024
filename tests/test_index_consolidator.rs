mod common;

use std::fs;

use common::{ymd, MASTER_IDX_HEADER};
use edgar_quant::filing::index::{load_index, IndexConsolidator, Period};
use edgar_quant::filing::model::IndexRecord;

fn write_period(index_dir: &std::path::Path, period: Period, lines: &[&str]) -> anyhow::Result<()> {
    let path = period.local_path(index_dir);
    fs::create_dir_all(path.parent().unwrap())?;
    fs::write(path, format!("{}{}\n", MASTER_IDX_HEADER, lines.join("\n")))?;
    Ok(())
}

#[test]
fn test_well_formed_line_fields_match_input() {
    let record = IndexRecord::parse_line(
        "320193|APPLE INC|10-Q|20190501|edgar/data/320193/0000320193-19-000066.txt",
    )
    .unwrap();
    assert_eq!(record.cik, 320193);
    assert_eq!(record.name, "APPLE INC");
    assert_eq!(record.form, "10-Q");
    assert_eq!(record.filing_date, ymd(2019, 5, 1));
    assert_eq!(record.path, "edgar/data/320193/0000320193-19-000066.txt");
}

#[test]
fn test_short_line_is_rejected_not_panicking() {
    assert!(IndexRecord::parse_line("320193|APPLE INC|10-Q").is_err());
    assert!(IndexRecord::parse_line("").is_err());
}

#[test]
fn test_consolidate_periods_with_gap() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let index_dir = dir.path().join("index_files");
    let q1 = Period::new(2019, 1).unwrap();
    let q2 = Period::new(2019, 2).unwrap();
    let q3 = Period::new(2019, 3).unwrap();

    write_period(
        &index_dir,
        q1,
        &[
            "320193|APPLE INC|10-Q|2019-01-30|edgar/data/320193/0000320193-19-000010.txt",
            "789019|MICROSOFT CORP|10-Q|2019-01-30",
            "not a record at all",
        ],
    )?;
    write_period(
        &index_dir,
        q3,
        &[
            "320193|APPLE INC|10-Q|2019-07-31|edgar/data/320193/0000320193-19-000076.txt",
            "320193|APPLE INC|10-Q|2019-07-31|edgar/data/320193/0000320193-19-000076.txt",
            "789019|MICROSOFT CORP|8-K|2019-07-18|edgar/data/789019/0001564590-19-026040.txt",
        ],
    )?;

    let output = dir.path().join("master_index.csv");
    let consolidator = IndexConsolidator::new(&index_dir, 11);
    let report = consolidator.consolidate_to(&[q1, q2, q3], &output)?;

    assert_eq!(report.periods_read, 2);
    assert_eq!(report.periods_missing, vec!["2019Q2".to_string()]);
    assert_eq!(report.records, 3);
    assert_eq!(report.malformed, 2);
    assert_eq!(report.duplicates, 1);

    let records = load_index(&output)?;
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].filing_date, ymd(2019, 1, 30));
    assert_eq!(records[2].form, "8-K");

    let csv = fs::read_to_string(&output)?;
    assert!(csv.starts_with("cik,name,form,filing_date,path"));
    assert!(csv.contains("2019-07-31"));
    Ok(())
}

#[test]
fn test_load_index_missing_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_index(&dir.path().join("master_index.csv")).unwrap_err();
    assert!(matches!(err, edgar_quant::AppError::Config(_)));
}
