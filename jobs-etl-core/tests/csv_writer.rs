use jobs_etl_core::contract::NormalizedJobRecord;
use jobs_etl_core::csv_writer::{write_csv, HEADER};
use tempfile::tempdir;

fn record(date: &str, name: &str, job_type: &str, location: &str, company: &str) -> NormalizedJobRecord {
    NormalizedJobRecord {
        publication_date: date.to_string(),
        name: name.to_string(),
        job_type: job_type.to_string(),
        location: location.to_string(),
        company: company.to_string(),
    }
}

fn read_back(bytes: &[u8]) -> (Vec<String>, Vec<NormalizedJobRecord>) {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers = reader
        .headers()
        .expect("header row")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<NormalizedJobRecord>, _>>()
        .expect("rows parse back");
    (headers, rows)
}

#[test]
fn test_write_csv_empty_input_is_header_only() {
    let payload = write_csv(&[]).expect("empty input never fails");

    let text = std::str::from_utf8(payload.as_bytes()).unwrap();
    assert_eq!(text.trim_end(), "publication_date,name,job_type,location,company");
    assert_eq!(text.lines().count(), 1);
    assert_eq!(payload.rows(), 0);
}

#[test]
fn test_write_csv_round_trips_awkward_values() {
    let records = vec![
        record("2024-01-02", "Engineer, Backend", "external", "New York, NY", "Acme"),
        record("2024-01-03", "The \"Best\" Job", "internal", "", "Quote \"Co\""),
        record("", "Multi\nline title", "", "Zürich, Schweiz", "Ünïcödé GmbH"),
    ];

    let payload = write_csv(&records).expect("serialize");
    let (headers, rows) = read_back(payload.as_bytes());

    assert_eq!(headers, HEADER.to_vec());
    assert_eq!(rows, records);
    assert_eq!(payload.rows(), 3);
}

#[test]
fn test_write_csv_quotes_per_rfc4180() {
    let records = vec![record("d", "a,b", "say \"hi\"", "plain", "")];

    let payload = write_csv(&records).expect("serialize");
    let text = String::from_utf8(payload.into_bytes()).unwrap();
    let row = text.lines().nth(1).expect("data row");

    assert_eq!(row, r#"d,"a,b","say ""hi""",plain,"#);
}

#[test]
fn test_write_csv_row_count_is_records_plus_header() {
    let records: Vec<_> = (0..25)
        .map(|i| record("2024-05-01", &format!("Job {i}"), "external", "Remote", "Acme"))
        .collect();

    let payload = write_csv(&records).expect("serialize");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(payload.as_bytes());

    assert_eq!(reader.records().count(), records.len() + 1);
}

#[test]
fn test_payload_save_writes_identical_bytes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("jobs.csv");
    let payload = write_csv(&[record("2024-05-01", "Job", "external", "Remote", "Acme")]).unwrap();

    payload.save(&path).expect("save local copy");

    assert_eq!(std::fs::read(&path).unwrap(), payload.as_bytes());
}

#[test]
fn test_payload_save_into_missing_directory_is_serialization_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no/such/dir/jobs.csv");
    let payload = write_csv(&[]).unwrap();

    let err = payload.save(&path).unwrap_err();

    assert!(
        matches!(err, jobs_etl_core::error::SerializationError::Io { .. }),
        "expected Io variant, got {err:?}"
    );
}

#[test]
fn test_payload_sha256_is_stable() {
    let a = write_csv(&[]).unwrap();
    let b = write_csv(&[]).unwrap();
    assert_eq!(a.sha256_hex(), b.sha256_hex());
    assert_eq!(a.sha256_hex().len(), 64);
}
