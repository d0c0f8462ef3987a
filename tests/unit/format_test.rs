use serde_json::{Map, Value, json};
use upsql::api::ResultPage;
use upsql::format::{OutputFormat, render_page, to_delimited, to_json, to_toon};

fn row(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

fn sample_page() -> ResultPage {
    ResultPage {
        columns: vec!["id".to_string(), "name".to_string(), "note".to_string()],
        rows: vec![
            row(json!({"id": 1, "name": "Alice", "note": null})),
            row(json!({"id": 2, "name": "Bob, Jr.", "note": "said \"hi\""})),
        ],
        next: None,
    }
}

// --- Delimited ---

#[test]
fn test_csv_with_header() {
    let out = to_delimited(&sample_page(), b',', true).unwrap();
    assert_eq!(
        out,
        "id,name,note\r\n1,Alice,\r\n2,\"Bob, Jr.\",\"said \"\"hi\"\"\"\r\n"
    );
}

#[test]
fn test_csv_without_header() {
    let out = to_delimited(&sample_page(), b',', false).unwrap();
    assert!(out.starts_with("1,Alice,\r\n"), "Got: {:?}", out);
}

#[test]
fn test_tsv_uses_tabs() {
    let out = to_delimited(&sample_page(), b'\t', true).unwrap();
    let first_line = out.lines().next().unwrap();
    assert_eq!(first_line, "id\tname\tnote");
    assert!(out.contains("2\tBob, Jr.\t"), "Got: {:?}", out);
}

#[test]
fn test_delimited_nested_values_are_json() {
    let page = ResultPage {
        columns: vec!["tags".to_string(), "ok".to_string()],
        rows: vec![row(json!({"tags": [1, 2], "ok": true}))],
        next: None,
    };
    let out = to_delimited(&page, b'\t', false).unwrap();
    assert_eq!(out, "[1,2]\ttrue\r\n");
}

#[test]
fn test_delimited_missing_cell_is_empty() {
    let page = ResultPage {
        columns: vec!["a".to_string(), "b".to_string()],
        rows: vec![row(json!({"a": 1}))],
        next: None,
    };
    let out = to_delimited(&page, b',', false).unwrap();
    assert_eq!(out, "1,\r\n");
}

#[test]
fn test_delimited_empty_page_header_only() {
    let page = ResultPage {
        columns: vec!["a".to_string(), "b".to_string()],
        rows: vec![],
        next: None,
    };
    assert_eq!(to_delimited(&page, b',', true).unwrap(), "a,b\r\n");
    assert_eq!(to_delimited(&page, b',', false).unwrap(), "");
}

// --- JSON ---

#[test]
fn test_json_one_object_per_row() {
    let out = to_json(&sample_page()).unwrap();
    let stream = serde_json::Deserializer::from_str(&out).into_iter::<Value>();
    let rows: Vec<Value> = stream.map(|v| v.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Alice");
    assert_eq!(rows[1]["note"], "said \"hi\"");
}

#[test]
fn test_json_preserves_column_order() {
    let out = to_json(&sample_page()).unwrap();
    let id = out.find("\"id\"").unwrap();
    let name = out.find("\"name\"").unwrap();
    let note = out.find("\"note\"").unwrap();
    assert!(id < name && name < note, "Got: {}", out);
}

#[test]
fn test_json_empty_page() {
    assert_eq!(to_json(&ResultPage::default()).unwrap(), "");
}

// --- TOON ---

#[test]
fn test_toon_round_trip() {
    let out = to_toon(&sample_page()).unwrap();
    assert!(out.ends_with('\n'));
    let decoded: Value = toon_format::decode_no_coerce(&out).unwrap();
    let rows = decoded.as_array().expect("root should be an array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Alice");
    assert_eq!(rows[1]["name"], "Bob, Jr.");
}

#[test]
fn test_toon_zero_rows_keeps_columns() {
    let page = ResultPage {
        columns: vec!["id".to_string(), "name".to_string()],
        rows: vec![],
        next: None,
    };
    assert_eq!(to_toon(&page).unwrap(), "[0]{id,name}:\n");
}

#[test]
fn test_toon_empty_page() {
    assert_eq!(to_toon(&ResultPage::default()).unwrap(), "");
}

// --- Dispatch ---

#[test]
fn test_render_page_header_only_on_first() {
    let page = sample_page();
    let first = render_page(&page, OutputFormat::Csv, true).unwrap();
    let later = render_page(&page, OutputFormat::Csv, false).unwrap();
    assert!(first.starts_with("id,name,note\r\n"));
    assert!(!later.contains("id,name,note"));
}

#[test]
fn test_output_format_parse() {
    assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
    assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
    assert_eq!("tsv".parse::<OutputFormat>().unwrap(), OutputFormat::Tsv);
    assert_eq!("Toon".parse::<OutputFormat>().unwrap(), OutputFormat::Toon);

    let err = "xml".parse::<OutputFormat>().unwrap_err().to_string();
    assert!(err.starts_with("config:"), "Got: {}", err);
    assert!(err.contains("xml"), "Got: {}", err);
}
