// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::path::PathBuf;

use super::row;
use crate::{Row, load_table, parse_rows, render_rows, save_table};

#[tokio::test]
async fn test_missing_file_loads_as_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let rows: Vec<Row> = load_table(&dir.path().join("nope.csv")).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_round_trip_drops_columns_absent_from_first_row() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("t.csv");

    let rows: Vec<Row> = vec![
        row(&[("id", "1"), ("name", "a")]),
        row(&[("id", "2"), ("name", "b"), ("extra", "dropped")]),
        row(&[("id", "3")]),
    ];
    save_table(&path, &rows).await.unwrap();

    let loaded: Vec<Row> = load_table(&path).await.unwrap();
    assert_eq!(
        loaded,
        vec![
            row(&[("id", "1"), ("name", "a")]),
            row(&[("id", "2"), ("name", "b")]),
            row(&[("id", "3"), ("name", "")]),
        ]
    );
}

#[tokio::test]
async fn test_saving_no_rows_leaves_existing_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("t.csv");
    let original: &str = "id,name\n1,\"quoted, value\"\n";
    tokio::fs::write(&path, original).await.unwrap();

    save_table(&path, &[]).await.unwrap();

    let after: String = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(after, original);
}

#[tokio::test]
async fn test_saving_no_rows_does_not_create_file() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("t.csv");

    save_table(&path, &[]).await.unwrap();

    assert!(!path.exists());
}

#[test]
fn test_short_rows_are_padded_with_empty_values() {
    let rows: Vec<Row> = parse_rows(b"id,name,code\n1,Acme\n").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some("Acme"));
    assert_eq!(rows[0].get("code"), Some(""));
}

#[test]
fn test_header_only_file_has_no_rows() {
    let rows: Vec<Row> = parse_rows(b"id,name\n").unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_embedded_json_survives_quoting() {
    let rows: Vec<Row> = vec![row(&[
        ("id", "1"),
        ("config_json", r#"{"a":[1,2],"b":"x,y"}"#),
    ])];
    let bytes: Vec<u8> = render_rows(&rows).unwrap();
    let parsed: Vec<Row> = parse_rows(&bytes).unwrap();
    assert_eq!(parsed, rows);
}

#[test]
fn test_row_insert_replaces_existing_column_in_place() {
    let mut r: Row = row(&[("id", "1"), ("name", "a")]);
    r.insert("id", "7");
    r.insert("code", "X");
    assert_eq!(r.columns().collect::<Vec<_>>(), vec!["id", "name", "code"]);
    assert_eq!(r.get("id"), Some("7"));
}
