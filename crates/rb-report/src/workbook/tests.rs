use super::*;
use crate::error::WorkbookError;

#[test]
fn test_parse_cell_refs() {
    let cell = CellRef::parse("O6", "Results").unwrap();
    assert_eq!(cell.sheet, "Results");
    assert_eq!((cell.col, cell.row), (15, 6));
    assert_eq!(cell.address(), "O6");
    assert_eq!(cell.to_string(), "Results!O6");

    let cell = CellRef::parse("Data!A1", "Results").unwrap();
    assert_eq!(cell.sheet, "Data");
    assert_eq!((cell.col, cell.row), (1, 1));

    let cell = CellRef::parse("'My Sheet'!ab12", "Results").unwrap();
    assert_eq!(cell.sheet, "My Sheet");
    assert_eq!(cell.address(), "AB12");

    let last = CellRef::parse("XFD1048576", "Results").unwrap();
    assert_eq!((last.col, last.row), (MAX_COLUMN, MAX_ROW));
}

#[test]
fn test_address_round_trips() {
    for text in ["A1", "Z3", "AA10", "AZ99", "BA1", "ZZ5", "AAA7", "XFD20"] {
        let cell = CellRef::parse(text, "Results").unwrap();
        assert_eq!(cell.address(), text);
        assert_eq!(CellRef::parse(&cell.to_string(), "Other").unwrap(), cell);
    }
    assert_eq!(column_name(26), "Z");
    assert_eq!(column_name(27), "AA");
    assert_eq!(column_name(702), "ZZ");
    assert_eq!(column_name(703), "AAA");
}

#[test]
fn test_invalid_cell_refs() {
    for text in ["", "6", "O", "O0", "O6x", "XFE1", "A1048577", "!A1", "A-1"] {
        let err = CellRef::parse(text, "Results").unwrap_err();
        assert!(
            matches!(err, WorkbookError::InvalidCell { .. }),
            "{text:?} should be rejected"
        );
    }
    assert!(CellRef::new("Results", 0, 1).is_err());
}

#[test]
fn test_offset() {
    let anchor = CellRef::parse("Z6", "Results").unwrap();
    let cell = anchor.offset(2, 1).unwrap();
    assert_eq!(cell.address(), "AA8");
    assert_eq!(cell.sheet, "Results");
}

#[test]
fn test_read_write_clear() {
    let mut wb = JsonWorkbook::new();
    let cell = CellRef::parse("Results!P6", "Results").unwrap();

    assert!(wb.read(&cell).is_none());
    wb.write(&cell, CellValue::number(0.5));
    assert_eq!(wb.read(&cell), Some(CellValue::Number(0.5)));

    wb.write(&cell, CellValue::Empty);
    assert!(wb.read(&cell).is_none());

    for row in 6..10 {
        wb.write(&CellRef::new("Results", 26, row).unwrap(), CellValue::number(1.0));
        wb.write(&CellRef::new("Results", 27, row).unwrap(), CellValue::number(2.0));
    }
    let keep = CellRef::parse("Z3", "Results").unwrap();
    wb.write(&keep, CellValue::text("residuals"));

    wb.clear_below(&CellRef::parse("Z7", "Results").unwrap(), 2);
    assert_eq!(wb.cell_count(), 3);
    assert!(wb.read(&keep).is_some());
    assert!(wb.read(&CellRef::parse("AA6", "Results").unwrap()).is_some());
}

#[test]
fn test_non_finite_numbers_are_text() {
    assert_eq!(CellValue::number(f64::NAN), CellValue::text("NaN"));
    assert!(CellValue::number(f64::NAN).as_number().unwrap().is_nan());
    assert_eq!(CellValue::number(2.5).as_number(), Some(2.5));
    assert_eq!(CellValue::text("  ").as_text(), None);
}

#[test]
fn test_json_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.json");

    let mut wb = JsonWorkbook::open_or_create(&path).unwrap();
    wb.write(&CellRef::parse("K5", "Results").unwrap(), "y ~ x".into());
    wb.write(&CellRef::parse("Data!A1", "Results").unwrap(), "x".into());
    wb.write(&CellRef::parse("Data!A2", "Results").unwrap(), CellValue::Bool(true));
    wb.write(&CellRef::parse("P6", "Results").unwrap(), 0.25.into());
    wb.save().unwrap();

    let reopened = JsonWorkbook::open(&path).unwrap();
    assert_eq!(reopened.sheet_names(), vec!["Data", "Results"]);
    assert_eq!(
        reopened.read(&CellRef::parse("K5", "Results").unwrap()),
        Some(CellValue::text("y ~ x"))
    );
    assert_eq!(
        reopened.read(&CellRef::parse("Data!A2", "Results").unwrap()),
        Some(CellValue::Bool(true))
    );
    assert_eq!(
        reopened.read(&CellRef::parse("P6", "Results").unwrap()),
        Some(CellValue::Number(0.25))
    );
}

#[test]
fn test_open_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.json");
    assert!(matches!(
        JsonWorkbook::open(&missing).unwrap_err(),
        WorkbookError::Io { .. }
    ));

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{ not json").unwrap();
    match JsonWorkbook::open(&broken).unwrap_err() {
        WorkbookError::Parse { path, .. } => assert_eq!(path, broken),
        other => panic!("Expected Parse error, got {other:?}"),
    }

    let bad_cell = r#"{ "sheets": { "Results": { "A0": 1.0 } } }"#;
    assert!(matches!(
        JsonWorkbook::from_json(bad_cell).unwrap_err(),
        WorkbookError::InvalidCell { .. }
    ));
}
