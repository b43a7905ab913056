//! Property-based tests for the width and round-trip guarantees.

use csv_width::{
    normalize_str, normalize_str_with_options, parse_str, rows_to_string, Dialect, NormalizeOptions,
    Row,
};
use proptest::prelude::*;

/// Field values mixing plain text with the characters that force quoting.
fn field() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            4 => "[a-zA-Z0-9 ]",
            1 => Just(",".to_string()),
            1 => Just("\"".to_string()),
            1 => Just("\n".to_string()),
            1 => Just("\r\n".to_string()),
        ],
        0..8,
    )
    .prop_map(|parts| parts.concat())
}

fn row_strategy(max_width: usize) -> impl Strategy<Value = Row> {
    prop::collection::vec(field(), 1..=max_width)
}

proptest! {
    #[test]
    fn prop_rows_round_trip(rows in prop::collection::vec(row_strategy(6), 0..10)) {
        let dialect = Dialect::new();
        let text = rows_to_string(&rows, &dialect);
        let parsed = parse_str(&text, &dialect).unwrap();
        prop_assert_eq!(parsed, rows);
    }

    #[test]
    fn prop_output_width_matches_header(
        header in row_strategy(5),
        rows in prop::collection::vec(row_strategy(9), 0..10),
    ) {
        let dialect = Dialect::new();
        let mut table = vec![header.clone()];
        table.extend(rows.iter().cloned());

        let output = normalize_str(&rows_to_string(&table, &dialect)).unwrap();
        let parsed = parse_str(&output, &dialect).unwrap();

        prop_assert_eq!(parsed.len(), table.len());
        prop_assert_eq!(&parsed[0], &header);
        for (out, original) in parsed.iter().zip(&table).skip(1) {
            prop_assert_eq!(out.len(), header.len());
            let kept = original.len().min(header.len());
            prop_assert_eq!(&out[..kept], &original[..kept]);
        }
    }

    #[test]
    fn prop_normalize_idempotent(
        header in row_strategy(4),
        rows in prop::collection::vec(row_strategy(7), 0..8),
    ) {
        let mut table = vec![header];
        table.extend(rows);
        let input = rows_to_string(&table, &Dialect::new());

        let once = normalize_str(&input).unwrap();
        let twice = normalize_str(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_normalize_idempotent_with_trim(
        header in row_strategy(4),
        rows in prop::collection::vec(row_strategy(7), 0..8),
    ) {
        let dialect = Dialect::new().with_trim(true);
        let options = NormalizeOptions::new().with_dialect(dialect.clone());
        let mut table = vec![header];
        table.extend(rows);
        let input = rows_to_string(&table, &dialect);

        let once = normalize_str_with_options(&input, options.clone()).unwrap();
        let twice = normalize_str_with_options(&once, options).unwrap();
        prop_assert_eq!(once, twice);
    }
}
