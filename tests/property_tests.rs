//! Property-based tests for slicing, sorting and rendering invariants.
//!
//! Tests validate:
//! 1. Slice count is floor((L - 1) / G) after the offset, every slice has G records
//! 2. Slices are consecutive runs of the input, in order
//! 3. Sorting is stable and orders rows by the resolved column
//! 4. Rendered text has one line per row plus the header

use proptest::prelude::*;
use runtab::table::{basename, chunked, compare_values, Column, LogTable};
use serde_json::{json, Value};
use std::cmp::Ordering;

fn numbered(len: usize) -> Vec<Value> {
    (0..len).map(|i| json!({ "i": i })).collect()
}

// ===== Property 1-2: Slicing =====

proptest! {
    #[test]
    fn slice_count_matches_formula(len in 0usize..200, g in 1usize..10, offset in 0usize..20) {
        let slices = chunked(numbered(len), g, offset);
        let remaining = len.saturating_sub(offset);
        let expected = if remaining == 0 { 0 } else { (remaining - 1) / g };
        prop_assert_eq!(slices.len(), expected);
        for slice in &slices {
            prop_assert_eq!(slice.len(), g);
        }
    }

    #[test]
    fn slices_are_consecutive_runs(len in 0usize..200, g in 1usize..10, offset in 0usize..20) {
        let slices = chunked(numbered(len), g, offset);
        let flattened: Vec<Value> = slices.into_iter().flatten().collect();
        let expected: Vec<Value> = numbered(len)
            .into_iter()
            .skip(offset)
            .take(flattened.len())
            .collect();
        prop_assert_eq!(flattened, expected);
    }
}

// ===== Property 3: Sorting =====

proptest! {
    #[test]
    fn constant_key_sort_keeps_order(len in 0usize..60, g in 1usize..4) {
        let mut table = LogTable::from_records(numbered(len), g, 0).unwrap();
        let before = table.slices().to_vec();
        table.sort_by_key(|_| 0u8);
        prop_assert_eq!(table.slices(), before.as_slice());
    }

    #[test]
    fn sort_by_column_orders_rows(values in prop::collection::vec(-50i64..50, 0..40)) {
        let mut records: Vec<Value> = values
            .iter()
            .enumerate()
            .map(|(i, v)| json!({ "v": v, "pos": i }))
            .collect();
        records.push(json!({}));

        let mut table = LogTable::from_records(records, 1, 0).unwrap();
        table.set_column("v", Column::reference(0, "v"));
        table.sort_by_column(0).unwrap();

        let rows: Vec<&Value> = table.slices().iter().map(|s| &s[0]).collect();
        for pair in rows.windows(2) {
            let ord = compare_values(&pair[0]["v"], &pair[1]["v"]);
            prop_assert_ne!(ord, Ordering::Greater);
            if ord == Ordering::Equal {
                // Stable: ties keep input order.
                prop_assert!(pair[0]["pos"].as_u64() < pair[1]["pos"].as_u64());
            }
        }
    }
}

// ===== Property 4: Rendering =====

proptest! {
    #[test]
    fn render_has_header_plus_one_line_per_row(len in 0usize..40, g in 1usize..4, width in 1usize..16) {
        let mut table = LogTable::from_records(numbered(len), g, 0).unwrap();
        table.set_column("i", Column::reference(0, "i"));
        table.set_column_size(width);

        let text = table.render().unwrap();
        prop_assert_eq!(text.lines().count(), table.len() + 1);
        for line in text.lines() {
            prop_assert!(line.starts_with('|'));
            prop_assert!(line.ends_with(" |"));
            prop_assert!(line.chars().count() >= width + 4);
        }
    }

    #[test]
    fn basename_strips_directories_and_arguments(
        dirs in prop::collection::vec("[a-z]{1,6}", 0..4),
        stem in "[a-z][a-z0-9_]{0,8}",
        ext in "[a-z]{1,4}",
    ) {
        let mut path = dirs.join("/");
        if !path.is_empty() {
            path.push('/');
        }
        let command = format!("./run --flag {}{}.{}", path, stem, ext);
        prop_assert_eq!(basename(&command).unwrap(), stem);
    }
}
