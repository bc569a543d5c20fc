//! Property tests for the A1 address codec

use cellgrid_core::{CellAddress, CellRange};
use proptest::prelude::*;

proptest! {
    #[test]
    fn decode_inverts_encode(row in any::<u32>(), col in any::<u32>()) {
        let addr = CellAddress::new(row, col);
        let text = addr.to_string();
        prop_assert_eq!(CellAddress::parse(&text).unwrap(), addr);
    }

    #[test]
    fn encoded_row_is_never_zero(row in 0u32..1_000_000, col in 0u32..20_000) {
        let text = CellAddress::new(row, col).to_string();
        let digits: String = text.chars().skip_while(|c| c.is_ascii_uppercase()).collect();
        prop_assert!(!digits.starts_with('0'));
        prop_assert!(text.chars().take_while(|c| c.is_ascii_uppercase()).count() > 0);
    }

    #[test]
    fn column_ranges_expand_in_order(row in 0u32..10_000, col in 0u32..500, len in 1u32..50) {
        let start = CellAddress::new(row, col);
        let end = CellAddress::new(row + len - 1, col);
        let range = CellRange::parse(&format!("{}:{}", end, start)).unwrap();
        let cells: Vec<_> = range.cells().collect();
        prop_assert_eq!(cells.len() as u32, len);
        prop_assert_eq!(cells[0], start);
        prop_assert!(cells.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn known_vectors() {
    let cases = [((0, 0), "A1"), ((1, 1), "B2"), ((0, 25), "Z1"), ((9, 26), "AA10"), ((41, 701), "ZZ42")];
    for ((row, col), text) in cases {
        assert_eq!(CellAddress::new(row, col).to_string(), text);
        assert_eq!(CellAddress::parse(text).unwrap(), CellAddress::new(row, col));
    }
}
