use super::cells::OutputCells;
use super::*;

use proptest::prelude::*;

use crate::rule;

fn transform_str(input: &str) -> String {
    String::from_utf8(transform(input.as_bytes()).unwrap()).unwrap()
}

// ===== two-worker engine =====

#[test]
fn test_empty_input() {
    assert_eq!(transform(b"").unwrap(), b"");
}

#[test]
fn test_letters_uppercased() {
    assert_eq!(transform_str("hello"), "HELLO");
}

#[test]
fn test_digit_becomes_marker_run() {
    assert_eq!(transform_str("ab3c"), "AB***C");
}

#[test]
fn test_zero_digit_contributes_nothing() {
    assert_eq!(transform_str("A1B0C"), "A*BC");
}

#[test]
fn test_blanks_unchanged() {
    assert_eq!(transform_str("   "), "   ");
}

#[test]
fn test_single_byte_input() {
    // Midpoint 0: the whole input lands in the second half.
    assert_eq!(transform_str("q"), "Q");
    assert_eq!(transform_str("4"), "****");
}

#[test]
fn test_digits_around_the_midpoint() {
    // Expansions on either side of the split, and straddling it, must land
    // at the positions the sequential rule gives them.
    for input in [
        &b"9abc"[..],
        b"abc9",
        b"ab9cd",
        b"a99b",
        b"90ab",
        b"ab09",
        b"1a2b3c4d5",
    ] {
        assert_eq!(transform(input).unwrap(), rule::apply(input), "input {input:?}");
    }
}

#[test]
fn test_lopsided_halves_match_sequential_rule() {
    // Nearly all expansion in one half, none in the other, both orders.
    // Each worker's full replay must land exactly at the sized length.
    for input in [
        &b"99999999abcdefgh"[..],
        b"abcdefgh99999999",
        b"00000000zzzzzzzz",
        b"9999999999999999",
    ] {
        assert_eq!(transform(input).unwrap(), rule::apply(input), "input {input:?}");
    }
}

#[test]
fn test_matches_sequential_rule_on_fixed_inputs() {
    for input in [
        &b""[..],
        b"0",
        b"9",
        b"ab3c",
        b"A1B0C",
        b"   ",
        b"0123456789",
        b"no digits at all, just text\n",
        b"\xC3\xA9\x00\xFF8",
    ] {
        assert_eq!(transform(input).unwrap(), rule::apply(input), "input {input:?}");
    }
}

#[test]
fn test_large_input_matches_sequential_rule() {
    let input: Vec<u8> = b"lorem1 Ipsum23 dolor9 sit0 amet, 42; "
        .iter()
        .copied()
        .cycle()
        .take(200_000)
        .collect();
    assert_eq!(transform(&input).unwrap(), rule::apply(&input));
}

#[test]
fn test_transform_into_exact_buffer() {
    let input = b"ab3c";
    let mut out = vec![0u8; rule::output_len(input)];
    transform_into(input, &mut out).unwrap();
    assert_eq!(out, b"AB***C");
}

#[test]
fn test_transform_into_rejects_wrong_length() {
    let mut out = vec![0u8; 3];
    let err = transform_into(b"ab3c", &mut out).unwrap_err();
    match err {
        TransformError::LengthMismatch { need, got } => {
            assert_eq!(need, 6);
            assert_eq!(got, 3);
        }
        other => panic!("expected LengthMismatch, got {other:?}"),
    }
}

proptest! {
    // The engine must agree with the sequential rule on arbitrary bytes.
    // In debug builds the cell instrumentation also turns any overlapping
    // or missed write into a panic, so this doubles as a fuzz of the
    // disjoint-ownership partition.
    #[test]
    fn transform_matches_sequential_rule(input in proptest::collection::vec(any::<u8>(), 0..600)) {
        let out = transform(&input).unwrap();
        prop_assert_eq!(out, rule::apply(&input));
    }
}

// ===== output cells =====

#[test]
fn test_cells_writes_land_in_buffer() {
    let mut buf = vec![0u8; 3];
    let cells = OutputCells::new(&mut buf);
    // SAFETY: indices are in bounds and written once, single-threaded.
    unsafe {
        cells.write(0, b'a');
        cells.write(2, b'c');
        cells.write(1, b'b');
    }
    #[cfg(debug_assertions)]
    cells.assert_covered();
    drop(cells);
    assert_eq!(buf, b"abc");
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "written twice")]
fn test_cells_double_write_panics() {
    let mut buf = vec![0u8; 2];
    let cells = OutputCells::new(&mut buf);
    // SAFETY: single-threaded; the second write violates the contract on
    // purpose to exercise the debug check.
    unsafe {
        cells.write(0, b'x');
        cells.write(0, b'y');
    }
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "never written")]
fn test_cells_coverage_check_catches_gap() {
    let mut buf = vec![0u8; 2];
    let cells = OutputCells::new(&mut buf);
    // SAFETY: in bounds, written once.
    unsafe { cells.write(0, b'x') };
    cells.assert_covered();
}
