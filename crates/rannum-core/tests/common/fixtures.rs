//! Test fixture loading utilities

use std::path::PathBuf;

use rannum_core::DigitSequence;

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Load a fixture file as a string
#[allow(dead_code)]
pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// `0123456789` repeated `times` times
#[allow(dead_code)]
pub fn counting_sequence(times: usize) -> DigitSequence {
    DigitSequence::new((0..times).flat_map(|_| 0..10u8).collect()).unwrap()
}

/// One digit repeated `len` times
#[allow(dead_code)]
pub fn constant_sequence(digit: u8, len: usize) -> DigitSequence {
    DigitSequence::new(vec![digit; len]).unwrap()
}

/// Digits of pi after the decimal point
#[allow(dead_code)]
pub fn pi_digits() -> DigitSequence {
    let text = "1415926535897932384626433832795028841971693993751058209749445923\
                0781640628620899862803482534211706798214808651328230664709384460\
                9550582231725359408128481117450284102701938521105559644622948954\
                9303819644288109756659334461284756482337867831652712019091456485\
                6692346034861045432664821339360726024914127372458700660631558817\
                4881520920962829254091715364367892590360011330530548820466521384";
    DigitSequence::new(text.bytes().map(|b| b - b'0').collect()).unwrap()
}
