use covert_check::entropy::{bitstring_entropy, shannon, text_entropy};

#[test]
fn empty_input_is_zero() {
    assert_eq!(text_entropy(""), 0.0);
    assert_eq!(bitstring_entropy(&[]), 0.0);
}

#[test]
fn single_symbol_is_zero() {
    assert_eq!(text_entropy("aaaaaaaaaaaaaaaa"), 0.0);
    let data = vec![0u8; 100];
    assert_eq!(shannon(data.iter().copied()), 0.0);
}

#[test]
fn uniform_bytes_approach_eight_bits() {
    // Every byte value appears 16 times: exactly uniform.
    let data: Vec<u8> = (0..4096).map(|i| (i % 256) as u8).collect();
    let e = shannon(data.iter().copied());
    assert!((e - 8.0).abs() < 0.1, "entropy was {e}");
}

#[test]
fn two_symbol_text_is_one_bit() {
    let e = text_entropy("abababab");
    assert!((e - 1.0).abs() < 1e-9, "entropy was {e}");
}

#[test]
fn bitstring_entropy_is_bounded_by_one_bit() {
    // 0xAA expands to alternating bits: maximal for a binary alphabet.
    let e = bitstring_entropy(&[0xAA; 64]);
    assert!((e - 1.0).abs() < 1e-9, "entropy was {e}");

    // Arbitrary byte content can never push a bit string past 1 bit.
    let data: Vec<u8> = (0..=255).collect();
    assert!(bitstring_entropy(&data) <= 1.0 + 1e-9);
}

#[test]
fn english_text_sits_in_the_natural_range() {
    let e = text_entropy("The quick brown fox jumps over the lazy dog.");
    assert!(e > 3.0 && e < 6.0, "entropy was {e}");
}
