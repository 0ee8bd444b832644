use std::collections::HashMap;
use std::hash::Hash;

/// Shannon entropy in bits per symbol over any finite symbol sequence.
///
/// Empty input yields 0.0. The result is bounded by log2 of the number of
/// distinct symbols observed, so byte sequences top out at 8.0 and bit
/// strings at 1.0.
pub fn shannon<T, I>(symbols: I) -> f64
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut freq: HashMap<T, usize> = HashMap::new();
    let mut total = 0usize;
    for sym in symbols {
        *freq.entry(sym).or_insert(0) += 1;
        total += 1;
    }

    if total == 0 {
        return 0.0;
    }

    let len = total as f64;
    let mut entropy = 0.0;
    for count in freq.values() {
        let p = *count as f64 / len;
        entropy -= p * p.log2();
    }
    entropy
}

/// Entropy over the characters of a text block.
pub fn text_entropy(text: &str) -> f64 {
    shannon(text.chars())
}

/// Entropy over the bit-string expansion of a byte payload: each byte is
/// expanded to its 8 binary digits and the digits are treated as the
/// symbol sequence.
pub fn bitstring_entropy(bytes: &[u8]) -> f64 {
    shannon(
        bytes
            .iter()
            .flat_map(|b| (0..8).rev().map(move |i| (b >> i) & 1)),
    )
}
