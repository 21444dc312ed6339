//! Randomized proof material
//!
//! Every probe carries freshly drawn numbers or tokens so an echoed page can
//! never satisfy a stale oracle. Marker collisions with organic page content
//! cost at worst a false negative for that attempt, never corrupted state.

use rand::Rng;

/// A random integer with exactly `n` decimal digits (no leading zero).
pub fn rand_digits(n: u32) -> u32 {
    let low = 10u32.pow(n.saturating_sub(1));
    let high = 10u32.pow(n);
    let low = if n <= 1 { 1 } else { low };
    rand::rng().random_range(low..high)
}

/// A random lowercase ASCII token of `len` characters.
pub fn rand_token(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(rng.random_range(b'a'..=b'z')))
        .collect()
}
