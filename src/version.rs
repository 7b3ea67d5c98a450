//! Numeric-aware revision ordering.
//!
//! Revisions are opaque tokens; when two of them compete for the same edge
//! the winner is decided by a stable version sort: runs of digits compare
//! numerically, everything else compares bytewise. This matches git's
//! `version:refname` ref sort closely enough for tag names like `1.10` vs
//! `1.9`, without pretending the tokens are semver (range solving is out of
//! scope).

use std::cmp::Ordering;

/// Compare two revision tokens with numeric-aware ordering.
pub fn cmp_revisions(a: &str, b: &str) -> Ordering {
    let mut lhs = a.as_bytes();
    let mut rhs = b.as_bytes();

    loop {
        match (lhs.first(), rhs.first()) {
            (None, None) => {
                // Chunks exhausted together; fall back to a total order so
                // "01" and "1" don't compare equal.
                return a.cmp(b);
            }
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(&x), Some(&y)) => {
                if x.is_ascii_digit() && y.is_ascii_digit() {
                    let (na, rest_a) = take_digits(lhs);
                    let (nb, rest_b) = take_digits(rhs);
                    match cmp_digit_runs(na, nb) {
                        Ordering::Equal => {
                            lhs = rest_a;
                            rhs = rest_b;
                        }
                        other => return other,
                    }
                } else {
                    match x.cmp(&y) {
                        Ordering::Equal => {
                            lhs = &lhs[1..];
                            rhs = &rhs[1..];
                        }
                        other => return other,
                    }
                }
            }
        }
    }
}

/// Version-sort maximum of two revision tokens.
pub fn max_revision<'a>(a: &'a str, b: &'a str) -> &'a str {
    if cmp_revisions(a, b) == Ordering::Less { b } else { a }
}

/// Version-sort minimum of two revision tokens.
pub fn min_revision<'a>(a: &'a str, b: &'a str) -> &'a str {
    if cmp_revisions(a, b) == Ordering::Greater { b } else { a }
}

fn take_digits(bytes: &[u8]) -> (&[u8], &[u8]) {
    let end = bytes
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(bytes.len());
    bytes.split_at(end)
}

fn cmp_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let a = trim_leading_zeros(a);
    let b = trim_leading_zeros(b);
    // No leading zeros left, so a longer run is a larger number.
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != b'0').unwrap_or(bytes.len());
    &bytes[start..]
}
