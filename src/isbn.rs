//! ISBN normalization: ISBN-10 to ISBN-13 conversion and checksum validation.
//!
//! Legacy catalogue exports carry ISBNs in every imaginable shape:
//! hyphenated, space-padded, prefixed with "ISBN:" labels, or still in the
//! old 10-character form. Everything is reduced to a bare ISBN-13 where
//! possible; inputs that cannot be repaired keep their cleaned form so the
//! error log can show what was actually seen.

/// Outcome of normalizing a raw ISBN cell.
///
/// `value` is always populated: either the corrected ISBN-13 or the
/// best-effort cleaned string for diagnostics. `error` is `Some` exactly
/// when the input could not be fully validated or converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedIsbn {
    pub value: String,
    pub error: Option<String>,
}

impl NormalizedIsbn {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Normalize a raw ISBN value.
///
/// ISBN-10 inputs are converted to ISBN-13 by dropping the old check
/// character (an `X` check digit is discarded without being validated),
/// prepending the 978 prefix and recomputing the check digit. 13-digit
/// inputs are checksum-verified and returned as-is. Anything else is
/// reported as a format error alongside the cleaned remnant.
///
/// Pure and infallible: all failures are carried in the `error` field.
pub fn normalize(raw: Option<&str>) -> NormalizedIsbn {
    let raw = match raw {
        Some(r) if !r.is_empty() => r,
        _ => {
            return NormalizedIsbn {
                value: String::new(),
                error: Some("Missing ISBN".to_string()),
            };
        }
    };

    let stripped: String = raw
        .to_uppercase()
        .replace("ISBN:", "")
        .replace("ISBN", "")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'X')
        .collect();

    // ISBN-10 first: 9 digits plus one digit-or-X check character
    if is_isbn10_shape(&stripped) {
        let mut isbn13 = String::with_capacity(13);
        isbn13.push_str("978");
        isbn13.push_str(&stripped[..9]);

        let check = (10 - weighted_sum(&isbn13) % 10) % 10;
        isbn13.push((b'0' + check as u8) as char);

        return NormalizedIsbn {
            value: isbn13,
            error: None,
        };
    }

    if stripped.len() == 13 && stripped.bytes().all(|b| b.is_ascii_digit()) {
        let error = if weighted_sum(&stripped) % 10 == 0 {
            None
        } else {
            Some("Invalid ISBN-13 checksum".to_string())
        };
        return NormalizedIsbn {
            value: stripped,
            error,
        };
    }

    NormalizedIsbn {
        value: stripped,
        error: Some("Invalid ISBN format".to_string()),
    }
}

fn is_isbn10_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes[..9].iter().all(|b| b.is_ascii_digit())
        && (bytes[9].is_ascii_digit() || bytes[9] == b'X')
}

/// Alternating 1/3-weight digit sum, weight 1 at position 0.
/// Callers guarantee `digits` is ASCII-numeric.
fn weighted_sum(digits: &str) -> u32 {
    digits
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let d = (b - b'0') as u32;
            if i % 2 == 0 { d } else { d * 3 }
        })
        .sum()
}
