//! Base-62 short code encoding.
//!
//! Short codes are derived from the store-assigned row id, so two rows can
//! never share a code as long as ids are unique.

/// Symbol table: digits, then lowercase, then uppercase letters.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const BASE: u64 = ALPHABET.len() as u64;

/// Encodes an id as a base-62 string, most significant symbol first.
///
/// `0` maps to `"0"`. No padding is applied, so the code length grows
/// logarithmically with the id.
///
/// # Examples
///
/// ```
/// use mini_link::utils::base62::encode;
///
/// assert_eq!(encode(0), "0");
/// assert_eq!(encode(61), "Z");
/// assert_eq!(encode(62), "10");
/// ```
pub fn encode(mut id: u64) -> String {
    if id == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    // u64::MAX needs 11 symbols
    let mut buf = Vec::with_capacity(11);
    while id > 0 {
        buf.push(ALPHABET[(id % BASE) as usize]);
        id /= BASE;
    }
    buf.reverse();

    buf.into_iter().map(char::from).collect()
}

/// Decodes a base-62 code back into its id.
///
/// Returns `None` for an empty code, a symbol outside [`ALPHABET`], or a
/// value that does not fit in `u64`.
pub fn decode(code: &str) -> Option<u64> {
    if code.is_empty() {
        return None;
    }

    code.bytes().try_fold(0u64, |acc, b| {
        let digit = symbol_value(b)?;
        acc.checked_mul(BASE)?.checked_add(digit)
    })
}

fn symbol_value(b: u8) -> Option<u64> {
    let v = match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'z' => b - b'a' + 10,
        b'A'..=b'Z' => b - b'A' + 36,
        _ => return None,
    };
    Some(v as u64)
}
