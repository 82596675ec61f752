use chrono::{DateTime, Utc};
use rand::Rng;

use crate::order_types::OrderNumber;

pub const ORDER_NUMBER_PREFIX: &str = "ONL";
const SUFFIX_LEN: usize = 4;
const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generates a human-facing order number of the form `ONL-<base36 millis>-<4 random chars>`.
///
/// The timestamp encodes creation time; the random suffix keeps two orders placed in the
/// same millisecond distinct with probability 1 − 36⁻⁴. Uniqueness is probabilistic only
/// and is not enforced at the store layer.
pub fn new_order_number(at: DateTime<Utc>) -> OrderNumber {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char).collect();
    OrderNumber(format!("{ORDER_NUMBER_PREFIX}-{}-{suffix}", base36(at.timestamp_millis())))
}

fn base36(mut value: i64) -> String {
    if value <= 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(ALPHABET[(value % 36) as usize] as char);
        value /= 36;
    }
    digits.iter().rev().collect()
}
