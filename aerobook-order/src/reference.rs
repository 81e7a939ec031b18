use chrono::Utc;
use rand::Rng;

const REFERENCE_PREFIX: &str = "BK";
const SUFFIX_LEN: usize = 5;
const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// `BK` + epoch millis + 5 random base-36 characters.
///
/// Not unique on its own; the ledger rejects duplicates and the caller retries.
pub fn generate_reference() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}{}{}", REFERENCE_PREFIX, Utc::now().timestamp_millis(), suffix)
}
