use rand::{Rng, RngCore};

/// Current UTC timestamp (milliseconds)
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current UTC timestamp (seconds)
pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Number of random digits appended to the time part of a reservation id
const RESERVATION_RANDOM_MODULUS: u64 = 10_000;

/// Number of time digits kept from the Unix timestamp
const RESERVATION_TIME_MODULUS: i64 = 1_000_000;

/// Smallest 10-digit reservation id
pub const RESERVATION_ID_MIN: u64 = 1_000_000_000;

/// Largest 10-digit reservation id
pub const RESERVATION_ID_MAX: u64 = 9_999_999_999;

/// Build a reservation id from a Unix timestamp (seconds) and a random value.
///
/// Layout (10 decimal digits):
///   - 6 digits: the low-order digits of `unix_secs`
///   - 4 digits: `random % 10000`, zero-padded
///
/// A time part below 100000 would lose its leading digit once read back as an
/// integer, so the leading digit is forced to 1 to keep every id at 10 digits.
pub fn reservation_id_from(unix_secs: i64, random: u32) -> u64 {
    let mut time_part = unix_secs.rem_euclid(RESERVATION_TIME_MODULUS) as u64;
    if time_part < 100_000 {
        time_part += 100_000;
    }
    time_part * RESERVATION_RANDOM_MODULUS + u64::from(random) % RESERVATION_RANDOM_MODULUS
}

/// Generate a 10-digit reservation id from the clock and the thread RNG.
///
/// Collisions are possible within the same second and are not checked.
pub fn next_reservation_id() -> u64 {
    let random = rand::thread_rng().gen_range(0..RESERVATION_RANDOM_MODULUS as u32);
    reservation_id_from(now_secs(), random)
}

const ACCOUNT_KEY_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of an account lookup key
pub const ACCOUNT_KEY_LEN: usize = 8;

/// Generate an 8-character uppercase alphanumeric account key (`[A-Z0-9]{8}`)
pub fn next_account_key() -> String {
    let mut rng = rand::thread_rng();
    (0..ACCOUNT_KEY_LEN)
        .map(|_| ACCOUNT_KEY_CHARSET[rng.gen_range(0..ACCOUNT_KEY_CHARSET.len())] as char)
        .collect()
}

/// Generate a time-ordered record key for push-style inserts.
///
/// Layout (28 hex chars, fixed width so keys sort by creation time):
///   - 12 hex: milliseconds since the Unix epoch
///   - 16 hex: 64 random bits
pub fn push_key() -> String {
    let ts = now_millis().max(0) as u64 & 0xFFFF_FFFF_FFFF;
    let rand_bits = rand::thread_rng().next_u64();
    format!("{ts:012x}{rand_bits:016x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_reservation_id_layout() {
        // 1_700_773_342 -> time part 773342
        assert_eq!(reservation_id_from(1_700_773_342, 42), 7_733_420_042);
        assert_eq!(reservation_id_from(1_700_773_342, 0), 7_733_420_000);
        assert_eq!(reservation_id_from(1_700_773_342, 9_999), 7_733_429_999);
    }

    #[test]
    fn test_reservation_id_keeps_ten_digits_with_leading_zero_time() {
        // 1_700_012_345 -> time part 012345, leading digit forced to 1
        let id = reservation_id_from(1_700_012_345, 7);
        assert_eq!(id, 1_123_450_007);
        assert!((RESERVATION_ID_MIN..=RESERVATION_ID_MAX).contains(&id));

        let id = reservation_id_from(1_700_000_000, 0);
        assert_eq!(id, RESERVATION_ID_MIN);
    }

    #[test]
    fn test_reservation_id_random_part_wraps() {
        assert_eq!(
            reservation_id_from(1_700_773_342, 12_345),
            reservation_id_from(1_700_773_342, 2_345)
        );
    }

    #[test]
    fn test_next_reservation_id_range() {
        for _ in 0..1000 {
            let id = next_reservation_id();
            assert!(
                (RESERVATION_ID_MIN..=RESERVATION_ID_MAX).contains(&id),
                "id out of range: {id}"
            );
        }
    }

    #[test]
    fn test_next_reservation_id_suffix_is_uniform() {
        // 10 buckets of the 4-digit suffix, chi-square with 9 degrees of freedom.
        const SAMPLES: usize = 1000;
        let mut buckets = [0usize; 10];
        for _ in 0..SAMPLES {
            let suffix = next_reservation_id() % 10_000;
            buckets[(suffix / 1_000) as usize] += 1;
        }

        let expected = SAMPLES as f64 / 10.0;
        let chi_square: f64 = buckets
            .iter()
            .map(|&observed| {
                let diff = observed as f64 - expected;
                diff * diff / expected
            })
            .sum();

        // p < 0.00001 for df = 9
        assert!(chi_square < 40.0, "suffix not uniform: {buckets:?} chi2={chi_square}");
    }

    #[test]
    fn test_account_key_format() {
        for _ in 0..200 {
            let key = next_account_key();
            assert_eq!(key.len(), ACCOUNT_KEY_LEN);
            assert!(
                key.chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
                "unexpected char in {key}"
            );
        }
    }

    #[test]
    fn test_push_keys_are_unique_and_fixed_width() {
        let keys: Vec<String> = (0..500).map(|_| push_key()).collect();
        assert!(keys.iter().all(|k| k.len() == 28));
        let unique: HashSet<&String> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn test_push_keys_sort_by_time() {
        let first = push_key();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = push_key();
        assert!(first[..12] < second[..12]);
    }
}
