use crate::types::now_millis;
use parking_lot::Mutex;
use rand::Rng;

/// Alphabet in ASCII order, so generated keys sort lexicographically by
/// creation time.
const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

const TIME_CHARS: usize = 8;
const RANDOM_CHARS: usize = 12;

#[derive(Default)]
struct GeneratorState {
    last_millis: i64,
    last_random: [u8; RANDOM_CHARS],
}

/// Generator for the 20-character keys `push` assigns to new children.
///
/// The first 8 characters encode the millisecond timestamp, the last 12 are
/// random. Keys created within the same millisecond (or while the clock runs
/// backwards) reuse the previous random part incremented by one, so keys from
/// a single generator are strictly increasing.
#[derive(Default)]
pub struct PushIdGenerator {
    state: Mutex<GeneratorState>,
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        self.next_id_at(now_millis())
    }

    pub fn next_id_at(&self, millis: i64) -> String {
        let mut state = self.state.lock();

        let millis = millis.max(state.last_millis);
        if millis == state.last_millis && state.last_millis != 0 {
            for digit in state.last_random.iter_mut().rev() {
                if *digit == 63 {
                    *digit = 0;
                } else {
                    *digit += 1;
                    break;
                }
            }
        } else {
            let mut rng = rand::thread_rng();
            for digit in state.last_random.iter_mut() {
                *digit = rng.gen_range(0..64);
            }
        }
        state.last_millis = millis;

        let mut id = [0u8; TIME_CHARS + RANDOM_CHARS];
        let mut remaining = millis.max(0) as u64;
        for slot in id[..TIME_CHARS].iter_mut().rev() {
            *slot = PUSH_CHARS[(remaining % 64) as usize];
            remaining /= 64;
        }
        for (slot, digit) in id[TIME_CHARS..].iter_mut().zip(state.last_random.iter()) {
            *slot = PUSH_CHARS[*digit as usize];
        }

        id.iter().map(|&b| b as char).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape() {
        let id = PushIdGenerator::new().next_id();
        assert_eq!(id.len(), 20);
        assert!(id.bytes().all(|b| PUSH_CHARS.contains(&b)));
    }

    #[test]
    fn test_monotonic_within_same_millisecond() {
        let generator = PushIdGenerator::new();
        let ids: Vec<String> = (0..200)
            .map(|_| generator.next_id_at(1_700_000_000_000))
            .collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(ids.iter().all(|id| id[..8] == ids[0][..8]));
    }

    #[test]
    fn test_monotonic_across_time_and_clock_skew() {
        let generator = PushIdGenerator::new();
        let a = generator.next_id_at(1_000);
        let b = generator.next_id_at(2_000);
        let c = generator.next_id_at(1_500);
        assert!(a < b);
        assert!(b < c);
    }
}
