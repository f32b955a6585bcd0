//! Parser, cache, ring buffer and generator properties over generated inputs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use telemlog_core::prelude::*;

fn random_values(rng: &mut StdRng) -> [i64; SCHEMA_LEN] {
    let mut values = [0i64; SCHEMA_LEN];
    for v in values.iter_mut() {
        *v = match rng.gen_range(0..4) {
            0 => rng.gen_range(-10..10),
            1 => rng.gen_range(0..20_000),
            2 => rng.gen(),
            _ => i64::MIN + rng.gen_range(0..3),
        };
    }
    values
}

#[test]
fn test_parse_round_trips_serialized_records() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..2000 {
        let record = Record::from_values(random_values(&mut rng));
        let line = format!("{}\n", record.to_line());
        assert_eq!(parse_line(line.as_bytes()), Ok(record), "line: {line}");
    }
}

#[test]
fn test_every_other_field_count_is_rejected() {
    for count in (0..=40).filter(|&n| n != SCHEMA_LEN) {
        let line = vec!["1"; count].join(";") + "\n";
        assert_eq!(
            parse_line(line.as_bytes()),
            Err(RejectionReason::WrongFieldCount {
                expected: SCHEMA_LEN,
                actual: count
            })
        );
    }
}

#[test]
fn test_any_non_integer_field_rejects_line() {
    for bad in ["x", "1.5", "0x10", "12a", "--3", "99999999999999999999"] {
        for position in 0..SCHEMA_LEN {
            let mut tokens = vec!["7"; SCHEMA_LEN];
            tokens[position] = bad;
            let line = tokens.join(";");
            match parse_line(line.as_bytes()) {
                Err(RejectionReason::NonIntegerField { index, token }) => {
                    assert_eq!(index, position);
                    assert_eq!(token, bad);
                }
                other => panic!("{line}: expected NonIntegerField, got {other:?}"),
            }
        }
    }
}

#[test]
fn test_cache_returns_last_completed_put() {
    let mut rng = StdRng::seed_from_u64(7);
    let cache = LatestValueCache::new();
    assert_eq!(cache.get(), None);

    for _ in 0..100 {
        let puts = rng.gen_range(1..5);
        let mut last = None;
        for _ in 0..puts {
            let record = Record::from_values(random_values(&mut rng));
            cache.put(record);
            last = Some(record);
        }
        assert_eq!(cache.get(), last);
        assert_eq!(cache.get(), last);
    }
}

#[test]
fn test_ring_buffer_keeps_last_n_in_order() {
    for capacity in 1..50usize {
        let mut buffer = RingBuffer::new(capacity);
        for i in 1..=capacity + 1 {
            buffer.append(i);
        }
        let expected: Vec<usize> = (2..=capacity + 1).collect();
        assert_eq!(buffer.len(), capacity);
        assert_eq!(buffer.snapshot(), expected);
    }
}

#[test]
fn test_synthetic_log_index_is_gapless() {
    for seed in 0..5 {
        let mut source = SyntheticSource::new(std::time::Duration::from_millis(50), seed);
        let mut previous = 0;
        for _ in 0..1000 {
            let index = source.next_record().log_index;
            assert_eq!(index, previous + 1);
            previous = index;
        }
    }
}
