use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SYLLABLES: &[&str] = &[
    "ka", "lo", "mi", "ne", "ru", "sa", "to", "vi", "zen", "dra", "pol", "qui", "tes", "mar",
];
const SEPARATORS: &[char] = &['-', '.', '_', '!', '@', '#'];

/// Builds `count` user-style passwords: a few syllables, an occasional capital,
/// a separator and a trailing number. Seeded so every run hashes the same set.
pub fn generate_user_passwords(count: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let mut password = String::new();
            for i in 0..rng.gen_range(2..=5) {
                let syllable = SYLLABLES[rng.gen_range(0..SYLLABLES.len())];
                if i == 0 && rng.gen_bool(0.5) {
                    let mut chars = syllable.chars();
                    password.extend(chars.next().map(|c| c.to_ascii_uppercase()));
                    password.push_str(chars.as_str());
                } else {
                    password.push_str(syllable);
                }
            }
            password.push(SEPARATORS[rng.gen_range(0..SEPARATORS.len())]);
            password.push_str(&rng.gen_range(0..10_000u32).to_string());
            password
        })
        .collect()
}

/// Builds a range body of `lines` pseudo-random suffixes, roughly the size of
/// a real range response (~800-1000 lines).
pub fn generate_range_body(lines: usize) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut rng = StdRng::seed_from_u64(7);
    let mut body = String::with_capacity(lines * 42);
    for _ in 0..lines {
        for _ in 0..35 {
            body.push(HEX[rng.gen_range(0..16)] as char);
        }
        body.push(':');
        body.push_str(&rng.gen_range(1..100_000u32).to_string());
        body.push_str("\r\n");
    }
    body
}
