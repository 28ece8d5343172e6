//! Letter set generation: target letters plus weighted distractors
//!
//! Each distractor is drawn independently:
//! - 30%: a letter of the target word (duplicate traps)
//! - 40%: a letter within two alphabet positions of a target letter
//! - 20%: a high-frequency English letter
//! - 10%: any letter
//!
//! No letter may appear more than three times because of a distractor.

use super::tile::LetterTile;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

pub static ALPHABET: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// High-frequency English letters.
static FREQUENT_LETTERS: [char; 13] = [
    'E', 'T', 'A', 'O', 'I', 'N', 'R', 'S', 'H', 'D', 'L', 'U', 'C',
];

/// Letters used by the fallback generator.
static BASIC_LETTERS: [char; 10] = ['A', 'E', 'I', 'O', 'U', 'R', 'S', 'T', 'L', 'N'];

/// Cumulative thresholds of the distractor policy.
const REUSE_THRESHOLD: f64 = 0.3;
const NEAR_THRESHOLD: f64 = 0.7;
const FREQUENT_THRESHOLD: f64 = 0.9;

const NEAR_DISTANCE: i32 = 2;
const MAX_LETTER_COUNT: usize = 3;
/// Substitutes for a capped letter must currently appear fewer times than this.
const SUBSTITUTE_BELOW: usize = 2;

/// Reasons the weighted generator refuses a word.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("target word is empty")]
    EmptyWord,
    #[error("unsupported character {0:?} in target word")]
    UnsupportedCharacter(char),
}

/// Pool size for a word: the configured size, grown to fit longer words.
pub fn pool_size_for(word_len: usize, configured: usize) -> usize {
    configured.max(word_len)
}

/// Generate a shuffled pool for `word`.
///
/// Never fails: words the weighted generator rejects go through
/// [`fallback_pool`].
pub fn generate_pool<R: Rng>(word: &str, pool_size: usize, rng: &mut R) -> Vec<LetterTile> {
    match try_generate_pool(word, pool_size, rng) {
        Ok(tiles) => tiles,
        Err(err) => {
            warn!(word, %err, "letter generation failed, using fallback set");
            fallback_pool(word, pool_size, rng)
        }
    }
}

/// Weighted generator. Returns an error for empty or non-alphabetic words.
pub fn try_generate_pool<R: Rng>(
    word: &str,
    pool_size: usize,
    rng: &mut R,
) -> Result<Vec<LetterTile>, GenerateError> {
    let targets: Vec<char> = word.trim().chars().map(|c| c.to_ascii_uppercase()).collect();
    if targets.is_empty() {
        return Err(GenerateError::EmptyWord);
    }
    if let Some(bad) = targets.iter().find(|c| !c.is_ascii_uppercase()) {
        return Err(GenerateError::UnsupportedCharacter(*bad));
    }

    let size = pool_size_for(targets.len(), pool_size);
    let near = near_letters(&targets);
    let mut counts = [0usize; 26];
    for c in &targets {
        counts[letter_index(*c)] += 1;
    }

    let mut tiles: Vec<LetterTile> = targets.iter().map(|c| LetterTile::new(*c)).collect();
    for _ in targets.len()..size {
        let picked = pick_distractor(&targets, &near, rng);
        let letter = apply_cap(picked, &counts, rng);
        counts[letter_index(letter)] += 1;
        tiles.push(LetterTile::new(letter));
    }

    tiles.shuffle(rng);
    debug!(
        word,
        pool = %tiles.iter().map(|t| t.letter).collect::<String>(),
        "generated letter pool"
    );
    Ok(tiles)
}

/// Simple generator: target letters padded with basic letters, shuffled.
pub fn fallback_pool<R: Rng>(word: &str, pool_size: usize, rng: &mut R) -> Vec<LetterTile> {
    let mut tiles: Vec<LetterTile> = word.trim().chars().map(LetterTile::new).collect();
    let extra = pool_size.saturating_sub(tiles.len());
    for _ in 0..extra {
        let letter = BASIC_LETTERS.choose(rng).copied().unwrap_or('E');
        tiles.push(LetterTile::new(letter));
    }
    tiles.shuffle(rng);
    tiles
}

/// Letters within [`NEAR_DISTANCE`] alphabet positions of any target letter,
/// clipped to A-Z.
pub fn near_letters(targets: &[char]) -> Vec<char> {
    let mut near = BTreeSet::new();
    for target in targets.iter().filter(|c| c.is_ascii_uppercase()) {
        let base = letter_index(*target) as i32;
        for delta in -NEAR_DISTANCE..=NEAR_DISTANCE {
            let idx = base + delta;
            if delta != 0 && (0..26).contains(&idx) {
                near.insert(ALPHABET[idx as usize]);
            }
        }
    }
    near.into_iter().collect()
}

fn pick_distractor<R: Rng>(targets: &[char], near: &[char], rng: &mut R) -> char {
    let roll: f64 = rng.random();
    let pick = if roll < REUSE_THRESHOLD {
        targets.choose(rng)
    } else if roll < NEAR_THRESHOLD {
        near.choose(rng)
    } else if roll < FREQUENT_THRESHOLD {
        FREQUENT_LETTERS.choose(rng)
    } else {
        ALPHABET.choose(rng)
    };
    pick.copied()
        .unwrap_or_else(|| ALPHABET[rng.random_range(0..ALPHABET.len())])
}

fn apply_cap<R: Rng>(picked: char, counts: &[usize; 26], rng: &mut R) -> char {
    if counts[letter_index(picked)] < MAX_LETTER_COUNT {
        return picked;
    }
    let rare: Vec<char> = ALPHABET
        .iter()
        .copied()
        .filter(|c| counts[letter_index(*c)] < SUBSTITUTE_BELOW)
        .collect();
    rare.choose(rng).copied().unwrap_or(picked)
}

fn letter_index(c: char) -> usize {
    (c as u8).saturating_sub(b'A') as usize % 26
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};

    const WORDS: [&str; 8] = [
        "crab", "cat", "mississippi", "zebra", "apple", "queue", "butterfly", "a",
    ];

    fn letter_counts(letters: impl Iterator<Item = char>) -> HashMap<char, usize> {
        let mut counts = HashMap::new();
        for c in letters {
            *counts.entry(c).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_pool_size_is_fixed() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            for word in WORDS {
                let pool = generate_pool(word, 15, &mut rng);
                assert_eq!(pool.len(), 15, "word {} seed {}", word, seed);
            }
        }
    }

    #[test]
    fn test_ids_unique_within_and_across_pools() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..50 {
            for tile in generate_pool("crab", 15, &mut rng) {
                assert!(seen.insert(tile.id), "duplicate id {}", tile.id);
            }
        }
    }

    #[test]
    fn test_pool_contains_word_with_multiplicity() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            for word in WORDS {
                let pool = generate_pool(word, 15, &mut rng);
                let have = letter_counts(pool.iter().map(|t| t.letter));
                let need = letter_counts(word.chars().map(|c| c.to_ascii_uppercase()));
                for (letter, count) in need {
                    assert!(
                        have.get(&letter).copied().unwrap_or(0) >= count,
                        "word {} missing {} in seed {}",
                        word,
                        letter,
                        seed
                    );
                }
            }
        }
    }

    #[test]
    fn test_distractors_respect_letter_cap() {
        for seed in 0..300 {
            let mut rng = StdRng::seed_from_u64(seed);
            for word in WORDS {
                let pool = generate_pool(word, 15, &mut rng);
                let have = letter_counts(pool.iter().map(|t| t.letter));
                let need = letter_counts(word.chars().map(|c| c.to_ascii_uppercase()));
                for (letter, count) in have {
                    let in_word = need.get(&letter).copied().unwrap_or(0);
                    assert!(
                        count <= MAX_LETTER_COUNT.max(in_word),
                        "{} appears {} times for {}",
                        letter,
                        count,
                        word
                    );
                }
            }
        }
    }

    #[test]
    fn test_pool_letters_are_uppercase() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool = generate_pool("Crab", 15, &mut rng);
        assert!(pool.iter().all(|t| t.letter.is_ascii_uppercase()));
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        let a: String = generate_pool("crab", 15, &mut rng1).iter().map(|t| t.letter).collect();
        let b: String = generate_pool("crab", 15, &mut rng2).iter().map(|t| t.letter).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_word_falls_back() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            try_generate_pool("  ", 15, &mut rng).unwrap_err(),
            GenerateError::EmptyWord
        );
        let pool = generate_pool("", 15, &mut rng);
        assert_eq!(pool.len(), 15);
        assert!(pool.iter().all(|t| BASIC_LETTERS.contains(&t.letter)));
    }

    #[test]
    fn test_non_alphabetic_word_falls_back() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            try_generate_pool("can't", 15, &mut rng).unwrap_err(),
            GenerateError::UnsupportedCharacter('\'')
        );
        let pool = generate_pool("can't", 15, &mut rng);
        assert_eq!(pool.len(), 15);
        assert!(pool.iter().any(|t| t.letter == '\''));
    }

    #[test]
    fn test_long_word_grows_pool() {
        let mut rng = StdRng::seed_from_u64(9);
        let word = "internationalization";
        let pool = generate_pool(word, 15, &mut rng);
        assert_eq!(pool.len(), word.len());
    }

    #[test]
    fn test_fallback_tolerates_no_extra() {
        let mut rng = StdRng::seed_from_u64(5);
        let pool = fallback_pool("abcdefghijklmnopq", 15, &mut rng);
        assert_eq!(pool.len(), 17);
    }

    #[test]
    fn test_near_letters_clip_to_alphabet() {
        assert_eq!(near_letters(&['A']), vec!['B', 'C']);
        assert_eq!(near_letters(&['Z']), vec!['X', 'Y']);
        assert_eq!(near_letters(&['M']), vec!['K', 'L', 'N', 'O']);
    }

    /// Share of draws each letter should get under the distractor policy.
    fn expected_shares(targets: &[char], near: &[char]) -> HashMap<char, f64> {
        ALPHABET
            .iter()
            .map(|&c| {
                let in_targets = targets.iter().filter(|&&t| t == c).count() as f64;
                let mut share = REUSE_THRESHOLD * in_targets / targets.len() as f64;
                if near.contains(&c) {
                    share += (NEAR_THRESHOLD - REUSE_THRESHOLD) / near.len() as f64;
                }
                if FREQUENT_LETTERS.contains(&c) {
                    share += (FREQUENT_THRESHOLD - NEAR_THRESHOLD) / FREQUENT_LETTERS.len() as f64;
                }
                share += (1.0 - FREQUENT_THRESHOLD) / ALPHABET.len() as f64;
                (c, share)
            })
            .collect()
    }

    fn observed_shares(word: &str, draws: usize, seed: u64) -> HashMap<char, f64> {
        let targets: Vec<char> = word.chars().map(|c| c.to_ascii_uppercase()).collect();
        let near = near_letters(&targets);
        let mut rng = StdRng::seed_from_u64(seed);
        let counts = letter_counts((0..draws).map(|_| pick_distractor(&targets, &near, &mut rng)));
        counts
            .into_iter()
            .map(|(c, n)| (c, n as f64 / draws as f64))
            .collect()
    }

    #[test]
    fn test_distractor_mix_follows_policy() {
        for word in ["crab", "z"] {
            let targets: Vec<char> = word.chars().map(|c| c.to_ascii_uppercase()).collect();
            let expected = expected_shares(&targets, &near_letters(&targets));
            let observed = observed_shares(word, 20_000, 17);
            for c in ALPHABET {
                let want = expected[&c];
                let got = observed.get(&c).copied().unwrap_or(0.0);
                assert!(
                    (want - got).abs() < 0.015,
                    "{}: {} expected {:.3} got {:.3}",
                    word,
                    c,
                    want,
                    got
                );
            }
        }
    }

    #[test]
    fn test_distractor_sources_for_isolated_letter() {
        // Z, its neighbours X and Y, and the frequent letters do not overlap.
        let observed = observed_shares("z", 20_000, 23);
        let share = |letters: &[char]| -> f64 {
            letters
                .iter()
                .map(|c| observed.get(c).copied().unwrap_or(0.0))
                .sum()
        };
        let target = share(&['Z']);
        let near = share(&['X', 'Y']);
        let frequent = share(&FREQUENT_LETTERS);
        assert!((target - 0.30).abs() < 0.02, "target share {:.3}", target);
        assert!((near - 0.41).abs() < 0.02, "near share {:.3}", near);
        assert!((frequent - 0.25).abs() < 0.02, "frequent share {:.3}", frequent);
    }

    #[test]
    fn test_cap_keeps_pick_under_limit() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut counts = [0usize; 26];
        counts[letter_index('E')] = MAX_LETTER_COUNT - 1;
        assert_eq!(apply_cap('E', &counts, &mut rng), 'E');
    }

    #[test]
    fn test_cap_substitutes_rare_letter() {
        let mut counts = [2usize; 26];
        counts[letter_index('E')] = MAX_LETTER_COUNT;
        counts[letter_index('Q')] = 1;
        counts[letter_index('J')] = 0;
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let letter = apply_cap('E', &counts, &mut rng);
            assert!(letter == 'Q' || letter == 'J', "substituted {}", letter);
            assert!(counts[letter_index(letter)] < SUBSTITUTE_BELOW);
        }
    }

    #[test]
    fn test_cap_keeps_pick_when_nothing_is_rare() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut counts = [SUBSTITUTE_BELOW; 26];
        counts[letter_index('E')] = MAX_LETTER_COUNT;
        assert_eq!(apply_cap('E', &counts, &mut rng), 'E');
    }

    #[test]
    fn test_pool_size_for_clamps_up() {
        assert_eq!(pool_size_for(4, 15), 15);
        assert_eq!(pool_size_for(15, 15), 15);
        assert_eq!(pool_size_for(18, 15), 18);
    }
}
