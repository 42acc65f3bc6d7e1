//! Code similarity measure used by the anti-cheat scan.

use std::collections::HashMap;

/// Pairs scoring at or above this ratio are reported.
pub const DEFAULT_THRESHOLD: f64 = 0.92;

/// Reduce source text to a comparable form: structural punctuation
/// (`; { } ( ) [ ] ,`) becomes whitespace, whitespace runs collapse to a
/// single space, and the result is lower-cased.
pub fn normalize_code(code: &str) -> String {
    let spaced: String = code
        .chars()
        .map(|c| match c {
            ';' | '{' | '}' | '(' | ')' | '[' | ']' | ',' => ' ',
            other => other,
        })
        .collect();
    spaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Sequence similarity `2*M / T`, where `M` counts the characters in the
/// matching blocks found by recursive longest-common-substring search and
/// `T` is the combined length. Two empty strings score `1.0`.
///
/// The inputs are put in a canonical order first, so
/// `ratio(a, b) == ratio(b, a)` holds exactly.
pub fn ratio(a: &str, b: &str) -> f64 {
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, &b2j, (alo, ahi), (blo, bhi));
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest block `a[i..i+k] == b[j..j+k]` inside the given windows,
/// preferring the earliest start in `a`, then in `b`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // j -> length of the match ending at (previous i, j)
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run_lengths.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next.insert(j, k);
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        run_lengths = next;
    }
    (best_i, best_j, best_k)
}
