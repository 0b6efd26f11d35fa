//! Character-level sequence similarity (Ratcliff–Obershelp).

use std::collections::HashMap;

/// Similarity ratio of two strings in `[0, 1]`: `2 * M / T` where `M` is the
/// total length of the longest matching blocks and `T` the combined length of
/// both inputs. 1.0 means identical, 0.0 means no character in common.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let mut positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, ch) in b.iter().enumerate() {
        positions.entry(*ch).or_default().push(j);
    }

    let matched = matched_len(&a, &positions, 0, a.len(), 0, b.len());
    2.0 * matched as f64 / total as f64
}

/// Total length of matching blocks inside `a[alo..ahi]` x `b[blo..bhi]`:
/// longest common block, then recurse on both sides of it.
fn matched_len(
    a: &[char],
    positions: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> usize {
    let (i, j, k) = longest_block(a, positions, alo, ahi, blo, bhi);
    if k == 0 {
        return 0;
    }
    k + matched_len(a, positions, alo, i, blo, j)
        + matched_len(a, positions, i + k, ahi, j + k, bhi)
}

/// Longest matching block as `(start_a, start_b, len)`; `len == 0` when the
/// ranges share nothing.
fn longest_block(
    a: &[char],
    positions: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0usize);
    // run lengths of matches ending at each b-position for the previous row
    let mut run_ends: HashMap<usize, usize> = HashMap::new();

    for i in alo..ahi {
        let mut next_runs: HashMap<usize, usize> = HashMap::new();
        if let Some(js) = positions.get(&a[i]) {
            for &j in js {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let len = if j > blo {
                    run_ends.get(&(j - 1)).copied().unwrap_or(0) + 1
                } else {
                    1
                };
                next_runs.insert(j, len);
                if len > best.2 {
                    best = (i + 1 - len, j + 1 - len, len);
                }
            }
        }
        run_ends = next_runs;
    }

    best
}
