use std::collections::{HashMap, HashSet};

pub const MAX_WORDS: usize = 100;

/// 过滤停用词和单字
pub fn is_countable(token: &str, stopwords: &HashSet<String>) -> bool {
    !stopwords.contains(token) && token.trim().chars().count() > 1
}

/// Counts occurrences, keeping tokens in the order they were first seen.
pub fn count<I, S>(tokens: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str> + Into<String>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for token in tokens {
        match positions.get(token.as_ref()) {
            Some(&index) => counts[index].1 += 1,
            None => {
                let token: String = token.into();
                positions.insert(token.clone(), counts.len());
                counts.push((token, 1));
            }
        }
    }

    counts
}

/// Most common first; equal counts keep first-seen order. `k == 0` keeps everything.
pub fn top_k<I, S>(tokens: I, k: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str> + Into<String>,
{
    let mut counts = count(tokens);
    // sort_by is stable, so ties stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    if k > 0 {
        counts.truncate(k);
    }

    counts
}
