use std::collections::HashMap;

/// `"token translation"` for every ranked token, counts and order unchanged.
/// An empty translation leaves a trailing space.
pub fn compose(
    top: &[(String, usize)],
    translations: &HashMap<String, String>,
) -> Vec<(String, usize)> {
    top.iter()
        .map(|(token, count)| {
            let translation = translations.get(token).map(String::as_str).unwrap_or("");
            (format!("{token} {translation}"), *count)
        })
        .collect()
}

/// Each label repeated `count` times, every repetition prefixed by a space.
pub fn dump(labeled: &[(String, usize)]) -> String {
    let capacity = labeled.iter().map(|(label, count)| (label.len() + 1) * count).sum();
    let mut out = String::with_capacity(capacity);

    for (label, count) in labeled {
        for _ in 0..*count {
            out.push(' ');
            out.push_str(label);
        }
    }

    out
}
