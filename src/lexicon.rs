use std::{collections::HashSet, fs, path::Path};

use log::debug;

use crate::error::{Error, Result};

/// 常用虚词和英文停用词，停用词文件不全时兜底
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "的", "是", "了", "在", "也", "和", "就", "都", "我", "你", "他", "她", "它", "我们", "你们",
    "他们", "一种", "这个", "那个", "一个", "a", "about", "above", "after", "again", "against",
    "all", "also", "am", "an", "and", "any", "are", "aren't", "as", "at", "be", "because",
    "been", "before", "being", "below", "between", "both", "but", "by", "can", "cannot",
    "could", "couldn't", "did", "didn't", "do", "does", "doesn't", "doing", "don't", "down",
    "during", "each", "else", "ever", "few", "for", "from", "further", "get", "had", "hadn't",
    "has", "hasn't", "have", "haven't", "having", "he", "he'd", "he'll", "he's", "her", "here",
    "here's", "hers", "herself", "him", "himself", "his", "how", "how's", "however", "i",
    "i'd", "i'll", "i'm", "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its",
    "itself", "just", "let's", "like", "me", "more", "most", "mustn't", "my", "myself", "no",
    "nor", "not", "of", "off", "on", "once", "only", "or", "other", "otherwise", "ought",
    "our", "ours", "ourselves", "out", "over", "own", "same", "shall", "shan't", "she",
    "she'd", "she'll", "she's", "should", "shouldn't", "since", "so", "some", "such", "than",
    "that", "that's", "the", "their", "theirs", "them", "themselves", "then", "there",
    "there's", "these", "they", "they'd", "they'll", "they're", "they've", "this", "those",
    "through", "to", "too", "under", "until", "up", "very", "was", "wasn't", "we", "we'd",
    "we'll", "we're", "we've", "were", "weren't", "what", "what's", "when", "when's", "where",
    "where's", "which", "while", "who", "who's", "whom", "why", "why's", "with", "won't",
    "would", "wouldn't", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
    "yourself", "yourselves",
];

/// Reads one entry per line, trimmed, skipping blank lines.
pub fn load_words(path: impl AsRef<Path>) -> Result<HashSet<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| Error::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let words: HashSet<String> = content
        .trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    debug!("Loaded {} words from {:?}", words.len(), path);
    Ok(words)
}

pub fn load_stopwords(path: impl AsRef<Path>) -> Result<HashSet<String>> {
    let mut stopwords = load_words(path)?;
    stopwords.extend(DEFAULT_STOPWORDS.iter().map(|word| word.to_string()));
    Ok(stopwords)
}

pub fn load_adhoc_words(path: impl AsRef<Path>) -> Result<HashSet<String>> {
    load_words(path)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn trims_lines_and_drops_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, "\u{feff}万事屋\n  攘夷战争  \n\n\t\n登势婆婆\r\n").unwrap();

        let words = load_words(&path).unwrap();

        assert_eq!(words.len(), 3);
        assert!(words.contains("万事屋"));
        assert!(words.contains("攘夷战争"));
        assert!(words.contains("登势婆婆"));
    }

    #[test]
    fn stopwords_include_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stopwords.txt");
        fs::write(&path, "而且\n").unwrap();

        let stopwords = load_stopwords(&path).unwrap();

        assert!(stopwords.contains("而且"));
        assert!(stopwords.contains("我们"));
        assert!(stopwords.contains("the"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");

        match load_stopwords(&path) {
            Err(Error::ReadFile { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected a read error, got {other:?}"),
        }
    }
}
