use jieba_rs::Jieba;
use regex::Regex;

pub struct ChineseTokenizer {
    //分词正则
    regex: Regex,
    pub jieba: Jieba,
    pub hmm: bool,
}

impl Default for ChineseTokenizer {
    fn default() -> Self {
        let regex = Regex::new("\\w[\\w']*").expect("Unable to compile tokenization regex");

        ChineseTokenizer {
            regex,
            jieba: Jieba::new(),
            hmm: true,
        }
    }
}

impl<'a> ChineseTokenizer {
    /// 加入自定义词汇，保证专有名词不被切开
    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.jieba.add_word(word.as_ref(), None, None);
        }
        self
    }

    pub fn with_hmm(mut self, value: bool) -> Self {
        self.hmm = value;
        self
    }

    /// Lazily segments `text`. No filtering happens here; punctuation and
    /// whitespace are dropped by the word-run regex before segmentation.
    pub fn tokens(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.regex
            .find_iter(text)
            .map(|mat| mat.as_str())
            .filter(|str| !str.is_empty())
            .flat_map(move |str| self.jieba.cut(str, self.hmm))
    }
}
