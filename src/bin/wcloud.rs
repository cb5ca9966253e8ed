use std::path::PathBuf;

use anyhow::Result;
use bilingual_wcloud::{
    batch::{self, BatchConfig},
    Backend, HttpTranslator,
};
use clap::Parser;
use log::info;

/// 为每个中文文本生成带英文翻译的词云
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the .txt documents
    #[clap(long, default_value = "./data/")]
    data_dir: PathBuf,

    #[clap(long, default_value = "./special_words/baidu_stopwords.txt")]
    stopwords: PathBuf,

    /// Vocabulary the segmenter must keep whole
    #[clap(long, default_value = "./special_words/adhocwords.txt")]
    adhoc_words: PathBuf,

    /// Curated translations; the bundled glossary is used when absent
    #[clap(long, default_value = "./special_words/glossary.toml")]
    glossary: PathBuf,

    /// A font with CJK glyphs
    #[clap(long, default_value = batch::DEFAULT_FONT_PATH)]
    font: PathBuf,

    #[clap(long, default_value = "./output")]
    output_dir: PathBuf,

    /// Where the label dumps go
    #[clap(long, default_value = "./words")]
    words_dir: PathBuf,

    #[clap(long, default_value_t = 100)]
    max_words: usize,

    /// Only split text into dictionary words
    #[clap(long)]
    no_hmm: bool,

    #[clap(long, default_value_t = 1000)]
    width: u32,

    #[clap(long, default_value_t = 800)]
    height: u32,

    #[clap(long, default_value = "white")]
    background: String,

    #[clap(long, default_value_t = 0.95)]
    prefer_horizontal: f64,

    /// winter, summer, autumn, spring, cool or gray
    #[clap(long, default_value = "winter")]
    colormap: String,

    /// google or mymemory
    #[clap(long, default_value = "google")]
    translator: String,

    #[clap(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn to_config(&self) -> BatchConfig {
        BatchConfig {
            data_dir: self.data_dir.clone(),
            stopwords_path: self.stopwords.clone(),
            adhoc_words_path: self.adhoc_words.clone(),
            glossary_path: self.glossary.clone(),
            font_path: self.font.clone(),
            output_dir: self.output_dir.clone(),
            words_dir: self.words_dir.clone(),
            max_words: self.max_words,
            hmm: !self.no_hmm,
            width: self.width,
            height: self.height,
            background_color: self.background.clone(),
            prefer_horizontal: self.prefer_horizontal,
            colormap: self.colormap.clone(),
            ..BatchConfig::default()
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    let backend: Backend = args.translator.parse()?;
    let translator = HttpTranslator::new(backend)?;

    let report = batch::run_batch(&args.to_config(), translator)?;
    for (name, reason) in &report.failed {
        info!("  {name}: {reason}");
    }

    Ok(())
}
