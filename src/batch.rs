use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use image::DynamicImage;
use log::{error, info, warn};

use crate::{
    error::Result,
    glossary::Glossary,
    label, lexicon, rank,
    tokenizer::ChineseTokenizer,
    translate::{self, Translation, TranslationAdapter, Translator},
    ColorMap, WordCloud, WordCloudSize,
};

pub const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc";

#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub data_dir: PathBuf,
    pub stopwords_path: PathBuf,
    pub adhoc_words_path: PathBuf,
    pub glossary_path: PathBuf,
    pub font_path: PathBuf,
    pub output_dir: PathBuf,
    pub words_dir: PathBuf,
    pub max_words: usize,
    /// Let jieba guess words missing from its dictionary.
    pub hmm: bool,
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub prefer_horizontal: f64,
    pub colormap: String,
    pub source_language: String,
    pub target_language: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            data_dir: PathBuf::from("./data/"),
            stopwords_path: PathBuf::from("./special_words/baidu_stopwords.txt"),
            adhoc_words_path: PathBuf::from("./special_words/adhocwords.txt"),
            glossary_path: PathBuf::from("./special_words/glossary.toml"),
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            output_dir: PathBuf::from("./output"),
            words_dir: PathBuf::from("./words"),
            max_words: rank::MAX_WORDS,
            hmm: true,
            width: 1000,
            height: 800,
            background_color: "white".to_string(),
            prefer_horizontal: 0.95,
            colormap: "winter".to_string(),
            source_language: translate::SOURCE_LANGUAGE.to_string(),
            target_language: translate::TARGET_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// Document names with a rendered cloud, in processing order.
    pub rendered: Vec<String>,
    /// Document names that failed, with the reason.
    pub failed: Vec<(String, String)>,
}

/// Text half of the pipeline for one document.
#[derive(Debug)]
pub struct Analysis {
    pub top: Vec<(String, usize)>,
    pub outcomes: Vec<(String, Translation)>,
    pub translations: HashMap<String, String>,
    pub labeled: Vec<(String, usize)>,
}

pub fn analyze<T: Translator>(
    text: &str,
    tokenizer: &ChineseTokenizer,
    stopwords: &HashSet<String>,
    max_words: usize,
    adapter: &TranslationAdapter<T>,
    glossary: &Glossary,
) -> Analysis {
    let tokens = tokenizer
        .tokens(text)
        .filter(|token| rank::is_countable(token, stopwords));
    let top = rank::top_k(tokens, max_words);

    let outcomes = adapter.translate_all(&top);
    let mut translations = translate::into_mapping(&outcomes);
    glossary.apply(&mut translations);

    let labeled = label::compose(&top, &translations);

    Analysis {
        top,
        outcomes,
        translations,
        labeled,
    }
}

/// Everything loaded once and shared by all documents of a run.
struct Pipeline<T> {
    tokenizer: ChineseTokenizer,
    stopwords: HashSet<String>,
    glossary: Glossary,
    adapter: TranslationAdapter<T>,
    cloud: WordCloud,
}

impl<T: Translator> Pipeline<T> {
    fn load(config: &BatchConfig, translator: T) -> Result<Self> {
        let stopwords = lexicon::load_stopwords(&config.stopwords_path)?;
        let adhoc_words = lexicon::load_adhoc_words(&config.adhoc_words_path)?;
        info!(
            "Loaded {} stopwords and {} ad-hoc words",
            stopwords.len(),
            adhoc_words.len()
        );

        let tokenizer = ChineseTokenizer::default()
            .with_words(&adhoc_words)
            .with_hmm(config.hmm);
        let glossary = Glossary::load_or_builtin(&config.glossary_path)?;
        let adapter = TranslationAdapter::new(translator)
            .with_languages(&config.source_language, &config.target_language);

        let colormap: ColorMap = config.colormap.parse()?;
        let cloud = WordCloud::from_font_path(&config.font_path)?
            .with_background_color(&config.background_color)?
            .with_max_words(config.max_words)
            .with_prefer_horizontal(config.prefer_horizontal)
            .with_colormap(colormap)
            .with_stopwords(stopwords.clone());

        fs::create_dir_all(&config.output_dir)?;
        fs::create_dir_all(&config.words_dir)?;

        Ok(Pipeline {
            tokenizer,
            stopwords,
            glossary,
            adapter,
            cloud,
        })
    }

    fn process(&self, config: &BatchConfig, name: &str, text: &str) -> Result<()> {
        info!("[{name}] segmenting and ranking");
        let analysis = analyze(
            text,
            &self.tokenizer,
            &self.stopwords,
            config.max_words,
            &self.adapter,
            &self.glossary,
        );

        let words_path = config.words_dir.join(format!("{name}.txt"));
        fs::write(&words_path, label::dump(&analysis.labeled))?;
        info!("[{name}] wrote labels to {:?}", words_path);

        info!("[{name}] laying out {} labels", analysis.labeled.len());
        let image = self.cloud.generate_from_frequencies(
            &analysis.labeled,
            WordCloudSize::FromDimensions {
                width: config.width,
                height: config.height,
            },
        )?;

        let output_path = config.output_dir.join(format!("{name}.jpg"));
        DynamicImage::ImageRgba8(image).to_rgb8().save(&output_path)?;
        info!("[{name}] saved word cloud to {:?}", output_path);

        Ok(())
    }
}

/// `.txt` files directly inside `dir`, in listing order.
pub fn text_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "txt") {
            files.push(path);
        }
    }
    Ok(files)
}

/// Renders one cloud per `.txt` document. A file that fails is logged and
/// skipped; lexicons, glossary and font are loaded on the first document with
/// text, and failing to load them stops the run.
pub fn run_batch<T: Translator>(config: &BatchConfig, translator: T) -> Result<BatchReport> {
    let mut report = BatchReport::default();

    if !config.data_dir.is_dir() {
        warn!(
            "Directory {:?} does not exist, create it and put your .txt files there",
            config.data_dir
        );
        return Ok(report);
    }

    let files = text_files(&config.data_dir)?;
    info!("Found {} text files in {:?}", files.len(), config.data_dir);

    let mut translator = Some(translator);
    let mut pipeline: Option<Pipeline<T>> = None;
    let mut found_text = false;

    for path in files {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to read {:?}: {e}", path);
                report.failed.push((name, e.to_string()));
                continue;
            }
        };
        if text.trim().is_empty() {
            warn!("[{name}] is empty, skipping");
            continue;
        }
        found_text = true;

        if pipeline.is_none() {
            if let Some(translator) = translator.take() {
                pipeline = Some(Pipeline::load(config, translator)?);
            }
        }
        let Some(pipeline) = pipeline.as_ref() else {
            continue;
        };

        match pipeline.process(config, &name, &text) {
            Ok(()) => report.rendered.push(name),
            Err(e) => {
                error!("[{name}] failed: {e}");
                report.failed.push((name, e.to_string()));
            }
        }
    }

    if !found_text {
        warn!("No text content found in {:?}", config.data_dir);
    }

    info!(
        "Rendered {} word clouds, {} failed",
        report.rendered.len(),
        report.failed.len()
    );
    Ok(report)
}
