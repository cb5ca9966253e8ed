use std::{collections::HashSet, fs, path::Path};

use ab_glyph::{point, FontVec, Point, PxScale};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use log::debug;
use nanorand::{Rng, WyRand};
use sat::Rect;
use text::GlyphData;

pub use colormap::ColorMap;
pub use error::{Error, Result};
pub use glossary::Glossary;
pub use tokenizer::ChineseTokenizer;
pub use translate::{Backend, HttpTranslator, Translation, TranslationAdapter, Translator};

pub mod batch;
pub mod colormap;
pub mod error;
pub mod figure;
pub mod glossary;
pub mod label;
pub mod lexicon;
pub mod rank;
mod sat;
mod text;
pub mod tokenizer;
pub mod translate;

/// One placed label: where it goes, how big, which way up and in what color.
pub struct Word<'a> {
    pub text: &'a str,
    pub font_size: PxScale,
    pub glyphs: GlyphData,
    pub rotated: bool,
    pub position: Point,
    pub frequency: f32,
    pub color: Rgba<u8>,
    pub index: usize,
}

pub enum WordCloudSize {
    FromDimensions { width: u32, height: u32 },
}

impl WordCloudSize {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            WordCloudSize::FromDimensions { width, height } => (*width, *height),
        }
    }
}

pub struct WordCloud {
    background_color: Rgba<u8>,
    pub font: FontVec,
    stopwords: HashSet<String>,
    colormap: ColorMap,
    max_words: usize,
    min_font_size: f32,
    max_font_size: Option<f32>,
    font_step: f32,
    word_margin: u32,
    prefer_horizontal: f64,
    relative_font_scaling: f32,
    rng_seed: Option<u64>,
}

impl WordCloud {
    pub fn new(font: FontVec) -> Self {
        WordCloud {
            background_color: Rgba([0xFF, 0xFF, 0xFF, 0xFF]),
            font,
            stopwords: HashSet::new(),
            colormap: ColorMap::default(),
            max_words: rank::MAX_WORDS,
            min_font_size: 4.0,
            max_font_size: None,
            font_step: 1.0,
            word_margin: 2,
            prefer_horizontal: 0.95,
            relative_font_scaling: 0.5,
            rng_seed: None,
        }
    }

    /// CJK glyphs need a real font on disk, so a missing one is fatal.
    pub fn from_font_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let font_file = fs::read(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        let font =
            FontVec::try_from_vec(font_file).map_err(|_| Error::InvalidFont(path.to_path_buf()))?;

        Ok(Self::new(font))
    }

    /// Accepts any CSS color, e.g. `"white"` or `"#102030"`.
    pub fn with_background_color(mut self, value: &str) -> Result<Self> {
        let [r, g, b, a] = csscolorparser::parse(value)?.to_rgba8();
        self.background_color = Rgba([r, g, b, a]);
        Ok(self)
    }

    pub fn with_stopwords(mut self, value: HashSet<String>) -> Self {
        self.stopwords = value;
        self
    }

    pub fn with_colormap(mut self, value: ColorMap) -> Self {
        self.colormap = value;
        self
    }

    pub fn with_max_words(mut self, value: usize) -> Self {
        self.max_words = value;
        self
    }

    pub fn with_min_font_size(mut self, value: f32) -> Self {
        self.min_font_size = value;
        self
    }

    pub fn with_max_font_size(mut self, value: Option<f32>) -> Self {
        self.max_font_size = value;
        self
    }

    pub fn with_font_step(mut self, value: f32) -> Self {
        self.font_step = value.max(0.5);
        self
    }

    pub fn with_word_margin(mut self, value: u32) -> Self {
        self.word_margin = value;
        self
    }

    /// Share of words laid out horizontally, `0.0..=1.0`.
    pub fn with_prefer_horizontal(mut self, value: f64) -> Self {
        self.prefer_horizontal = value.clamp(0.0, 1.0);
        self
    }

    pub fn with_relative_font_scaling(mut self, value: f32) -> Self {
        self.relative_font_scaling = value.clamp(0.0, 1.0);
        self
    }

    pub fn with_rng_seed(mut self, value: u64) -> Self {
        self.rng_seed = Some(value);
        self
    }

    fn rng(&self) -> WyRand {
        match self.rng_seed {
            Some(seed) => WyRand::new_seed(seed),
            None => WyRand::new(),
        }
    }

    /// Labels whose token (text before the first space) is a stopword are left out.
    fn is_stopword(&self, label: &str) -> bool {
        let token = label.split(' ').next().unwrap_or(label);
        self.stopwords.contains(token) || self.stopwords.contains(label.trim_end())
    }

    pub fn layout<'a>(
        &'a self,
        frequencies: &'a [(String, usize)],
        size: &WordCloudSize,
    ) -> Result<Vec<Word<'a>>> {
        let colormap = self.colormap;
        self.layout_with_color_func(frequencies, size, &|_: &Word<'_>, rng: &mut WyRand| {
            colormap.random_color(rng)
        })
    }

    /// Places the most frequent labels first, shrinking each until it fits.
    pub fn layout_with_color_func<'a>(
        &'a self,
        frequencies: &'a [(String, usize)],
        size: &WordCloudSize,
        color_func: &dyn Fn(&Word, &mut WyRand) -> Rgba<u8>,
    ) -> Result<Vec<Word<'a>>> {
        let mut words: Vec<(&str, usize)> = frequencies
            .iter()
            .filter(|(label, count)| *count > 0 && !self.is_stopword(label))
            .map(|(label, count)| (label.as_str(), *count))
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1));
        if self.max_words > 0 {
            words.truncate(self.max_words);
        }

        let max_count = match words.first() {
            Some((_, count)) => *count as f32,
            None => return Err(Error::NoWords),
        };

        let (width, height) = size.dimensions();
        let mut gray_buffer = GrayImage::from_pixel(width, height, Luma([0]));
        let mut summed_area_table = vec![0u32; (width as usize) * (height as usize)];
        let mut rng = self.rng();

        //使用第一个词的长宽来作为参考
        let mut font_size = match self.max_font_size {
            Some(size) => size,
            None => {
                let rect_at_image_height = self.text_dimensions_at_font_size(
                    words[0].0,
                    PxScale::from(height as f32 * 0.95),
                );
                let height_ratio =
                    rect_at_image_height.height as f32 / rect_at_image_height.width.max(1) as f32;
                (width as f32 * height_ratio).min(height as f32 * 0.95)
            }
        };

        let mut last_freq = 1.0;
        let mut final_words = Vec::with_capacity(words.len());

        'words: for (index, (text, count)) in words.into_iter().enumerate() {
            let frequency = count as f32 / max_count;
            if self.relative_font_scaling > 0.0 {
                let rs = self.relative_font_scaling;
                font_size = ((rs * (frequency / last_freq) + (1.0 - rs)) * font_size).round();
            }

            let mut rotated = self.roll_rotation(&mut rng);
            let mut tried_other_orientation = false;

            let (glyphs, found, rect) = loop {
                if font_size < self.min_font_size {
                    debug!("Font size fell below {} at '{text}'", self.min_font_size);
                    break 'words;
                }

                let glyphs = text::text_to_glyphs(text, &self.font, PxScale::from(font_size));
                let (text_width, text_height) = glyphs.extent(rotated);
                let rect = Rect {
                    width: text_width + self.word_margin,
                    height: text_height + self.word_margin,
                };

                if let Some(found) = sat::find_space_for_rect(
                    &summed_area_table,
                    width,
                    height,
                    &rect,
                    &mut rng,
                ) {
                    break (glyphs, found, rect);
                }

                if !tried_other_orientation && self.prefer_horizontal < 1.0 {
                    rotated = !rotated;
                    tried_other_orientation = true;
                } else {
                    font_size -= self.font_step;
                    rotated = false;
                }
            };

            // the free region starts one pixel past the reported corner
            let position = point(
                (found.x + 1 + self.word_margin / 2) as f32,
                (found.y + 1 + self.word_margin / 2) as f32,
            );
            text::draw_glyphs_to_gray_buffer(
                &mut gray_buffer,
                &glyphs,
                &self.font,
                position,
                rotated,
            );
            // glyph outlines may overshoot their box upwards
            let dirty_row = found.y.saturating_sub(rect.height / 4);
            sat::update_summed_area_table(&mut summed_area_table, &gray_buffer, dirty_row as usize);

            let mut word = Word {
                text,
                font_size: PxScale::from(font_size),
                glyphs,
                rotated,
                position,
                frequency,
                color: Rgba([0, 0, 0, 0xFF]),
                index,
            };
            word.color = color_func(&word, &mut rng);
            final_words.push(word);

            last_freq = frequency;
        }

        debug!("Placed {} words", final_words.len());
        Ok(final_words)
    }

    fn roll_rotation(&self, rng: &mut WyRand) -> bool {
        let roll = rng.generate_range(0..10_000u32) as f64 / 10_000.0;
        roll >= self.prefer_horizontal
    }

    pub fn render(&self, words: &[Word], size: &WordCloudSize) -> RgbaImage {
        let (width, height) = size.dimensions();
        let mut final_image_buffer = RgbaImage::from_pixel(width, height, self.background_color);

        for word in words {
            text::draw_glyphs_to_rgba_buffer(
                &mut final_image_buffer,
                &word.glyphs,
                &self.font,
                word.position,
                word.rotated,
                word.color,
            )
        }

        final_image_buffer
    }

    pub fn generate_from_frequencies(
        &self,
        frequencies: &[(String, usize)],
        size: WordCloudSize,
    ) -> Result<RgbaImage> {
        let words = self.layout(frequencies, &size)?;
        Ok(self.render(&words, &size))
    }

    fn text_dimensions_at_font_size(&self, text: &str, font_size: PxScale) -> Rect {
        let glyphs = text::text_to_glyphs(text, &self.font, font_size);
        Rect {
            width: glyphs.width + self.word_margin,
            height: glyphs.height + self.word_margin,
        }
    }
}
