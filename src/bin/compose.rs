use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use bilingual_wcloud::{
    batch::DEFAULT_FONT_PATH,
    figure::{self, FigureComposer, GridShape, Tile},
};
use clap::Parser;
use log::warn;

const SVG_FILENAMES: [&str; 6] = [
    "gintoki.svg",
    "gintoki-deepseek.svg",
    "gintoki-doubao.svg",
    "saber.svg",
    "saber-deepseek.svg",
    "saber-doubao.svg",
];

const CAPTIONS: [&str; 6] = [
    "Gintoki - Human",
    "Gintoki - DeepSeek",
    "Gintoki - Doubao",
    "Gintoki - Human",
    "Gintoki - DeepSeek",
    "Gintoki - Doubao",
];

/// 把多张词云拼成一张带标题的网格图
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Folder the tile files are read from
    #[clap(long, default_value = "./output/msyh")]
    folder: PathBuf,

    #[clap(long, default_value = "combined.png")]
    output: PathBuf,

    /// Font for captions; captions are skipped when it cannot be loaded
    #[clap(long, default_value = DEFAULT_FONT_PATH)]
    font: PathBuf,

    #[clap(long, default_value_t = 2)]
    rows: u32,

    #[clap(long, default_value_t = 3)]
    cols: u32,

    /// Caption text height in pixels
    #[clap(long, default_value_t = 40.0)]
    caption_scale: f32,

    /// Tile as `file=caption`, repeatable; replaces the built-in six
    #[clap(long = "tile")]
    tiles: Vec<String>,

    #[clap(long, default_value = "info")]
    log_level: String,
}

fn parse_tile(folder: &Path, value: &str) -> Result<Tile> {
    let Some((file, caption)) = value.split_once('=') else {
        bail!("tile '{value}' should look like file=caption");
    };
    Ok(Tile {
        path: folder.join(file),
        caption: caption.to_string(),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    let shape = GridShape {
        rows: args.rows,
        cols: args.cols,
    };

    let tiles = if args.tiles.is_empty() {
        figure::tiles_from_lists(&args.folder, &SVG_FILENAMES, &CAPTIONS, shape)?
    } else {
        args.tiles
            .iter()
            .map(|value| parse_tile(&args.folder, value))
            .collect::<Result<Vec<_>>>()?
    };

    let mut composer = FigureComposer::default()
        .with_shape(shape)
        .with_caption_scale(args.caption_scale);
    match figure::load_font(&args.font) {
        Ok(font) => composer = composer.with_font(font),
        Err(e) => warn!("Captions disabled: {e}"),
    }

    composer.compose_to_file(&tiles, &args.output)?;
    Ok(())
}
