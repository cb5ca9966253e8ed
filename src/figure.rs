use std::{
    fs,
    path::{Path, PathBuf},
};

use ab_glyph::{FontVec, PxScale};
use image::{
    imageops::{self, FilterType},
    Rgba, RgbaImage,
};
use log::{info, warn};
use resvg::{tiny_skia, usvg};

use crate::{
    error::{Error, Result},
    text,
};

const PLACEHOLDER_COLOR: Rgba<u8> = Rgba([0xD0, 0x20, 0x20, 0xFF]);
const CAPTION_COLOR: Rgba<u8> = Rgba([0x20, 0x20, 0x20, 0xFF]);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub path: PathBuf,
    pub caption: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridShape {
    pub rows: u32,
    pub cols: u32,
}

impl GridShape {
    pub fn cells(&self) -> usize {
        (self.rows * self.cols) as usize
    }
}

impl Default for GridShape {
    fn default() -> Self {
        GridShape { rows: 2, cols: 3 }
    }
}

pub fn load_font(path: impl AsRef<Path>) -> Result<FontVec> {
    let path = path.as_ref();
    let font_file = fs::read(path).map_err(|source| Error::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    FontVec::try_from_vec(font_file).map_err(|_| Error::InvalidFont(path.to_path_buf()))
}

/// Pairs file names under `folder` with captions, in order.
pub fn tiles_from_lists(
    folder: impl AsRef<Path>,
    names: &[&str],
    captions: &[&str],
    shape: GridShape,
) -> Result<Vec<Tile>> {
    if names.len() != shape.cells() || captions.len() != shape.cells() {
        return Err(Error::GridMismatch {
            expected: shape.cells(),
            names: names.len(),
            captions: captions.len(),
        });
    }

    Ok(names
        .iter()
        .zip(captions)
        .map(|(name, caption)| Tile {
            path: folder.as_ref().join(name),
            caption: caption.to_string(),
        })
        .collect())
}

/// Lays captioned tiles out on a grid, one tile per cell, row by row.
pub struct FigureComposer {
    shape: GridShape,
    cell_width: u32,
    cell_height: u32,
    caption_height: u32,
    caption_scale: f32,
    background_color: Rgba<u8>,
    font: Option<FontVec>,
}

impl Default for FigureComposer {
    fn default() -> Self {
        FigureComposer {
            shape: GridShape::default(),
            cell_width: 1000,
            cell_height: 800,
            caption_height: 80,
            caption_scale: 40.0,
            background_color: Rgba([0xFF, 0xFF, 0xFF, 0xFF]),
            font: None,
        }
    }
}

impl FigureComposer {
    pub fn with_shape(mut self, value: GridShape) -> Self {
        self.shape = value;
        self
    }

    pub fn with_cell_size(mut self, width: u32, height: u32) -> Self {
        self.cell_width = width.max(1);
        self.cell_height = height.max(1);
        self
    }

    pub fn with_caption_height(mut self, value: u32) -> Self {
        self.caption_height = value;
        self
    }

    pub fn with_caption_scale(mut self, value: f32) -> Self {
        self.caption_scale = value;
        self
    }

    /// Without a font, captions and placeholder messages are left out.
    pub fn with_font(mut self, value: FontVec) -> Self {
        self.font = Some(value);
        self
    }

    /// Fails before touching any file unless there is exactly one tile per cell.
    pub fn compose(&self, tiles: &[Tile]) -> Result<RgbaImage> {
        if tiles.len() != self.shape.cells() {
            return Err(Error::GridMismatch {
                expected: self.shape.cells(),
                names: tiles.len(),
                captions: tiles.len(),
            });
        }

        let row_height = self.cell_height + self.caption_height;
        let mut canvas = RgbaImage::from_pixel(
            self.shape.cols * self.cell_width,
            self.shape.rows * row_height,
            self.background_color,
        );

        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();

        for (i, tile) in tiles.iter().enumerate() {
            let i = i as u32;
            let x0 = (i % self.shape.cols) * self.cell_width;
            let y0 = (i / self.shape.cols) * row_height;

            match load_tile(&tile.path, &options) {
                Ok(image) => {
                    self.draw_tile(&mut canvas, &image, x0, y0);
                    self.draw_caption(&mut canvas, &tile.caption, x0, y0);
                }
                Err(e) => {
                    warn!("Unable to load tile {:?}: {e}", tile.path);
                    self.draw_placeholder(&mut canvas, tile, &e, x0, y0);
                }
            }
        }

        Ok(canvas)
    }

    pub fn compose_to_file(&self, tiles: &[Tile], output: impl AsRef<Path>) -> Result<()> {
        let figure = self.compose(tiles)?;
        figure.save(output.as_ref())?;
        info!("Saved combined figure to {:?}", output.as_ref());
        Ok(())
    }

    fn draw_tile(&self, canvas: &mut RgbaImage, image: &RgbaImage, x0: u32, y0: u32) {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        let scale = (self.cell_width as f32 / width as f32)
            .min(self.cell_height as f32 / height as f32);
        let fit_width = ((width as f32 * scale).round() as u32).clamp(1, self.cell_width);
        let fit_height = ((height as f32 * scale).round() as u32).clamp(1, self.cell_height);
        let fitted = imageops::resize(image, fit_width, fit_height, FilterType::Triangle);

        let x = x0 + (self.cell_width - fit_width) / 2;
        let y = y0 + (self.cell_height - fit_height) / 2;
        imageops::overlay(canvas, &fitted, x as i64, y as i64);
    }

    fn draw_caption(&self, canvas: &mut RgbaImage, caption: &str, x0: u32, y0: u32) {
        let Some(font) = &self.font else {
            return;
        };
        if caption.is_empty() || self.caption_height == 0 {
            return;
        }

        text::draw_centered_text(
            canvas,
            caption,
            font,
            PxScale::from(self.caption_scale),
            (x0 + self.cell_width / 2) as i64,
            (y0 + self.cell_height + self.caption_height / 8) as i64,
            CAPTION_COLOR,
        );
    }

    /// Red frame with a cross, plus the reason when a font is available.
    fn draw_placeholder(
        &self,
        canvas: &mut RgbaImage,
        tile: &Tile,
        error: &Error,
        x0: u32,
        y0: u32,
    ) {
        let (w, h) = (self.cell_width as u64, self.cell_height as u64);
        let thickness = 3u64.min(w).min(h);
        let stroke = w.max(h) * 2;

        for y in 0..h {
            for x in 0..w {
                let on_frame =
                    x < thickness || y < thickness || x >= w - thickness || y >= h - thickness;
                let diagonal = (x * h).abs_diff(y * w) < stroke;
                let anti_diagonal = (x * h).abs_diff((h - 1 - y) * w) < stroke;
                if on_frame || diagonal || anti_diagonal {
                    canvas.put_pixel(x0 + x as u32, y0 + y as u32, PLACEHOLDER_COLOR);
                }
            }
        }

        let Some(font) = &self.font else {
            return;
        };
        let name = tile
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let message = match error {
            Error::ReadFile { .. } => format!("文件未找到:\n{name}"),
            _ => format!("无法加载\n{name}"),
        };
        text::draw_centered_text(
            canvas,
            &message,
            font,
            PxScale::from(self.caption_scale),
            (x0 + self.cell_width / 2) as i64,
            (y0 + self.cell_height / 2) as i64 - self.caption_scale as i64,
            PLACEHOLDER_COLOR,
        );
    }
}

fn load_tile(path: &Path, options: &usvg::Options) -> Result<RgbaImage> {
    let is_svg = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("svg"));

    if is_svg {
        rasterize_svg(path, options)
    } else {
        if !path.exists() {
            return Err(Error::ReadFile {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        Ok(image::open(path)?.to_rgba8())
    }
}

/// Renders at the document's own size.
fn rasterize_svg(path: &Path, options: &usvg::Options) -> Result<RgbaImage> {
    let data = fs::read(path).map_err(|source| Error::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let tree = usvg::Tree::from_data(&data, options)?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| Error::Generic(format!("{path:?} has an empty canvas")))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    Ok(RgbaImage::from_fn(size.width(), size.height(), |x, y| {
        match pixmap.pixel(x, y) {
            Some(px) => {
                let c = px.demultiply();
                Rgba([c.red(), c.green(), c.blue(), c.alpha()])
            }
            None => Rgba([0, 0, 0, 0]),
        }
    }))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use image::{Rgba, RgbaImage};

    use super::*;

    const NAMES: [&str; 6] = ["a.svg", "b.svg", "c.svg", "d.svg", "e.svg", "f.svg"];
    const CAPTIONS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

    fn small_composer() -> FigureComposer {
        FigureComposer::default()
            .with_cell_size(60, 40)
            .with_caption_height(10)
    }

    #[test]
    fn mismatched_lists_abort() {
        let err = tiles_from_lists("/nonexistent", &NAMES[..5], &CAPTIONS, GridShape::default())
            .unwrap_err();

        assert!(matches!(
            err,
            Error::GridMismatch {
                expected: 6,
                names: 5,
                captions: 6
            }
        ));
    }

    #[test]
    fn too_few_tiles_abort_before_any_io() {
        let tiles: Vec<Tile> = NAMES[..5]
            .iter()
            .map(|name| Tile {
                path: PathBuf::from("/nonexistent").join(name),
                caption: String::new(),
            })
            .collect();

        // a missing file would otherwise become a placeholder, not an error
        assert!(matches!(
            small_composer().compose(&tiles),
            Err(Error::GridMismatch { expected: 6, .. })
        ));
    }

    #[test]
    fn missing_tile_becomes_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="30" height="20">
            <rect width="30" height="20" fill="#00ff00"/>
        </svg>"##;
        for name in &NAMES[1..] {
            fs::write(dir.path().join(name), svg).unwrap();
        }
        let tiles = tiles_from_lists(dir.path(), &NAMES, &CAPTIONS, GridShape::default()).unwrap();
        let output = dir.path().join("combined.png");

        small_composer().compose_to_file(&tiles, &output).unwrap();

        let figure = image::open(&output).unwrap().to_rgba8();
        assert_eq!(figure.dimensions(), (180, 100));
        // first cell: placeholder frame
        assert_eq!(*figure.get_pixel(1, 1), PLACEHOLDER_COLOR);
        // second cell: the green svg, centred
        assert_eq!(*figure.get_pixel(60 + 30, 20), Rgba([0, 255, 0, 255]));
        // second row, last cell
        assert_eq!(*figure.get_pixel(120 + 30, 50 + 20), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn unreadable_fonts_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let garbage = dir.path().join("garbage.ttf");
        fs::write(&garbage, b"not a font").unwrap();

        assert!(matches!(
            load_font(dir.path().join("missing.ttf")),
            Err(Error::ReadFile { .. })
        ));
        assert!(matches!(load_font(&garbage), Err(Error::InvalidFont(path)) if path == garbage));
    }

    #[test]
    fn raster_tiles_and_custom_grids() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("tile.png");
        RgbaImage::from_pixel(10, 10, Rgba([0, 0, 255, 255]))
            .save(&png)
            .unwrap();
        let tiles = vec![
            Tile {
                path: png.clone(),
                caption: "left".into(),
            },
            Tile {
                path: dir.path().join("broken.svg"),
                caption: "right".into(),
            },
        ];
        fs::write(dir.path().join("broken.svg"), "<svg").unwrap();

        let figure = small_composer()
            .with_shape(GridShape { rows: 1, cols: 2 })
            .compose(&tiles)
            .unwrap();

        assert_eq!(figure.dimensions(), (120, 50));
        assert_eq!(*figure.get_pixel(30, 20), Rgba([0, 0, 255, 255]));
        assert_eq!(*figure.get_pixel(61, 1), PLACEHOLDER_COLOR);
    }
}
