use ab_glyph::{point, Font, FontVec, Glyph, GlyphId, Point, PxScale, ScaleFont};
use image::{GrayImage, Luma, Pixel, Rgba, RgbaImage};

#[derive(Clone, Debug)]
pub struct GlyphData {
    pub glyphs: Vec<Glyph>,
    pub width: u32,
    pub height: u32,
}

impl GlyphData {
    /// Footprint on the canvas, rotated words swap width and height.
    pub fn extent(&self, rotated: bool) -> (u32, u32) {
        if rotated {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}

//把文本转换为字体，方便画图
pub fn text_to_glyphs(text: &str, font: &FontVec, scale: PxScale) -> GlyphData {
    let scaled_font = font.as_scaled(scale);

    let mut glyphs: Vec<Glyph> = vec![];
    layout_paragraph(&scaled_font, point(0.0, 0.0), text, &mut glyphs);

    let glyphs_height = scaled_font.height().ceil() as u32;
    let glyphs_width = match (glyphs.first(), glyphs.last()) {
        (Some(first), Some(last)) => {
            let max_x = last.position.x + scaled_font.h_advance(last.id);
            (max_x - first.position.x).ceil().max(0.0) as u32
        }
        _ => 0,
    };

    GlyphData {
        glyphs,
        width: glyphs_width,
        height: glyphs_height,
    }
}

/// Calls `plot` with canvas coordinates and coverage for every covered pixel.
/// Rotated text is turned 90° counter-clockwise and reads bottom to top.
fn for_each_pixel(
    glyph_data: &GlyphData,
    font: &FontVec,
    origin: Point,
    rotate: bool,
    mut plot: impl FnMut(i64, i64, f32),
) {
    let text_width = glyph_data.width as i64;

    for glyph in glyph_data.glyphs.iter().cloned() {
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();

            outlined.draw(|x, y, v| {
                let local_x = bounds.min.x as i64 + x as i64;
                let local_y = bounds.min.y as i64 + y as i64;
                let (dx, dy) = if rotate {
                    (local_y, text_width - 1 - local_x)
                } else {
                    (local_x, local_y)
                };
                plot(origin.x as i64 + dx, origin.y as i64 + dy, v);
            })
        }
    }
}

fn in_bounds(x: i64, y: i64, width: u32, height: u32) -> Option<(u32, u32)> {
    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
        None
    } else {
        Some((x as u32, y as u32))
    }
}

pub fn draw_glyphs_to_gray_buffer(
    buffer: &mut GrayImage,
    glyph_data: &GlyphData,
    font: &FontVec,
    point: Point,
    rotate: bool,
) {
    let (width, height) = buffer.dimensions();

    for_each_pixel(glyph_data, font, point, rotate, |x, y, v| {
        if v <= 0.0 {
            return;
        }
        if let Some((x, y)) = in_bounds(x, y, width, height) {
            buffer.put_pixel(x, y, Luma([1]));
        }
    });
}

pub fn draw_glyphs_to_rgba_buffer(
    buffer: &mut RgbaImage,
    glyph_data: &GlyphData,
    font: &FontVec,
    point: Point,
    rotate: bool,
    pixel: Rgba<u8>,
) {
    let (width, height) = buffer.dimensions();

    for_each_pixel(glyph_data, font, point, rotate, |x, y, v| {
        let Some((x, y)) = in_bounds(x, y, width, height) else {
            return;
        };
        let v = v.clamp(0.0, 1.0);
        let px = buffer.get_pixel_mut(x, y);
        px.apply2(&pixel, |old, new| {
            ((v * new as f32) + (1.0 - v) * old as f32) as u8
        });
        if px != &Rgba::from([0; 4]) {
            px.0[3] = 0xFF;
        }
    });
}

/// Lays out and draws `text` horizontally centred on `center_x`, top at `top`.
pub fn draw_centered_text(
    buffer: &mut RgbaImage,
    text: &str,
    font: &FontVec,
    scale: PxScale,
    center_x: i64,
    top: i64,
    pixel: Rgba<u8>,
) {
    let v_advance = {
        let scaled_font = font.as_scaled(scale);
        scaled_font.height() + scaled_font.line_gap()
    };

    for (i, line) in text.lines().enumerate() {
        let glyphs = text_to_glyphs(line, font, scale);
        let x = center_x - glyphs.width as i64 / 2;
        let y = top + (i as f32 * v_advance) as i64;
        draw_glyphs_to_rgba_buffer(
            buffer,
            &glyphs,
            font,
            point(x as f32, y as f32),
            false,
            pixel,
        );
    }
}

pub fn layout_paragraph<F, SF>(font: &SF, position: Point, text: &str, target: &mut Vec<Glyph>)
where
    F: Font,
    SF: ScaleFont<F>,
{
    let v_advance = font.height() + font.line_gap();
    let mut caret = position + point(0.0, font.ascent());
    let mut last_glyph: Option<GlyphId> = None;
    for c in text.chars() {
        if c.is_control() {
            if c == '\n' {
                //进行换行
                caret = point(position.x, caret.y + v_advance);
            }
            continue;
        }

        let mut glyph = font.scaled_glyph(c);
        if let Some(previous) = last_glyph.take() {
            caret.x += font.kern(previous, glyph.id);
        }
        glyph.position = caret;
        last_glyph = Some(glyph.id);
        caret.x += font.h_advance(glyph.id);

        target.push(glyph);
    }
}
