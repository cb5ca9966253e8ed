use image::GrayImage;
use nanorand::{Rng, WyRand};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

pub fn region_is_empty(
    table: &[u32],
    table_width: usize,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> bool {
    let tl = table[y * table_width + x];
    let tr = table[y * table_width + x + width];

    let bl = table[(y + height) * table_width + x];
    let br = table[(y + height) * table_width + x + width];

    tl as i64 + br as i64 - tr as i64 - bl as i64 == 0
}

/// 在图片寻找位置写字
///
/// Every free position is equally likely (reservoir sampling over the scan).
pub fn find_space_for_rect(
    table: &[u32],
    table_width: u32,
    table_height: u32,
    rect: &Rect,
    rng: &mut WyRand,
) -> Option<Point> {
    let max_x = table_width.checked_sub(rect.width)?;
    let max_y = table_height.checked_sub(rect.height)?;

    let mut available_points: u32 = 0;
    let mut random_point = None;

    for y in 0..max_y {
        for x in 0..max_x {
            let empty = region_is_empty(
                table,
                table_width as usize,
                x as usize,
                y as usize,
                rect.width as usize,
                rect.height as usize,
            );
            if empty {
                let random_num = rng.generate_range(0..=available_points);
                if random_num == available_points {
                    random_point = Some(Point { x, y });
                }
                available_points += 1;
            }
        }
    }

    random_point
}

/// https://blog.demofox.org/2018/04/16/prefix-sums-and-summed-area-tables/
///
/// Rebuilds the table from `start_row` down using the occupancy in `mask`;
/// rows above `start_row` must already be correct.
pub fn update_summed_area_table(table: &mut [u32], mask: &GrayImage, start_row: usize) {
    let width = mask.width() as usize;
    if width == 0 {
        return;
    }

    let mut prev_row = if start_row == 0 {
        vec![0; width]
    } else {
        table[(start_row - 1) * width..start_row * width].to_vec()
    };

    table
        .chunks_exact_mut(width)
        .zip(mask.as_raw().chunks_exact(width))
        .skip(start_row)
        .for_each(|(row, mask_row)| {
            let mut sum = 0;
            row.iter_mut()
                .zip(mask_row.iter())
                .zip(prev_row.iter())
                .for_each(|((el, occupied), prev_row_el)| {
                    sum += u32::from(*occupied > 0);
                    *el = sum + prev_row_el;
                });

            prev_row.clone_from_slice(row)
        });
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma};
    use nanorand::WyRand;

    use super::*;

    fn table_for(mask: &GrayImage) -> Vec<u32> {
        let mut table = vec![0; (mask.width() * mask.height()) as usize];
        update_summed_area_table(&mut table, mask, 0);
        table
    }

    #[test]
    fn sums_occupied_pixels() {
        let mut mask = GrayImage::from_pixel(4, 3, Luma([0]));
        mask.put_pixel(1, 1, Luma([1]));
        mask.put_pixel(3, 2, Luma([1]));

        let table = table_for(&mask);

        assert_eq!(table[11], 2);
        assert_eq!(table[4 + 1], 1);
        assert_eq!(table[0], 0);
    }

    #[test]
    fn partial_update_matches_full_rebuild() {
        let mut mask = GrayImage::from_pixel(8, 8, Luma([0]));
        mask.put_pixel(2, 1, Luma([1]));
        let mut table = table_for(&mask);

        mask.put_pixel(5, 6, Luma([1]));
        mask.put_pixel(0, 4, Luma([1]));
        update_summed_area_table(&mut table, &mask, 4);

        assert_eq!(table, table_for(&mask));
    }

    #[test]
    fn finds_only_free_regions() {
        let mut mask = GrayImage::from_pixel(20, 20, Luma([0]));
        for x in 0..20 {
            for y in 0..10 {
                mask.put_pixel(x, y, Luma([1]));
            }
        }
        let table = table_for(&mask);
        let mut rng = WyRand::new_seed(1);
        let rect = Rect { width: 5, height: 5 };

        for _ in 0..10 {
            let point = find_space_for_rect(&table, 20, 20, &rect, &mut rng).unwrap();
            assert!(point.y >= 9, "placed over occupied rows at {point:?}");
        }
    }

    #[test]
    fn rect_larger_than_table_has_no_space() {
        let mask = GrayImage::from_pixel(4, 4, Luma([0]));
        let table = table_for(&mask);
        let mut rng = WyRand::new_seed(1);

        let rect = Rect { width: 5, height: 2 };
        assert_eq!(find_space_for_rect(&table, 4, 4, &rect, &mut rng), None);
    }
}
