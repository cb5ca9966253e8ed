use std::str::FromStr;

use image::Rgba;
use nanorand::{Rng, WyRand};
use palette::{Pixel, Srgb};

use crate::error::Error;

/// Two-stop linear color maps, named after their matplotlib counterparts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMap {
    start: [f32; 3],
    end: [f32; 3],
}

impl ColorMap {
    pub const WINTER: ColorMap = ColorMap::new([0.0, 0.0, 1.0], [0.0, 1.0, 0.5]);
    pub const SUMMER: ColorMap = ColorMap::new([0.0, 0.5, 0.4], [1.0, 1.0, 0.4]);
    pub const AUTUMN: ColorMap = ColorMap::new([1.0, 0.0, 0.0], [1.0, 1.0, 0.0]);
    pub const SPRING: ColorMap = ColorMap::new([1.0, 0.0, 1.0], [1.0, 1.0, 0.0]);
    pub const COOL: ColorMap = ColorMap::new([0.0, 1.0, 1.0], [1.0, 0.0, 1.0]);
    pub const GRAY: ColorMap = ColorMap::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);

    pub const fn new(start: [f32; 3], end: [f32; 3]) -> Self {
        ColorMap { start, end }
    }

    /// `t` is clamped to `0.0..=1.0`.
    pub fn at(&self, t: f32) -> Rgba<u8> {
        let t = t.clamp(0.0, 1.0);
        let lerp = |i: usize| self.start[i] + (self.end[i] - self.start[i]) * t;

        let rgb = Srgb::new(lerp(0), lerp(1), lerp(2));
        let raw: [u8; 3] = rgb.into_format().into_raw();

        Rgba([raw[0], raw[1], raw[2], 0xFF])
    }

    pub fn random_color(&self, rng: &mut WyRand) -> Rgba<u8> {
        let t = rng.generate_range(0..=1000u32) as f32 / 1000.0;
        self.at(t)
    }
}

impl Default for ColorMap {
    fn default() -> Self {
        ColorMap::WINTER
    }
}

impl FromStr for ColorMap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "winter" => Ok(ColorMap::WINTER),
            "summer" => Ok(ColorMap::SUMMER),
            "autumn" => Ok(ColorMap::AUTUMN),
            "spring" => Ok(ColorMap::SPRING),
            "cool" => Ok(ColorMap::COOL),
            "gray" | "grey" => Ok(ColorMap::GRAY),
            _ => Err(Error::UnknownColormap(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use nanorand::WyRand;

    use super::*;

    #[test]
    fn winter_runs_blue_to_green() {
        let winter: ColorMap = "winter".parse().unwrap();

        assert_eq!(winter.at(0.0), Rgba([0, 0, 255, 255]));
        let Rgba([r, g, b, _]) = winter.at(1.0);
        assert_eq!((r, g), (0, 255));
        assert!((127..=128).contains(&b));
        assert_eq!(winter.at(7.0), winter.at(1.0));
    }

    #[test]
    fn random_colors_stay_on_the_map() {
        let mut rng = WyRand::new_seed(7);
        for _ in 0..50 {
            let Rgba([r, _, b, a]) = ColorMap::WINTER.random_color(&mut rng);
            assert_eq!(r, 0);
            assert!(b >= 127);
            assert_eq!(a, 255);
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(matches!(
            "jet".parse::<ColorMap>(),
            Err(Error::UnknownColormap(name)) if name == "jet"
        ));
    }
}
