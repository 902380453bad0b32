//! Map generation from grayscale height maps

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::SimError;
use crate::grid::{HexGrid, Tile, TileType};

/// Terrain for a gray value. Each band includes its upper bound.
pub fn tile_type_for_gray(gray: f32) -> Result<TileType, SimError> {
    if !(0.0..=1.0).contains(&gray) {
        return Err(SimError::invalid(format!(
            "gray value must be in range 0.0 to 1.0, got {gray}"
        )));
    }
    let tile_type = if gray <= 0.0 {
        TileType::Water
    } else if gray <= 0.2 {
        TileType::Sand
    } else if gray <= 0.4 {
        TileType::Grass
    } else if gray <= 0.6 {
        TileType::Forest
    } else if gray <= 0.8 {
        TileType::Stone
    } else {
        TileType::Mountain
    };
    Ok(tile_type)
}

/// Row-major gray values, `y` outer.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightMap {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl HeightMap {
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Result<Self, SimError> {
        if width == 0 || height == 0 {
            return Err(SimError::invalid(format!(
                "height map dimensions must be positive, got {width}x{height}"
            )));
        }
        if values.len() != width as usize * height as usize {
            return Err(SimError::invalid(format!(
                "{width}x{height} height map needs {} values, got {}",
                width as usize * height as usize,
                values.len()
            )));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, SimError> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |row| row.len()) as u32;
        if let Some(row) = rows.iter().position(|row| row.len() as u32 != width) {
            return Err(SimError::invalid(format!(
                "height map row {row} has {} values, expected {width}",
                rows[row].len()
            )));
        }
        Self::new(width, height, rows.concat())
    }

    /// Seeded noise, box-blurred `smoothing_passes` times and stretched to
    /// the full range. Values at or below `sea_level` become water.
    pub fn generate(
        width: u32,
        height: u32,
        seed: u64,
        smoothing_passes: u32,
        sea_level: f32,
    ) -> Result<Self, SimError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let count = width as usize * height as usize;
        let values: Vec<f32> = (0..count).map(|_| rng.gen::<f32>()).collect();
        let mut map = Self::new(width, height, values)?;

        for _ in 0..smoothing_passes {
            map.blur();
        }
        map.normalize(sea_level);
        Ok(map)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn gray_at(&self, x: u32, y: u32) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.values[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    pub fn to_grid(&self) -> Result<HexGrid, SimError> {
        let tiles = self
            .values
            .iter()
            .map(|&gray| tile_type_for_gray(gray).map(|kind| Tile::new(gray, kind)))
            .collect::<Result<Vec<_>, _>>()?;
        HexGrid::new(self.width, self.height, tiles)
    }

    fn blur(&mut self) {
        let (width, height) = (self.width as i64, self.height as i64);
        let mut blurred = Vec::with_capacity(self.values.len());
        for y in 0..height {
            for x in 0..width {
                let mut sum = 0.0;
                let mut samples = 0.0;
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        let (nx, ny) = (x + dx, y + dy);
                        if nx >= 0 && ny >= 0 && nx < width && ny < height {
                            sum += self.values[(ny * width + nx) as usize];
                            samples += 1.0;
                        }
                    }
                }
                blurred.push(sum / samples);
            }
        }
        self.values = blurred;
    }

    // Stretch to [0, 1] and quantize to 8-bit steps like a grayscale texture.
    fn normalize(&mut self, sea_level: f32) {
        let min = self.values.iter().copied().fold(f32::INFINITY, f32::min);
        let max = self.values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let span = max - min;
        for value in &mut self.values {
            let stretched = if span > f32::EPSILON {
                (*value - min) / span
            } else {
                0.5
            };
            let quantized = (stretched * 255.0).round() / 255.0;
            *value = if quantized <= sea_level {
                0.0
            } else {
                quantized.clamp(0.0, 1.0)
            };
        }
    }
}
