use glam::{Vec3, Vec4};
use rand::Rng;

use crate::color::Palette;

/// Per-particle attributes, stored struct-of-arrays so each buffer can be
/// uploaded to the GPU as its own instance stream.
///
/// Lengths are fixed at `3 * n`, `4 * n` and `3 * n` for the whole life of
/// the field.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleField {
    positions: Vec<f32>,
    randoms: Vec<f32>,
    colors: Vec<f32>,
}

impl ParticleField {
    pub const POSITION_STRIDE: usize = 3;
    pub const RANDOM_STRIDE: usize = 4;
    pub const COLOR_STRIDE: usize = 3;

    /// Fills `count` particles. Positions are uniform in the `[-1, 1]` cube,
    /// seeds are uniform in `[0, 1]`, colors are drawn uniformly from the
    /// palette (or the default palette if it is empty).
    pub fn generate<R: Rng>(count: usize, palette: &Palette, rng: &mut R) -> Self {
        let palette = palette.resolve();

        let mut positions = Vec::with_capacity(count * Self::POSITION_STRIDE);
        let mut randoms = Vec::with_capacity(count * Self::RANDOM_STRIDE);
        let mut colors = Vec::with_capacity(count * Self::COLOR_STRIDE);

        for _ in 0..count {
            for _ in 0..Self::POSITION_STRIDE {
                positions.push((rng.gen::<f32>() - 0.5) * 2.0);
            }
            for _ in 0..Self::RANDOM_STRIDE {
                randoms.push(rng.gen::<f32>());
            }

            let color = palette[rng.gen_range(0..palette.len())];
            colors.extend_from_slice(&[color.r, color.g, color.b]);
        }

        Self {
            positions,
            randoms,
            colors,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len() / Self::POSITION_STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn randoms(&self) -> &[f32] {
        &self.randoms
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn position(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[index * Self::POSITION_STRIDE..])
    }

    pub fn random(&self, index: usize) -> Vec4 {
        Vec4::from_slice(&self.randoms[index * Self::RANDOM_STRIDE..])
    }

    pub fn color(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.colors[index * Self::COLOR_STRIDE..])
    }
}
