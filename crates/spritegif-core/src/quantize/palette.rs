//! Fixed-capacity 256-entry palette with a "used" bitset.

use crate::Rgb;

/// Number of entries in every palette produced by the quantizer.
pub const PALETTE_SIZE: usize = 256;

/// Size in bytes of a serialized color table (3 * 256).
pub const COLOR_TABLE_BYTES: usize = PALETTE_SIZE * 3;

/// An ordered list of 256 colors; the position is the index used by pixel data.
///
/// Trailing entries that the quantizer did not fill are black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; PALETTE_SIZE],
    used: [bool; PALETTE_SIZE],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: [Rgb::BLACK; PALETTE_SIZE],
            used: [false; PALETTE_SIZE],
        }
    }
}

impl Palette {
    /// Build a palette from up to 256 colors; the rest stay black.
    pub fn from_colors(colors: &[Rgb]) -> Self {
        let mut palette = Self::default();
        for (slot, color) in palette.colors.iter_mut().zip(colors) {
            *slot = *color;
        }
        palette
    }

    /// Always 256.
    pub fn len(&self) -> usize {
        PALETTE_SIZE
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn colors(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.colors
    }

    pub fn get(&self, index: u8) -> Rgb {
        self.colors[index as usize]
    }

    /// Mark an index as referenced by at least one pixel.
    pub fn mark_used(&mut self, index: u8) {
        self.used[index as usize] = true;
    }

    pub fn is_used(&self, index: u8) -> bool {
        self.used[index as usize]
    }

    pub fn used_count(&self) -> usize {
        self.used.iter().filter(|&&u| u).count()
    }

    /// Forget which entries were referenced.
    pub fn clear_used(&mut self) {
        self.used = [false; PALETTE_SIZE];
    }

    /// Index of the entry with minimal squared RGB distance; ties go to the
    /// lowest index.
    pub fn nearest(&self, color: Rgb) -> u8 {
        let mut best = 0usize;
        let mut best_dist = u32::MAX;
        for (i, entry) in self.colors.iter().enumerate() {
            let dist = entry.distance_squared(color);
            if dist < best_dist {
                best_dist = dist;
                best = i;
                if dist == 0 {
                    break;
                }
            }
        }
        best as u8
    }

    /// Like [`Palette::nearest`], but only considers entries marked used.
    ///
    /// Returns `None` when no entry has been used yet.
    pub fn nearest_used(&self, color: Rgb) -> Option<u8> {
        self.colors
            .iter()
            .enumerate()
            .filter(|(i, _)| self.used[*i])
            .min_by_key(|(i, entry)| (entry.distance_squared(color), *i))
            .map(|(i, _)| i as u8)
    }

    /// Serialize as a GIF color table: 768 bytes of RGB triples.
    pub fn to_color_table(&self) -> [u8; COLOR_TABLE_BYTES] {
        let mut table = [0u8; COLOR_TABLE_BYTES];
        for (chunk, color) in table.chunks_exact_mut(3).zip(self.colors.iter()) {
            chunk.copy_from_slice(&color.to_array());
        }
        table
    }
}
