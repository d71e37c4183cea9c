//! Self-organizing map color quantizer.
//!
//! A one-dimensional Kohonen network of 256 neurons, each holding a color, is
//! trained on the sample stream. For every sample the closest neuron (adjusted
//! by a frequency bias so that rarely-winning neurons get a chance) is pulled
//! toward the sample, along with its neighbors in network order. The learning
//! rate and the neighborhood radius both decay over the scan.
//!
//! All arithmetic is fixed-point integer, and samples are visited with a fixed
//! prime stride, so identical input always produces an identical palette.
//!
//! Reference: A. Dekker, "Kohonen neural networks for optimal colour
//! quantization", Network: Computation in Neural Systems 5 (1994) 351-367.

use crate::Rgb;

use super::palette::PALETTE_SIZE;

const NET_SIZE: usize = PALETTE_SIZE;

// Strides for visiting samples; one of these is chosen so that it does not
// divide the sample count.
const PRIME1: usize = 499;
const PRIME2: usize = 491;
const PRIME3: usize = 487;
const PRIME4: usize = 503;
const MIN_PICTURE_BYTES: usize = 3 * PRIME4;

// Colors are held with extra fractional bits
const NET_BIAS_SHIFT: i32 = 4;
const N_CYCLES: usize = 100;

// Frequency and bias
const INT_BIAS_SHIFT: i32 = 16;
const INT_BIAS: i32 = 1 << INT_BIAS_SHIFT;
const GAMMA_SHIFT: i32 = 10;
const BETA_SHIFT: i32 = 10;
const BETA: i32 = INT_BIAS >> BETA_SHIFT;
const BETA_GAMMA: i32 = INT_BIAS << (GAMMA_SHIFT - BETA_SHIFT);

// Neighborhood radius
const INIT_RAD: usize = NET_SIZE >> 3;
const RADIUS_BIAS_SHIFT: i32 = 6;
const RADIUS_BIAS: i32 = 1 << RADIUS_BIAS_SHIFT;
const INIT_RADIUS: i32 = INIT_RAD as i32 * RADIUS_BIAS;
const RADIUS_DEC: i32 = 30;

// Learning rate
const ALPHA_BIAS_SHIFT: i32 = 10;
const INIT_ALPHA: i32 = 1 << ALPHA_BIAS_SHIFT;
const RAD_BIAS_SHIFT: i32 = 8;
const RAD_BIAS: i32 = 1 << RAD_BIAS_SHIFT;
const ALPHA_RAD_BIAS: i32 = 1 << (ALPHA_BIAS_SHIFT + RAD_BIAS_SHIFT);

/// A trained network. Build with [`NeuQuant::train`].
#[derive(Debug, Clone)]
pub struct NeuQuant {
    network: Vec<[i32; 3]>,
    bias: Vec<i32>,
    freq: Vec<i32>,
    radpower: [i32; INIT_RAD],
}

impl NeuQuant {
    /// Train a network on RGB samples.
    ///
    /// `sample_factor` of 1 visits every pixel; `n` visits roughly one in `n`.
    /// Inputs too small for the prime strides are always fully sampled.
    pub fn train(pixels: &[u8], sample_factor: usize) -> Self {
        let mut nq = Self::new();
        nq.learn(pixels, sample_factor.max(1));
        nq
    }

    fn new() -> Self {
        let network = (0..NET_SIZE)
            .map(|i| {
                let v = ((i as i32) << (NET_BIAS_SHIFT + 8)) / NET_SIZE as i32;
                [v, v, v]
            })
            .collect();
        Self {
            network,
            bias: vec![0; NET_SIZE],
            freq: vec![INT_BIAS / NET_SIZE as i32; NET_SIZE],
            radpower: [0; INIT_RAD],
        }
    }

    /// The learned colors in neuron order, rounded back to 8 bits.
    pub fn colors(&self) -> Vec<Rgb> {
        self.network
            .iter()
            .map(|n| Rgb::new(unbias(n[0]), unbias(n[1]), unbias(n[2])))
            .collect()
    }

    fn learn(&mut self, pixels: &[u8], mut sample_factor: usize) {
        let length = pixels.len() - pixels.len() % 3;
        if length == 0 {
            return;
        }

        if length < MIN_PICTURE_BYTES {
            sample_factor = 1;
        }
        let alphadec = 30 + ((sample_factor as i32 - 1) / 3);
        let sample_pixels = length / (3 * sample_factor);
        let delta = (sample_pixels / N_CYCLES).max(1);

        let mut alpha = INIT_ALPHA;
        let mut radius = INIT_RADIUS;
        let mut rad = radius_of(radius);
        self.update_radpower(alpha, rad);

        let step = if length < MIN_PICTURE_BYTES {
            3
        } else if length % PRIME1 != 0 {
            3 * PRIME1
        } else if length % PRIME2 != 0 {
            3 * PRIME2
        } else if length % PRIME3 != 0 {
            3 * PRIME3
        } else {
            3 * PRIME4
        };

        let mut pos = 0usize;
        for i in 1..=sample_pixels {
            let sample = [
                (pixels[pos] as i32) << NET_BIAS_SHIFT,
                (pixels[pos + 1] as i32) << NET_BIAS_SHIFT,
                (pixels[pos + 2] as i32) << NET_BIAS_SHIFT,
            ];

            let winner = self.contest(sample);
            self.alter_single(alpha, winner, sample);
            if rad != 0 {
                self.alter_neighbors(rad, winner, sample);
            }

            pos += step;
            if pos >= length {
                pos -= length;
            }

            if i % delta == 0 {
                alpha -= alpha / alphadec;
                radius -= radius / RADIUS_DEC;
                rad = radius_of(radius);
                self.update_radpower(alpha, rad);
            }
        }
    }

    fn update_radpower(&mut self, alpha: i32, rad: usize) {
        let rad = rad as i32;
        for (i, power) in self.radpower.iter_mut().enumerate().take(rad as usize) {
            let i = i as i32;
            *power = alpha * (((rad * rad - i * i) * RAD_BIAS) / (rad * rad));
        }
    }

    /// Find the closest neuron (ignoring bias) to update its frequency, and
    /// return the best neuron once the bias is applied.
    fn contest(&mut self, sample: [i32; 3]) -> usize {
        let mut best_dist = i32::MAX;
        let mut best_bias_dist = i32::MAX;
        let mut best_pos = 0;
        let mut best_bias_pos = 0;

        for i in 0..NET_SIZE {
            let n = self.network[i];
            let dist = (n[0] - sample[0]).abs() + (n[1] - sample[1]).abs() + (n[2] - sample[2]).abs();
            if dist < best_dist {
                best_dist = dist;
                best_pos = i;
            }
            let bias_dist = dist - (self.bias[i] >> (INT_BIAS_SHIFT - NET_BIAS_SHIFT));
            if bias_dist < best_bias_dist {
                best_bias_dist = bias_dist;
                best_bias_pos = i;
            }
            let beta_freq = self.freq[i] >> BETA_SHIFT;
            self.freq[i] -= beta_freq;
            self.bias[i] += beta_freq << GAMMA_SHIFT;
        }

        self.freq[best_pos] += BETA;
        self.bias[best_pos] -= BETA_GAMMA;
        best_bias_pos
    }

    fn alter_single(&mut self, alpha: i32, i: usize, sample: [i32; 3]) {
        let n = &mut self.network[i];
        for c in 0..3 {
            n[c] -= (alpha * (n[c] - sample[c])) / INIT_ALPHA;
        }
    }

    /// Pull neurons within `rad` of neuron `i` toward the sample, weaker with
    /// distance.
    fn alter_neighbors(&mut self, rad: usize, i: usize, sample: [i32; 3]) {
        // Exclusive of the neurons exactly `rad` away
        let lo = (i + 1).saturating_sub(rad);
        let hi = (i + rad).min(NET_SIZE);

        // Above and below the winner, stepping outward together
        for (m, j) in ((i + 1)..hi).enumerate() {
            let a = self.radpower[m + 1];
            move_toward(&mut self.network[j], a, sample);
        }
        for (m, k) in (lo..i).rev().enumerate() {
            let a = self.radpower[m + 1];
            move_toward(&mut self.network[k], a, sample);
        }
    }
}

fn move_toward(neuron: &mut [i32; 3], a: i32, sample: [i32; 3]) {
    for c in 0..3 {
        neuron[c] -= (a * (neuron[c] - sample[c])) / ALPHA_RAD_BIAS;
    }
}

fn radius_of(radius: i32) -> usize {
    let rad = radius >> RADIUS_BIAS_SHIFT;
    if rad <= 1 {
        0
    } else {
        rad as usize
    }
}

fn unbias(v: i32) -> u8 {
    (v >> NET_BIAS_SHIFT).clamp(0, 255) as u8
}
