use std::f32::consts::TAU;

use quadshade_engine::shader::layout::PALETTE_WIDTH;

/// Cosine gradient `a + b * cos(TAU * (c * t + d))` per channel.
struct Cosine {
    a: [f32; 3],
    b: [f32; 3],
    c: [f32; 3],
    d: [f32; 3],
}

const AGENT_PALETTE: Cosine = Cosine {
    a: [0.5, 0.5, 0.5],
    b: [0.5, 0.5, 0.5],
    c: [1.0, 1.0, 1.0],
    d: [0.0, 0.33, 0.67],
};

impl Cosine {
    fn sample(&self, t: f32) -> [u8; 4] {
        let ch = |i: usize| {
            let v = self.a[i] + self.b[i] * (TAU * (self.c[i] * t + self.d[i])).cos();
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        };
        [ch(0), ch(1), ch(2), 255]
    }
}

/// `PALETTE_WIDTH` straight-alpha RGBA8 texels, opaque.
pub fn gradient() -> Vec<u8> {
    let last = (PALETTE_WIDTH - 1) as f32;
    (0..PALETTE_WIDTH)
        .flat_map(|i| AGENT_PALETTE.sample(i as f32 / last))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_fills_the_texture_row() {
        let rgba = gradient();
        assert_eq!(rgba.len(), PALETTE_WIDTH as usize * 4);
        assert!(rgba.chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn gradient_wraps_around() {
        // c = 1 for every channel, so t = 0 and t = 1 coincide.
        let rgba = gradient();
        let n = rgba.len();
        assert_eq!(&rgba[..4], &rgba[n - 4..]);
    }

    #[test]
    fn red_peaks_at_the_start() {
        assert_eq!(AGENT_PALETTE.sample(0.0)[0], 255);
    }
}
