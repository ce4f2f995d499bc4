/// Premultiplied RGBA color used by the overlay renderers.
///
/// Invariant: `rgb` components are already multiplied by `a`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32, // premultiplied
    pub g: f32, // premultiplied
    pub b: f32, // premultiplied
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::from_premul(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::from_premul(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn transparent() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }
    }

    /// Creates a color from premultiplied components.
    #[inline]
    pub const fn from_premul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a premultiplied color from straight alpha components.
    #[inline]
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: r.clamp(0.0, 1.0) * a,
            g: g.clamp(0.0, 1.0) * a,
            b: b.clamp(0.0, 1.0) * a,
            a,
        }
    }

    /// Returns a straight-alpha representation.
    ///
    /// For `a == 0`, RGB is returned as 0.
    #[inline]
    pub fn to_straight(self) -> (f32, f32, f32, f32) {
        if self.a <= 0.0 {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let inv = 1.0 / self.a;
            (self.r * inv, self.g * inv, self.b * inv, self.a)
        }
    }

    /// Same hue, new opacity.
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        let (r, g, b, _) = self.to_straight();
        Self::from_straight(r, g, b, a)
    }

    /// Straight-alpha components as a `wgpu` clear color.
    pub fn to_wgpu(self) -> wgpu::Color {
        let (r, g, b, a) = self.to_straight();
        wgpu::Color { r: r as f64, g: g as f64, b: b as f64, a: a as f64 }
    }

    /// Clear color for a target of `format`.
    ///
    /// Components are display (sRGB-encoded) values. An sRGB target encodes
    /// on store, so they are decoded to linear first and the stored texel
    /// matches what a non-sRGB target would hold.
    pub fn to_wgpu_for(self, format: wgpu::TextureFormat) -> wgpu::Color {
        if !format.is_srgb() {
            return self.to_wgpu();
        }
        let (r, g, b, a) = self.to_straight();
        wgpu::Color {
            r: srgb_to_linear(r) as f64,
            g: srgb_to_linear(g) as f64,
            b: srgb_to_linear(b) as f64,
            a: a as f64,
        }
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
