#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Fully opaque colour.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Converts a channel intensity in `[0, 1]` to a byte, clamping out-of-range values.
    #[must_use]
    pub fn channel(value: f64) -> u8 {
        if value.is_nan() {
            return 0;
        }

        (value.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: u8, b: u8| -> u8 {
            let value = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
            value.round().clamp(0.0, 255.0) as u8
        };

        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_is_opaque() {
        assert_eq!(Colour::rgb(1, 2, 3).a, 255);
        assert_eq!(Colour::BLACK.a, 255);
    }

    #[test]
    fn test_channel_clamps() {
        assert_eq!(Colour::channel(-0.5), 0);
        assert_eq!(Colour::channel(0.5), 128);
        assert_eq!(Colour::channel(1.5), 255);
        assert_eq!(Colour::channel(f64::NAN), 0);
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        let a = Colour::rgb(0, 100, 200);
        let b = Colour::rgb(100, 200, 0);

        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Colour::rgb(50, 150, 100));
    }
}
