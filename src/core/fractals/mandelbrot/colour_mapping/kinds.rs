/// Selects how escaped points are coloured. Points inside the set are always black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColourMapKind {
    Palette,
    Exponential,
    MagnitudeTint,
}

impl ColourMapKind {
    pub const ALL: &'static [Self] = &[Self::Palette, Self::Exponential, Self::MagnitudeTint];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Palette => "Palette gradient",
            Self::Exponential => "Exponential",
            Self::MagnitudeTint => "Magnitude tint",
        }
    }

    /// Integer code carried by the `u_colouring` uniform.
    #[must_use]
    pub const fn uniform_code(self) -> i32 {
        match self {
            Self::Palette => 0,
            Self::Exponential => 1,
            Self::MagnitudeTint => 2,
        }
    }

    #[must_use]
    pub fn from_uniform_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.uniform_code() == code)
    }
}

impl Default for ColourMapKind {
    fn default() -> Self {
        Self::Palette
    }
}

impl std::fmt::Display for ColourMapKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).display_name())
    }
}
