/// Element background colors
///
/// Files store colors as six hex digits (`ffffff`). White is the
/// unset default and never stored on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    /// Constant definitions.
    pub const CONST: Color = Color::rgb(0xff, 0xe0, 0xff);
    /// Declarations.
    pub const DECL: Color = Color::rgb(0xe0, 0xff, 0xe0);
    /// Global definitions.
    pub const GLOBAL: Color = Color::rgb(0xe0, 0xff, 0xff);
    /// Anything that needed a synthetic rewrite (e.g. a dissolved C `for`).
    pub const MISC: Color = Color::rgb(0xff, 0xff, 0xe0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `ffe0ff`, `#ffe0ff` or `0xffe0ff`.
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text
            .trim()
            .trim_start_matches('#')
            .trim_start_matches("0x")
            .trim_start_matches("0X");
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Parse a stored color, mapping white to "unset".
    pub fn parse_stored(text: &str) -> Option<Self> {
        Self::from_hex(text).filter(|color| *color != Color::WHITE)
    }

    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ffe0ff", Some(Color::CONST))]
    #[case("#E0FFE0", Some(Color::DECL))]
    #[case("0xe0ffff", Some(Color::GLOBAL))]
    #[case("fff", None)]
    #[case("zzzzzz", None)]
    fn test_from_hex(#[case] text: &str, #[case] expected: Option<Color>) {
        assert_eq!(Color::from_hex(text), expected);
    }

    #[test]
    fn test_white_is_unset() {
        assert_eq!(Color::parse_stored("ffffff"), None);
        assert_eq!(Color::parse_stored("ffffe0"), Some(Color::MISC));
    }
}
