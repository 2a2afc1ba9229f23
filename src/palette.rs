use crate::error::{FolioError, FolioResult};

pub type Rgb = (u8, u8, u8);

/// Number of fill colors cards cycle through.
pub const PALETTE_LEN: usize = 4;

/// Fixed ordered set of card fill colors.
///
/// Backed by an array so it can never be empty: `color_for` is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette([Rgb; PALETTE_LEN]);

impl Default for Palette {
    fn default() -> Self {
        Palette([
            (255, 214, 165), // peach
            (202, 255, 191), // mint
            (155, 246, 255), // sky
            (189, 178, 255), // lavender
        ])
    }
}

impl Palette {
    /// Parse four `#RRGGBB` strings.
    pub fn from_hex<S: AsRef<str>>(colors: &[S]) -> FolioResult<Self> {
        if colors.len() != PALETTE_LEN {
            return Err(FolioError::Color(format!(
                "palette needs {} colors, got {}",
                PALETTE_LEN,
                colors.len()
            )));
        }
        let mut out = [(0, 0, 0); PALETTE_LEN];
        for (slot, hex) in out.iter_mut().zip(colors) {
            *slot = parse_hex(hex.as_ref())?;
        }
        Ok(Palette(out))
    }

    /// Color for the card at `card_index`. Negative indices wrap from the end.
    pub fn color_for(&self, card_index: isize) -> Rgb {
        self.0[card_index.rem_euclid(PALETTE_LEN as isize) as usize]
    }

    #[cfg(test)]
    pub fn colors(&self) -> &[Rgb; PALETTE_LEN] {
        &self.0
    }
}

pub fn parse_hex(s: &str) -> FolioResult<Rgb> {
    let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(FolioError::Color(s.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| FolioError::Color(s.to_string()))
    };
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(2, 2)]
    #[case(3, 3)]
    #[case(4, 0)]
    #[case(9, 1)]
    #[case(-1, 3)]
    #[case(-4, 0)]
    fn color_wraps_by_index(#[case] card_index: isize, #[case] slot: usize) {
        let palette = Palette::default();
        assert_eq!(palette.color_for(card_index), palette.colors()[slot]);
    }

    #[test]
    fn same_index_same_color() {
        let palette = Palette::default();
        for i in 0..16 {
            assert_eq!(palette.color_for(i), palette.color_for(i));
        }
    }

    #[rstest]
    #[case("#FFD6A5", (255, 214, 165))]
    #[case("cafbbf", (202, 251, 191))]
    #[case(" #000000 ", (0, 0, 0))]
    fn parses_hex(#[case] input: &str, #[case] expected: Rgb) {
        assert_eq!(parse_hex(input).unwrap(), expected);
    }

    #[rstest]
    #[case("#FFF")]
    #[case("#GGGGGG")]
    #[case("")]
    #[case("#ééé")]
    fn rejects_bad_hex(#[case] input: &str) {
        assert!(parse_hex(input).is_err());
    }

    #[test]
    fn from_hex_requires_four_colors() {
        assert!(Palette::from_hex(&["#000000", "#111111"]).is_err());
        let p = Palette::from_hex(&["#000000", "#111111", "#222222", "#333333"]).unwrap();
        assert_eq!(p.color_for(2), (0x22, 0x22, 0x22));
    }
}
