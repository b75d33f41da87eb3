//! Brand color palette for program landing pages.

const NEUTRAL: [&str; 4] = ["#F7F9FB", "#EDF2F7", "#E2E8F0", "#CBD5E0"];
const FALLBACK_PRIMARY: &str = "#cf2387";

/// Primary brand color plus three progressively lighter shades.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandPalette {
    pub color1: String,
    pub color2: String,
    pub color3: String,
    pub color4: String,
}

impl Default for BrandPalette {
    fn default() -> Self {
        Self {
            color1: NEUTRAL[0].to_string(),
            color2: NEUTRAL[1].to_string(),
            color3: NEUTRAL[2].to_string(),
            color4: NEUTRAL[3].to_string(),
        }
    }
}

impl BrandPalette {
    /// Build from a program's `brand_color`, which may be a CSS gradient.
    pub fn from_brand_color(brand_color: Option<&str>) -> Self {
        let Some(raw) = brand_color.filter(|c| !c.trim().is_empty()) else {
            return Self::default();
        };

        let primary = if raw.contains("gradient") {
            first_hex_color(raw).unwrap_or(FALLBACK_PRIMARY)
        } else {
            raw.trim()
        };

        let Some((r, g, b)) = parse_hex(primary) else {
            return Self::default();
        };

        let lighten = |pct: f64| {
            let up = |c: u8| (f64::from(c) + (255.0 - f64::from(c)) * pct).floor() as u8;
            format!("rgb({}, {}, {})", up(r), up(g), up(b))
        };

        Self {
            color1: primary.to_string(),
            color2: lighten(0.3),
            color3: lighten(0.6),
            color4: lighten(0.8),
        }
    }

    /// CSS background for the join page.
    pub fn css_gradient(&self) -> String {
        format!(
            "linear-gradient(155deg, {} 0%, {} 35%, {} 70%, {} 100%)",
            self.color1, self.color2, self.color3, self.color4
        )
    }
}

fn first_hex_color(s: &str) -> Option<&str> {
    s.match_indices('#').find_map(|(idx, _)| {
        let candidate = s.get(idx..idx + 7)?;
        candidate[1..]
            .chars()
            .all(|c| c.is_ascii_hexdigit())
            .then_some(candidate)
    })
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
