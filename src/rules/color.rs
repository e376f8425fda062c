//! CSS color parsing and WCAG contrast math.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba {
        r: 255.0,
        g: 255.0,
        b: 255.0,
        a: 1.0,
    };

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    /// Composite `self` over an opaque `bg`.
    pub fn over(&self, bg: Rgba) -> Rgba {
        let a = self.a.clamp(0.0, 1.0);
        Rgba {
            r: self.r * a + bg.r * (1.0 - a),
            g: self.g * a + bg.g * (1.0 - a),
            b: self.b * a + bg.b * (1.0 - a),
            a: 1.0,
        }
    }

    /// WCAG relative luminance.
    pub fn luminance(&self) -> f64 {
        fn chan(c: f64) -> f64 {
            let c = c / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * chan(self.r) + 0.7152 * chan(self.g) + 0.0722 * chan(self.b)
    }
}

fn rgb_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^rgba?\(\s*([\d.]+)[\s,]+([\d.]+)[\s,]+([\d.]+)(?:\s*[,/]\s*([\d.]+%?))?\s*\)$",
        )
        .expect("static regex")
    })
}

/// Parse `rgb()`, `rgba()`, `#rgb`, `#rrggbb`, `white`, `black`, and
/// `transparent`.
pub fn parse_color(s: &str) -> Option<Rgba> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => {
            return Some(Rgba {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 0.0,
            })
        }
        "white" => return Some(Rgba::WHITE),
        "black" => {
            return Some(Rgba {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            })
        }
        _ => {}
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let caps = rgb_re().captures(&s)?;
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<f64>().ok());
    let a = match caps.get(4) {
        None => 1.0,
        Some(m) => match m.as_str().strip_suffix('%') {
            Some(p) => p.parse::<f64>().ok()? / 100.0,
            None => m.as_str().parse::<f64>().ok()?,
        },
    };
    Some(Rgba {
        r: num(1)?,
        g: num(2)?,
        b: num(3)?,
        a,
    })
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.is_ascii() {
        return None;
    }
    let expand = |c: char| c.to_digit(16).map(|d| (d * 17) as f64);
    let chars: Vec<char> = hex.chars().collect();
    match chars.len() {
        3 => Some(Rgba {
            r: expand(chars[0])?,
            g: expand(chars[1])?,
            b: expand(chars[2])?,
            a: 1.0,
        }),
        6 => {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(f64::from);
            Some(Rgba {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: 1.0,
            })
        }
        _ => None,
    }
}

/// Contrast ratio between two opaque colors, from 1.0 to 21.0.
pub fn contrast_ratio(fg: Rgba, bg: Rgba) -> f64 {
    let (l1, l2) = (fg.luminance(), bg.luminance());
    let (hi, lo) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    (hi + 0.05) / (lo + 0.05)
}

/// Large text per WCAG: at least 24px, or 18.66px when bold.
pub fn is_large_text(font_size: f64, font_weight: &str) -> bool {
    let bold = match font_weight.trim() {
        "bold" | "bolder" => true,
        w => w.parse::<f64>().map(|n| n >= 700.0).unwrap_or(false),
    };
    font_size >= 24.0 || (bold && font_size >= 18.66)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_forms() {
        assert_eq!(parse_color("rgb(255, 255, 255)"), Some(Rgba::WHITE));
        assert_eq!(parse_color("#fff"), Some(Rgba::WHITE));
        assert_eq!(parse_color("#FFFFFF"), Some(Rgba::WHITE));
        let t = parse_color("rgba(0, 0, 0, 0)").unwrap();
        assert!(t.is_transparent());
        let half = parse_color("rgb(10 20 30 / 50%)").unwrap();
        assert_eq!(half.a, 0.5);
        assert!(parse_color("hsl(0, 0%, 0%)").is_none());
        assert!(parse_color("#12").is_none());
    }

    #[test]
    fn test_contrast_extremes() {
        let black = parse_color("black").unwrap();
        let r = contrast_ratio(black, Rgba::WHITE);
        assert!((r - 21.0).abs() < 0.01);
        assert!((contrast_ratio(Rgba::WHITE, Rgba::WHITE) - 1.0).abs() < 1e-9);
        // light gray on white is well under 4.5:1
        let gray = parse_color("rgb(200, 200, 200)").unwrap();
        assert!(contrast_ratio(gray, Rgba::WHITE) < 4.5);
    }

    #[test]
    fn test_large_text_threshold() {
        assert!(is_large_text(24.0, "400"));
        assert!(is_large_text(19.0, "bold"));
        assert!(is_large_text(19.0, "700"));
        assert!(!is_large_text(19.0, "400"));
        assert!(!is_large_text(16.0, "700"));
    }
}
