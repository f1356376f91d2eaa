//! Theme registry
//!
//! A fixed, ordered mapping from theme name to the handful of colours the
//! highlighter and rasterizer need. Names follow the highlight.js style
//! identifiers so stored settings stay portable.

use std::fmt;

/// An opaque RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rgb` or `#rrggbb` (leading `#` optional).
    pub fn parse_hex(s: &str) -> Option<Rgb> {
        let hex = s.trim().trim_start_matches('#');
        let digit = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
        match hex.len() {
            3 => Some(Rgb(digit(0, 1)? * 17, digit(1, 1)? * 17, digit(2, 1)? * 17)),
            6 => Some(Rgb(digit(0, 2)?, digit(2, 2)?, digit(4, 2)?)),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Style definition for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeStyle {
    pub background: Rgb,
    pub foreground: Rgb,
    pub comment: Rgb,
    pub keyword: Rgb,
    pub string: Rgb,
    pub number: Rgb,
    pub line_number: Rgb,
}

const fn style(bg: u32, fg: u32, comment: u32, keyword: u32, string: u32, number: u32, gutter: u32) -> ThemeStyle {
    const fn rgb(v: u32) -> Rgb {
        Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }
    ThemeStyle {
        background: rgb(bg),
        foreground: rgb(fg),
        comment: rgb(comment),
        keyword: rgb(keyword),
        string: rgb(string),
        number: rgb(number),
        line_number: rgb(gutter),
    }
}

static THEMES: &[(&str, ThemeStyle)] = &[
    ("anOldHope", style(0x1c1d21, 0xc0c5ce, 0xb6b18b, 0xeb3c54, 0x4fb4d7, 0x78bb65, 0x5a5d66)),
    ("atomOneDark", style(0x282c34, 0xabb2bf, 0x5c6370, 0xc678dd, 0x98c379, 0xd19a66, 0x636d83)),
    ("atomOneLight", style(0xfafafa, 0x383a42, 0xa0a1a7, 0xa626a4, 0x50a14f, 0x986801, 0x9d9d9f)),
    ("dracula", style(0x282a36, 0xf8f8f2, 0x6272a4, 0xff79c6, 0xf1fa8c, 0xbd93f9, 0x6272a4)),
    ("github", style(0xf8f8f8, 0x333333, 0x999988, 0x333333, 0xdd1144, 0x008080, 0x999999)),
    ("monokai", style(0x272822, 0xdddddd, 0x75715e, 0xf92672, 0xe6db74, 0xae81ff, 0x75715e)),
    ("nord", style(0x2e3440, 0xd8dee9, 0x4c566a, 0x81a1c1, 0xa3be8c, 0xb48ead, 0x4c566a)),
    ("solarizedDark", style(0x002b36, 0x839496, 0x586e75, 0x859900, 0x2aa198, 0x2aa198, 0x586e75)),
    ("solarizedLight", style(0xfdf6e3, 0x657b83, 0x93a1a1, 0x859900, 0x2aa198, 0x2aa198, 0x93a1a1)),
    ("vs2015", style(0x1e1e1e, 0xdcdcdc, 0x57a64a, 0x569cd6, 0xd69d85, 0xb8d7a3, 0x858585)),
];

/// Read-only view over the built-in themes
#[derive(Debug, Clone, Copy, Default)]
pub struct ThemeRegistry;

impl ThemeRegistry {
    pub fn new() -> Self {
        ThemeRegistry
    }

    /// Theme names in registry order, as offered by a selector.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        THEMES.iter().map(|(name, _)| *name)
    }

    pub fn get(&self, name: &str) -> Option<&'static ThemeStyle> {
        THEMES.iter().find(|(n, _)| *n == name).map(|(_, s)| s)
    }

    /// Style for `name`, or the first registered theme when it is unknown.
    pub fn resolve(&self, name: &str) -> &'static ThemeStyle {
        self.get(name).unwrap_or(&THEMES[0].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        THEMES.len()
    }

    pub fn is_empty(&self) -> bool {
        THEMES.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_is_registered() {
        let reg = ThemeRegistry::new();
        assert!(reg.contains("anOldHope"));
        assert_eq!(reg.names().next(), Some("anOldHope"));
        assert!(!reg.contains("AnOldHope"));
        assert_eq!(reg.resolve("missing"), reg.get("anOldHope").unwrap());
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(Rgb::parse_hex("#1c1d21"), Some(Rgb(0x1c, 0x1d, 0x21)));
        assert_eq!(Rgb::parse_hex("fff"), Some(Rgb(255, 255, 255)));
        assert_eq!(Rgb::parse_hex("#12345"), None);
        assert_eq!(Rgb::parse_hex("#zzzzzz"), None);
        assert_eq!(Rgb(1, 2, 255).to_hex(), "#0102ff");
    }
}
