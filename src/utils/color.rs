//! Color parsing and conversion utilities
//!
//! Turns the `bgColor` form field into an explicit RGBA value.

use crate::{
    error::{ImgToolsError, Result},
    types::BackgroundColor,
};

/// Utility for parsing and converting colors
pub struct ColorParser;

impl ColorParser {
    /// Parse a colour string to `BackgroundColor`
    ///
    /// Supports `#RGB`, `#RRGGBB`, `#RRGGBBAA` (with or without `#`) and the
    /// CSS keyword `transparent`, which becomes alpha 0.
    ///
    /// # Examples
    /// ```rust
    /// use imgtools::utils::ColorParser;
    ///
    /// let white = ColorParser::parse("#ffffff")?;
    /// let red = ColorParser::parse("#f00")?;
    /// let clear = ColorParser::parse("transparent")?;
    /// assert_eq!(clear.a, 0);
    /// # Ok::<(), imgtools::ImgToolsError>(())
    /// ```
    pub fn parse(value: &str) -> Result<BackgroundColor> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("transparent") {
            return Ok(BackgroundColor::transparent());
        }
        Self::parse_hex(value)
    }

    /// Parse a hex colour string
    pub fn parse_hex(hex: &str) -> Result<BackgroundColor> {
        let hex = hex.trim_start_matches('#');

        if !hex.is_ascii() {
            return Err(ImgToolsError::invalid_input(
                "Color must be in #RRGGBB, #RRGGBBAA or #RGB format",
            ));
        }

        match hex.len() {
            6 => Ok(BackgroundColor::new(
                Self::component(hex, 0, "red")?,
                Self::component(hex, 2, "green")?,
                Self::component(hex, 4, "blue")?,
            )),
            8 => Ok(BackgroundColor::with_alpha(
                Self::component(hex, 0, "red")?,
                Self::component(hex, 2, "green")?,
                Self::component(hex, 4, "blue")?,
                Self::component(hex, 6, "alpha")?,
            )),
            3 => {
                // #RGB expands each nibble to a full byte
                let nibble = |i: usize, name: &str| -> Result<u8> {
                    hex.get(i..=i)
                        .and_then(|s| u8::from_str_radix(s, 16).ok())
                        .map(|v| v * 17)
                        .ok_or_else(|| {
                            ImgToolsError::invalid_input(format!(
                                "Invalid {} component in hex color",
                                name
                            ))
                        })
                };
                Ok(BackgroundColor::new(
                    nibble(0, "red")?,
                    nibble(1, "green")?,
                    nibble(2, "blue")?,
                ))
            },
            _ => Err(ImgToolsError::invalid_input(
                "Color must be in #RRGGBB, #RRGGBBAA or #RGB format",
            )),
        }
    }

    fn component(hex: &str, start: usize, name: &str) -> Result<u8> {
        hex.get(start..start + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .ok_or_else(|| {
                ImgToolsError::invalid_input(format!("Invalid {} component in hex color", name))
            })
    }

    /// Convert `BackgroundColor` to a hex string
    ///
    /// The alpha byte is only emitted when the colour is not fully opaque.
    pub fn to_hex(color: &BackgroundColor, include_hash: bool) -> String {
        let prefix = if include_hash { "#" } else { "" };
        if color.a == 255 {
            format!("{}{:02x}{:02x}{:02x}", prefix, color.r, color.g, color.b)
        } else {
            format!(
                "{}{:02x}{:02x}{:02x}{:02x}",
                prefix, color.r, color.g, color.b, color.a
            )
        }
    }
}
