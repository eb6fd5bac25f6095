//! Method options: CRTC selection and preserve mode.

use crate::error::GammaError;

use log::debug;
use std::io::{self, Write};

/// Which CRTCs an apply call targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CrtcSelection {
    /// Every CRTC in the registry.
    #[default]
    All,
    /// Registry indices, in the order given.
    Only(Vec<usize>),
}

/// Options collected before [`GammaState::start`](crate::GammaState::start).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GammaOptions {
    /// CRTCs to adjust.
    pub crtcs: CrtcSelection,
    /// Start from the captured ramps instead of a linear ramp.
    pub preserve: bool,
}

impl GammaOptions {
    /// Apply one `key=value` option.
    ///
    /// Keys are case-insensitive. On error the options are left unchanged.
    ///
    /// # Errors
    ///
    /// - [`GammaError::InvalidCrtcList`] for a malformed `crtc` value
    /// - [`GammaError::InvalidOptionValue`] for a non-numeric `preserve` value
    /// - [`GammaError::UnknownOption`] for any other key
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<(), GammaError> {
        if key.eq_ignore_ascii_case("crtc") {
            self.crtcs = parse_selection(value)?;
            debug!("crtc selection: {:?}", self.crtcs);
        } else if key.eq_ignore_ascii_case("preserve") {
            let flag: i64 = value.trim().parse().map_err(|_| GammaError::InvalidOptionValue {
                key: key.to_string(),
                value: value.to_string(),
            })?;
            self.preserve = flag != 0;
            debug!("preserve: {}", self.preserve);
        } else {
            return Err(GammaError::UnknownOption(key.to_string()));
        }
        Ok(())
    }
}

/// Parse a comma-separated list of CRTC indices.
///
/// Tokens may be decimal, hexadecimal with a `0x` prefix, or octal with a
/// leading `0`, optionally preceded by whitespace. Empty text selects every
/// CRTC. Any malformed token fails the whole list.
///
/// ```
/// use gammarr::{parse_selection, CrtcSelection};
///
/// assert_eq!(parse_selection("0,2,0x5").unwrap(), CrtcSelection::Only(vec![0, 2, 5]));
/// assert_eq!(parse_selection("").unwrap(), CrtcSelection::All);
/// assert!(parse_selection("1,,3").is_err());
/// ```
pub fn parse_selection(text: &str) -> Result<CrtcSelection, GammaError> {
    if text.is_empty() {
        return Ok(CrtcSelection::All);
    }

    let indices = text
        .split(',')
        .map(|token| parse_index(token.trim_start()))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| GammaError::InvalidCrtcList(text.to_string()))?;
    Ok(CrtcSelection::Only(indices))
}

// A token is valid when it has at least one digit of its radix, no sign, and
// fits in 32 bits. Zero is an ordinary index.
fn parse_index(token: &str) -> Option<usize> {
    let (digits, radix) = if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        (hex, 16)
    } else if token.len() > 1 && token.starts_with('0') {
        (&token[1..], 8)
    } else {
        (token, 10)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(|value| usize::try_from(value).ok())
}

/// Write option help to `out`.
pub fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Adjust gamma ramps with the X RANDR extension.")?;
    writeln!(out)?;
    writeln!(out, "  crtc=N\tList of comma separated CRTCs to apply adjustments to")?;
    writeln!(out, "  preserve={{0,1}}\tWhether existing gamma should be preserved")?;
    writeln!(out)
}
