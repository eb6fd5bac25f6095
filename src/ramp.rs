//! Gamma ramp buffers and the ramp-fill collaborator.

use crate::error::GammaError;

/// One gamma lookup table per channel.
///
/// The three channels always have the same length, the ramp size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GammaRamps {
    red: Vec<u16>,
    green: Vec<u16>,
    blue: Vec<u16>,
}

impl GammaRamps {
    /// Build ramps from three channels.
    ///
    /// # Errors
    /// Returns [`GammaError::RampSizeMismatch`] if the channels differ in length.
    pub fn from_channels(
        red: Vec<u16>,
        green: Vec<u16>,
        blue: Vec<u16>,
    ) -> Result<Self, GammaError> {
        if red.len() != green.len() || red.len() != blue.len() {
            return Err(GammaError::RampSizeMismatch {
                red: red.len(),
                green: green.len(),
                blue: blue.len(),
            });
        }
        Ok(Self { red, green, blue })
    }

    /// Synthesize a neutral ramp spanning the full 16-bit range.
    ///
    /// Entry `i` holds `round(i / size * 65536)` in every channel.
    pub fn linear(size: usize) -> Result<Self, GammaError> {
        let mut red = alloc_channel(size)?;
        red.extend((0..size).map(|i| linear_level(i, size)));
        let mut green = alloc_channel(size)?;
        green.extend_from_slice(&red);
        let mut blue = alloc_channel(size)?;
        blue.extend_from_slice(&red);
        Ok(Self { red, green, blue })
    }

    /// Copy these ramps into freshly allocated buffers.
    pub fn try_clone(&self) -> Result<Self, GammaError> {
        let copy = |src: &[u16]| -> Result<Vec<u16>, GammaError> {
            let mut dst = alloc_channel(src.len())?;
            dst.extend_from_slice(src);
            Ok(dst)
        };
        Ok(Self {
            red: copy(&self.red)?,
            green: copy(&self.green)?,
            blue: copy(&self.blue)?,
        })
    }

    /// Number of entries per channel.
    pub fn size(&self) -> usize {
        self.red.len()
    }

    /// Red channel.
    pub fn red(&self) -> &[u16] {
        &self.red
    }

    /// Green channel.
    pub fn green(&self) -> &[u16] {
        &self.green
    }

    /// Blue channel.
    pub fn blue(&self) -> &[u16] {
        &self.blue
    }

    /// Mutable access to all three channels at once.
    pub fn channels_mut(&mut self) -> (&mut [u16], &mut [u16], &mut [u16]) {
        (&mut self.red, &mut self.green, &mut self.blue)
    }
}

fn alloc_channel(size: usize) -> Result<Vec<u16>, GammaError> {
    let mut channel = Vec::new();
    channel.try_reserve_exact(size)?;
    Ok(channel)
}

fn linear_level(i: usize, size: usize) -> u16 {
    let level = (i as f64 / size as f64 * 65536.0).round();
    level.min(u16::MAX as f64) as u16
}

/// Target color adjustment handed to the ramp-fill function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSetting {
    /// Color temperature in Kelvin.
    pub temperature: u32,
    /// Brightness factor (1.0 = unchanged).
    pub brightness: f32,
    /// Per-channel gamma exponents (R, G, B).
    pub gamma: [f32; 3],
}

/// Neutral daylight setting: 6500K, full brightness, gamma 1.0.
impl Default for ColorSetting {
    fn default() -> Self {
        Self {
            temperature: 6500,
            brightness: 1.0,
            gamma: [1.0; 3],
        }
    }
}

/// Overlays a color setting onto a gamma ramp in place.
///
/// Implementations must be total: every channel has the same length and the
/// fill never fails. Closures with the matching signature implement this
/// trait.
pub trait RampFill {
    /// Transform `red`, `green` and `blue` according to `setting`.
    fn fill(&self, red: &mut [u16], green: &mut [u16], blue: &mut [u16], setting: &ColorSetting);
}

impl<F> RampFill for F
where
    F: Fn(&mut [u16], &mut [u16], &mut [u16], &ColorSetting),
{
    fn fill(&self, red: &mut [u16], green: &mut [u16], blue: &mut [u16], setting: &ColorSetting) {
        self(red, green, blue, setting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_ramp_256() {
        let ramps = GammaRamps::linear(256).unwrap();
        assert_eq!(ramps.size(), 256);
        for i in 0..256 {
            assert_eq!(ramps.red()[i] as usize, i * 256);
        }
        assert_eq!(ramps.red(), ramps.green());
        assert_eq!(ramps.red(), ramps.blue());
    }

    #[test]
    fn test_linear_ramp_rounds() {
        // 1/3 * 65536 = 21845.33, 2/3 * 65536 = 43690.67
        let ramps = GammaRamps::linear(3).unwrap();
        assert_eq!(ramps.red(), &[0, 21845, 43691]);
    }

    #[test]
    fn test_linear_ramp_allocation_failure() {
        let result = GammaRamps::linear(usize::MAX);
        assert!(matches!(result, Err(GammaError::Allocation(_))));
    }

    #[test]
    fn test_channel_allocation_failure() {
        // try_clone and linear both allocate through alloc_channel.
        assert!(matches!(alloc_channel(usize::MAX), Err(GammaError::Allocation(_))));
        assert!(alloc_channel(16).unwrap().capacity() >= 16);

        let ramps = GammaRamps::linear(8).unwrap();
        assert_eq!(ramps.try_clone().unwrap(), ramps);
    }

    #[test]
    fn test_mismatched_channels_rejected() {
        let err = GammaRamps::from_channels(vec![0; 4], vec![0; 4], vec![0; 3]).unwrap_err();
        assert!(matches!(err, GammaError::RampSizeMismatch { blue: 3, .. }));
    }

    #[test]
    fn test_closure_fill() {
        let halve = |r: &mut [u16], g: &mut [u16], b: &mut [u16], _: &ColorSetting| {
            for ch in [r, g, b] {
                ch.iter_mut().for_each(|v| *v /= 2);
            }
        };
        let mut ramps = GammaRamps::linear(4).unwrap();
        let (r, g, b) = ramps.channels_mut();
        halve.fill(r, g, b, &ColorSetting::default());
        assert_eq!(ramps.blue(), &[0, 8192, 16384, 24576]);
    }
}
