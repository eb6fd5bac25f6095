//! Per-CRTC gamma ramp management for color temperature adjustment.
//!
//! This crate captures the gamma ramps of every CRTC exposed by a display
//! server, applies new ramps derived from a [`ColorSetting`] to all or some
//! of them, and puts the original ramps back on exit.
//!
//! The color math itself is not part of this crate: callers supply a
//! [`RampFill`] that overlays a setting onto a ramp.
//!
//! # Example
//!
//! ```no_run
//! use gammarr::{ColorSetting, GammaOptions, GammaState, RandrBackend};
//!
//! fn main() -> Result<(), gammarr::GammaError> {
//!     let mut options = GammaOptions::default();
//!     options.set_option("crtc", "0")?;
//!     options.set_option("preserve", "1")?;
//!
//!     let fill = |_: &mut [u16], _: &mut [u16], _: &mut [u16], _: &ColorSetting| {};
//!     let state = GammaState::start(RandrBackend::connect(None)?, options, Box::new(fill))?;
//!
//!     state.apply(&ColorSetting::default())?;
//!
//!     for failure in state.restore() {
//!         eprintln!("crtc {} not restored: {}", failure.crtc_id, failure.error);
//!     }
//!     state.release();
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! Use [`MockBackend`] to test code without an X server:
//!
//! ```
//! use gammarr::{ColorSetting, GammaOptions, GammaRamps, GammaState, MockBackend};
//!
//! let mock = MockBackend::new().with_crtc(1, GammaRamps::linear(16).unwrap());
//! let fill = |_: &mut [u16], _: &mut [u16], _: &mut [u16], _: &ColorSetting| {};
//! let state = GammaState::start(mock, GammaOptions::default(), Box::new(fill)).unwrap();
//! state.apply(&ColorSetting::default()).unwrap();
//! assert_eq!(state.backend().writes(), vec![1]);
//! ```

#![warn(missing_docs)]

mod controller;
mod error;
mod mock;
mod options;
mod ramp;
mod state;

// Re-export public API
pub use controller::{GammaBackend, RandrBackend};
pub use error::GammaError;
pub use mock::MockBackend;
pub use options::{CrtcSelection, GammaOptions, parse_selection, print_help};
pub use ramp::{ColorSetting, GammaRamps, RampFill};
pub use state::{CrtcState, GammaState, RestoreFailure};

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Box<dyn RampFill> {
        Box::new(|_: &mut [u16], _: &mut [u16], _: &mut [u16], _: &ColorSetting| {})
    }

    // Halves every level so applied ramps differ from any baseline.
    fn halve() -> Box<dyn RampFill> {
        Box::new(
            |r: &mut [u16], g: &mut [u16], b: &mut [u16], _: &ColorSetting| {
                for ch in [r, g, b] {
                    ch.iter_mut().for_each(|v| *v /= 2);
                }
            },
        )
    }

    fn ramp(seed: u16, size: usize) -> GammaRamps {
        let channel = |offset: u16| {
            (0..size)
                .map(|i| (i as u16).wrapping_mul(97).wrapping_add(seed + offset))
                .collect::<Vec<_>>()
        };
        GammaRamps::from_channels(channel(0), channel(1), channel(2)).unwrap()
    }

    fn three_crtcs() -> MockBackend {
        MockBackend::new()
            .with_crtc(10, ramp(1, 256))
            .with_crtc(11, ramp(2, 256))
            .with_crtc(12, ramp(3, 1024))
    }

    fn options(crtc: &str, preserve: &str) -> GammaOptions {
        let mut options = GammaOptions::default();
        options.set_option("crtc", crtc).unwrap();
        options.set_option("preserve", preserve).unwrap();
        options
    }

    #[test]
    fn test_start_captures_every_crtc() {
        let state = GammaState::start(three_crtcs(), GammaOptions::default(), identity()).unwrap();

        let ids: Vec<u32> = state.crtcs().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
        for crtc in state.crtcs() {
            assert!(crtc.ramp_size() > 0);
            assert_eq!(crtc.saved_ramps.red().len(), crtc.ramp_size());
            assert_eq!(crtc.saved_ramps.green().len(), crtc.ramp_size());
            assert_eq!(crtc.saved_ramps.blue().len(), crtc.ramp_size());
        }
        assert_eq!(state.crtcs()[2].saved_ramps, ramp(3, 1024));
        assert!(state.backend().writes().is_empty());
    }

    #[test]
    fn test_start_without_crtcs_fails() {
        let result = GammaState::start(MockBackend::new(), GammaOptions::default(), identity());
        assert!(matches!(result, Err(GammaError::NoCrtcs)));
    }

    #[test]
    fn test_start_fails_on_unreadable_gamma() {
        let mock = MockBackend::new()
            .with_crtc(1, ramp(0, 256))
            .with_gammaless_crtc(2);
        let result = GammaState::start(mock, GammaOptions::default(), identity());
        assert!(matches!(result, Err(GammaError::GammaUnavailable(2))));
    }

    #[test]
    fn test_start_fails_on_empty_ramp() {
        let empty = GammaRamps::from_channels(Vec::new(), Vec::new(), Vec::new()).unwrap();
        let mock = MockBackend::new().with_crtc(5, empty);
        let result = GammaState::start(mock, GammaOptions::default(), identity());
        assert!(matches!(
            result,
            Err(GammaError::RampSizeTooSmall { crtc_id: 5, size: 0 })
        ));
    }

    #[test]
    fn test_apply_linear_baseline() {
        let state = GammaState::start(three_crtcs(), options("1", "0"), identity()).unwrap();
        state.apply(&ColorSetting::default()).unwrap();

        let applied = state.backend().ramps(11).unwrap();
        assert_eq!(applied, GammaRamps::linear(256).unwrap());
        for i in 0..256 {
            assert_eq!(applied.green()[i] as usize, i * 256);
        }
        assert_eq!(state.backend().writes(), vec![11]);
    }

    #[test]
    fn test_apply_preserve_uses_saved_ramps() {
        let state = GammaState::start(three_crtcs(), options("0", "1"), halve()).unwrap();
        state.apply(&ColorSetting::default()).unwrap();

        let applied = state.backend().ramps(10).unwrap();
        let expected: Vec<u16> = ramp(1, 256).red().iter().map(|v| v / 2).collect();
        assert_eq!(applied.red(), expected.as_slice());
        // Captured ramps are not touched by apply.
        assert_eq!(state.crtcs()[0].saved_ramps, ramp(1, 256));
    }

    #[test]
    fn test_apply_selection_order() {
        let state = GammaState::start(three_crtcs(), options("2,0", "0"), identity()).unwrap();
        state.apply(&ColorSetting::default()).unwrap();
        assert_eq!(state.backend().writes(), vec![12, 10]);
    }

    #[test]
    fn test_apply_fails_fast() {
        let mock = three_crtcs();
        mock.reject_writes(11);
        let state = GammaState::start(mock, GammaOptions::default(), halve()).unwrap();

        let result = state.apply(&ColorSetting::default());
        assert!(matches!(
            result,
            Err(GammaError::SetGammaFailed { crtc_id: 11, .. })
        ));

        let backend = state.backend();
        assert_eq!(backend.writes(), vec![10, 11]);
        assert_ne!(backend.ramps(10).unwrap(), ramp(1, 256));
        assert_eq!(backend.ramps(11).unwrap(), ramp(2, 256));
        assert_eq!(backend.ramps(12).unwrap(), ramp(3, 1024));
    }

    #[test]
    fn test_apply_to_out_of_range() {
        let state = GammaState::start(three_crtcs(), GammaOptions::default(), identity()).unwrap();

        let result = state.apply_to(3, &ColorSetting::default());
        assert!(matches!(
            result,
            Err(GammaError::CrtcOutOfRange { index: 3, count: 3 })
        ));
        assert!(state.backend().writes().is_empty());
    }

    #[test]
    fn test_selection_out_of_range_aborts_apply() {
        let state = GammaState::start(three_crtcs(), options("0,7,1", "0"), identity()).unwrap();

        let result = state.apply(&ColorSetting::default());
        assert!(matches!(
            result,
            Err(GammaError::CrtcOutOfRange { index: 7, .. })
        ));
        assert_eq!(state.backend().writes(), vec![10]);
    }

    #[test]
    fn test_apply_reresolves_crtc() {
        let state = GammaState::start(three_crtcs(), GammaOptions::default(), identity()).unwrap();
        state.backend().unplug(11);

        let result = state.apply_to(1, &ColorSetting::default());
        assert!(matches!(result, Err(GammaError::CrtcNotFound(11))));
        state.apply_to(2, &ColorSetting::default()).unwrap();
    }

    #[test]
    fn test_preserve_identity_round_trip() {
        let state = GammaState::start(three_crtcs(), options("", "1"), identity()).unwrap();

        state.apply_to(0, &ColorSetting::default()).unwrap();
        assert_eq!(state.backend().ramps(10).unwrap(), ramp(1, 256));

        assert!(state.restore().is_empty());
        assert_eq!(state.backend().ramps(10).unwrap(), ramp(1, 256));
    }

    #[test]
    fn test_restore_is_idempotent() {
        let state = GammaState::start(three_crtcs(), GammaOptions::default(), halve()).unwrap();
        state.apply(&ColorSetting::default()).unwrap();

        assert!(state.restore().is_empty());
        let once: Vec<_> = [10, 11, 12].iter().map(|&id| state.backend().ramps(id)).collect();
        assert!(state.restore().is_empty());
        let twice: Vec<_> = [10, 11, 12].iter().map(|&id| state.backend().ramps(id)).collect();

        assert_eq!(once, twice);
        assert_eq!(once[1], Some(ramp(2, 256)));
    }

    #[test]
    fn test_restore_continues_after_failure() {
        let state = GammaState::start(three_crtcs(), GammaOptions::default(), halve()).unwrap();
        state.apply(&ColorSetting::default()).unwrap();
        state.backend().reject_writes(10);
        state.backend().unplug(11);

        let failures = state.restore();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].index, 0);
        assert_eq!(failures[0].crtc_id, 10);
        assert!(matches!(
            failures[0].error,
            GammaError::SetGammaFailed { crtc_id: 10, .. }
        ));
        assert_eq!(failures[1].index, 1);
        assert!(matches!(failures[1].error, GammaError::CrtcNotFound(11)));

        assert_eq!(state.backend().ramps(12).unwrap(), ramp(3, 1024));
    }

    #[test]
    fn test_two_crtc_scenario() {
        let mock = MockBackend::new()
            .with_crtc(1, ramp(7, 256))
            .with_crtc(2, ramp(8, 256));
        let state = GammaState::start(mock, GammaOptions::default(), halve()).unwrap();

        state
            .apply(&ColorSetting {
                temperature: 6500,
                ..Default::default()
            })
            .unwrap();

        let mut expected = GammaRamps::linear(256).unwrap();
        let (r, g, b) = expected.channels_mut();
        halve().fill(r, g, b, &ColorSetting::default());
        assert_eq!(state.backend().ramps(1).unwrap(), expected);
        assert_eq!(state.backend().ramps(2).unwrap(), expected);

        assert!(state.restore().is_empty());
        assert_eq!(state.backend().ramps(1).unwrap(), ramp(7, 256));
        assert_eq!(state.backend().ramps(2).unwrap(), ramp(8, 256));
        state.release();
    }
}
