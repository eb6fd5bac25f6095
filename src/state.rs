//! CRTC registry, captured ramps and the temperature applicator.

use crate::controller::GammaBackend;
use crate::error::GammaError;
use crate::options::{CrtcSelection, GammaOptions};
use crate::ramp::{ColorSetting, GammaRamps, RampFill};

use log::{debug, error, info};

/// One registry entry: a CRTC and the ramps it had before adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrtcState {
    /// Identifier handed out by the display server.
    pub id: u32,
    /// Gamma ramps captured at start, never modified afterwards.
    pub saved_ramps: GammaRamps,
}

impl CrtcState {
    /// Number of entries per channel.
    pub fn ramp_size(&self) -> usize {
        self.saved_ramps.size()
    }
}

/// A CRTC whose original ramps could not be written back.
#[derive(Debug)]
pub struct RestoreFailure {
    /// Registry index.
    pub index: usize,
    /// CRTC identifier.
    pub crtc_id: u32,
    /// Why the write failed.
    pub error: GammaError,
}

/// Gamma state for every CRTC of one display server connection.
///
/// Created by [`start`](Self::start), which captures the current ramps of all
/// CRTCs. Ramps are then adjusted with [`apply`](Self::apply) and put back
/// with [`restore`](Self::restore).
///
/// # Example
///
/// ```no_run
/// use gammarr::{ColorSetting, GammaOptions, GammaState, RandrBackend};
///
/// let backend = RandrBackend::connect(None)?;
/// let dim = |r: &mut [u16], g: &mut [u16], b: &mut [u16], s: &ColorSetting| {
///     for ch in [r, g, b] {
///         ch.iter_mut().for_each(|v| *v = (*v as f32 * s.brightness) as u16);
///     }
/// };
/// let state = GammaState::start(backend, GammaOptions::default(), Box::new(dim))?;
/// state.apply(&ColorSetting { brightness: 0.8, ..Default::default() })?;
/// state.restore();
/// state.release();
/// # Ok::<(), gammarr::GammaError>(())
/// ```
pub struct GammaState<B: GammaBackend> {
    // Field order is drop order: snapshots go before the connection.
    crtcs: Vec<CrtcState>,
    options: GammaOptions,
    fill: Box<dyn RampFill>,
    backend: B,
}

impl<B: GammaBackend> GammaState<B> {
    /// Enumerate all CRTCs and capture their current gamma ramps.
    ///
    /// Nothing is written to the display. Either every CRTC is captured or
    /// the whole call fails.
    ///
    /// # Errors
    ///
    /// - [`GammaError::NoCrtcs`] if the server exposes no CRTCs
    /// - [`GammaError::GammaUnavailable`] if a CRTC cannot report gamma
    /// - [`GammaError::RampSizeTooSmall`] if a CRTC reports an empty ramp
    pub fn start(
        backend: B,
        options: GammaOptions,
        fill: Box<dyn RampFill>,
    ) -> Result<Self, GammaError> {
        let handles = backend.list_crtcs()?;
        if handles.is_empty() {
            return Err(GammaError::NoCrtcs);
        }

        let mut crtcs = Vec::new();
        crtcs.try_reserve_exact(handles.len())?;
        for handle in &handles {
            let id = backend.crtc_id(handle);
            let saved_ramps = backend.get_gamma(handle)?;
            if saved_ramps.size() == 0 {
                return Err(GammaError::RampSizeTooSmall { crtc_id: id, size: 0 });
            }
            debug!("captured crtc {} (ramp size {})", id, saved_ramps.size());
            crtcs.push(CrtcState { id, saved_ramps });
        }

        info!(
            "captured gamma of {} crtc(s), preserve={}",
            crtcs.len(),
            options.preserve
        );
        Ok(Self {
            crtcs,
            options,
            fill,
            backend,
        })
    }

    /// Registry entries in enumeration order.
    pub fn crtcs(&self) -> &[CrtcState] {
        &self.crtcs
    }

    /// Options this state was started with.
    pub fn options(&self) -> &GammaOptions {
        &self.options
    }

    /// The display backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Apply `setting` to the selected CRTCs, stopping at the first failure.
    ///
    /// CRTCs updated before a failure keep their new ramps.
    pub fn apply(&self, setting: &ColorSetting) -> Result<(), GammaError> {
        match &self.options.crtcs {
            CrtcSelection::All => {
                for index in 0..self.crtcs.len() {
                    self.apply_to(index, setting)?;
                }
            }
            CrtcSelection::Only(indices) => {
                for &index in indices {
                    self.apply_to(index, setting)?;
                }
            }
        }
        Ok(())
    }

    /// Apply `setting` to the CRTC at registry position `index`.
    ///
    /// # Errors
    ///
    /// - [`GammaError::CrtcOutOfRange`] if `index` is not in the registry;
    ///   nothing is written in that case
    /// - [`GammaError::SetGammaFailed`] if the server rejects the ramps
    pub fn apply_to(&self, index: usize, setting: &ColorSetting) -> Result<(), GammaError> {
        let crtc = self.crtcs.get(index).ok_or(GammaError::CrtcOutOfRange {
            index,
            count: self.crtcs.len(),
        })?;
        let handle = self.backend.crtc_by_id(crtc.id)?;

        let mut ramps = if self.options.preserve {
            crtc.saved_ramps.try_clone()?
        } else {
            GammaRamps::linear(crtc.ramp_size())?
        };
        let (red, green, blue) = ramps.channels_mut();
        self.fill.fill(red, green, blue, setting);

        self.backend.set_gamma(&handle, &ramps)?;
        debug!(
            "applied {}K brightness {:.2} to crtc {}",
            setting.temperature, setting.brightness, crtc.id
        );
        Ok(())
    }

    /// Write the captured ramps back to every CRTC.
    ///
    /// Keeps going when a CRTC fails; each failure is logged and returned.
    pub fn restore(&self) -> Vec<RestoreFailure> {
        let mut failures = Vec::new();
        for (index, crtc) in self.crtcs.iter().enumerate() {
            let result = self
                .backend
                .crtc_by_id(crtc.id)
                .and_then(|handle| self.backend.set_gamma(&handle, &crtc.saved_ramps));
            if let Err(e) = result {
                error!("unable to restore CRTC {}: {}", index, e);
                failures.push(RestoreFailure {
                    index,
                    crtc_id: crtc.id,
                    error: e,
                });
            }
        }

        info!(
            "restored {} of {} crtc(s)",
            self.crtcs.len() - failures.len(),
            self.crtcs.len()
        );
        failures
    }

    /// Free the captured ramps and close the backend.
    pub fn release(self) {
        debug!("releasing {} crtc(s)", self.crtcs.len());
        drop(self);
    }
}
