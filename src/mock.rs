//! Mock gamma backend for testing.

use crate::controller::GammaBackend;
use crate::error::GammaError;
use crate::ramp::GammaRamps;
use std::sync::Mutex;

/// A mock gamma backend for testing.
///
/// This allows testing code that depends on [`GammaBackend`] without an X
/// server. Every CRTC keeps its current ramps in memory and every successful
/// or rejected write is recorded.
///
/// # Example
///
/// ```
/// use gammarr::{GammaBackend, GammaRamps, MockBackend};
///
/// let mock = MockBackend::new().with_crtc(63, GammaRamps::linear(256).unwrap());
/// let crtc = mock.crtc_by_id(63).unwrap();
/// assert_eq!(mock.get_gamma(&crtc).unwrap().size(), 256);
/// ```
pub struct MockBackend {
    crtcs: Mutex<Vec<MockCrtc>>,
    writes: Mutex<Vec<u32>>,
}

struct MockCrtc {
    id: u32,
    ramps: Option<GammaRamps>,
    reject_writes: bool,
}

impl MockBackend {
    /// Create a mock backend without CRTCs.
    pub fn new() -> Self {
        Self {
            crtcs: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Add a CRTC with the given current ramps.
    pub fn with_crtc(self, id: u32, ramps: GammaRamps) -> Self {
        self.crtcs.lock().unwrap().push(MockCrtc {
            id,
            ramps: Some(ramps),
            reject_writes: false,
        });
        self
    }

    /// Add a CRTC that cannot report gamma.
    pub fn with_gammaless_crtc(self, id: u32) -> Self {
        self.crtcs.lock().unwrap().push(MockCrtc {
            id,
            ramps: None,
            reject_writes: false,
        });
        self
    }

    /// Make every later write to `id` fail.
    pub fn reject_writes(&self, id: u32) {
        if let Some(crtc) = self.crtcs.lock().unwrap().iter_mut().find(|c| c.id == id) {
            crtc.reject_writes = true;
        }
    }

    /// Remove a CRTC, as if the server renumbered its outputs.
    pub fn unplug(&self, id: u32) {
        self.crtcs.lock().unwrap().retain(|c| c.id != id);
    }

    /// Current ramps of `id`.
    pub fn ramps(&self, id: u32) -> Option<GammaRamps> {
        self.crtcs
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| c.ramps.clone())
    }

    /// Ids of every attempted write, in order.
    pub fn writes(&self) -> Vec<u32> {
        self.writes.lock().unwrap().clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GammaBackend for MockBackend {
    type Crtc = u32;

    fn list_crtcs(&self) -> Result<Vec<u32>, GammaError> {
        Ok(self.crtcs.lock().unwrap().iter().map(|c| c.id).collect())
    }

    fn crtc_id(&self, crtc: &u32) -> u32 {
        *crtc
    }

    fn crtc_by_id(&self, id: u32) -> Result<u32, GammaError> {
        let crtcs = self.crtcs.lock().unwrap();
        if crtcs.iter().any(|c| c.id == id) {
            Ok(id)
        } else {
            Err(GammaError::CrtcNotFound(id))
        }
    }

    fn get_gamma(&self, crtc: &u32) -> Result<GammaRamps, GammaError> {
        self.crtcs
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == *crtc)
            .and_then(|c| c.ramps.clone())
            .ok_or(GammaError::GammaUnavailable(*crtc))
    }

    fn set_gamma(&self, crtc: &u32, ramps: &GammaRamps) -> Result<(), GammaError> {
        self.writes.lock().unwrap().push(*crtc);

        let mut crtcs = self.crtcs.lock().unwrap();
        let target = crtcs
            .iter_mut()
            .find(|c| c.id == *crtc)
            .ok_or(GammaError::CrtcNotFound(*crtc))?;
        if target.reject_writes {
            return Err(GammaError::SetGammaFailed {
                crtc_id: *crtc,
                reason: String::from("rejected by mock"),
            });
        }
        target.ramps = Some(ramps.clone());
        Ok(())
    }
}
