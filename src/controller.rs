//! Display-server access for gamma ramps.

use crate::error::GammaError;
use crate::ramp::GammaRamps;

use log::debug;
use x11rb::connection::Connection;
use x11rb::protocol::randr::{self, ConnectionExt as _};
use x11rb::protocol::xproto::Window;
use x11rb::rust_connection::RustConnection;

const RANDR_VERSION_MAJOR: u32 = 1;
const RANDR_VERSION_MINOR: u32 = 3;

// =============================================================================
// Gamma Backend Trait
// =============================================================================

/// Capability to enumerate CRTCs and read or write their gamma ramps.
///
/// Handles returned by [`list_crtcs`](Self::list_crtcs) and
/// [`crtc_by_id`](Self::crtc_by_id) are transient. Callers keep the numeric id
/// and re-resolve the handle before every read or write.
///
/// This allows for mock implementations in tests.
pub trait GammaBackend {
    /// Transient handle for one CRTC.
    type Crtc;

    /// List every CRTC currently exposed by the display server.
    fn list_crtcs(&self) -> Result<Vec<Self::Crtc>, GammaError>;

    /// Stable identifier of a CRTC.
    fn crtc_id(&self, crtc: &Self::Crtc) -> u32;

    /// Resolve a CRTC handle from its identifier.
    fn crtc_by_id(&self, id: u32) -> Result<Self::Crtc, GammaError>;

    /// Read the current gamma ramps of a CRTC.
    fn get_gamma(&self, crtc: &Self::Crtc) -> Result<GammaRamps, GammaError>;

    /// Replace the gamma ramps of a CRTC.
    fn set_gamma(&self, crtc: &Self::Crtc, ramps: &GammaRamps) -> Result<(), GammaError>;
}

// =============================================================================
// RandrBackend
// =============================================================================

/// Gamma backend talking to an X server through the RandR extension.
///
/// # Example
///
/// ```no_run
/// use gammarr::{GammaBackend, RandrBackend};
///
/// let backend = RandrBackend::connect(None)?;
/// for crtc in backend.list_crtcs()? {
///     let ramps = backend.get_gamma(&crtc)?;
///     println!("crtc {}: {} entries", backend.crtc_id(&crtc), ramps.size());
/// }
/// # Ok::<(), gammarr::GammaError>(())
/// ```
pub struct RandrBackend {
    conn: RustConnection,
    root: Window,
}

impl RandrBackend {
    /// Connect to the X server named by `display`, or `$DISPLAY` when `None`.
    ///
    /// # Errors
    ///
    /// - [`GammaError::Connect`] if the server cannot be reached
    /// - [`GammaError::UnsupportedRandr`] if RandR is older than 1.3
    pub fn connect(display: Option<&str>) -> Result<Self, GammaError> {
        let (conn, screen_num) = x11rb::connect(display)?;
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| GammaError::ScreenNotFound(format!("no screen {}", screen_num)))?;

        let version = conn
            .randr_query_version(RANDR_VERSION_MAJOR, RANDR_VERSION_MINOR)?
            .reply()?;
        if (version.major_version, version.minor_version)
            < (RANDR_VERSION_MAJOR, RANDR_VERSION_MINOR)
        {
            return Err(GammaError::UnsupportedRandr {
                major: version.major_version,
                minor: version.minor_version,
            });
        }

        debug!(
            "connected to screen {} (RandR {}.{})",
            screen_num, version.major_version, version.minor_version
        );
        Ok(Self { conn, root })
    }

    fn current_crtcs(&self) -> Result<Vec<randr::Crtc>, GammaError> {
        let resources = self
            .conn
            .randr_get_screen_resources_current(self.root)?
            .reply()?;
        Ok(resources.crtcs)
    }
}

impl GammaBackend for RandrBackend {
    type Crtc = randr::Crtc;

    fn list_crtcs(&self) -> Result<Vec<Self::Crtc>, GammaError> {
        self.current_crtcs()
    }

    fn crtc_id(&self, crtc: &Self::Crtc) -> u32 {
        *crtc
    }

    fn crtc_by_id(&self, id: u32) -> Result<Self::Crtc, GammaError> {
        if self.current_crtcs()?.contains(&id) {
            Ok(id)
        } else {
            Err(GammaError::CrtcNotFound(id))
        }
    }

    fn get_gamma(&self, crtc: &Self::Crtc) -> Result<GammaRamps, GammaError> {
        let reply = self
            .conn
            .randr_get_crtc_gamma(*crtc)?
            .reply()
            .map_err(|e| {
                debug!("get gamma for crtc {} failed: {}", crtc, e);
                GammaError::GammaUnavailable(*crtc)
            })?;
        GammaRamps::from_channels(reply.red, reply.green, reply.blue)
    }

    fn set_gamma(&self, crtc: &Self::Crtc, ramps: &GammaRamps) -> Result<(), GammaError> {
        self.conn
            .randr_set_crtc_gamma(*crtc, ramps.red(), ramps.green(), ramps.blue())?
            .check()
            .map_err(|e| GammaError::SetGammaFailed {
                crtc_id: *crtc,
                reason: e.to_string(),
            })
    }
}
