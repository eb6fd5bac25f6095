//! Error types for gamma ramp management.

use std::collections::TryReserveError;

/// Errors that can occur while capturing, applying or restoring gamma ramps.
#[derive(Debug, thiserror::Error)]
pub enum GammaError {
    /// The display server could not be reached.
    #[error("Screen could not be found: {0}")]
    ScreenNotFound(String),

    /// The display server exposes no CRTCs.
    #[error("No CRTCs found on screen")]
    NoCrtcs,

    /// The RandR extension is missing or too old.
    #[error("RandR {major}.{minor} is not supported (need 1.3 or newer)")]
    UnsupportedRandr {
        /// Reported major version.
        major: u32,
        /// Reported minor version.
        minor: u32,
    },

    /// A CRTC did not report its gamma ramps.
    #[error("Cannot get gamma from crtc {0}")]
    GammaUnavailable(u32),

    /// A CRTC reported an empty gamma ramp.
    #[error("Gamma ramp size too small for crtc {crtc_id}: {size}")]
    RampSizeTooSmall {
        /// CRTC identifier.
        crtc_id: u32,
        /// Reported ramp size.
        size: usize,
    },

    /// Channel lengths of a ramp disagree.
    #[error("Gamma ramp channels differ in length (red {red}, green {green}, blue {blue})")]
    RampSizeMismatch {
        /// Red channel length.
        red: usize,
        /// Green channel length.
        green: usize,
        /// Blue channel length.
        blue: usize,
    },

    /// A ramp buffer could not be allocated.
    #[error("Failed to allocate gamma ramp: {0}")]
    Allocation(#[from] TryReserveError),

    /// The `crtc` option could not be parsed.
    #[error("Unable to read screen number: `{0}'")]
    InvalidCrtcList(String),

    /// An option value could not be parsed.
    #[error("Invalid value `{value}' for parameter `{key}'")]
    InvalidOptionValue {
        /// Option key.
        key: String,
        /// Rejected value.
        value: String,
    },

    /// The option key is not known.
    #[error("Unknown method parameter: `{0}'")]
    UnknownOption(String),

    /// A selected CRTC index is outside the registry.
    #[error("CRTC {index} does not exist. {}", valid_crtcs(.count))]
    CrtcOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of CRTCs in the registry.
        count: usize,
    },

    /// A CRTC identifier no longer resolves on the display server.
    #[error("CRTC id {0} is no longer available")]
    CrtcNotFound(u32),

    /// The display server rejected a gamma update.
    #[error("`Set CRTC Gamma' failed for crtc id {crtc_id}: {reason}")]
    SetGammaFailed {
        /// CRTC identifier.
        crtc_id: u32,
        /// Server-side reason.
        reason: String,
    },

    /// Failed to connect to the X server.
    #[error("X11 connect error: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),

    /// The X11 connection broke.
    #[error("X11 connection error: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    /// An X11 request returned an error.
    #[error("X11 request failed: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),
}

fn valid_crtcs(count: &usize) -> String {
    if *count > 1 {
        format!("Valid CRTCs are [0-{}].", count - 1)
    } else {
        String::from("Only CRTC 0 exists.")
    }
}
