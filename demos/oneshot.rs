//! Example: Dim every CRTC for a few seconds, then restore the original gamma.
//!
//! Run with: `cargo run --example oneshot -- crtc=0 preserve=1 0.7`
//!
//! Arguments of the form `key=value` are passed to the gamma options; a bare
//! number sets the brightness.

use gammarr::{ColorSetting, GammaError, GammaOptions, GammaState, RandrBackend, print_help};
use std::time::Duration;

fn scale_brightness(r: &mut [u16], g: &mut [u16], b: &mut [u16], setting: &ColorSetting) {
    for ch in [r, g, b] {
        for v in ch.iter_mut() {
            *v = (*v as f32 * setting.brightness).clamp(0.0, u16::MAX as f32) as u16;
        }
    }
}

fn main() -> Result<(), GammaError> {
    // Initialize logging (optional)
    env_logger::init();

    let mut options = GammaOptions::default();
    let mut setting = ColorSetting {
        brightness: 0.7,
        ..Default::default()
    };
    for arg in std::env::args().skip(1) {
        if arg == "help" {
            if let Err(e) = print_help(&mut std::io::stdout()) {
                eprintln!("Error printing help: {}", e);
            }
            return Ok(());
        }
        match arg.split_once('=') {
            Some((key, value)) => options.set_option(key, value)?,
            None => match arg.parse() {
                Ok(brightness) => setting.brightness = brightness,
                Err(_) => eprintln!("Ignoring argument: {}", arg),
            },
        }
    }

    // Capture the current ramps of all CRTCs
    let backend = RandrBackend::connect(None)?;
    let state = GammaState::start(backend, options, Box::new(scale_brightness))?;
    println!("Found {} CRTC(s)", state.crtcs().len());

    let result = state.apply(&setting);
    match &result {
        Ok(()) => {
            println!("Brightness set to {:.2}", setting.brightness);
            std::thread::sleep(Duration::from_secs(5));
        }
        Err(e) => eprintln!("Error applying gamma: {}", e),
    }

    // Put the original ramps back, even after a partial apply
    for failure in state.restore() {
        eprintln!("CRTC {} not restored: {}", failure.index, failure.error);
    }
    state.release();

    result
}
