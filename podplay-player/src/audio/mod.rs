//! Audio resource implementations
//!
//! - [`probe`]: source validation and duration detection (symphonia, reqwest)
//! - [`headless`]: device-less resource driven by a playback clock

pub mod headless;
pub mod probe;

pub use headless::HeadlessResource;
pub use probe::{probe_file, probe_source, SourceLocation, SUPPORTED_EXTENSIONS};
