//! Domain types for bell filter design

mod audio;
mod design;
mod params;

pub use audio::{AudioBuffer, SampleRate};
pub use design::{FilterDesign, WindowKind};
pub use params::{FilterParameters, ParameterId};
