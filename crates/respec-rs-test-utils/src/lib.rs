//! Test helpers shared across respec-rs crates.

pub mod files;
pub mod fixtures;

pub use files::write_source;
pub use fixtures::{
    MINIMAL, VARIANT1_XREF, VARIANT3_XREF, WEBRTC_EXTENSIONS_SCRIPT, WEBRTC_EXTENSIONS_V2,
    WEBRTC_EXTENSIONS_V3_OVERRIDE,
};
