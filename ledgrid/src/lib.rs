pub mod error;
pub mod geometry;
pub mod grid;
pub mod pack;
pub mod text;
pub mod sink;
pub mod frame;
#[cfg(feature = "serde")]
pub mod config;
