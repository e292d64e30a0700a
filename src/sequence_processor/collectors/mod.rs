pub mod base;
pub mod quality;
