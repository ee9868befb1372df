// Adapters layer: page scraping, overlay persistence and message handling.

pub mod html;
pub mod messaging;
pub mod overlay;
