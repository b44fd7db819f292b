// Data models and formatting helpers shared between the engine core and
// presentation layers.

pub mod models;
pub mod utils;
