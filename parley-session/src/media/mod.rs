mod devices;
mod track;

pub use devices::*;
pub use track::*;
