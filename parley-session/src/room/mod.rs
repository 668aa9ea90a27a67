mod lifecycle;

pub use lifecycle::*;
