mod mailbox;
mod memory;
mod store;

pub use mailbox::*;
pub use memory::*;
pub use store::*;
