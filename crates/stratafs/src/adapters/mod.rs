//! In-tree backend adapters.

mod local;
mod memory;
mod temp;

pub use local::LocalAdapter;
pub use memory::MemoryAdapter;
pub use temp::TempAdapter;
