pub use crate::signal::SignalAccess;
pub use crate::smooth::SmoothingKernel;
