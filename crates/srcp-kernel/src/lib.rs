pub mod config;
pub mod export;
pub mod kernel;
pub mod snapshot;

pub use config::KernelConfig;
pub use export::{
    ExportVerification, ExportedIdentityRef, ExportedState, KernelExport,
};
pub use kernel::{BootOptions, ExecutionReceipt, IntegrityReport, Kernel, KernelAdapters};
pub use snapshot::{KernelState, KERNEL_VERSION};
