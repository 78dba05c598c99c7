pub mod clock;
pub mod logger;
pub mod nonce;
pub mod substrate;

pub use clock::{Clock, FixedClock, TestClock};
pub use logger::{LogLevel, LogLine, Logger, TracingLogger, VecLogger};
pub use nonce::{ConstantNonce, FixedNonce, NonceSource, TestNonce};
pub use substrate::{guarded_random_bytes, guarded_wall_clock_millis, SubstrateGuard};
