pub mod canonical;
pub mod error;
pub mod types;

pub use canonical::CanonicalValue;
pub use error::{SrcpError, SrcpResult};
pub use types::{Did, HexHash, Nonce, Timestamp};
