/// Plain boot-time configuration, passed by value — no environment
/// variables or files are read by this crate (spec excludes both from
/// the core).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KernelConfig {
    /// When engaged, any attempt by core code to read the host's ambient
    /// wall clock fails with `SubstrateViolation` instead of succeeding.
    pub lock_date: bool,
    /// Same, for the host's ambient RNG.
    pub lock_math: bool,
}
