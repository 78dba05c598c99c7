//! The substrate lock: the one discipline that keeps non-determinism out
//! of the kernel's core.
//!
//! Core code (kernel, event fabric) never reads the host's wall clock or
//! RNG directly — it only ever goes through an injected [`crate::Clock`]
//! / [`crate::NonceSource`], or, for the rare host-bridge call site that
//! genuinely needs ambient time or randomness (e.g. a `Clock` or
//! `NonceSource` *implementation* itself), through [`guarded_wall_clock`]
//! / [`guarded_random_bytes`]. When a kernel is booted with
//! `lock_date`/`lock_math` engaged, those two functions fail with
//! `SubstrateViolation` instead of touching the host.

use srcp_core::SrcpError;
use std::cell::Cell;

thread_local! {
    static LOCK_DATE: Cell<bool> = Cell::new(false);
    static LOCK_MATH: Cell<bool> = Cell::new(false);
}

/// Engages the substrate lock for the lifetime of the guard, on the
/// calling thread. Restores the prior flag values on drop, so nested or
/// sequential kernels on the same thread compose safely.
pub struct SubstrateGuard {
    prev_date: bool,
    prev_math: bool,
}

impl SubstrateGuard {
    pub fn engage(lock_date: bool, lock_math: bool) -> Self {
        let prev_date = LOCK_DATE.with(|c| c.replace(lock_date));
        let prev_math = LOCK_MATH.with(|c| c.replace(lock_math));
        Self {
            prev_date,
            prev_math,
        }
    }
}

impl Drop for SubstrateGuard {
    fn drop(&mut self) {
        LOCK_DATE.with(|c| c.set(self.prev_date));
        LOCK_MATH.with(|c| c.set(self.prev_math));
    }
}

fn date_locked() -> bool {
    LOCK_DATE.with(|c| c.get())
}

fn math_locked() -> bool {
    LOCK_MATH.with(|c| c.get())
}

/// Bridge to the host wall clock. Fails under an engaged `lock_date`
/// substrate lock instead of reading `SystemTime::now()`.
pub fn guarded_wall_clock_millis() -> Result<i64, SrcpError> {
    if date_locked() {
        return Err(SrcpError::SubstrateViolation(
            "ambient wall-clock access attempted while lock_date is engaged".to_string(),
        ));
    }
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock is after the Unix epoch");
    Ok(now.as_millis() as i64)
}

/// Bridge to the host RNG. Fails under an engaged `lock_math` substrate
/// lock instead of reading from `OsRng`/`rand::random`.
pub fn guarded_random_bytes(len: usize) -> Result<Vec<u8>, SrcpError> {
    if math_locked() {
        return Err(SrcpError::SubstrateViolation(
            "ambient RNG access attempted while lock_math is engaged".to_string(),
        ));
    }
    use rand::RngCore;
    let mut buf = vec![0u8; len];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engaged_lock_rejects_wall_clock() {
        let _guard = SubstrateGuard::engage(true, false);
        assert!(matches!(
            guarded_wall_clock_millis(),
            Err(SrcpError::SubstrateViolation(_))
        ));
    }

    #[test]
    fn engaged_lock_rejects_random() {
        let _guard = SubstrateGuard::engage(false, true);
        assert!(matches!(
            guarded_random_bytes(8),
            Err(SrcpError::SubstrateViolation(_))
        ));
    }

    #[test]
    fn unlocked_substrate_permits_both() {
        let _guard = SubstrateGuard::engage(false, false);
        assert!(guarded_wall_clock_millis().is_ok());
        assert!(guarded_random_bytes(8).is_ok());
    }

    #[test]
    fn guard_restores_previous_flags_on_drop() {
        {
            let _outer = SubstrateGuard::engage(true, true);
            {
                let _inner = SubstrateGuard::engage(false, false);
                assert!(guarded_wall_clock_millis().is_ok());
            }
            // inner dropped: outer's lock_date=true must be restored
            assert!(matches!(
                guarded_wall_clock_millis(),
                Err(SrcpError::SubstrateViolation(_))
            ));
        }
        assert!(guarded_wall_clock_millis().is_ok());
    }
}
