use std::sync::atomic::{AtomicU64, Ordering};

/// Shared countdown of remaining request permits.
#[derive(Debug)]
pub(super) struct PermitPool {
    remaining: AtomicU64,
}

impl PermitPool {
    pub(super) const fn new(total: u64) -> Self {
        Self {
            remaining: AtomicU64::new(total),
        }
    }

    /// Takes one permit. Returns `false` once the pool is exhausted; never
    /// goes below zero, so exactly `total` calls succeed across all callers.
    pub(super) fn try_acquire(&self) -> bool {
        loop {
            let current = self.remaining.load(Ordering::Relaxed);
            let Some(next) = current.checked_sub(1) else {
                return false;
            };
            if self
                .remaining
                .compare_exchange(current, next, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                return true;
            }
        }
    }

    pub(super) fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn grants_exactly_total_permits() -> Result<(), String> {
        let pool = PermitPool::new(3);
        let granted = (0..10).filter(|_| pool.try_acquire()).count();
        if granted != 3 {
            return Err(format!("Expected 3 permits, got {}", granted));
        }
        if pool.remaining() != 0 {
            return Err(format!("Expected empty pool, got {}", pool.remaining()));
        }
        Ok(())
    }

    #[test]
    fn empty_pool_grants_nothing() -> Result<(), String> {
        let pool = PermitPool::new(0);
        if pool.try_acquire() {
            return Err("Empty pool granted a permit".to_owned());
        }
        Ok(())
    }

    #[test]
    fn concurrent_acquire_never_overgrants() -> Result<(), String> {
        let pool = Arc::new(PermitPool::new(10_000));
        let granted = Arc::new(AtomicU64::new(0));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let pool = Arc::clone(&pool);
            let granted = Arc::clone(&granted);
            handles.push(std::thread::spawn(move || {
                while pool.try_acquire() {
                    granted.fetch_add(1, Ordering::Relaxed);
                }
            }));
        }
        for handle in handles {
            handle
                .join()
                .map_err(|_err| "acquire thread panicked".to_owned())?;
        }
        let total = granted.load(Ordering::Relaxed);
        if total != 10_000 {
            return Err(format!("Expected 10000 permits, got {}", total));
        }
        Ok(())
    }
}
