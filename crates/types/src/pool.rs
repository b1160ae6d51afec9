//! Worker pool sizing

use serde::{Deserialize, Serialize};

/// Worker pool configuration, derived once per run
///
/// Sequential runs always use a single worker. Parallel runs use one
/// worker per available CPU plus one, never fewer than one in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    worker_count: usize,
    parallel: bool,
}

impl PoolConfig {
    /// Single worker, jobs processed in submission order
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            worker_count: 1,
            parallel: false,
        }
    }

    /// Size the pool from the CPU count reported by the platform
    #[must_use]
    pub fn detect(parallel: bool) -> Self {
        Self::for_cpus(parallel, num_cpus::get())
    }

    /// Size the pool for an explicit CPU count
    #[must_use]
    pub fn for_cpus(parallel: bool, cpus: usize) -> Self {
        if parallel {
            Self {
                worker_count: cpus.saturating_add(1).max(1),
                parallel: true,
            }
        } else {
            Self::sequential()
        }
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    #[must_use]
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::sequential()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sequential_uses_one_worker() {
        let config = PoolConfig::for_cpus(false, 16);
        assert_eq!(config.worker_count(), 1);
        assert!(!config.is_parallel());
        assert_eq!(PoolConfig::default(), PoolConfig::sequential());
    }

    #[test]
    fn test_parallel_uses_cpus_plus_one() {
        let config = PoolConfig::for_cpus(true, 3);
        assert_eq!(config.worker_count(), 4);
        assert!(config.is_parallel());
    }

    #[test]
    fn test_zero_cpus_floors_to_one() {
        assert_eq!(PoolConfig::for_cpus(true, 0).worker_count(), 1);
    }

    #[test]
    fn test_detect_is_at_least_two_when_parallel() {
        // num_cpus never reports fewer than one CPU
        assert!(PoolConfig::detect(true).worker_count() >= 2);
        assert_eq!(PoolConfig::detect(false).worker_count(), 1);
    }

    proptest! {
        #[test]
        fn prop_worker_count_is_positive(parallel in any::<bool>(), cpus in 0usize..4096) {
            let config = PoolConfig::for_cpus(parallel, cpus);
            prop_assert!(config.worker_count() >= 1);
            if parallel {
                prop_assert_eq!(config.worker_count(), (cpus + 1).max(1));
            } else {
                prop_assert_eq!(config.worker_count(), 1);
            }
        }
    }
}
