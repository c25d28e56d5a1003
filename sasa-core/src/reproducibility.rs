//! Reproducibility: seed management for every random stream a run consults.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;

/// A random stream owned by the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RngStream {
    /// General-purpose sampling (shuffles, augmentation choices).
    General,
    /// Numeric-array initialisation.
    Array,
    /// Compute backend, host side.
    Cpu,
    /// Compute backend, one stream per accelerator.
    Device(u32),
}

/// Kernel-selection preferences for the compute backend.
///
/// Both default to `true`. They pull in opposite directions (determinism vs.
/// autotuned kernel choice); consumers decide which one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendFlags {
    pub deterministic: bool,
    pub benchmark: bool,
}

impl Default for BackendFlags {
    fn default() -> Self {
        Self {
            deterministic: true,
            benchmark: true,
        }
    }
}

/// Seed manager for reproducible training.
///
/// Every stream is seeded with the same global seed. Device streams are
/// created on first use and seeded identically, so all accelerators start
/// from the same state.
#[derive(Debug, Clone)]
pub struct SeedManager {
    global_seed: u64,
    backend: BackendFlags,
    streams: HashMap<RngStream, StdRng>,
}

impl SeedManager {
    /// Fix every host-side stream and the backend flags from `seed`.
    pub fn fix(seed: u64) -> Self {
        let mut manager = Self {
            global_seed: seed,
            backend: BackendFlags::default(),
            streams: HashMap::new(),
        };
        manager.reseed(seed);
        manager
    }

    /// Reset every stream, devices included, to `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.global_seed = seed;
        let devices: Vec<RngStream> = self
            .streams
            .keys()
            .copied()
            .filter(|s| matches!(s, RngStream::Device(_)))
            .collect();
        self.streams.clear();
        for stream in [RngStream::General, RngStream::Array, RngStream::Cpu]
            .into_iter()
            .chain(devices)
        {
            self.streams.insert(stream, StdRng::seed_from_u64(seed));
        }
        tracing::debug!(
            seed,
            deterministic = self.backend.deterministic,
            benchmark = self.backend.benchmark,
            "fixed random seeds"
        );
    }

    pub fn seed(&self) -> u64 {
        self.global_seed
    }

    pub fn backend(&self) -> BackendFlags {
        self.backend
    }

    /// Generator for `stream`, seeded on first use for device streams.
    pub fn rng(&mut self, stream: RngStream) -> &mut StdRng {
        let seed = self.global_seed;
        self.streams
            .entry(stream)
            .or_insert_with(|| StdRng::seed_from_u64(seed))
    }

    pub fn general(&mut self) -> &mut StdRng {
        self.rng(RngStream::General)
    }
}
