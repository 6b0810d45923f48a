//! Profiling sessions wrapped around the benchmark loop.
//!
//! Heap profiling uses `dhat`, which only sees allocations if the binary
//! installs [`dhat::Alloc`] as its global allocator (see `main.rs`). CPU
//! profiling uses `pprof` and is only built with the `cpu-profile` feature.

use std::path::{Path, PathBuf};

pub const HEAP_ARTIFACT: &str = "dhat-heap.json";
pub const CPU_ARTIFACT: &str = "flamegraph.svg";

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileMode {
    Mem,
    Cpu,
    Off,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("{0:?} profiling is not compiled into this build")]
    Unsupported(ProfileMode),
    #[error("could not write profile: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "cpu-profile")]
    #[error("cpu profiler failed: {0}")]
    Pprof(#[from] pprof::Error),
}

enum Inner {
    Off,
    Heap(dhat::Profiler),
    #[cfg(feature = "cpu-profile")]
    Cpu(pprof::ProfilerGuard<'static>),
}

/// A running profiler. The artifact is written by [`ProfileSession::finish`],
/// or on drop if the session was never finished.
pub struct ProfileSession {
    inner: Inner,
    artifact: Option<PathBuf>,
}

impl ProfileSession {
    pub fn start(mode: ProfileMode, dir: &Path) -> Result<Self, ProfileError> {
        let (inner, artifact) = match mode {
            ProfileMode::Off => (Inner::Off, None),
            ProfileMode::Mem => {
                let path = dir.join(HEAP_ARTIFACT);
                let profiler =
                    dhat::Profiler::builder().file_name(&path).build();
                (Inner::Heap(profiler), Some(path))
            }
            #[cfg(feature = "cpu-profile")]
            ProfileMode::Cpu => {
                let guard = pprof::ProfilerGuardBuilder::default()
                    .frequency(1000)
                    .blocklist(&["libc", "libgcc", "pthread", "vdso"])
                    .build()?;
                (Inner::Cpu(guard), Some(dir.join(CPU_ARTIFACT)))
            }
            #[cfg(not(feature = "cpu-profile"))]
            ProfileMode::Cpu => {
                return Err(ProfileError::Unsupported(ProfileMode::Cpu));
            }
        };

        tracing::debug!("started {mode:?} profiling session");

        Ok(Self { inner, artifact })
    }

    /// Stops profiling and writes the artifact, returning where it went.
    pub fn finish(mut self) -> Result<Option<PathBuf>, ProfileError> {
        self.flush()?;
        Ok(self.artifact.take())
    }

    fn flush(&mut self) -> Result<(), ProfileError> {
        match std::mem::replace(&mut self.inner, Inner::Off) {
            Inner::Off => {}
            // dhat writes its file when the profiler is dropped
            Inner::Heap(profiler) => drop(profiler),
            #[cfg(feature = "cpu-profile")]
            Inner::Cpu(guard) => {
                let report = guard.report().build()?;
                if let Some(path) = &self.artifact {
                    let file = std::fs::File::create(path)?;
                    report.flamegraph(file)?;
                }
            }
        }
        Ok(())
    }
}

impl Drop for ProfileSession {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::error!("failed to flush profile: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let session = ProfileSession::start(ProfileMode::Off, dir.path())
            .unwrap();
        assert_eq!(session.finish().unwrap(), None);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[cfg(not(feature = "cpu-profile"))]
    #[test]
    fn cpu_needs_the_feature() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ProfileSession::start(ProfileMode::Cpu, dir.path()),
            Err(ProfileError::Unsupported(ProfileMode::Cpu))
        ));
    }
}
