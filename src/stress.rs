//! # Stress run
//! Threads hammer one [`RwLock`]-protected counter with a random mix of reads and writes.
//! Every critical section checks who else is inside:
//! - a writer must be alone
//! - a reader must not see a writer
//!
//! Afterwards the counter has to match the number of writes exactly, and every thread
//! has to have finished - a lost wake-up shows up as a run that never returns.

use std::{
    panic,
    sync::atomic::{
        AtomicUsize,
        Ordering::{Relaxed, SeqCst},
    },
    thread,
};

use log::{info, warn};
use rand::Rng;

use crate::{error::LockError, rwlock::RwLock};

#[derive(Debug, Clone, PartialEq)]
pub struct StressConfig {
    pub threads: usize,
    /// Lock / unlock pairs per thread.
    pub iterations: usize,
    /// Share of the pairs that write, 0.0..=1.0.
    pub write_ratio: f64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 8,
            iterations: 1000,
            write_ratio: 0.25,
        }
    }
}

impl StressConfig {
    /// `write_ratio` clamped to 0.0..=1.0, NaN and infinities fall back to reads only.
    fn write_ratio_or_reads_only(&self) -> f64 {
        if !self.write_ratio.is_finite() {
            warn!("stress: write ratio {} isn't a number, reading only", self.write_ratio);
            return 0.0;
        }
        self.write_ratio.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StressReport {
    pub reads: usize,
    pub writes: usize,
    /// Final value of the shared counter.
    pub counter: usize,
    /// Critical sections that saw somebody they shouldn't have.
    pub violations: usize,
}

impl StressReport {
    pub fn is_consistent(&self) -> bool {
        self.violations == 0 && self.counter == self.writes
    }
}

#[derive(Default)]
struct Occupancy {
    readers: AtomicUsize,
    writers: AtomicUsize,
    violations: AtomicUsize,
}

impl Occupancy {
    fn write_section(&self, counter: &mut usize) {
        let writers_before = self.writers.fetch_add(1, SeqCst);
        if writers_before != 0 || self.readers.load(SeqCst) != 0 {
            self.violations.fetch_add(1, Relaxed);
        }
        *counter += 1;
        std::hint::spin_loop();
        self.writers.fetch_sub(1, SeqCst);
    }

    fn read_section(&self, counter: &usize) {
        self.readers.fetch_add(1, SeqCst);
        if self.writers.load(SeqCst) != 0 {
            self.violations.fetch_add(1, Relaxed);
        }
        std::hint::black_box(*counter);
        self.readers.fetch_sub(1, SeqCst);
    }
}

pub fn run(config: &StressConfig) -> Result<StressReport, LockError> {
    let lock = RwLock::new(0usize);
    let occupancy = Occupancy::default();
    let write_ratio = config.write_ratio_or_reads_only();

    info!(
        "stress: {} threads x {} iterations, write ratio {write_ratio}",
        config.threads, config.iterations
    );

    let mut report = StressReport::default();
    thread::scope(|s| -> Result<(), LockError> {
        let handles: Vec<_> = (0..config.threads)
            .map(|_| {
                let (lock, occupancy) = (&lock, &occupancy);
                s.spawn(move || -> Result<(usize, usize), LockError> {
                    let mut rng = rand::thread_rng();
                    let (mut reads, mut writes) = (0, 0);
                    for _ in 0..config.iterations {
                        if rng.gen_bool(write_ratio) {
                            let mut g = lock.write()?;
                            occupancy.write_section(&mut g);
                            writes += 1;
                        } else {
                            let g = lock.read()?;
                            occupancy.read_section(&g);
                            reads += 1;
                        }
                    }
                    Ok((reads, writes))
                })
            })
            .collect();

        for handle in handles {
            let (reads, writes) = handle.join().unwrap_or_else(|e| panic::resume_unwind(e))?;
            report.reads += reads;
            report.writes += writes;
        }
        Ok(())
    })?;

    report.counter = lock.into_inner();
    report.violations = occupancy.violations.load(SeqCst);
    info!("stress: {report:?}");
    Ok(report)
}
