use std::{
    collections::TryReserveError,
    sync::{
        atomic::{AtomicUsize, Ordering::SeqCst},
        Arc, Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use queued_rwlock::{
    stress::{self, StressConfig},
    LockError, Mode, RawRwLock, RwLock,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn wait_for_queue(lock: &RawRwLock, len: usize) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while lock.snapshot().queued.len() != len {
        assert!(Instant::now() < deadline, "queue never reached {len}");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn readers_and_writers_take_turns_in_arrival_order() {
    init_logs();
    let lock = RwLock::new(Vec::new());
    let plan = [Mode::Read, Mode::Write, Mode::Read, Mode::Read, Mode::Write];

    thread::scope(|s| {
        let w = lock.write().unwrap();
        for (i, mode) in plan.into_iter().enumerate() {
            let lock = &lock;
            s.spawn(move || match mode {
                Mode::Read => {
                    // exactly the writers queued before this reader have been in
                    let expected: Vec<usize> = plan[..i]
                        .iter()
                        .enumerate()
                        .filter(|(_, m)| **m == Mode::Write)
                        .map(|(j, _)| j)
                        .collect();
                    assert_eq!(*lock.read().unwrap(), expected);
                }
                Mode::Write => lock.write().unwrap().push(i),
            });
            wait_for_queue(lock.raw(), i + 1);
        }
        assert_eq!(lock.snapshot().queued, plan);
        drop(w);
    });

    assert_eq!(lock.into_inner(), [1, 4]);
}

#[test]
fn arc_shared_lock_across_spawned_threads() {
    init_logs();
    let lock = Arc::new(RwLock::new(0u64));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                for _ in 0..500 {
                    *lock.write().unwrap() += 1;
                    let _ = *lock.read().unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(*lock.read().unwrap(), 2000);
    assert!(lock.snapshot().is_idle());
}

#[test]
fn readers_never_overlap_a_writer() {
    init_logs();
    let lock = RawRwLock::new();
    let readers = AtomicUsize::new(0);
    let writers = AtomicUsize::new(0);

    thread::scope(|s| {
        for t in 0..6 {
            let (lock, readers, writers) = (&lock, &readers, &writers);
            s.spawn(move || {
                for i in 0..500 {
                    if (t + i) % 3 == 0 {
                        lock.acquire_write().unwrap();
                        assert_eq!(writers.fetch_add(1, SeqCst), 0);
                        assert_eq!(readers.load(SeqCst), 0);
                        writers.fetch_sub(1, SeqCst);
                        lock.release_write();
                    } else {
                        lock.acquire_read().unwrap();
                        readers.fetch_add(1, SeqCst);
                        assert_eq!(writers.load(SeqCst), 0);
                        readers.fetch_sub(1, SeqCst);
                        lock.release_read();
                    }
                }
            });
        }
    });
    assert!(lock.snapshot().is_idle());
}

#[test]
fn stress_counter_matches_writes() {
    init_logs();
    let report = stress::run(&StressConfig {
        threads: 12,
        iterations: 1500,
        write_ratio: 0.5,
    })
    .unwrap();
    assert!(report.is_consistent(), "{report:?}");
    assert_eq!(report.reads + report.writes, 12 * 1500);
}

#[test]
fn repeated_reads_leave_the_lock_idle() {
    let lock = RawRwLock::new();
    for _ in 0..100 {
        lock.acquire_read().unwrap();
        lock.release_read();
        assert_eq!(lock.snapshot().active_readers, 0);
    }
    assert!(lock.snapshot().is_idle());
}

#[test]
fn lock_error_names_the_queue() {
    let reserve_err: TryReserveError = Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err();
    let err = LockError::from(reserve_err);
    assert!(err.to_string().contains("wait queue"), "{err}");
    assert!(matches!(err, LockError::WaitQueueFull(_)));
}

#[test]
fn guard_drop_on_another_thread_releases() {
    let lock = RwLock::new(1);
    let seen = Mutex::new(None);
    thread::scope(|s| {
        let g = lock.read().unwrap();
        s.spawn(|| {
            *seen.lock().unwrap() = Some(*g);
            drop(g);
        });
    });
    assert_eq!(seen.into_inner().unwrap(), Some(1));
    assert!(lock.snapshot().is_idle());
}
