/*
 * Small scripted scenarios that print what the lock looks like at each step.
 * Threads are lined up one by one, so the queue layout is always the same.
 */

use std::{thread, time::Duration};

use crate::{
    error::LockError,
    rwlock::{RawRwLock, RwLock},
    waiter::Mode,
};

fn wait_for_queue(lock: &RawRwLock, len: usize) {
    while lock.snapshot().queued.len() < len {
        thread::sleep(Duration::from_millis(1));
    }
}

fn show(step: &str, lock: &RawRwLock) {
    let snap = lock.snapshot();
    println!(
        "{step:<32} readers: {}, writer: {}, queued: {:?}",
        snap.active_readers, snap.writer_active, snap.queued
    );
}

/// A lone reader never queues.
pub fn fast_path() -> Result<(), LockError> {
    let lock = RwLock::new(String::from("hello"));
    for _ in 0..3 {
        let g = lock.read()?;
        show(&format!("read {:?}", *g), lock.raw());
    }
    show("all released", lock.raw());
    Ok(())
}

/// The last reader out hands the lock to the writer waiting behind it.
pub fn hand_off() -> Result<(), LockError> {
    let lock = RwLock::new(0u32);
    thread::scope(|s| -> Result<(), LockError> {
        let r = lock.read()?;
        let writer = s.spawn(|| -> Result<(), LockError> {
            *lock.write()? += 1;
            println!("writer done");
            Ok(())
        });
        wait_for_queue(lock.raw(), 1);
        show("reader holds, writer queued", lock.raw());
        drop(r);
        writer.join().unwrap_or_else(|e| std::panic::resume_unwind(e))
    })?;
    show("writer released", lock.raw());
    println!("value: {}", lock.into_inner());
    Ok(())
}

/// Queue `[R, R, W, R]` behind a writer: its release lets both leading readers in at once.
pub fn batching() -> Result<(), LockError> {
    let lock = RwLock::new(Vec::new());
    let plan = [Mode::Read, Mode::Read, Mode::Write, Mode::Read];

    thread::scope(|s| -> Result<(), LockError> {
        let w = lock.write()?;
        let handles: Vec<_> = plan
            .iter()
            .copied()
            .enumerate()
            .map(|(i, mode)| {
                let lock = &lock;
                let handle = s.spawn(move || -> Result<(), LockError> {
                    match mode {
                        Mode::Read => println!("{mode} #{i} sees {:?}", *lock.read()?),
                        Mode::Write => lock.write()?.push(i),
                    }
                    Ok(())
                });
                wait_for_queue(lock.raw(), i + 1);
                handle
            })
            .collect();

        show("writer holds, four queued", lock.raw());
        drop(w);
        show("after the write release", lock.raw());

        for handle in handles {
            handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e))?;
        }
        Ok(())
    })?;
    show("everybody done", lock.raw());
    Ok(())
}
