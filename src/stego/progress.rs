// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/stegcore

//! Global operation progress tracking.
//!
//! Uses atomics so hosts may poll from another thread while an encode or
//! decode runs. The pipeline advances the counter at stage boundaries and
//! the LSB engines advance it inside their bit loops at roughly 5%
//! granularity.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::error::StegoError;

static STEP: AtomicU32 = AtomicU32::new(0);
static TOTAL: AtomicU32 = AtomicU32::new(0);
static CANCELLED: AtomicBool = AtomicBool::new(false);

/// Number of intra-loop progress slices each LSB pass reports.
pub const LOOP_SLICES: u32 = 20;

/// Reset progress to 0 and set the total step count.
/// Also resets the cancellation flag so a fresh operation starts clean.
pub fn init(total: u32) {
    CANCELLED.store(false, Ordering::Relaxed);
    STEP.store(0, Ordering::Relaxed);
    TOTAL.store(total, Ordering::Relaxed);
}

/// Request cancellation of the current operation.
///
/// The pipeline checks this flag at stage boundaries and inside the LSB
/// loops, and returns `Err(StegoError::Cancelled)` when set. In-flight key
/// derivation, AEAD or deflate calls run to completion; their results are
/// discarded at the next check.
pub fn cancel() {
    CANCELLED.store(true, Ordering::Relaxed);
}

/// Returns `true` if cancellation has been requested.
pub fn is_cancelled() -> bool {
    CANCELLED.load(Ordering::Relaxed)
}

/// Check for cancellation and return an error if requested.
pub fn check_cancelled() -> Result<(), StegoError> {
    if is_cancelled() {
        Err(StegoError::Cancelled)
    } else {
        Ok(())
    }
}

/// Advance progress by one step.
/// Step is capped at total-1 so the bar never hits 100% before `finish()`.
pub fn advance() {
    let total = TOTAL.load(Ordering::Relaxed);
    if total == 0 {
        STEP.fetch_add(1, Ordering::Relaxed);
    } else {
        let _ = STEP.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |s| {
            if s + 1 < total {
                Some(s + 1)
            } else {
                Some(s)
            }
        });
    }
}

/// Read the current (step, total) progress.
pub fn get() -> (u32, u32) {
    (STEP.load(Ordering::Relaxed), TOTAL.load(Ordering::Relaxed))
}

/// Mark progress as complete (step = total).
pub fn finish() {
    let t = TOTAL.load(Ordering::Relaxed);
    STEP.store(t, Ordering::Relaxed);
}

