//! Bottom-up Fibonacci over a rolling pair.
//!
//! Results are `i32` to match the exported C signatures, so the largest
//! supported index is [`MAX_N`]: `F(46) = 1_836_311_903`, while `F(47)`
//! no longer fits.

use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::{FibError, Result};

/// Largest `n` for which `F(n)` fits in an `i32`.
pub const MAX_N: u32 = 46;

/// Fixed delay applied by the long-running entry points.
pub const LONG_RUNNING_DELAY: Duration = Duration::from_millis(5000);

/// Computes `F(n)` for `0 <= n <= MAX_N`.
pub fn compute(n: i32) -> Result<i32> {
    compute_bounded(n, MAX_N)
}

/// Sleeps for [`LONG_RUNNING_DELAY`], then computes `F(n)`.
///
/// The delay is unconditional and happens before the argument is checked,
/// so invalid input still occupies the caller for the full interval.
pub fn compute_blocking(n: i32) -> Result<i32> {
    sleep_long_running();
    compute(n)
}

pub(crate) fn sleep_long_running() {
    info!(
        "Simulating long-running work for {} ms",
        LONG_RUNNING_DELAY.as_millis()
    );
    thread::sleep(LONG_RUNNING_DELAY);
    info!("Long-running delay elapsed");
}

pub(crate) fn compute_bounded(n: i32, max_n: u32) -> Result<i32> {
    if n < 0 {
        warn!("Rejected negative Fibonacci index {n}");
        return Err(FibError::InvalidArgument(n));
    }
    let max_n = max_n.min(MAX_N);
    if n as u32 > max_n {
        warn!("Rejected Fibonacci index {n} above bound {max_n}");
        return Err(FibError::Overflow { n, max: max_n });
    }

    let (mut prev, mut curr) = (0i32, 1i32);
    if n == 0 {
        return Ok(prev);
    }
    for _ in 2..=n {
        let next = prev
            .checked_add(curr)
            .ok_or(FibError::Overflow { n, max: max_n })?;
        prev = curr;
        curr = next;
    }

    debug!("F({n}) = {curr}");
    Ok(curr)
}
