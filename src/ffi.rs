//! C ABI exported by the `cdylib`.
//!
//! `fib` and `fib_long_running` keep the plain `int -> int` shape. Because
//! every valid result is non-negative, failures come back as a negative
//! [`FibStatus`] code in place of the value. The `*_checked` variants return
//! the status and write the value through an out-pointer.
//!
//! `fib` is short-lived and fine to call from a host's main thread.
//! `fib_long_running` blocks the calling thread for five seconds and must be
//! called from a separate thread or isolate.

use crate::fibonacci::{self, MAX_N};
use crate::{FibError, Result};

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FibStatus {
    Ok = 0,
    InvalidArgument = -1,
    Overflow = -2,
    NullPointer = -3,
    Internal = -4,
}

impl FibStatus {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(FibStatus::Ok),
            -1 => Some(FibStatus::InvalidArgument),
            -2 => Some(FibStatus::Overflow),
            -3 => Some(FibStatus::NullPointer),
            -4 => Some(FibStatus::Internal),
            _ => None,
        }
    }
}

fn value_or_status(result: Result<i32>) -> i32 {
    match result {
        Ok(value) => value,
        Err(e) => e.status().code(),
    }
}

/// # Safety
///
/// `out` must be null or valid for a write of one `i32`.
unsafe fn write_checked(result: Result<i32>, out: *mut i32) -> i32 {
    match result {
        Ok(value) => {
            *out = value;
            FibStatus::Ok.code()
        }
        Err(e) => e.status().code(),
    }
}

#[no_mangle]
pub extern "C" fn fib(n: i32) -> i32 {
    value_or_status(fibonacci::compute(n))
}

#[no_mangle]
pub extern "C" fn fib_long_running(n: i32) -> i32 {
    value_or_status(fibonacci::compute_blocking(n))
}

/// # Safety
///
/// `out` must be null or point to writable memory for one `i32`.
#[no_mangle]
pub unsafe extern "C" fn fib_checked(n: i32, out: *mut i32) -> i32 {
    if out.is_null() {
        return FibStatus::NullPointer.code();
    }
    write_checked(fibonacci::compute(n), out)
}

/// # Safety
///
/// `out` must be null or point to writable memory for one `i32`.
#[no_mangle]
pub unsafe extern "C" fn fib_long_running_checked(n: i32, out: *mut i32) -> i32 {
    // Null check precedes the delay.
    if out.is_null() {
        return FibStatus::NullPointer.code();
    }
    write_checked(fibonacci::compute_blocking(n), out)
}

#[no_mangle]
pub extern "C" fn fib_max_n() -> i32 {
    MAX_N as i32
}

/// Maps a non-`Ok` status back onto the error it stands for.
pub(crate) fn status_to_error(status: FibStatus, n: i32) -> FibError {
    match status {
        FibStatus::InvalidArgument => FibError::InvalidArgument(n),
        FibStatus::Overflow => FibError::Overflow { n, max: MAX_N },
        FibStatus::NullPointer => FibError::Library("null output pointer".to_string()),
        FibStatus::Ok | FibStatus::Internal => {
            FibError::Library(format!("unexpected status {:?} for n = {n}", status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;
    use std::time::Instant;

    #[test]
    fn test_fib_returns_value() {
        assert_eq!(fib(0), 0);
        assert_eq!(fib(1), 1);
        assert_eq!(fib(10), 55);
        assert_eq!(fib(20), 6765);
    }

    #[test]
    fn test_fib_returns_status_on_error() {
        assert_eq!(fib(-1), FibStatus::InvalidArgument.code());
        assert_eq!(fib(47), FibStatus::Overflow.code());
    }

    #[test]
    fn test_fib_checked_writes_output() {
        let mut out = -100;
        let status = unsafe { fib_checked(5, &mut out) };

        assert_eq!(status, FibStatus::Ok.code());
        assert_eq!(out, 5);
    }

    #[test]
    fn test_fib_checked_leaves_output_on_error() {
        let mut out = -100;
        let status = unsafe { fib_checked(-7, &mut out) };

        assert_eq!(status, FibStatus::InvalidArgument.code());
        assert_eq!(out, -100);
    }

    #[test]
    fn test_null_output_pointer() {
        assert_eq!(
            unsafe { fib_checked(3, ptr::null_mut()) },
            FibStatus::NullPointer.code()
        );

        let start = Instant::now();
        assert_eq!(
            unsafe { fib_long_running_checked(3, ptr::null_mut()) },
            FibStatus::NullPointer.code()
        );
        assert!(start.elapsed() < fibonacci::LONG_RUNNING_DELAY);
    }

    #[test]
    fn test_max_n_export() {
        assert_eq!(fib_max_n(), 46);
        assert!(fib(fib_max_n()) > 0);
    }

    #[test]
    fn test_status_codes_round_trip() {
        for status in [
            FibStatus::Ok,
            FibStatus::InvalidArgument,
            FibStatus::Overflow,
            FibStatus::NullPointer,
            FibStatus::Internal,
        ] {
            assert_eq!(FibStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(FibStatus::from_code(42), None);
    }

    #[test]
    fn test_fib_long_running_export() {
        let start = Instant::now();
        assert_eq!(fib_long_running(10), 55);
        assert!(start.elapsed() >= fibonacci::LONG_RUNNING_DELAY);
    }
}
