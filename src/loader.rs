//! Host-side binding that loads the built `cdylib` and calls its exports.

use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use crate::ffi::{status_to_error, FibStatus};
use crate::{FibError, Result};

type CheckedFn = unsafe extern "C" fn(i32, *mut i32) -> i32;
type MaxNFn = unsafe extern "C" fn() -> i32;

const LIB_NAME: &str = "native_fibonacci";

pub struct NativeLibrary {
    library: Library,
    path: PathBuf,
}

impl NativeLibrary {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(FibError::Library(format!(
                "shared library not found: {}",
                path.display()
            )));
        }

        // SAFETY: loading runs the library's initialisers; ours has none.
        let library = unsafe { Library::new(&path) }
            .map_err(|e| FibError::Library(format!("failed to load {}: {e}", path.display())))?;

        let native = Self { library, path };
        // Resolve everything up front so a stale build fails here, not mid-call.
        native.checked_symbol(b"fib_checked\0")?;
        native.checked_symbol(b"fib_long_running_checked\0")?;
        native.max_n_symbol()?;

        log::debug!("Loaded native library {}", native.path.display());
        Ok(native)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fib(&self, n: i32) -> Result<i32> {
        self.call_checked(b"fib_checked\0", n)
    }

    /// Blocks the calling thread for the library's long-running delay.
    pub fn fib_long_running(&self, n: i32) -> Result<i32> {
        self.call_checked(b"fib_long_running_checked\0", n)
    }

    pub fn max_n(&self) -> Result<i32> {
        let max_n = self.max_n_symbol()?;
        // SAFETY: signature matches `ffi::fib_max_n`.
        Ok(unsafe { max_n() })
    }

    fn call_checked(&self, name: &[u8], n: i32) -> Result<i32> {
        let func = self.checked_symbol(name)?;
        let mut out = 0i32;
        // SAFETY: signature matches the `*_checked` exports and `out` is a
        // valid local.
        let code = unsafe { func(n, &mut out) };

        match FibStatus::from_code(code) {
            Some(FibStatus::Ok) => Ok(out),
            Some(status) => Err(status_to_error(status, n)),
            None => Err(FibError::Library(format!("unknown status code {code}"))),
        }
    }

    fn checked_symbol(&self, name: &[u8]) -> Result<Symbol<'_, CheckedFn>> {
        // SAFETY: the symbol type matches the exported signature.
        unsafe { self.library.get::<CheckedFn>(name) }.map_err(|e| {
            FibError::Library(format!(
                "missing symbol {}: {e}",
                String::from_utf8_lossy(name).trim_end_matches('\0')
            ))
        })
    }

    fn max_n_symbol(&self) -> Result<Symbol<'_, MaxNFn>> {
        // SAFETY: the symbol type matches `ffi::fib_max_n`.
        unsafe { self.library.get::<MaxNFn>(b"fib_max_n\0") }
            .map_err(|e| FibError::Library(format!("missing symbol fib_max_n: {e}")))
    }
}

/// Location cargo writes this crate's `cdylib` to, e.g.
/// `target/release/libnative_fibonacci.so`.
pub fn default_library_path(target_dir: impl AsRef<Path>, profile: &str) -> PathBuf {
    let file_name = format!(
        "{}{}{}",
        std::env::consts::DLL_PREFIX,
        LIB_NAME,
        std::env::consts::DLL_SUFFIX
    );
    target_dir.as_ref().join(profile).join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_library_path() {
        let path = default_library_path("target", "release");

        assert!(path.starts_with("target/release"));
        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.contains("native_fibonacci"));
        if cfg!(target_os = "linux") {
            assert_eq!(file_name, "libnative_fibonacci.so");
        } else if cfg!(target_os = "macos") {
            assert_eq!(file_name, "libnative_fibonacci.dylib");
        }
    }

    #[test]
    fn test_open_missing_library() {
        let temp_dir = TempDir::new().unwrap();
        let result = NativeLibrary::open(temp_dir.path().join("libmissing.so"));

        assert!(matches!(result, Err(FibError::Library(_))));
    }

    #[test]
    fn test_open_non_library_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("libbogus.so");
        std::fs::write(&path, b"not a shared object").unwrap();

        assert!(matches!(
            NativeLibrary::open(&path),
            Err(FibError::Library(_))
        ));
    }
}
