//! Blocking entry point for async work
//!
//! Tool invocations are network calls, but the orchestration layer may call
//! a tool from plain synchronous code or from code already running on a
//! tokio runtime. Blocking on that runtime from inside it panics (or, on a
//! current-thread runtime, deadlocks), so the caller's context is detected
//! first and one of two paths is taken:
//!
//! - no runtime on this thread: build a one-shot current-thread runtime here
//!   and drive the future to completion
//! - inside a runtime: hand the work to a fresh OS thread that owns its own
//!   one-shot runtime, and block only on that thread's completion

use std::any::Any;
use std::future::Future;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::debug;

use crate::error::{Error, Result};

/// Scheduling context of the calling thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerContext {
    /// No runtime is driving this thread
    Plain,
    /// A current-thread runtime is driving this thread
    CurrentThreadRuntime,
    /// A multi-thread runtime worker is driving this thread
    MultiThreadRuntime,
}

impl CallerContext {
    /// Inspect the calling thread
    pub fn detect() -> Self {
        match Handle::try_current() {
            Err(_) => CallerContext::Plain,
            Ok(handle) => match handle.runtime_flavor() {
                RuntimeFlavor::MultiThread => CallerContext::MultiThreadRuntime,
                _ => CallerContext::CurrentThreadRuntime,
            },
        }
    }
}

/// Run an async job to completion from synchronous code
///
/// `make` builds the future on whichever thread ends up running it, so the
/// future itself does not have to be `Send`.
pub fn block_on<F, Fut, T>(make: F) -> Result<T>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>>,
    T: Send + 'static,
{
    match CallerContext::detect() {
        CallerContext::Plain => run_to_completion(make),
        CallerContext::CurrentThreadRuntime => run_on_worker(make),
        // Let the runtime move its other tasks off this worker while we wait.
        CallerContext::MultiThreadRuntime => {
            tokio::task::block_in_place(|| run_on_worker(make))
        }
    }
}

fn run_to_completion<F, Fut, T>(make: F) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create runtime: {}", e)))?;
    runtime.block_on(make())
}

fn run_on_worker<F, Fut, T>(make: F) -> Result<T>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>>,
    T: Send + 'static,
{
    debug!("Caller is inside a runtime; running on a bridge worker thread");
    let worker = std::thread::Builder::new()
        .name("mcp-bridge-worker".to_string())
        .spawn(move || run_to_completion(make))
        .map_err(|e| Error::Internal(format!("Failed to spawn bridge worker: {}", e)))?;

    worker.join().map_err(|panic| {
        Error::Internal(format!("Bridge worker panicked: {}", panic_message(&panic)))
    })?
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_detect_plain() {
        assert_eq!(CallerContext::detect(), CallerContext::Plain);
    }

    #[test]
    fn test_block_on_without_runtime() {
        let value = block_on(|| async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(41 + 1)
        })
        .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_block_on_inside_current_thread_runtime() {
        assert_eq!(CallerContext::detect(), CallerContext::CurrentThreadRuntime);
        let caller = std::thread::current().id();
        let worker = block_on(|| async { Ok(std::thread::current().id()) }).unwrap();
        assert_ne!(caller, worker);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_block_on_inside_multi_thread_runtime() {
        assert_eq!(CallerContext::detect(), CallerContext::MultiThreadRuntime);
        let value = block_on(|| async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok("done".to_string())
        })
        .unwrap();
        assert_eq!(value, "done");
    }

    #[test]
    fn test_errors_pass_through() {
        let err = block_on(|| async { Err::<(), _>(Error::Timeout("call".into())) }).unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[tokio::test]
    #[allow(unreachable_code)]
    async fn test_worker_panic_becomes_error() {
        let err = block_on(|| async {
            panic!("boom");
            Ok(())
        })
        .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
