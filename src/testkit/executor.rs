//! Stub executors.
//!
//! `StubFactory` reads its instructions from the descriptor's extra fields:
//!
//! - `"fail_build": true` - construction fails with `ActivationError::Construction`
//! - `"fail_run": "<message>"` - every run fails with `ExecutionError::Failed`
//! - `"sleep_ms": <n>` - every run sleeps before answering
//!
//! A successful run echoes its input.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::record::{SourceDescriptor, SourceKind};
use crate::error::{ActivationError, ExecutionError};
use crate::port::outbound::executor::{Executor, ExecutorFactory, SharedExecutor};

/// Descriptor the stub factory builds an echoing executor from.
pub fn echo_source() -> SourceDescriptor {
    SourceDescriptor::inline(json!({"stub": "echo"}))
}

/// Descriptor whose construction always fails.
pub fn broken_source() -> SourceDescriptor {
    let mut source = echo_source();
    source.extra.insert("fail_build".to_string(), json!(true));
    source
}

/// Descriptor whose executor fails every run with `message`.
pub fn failing_run_source(message: &str) -> SourceDescriptor {
    let mut source = echo_source();
    source.extra.insert("fail_run".to_string(), json!(message));
    source
}

/// Descriptor whose executor sleeps `ms` before echoing.
pub fn slow_source(ms: u64) -> SourceDescriptor {
    let mut source = echo_source();
    source.extra.insert("sleep_ms".to_string(), json!(ms));
    source
}

#[derive(Debug)]
pub struct StubExecutor {
    fail_run: Option<String>,
    sleep: Option<Duration>,
    runs: AtomicUsize,
}

impl StubExecutor {
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Executor for StubExecutor {
    fn kind(&self) -> SourceKind {
        SourceKind::Inline
    }

    async fn run(&self, input: Value) -> Result<Value, ExecutionError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if let Some(sleep) = self.sleep {
            tokio::time::sleep(sleep).await;
        }
        match &self.fail_run {
            Some(message) => Err(ExecutionError::Failed(message.clone())),
            None => Ok(input),
        }
    }
}

/// Factory producing [`StubExecutor`]s and counting builds.
#[derive(Debug, Default)]
pub struct StubFactory {
    builds: AtomicUsize,
    fail_all: AtomicBool,
    build_delay: Option<Duration>,
}

impl StubFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every build waits `delay` first, to widen race windows in tests.
    pub fn with_build_delay(delay: Duration) -> Self {
        Self {
            build_delay: Some(delay),
            ..Self::default()
        }
    }

    /// Make every subsequent build fail (or succeed again).
    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Number of successful builds.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutorFactory for StubFactory {
    async fn build(&self, source: &SourceDescriptor) -> Result<SharedExecutor, ActivationError> {
        if let Some(delay) = self.build_delay {
            tokio::time::sleep(delay).await;
        }

        let fail_build = source
            .extra
            .get("fail_build")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if fail_build || self.fail_all.load(Ordering::SeqCst) {
            return Err(ActivationError::Construction("stub build failure".to_string()));
        }

        let executor = StubExecutor {
            fail_run: source
                .extra
                .get("fail_run")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned),
            sleep: source
                .extra
                .get("sleep_ms")
                .and_then(Value::as_u64)
                .map(Duration::from_millis),
            runs: AtomicUsize::new(0),
        };
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(executor))
    }
}
