//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use log_correlation_demo::config::ServiceConfig;
use log_correlation_demo::LoggingContext;
use tower::ServiceExt;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

/// In-memory log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_owned)
            .collect()
    }

    /// Lines emitted at `level` by the application logger.
    pub fn app_lines(&self, level: &str) -> Vec<String> {
        let needle = format!(" {level} demo-app ");
        self.lines()
            .into_iter()
            .filter(|line| line.contains(&needle))
            .collect()
    }
}

pub struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter(self.0.clone())
    }
}

/// Config with correlation switched on or off.
pub fn config(logs_injection: bool) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.logging.logs_injection = logs_injection;
    config
}

/// Install a thread-local subscriber writing into a fresh [`CapturedLogs`].
///
/// Keep the guard alive for as long as logs should be captured.
pub fn capture(config: &ServiceConfig) -> (LoggingContext, CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let logging = LoggingContext::from_config(&config.logging);
    let subscriber = logging.subscriber(logs.clone()).unwrap();
    let guard = tracing::subscriber::set_default(subscriber);
    (logging, logs, guard)
}

/// Drive one request through `router` and return status, headers and body text.
pub async fn send(router: Router, request: Request<Body>) -> (Response<()>, String) {
    let response = router.oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    (
        Response::from_parts(parts, ()),
        String::from_utf8(bytes.to_vec()).unwrap(),
    )
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
