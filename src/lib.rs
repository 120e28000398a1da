//! Core library for the `volley` CLI.
//!
//! `volley` sends a fixed budget of HTTP requests through a fixed pool of
//! concurrent workers and folds every outcome into one aggregate: counts,
//! latency, and a status-code histogram. The [`dispatch::Dispatcher`] is the
//! entry point; [`http::Transport`] is the seam for issuing requests, with
//! [`http::ReqwestTransport`] as the production implementation. The binary
//! adds argument and config-file handling, signal-driven cancellation, a
//! progress line, and report rendering on top.
pub mod args;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod report;
pub mod shutdown;
