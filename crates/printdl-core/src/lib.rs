//! Core engine for `printdl`: extract a model listing's file list from its
//! web page, resolve each file to a signed download URL, and stream the
//! files to disk, one at a time.

pub mod cancel;
pub mod client;
pub mod config;
pub mod logging;

pub mod extract;
pub mod fetch;
pub mod model;
pub mod orchestrate;
pub mod resolve;
pub mod retry;
pub mod sanitize;
