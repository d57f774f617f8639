//! HTTP/2 support: a sans-io stream engine and the `h2` connection driver.

pub mod conn;
pub mod engine;

pub use conn::serve_h2;
pub use engine::{FrameSink, StreamEngine, StreamHeaders};
