//! Shared plumbing for attune: root discovery, JSONL files and timestamps

mod io;
mod paths;
pub mod timestamp;

pub use io::{append_jsonl, atomic_write, read_jsonl, read_lines, rewrite_lines};
pub use paths::{Paths, ROOT_ENV};
