//! Test utilities for fieldguard integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Result type alias for tests
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Extract Ok value or panic with context
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("assertion failed: expected Ok, got Err({:?})", e),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Extract Some value or panic with context
#[macro_export]
macro_rules! assert_some {
    ($expr:expr) => {
        match $expr {
            Some(v) => v,
            None => panic!("assertion failed: expected Some, got None"),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Some(v) => v,
            None => panic!("{}: got None", $msg),
        }
    };
}

/// Writes `content` to `dir/name` and returns the path
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Rule file modelled on a user-profile form
pub const PROFILE_RULES: &str = r#"{
  "user_id": { "type": "string", "trim": true, "required": false },
  "kind": { "type": "enum", "values": ["position", "home_item"] },
  "index": { "type": "int", "required": false, "max": 5, "min": 0 },
  "email": "email",
  "tags": { "type": "array", "itemType": "string", "required": false }
}"#;

/// Data accepted by [`PROFILE_RULES`]
pub const VALID_PROFILE: &str = r#"{
  "user_id": " u-1 ",
  "kind": "position",
  "index": 3,
  "email": "ann@example.com",
  "tags": ["a", "b"]
}"#;

/// Data with three errors under [`PROFILE_RULES`]
pub const INVALID_PROFILE: &str = r#"{
  "kind": "other",
  "index": 9,
  "tags": ["a", 2]
}"#;
