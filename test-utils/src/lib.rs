//! `test-utils` is used for testing in both `throttle-lib` and `throttle-bin`.
//! This crate does not depend on `throttle-lib` or `throttle-bin`, else we would get dependency cycles.
//! Macros are used instead, so that the importer is responsible for providing the dependencies.

pub mod dir_builder;

/// Build a `WorkerRecord` from a status and a raw request line
///
/// # Panic
///
/// This panics on an unknown status name, so it should only be used for
/// testing
#[macro_export]
macro_rules! worker {
    ($status:expr, $request:expr $(,)?) => {{
        use std::str::FromStr;
        WorkerRecord::from_request_line(
            WorkerStatus::from_str($status).expect("Expected valid worker status"),
            $request,
        )
    }};
}

/// Get the path to the `fixtures` directory.
#[macro_export]
macro_rules! fixtures_path {
    () => {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .unwrap()
            .join("fixtures")
    };
}

/// Loads a fixture from the `fixtures` directory
#[macro_export]
macro_rules! load_fixture {
    ($filename:expr) => {{
        let path = $crate::fixtures_path!().join($filename);
        std::fs::read_to_string(path).unwrap()
    }};
}

#[macro_export]
macro_rules! load_readme_text {
    () => {{
        let readme_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .unwrap()
            .join("README.md");
        std::fs::read_to_string(readme_path).unwrap()
    }};
}
