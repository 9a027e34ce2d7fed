//! Directory builder to generate throttle configurations for testing.
//!
//! This module provides [`DirBuilder`] which provides methods to easily
//! populate a given directory with scope files and scoreboard dumps. This
//! is intended to allow test fixtures to be defined within the test code.

use std::fmt::Debug;
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::result::Result;

pub struct DirBuilder<'a> {
    path: &'a Path,
}

impl<'a> DirBuilder<'a> {
    pub fn new(path: &'a Path) -> DirBuilder<'a> {
        Self { path }
    }

    fn make_path(&self, subpath: &str) -> Result<PathBuf, String> {
        let subpath = Path::new(subpath);
        if !subpath.is_relative() {
            return Err(format!("dir() subpath not relative: {subpath:?}"));
        }
        Ok(self.path.join(subpath))
    }

    fn append_bytes(&self, path: &Path, contents: &[u8]) -> Result<(), String> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(debug_to_string)?;

        let mut file = BufWriter::new(file);
        file.write_all(contents).map_err(debug_to_string)?;
        file.write_all(b"\n").map_err(debug_to_string)?;

        Ok(())
    }

    pub fn str(&self, subpath: &str, contents: &str) -> Result<PathBuf, String> {
        let path = self.make_path(subpath)?;
        self.append_bytes(&path, contents.as_bytes())?;
        Ok(path)
    }

    /// Write a scope file with one table per `(location, methods, max)`.
    ///
    /// `methods` is written verbatim as a space-separated method list.
    pub fn scopes(
        &self,
        subpath: &str,
        scopes: &[(&str, &str, i64)],
    ) -> Result<PathBuf, String> {
        let mut content = String::new();
        for (location, methods, max) in scopes {
            content.push_str(&format!(
                "[scopes.\"{location}\"]\nmethods = \"{methods}\"\nmax_concurrent_reqs = {max}\n\n"
            ));
        }
        self.str(subpath, &content)
    }

    /// Write a scoreboard dump with one slot per `(status, request line)`.
    pub fn scoreboard(&self, subpath: &str, slots: &[(&str, &str)]) -> Result<PathBuf, String> {
        let entries: Vec<String> = slots
            .iter()
            .map(|(status, request)| {
                format!("  {{\"status\": \"{status}\", \"request\": \"{request}\"}}")
            })
            .collect();
        self.str(subpath, &format!("[\n{}\n]", entries.join(",\n")))
    }
}

// https://internals.rust-lang.org/t/to-debug-a-debug-counterpart-of-to-string/11228/3
fn debug_to_string<T: Debug>(t: T) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    buf.write_fmt(format_args!("{:?}", t))
        .expect("a Debug implementation returned an error unexpectedly");
    buf.shrink_to_fit();
    buf
}
