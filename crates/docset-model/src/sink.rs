//! Shared per-file diagnostic sink.
//!
//! Files build in parallel, so the sink is a sharded append-only multimap:
//! each shard holds its own lock and a file always hashes to the same shard.
//! There is no global lock across files.

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use crate::diagnostic::{Diagnostic, Severity};
use crate::file::FilePath;

const SHARD_COUNT: usize = 16;

/// Thread-safe diagnostic sink keyed by file.
#[derive(Debug)]
pub struct ErrorSink {
    shards: Vec<Mutex<BTreeMap<FilePath, Vec<Diagnostic>>>>,
}

impl Default for ErrorSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorSink {
    pub fn new() -> Self {
        Self {
            shards: (0..SHARD_COUNT).map(|_| Mutex::new(BTreeMap::new())).collect(),
        }
    }

    fn shard(&self, file: &FilePath) -> &Mutex<BTreeMap<FilePath, Vec<Diagnostic>>> {
        let mut hasher = DefaultHasher::new();
        file.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % SHARD_COUNT]
    }

    /// Append one diagnostic to a file.
    pub fn add(&self, file: &FilePath, diagnostic: Diagnostic) {
        let mut shard = self.shard(file).lock().expect("error sink lock poisoned");
        shard.entry(file.clone()).or_default().push(diagnostic);
    }

    /// Append a batch of diagnostics to a file.
    pub fn extend(&self, file: &FilePath, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        let mut iter = diagnostics.into_iter().peekable();
        if iter.peek().is_none() {
            return;
        }
        let mut shard = self.shard(file).lock().expect("error sink lock poisoned");
        shard.entry(file.clone()).or_default().extend(iter);
    }

    /// True when the file has at least one error-severity diagnostic.
    ///
    /// Warnings and suggestions never gate rendering.
    pub fn file_has_error(&self, file: &FilePath) -> bool {
        let shard = self.shard(file).lock().expect("error sink lock poisoned");
        shard
            .get(file)
            .is_some_and(|diagnostics| diagnostics.iter().any(|d| d.severity == Severity::Error))
    }

    /// Diagnostics recorded for a file so far, in report order.
    pub fn diagnostics_for(&self, file: &FilePath) -> Vec<Diagnostic> {
        let shard = self.shard(file).lock().expect("error sink lock poisoned");
        shard.get(file).cloned().unwrap_or_default()
    }

    /// Total diagnostic count per severity across all files.
    pub fn severity_counts(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for shard in &self.shards {
            let shard = shard.lock().expect("error sink lock poisoned");
            for diagnostics in shard.values() {
                for diagnostic in diagnostics {
                    *counts.entry(diagnostic.severity).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    /// Drain the sink into a single deterministic map for reporting.
    pub fn into_report(self) -> BTreeMap<FilePath, Vec<Diagnostic>> {
        let mut report = BTreeMap::new();
        for shard in self.shards {
            let shard = shard.into_inner().expect("error sink lock poisoned");
            for (file, diagnostics) in shard {
                report.insert(file, diagnostics);
            }
        }
        report
    }

    /// True when no diagnostics were recorded at all.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| {
            shard
                .lock()
                .expect("error sink lock poisoned")
                .values()
                .all(Vec::is_empty)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(code: &str) -> Diagnostic {
        Diagnostic::new(code, Severity::Error, "author", "bad value")
    }

    fn warning(code: &str) -> Diagnostic {
        Diagnostic::new(code, Severity::Warning, "author", "questionable value")
    }

    #[test]
    fn warnings_do_not_count_as_errors() {
        let sink = ErrorSink::new();
        let file = FilePath::new("docs/toc.json");
        sink.add(&file, warning("w1"));
        assert!(!sink.file_has_error(&file));
        sink.add(&file, error("e1"));
        assert!(sink.file_has_error(&file));
    }

    #[test]
    fn diagnostics_keep_append_order() {
        let sink = ErrorSink::new();
        let file = FilePath::new("docs/toc.json");
        sink.add(&file, warning("first"));
        sink.extend(&file, vec![error("second"), warning("third")]);
        let codes: Vec<_> = sink
            .diagnostics_for(&file)
            .into_iter()
            .map(|d| d.code)
            .collect();
        assert_eq!(codes, vec!["first", "second", "third"]);
    }

    #[test]
    fn concurrent_appends_from_many_files() {
        let sink = ErrorSink::new();
        std::thread::scope(|scope| {
            for worker in 0..8 {
                let sink = &sink;
                scope.spawn(move || {
                    for i in 0..50 {
                        let file = FilePath::new(format!("docs/{worker}/toc-{i}.json"));
                        sink.add(&file, error("e"));
                    }
                });
            }
        });
        let report = sink.into_report();
        assert_eq!(report.len(), 400);
        assert!(report.values().all(|d| d.len() == 1));
    }

    #[test]
    fn report_is_sorted_by_file() {
        let sink = ErrorSink::new();
        sink.add(&FilePath::new("b/toc.json"), warning("w"));
        sink.add(&FilePath::new("a/toc.json"), warning("w"));
        let files: Vec<_> = sink.into_report().into_keys().collect();
        assert_eq!(
            files,
            vec![FilePath::new("a/toc.json"), FilePath::new("b/toc.json")]
        );
    }
}
