//! Gzip artifact output and artifact naming.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use promfeed_core::AppConfig;

use crate::error::ExportError;
use crate::partition::PartitionPolicy;

/// Resolved output layout for a run: the partition policy and the names of
/// the artifacts it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPlan {
    policy: PartitionPolicy,
    prefix: String,
    explicit: Option<Vec<String>>,
}

impl OutputPlan {
    /// An explicit file list selects fixed slots (one per file); otherwise
    /// offers are chunked by `chunk_size` and named from `prefix`.
    #[must_use]
    pub fn new(output_files: Option<Vec<String>>, prefix: &str, chunk_size: usize) -> Self {
        let policy = match &output_files {
            Some(files) => PartitionPolicy::FixedSlots(files.len()),
            None => PartitionPolicy::ChunkSize(chunk_size),
        };
        Self {
            policy,
            prefix: prefix.to_string(),
            explicit: output_files,
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(
            config.output_files.clone(),
            &config.output_prefix,
            config.chunk_size,
        )
    }

    #[must_use]
    pub fn policy(&self) -> PartitionPolicy {
        self.policy
    }

    /// File names for `count` partitions, in partition order.
    #[must_use]
    pub fn file_names(&self, count: usize) -> Vec<String> {
        match &self.explicit {
            Some(files) => files.iter().take(count).cloned().collect(),
            None => artifact_names(&self.prefix, count),
        }
    }
}

/// Generated artifact names: `<prefix>.1.xml.gz`, `<prefix>.2.xml.gz`, ...
#[must_use]
pub fn artifact_names(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("{prefix}.{n}.xml.gz")).collect()
}

/// Gzip-compresses `bytes` into `dir/file_name`.
///
/// The data is written to a hidden temporary file in `dir`, flushed to disk,
/// then renamed over the destination, so readers never observe a partial
/// artifact. On failure the temporary file is removed.
///
/// # Errors
///
/// Returns [`ExportError::Write`] naming the file that could not be written.
pub fn write_gzip_atomic(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    let final_path = dir.join(file_name);
    let tmp_path = dir.join(format!(".{file_name}.tmp"));

    let result = write_gzip(&tmp_path, bytes).and_then(|()| fs::rename(&tmp_path, &final_path));
    match result {
        Ok(()) => {
            tracing::debug!(
                path = %final_path.display(),
                uncompressed_bytes = bytes.len(),
                "gzip artifact in place"
            );
            Ok(final_path)
        }
        Err(source) => {
            if let Err(e) = fs::remove_file(&tmp_path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %tmp_path.display(), error = %e, "failed to remove temporary artifact");
                }
            }
            Err(ExportError::Write {
                path: final_path.display().to_string(),
                source,
            })
        }
    }
}

fn write_gzip(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    encoder.write_all(bytes)?;
    let file = encoder
        .finish()?
        .into_inner()
        .map_err(std::io::IntoInnerError::into_error)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;

    use super::*;

    fn gunzip(path: &Path) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(File::open(path).unwrap())
            .read_to_end(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn writes_decompressible_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_gzip_atomic(dir.path(), "b2b.prom.1.xml.gz", b"<yml_catalog/>").unwrap();
        assert_eq!(path, dir.path().join("b2b.prom.1.xml.gz"));
        assert_eq!(gunzip(&path), b"<yml_catalog/>");
        assert!(!dir.path().join(".b2b.prom.1.xml.gz.tmp").exists());
    }

    #[test]
    fn overwrites_existing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        write_gzip_atomic(dir.path(), "out.xml.gz", b"old").unwrap();
        let path = write_gzip_atomic(dir.path(), "out.xml.gz", b"new").unwrap();
        assert_eq!(gunzip(&path), b"new");
    }

    #[test]
    fn missing_directory_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = write_gzip_atomic(&missing, "out.xml.gz", b"x").unwrap_err();
        assert!(
            matches!(err, ExportError::Write { ref path, .. } if path.ends_with("out.xml.gz")),
            "got: {err:?}"
        );
    }

    #[test]
    fn blocked_destination_fails_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("out.xml.gz")).unwrap();
        let err = write_gzip_atomic(dir.path(), "out.xml.gz", b"x").unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }), "got: {err:?}");
        assert!(!dir.path().join(".out.xml.gz.tmp").exists());
    }

    #[test]
    fn generated_names_are_one_based() {
        assert_eq!(
            artifact_names("b2b.prom", 3),
            vec!["b2b.prom.1.xml.gz", "b2b.prom.2.xml.gz", "b2b.prom.3.xml.gz"]
        );
    }

    #[test]
    fn explicit_files_select_fixed_slots() {
        let plan = OutputPlan::new(
            Some(vec!["a.xml.gz".to_string(), "b.xml.gz".to_string()]),
            "ignored",
            20_000,
        );
        assert_eq!(plan.policy(), PartitionPolicy::FixedSlots(2));
        assert_eq!(plan.file_names(2), vec!["a.xml.gz", "b.xml.gz"]);
    }

    #[test]
    fn without_explicit_files_chunks_by_size() {
        let plan = OutputPlan::new(None, "feed", 500);
        assert_eq!(plan.policy(), PartitionPolicy::ChunkSize(500));
        assert_eq!(plan.file_names(2), vec!["feed.1.xml.gz", "feed.2.xml.gz"]);
    }
}
