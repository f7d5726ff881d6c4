//! Day file writer.
//!
//! Each bucket becomes `<prefix>-<YYYY-MM-DD>.<ext>` in the output
//! directory, content verbatim. Files are replaced atomically and
//! unconditionally: splitting is a full re-derivation from the export.
//!
//! A failed day does not stop the others. The [`PartitionReport`] lists
//! both outcomes so the caller can report partial success.

use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use tracing::{error, info};

use super::atomic::write_atomic;
use super::day::{DayBucket, DayFile, Partition};
use crate::config::SplitConfig;
use crate::encoding;
use crate::error::{ChatminutesError, Result};
use crate::parsing::CanonicalDate;

/// File name for one day.
///
/// ```rust
/// use chatminutes::core::writer::day_file_name;
///
/// let date = "2022-10-18".parse().unwrap();
/// assert_eq!(day_file_name("Board", date, "txt"), "Board-2022-10-18.txt");
/// ```
pub fn day_file_name(prefix: &str, date: CanonicalDate, ext: &str) -> String {
    format!("{prefix}-{date}.{}", ext.trim_start_matches('.'))
}

/// A day file that was written.
#[derive(Debug, Clone)]
pub struct WrittenDay {
    pub day: DayFile,
    /// Lines in the file
    pub lines: usize,
    /// Messages (header lines) in the file
    pub messages: usize,
    /// Bytes written
    pub bytes: usize,
}

/// A day file that could not be written.
#[derive(Debug)]
pub struct FailedDay {
    pub date: CanonicalDate,
    pub path: PathBuf,
    /// Always a [`ChatminutesError::Write`]
    pub error: ChatminutesError,
}

/// Outcome of writing a whole partition.
#[derive(Debug, Default)]
pub struct PartitionReport {
    /// Written days, in date order
    pub written: Vec<WrittenDay>,
    /// Failed days, in date order
    pub failed: Vec<FailedDay>,
}

impl PartitionReport {
    /// Returns `true` if every day was written.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Written day files, for downstream stages.
    pub fn day_files(&self) -> impl Iterator<Item = &DayFile> {
        self.written.iter().map(|w| &w.day)
    }
}

/// Writes day buckets to a directory.
#[derive(Debug, Clone)]
pub struct PartitionWriter {
    output_dir: PathBuf,
    prefix: String,
    extension: String,
    encoding: &'static Encoding,
}

impl PartitionWriter {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        extension: impl Into<String>,
        encoding: &'static Encoding,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: prefix.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
            encoding,
        }
    }

    /// Builds a writer from a split configuration, resolving its output
    /// encoding.
    pub fn from_config(config: &SplitConfig) -> Result<Self> {
        let encoding = encoding::resolve(config.effective_output_encoding())?;
        Ok(Self::new(
            &config.output_dir,
            &config.prefix,
            &config.extension,
            encoding,
        ))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Destination path for a date.
    pub fn path_for(&self, date: CanonicalDate) -> PathBuf {
        self.output_dir
            .join(day_file_name(&self.prefix, date, &self.extension))
    }

    /// Writes one bucket.
    pub fn write_day(&self, bucket: &DayBucket) -> Result<WrittenDay> {
        let date = bucket.date();
        let path = self.path_for(date);
        let contents = bucket.contents();
        let bytes = encoding::encode(&contents, self.encoding);

        write_atomic(&path, &bytes).map_err(|e| ChatminutesError::write(date, &path, e))?;

        info!(%date, path = %path.display(), lines = bucket.len(), "wrote day file");
        Ok(WrittenDay {
            day: DayFile {
                date,
                day_id: date.to_string(),
                path,
            },
            lines: bucket.len(),
            messages: bucket.message_count(),
            bytes: bytes.len(),
        })
    }

    /// Writes every bucket of a finished partition.
    ///
    /// Fails only when the output directory cannot be created; per-day
    /// failures are collected in the report.
    pub fn write(&self, partition: &Partition) -> Result<PartitionReport> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| ChatminutesError::output_dir(&self.output_dir, e))?;

        let mut report = PartitionReport::default();
        for bucket in partition.days() {
            match self.write_day(bucket) {
                Ok(written) => report.written.push(written),
                Err(err) => {
                    let date = bucket.date();
                    error!(%date, error = %err, "failed to write day file");
                    report.failed.push(FailedDay {
                        date,
                        path: self.path_for(date),
                        error: err,
                    });
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatePolicy;
    use crate::core::grouper::group_lines;
    use std::fs;

    const CHAT: &str = "10/18/22, 09:00 - Alice: Agenda\n\
                        more\n\
                        [10/19/22, 08:30] Carol: Next\n";

    fn writer(dir: &Path) -> PartitionWriter {
        PartitionWriter::new(dir, "Board", "txt", encoding_rs::UTF_8)
    }

    #[test]
    fn test_writes_one_file_per_day() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("raw");
        let partition = group_lines(CHAT, DatePolicy::default());

        let report = writer(&out).write(&partition).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.written.len(), 2);
        assert_eq!(
            fs::read_to_string(out.join("Board-2022-10-18.txt")).unwrap(),
            "10/18/22, 09:00 - Alice: Agenda\nmore\n"
        );
        assert_eq!(
            fs::read_to_string(out.join("Board-2022-10-19.txt")).unwrap(),
            "[10/19/22, 08:30] Carol: Next\n"
        );
        let ids: Vec<_> = report.day_files().map(|d| d.day_id.as_str()).collect();
        assert_eq!(ids, ["2022-10-18", "2022-10-19"]);
        assert_eq!(report.written[0].messages, 1);
        assert_eq!(report.written[0].lines, 2);
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Board-2022-10-18.txt");
        fs::write(&path, "stale content that is longer than the new one\n").unwrap();

        let partition = group_lines(CHAT, DatePolicy::default());
        writer(dir.path()).write(&partition).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "10/18/22, 09:00 - Alice: Agenda\nmore\n"
        );
    }

    #[test]
    fn test_failed_day_does_not_stop_others() {
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on the target name makes the rename fail
        fs::create_dir(dir.path().join("Board-2022-10-18.txt")).unwrap();

        let partition = group_lines(CHAT, DatePolicy::default());
        let report = writer(dir.path()).write(&partition).unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].date.to_string(), "2022-10-18");
        assert!(report.failed[0].error.is_write());
        assert_eq!(report.written.len(), 1);
        assert!(dir.path().join("Board-2022-10-19.txt").is_file());

        // The failed day leaves no temp file behind
        let mut names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["Board-2022-10-18.txt", "Board-2022-10-19.txt"]);
    }

    #[test]
    fn test_output_dir_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("raw");
        fs::write(&blocker, "not a directory").unwrap();
        let partition = group_lines(CHAT, DatePolicy::default());

        let err = writer(&blocker.join("days")).write(&partition).unwrap_err();

        assert!(matches!(err, ChatminutesError::OutputDir { .. }));
        assert!(err.to_string().contains("days"));
    }

    #[test]
    fn test_utf16_output_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let utf16 = encoding::resolve("utf-16le").unwrap();
        let writer = PartitionWriter::new(dir.path(), "Board", "txt", utf16);
        let partition = group_lines("10/18/22, 09:00 - Alice: hi\n", DatePolicy::default());

        writer.write(&partition).unwrap();

        let expected: Vec<u8> = "10/18/22, 09:00 - Alice: hi\n"
            .encode_utf16()
            .flat_map(u16::to_le_bytes)
            .collect();
        assert_eq!(fs::read(dir.path().join("Board-2022-10-18.txt")).unwrap(), expected);
    }

    #[test]
    fn test_output_encoding_applied() {
        let dir = tempfile::tempdir().unwrap();
        let latin1 = encoding::resolve("windows-1252").unwrap();
        let writer = PartitionWriter::new(dir.path(), "Board", ".txt", latin1);
        let partition = group_lines("10/18/22, 09:00 - José: café\n", DatePolicy::default());

        writer.write(&partition).unwrap();

        let bytes = fs::read(dir.path().join("Board-2022-10-18.txt")).unwrap();
        assert_eq!(bytes, b"10/18/22, 09:00 - Jos\xE9: caf\xE9\n");
    }
}
