//! Logged-in session collection.
//!
//! Reads the portable login-accounting file (`utmp`) as fixed-size
//! binary records. Only user-session records with a non-empty user field
//! are reported; everything else (boot records, dead processes, empty
//! slots) is skipped.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collection::GrowableCollection;
use crate::error::SysResult;
use crate::fs::FileSystem;

/// Default location of the login-accounting file.
pub const UTMP_PATH: &str = "/var/run/utmp";

/// Size of one accounting record (glibc layout).
pub const RECORD_LEN: usize = 384;

/// Record type marking a live user session.
const USER_PROCESS: i16 = 7;

// field offsets and widths within a record
const TYPE_OFFSET: usize = 0;
const LINE_OFFSET: usize = 8;
const LINE_LEN: usize = 32;
const USER_OFFSET: usize = 44;
const USER_LEN: usize = 32;
const HOST_OFFSET: usize = 76;
const HOST_LEN: usize = 256;
const TIME_OFFSET: usize = 340;

/// Sessions added per collection growth.
const WHO_CHUNK: usize = 16;

/// One logged-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoEntry {
    /// Login name.
    pub user: String,
    /// Terminal device line.
    pub device: String,
    /// Remote host, empty for local logins.
    pub host: String,
    /// Login time, seconds since the epoch.
    pub time: i64,
}

impl WhoEntry {
    /// Login time as a UTC timestamp.
    pub fn login_time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.time, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Collects logged-in sessions from the accounting file.
pub struct WhoCollector<F: FileSystem> {
    fs: F,
    path: PathBuf,
}

impl<F: FileSystem> WhoCollector<F> {
    /// Collector over the platform's default accounting file.
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            path: PathBuf::from(UTMP_PATH),
        }
    }

    /// Collector over an explicit accounting file.
    pub fn with_path(fs: F, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    /// Reads the accounting file and returns the live user sessions in
    /// file order. A short trailing record is ignored.
    pub fn collect(&self) -> SysResult<GrowableCollection<WhoEntry>> {
        let bytes = self.fs.read(&self.path)?;

        let mut sessions = GrowableCollection::with_chunk(WHO_CHUNK);
        for record in bytes.chunks_exact(RECORD_LEN) {
            if let Some(entry) = parse_record(record) {
                sessions.push(entry);
            }
        }

        debug!(
            path = %self.path.display(),
            sessions = sessions.len(),
            "who collection complete"
        );
        Ok(sessions)
    }
}

/// Text field: bytes up to the first NUL, lossily decoded.
fn field(record: &[u8], offset: usize, len: usize) -> String {
    let raw = &record[offset..offset + len];
    let end = raw.iter().position(|&b| b == 0).unwrap_or(len);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

fn parse_record(record: &[u8]) -> Option<WhoEntry> {
    let record_type = i16::from_ne_bytes([record[TYPE_OFFSET], record[TYPE_OFFSET + 1]]);
    if record_type != USER_PROCESS {
        return None;
    }
    let user = field(record, USER_OFFSET, USER_LEN);
    if user.is_empty() {
        return None;
    }

    let time = i32::from_ne_bytes([
        record[TIME_OFFSET],
        record[TIME_OFFSET + 1],
        record[TIME_OFFSET + 2],
        record[TIME_OFFSET + 3],
    ]) as i64;

    Some(WhoEntry {
        user,
        device: field(record, LINE_OFFSET, LINE_LEN),
        host: field(record, HOST_OFFSET, HOST_LEN),
        time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SysError;
    use crate::fs::MemFs;

    fn record(record_type: i16, user: &str, device: &str, host: &str, time: i32) -> Vec<u8> {
        let mut rec = vec![0u8; RECORD_LEN];
        rec[TYPE_OFFSET..TYPE_OFFSET + 2].copy_from_slice(&record_type.to_ne_bytes());
        rec[LINE_OFFSET..LINE_OFFSET + device.len()].copy_from_slice(device.as_bytes());
        rec[USER_OFFSET..USER_OFFSET + user.len()].copy_from_slice(user.as_bytes());
        rec[HOST_OFFSET..HOST_OFFSET + host.len()].copy_from_slice(host.as_bytes());
        rec[TIME_OFFSET..TIME_OFFSET + 4].copy_from_slice(&time.to_ne_bytes());
        rec
    }

    fn utmp(records: &[Vec<u8>]) -> Vec<u8> {
        records.concat()
    }

    #[test]
    fn test_collect_user_sessions() {
        let mut fs = MemFs::new();
        fs.add_file(
            UTMP_PATH,
            utmp(&[
                record(USER_PROCESS, "alice", "pts/0", "10.0.0.9", 1_700_000_000),
                record(USER_PROCESS, "bob", "tty1", "", 1_700_000_100),
            ]),
        );

        let sessions = WhoCollector::new(fs).collect().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].user, "alice");
        assert_eq!(sessions[0].device, "pts/0");
        assert_eq!(sessions[0].host, "10.0.0.9");
        assert_eq!(sessions[0].time, 1_700_000_000);
        assert_eq!(sessions[1].user, "bob");
        assert_eq!(sessions[1].host, "");
    }

    #[test]
    fn test_non_user_records_are_skipped() {
        // 2 = BOOT_TIME, 8 = DEAD_PROCESS
        let mut fs = MemFs::new();
        fs.add_file(
            UTMP_PATH,
            utmp(&[
                record(2, "reboot", "~", "", 1_600_000_000),
                record(USER_PROCESS, "carol", "pts/2", "", 1_700_000_000),
                record(8, "dave", "pts/3", "", 1_700_000_050),
            ]),
        );

        let sessions = WhoCollector::new(fs).collect().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].user, "carol");
    }

    #[test]
    fn test_empty_user_field_is_skipped() {
        let mut fs = MemFs::new();
        fs.add_file(
            UTMP_PATH,
            utmp(&[record(USER_PROCESS, "", "pts/0", "", 1_700_000_000)]),
        );
        let sessions = WhoCollector::new(fs).collect().unwrap();
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_short_trailing_record_is_ignored() {
        let mut bytes = utmp(&[record(USER_PROCESS, "erin", "pts/5", "", 1_700_000_000)]);
        bytes.extend_from_slice(&[7, 0, 0]); // truncated write

        let mut fs = MemFs::new();
        fs.add_file(UTMP_PATH, bytes);

        let sessions = WhoCollector::new(fs).collect().unwrap();
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn test_missing_file_is_a_system_error() {
        let err = WhoCollector::new(MemFs::new()).collect().unwrap_err();
        assert!(matches!(err, SysError::Sys(_)));
    }

    #[test]
    fn test_login_time_conversion() {
        let entry = WhoEntry {
            user: "alice".to_string(),
            device: "pts/0".to_string(),
            host: String::new(),
            time: 0,
        };
        assert_eq!(entry.login_time(), DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_custom_path() {
        let mut fs = MemFs::new();
        fs.add_file(
            "/tmp/utmp.fixture",
            utmp(&[record(USER_PROCESS, "frank", "pts/9", "", 1_700_000_000)]),
        );
        let sessions = WhoCollector::with_path(fs, "/tmp/utmp.fixture")
            .collect()
            .unwrap();
        assert_eq!(sessions[0].user, "frank");
    }
}
