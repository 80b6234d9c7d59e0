use crate::error::{Error, OracleError, Result};
use crate::types::ArchiveInfo;
use async_trait::async_trait;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

use super::PasswordOracle;

/// Entry names reported by [`ZipOracle::inspect`]
const SAMPLE_NAMES: usize = 5;

/// Parsed archive over the in-memory bytes; clones share the central directory
type Archive = ::zip::ZipArchive<Cursor<Arc<[u8]>>>;

/// Password oracle for ZIP archives
///
/// The archive is read into memory and its central directory parsed once on
/// [`open`](Self::open); each check works on a cheap clone of that handle. Each candidate is
/// checked against a single probe entry: the first encrypted file, or entry 0 when
/// nothing is encrypted. A candidate that passes the decryption header check is
/// only accepted once the whole entry decompresses with a valid CRC, which weeds
/// out the ZipCrypto false positives that slip past the one-byte header check.
#[derive(Debug, Clone)]
pub struct ZipOracle {
    archive_path: PathBuf,
    archive: Archive,
    probe_index: usize,
    info: ArchiveInfo,
}

impl ZipOracle {
    /// Open a ZIP archive for password testing
    ///
    /// # Errors
    ///
    /// - [`Error::Oracle`] if the file cannot be read or is not a ZIP archive
    /// - [`Error::Config`] if the archive has no entries
    pub async fn open(archive_path: &Path) -> Result<Self> {
        let bytes: Arc<[u8]> = tokio::fs::read(archive_path)
            .await
            .map_err(|e| OracleError::OpenFailed {
                archive: archive_path.to_path_buf(),
                reason: e.to_string(),
            })?
            .into();

        let path = archive_path.to_path_buf();
        let (archive, info, probe_index) = spawn_blocking(move || {
            let mut archive = open_archive(&path, bytes)?;
            let (info, probe_index) = scan(&path, &mut archive)?;
            Ok::<_, OracleError>((archive, info, probe_index))
        })
        .await
        .map_err(|e| OracleError::TaskFailed {
            archive: archive_path.to_path_buf(),
            reason: e.to_string(),
        })??;

        if info.entry_count == 0 {
            return Err(Error::config(
                "archive",
                format!("{} contains no entries", archive_path.display()),
            ));
        }

        if info.is_encrypted {
            info!(
                ?archive_path,
                entries = info.entry_count,
                probe_index,
                "opened encrypted ZIP archive"
            );
        } else {
            warn!(
                ?archive_path,
                entries = info.entry_count,
                "ZIP archive is not encrypted, any candidate will match"
            );
        }

        Ok(Self {
            archive_path: archive_path.to_path_buf(),
            archive,
            probe_index,
            info,
        })
    }

    /// Read entry count, encryption flag and the first entry names
    ///
    /// Informational only; the search does not depend on it.
    pub async fn inspect(archive_path: &Path) -> Result<ArchiveInfo> {
        Ok(Self::open(archive_path).await?.info)
    }

    /// Metadata gathered when the archive was opened
    pub fn info(&self) -> &ArchiveInfo {
        &self.info
    }

    /// Path of the target archive
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }
}

#[async_trait]
impl PasswordOracle for ZipOracle {
    async fn test(&self, candidate: &str) -> std::result::Result<bool, OracleError> {
        let mut archive = self.archive.clone();
        let path = self.archive_path.clone();
        let index = self.probe_index;
        let password = candidate.to_string();

        spawn_blocking(move || check_password(&path, &mut archive, index, &password))
            .await
            .map_err(|e| OracleError::TaskFailed {
                archive: self.archive_path.clone(),
                reason: e.to_string(),
            })?
    }

    fn name(&self) -> &str {
        "zip"
    }
}

fn open_archive(path: &Path, bytes: Arc<[u8]>) -> std::result::Result<Archive, OracleError> {
    ::zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| OracleError::Malformed {
        archive: path.to_path_buf(),
        reason: format!("failed to read ZIP archive: {}", e),
    })
}

/// Walk the central directory: count entries, detect encryption and pick the probe
fn scan(
    path: &Path,
    archive: &mut Archive,
) -> std::result::Result<(ArchiveInfo, usize), OracleError> {
    let mut sample_names = Vec::new();
    for index in 0..archive.len().min(SAMPLE_NAMES) {
        let entry = archive
            .by_index_raw(index)
            .map_err(|e| OracleError::UnreadableEntry {
                archive: path.to_path_buf(),
                index,
                reason: e.to_string(),
            })?;
        sample_names.push(entry.name().to_string());
    }

    let mut probe = None;
    for index in 0..archive.len() {
        match archive.by_index(index) {
            Ok(_) => {}
            // zip refuses to open an encrypted entry without a password
            Err(e) if e.to_string().to_lowercase().contains("password") => {
                probe = Some(index);
                break;
            }
            Err(e) => {
                return Err(OracleError::UnreadableEntry {
                    archive: path.to_path_buf(),
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    let info = ArchiveInfo {
        entry_count: archive.len(),
        is_encrypted: probe.is_some(),
        sample_names,
    };
    Ok((info, probe.unwrap_or(0)))
}

fn check_password(
    path: &Path,
    archive: &mut Archive,
    index: usize,
    password: &str,
) -> std::result::Result<bool, OracleError> {
    let mut file = match archive.by_index_decrypt(index, password.as_bytes()) {
        Ok(Ok(file)) => file,
        Ok(Err(::zip::result::InvalidPassword)) => return Ok(false),
        Err(e) => {
            return Err(OracleError::UnreadableEntry {
                archive: path.to_path_buf(),
                index,
                reason: e.to_string(),
            });
        }
    };

    // Header check passed; a wrong key still fails decompression or the CRC
    match std::io::copy(&mut file, &mut std::io::sink()) {
        Ok(_) => Ok(true),
        Err(e) => {
            debug!(error = %e, "candidate passed header check but failed verification");
            Ok(false)
        }
    }
}
