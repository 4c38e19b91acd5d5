// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! On-disk storage of the safety state.
//!
//! The state is kept as a single bincode record. A new record is written to a temporary file,
//! synced, then renamed over the old one, so a crash leaves either the old or the new record on
//! disk and never a torn one.

use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
};

use bulwark_types::{
    consensus::{SafetyMetricsValue, SafetyState},
    traits::{
        storage::{EncodingSnafu, IoSnafu, Result, SafetyStateStore, StorageError},
        SignatureKey,
    },
    utils::{decode_record, encode_record},
};
use snafu::ResultExt;
use tracing::{debug, info, trace};

/// File name of the record inside the storage directory
const RECORD_FILE: &str = "safety_state.bin";

/// File name new records are staged under before the rename
const STAGING_FILE: &str = "safety_state.bin.tmp";

/// Persistent [`SafetyStateStore`] keeping one record in a directory.
#[derive(Debug)]
pub struct FileStorage<KEY: SignatureKey> {
    /// Directory holding the record
    dir: PathBuf,
    /// Whether writes are synced to disk before being reported durable
    fsync: bool,
    /// Whether [`SafetyStateStore::close`] was called
    closed: bool,
    /// Bytes read and written
    metrics: Arc<SafetyMetricsValue>,
    /// Records hold states for this key type
    _key: PhantomData<fn() -> KEY>,
}

impl<KEY: SignatureKey> FileStorage<KEY> {
    /// Open a file storage in `dir`, creating the directory if needed.
    ///
    /// Turning `fsync` off gives up durability across power loss and is only meant for tests.
    ///
    /// # Errors
    /// If the directory cannot be created
    pub fn open(dir: impl AsRef<Path>, fsync: bool) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).context(IoSnafu { path: dir.clone() })?;

        // A staging file left behind by a crash was never renamed, so it never held the state.
        let staging = dir.join(STAGING_FILE);
        match fs::remove_file(&staging) {
            Ok(()) => info!("Removed stale staging file {}", staging.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(StorageError::Io { path: staging, source }),
        }

        info!("Opened safety state storage in {}", dir.display());
        Ok(Self {
            dir,
            fsync,
            closed: false,
            metrics: Arc::default(),
            _key: PhantomData,
        })
    }

    /// Report bytes read and written to `metrics`
    #[must_use]
    pub fn with_metrics(self, metrics: Arc<SafetyMetricsValue>) -> Self {
        Self { metrics, ..self }
    }

    /// Path of the record
    #[must_use]
    pub fn record_path(&self) -> PathBuf {
        self.dir.join(RECORD_FILE)
    }

    /// Fail if the store was closed
    fn ensure_open(&self) -> Result {
        if self.closed {
            return Err(StorageError::Closed);
        }
        Ok(())
    }

    /// Write `bytes` to the staging file, then move it over the record
    fn replace_record(&self, bytes: &[u8]) -> Result {
        let staging = self.dir.join(STAGING_FILE);
        {
            let mut file = File::create(&staging).context(IoSnafu {
                path: staging.clone(),
            })?;
            file.write_all(bytes).context(IoSnafu {
                path: staging.clone(),
            })?;
            if self.fsync {
                file.sync_all().context(IoSnafu {
                    path: staging.clone(),
                })?;
            }
        }

        let record = self.record_path();
        fs::rename(&staging, &record).context(IoSnafu { path: record })?;

        // Make the rename itself durable
        if self.fsync {
            File::open(&self.dir)
                .and_then(|dir| dir.sync_all())
                .context(IoSnafu {
                    path: self.dir.clone(),
                })?;
        }
        Ok(())
    }
}

impl<KEY: SignatureKey> SafetyStateStore<KEY> for FileStorage<KEY> {
    fn load(&self) -> Result<Option<SafetyState<KEY>>> {
        self.ensure_open()?;
        let path = self.record_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No safety state record at {}", path.display());
                return Ok(None);
            }
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        self.metrics.safety_store_bytes_read.add(bytes.len());
        let state = decode_record(&bytes).context(EncodingSnafu)?;
        Ok(Some(state))
    }

    fn store(&mut self, state: &SafetyState<KEY>) -> Result {
        self.ensure_open()?;
        let bytes = encode_record(state).context(EncodingSnafu)?;
        self.replace_record(&bytes)?;
        self.metrics.safety_store_bytes_written.add(bytes.len());
        trace!(
            "Stored safety state: last voted view {}, locked view {}",
            state.last_voted_view(),
            state.locked_view()
        );
        Ok(())
    }

    fn close(&mut self) -> Result {
        self.closed = true;
        Ok(())
    }
}
