//! Save manager: timestamped saves in one directory with count-based retention.
//!
//! The directory is the only source of truth. Every operation that needs to
//! know which saves exist rescans it, so nothing is cached between calls.
//!
//! # Concurrency
//!
//! One manager per directory, one caller at a time. Mutating operations take
//! `&mut self`; sharing a manager across threads requires external locking.
//! Two managers pointed at the same directory race between scan and delete
//! and may evict too much, too little, or each other's fresh saves.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use crate::clock::{Clock, SystemClock};
use crate::codec::{Codec, CodecKind};
use crate::config::SaveConfig;
use crate::error::{Result, SaveError};
use crate::naming;
use crate::retention::{self, RetentionPolicy, TieBreak};
use crate::scanner::{self, SaveFile};

/// Persists values to `save_YYYYMMDD_HHMMSS<ext>` files in a single directory.
pub struct SaveManager<C> {
    directory: PathBuf,
    codec: C,
    policy: RetentionPolicy,
    clock: Box<dyn Clock>,
}

impl<C: Codec> SaveManager<C> {
    /// Create (or reuse) a save directory with unlimited retention.
    pub fn new(path: impl AsRef<Path>, codec: C) -> Result<Self> {
        Self::with_policy(path, codec, RetentionPolicy::unlimited())
    }

    /// Create (or reuse) a save directory keeping at most `max_files` saves.
    ///
    /// # Errors
    ///
    /// [`SaveError::InvalidRetentionLimit`] if `max_files` is zero, checked
    /// before anything touches the filesystem.
    pub fn with_limit(path: impl AsRef<Path>, codec: C, max_files: usize) -> Result<Self> {
        let policy = RetentionPolicy::with_limit(max_files)?;
        Self::with_policy(path, codec, policy)
    }

    /// Create (or reuse) a save directory governed by `policy`.
    pub fn with_policy(path: impl AsRef<Path>, codec: C, policy: RetentionPolicy) -> Result<Self> {
        let directory = std::path::absolute(path.as_ref())?;
        fs::create_dir_all(&directory)?;

        tracing::debug!(
            "Save directory ready: {} (limit: {:?})",
            directory.display(),
            policy.limit()
        );

        Ok(Self {
            directory,
            codec,
            policy,
            clock: Box::new(SystemClock),
        })
    }

    /// Replace the time source used to name new saves.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.policy = self.policy.with_tie_break(tie_break);
        self
    }

    /// Absolute path of the managed directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    pub fn retention_limit(&self) -> Option<usize> {
        self.policy.limit()
    }

    /// Write `value` to a new save file and return its name.
    ///
    /// The value is first encoded into a hidden temporary file that scans do
    /// not count. With a retention limit, old saves are then evicted before
    /// the temporary file is renamed into place, so the limit holds at every
    /// point in time and a value that fails to encode never costs an old save.
    ///
    /// Two saves within the same second share a name; the later one replaces
    /// the earlier.
    pub fn save<T>(&mut self, value: &T) -> Result<String>
    where
        T: Serialize + ?Sized,
    {
        let name = naming::format_name(self.clock.now(), self.codec.extension());
        let path = self.directory.join(&name);
        let temp_path = self.directory.join(format!(".{name}.tmp"));

        if let Err(err) = self.commit(value, &temp_path, &path) {
            discard_temp(&temp_path);
            return Err(err);
        }

        tracing::debug!("Saved {}", path.display());

        Ok(name)
    }

    /// Decode the save named `name` inside the managed directory.
    pub fn load<T>(&self, name: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = self.resolve(name)?;
        let file = File::open(&path).map_err(|e| not_found_or_io(e, name))?;
        let value = self.codec.decode(&mut BufReader::new(file))?;

        tracing::debug!("Loaded {}", path.display());

        Ok(value)
    }

    /// Decode the most recent save.
    ///
    /// # Errors
    ///
    /// [`SaveError::NoSaveFiles`] if the directory is empty and
    /// [`SaveError::NoValidSaveFiles`] if it only holds foreign entries.
    pub fn load_latest<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let latest = self.latest()?;
        self.load(latest.name())
    }

    /// The most recent save, without reading it.
    pub fn latest(&self) -> Result<SaveFile> {
        let scan = scanner::scan(&self.directory)?;
        if scan.is_empty() {
            return Err(SaveError::NoSaveFiles);
        }

        retention::newest(&scan.save_files, self.policy.tie_break())
            .cloned()
            .ok_or(SaveError::NoValidSaveFiles)
    }

    /// Every save in the directory, oldest first.
    pub fn list_saves(&self) -> Result<Vec<SaveFile>> {
        let mut saves = scanner::scan(&self.directory)?.save_files;
        retention::sort_oldest_first(&mut saves, self.policy.tie_break());
        Ok(saves)
    }

    /// Remove the file `name` from the managed directory.
    ///
    /// Works for any entry name, not only save files.
    pub fn delete_file(&mut self, name: &str) -> Result<()> {
        let path = self.resolve(name)?;
        fs::symlink_metadata(&path).map_err(|e| not_found_or_io(e, name))?;
        fs::remove_file(&path)?;

        tracing::debug!("Deleted {}", path.display());

        Ok(())
    }

    /// Evict old saves and return how many were removed.
    ///
    /// With a retention limit, removes oldest saves until fewer than `limit`
    /// remain, rescanning after every removal. Without one, removes the single
    /// oldest save if there is any.
    pub fn delete_old(&mut self) -> Result<usize> {
        let tie_break = self.policy.tie_break();

        let Some(limit) = self.policy.limit() else {
            let scan = scanner::scan(&self.directory)?;
            return match retention::oldest(&scan.save_files, tie_break) {
                Some(oldest) => {
                    self.evict(oldest)?;
                    Ok(1)
                }
                None => Ok(0),
            };
        };

        let mut deleted = 0;
        loop {
            let scan = scanner::scan(&self.directory)?;
            if !retention::should_evict(scan.save_count(), limit) {
                break;
            }
            let Some(oldest) = retention::oldest(&scan.save_files, tie_break) else {
                break;
            };
            self.evict(oldest)?;
            deleted += 1;
        }

        Ok(deleted)
    }

    fn evict(&self, save: &SaveFile) -> Result<()> {
        fs::remove_file(self.directory.join(save.name()))?;
        tracing::info!("Evicted save {} (taken {})", save.name(), save.timestamp());
        Ok(())
    }

    fn commit<T>(&mut self, value: &T, temp_path: &Path, path: &Path) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.write_encoded(temp_path, value)?;
        if self.policy.limit().is_some() {
            self.delete_old()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }

    fn write_encoded<T>(&self, path: &Path, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let mut writer = BufWriter::new(File::create(path)?);
        self.codec.encode(&mut writer, value)?;
        writer.flush()?;
        Ok(())
    }

    /// Map `name` to a path, refusing anything but a plain entry name.
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.directory.join(name)),
            _ => Err(SaveError::InvalidFileName(name.to_string())),
        }
    }
}

impl SaveManager<CodecKind> {
    /// Build a manager from a parsed [`SaveConfig`].
    pub fn from_config(config: &SaveConfig) -> Result<Self> {
        let policy = config.retention_policy()?;
        Self::with_policy(&config.directory, config.codec, policy)
    }
}

impl<C: fmt::Debug> fmt::Debug for SaveManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveManager")
            .field("directory", &self.directory)
            .field("codec", &self.codec)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn not_found_or_io(err: std::io::Error, name: &str) -> SaveError {
    match err.kind() {
        ErrorKind::NotFound => SaveError::NotFound(name.to_string()),
        _ => SaveError::Io(err),
    }
}

fn discard_temp(path: &Path) {
    if let Err(err) = fs::remove_file(path)
        && err.kind() != ErrorKind::NotFound
    {
        tracing::warn!("Failed to remove temporary file {}: {}", path.display(), err);
    }
}
