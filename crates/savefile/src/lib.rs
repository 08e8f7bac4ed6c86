//! Directory-scoped save files with count-based retention.
//!
//! A [`SaveManager`] writes values to `save_YYYYMMDD_HHMMSS<ext>` files in a
//! single directory, loads a named or the most recent save, and deletes the
//! oldest saves once a configured limit is reached. Files that do not follow
//! the naming scheme are left alone.
//!
//! ```no_run
//! use savefile::{JsonCodec, SaveManager};
//!
//! let mut saves = SaveManager::with_limit("saves", JsonCodec::new(), 3)?;
//! saves.save(&["test", "case", "1"])?;
//! let latest: Vec<String> = saves.load_latest()?;
//! assert_eq!(latest, ["test", "case", "1"]);
//! # Ok::<(), savefile::SaveError>(())
//! ```

pub mod clock;
pub mod codec;
pub mod config;
mod error;
pub mod manager;
pub mod naming;
pub mod retention;
pub mod scanner;

pub use clock::{Clock, SystemClock};
pub use codec::{BincodeCodec, Codec, CodecKind, JsonCodec};
pub use config::{SaveConfig, default_save_dir};
pub use error::{Result, SaveError};
pub use manager::SaveManager;
pub use retention::{RetentionPolicy, TieBreak};
pub use scanner::{DirectoryScan, SaveFile};
