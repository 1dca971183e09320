//! Application-scoped settings stores
//!
//! Both stores implement [`KeyValueStore`]: a [`MemoryStore`] that lives as long as the process, and a [`FileStore`] that mirrors its content to a JSON file.

use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::traits::{KeyValueStore, PlatformError};


/// A settings store that is not persisted
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the keys that are currently set
    pub fn keys(&self) -> Vec<String> {
        lock(&self.values).keys().cloned().collect()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), PlatformError> {
        lock(&self.values).insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PlatformError> {
        lock(&self.values).remove(key);
        Ok(())
    }
}


/// A settings store that stores its values in a local JSON file
#[derive(Debug)]
pub struct FileStore {
    backing_file: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Get the default path to the settings file
    pub fn default_file() -> PathBuf {
        PathBuf::from(String::from("campus-planner/settings.json"))
    }

    /// Initialize a store from the content of a valid backing file if it exists.
    /// Returns an error otherwise
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let values = match std::fs::File::open(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(file) => serde_json::from_reader(file)?,
        };

        Ok(Self{
            backing_file: PathBuf::from(path),
            values: Mutex::new(values),
        })
    }

    /// Initialize an empty store, that will be saved to `path`
    pub fn new(path: &Path) -> Self {
        Self{
            backing_file: PathBuf::from(path),
            values: Mutex::new(HashMap::new()),
        }
    }

    /// Initialize a store from `path`, or an empty store in case the file is missing or invalid
    pub fn open(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(store) => store,
            Err(err) => {
                if path.exists() {
                    log::warn!("Invalid settings file: {}. Using empty settings", err);
                } else {
                    log::debug!("No settings file at {:?} yet", path);
                }
                Self::new(path)
            },
        }
    }

    pub fn backing_file(&self) -> &Path {
        &self.backing_file
    }

    /// Store the current values to the backing file
    fn save_to_file(&self, values: &HashMap<String, String>) -> Result<(), PlatformError> {
        let path = &self.backing_file;
        if let Some(folder) = path.parent() {
            if folder.as_os_str().is_empty() == false {
                std::fs::create_dir_all(folder)?;
            }
        }

        let file = std::fs::File::create(path)
            .map_err(|err| format!("Unable to save file {:?}: {}", path, err))?;
        serde_json::to_writer(file, values)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), PlatformError> {
        let mut values = lock(&self.values);
        values.insert(key.to_string(), value);
        self.save_to_file(&values)
    }

    fn remove(&self, key: &str) -> Result<(), PlatformError> {
        let mut values = lock(&self.values);
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.save_to_file(&values)
    }
}


fn lock(values: &Mutex<HashMap<String, String>>) -> MutexGuard<'_, HashMap<String, String>> {
    match values.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
