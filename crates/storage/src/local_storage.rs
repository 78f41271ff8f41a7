use std::{
    collections::VecDeque,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use ironlog_app::{
    OngoingWorkout, OngoingWorkoutRepository, Settings, SettingsRepository, log as app_log,
};
use serde::{Serialize, de::DeserializeOwned};
use strum::AsRefStr;

/// Client-side state kept as JSON files in a data directory.
#[derive(Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

#[derive(AsRefStr)]
enum Key {
    #[strum(serialize = "settings")]
    Settings,
    #[strum(serialize = "ongoing_workout")]
    OngoingWorkout,
    #[strum(serialize = "log")]
    Log,
}

impl LocalStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &Key) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_ref()))
    }

    fn get<T: DeserializeOwned>(&self, key: &Key) -> anyhow::Result<Option<T>> {
        let path = self.path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    fn set<T: Serialize>(&self, key: &Key, value: &T) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.path(key);
        let content = serde_json::to_string(value).context("failed to serialize")?;
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))
    }
}

impl SettingsRepository for LocalStorage {
    async fn read_settings(&self) -> Result<Settings, String> {
        self.get(&Key::Settings)
            .map(Option::unwrap_or_default)
            .map_err(|err| format!("{err:#}"))
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), String> {
        self.set(&Key::Settings, &settings)
            .map_err(|err| format!("{err:#}"))
    }
}

impl OngoingWorkoutRepository for LocalStorage {
    async fn read_ongoing_workout(&self) -> Result<Option<OngoingWorkout>, String> {
        self.get::<Option<OngoingWorkout>>(&Key::OngoingWorkout)
            .map(Option::flatten)
            .map_err(|err| format!("{err:#}"))
    }

    async fn write_ongoing_workout(
        &self,
        ongoing_workout: Option<OngoingWorkout>,
    ) -> Result<(), String> {
        self.set(&Key::OngoingWorkout, &ongoing_workout)
            .map_err(|err| format!("{err:#}"))
    }
}

/// Log entries, newest first.
pub struct Log {
    storage: LocalStorage,
}

impl Log {
    const CAPACITY: usize = 100;

    #[must_use]
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }
}

impl app_log::Repository for Log {
    fn read_entries(&self) -> Result<VecDeque<app_log::Entry>, app_log::Error> {
        self.storage
            .get(&Key::Log)
            .map(Option::unwrap_or_default)
            .map_err(|err| app_log::Error::Unknown(format!("{err:#}")))
    }

    fn write_entry(&self, entry: app_log::Entry) -> Result<(), app_log::Error> {
        let mut entries = self.read_entries()?;
        entries.push_front(entry);
        entries.truncate(Self::CAPACITY);
        self.storage
            .set(&Key::Log, &entries)
            .map_err(|err| app_log::Error::Unknown(format!("{err:#}")))
    }
}

#[cfg(test)]
mod tests {
    use ironlog_app::log::Repository;
    use pretty_assertions::assert_eq;

    use crate::tests::data::{STARTED_AT, WORKOUT};

    use super::*;

    #[tokio::test]
    async fn test_settings() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        assert_eq!(storage.read_settings().await.unwrap(), Settings::default());

        let settings = Settings {
            rest_seconds: 120,
            ..Settings::default()
        };
        storage.write_settings(settings).await.unwrap();
        assert_eq!(storage.read_settings().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn test_settings_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), "{").unwrap();

        let err = LocalStorage::new(dir.path())
            .read_settings()
            .await
            .unwrap_err();
        assert!(err.starts_with("failed to parse"), "{err}");
    }

    #[tokio::test]
    async fn test_ongoing_workout() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("nested"));

        assert_eq!(storage.read_ongoing_workout().await.unwrap(), None);

        let ongoing = OngoingWorkout::from(&*WORKOUT);
        storage
            .write_ongoing_workout(Some(ongoing.clone()))
            .await
            .unwrap();
        let read = storage.read_ongoing_workout().await.unwrap().unwrap();
        assert_eq!(read, ongoing);
        assert_eq!(read.workout_id(), WORKOUT.id);
        assert_eq!(read.started_at, *STARTED_AT);

        storage.write_ongoing_workout(None).await.unwrap();
        assert_eq!(storage.read_ongoing_workout().await.unwrap(), None);
    }

    #[test]
    fn test_log_keeps_newest_entries() {
        let dir = tempfile::tempdir().unwrap();
        let log = Log::new(LocalStorage::new(dir.path()));

        assert_eq!(log.read_entries().unwrap(), VecDeque::new());

        for i in 0..105 {
            log.write_entry(app_log::Entry {
                time: String::new(),
                level: ::log::Level::Info,
                message: i.to_string(),
            })
            .unwrap();
        }

        let entries = log.read_entries().unwrap();
        assert_eq!(entries.len(), 100);
        assert_eq!(entries[0].message, "104");
        assert_eq!(entries[99].message, "5");
    }
}
