use std::time::Duration;

#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self) -> Result<Settings, String>;
    async fn set_settings(&self, settings: Settings) -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Rest started after a set is marked as completed.
    pub rest_seconds: u32,
    pub tick_millis: u64,
    pub notifications: bool,
}

impl Settings {
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(1))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rest_seconds: 90,
            tick_millis: 1000,
            notifications: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.rest_seconds, 90);
        assert_eq!(settings.tick(), Duration::from_secs(1));
        assert!(settings.notifications);
    }

    #[test]
    fn test_settings_partial_json() {
        let settings: Settings = serde_json::from_str(r#"{"rest_seconds": 120}"#).unwrap();
        assert_eq!(
            settings,
            Settings {
                rest_seconds: 120,
                ..Settings::default()
            }
        );
    }

    #[test]
    fn test_settings_tick_never_zero() {
        let settings = Settings {
            tick_millis: 0,
            ..Settings::default()
        };
        assert_eq!(settings.tick(), Duration::from_millis(1));
    }
}
