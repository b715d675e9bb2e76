mod settings;

pub use settings::{
    DatabaseSettings, LlmProvider, LlmSettings, ServerSettings, Settings, SettingsError,
};
