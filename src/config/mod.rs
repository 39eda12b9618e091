//! Configuration: the `.notevault.toml` settings file and the server secret.

pub mod secret;
pub mod settings;

pub use secret::{ServerSecret, SERVER_SECRET_ENV};
pub use settings::Settings;
