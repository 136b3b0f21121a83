use std::path::PathBuf;

/// XDG app name used for config and state directories.
pub const APP_NAME: &str = "kick-autohost";

/// File name of the persisted key-value store inside the state directory.
pub const STORAGE_FILE: &str = "storage.json";

fn project_config_dir(app_name: &str) -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", app_name).map(|dirs| dirs.config_dir().to_path_buf())
}

fn project_state_dir(app_name: &str) -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", app_name).map(|dirs| {
        dirs.state_dir()
            .unwrap_or_else(|| dirs.data_local_dir())
            .to_path_buf()
    })
}

/// Config directory (`~/.config/kick-autohost`).
pub fn config_dir() -> Option<PathBuf> {
    project_config_dir(APP_NAME)
}

/// State directory (`~/.local/state/kick-autohost`, or the local data dir
/// on platforms without an XDG state dir).
pub fn state_dir() -> Option<PathBuf> {
    project_state_dir(APP_NAME)
}

pub fn state_dir_fallback() -> PathBuf {
    std::env::temp_dir().join(format!("{APP_NAME}-state"))
}

/// Path of the persisted key-value store, falling back to the temp dir when
/// no home directory can be determined (e.g. minimal containers).
pub fn storage_path() -> PathBuf {
    state_dir()
        .unwrap_or_else(state_dir_fallback)
        .join(STORAGE_FILE)
}
