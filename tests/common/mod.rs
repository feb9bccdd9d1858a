use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tallykeeper::storage::SledKeyValueStore;
use tallykeeper::SessionStore;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn create_temp_store() -> (Arc<SessionStore>, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let kv = SledKeyValueStore::open(tmp.path().join("sessions.db"))
        .expect("failed to open sled store");
    (Arc::new(SessionStore::new(Arc::new(kv))), tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("tallykeeper.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
