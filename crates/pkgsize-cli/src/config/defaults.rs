use std::path::PathBuf;

pub fn default_install_path() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_peers() -> bool {
    true
}
