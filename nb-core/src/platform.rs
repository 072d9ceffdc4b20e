//! Per-user directories for configuration and logs, plus the OS label shown
//! by `nbridge status`.

use std::path::PathBuf;

use crate::constants::TOOL_NAME;
use crate::error::{NbError, NbResult};

/// `<config_dir>/nbridge`.
pub fn config_dir() -> NbResult<PathBuf> {
    tool_dir(dirs::config_dir(), "config")
}

/// `<data_dir>/nbridge`; logs live below it.
pub fn data_dir() -> NbResult<PathBuf> {
    tool_dir(dirs::data_dir(), "data")
}

/// Display name of the operating system this binary was built for.
pub fn os_name() -> &'static str {
    match std::env::consts::OS {
        "macos" => "macOS",
        "windows" => "Windows",
        "linux" => "Linux",
        other => other,
    }
}

fn tool_dir(base: Option<PathBuf>, kind: &str) -> NbResult<PathBuf> {
    base.map(|b| b.join(TOOL_NAME))
        .ok_or_else(|| NbError::Config(format!("could not determine {kind} directory")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_dir() {
        let dir = tool_dir(Some(PathBuf::from("/home/u/.config")), "config").unwrap();
        assert_eq!(dir, PathBuf::from("/home/u/.config").join(TOOL_NAME));

        let err = tool_dir(None, "data").unwrap_err();
        assert!(matches!(err, NbError::Config(ref m) if m.contains("data")));
    }

    #[test]
    fn test_os_name_is_known() {
        assert!(!os_name().is_empty());
        if cfg!(target_os = "linux") {
            assert_eq!(os_name(), "Linux");
        }
    }
}
