// Copyright (C) 2026 The padboard authors
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const DEFAULT_SOUNDS_DIR: &str = "sounds";
const DEFAULT_DATA_DIR: &str = "data";

/// A YAML representation of the padboard configuration.
#[derive(Deserialize, Clone, Default)]
pub struct Config {
    /// The directory holding the bundled sound files.
    sounds_dir: Option<PathBuf>,

    /// The directory settings and uploaded sounds are stored in.
    data_dir: Option<PathBuf>,

    /// The audio output device. Defaults to the system default device.
    device: Option<String>,
}

impl Config {
    /// Parses the configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Config, Box<dyn Error>> {
        Ok(serde_yml::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn sounds_dir(&self) -> PathBuf {
        self.sounds_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOUNDS_DIR))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() -> Result<(), Box<dyn Error>> {
        let config: Config = serde_yml::from_str(
            r"
            sounds_dir: /usr/share/padboard/sounds
            data_dir: /var/lib/padboard
            device: 'USB Audio Device'
            ",
        )?;

        assert_eq!(
            config.sounds_dir(),
            PathBuf::from("/usr/share/padboard/sounds")
        );
        assert_eq!(config.data_dir(), PathBuf::from("/var/lib/padboard"));
        assert_eq!(config.device(), Some("USB Audio Device"));
        Ok(())
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.sounds_dir(), PathBuf::from("sounds"));
        assert_eq!(config.data_dir(), PathBuf::from("data"));
        assert_eq!(config.device(), None);
    }
}
