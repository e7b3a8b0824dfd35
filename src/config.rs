use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot open `::atmpsf` toml file: {1}")]
    Open(#[source] std::io::Error, PathBuf),
    #[error("cannot create `::atmpsf` toml file: {1}")]
    Create(#[source] std::io::Error, PathBuf),
    #[error("cannot read `::atmpsf` toml file: {1}")]
    Read(#[source] std::io::Error, PathBuf),
    #[error("cannot write `::atmpsf` toml file: {1}")]
    Write(#[source] std::io::Error, PathBuf),
    #[error("cannot deserialize `::atmpsf` builder from toml")]
    Load(#[from] toml::de::Error),
    #[error("cannot serialize `::atmpsf` builder into toml")]
    Save(#[from] toml::ser::Error),
}

/// Builders that can be loaded from and saved to toml files
pub trait TomlConfig: Serialize + DeserializeOwned {
    /// Comment written on the first line of a saved file
    const HEADER: &'static str;

    /// Load the builder from a toml file
    fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let mut file =
            File::open(&path).map_err(|e| ConfigError::Open(e, path.as_ref().to_path_buf()))?;
        let mut toml = String::new();
        file.read_to_string(&mut toml)
            .map_err(|e| ConfigError::Read(e, path.as_ref().to_path_buf()))?;
        let builder: Self = toml::from_str(&toml)?;
        log::debug!("loaded {} from {:?}", Self::HEADER, path.as_ref());
        Ok(builder)
    }
    /// Save the builder into a toml file
    fn save<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)?;
        let mut file =
            File::create(&path).map_err(|e| ConfigError::Create(e, path.as_ref().to_path_buf()))?;
        write!(file, "# {}\n\n{}", Self::HEADER, toml)
            .map_err(|e| ConfigError::Write(e, path.as_ref().to_path_buf()))?;
        Ok(())
    }
}
