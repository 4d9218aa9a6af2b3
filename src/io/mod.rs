//! Input and output for `latsym`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{self, format_err};
use serde::de::DeserializeOwned;
use serde_yaml;

pub mod format;


/// Reads a YAML file and deserialises it into an appropriate structure.
///
/// # Arguments
///
/// * `name` - The name of the YAML file to be read in.
///
/// # Returns
///
/// A `Result` containing the structure deserialised from the read-in file.
pub fn read_latsym_yaml<T, P: AsRef<Path>>(name: P) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
{
    let path = name.as_ref();
    let reader = BufReader::new(
        File::open(path)
            .map_err(|err| format_err!("Unable to open `{}`: {err}", path.display()))?,
    );
    serde_yaml::from_reader(reader).map_err(|err| format_err!(err))
}
