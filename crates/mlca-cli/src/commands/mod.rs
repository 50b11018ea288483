use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ValueEnum;
use mlca_core::serde::to_canonical_json_pretty;
use mlca_tables::{builtin_tables, load_tables, GwpVersion, TableSet};
use serde::Serialize;

pub mod batch;
pub mod circularity;
pub mod corridor;
pub mod grid;
pub mod run;
pub mod tables;
pub mod transport;

/// GWP revision selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GwpArg {
    #[value(name = "AR5", alias = "ar5")]
    Ar5,
    #[value(name = "AR6", alias = "ar6")]
    Ar6,
}

impl From<GwpArg> for GwpVersion {
    fn from(value: GwpArg) -> Self {
        match value {
            GwpArg::Ar5 => GwpVersion::Ar5,
            GwpArg::Ar6 => GwpVersion::Ar6,
        }
    }
}

pub fn resolve_tables(path: Option<&Path>) -> Result<Arc<TableSet>, Box<dyn Error>> {
    match path {
        Some(path) => Ok(Arc::new(load_tables(path)?)),
        None => Ok(builtin_tables()?),
    }
}

pub fn emit_json<T: Serialize>(value: &T, out: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    let rendered = to_canonical_json_pretty(value)?;
    emit_text(&rendered, out)
}

pub fn emit_text(rendered: &str, out: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, rendered)?;
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
