//! per-PFAS binding-affinity tables. the table is an opaque ranked artifact
//! produced by the simulation side; its first row names the adsorber variant
//! reported as the best match at request time

use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BindingError;
use crate::registry::registry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingRow {
    pub rank: u32,

    /// adsorber variant identifier, an asset stem. the wire name matches the
    /// upstream table dumps
    #[serde(rename = "DETA_variant")]
    pub adsorber_variant: String,

    /// binding free energy in kcal/mol, more negative binds tighter
    pub score: f64,
}

/// the external binding-affinity data source, keyed by PFAS name
pub trait BindingSource: Send + Sync {
    fn table_for(&self, pfas_name: &str) -> Result<Vec<BindingRow>, BindingError>;
}

/// tables stored as one `<asset_stem>.json` per PFAS under a fixed directory
#[derive(Debug, Clone)]
pub struct FileBindingSource {
    dir: PathBuf,
}

impl FileBindingSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl BindingSource for FileBindingSource {
    fn table_for(&self, pfas_name: &str) -> Result<Vec<BindingRow>, BindingError> {
        let Some(mol) = registry().lookup_by_name(pfas_name) else {
            return Err(BindingError::Missing(pfas_name.to_owned()));
        };
        let path = self.dir.join(format!("{}.json", mol.asset_stem));
        if !path.exists() {
            return Err(BindingError::Missing(pfas_name.to_owned()));
        }
        let s = read_to_string(&path).map_err(|source| BindingError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&s).map_err(|source| BindingError::Parse { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipped() -> FileBindingSource {
        FileBindingSource::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/data/bindings"
        ))
    }

    #[test]
    fn every_pfas_has_a_shipped_table() {
        let src = shipped();
        for pfas in registry().pfas() {
            let table = src.table_for(pfas.name).unwrap();
            assert!(!table.is_empty(), "empty table for {}", pfas.name);
            for (i, row) in table.iter().enumerate() {
                assert_eq!(row.rank as usize, i + 1, "ranks out of order");
            }
        }
    }

    /// the table's first row and the static best-adsorber map are two sources
    /// of truth for the same answer; they must agree
    #[test]
    fn first_row_agrees_with_the_static_map() {
        let src = shipped();
        for pfas in registry().pfas() {
            let table = src.table_for(pfas.name).unwrap();
            assert_eq!(
                table[0].adsorber_variant,
                registry().best_adsorber_for(pfas.name).unwrap(),
                "disagreement for {}",
                pfas.name
            );
        }
    }

    #[test]
    fn unknown_names_are_missing_not_defaulted() {
        let got = shipped().table_for("water");
        assert!(matches!(got, Err(BindingError::Missing(_))));
    }

    #[test]
    fn wire_format_round_trips() {
        let json = r#"[{"rank": 1, "DETA_variant": "ADSORBER_hexane", "score": -13.2}]"#;
        let rows: Vec<BindingRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].adsorber_variant, "ADSORBER_hexane");
        let back = serde_json::to_string(&rows).unwrap();
        assert!(back.contains("DETA_variant"));
    }
}
