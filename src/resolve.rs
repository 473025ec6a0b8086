//! name → SMILES and SMILES → asset-stem resolution, plus the on-disk asset
//! store holding the pre-generated renders

use std::path::{Path, PathBuf};

use log::trace;
use sha2::{Digest, Sha256};

use crate::error::{AssetError, OracleError, StemError};
use crate::oracle::Oracle;
use crate::registry::registry;

pub const IMAGE_SUFFIX: &str = ".jpg";
pub const STRUCTURE_SUFFIX: &str = "_gaff.mol2";

/// strip the padding and quoting that query strings arrive with before any
/// stem derivation
pub fn clean_smiles(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim()
}

/// registry first, oracle second. the fixed target/adsorber compounds must
/// stay bit-stable because their asset files were generated against exact
/// SMILES strings; anything else gets open-ended generation
pub async fn resolve_smiles(
    oracle: &dyn Oracle,
    name: &str,
) -> Result<String, OracleError> {
    if let Some(mol) = registry().lookup_by_name(name) {
        trace!("registry hit for {name:?}");
        return Ok(mol.smiles.to_owned());
    }
    trace!("registry miss for {name:?}, asking the oracle");
    oracle.smiles_for(name).await
}

/// derive the filesystem-safe stem naming a SMILES string's asset files.
///
/// pure and deterministic: the same SMILES always yields the same stem, so
/// pre-generated files can be located by recomputing the stem from a freshly
/// resolved string. registered SMILES map to their registered stem; unknown
/// ones get a truncated SHA-256 digest. empty or malformed input is a
/// terminal failure for that molecule
pub fn derive_asset_stem(smiles: &str) -> Result<String, StemError> {
    let smiles = clean_smiles(smiles);
    if smiles.is_empty() {
        return Err(StemError::Empty);
    }
    // SMILES is a line notation over printable ASCII; interior whitespace or
    // anything outside that range cannot name a stable file
    if !smiles.chars().all(|c| c.is_ascii_graphic()) {
        return Err(StemError::Malformed(smiles.to_owned()));
    }
    if let Some(mol) = registry().lookup_by_smiles(smiles) {
        return Ok(mol.asset_stem.to_owned());
    }
    let digest = Sha256::digest(smiles.as_bytes());
    let hex: String = digest[..8].iter().map(|b| format!("{b:02x}")).collect();
    Ok(format!("mol_{hex}"))
}

/// read-only directory of pre-generated `<stem>.jpg` / `<stem>_gaff.mol2`
/// pairs
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn locate(&self, filename: String) -> Result<PathBuf, AssetError> {
        let path = self.root.join(filename);
        if !path.exists() {
            return Err(AssetError::NotFound(path));
        }
        Ok(path)
    }

    /// the 2D render for `stem`, or [`AssetError::NotFound`]
    pub fn image_2d(&self, stem: &str) -> Result<PathBuf, AssetError> {
        self.locate(format!("{stem}{IMAGE_SUFFIX}"))
    }

    /// the 3D structure file for `stem`, or [`AssetError::NotFound`]
    pub fn structure_3d(&self, stem: &str) -> Result<PathBuf, AssetError> {
        self.locate(format!("{stem}{STRUCTURE_SUFFIX}"))
    }
}
