//! per-request orchestration: extract molecule names, resolve each one to a
//! SMILES string and asset stem, locate the pre-generated files, and enrich
//! known PFAS with their best-adsorber binding table

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;
use tokio::sync::Semaphore;

use crate::binding::{BindingRow, BindingSource};
use crate::error::{BindingError, PipelineError};
use crate::oracle::Oracle;
use crate::registry::registry;
use crate::resolve::{derive_asset_stem, resolve_smiles, AssetStore};

/// one fully resolved molecule: both asset files exist on disk
#[derive(Debug, Clone, Serialize)]
pub struct MoleculeAssets {
    pub name: String,
    pub smiles: String,
    pub asset_stem: String,
    pub image_2d: PathBuf,
    pub structure_3d: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct PfasMatch {
    pub pfas_name: String,
    pub best_adsorber: String,
    pub table: Vec<BindingRow>,
}

/// request-scoped result bundle, not persisted. `best_adsorber` and
/// `pfas_table` mirror the last entry of `pfas_matches` to keep the original
/// single-winner response shape alive next to the generalized lists
#[derive(Debug, Default, Serialize)]
pub struct ResolutionResult {
    pub molecule_names: Vec<String>,
    pub molecules: Vec<MoleculeAssets>,
    pub pfas_matches: Vec<PfasMatch>,
    pub best_adsorber: Option<String>,
    pub pfas_table: Vec<BindingRow>,
}

pub struct Pipeline {
    oracle: Arc<dyn Oracle>,
    assets: AssetStore,
    bindings: Arc<dyn BindingSource>,
    /// bound on in-flight oracle calls; everything else is local work
    oracle_limit: Arc<Semaphore>,
}

impl Pipeline {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        assets: AssetStore,
        bindings: Arc<dyn BindingSource>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            oracle,
            assets,
            bindings,
            oracle_limit: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    async fn extract(&self, text: &str) -> Result<Vec<String>, PipelineError> {
        let _permit = self
            .oracle_limit
            .acquire()
            .await
            .expect("oracle semaphore closed");
        self.oracle
            .extract_molecule_names(text)
            .await
            .map_err(PipelineError::Extraction)
    }

    /// one SMILES string per extracted molecule name. any oracle failure here
    /// is fatal for the request, matching the extraction contract
    pub async fn smiles_from_text(
        &self,
        text: &str,
    ) -> Result<Vec<String>, PipelineError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let names = self.extract(text).await?;
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            let smiles = {
                let _permit = self
                    .oracle_limit
                    .acquire()
                    .await
                    .expect("oracle semaphore closed");
                resolve_smiles(self.oracle.as_ref(), &name).await
            };
            match smiles {
                Ok(s) => out.push(s),
                Err(source) => {
                    return Err(PipelineError::Resolution { name, source })
                }
            }
        }
        Ok(out)
    }

    /// run the whole pipeline on free text. per-molecule failures are logged
    /// and skipped; only extraction failure aborts the request
    pub async fn resolve_text(
        &self,
        text: &str,
    ) -> Result<ResolutionResult, PipelineError> {
        if text.trim().is_empty() {
            return Ok(ResolutionResult::default());
        }
        let names = self.extract(text).await?;
        debug!("resolving {} molecules", names.len());

        // per-molecule work is independent; fan out and collect in order
        let mut handles = Vec::with_capacity(names.len());
        for name in &names {
            let name = name.clone();
            let oracle = Arc::clone(&self.oracle);
            let limit = Arc::clone(&self.oracle_limit);
            let assets = self.assets.clone();
            handles.push(tokio::spawn(resolve_one(oracle, limit, assets, name)));
        }
        let mut molecules = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Some(mol)) => molecules.push(mol),
                Ok(None) => {}
                Err(e) => warn!("resolution task panicked: {e}"),
            }
        }

        let mut pfas_matches = Vec::new();
        for mol in &molecules {
            if !registry().is_pfas(&mol.name) {
                continue;
            }
            if let Some(m) = self.enrich(&mol.name) {
                pfas_matches.push(m);
            }
        }

        let (best_adsorber, pfas_table) = match pfas_matches.last() {
            Some(m) => (Some(m.best_adsorber.clone()), m.table.clone()),
            None => (None, Vec::new()),
        };

        Ok(ResolutionResult {
            molecule_names: names,
            molecules,
            pfas_matches,
            best_adsorber,
            pfas_table,
        })
    }

    /// the binding table's first row is the authoritative best adsorber; the
    /// static map is a cross-check and the fallback when no table exists.
    /// `None` means no table and no map entry, which leaves the PFAS fields
    /// empty rather than aborting
    fn enrich(&self, pfas_name: &str) -> Option<PfasMatch> {
        let mapped = registry().best_adsorber_for(pfas_name);
        match self.bindings.table_for(pfas_name) {
            Ok(table) if !table.is_empty() => {
                let best = table[0].adsorber_variant.clone();
                if let Some(mapped) = mapped {
                    if mapped != best {
                        warn!(
                            "binding table ranks {best:?} first for \
                             {pfas_name:?} but the static map says {mapped:?}"
                        );
                    }
                }
                Some(PfasMatch {
                    pfas_name: pfas_name.to_owned(),
                    best_adsorber: best,
                    table,
                })
            }
            Ok(_) | Err(BindingError::Missing(_)) => {
                debug!("no binding table for {pfas_name:?}, using the static map");
                Some(PfasMatch {
                    pfas_name: pfas_name.to_owned(),
                    best_adsorber: mapped?.to_owned(),
                    table: Vec::new(),
                })
            }
            Err(e) => {
                warn!("binding lookup failed for {pfas_name:?}: {e}");
                Some(PfasMatch {
                    pfas_name: pfas_name.to_owned(),
                    best_adsorber: mapped?.to_owned(),
                    table: Vec::new(),
                })
            }
        }
    }
}

async fn resolve_one(
    oracle: Arc<dyn Oracle>,
    limit: Arc<Semaphore>,
    assets: AssetStore,
    name: String,
) -> Option<MoleculeAssets> {
    let smiles = {
        let _permit = limit.acquire().await.expect("oracle semaphore closed");
        match resolve_smiles(oracle.as_ref(), &name).await {
            Ok(s) => s,
            Err(e) => {
                warn!("SMILES resolution failed for {name:?}: {e}");
                return None;
            }
        }
    };
    let stem = match derive_asset_stem(&smiles) {
        Ok(s) => s,
        Err(e) => {
            warn!("skipping {name:?}: {e}");
            return None;
        }
    };
    // a missing file is a different operational problem than a bad SMILES,
    // keep the messages apart
    let image_2d = match assets.image_2d(&stem) {
        Ok(p) => p,
        Err(e) => {
            warn!("no 2D render for {name:?}: {e}");
            return None;
        }
    };
    let structure_3d = match assets.structure_3d(&stem) {
        Ok(p) => p,
        Err(e) => {
            warn!("no 3D structure for {name:?}: {e}");
            return None;
        }
    };
    Some(MoleculeAssets {
        name,
        smiles,
        asset_stem: stem,
        image_2d,
        structure_3d,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    use async_trait::async_trait;

    use super::*;
    use crate::binding::FileBindingSource;
    use crate::error::OracleError;

    struct MockOracle {
        names: Vec<String>,
        smiles: HashMap<String, String>,
    }

    #[async_trait]
    impl Oracle for MockOracle {
        async fn extract_molecule_names(
            &self,
            text: &str,
        ) -> Result<Vec<String>, OracleError> {
            if text.trim().is_empty() {
                return Ok(Vec::new());
            }
            Ok(self.names.clone())
        }

        async fn smiles_for(&self, name: &str) -> Result<String, OracleError> {
            self.smiles.get(name).cloned().ok_or_else(|| {
                OracleError::Malformed(format!("no mock SMILES for {name:?}"))
            })
        }
    }

    fn scratch(test: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("pfasmatch-{test}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_assets(dir: &Path, stem: &str) {
        std::fs::write(dir.join(format!("{stem}.jpg")), b"jpeg").unwrap();
        std::fs::write(dir.join(format!("{stem}_gaff.mol2")), b"mol2").unwrap();
    }

    fn shipped_bindings() -> Arc<FileBindingSource> {
        Arc::new(FileBindingSource::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/data/bindings"
        )))
    }

    fn pipeline(oracle: MockOracle, assets: &Path) -> Pipeline {
        Pipeline::new(
            Arc::new(oracle),
            AssetStore::new(assets),
            shipped_bindings(),
            4,
        )
    }

    #[tokio::test]
    async fn empty_text_yields_an_empty_bundle() {
        let dir = scratch("empty");
        let p = pipeline(
            MockOracle {
                names: vec!["should not appear".to_owned()],
                smiles: HashMap::new(),
            },
            &dir,
        );
        for text in ["", "   \t\n"] {
            let res = p.resolve_text(text).await.unwrap();
            assert!(res.molecule_names.is_empty());
            assert!(res.molecules.is_empty());
            assert!(res.pfas_matches.is_empty());
            assert_eq!(res.best_adsorber, None);
            assert!(res.pfas_table.is_empty());
        }
        assert!(p.smiles_from_text("").await.unwrap().is_empty());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn pfba_resolves_end_to_end() {
        let dir = scratch("pfba");
        write_assets(&dir, "PFBA");
        let p = pipeline(
            MockOracle {
                names: vec!["per-fluoro butanoic acid".to_owned()],
                smiles: HashMap::new(),
            },
            &dir,
        );

        let res = p.resolve_text("PFBA").await.unwrap();
        assert_eq!(res.molecule_names, ["per-fluoro butanoic acid"]);
        assert_eq!(res.molecules.len(), 1);
        let mol = &res.molecules[0];
        assert_eq!(mol.smiles, "O=C(O)C(F)(F)C(F)(F)C(F)(F)F");
        assert_eq!(mol.asset_stem, "PFBA");
        assert!(mol.image_2d.ends_with("PFBA.jpg"));
        assert!(mol.structure_3d.ends_with("PFBA_gaff.mol2"));

        assert_eq!(res.pfas_matches.len(), 1);
        assert_eq!(res.pfas_matches[0].best_adsorber, "ADSORBER_cyclohexane");
        assert_eq!(res.best_adsorber.as_deref(), Some("ADSORBER_cyclohexane"));
        assert_eq!(res.pfas_table.len(), 7);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn garbage_smiles_skips_that_molecule_only() {
        let dir = scratch("garbage");
        write_assets(&dir, "ADSORBER_benzene");
        let p = pipeline(
            MockOracle {
                names: vec!["mystery compound".to_owned(), "ADSORBER Benzene".to_owned()],
                smiles: HashMap::from([(
                    "mystery compound".to_owned(),
                    "not a valid smiles".to_owned(),
                )]),
            },
            &dir,
        );

        let res = p.resolve_text("some text").await.unwrap();
        assert_eq!(res.molecule_names.len(), 2);
        assert_eq!(res.molecules.len(), 1);
        assert_eq!(res.molecules[0].asset_stem, "ADSORBER_benzene");
        assert!(res.pfas_matches.is_empty());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn missing_assets_drop_the_molecule_not_the_request() {
        let dir = scratch("missing");
        write_assets(&dir, "PFBA");
        // no PFOA files on disk
        let p = pipeline(
            MockOracle {
                names: vec![
                    "per-fluoro butanoic acid".to_owned(),
                    "per-fluoro octanoic acid".to_owned(),
                ],
                smiles: HashMap::new(),
            },
            &dir,
        );

        let res = p.resolve_text("both").await.unwrap();
        assert_eq!(res.molecules.len(), 1);
        assert_eq!(res.molecules[0].asset_stem, "PFBA");
        assert_eq!(res.pfas_matches.len(), 1);
        assert_eq!(res.pfas_matches[0].pfas_name, "per-fluoro butanoic acid");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn multiple_pfas_keep_all_matches_and_mirror_the_last() {
        let dir = scratch("multi");
        write_assets(&dir, "PFBA");
        write_assets(&dir, "PFOS");
        let p = pipeline(
            MockOracle {
                names: vec![
                    "per-fluoro butanoic acid".to_owned(),
                    "per-fluoro octane sulfonic acid".to_owned(),
                ],
                smiles: HashMap::new(),
            },
            &dir,
        );

        let res = p.resolve_text("both").await.unwrap();
        assert_eq!(res.pfas_matches.len(), 2);
        assert_eq!(res.pfas_matches[0].best_adsorber, "ADSORBER_cyclohexane");
        assert_eq!(res.pfas_matches[1].best_adsorber, "ADSORBER_hexane");
        // legacy scalars carry the last-processed PFAS
        assert_eq!(res.best_adsorber.as_deref(), Some("ADSORBER_hexane"));
        assert_eq!(res.pfas_table, res.pfas_matches[1].table);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn map_fallback_when_no_table_is_on_disk() {
        let dir = scratch("fallback");
        write_assets(&dir, "PFBA");
        let empty_bindings = scratch("fallback-bindings");
        let p = Pipeline::new(
            Arc::new(MockOracle {
                names: vec!["per-fluoro butanoic acid".to_owned()],
                smiles: HashMap::new(),
            }),
            AssetStore::new(&dir),
            Arc::new(FileBindingSource::new(&empty_bindings)),
            4,
        );

        let res = p.resolve_text("PFBA").await.unwrap();
        assert_eq!(res.pfas_matches.len(), 1);
        assert_eq!(res.pfas_matches[0].best_adsorber, "ADSORBER_cyclohexane");
        assert!(res.pfas_matches[0].table.is_empty());
        std::fs::remove_dir_all(&dir).unwrap();
        std::fs::remove_dir_all(&empty_bindings).unwrap();
    }

    #[tokio::test]
    async fn smiles_from_text_preserves_order() {
        let dir = scratch("order");
        let p = pipeline(
            MockOracle {
                names: vec![
                    "per-fluoro butanoic acid".to_owned(),
                    "ethanol".to_owned(),
                ],
                smiles: HashMap::from([(
                    "ethanol".to_owned(),
                    "CCO".to_owned(),
                )]),
            },
            &dir,
        );

        let got = p.smiles_from_text("PFBA then ethanol").await.unwrap();
        assert_eq!(got, ["O=C(O)C(F)(F)C(F)(F)C(F)(F)F", "CCO"]);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
