//! the fixed compound catalogue: 4 PFAS target contaminants, 7 candidate
//! adsorbers, and the precomputed best-adsorber map. built once at startup and
//! read-only afterwards

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

/// which partition of the registry a molecule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Pfas,
    Adsorber,
}

#[derive(Debug, Clone, Serialize)]
pub struct Molecule {
    pub name: &'static str,
    pub smiles: &'static str,
    /// unique stem naming the pre-generated `<stem>.jpg` and
    /// `<stem>_gaff.mol2` files in the asset store
    pub asset_stem: &'static str,
    pub iupac_name: Option<&'static str>,
    pub kind: Kind,
}

/// the asset SMILES strings must stay bit-stable: the files on disk were
/// generated against these exact strings
static MOLECULES: [Molecule; 11] = [
    Molecule {
        name: "per-fluoro butanoic acid",
        smiles: "O=C(O)C(F)(F)C(F)(F)C(F)(F)F",
        asset_stem: "PFBA",
        iupac_name: None,
        kind: Kind::Pfas,
    },
    Molecule {
        name: "per-fluoro butane sulfonic acid",
        smiles: "O=S(C(F)(F)C(F)(F)C(F)(F)C(F)(F)F)(O)=O",
        asset_stem: "PFBS",
        iupac_name: None,
        kind: Kind::Pfas,
    },
    Molecule {
        name: "per-fluoro octanoic acid",
        smiles: "O=C(O)C(F)(F)C(F)(F)C(C(F)(F)C(F)(F)C(C(F)(F)F)(F)F)(F)F",
        asset_stem: "PFOA",
        iupac_name: None,
        kind: Kind::Pfas,
    },
    Molecule {
        name: "per-fluoro octane sulfonic acid",
        smiles: "O=S(C(F)(F)C(F)(F)C(F)(F)C(C(F)(F)C(F)(F)C(F)(F)C(F)(F)F)(F)F)(O)=O",
        asset_stem: "PFOS",
        iupac_name: None,
        kind: Kind::Pfas,
    },
    Molecule {
        name: "ADSORBER Benzene",
        smiles: "CC[N+](CC)(C)CC[N+](CC1CCCCC1)(C)CC[N+](CC)(C)CC",
        asset_stem: "ADSORBER_benzene",
        iupac_name: Some(
            "N1-(cyclohexylmethyl)-N1-(2-(diethyl(methyl)ammonio)ethyl)-N2,N2-diethyl-N1,N2-dimethylethane-1,2-diaminium",
        ),
        kind: Kind::Adsorber,
    },
    Molecule {
        name: "ADSORBER Cyclohexane",
        smiles: "CC[N+](CC)(C)CC[N+](CC1=CC=CC=C1)(C)CC[N+](CC)(C)CC",
        asset_stem: "ADSORBER_cyclohexane",
        iupac_name: Some(
            "N1-benzyl-N1-(2-(diethyl(methyl)ammonio)ethyl)-N2,N2-diethyl-N1,N2-dimethylethane-1,2-diaminium",
        ),
        kind: Kind::Adsorber,
    },
    Molecule {
        name: "ADSORBER Imidazole",
        smiles: "CC[N+](CC)(C)CC[N+](CC1=NC=CN1)(C)CC[N+](CC)(C)CC",
        asset_stem: "ADSORBER_imidazole",
        iupac_name: Some(
            "N1-((1H-imidazol-2-yl)methyl)-N1-(2-(diethyl(methyl)ammonio)ethyl)-N2,N2-diethyl-N1,N2-dimethylethane-1,2-diaminium",
        ),
        kind: Kind::Adsorber,
    },
    Molecule {
        name: "ADSORBER Nitrobenzene",
        smiles: "CC[N+](CC)(C)CC[N+](CC1=CC=C([N+]([O-])=O)C=C1)(C)CC[N+](CC)(C)CC",
        asset_stem: "ADSORBER_nitrobenzene",
        iupac_name: Some(
            "N1-(2-(diethyl(methyl)ammonio)ethyl)-N2,N2-diethyl-N1,N2-dimethyl-N1-(4-nitrobenzyl)ethane-1,2-diaminium",
        ),
        kind: Kind::Adsorber,
    },
    Molecule {
        name: "ADSORBER Phenol",
        smiles: "CC[N+](CC)(C)CC[N+](CC1=CC=C(O)C=C1)(C)CC[N+](CC)(C)CC",
        asset_stem: "ADSORBER_phenol",
        iupac_name: Some(
            "N1-(2-(diethyl(methyl)ammonio)ethyl)-N2,N2-diethyl-N1-(4-hydroxybenzyl)-N1,N2-dimethylethane-1,2-diaminium",
        ),
        kind: Kind::Adsorber,
    },
    Molecule {
        name: "ADSORBER Hexane",
        smiles: "CC[N+](CC)(C)CC[N+](CCCCCCC)(C)CC[N+](CC)(C)CC",
        asset_stem: "ADSORBER_hexane",
        iupac_name: Some(
            "N1-(2-(diethyl(methyl)ammonio)ethyl)-N2,N2-diethyl-N1-heptyl-N1,N2-dimethylethane-1,2-diaminium",
        ),
        kind: Kind::Adsorber,
    },
    Molecule {
        name: "ADSORBER Isopentane",
        smiles: "CC[N+](CC)(C)CC[N+](CCC(C)CC(C)(C)C)(C)CC[N+](CC)(C)CC",
        asset_stem: "ADSORBER_isopentane",
        iupac_name: Some(
            "N1-(2-(diethyl(methyl)ammonio)ethyl)-N2,N2-diethyl-N1,N2-dimethyl-N1-(3,5,5-trimethylhexyl)ethane-1,2-diaminium",
        ),
        kind: Kind::Adsorber,
    },
];

/// one precomputed winner per PFAS, no ties
static BEST_ADSORBERS: [(&str, &str); 4] = [
    ("per-fluoro butanoic acid", "ADSORBER_cyclohexane"),
    ("per-fluoro butane sulfonic acid", "ADSORBER_phenol"),
    ("per-fluoro octanoic acid", "ADSORBER_hexane"),
    ("per-fluoro octane sulfonic acid", "ADSORBER_hexane"),
];

pub struct Registry {
    by_name: HashMap<&'static str, &'static Molecule>,
    by_smiles: HashMap<&'static str, &'static Molecule>,
    best_adsorbers: HashMap<&'static str, &'static str>,
}

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::build);

/// the process-wide registry. no mutation operations are exposed
pub fn registry() -> &'static Registry {
    &REGISTRY
}

impl Registry {
    fn build() -> Self {
        let mut by_name = HashMap::new();
        let mut by_smiles = HashMap::new();
        for mol in &MOLECULES {
            assert!(
                by_name.insert(mol.name, mol).is_none(),
                "duplicate molecule name {:?}",
                mol.name
            );
            assert!(
                by_smiles.insert(mol.smiles, mol).is_none(),
                "duplicate SMILES for {:?}",
                mol.name
            );
        }
        let stems: HashMap<_, _> =
            MOLECULES.iter().map(|m| (m.asset_stem, m)).collect();
        assert_eq!(stems.len(), MOLECULES.len(), "asset stems must be unique");

        let mut best_adsorbers = HashMap::new();
        for (pfas, stem) in BEST_ADSORBERS {
            let target = by_name
                .get(pfas)
                .unwrap_or_else(|| panic!("unknown PFAS {pfas:?} in adsorber map"));
            assert_eq!(target.kind, Kind::Pfas, "{pfas:?} is not a PFAS");
            let adsorber = stems
                .get(stem)
                .unwrap_or_else(|| panic!("unknown adsorber stem {stem:?}"));
            assert_eq!(adsorber.kind, Kind::Adsorber, "{stem:?} is not an adsorber");
            best_adsorbers.insert(pfas, stem);
        }

        Self {
            by_name,
            by_smiles,
            best_adsorbers,
        }
    }

    /// exact-string match only, no case or whitespace normalization
    pub fn lookup_by_name(&self, name: &str) -> Option<&'static Molecule> {
        self.by_name.get(name).copied()
    }

    pub fn lookup_by_smiles(&self, smiles: &str) -> Option<&'static Molecule> {
        self.by_smiles.get(smiles).copied()
    }

    /// the precomputed adsorber stem for a known PFAS. `None` for anything
    /// absent from the map, never a default
    pub fn best_adsorber_for(&self, pfas_name: &str) -> Option<&'static str> {
        self.best_adsorbers.get(pfas_name).copied()
    }

    pub fn is_pfas(&self, name: &str) -> bool {
        self.lookup_by_name(name)
            .is_some_and(|m| m.kind == Kind::Pfas)
    }

    pub fn pfas(&self) -> impl Iterator<Item = &'static Molecule> {
        MOLECULES.iter().filter(|m| m.kind == Kind::Pfas)
    }

    pub fn adsorbers(&self) -> impl Iterator<Item = &'static Molecule> {
        MOLECULES.iter().filter(|m| m.kind == Kind::Adsorber)
    }

    pub fn molecules(&self) -> impl Iterator<Item = &'static Molecule> {
        MOLECULES.iter()
    }
}
