use phf::{Map, Set, phf_map, phf_set};

static BACKBONE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "N", "CA", "C", "O",
};

static WATER_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "HOH", "WAT", "SOL", "H2O", "HHO", "OHH", "OH2", "DOD", "D2O",
    "TIP", "TIP2", "TIP3", "TIP4", "TIP5", "T3P", "T4P", "T5P", "SPC", "SPCE",
};

static PROTEIN_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE",
    "LEU", "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
    // Protonation and naming variants used by common force fields.
    "ASH", "GLH", "LYN", "CYX", "CYM", "HID", "HIE", "HIP", "HSD", "HSE", "HSP",
    "MSE", "SEC", "PYL", "ACE", "NME", "NMA",
    "NALA", "CALA",
};

/// Single-atom ion residues and their element symbols.
static ION_ELEMENTS: Map<&'static str, &'static str> = phf_map! {
    "NA" => "NA", "NA+" => "NA", "SOD" => "NA",
    "K" => "K", "K+" => "K", "POT" => "K",
    "CL" => "CL", "CL-" => "CL", "CLA" => "CL",
    "MG" => "MG", "MG2" => "MG",
    "CA" => "CA", "CAL" => "CA", "CA2" => "CA",
    "ZN" => "ZN", "ZN2" => "ZN",
    "LI" => "LI", "RB" => "RB", "CS" => "CS",
    "MN" => "MN", "FE" => "FE", "FE2" => "FE",
    "CU" => "CU", "CO" => "CO", "NI" => "NI", "CD" => "CD",
    "BR" => "BR", "IOD" => "I",
};

pub fn is_backbone_atom(atom_name: &str) -> bool {
    BACKBONE_ATOM_NAMES.contains(atom_name.trim())
}

pub fn is_water_residue(residue_name: &str) -> bool {
    WATER_RESIDUE_NAMES.contains(residue_name.trim().to_ascii_uppercase().as_str())
}

pub fn is_protein_residue(residue_name: &str) -> bool {
    PROTEIN_RESIDUE_NAMES.contains(residue_name.trim().to_ascii_uppercase().as_str())
}

/// Guesses the element symbol when the element columns are blank.
///
/// Atoms of known ion residues take the ion's symbol; everything else takes
/// the first letter of the atom name.
pub fn infer_element(atom_name: &str, residue_name: &str) -> String {
    if let Some(element) = ION_ELEMENTS.get(residue_name.trim().to_ascii_uppercase().as_str()) {
        return (*element).to_string();
    }
    atom_name
        .trim()
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}
