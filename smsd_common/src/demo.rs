//! Built-in demo input set.

/// Molecules compared by the demo driver when no inputs are given.
pub const DEMO_SMILES: &[&str] = &[
    "O=C(OCCN(C)C)C=C",
    "O=C(O)C3N1C(=O)CC1S(=O)(=O)C3(C)(CN2N=NC=C2)",
    "O=NN2C=C(C=1C=CC=CC=12)CCO",
    "O=NN(C=1C=CC=CC=1)C",
    "O=C=NC1=CC=CC(N=C=O)=C1C",
    "O=C1C=C(OC2=CC(OCC(=O)OCC)=CC=C12)C3=CC=CC=C3",
    "N1=C(NC(=C1C=2C=CC=CC=2)C=3C=CC=CC=3)C4=CC=C(OC)C=C4",
    "O=C5C=1C=CC=CC=1N(C3=C5(C(O)=CC=2OC(CC=23)C4(OC4)(C)))C",
    "C=1C(=C(C=C(C=1Cl)Cl)Cl)Cl",
    "O=C(NC1=CC=CC(=C1)Br)C=2C=C([N+](=O)[O-])SC=2",
    "C1=CC=CC=C1",
    "C1=CC=NC=C1",
    "CCO",
    "C1=CC=NC=C1",
    "C1=CC=C(C=C1)C1=CC=CC=C1",
    "C1=CC=C(C=C1)[N+]1=CC=CC=C1",
    "C1=CC2=C3C(C=CC=N3=CC=C2)=C1",
    "C1=CC2=CC=C(C=C2C=C1)C1=C2C=CC=CC2=CC=C1",
    "C1=CC2=C(C=C1)C=CC=C2",
];
