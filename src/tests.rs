use crate::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn molfile(body: &[&str]) -> String {
    let mut text = String::from("\n  molcrab\n\n  0  0  0     0  0            999 V3000\n");
    for line in body {
        text.push_str(line);
        text.push('\n');
    }
    text.push_str("M  END\n");
    text
}

fn ctab(counts: &str, atoms: &[&str], bonds: &[&str], extra: &[&str]) -> String {
    let mut body = vec!["M  V30 BEGIN CTAB".to_owned(), format!("M  V30 COUNTS {}", counts)];
    body.push("M  V30 BEGIN ATOM".to_owned());
    body.extend(atoms.iter().map(|a| format!("M  V30 {}", a)));
    body.push("M  V30 END ATOM".to_owned());
    if !bonds.is_empty() {
        body.push("M  V30 BEGIN BOND".to_owned());
        body.extend(bonds.iter().map(|b| format!("M  V30 {}", b)));
        body.push("M  V30 END BOND".to_owned());
    }
    body.extend(extra.iter().map(|e| e.to_string()));
    body.push("M  V30 END CTAB".to_owned());
    let refs: Vec<&str> = body.iter().map(String::as_str).collect();
    molfile(&refs)
}

fn by_id(molfile: &Molfile, id: u32) -> &Atom {
    let idx = molfile.mol.atom_by_id(id).unwrap();
    molfile.mol.atom(idx)
}

#[test]
fn flat_triangle_is_two_dimensional() {
    let text = ctab(
        "3 3 0 0 0",
        &["1 C 0 0 0 0", "2 C 1 0 0 0", "3 C 0.5 0.87 0 0"],
        &["1 1 1 2", "2 1 2 3", "3 1 3 1"],
        &[],
    );
    let molfile = read_v3000(&text).unwrap();
    assert_eq!(molfile.dimensionality, Dimensionality::TwoD);
    for id in 1..=3 {
        let atom = by_id(&molfile, id);
        assert_eq!(atom.hydrogen_count, 2);
        assert_eq!(atom.valence, Some(4));
        assert!(atom.position_2d.is_some());
        assert!(atom.position_3d.is_none());
    }
}

#[test]
fn deuterium_is_hydrogen_two() {
    let text = ctab("1 0 0 0 0", &["1 D 0 0 0 0"], &[], &[]);
    let molfile = read_v3000(&text).unwrap();
    let atom = by_id(&molfile, 1);
    assert_eq!(atom.atomic_num(), 1);
    assert_eq!(atom.isotope, 2);
}

#[test]
fn attach_any_adds_one_multicenter_group() {
    let text = ctab(
        "7 6 0 0 0",
        &[
            "1 C 0 0 0 0",
            "2 C 1 1 0 0",
            "3 C 2 1 0 0",
            "4 C 3 1 0 0",
            "5 C 4 1 0 0",
            "6 C 5 1 0 0",
            "7 O 6 1 0 0",
        ],
        &[
            "1 1 1 2 ENDPTS=(2 5 6) ATTACH=ANY",
            "2 1 2 3",
            "3 1 3 4",
            "4 1 4 5",
            "5 1 5 6",
            "6 1 6 7",
        ],
        &[],
    );
    let molfile = read_v3000(&text).unwrap();
    let sgroups = molfile.mol.sgroups();
    assert_eq!(sgroups.len(), 1);
    let sgroup = &sgroups[0];
    assert_eq!(sgroup.kind, SgroupKind::ExtMulticenter);
    assert_eq!(sgroup.bonds, vec![molfile.mol.bond_by_id(1).unwrap()]);
    let ids: Vec<u32> = sgroup.atoms.iter().map(|&a| molfile.mol.atom(a).id).collect();
    assert_eq!(ids, [1, 5, 6]);
}

#[test]
fn unflagged_stereocenter_is_racemic() {
    let text = ctab(
        "4 3 0 0 0",
        &[
            "1 C 0 0 0 0",
            "2 F 0 1.5 0 0",
            "3 Cl 1.3 -0.75 0 0",
            "4 Br -1.3 -0.75 0 0",
        ],
        &["1 1 1 2 CFG=1", "2 1 1 3", "3 1 1 4"],
        &[],
    );
    let molfile = read_v3000(&text).unwrap();
    assert!(!molfile.chiral);
    let elements = molfile.mol.tetrahedral_stereo();
    assert_eq!(elements.len(), 1);
    assert_eq!(
        elements[0].group,
        Some(StereoGroup::new(StereoGroupKind::Racemic, 1))
    );
}

#[test]
fn chiral_flag_leaves_stereocenter_untagged() {
    let text = ctab(
        "4 3 0 0 1",
        &[
            "1 C 0 0 0 0",
            "2 F 0 1.5 0 0",
            "3 Cl 1.3 -0.75 0 0",
            "4 Br -1.3 -0.75 0 0",
        ],
        &["1 1 1 2 CFG=3", "2 1 1 3", "3 1 1 4"],
        &[],
    );
    let molfile = read_v3000(&text).unwrap();
    assert!(molfile.chiral);
    let elements = molfile.mol.tetrahedral_stereo();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].group, None);
}

#[test]
fn missing_3000_marker_is_rejected() {
    let text = "title\n\n\n  1  0  0  0  0  0  0  0  0  0999 V2000\n";
    let err = read_v3000(text).unwrap_err();
    assert!(matches!(err, MolfileError::Format { line: 4, .. }));
    assert!(err.to_string().contains("not a V3000 molfile"));
}

#[test]
fn undeclared_bond_endpoint_is_rejected() {
    let text = ctab(
        "2 1 0 0 0",
        &["1 C 0 0 0 0", "2 C 1 1 0 0"],
        &["1 1 1 3"],
        &[],
    );
    let err = read_v3000(&text).unwrap_err();
    assert!(matches!(err, MolfileError::Format { line: 12, .. }));
}

#[test]
fn endpoints_follow_declaration_order() {
    let text = ctab(
        "3 2 0 0 0",
        &["1 C 0 0 0 0", "2 O 1 1 0 0", "3 N 2 1 0 0"],
        &["1 1 2 1", "2 2 3 2"],
        &[],
    );
    let molfile = read_v3000(&text).unwrap();
    let mol = &molfile.mol;
    for (bond_id, begin, end) in [(1, 2, 1), (2, 3, 2)] {
        let (a, b) = mol.bond_endpoints(mol.bond_by_id(bond_id).unwrap()).unwrap();
        assert_eq!((mol.atom(a).id, mol.atom(b).id), (begin, end));
    }
}

#[test]
fn continued_records_read_like_single_lines() {
    let joined = ctab(
        "2 1 0 0 0",
        &["1 C 0 0 0 0 CHG=-1 MASS=13", "2 O 1.2 0.7 0 0"],
        &["1 2 1 2"],
        &[],
    );
    let split = ctab(
        "2 1 0 0 0",
        &[
            "1 C 0 0 -\nM  V30 0 0 CHG=-1 -\nM  V30 MASS=13",
            "2 O 1.2 0.7 0 0",
        ],
        &["1 2 1 -\nM  V30 2"],
        &[],
    );
    let a = read_v3000(&joined).unwrap();
    let b = read_v3000(&split).unwrap();
    assert_eq!(a.mol.atom_count(), b.mol.atom_count());
    assert_eq!(a.mol.bond_count(), b.mol.bond_count());
    for id in 1..=2 {
        assert_eq!(by_id(&a, id), by_id(&b, id));
    }
    assert_eq!(by_id(&b, 1).isotope, 13);
    assert_eq!(by_id(&b, 1).formal_charge, -1);
}

#[test]
fn duplicate_atom_ids_resolve_to_the_last() {
    let text = ctab(
        "3 1 0 0 0",
        &["1 C 0 0 0 0", "2 N 1 1 0 0", "2 O 2 1 0 0"],
        &["1 1 1 2"],
        &[],
    );
    let molfile = read_v3000(&text).unwrap();
    let mol = &molfile.mol;
    assert_eq!(mol.atom_count(), 3);
    let bond = mol.bond_by_id(1).unwrap();
    let (_, end) = mol.bond_endpoints(bond).unwrap();
    assert_eq!(mol.atom(end).element(), Some(Element::O));
}

#[test]
fn sparse_ids_resolve() {
    let text = ctab(
        "2 1 0 0 0",
        &["7 C 0 0 0 0", "500 C 1 1 0 0"],
        &["90 1 500 7"],
        &[],
    );
    let molfile = read_v3000(&text).unwrap();
    let mol = &molfile.mol;
    let (a, b) = mol.bond_endpoints(mol.bond_by_id(90).unwrap()).unwrap();
    assert_eq!((mol.atom(a).id, mol.atom(b).id), (500, 7));
}

#[test]
fn largest_ids_resolve() {
    let text = ctab(
        "2 1 0 0 0",
        &["4294967295 C 0 0 0 0", "1 O 1 1 0 0"],
        &["4294967295 1 1 4294967295"],
        &[],
    );
    let molfile = read_v3000(&text).unwrap();
    let mol = &molfile.mol;
    let bond = mol.bond_by_id(u32::MAX).unwrap();
    let (a, b) = mol.bond_endpoints(bond).unwrap();
    assert_eq!((mol.atom(a).id, mol.atom(b).id), (1, u32::MAX));
    assert_eq!(by_id(&molfile, u32::MAX).hydrogen_count, 3);
}

#[test]
fn valence_round_trip() {
    let text = ctab(
        "6 5 0 0 0",
        &[
            "1 C 0 0 0 0",
            "2 C 1 1 0 0",
            "3 N 2 1 0 0 CHG=1",
            "4 O 3 1 0 0 CHG=-1",
            "5 S 4 1 0 0 VAL=6",
            "6 C 5 1 0 0 RAD=2",
        ],
        &["1 2 1 2", "2 1 2 3", "3 1 3 4", "4 1 3 5", "5 1 5 6"],
        &[],
    );
    let molfile = read_v3000(&text).unwrap();
    let mol = &molfile.mol;
    for idx in mol.atoms() {
        let atom = mol.atom(idx);
        let order_sum = valence::bond_order_sum(mol, idx).unwrap();
        let unpaired = mol.single_electron_count(idx) as u8;
        assert_eq!(
            Some(order_sum + atom.hydrogen_count + unpaired),
            atom.valence,
            "atom {}",
            atom.id
        );
    }
    assert_eq!(by_id(&molfile, 5).hydrogen_count, 4);
    assert_eq!(by_id(&molfile, 6).hydrogen_count, 2);
}

#[test]
fn unknown_commands_and_sgroups_warn() {
    init_tracing();
    let text = ctab(
        "1 0 1 0 0",
        &["1 C 0 0 0 0"],
        &[],
        &[
            "M  V30 BEGIN SGROUP",
            "M  V30 1 DAT 0 ATOMS=(1 1) FIELDNAME=pKa",
            "M  V30 END SGROUP",
            "M  V30 LINKNODE 1 2 2 1 2",
        ],
    );
    let molfile = read_v3000(&text).unwrap();
    let kinds: Vec<_> = molfile.warnings.iter().map(|w| w.kind.clone()).collect();
    assert_eq!(
        kinds,
        [
            WarningKind::UnsupportedSgroup("DAT".into()),
            WarningKind::UnknownCommand("LINKNODE 1 2 2 1 2".into()),
        ]
    );
    assert!(molfile.mol.sgroups().is_empty());
}

#[test]
fn strict_mode_rejects_unknown_elements() {
    init_tracing();
    let text = ctab("1 0 0 0 0", &["1 Xy 0 0 0 0"], &[], &[]);
    let relaxed = read_v3000(&text).unwrap();
    assert_eq!(by_id(&relaxed, 1).kind, AtomKind::Unknown("Xy".into()));

    let strict = ReaderOptions::default().with_mode(Mode::Strict);
    assert!(read_v3000_with(&text, &strict).is_err());
}

#[test]
fn stereo_can_be_disabled() {
    let text = ctab(
        "4 3 0 0 0",
        &[
            "1 C 0 0 0 0",
            "2 F 0 1.5 0 0",
            "3 Cl 1.3 -0.75 0 0",
            "4 Br -1.3 -0.75 0 0",
        ],
        &["1 1 1 2 CFG=1", "2 1 1 3", "3 1 1 4"],
        &[],
    );
    let options = ReaderOptions::default().with_add_stereo_elements(false);
    let molfile = read_v3000_with(&text, &options).unwrap();
    assert!(molfile.mol.tetrahedral_stereo().is_empty());
}

#[test]
fn force_3d_keeps_parity_stereo() {
    let text = ctab(
        "4 3 0 0 1",
        &[
            "1 C 0 0 0 0 CFG=1",
            "2 F 0 0 0 0",
            "3 Cl 0 0 0 0",
            "4 Br 0 0 0 0",
        ],
        &["1 1 1 2", "2 1 1 3", "3 1 1 4"],
        &[],
    );
    let plain = read_v3000(&text).unwrap();
    let options = ReaderOptions::default().with_force_3d(true);
    let forced = read_v3000_with(&text, &options).unwrap();
    assert_eq!(forced.dimensionality, Dimensionality::ZeroD);
    assert_eq!(by_id(&forced, 1).position_3d, Some([0.0, 0.0, 0.0]));
    let elements = forced.mol.tetrahedral_stereo();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].winding, plain.mol.tetrahedral_stereo()[0].winding);
}

#[test]
fn headerless_input() {
    let text = "M  V30 BEGIN CTAB\n\
                M  V30 COUNTS 1 0 0 0 0\n\
                M  V30 BEGIN ATOM\n\
                M  V30 1 O 0 0 0 0\n\
                M  V30 END ATOM\n\
                M  V30 END CTAB\n";
    let molfile = read_v3000(text).unwrap();
    assert_eq!(molfile.mol.title(), None);
    assert_eq!(molfile.dimensionality, Dimensionality::ZeroD);
    assert_eq!(by_id(&molfile, 1).hydrogen_count, 2);
}

#[test]
fn truncated_input_is_rejected() {
    let text = "M  V30 BEGIN CTAB\nM  V30 BEGIN ATOM\nM  V30 1 C 0 0 0 0\n";
    let err = read_v3000(text).unwrap_err();
    assert!(err.to_string().contains("unexpected end of file"));
}

#[test]
fn io_errors_are_reported() {
    struct Failing;
    impl std::io::Read for Failing {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "unplugged"))
        }
    }
    let err = read_v3000_from(std::io::BufReader::new(Failing), &ReaderOptions::default())
        .unwrap_err();
    assert!(matches!(err, MolfileError::Io { line: 1, .. }));
}
