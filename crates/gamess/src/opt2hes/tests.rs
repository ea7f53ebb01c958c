use std::{fs::read_to_string, path::Path};

use tempfile::tempdir;
use test_case::test_case;

use super::*;
use crate::lines;

/// ammonia optimization with the hydrogens listed before and after nitrogen
fn ammonia() -> Vec<String> {
    lines![
        " $CONTRL SCFTYP=RHF MULT=1 NPRINT=0 COORD=UNIQUE",
        "   RUNTYP=OPTIMIZE ICUT=12 ITOL=25 MAXIT=200 QMTTOL=1.0E-12",
        "   ICHARG=0 ISPHER=1 $END",
        " $SYSTEM MWORDS=500 MEMDDI=0 $END",
        " $STATPT OPTTOL=1.0E-06 NSTEP=150 $END",
        " $SCF DIRSCF=.TRUE. FDIFF=.FALSE. CONV=1.0E-08 $END",
        " $DATA",
        "ammonia",
        "C1",
        "H      1.0   0.0000000000   0.9400000000  -0.2700000000",
        "N      7.0   0.0000000000   0.0000000000   0.1100000000",
        "H      1.0   0.8100000000  -0.4700000000  -0.2700000000",
        "H      1.0  -0.8100000000  -0.4700000000  -0.2700000000",
        " $END",
    ]
}

/// the converged geometry in the order GAMESS prints it, with the trailing
/// blank line
fn coords() -> Vec<String> {
    lines![
        " N           7.0   0.0000000000   0.0000000000   0.1127514512",
        " H           1.0   0.0000000000   0.9376804420  -0.2646920514",
        " H           1.0   0.8120436901  -0.4688402210  -0.2646920514",
        " H           1.0  -0.8120436901  -0.4688402210  -0.2646920514",
        "",
    ]
}

const SEMINUM: &str = " $FORCE METHOD=SEMINUM NVIB=2 PROJCT=.TRUE. $END\n";
const FULLNUM: &str = " $FORCE METHOD=FULLNUM NVIB=2 PROJCT=.TRUE. $END\n";

#[test_case("H2O_SCF_CCD_opt.inp", FULLNUM; "default")]
#[test_case("H2O_B3LYP_CCD_opt.inp", SEMINUM; "b3lyp")]
#[test_case("NH3_MP2_CCT_opt.inp", SEMINUM; "mp2")]
#[test_case("IBv6_NH3_CCSD-T_CC6_opt.inp", FULLNUM; "cc6")]
#[test_case("NH3_CCSD-T_CC5_opt.inp", FULLNUM; "cc5")]
#[test_case("NH3_B3LYP_PCseg-4_opt.inp", FULLNUM; "pcseg4")]
#[test_case("NH3_MP2_CC6_opt.inp", FULLNUM; "cc6 overrides mp2")]
fn force_from_filename(name: &str, want: &str) {
    assert_eq!(ForceMethod::from_filename(name).force_line(), want);
}

#[test]
fn force_from_tags() {
    use MethodTag::*;
    assert_eq!(ForceMethod::from_tags(&[]), ForceMethod::FullyNumerical);
    assert_eq!(ForceMethod::from_tags(&[Mp2]), ForceMethod::SemiNumerical);
    assert_eq!(
        ForceMethod::from_tags(&[B3lyp, Mp2]),
        ForceMethod::SemiNumerical
    );
    // the order of the tags themselves does not matter
    assert_eq!(
        ForceMethod::from_tags(&[Cc6, Mp2]),
        ForceMethod::FullyNumerical
    );
    assert_eq!(MethodTag::from_filename("NH3_MP2_CC6_opt.inp"), [Mp2, Cc6]);
}

#[test]
fn force_from_str() {
    assert_eq!(
        "seminum".parse::<ForceMethod>(),
        Ok(ForceMethod::SemiNumerical)
    );
    assert_eq!(
        "FULLNUM".parse::<ForceMethod>(),
        Ok(ForceMethod::FullyNumerical)
    );
    assert!("analytic".parse::<ForceMethod>().is_err());
}

#[test_case(" N           7.0   0.0000000000", "N7")]
#[test_case("CL    17.0   1.0000000000", "CL17")]
#[test_case("H 1.0 0.0 0.0 0.0\n", "H1")]
#[test_case("no decimals here\n", "nodecimalshere")]
fn key(line: &str, want: &str) {
    assert_eq!(match_key(line), want);
}

#[test]
fn no_numgrd() {
    let inp = ammonia();
    let got =
        convert_to_hessian(&inp, &coords(), ForceMethod::FullyNumerical)
            .unwrap();

    assert_eq!(got.len(), inp.len() + 1);
    let scf = find_line("$SCF", &got).unwrap();
    assert_eq!(got[scf - 1], FULLNUM);
    assert_eq!(
        got[1],
        "   RUNTYP=HESSIAN ICUT=12 ITOL=25 MAXIT=200 QMTTOL=1.0E-12\n"
    );

    // nothing else changes outside of $DATA
    let data = find_line("$DATA", &got).unwrap();
    for (i, line) in got[..data].iter().enumerate() {
        match i {
            1 => continue,
            i if i < scf - 1 => assert_eq!(line, &inp[i]),
            i if i == scf - 1 => continue,
            i => assert_eq!(line, &inp[i - 1]),
        }
    }
}

#[test]
fn positions_kept() {
    let got =
        convert_to_hessian(&ammonia(), &coords(), ForceMethod::FullyNumerical)
            .unwrap();
    let want = coords();
    let data = find_line("$DATA", &got).unwrap();
    assert_eq!(got[data + 1], "ammonia\n");
    assert_eq!(got[data + 2], "C1\n");
    assert_eq!(got[data + 3], want[1]);
    assert_eq!(got[data + 4], want[0]);
    assert_eq!(got[data + 5], want[2]);
    assert_eq!(got[data + 6], want[3]);
    assert_eq!(got[data + 7], " $END\n");
}

#[test]
fn numgrd_removed() {
    let mut inp = ammonia();
    inp[2] = String::from("   ICHARG=0 NUMGRD=.TRUE. ISPHER=1 $END\n");
    let got =
        convert_to_hessian(&inp, &coords(), ForceMethod::SemiNumerical)
            .unwrap();
    assert_eq!(got[2], "   ICHARG=0  ISPHER=1 $END\n");

    inp[2] = String::from("   ICHARG=0 ISPHER=1 NUMGRD=.T. $END\n");
    let got =
        convert_to_hessian(&inp, &coords(), ForceMethod::SemiNumerical)
            .unwrap();
    assert_eq!(got[2], "   ICHARG=0 ISPHER=1  $END\n");
    assert!(find_line("NUMGRD", &got).is_none());
}

#[test]
fn force_already_present() {
    let mut inp = ammonia();
    inp.insert(3, FULLNUM.to_owned());
    let got = convert_to_hessian(&inp, &coords(), ForceMethod::FullyNumerical)
        .unwrap();
    assert_eq!(got.len(), inp.len());
    assert_eq!(got.iter().filter(|l| l.contains("$FORCE")).count(), 1);
}

#[test]
fn force_replaced() {
    let mut inp = ammonia();
    inp.insert(3, FULLNUM.to_owned());
    let got = convert_to_hessian(&inp, &coords(), ForceMethod::SemiNumerical)
        .unwrap();
    assert_eq!(got.len(), inp.len());
    assert_eq!(got[3], SEMINUM);
    assert_eq!(got.iter().filter(|l| l.contains("$FORCE")).count(), 1);
}

#[test_case(1, "   RUNTYP=ENERGY\n", OPTIMIZE; "runtyp")]
#[test_case(5, "\n", SCF; "scf")]
#[test_case(6, "\n", DATA; "data")]
fn missing_marker(line: usize, with: &str, want: &'static str) {
    let mut inp = ammonia();
    inp[line] = with.to_owned();
    assert_eq!(
        convert_to_hessian(&inp, &coords(), ForceMethod::FullyNumerical),
        Err(Opt2HesError::MissingMarker(want))
    );
}

#[test]
fn no_match() {
    let mut coords = coords();
    coords.push(String::from(
        " O           8.0   0.0000000000   0.0000000000   0.1193170000\n",
    ));
    assert_eq!(
        convert_to_hessian(&ammonia(), &coords, ForceMethod::FullyNumerical),
        Err(Opt2HesError::NoMatchingCoordinate(String::from(
            " O           8.0   0.0000000000   0.0000000000   0.1193170000"
        )))
    );
}

#[test]
fn substitution_idempotent() {
    let mut once =
        convert_to_hessian(&ammonia(), &coords(), ForceMethod::FullyNumerical)
            .unwrap();
    let want = once.clone();

    // rerunning on the substituted file gives the same file back
    substitute_coordinates(&mut once, &coords()).unwrap();
    assert_eq!(once, want);

    // but a block with one more atom than the file runs out of candidates
    let mut extra = coords();
    extra.insert(1, extra[1].clone());
    assert_eq!(
        substitute_coordinates(&mut once, &extra),
        Err(Opt2HesError::NoMatchingCoordinate(
            extra[4].trim_end().to_owned()
        ))
    );
}

#[test]
fn filenames() {
    assert_eq!(
        hessian_filename(Path::new("run_opt/NH3_MP2_CCD_opt.inp")),
        Ok(PathBuf::from("run_opt/NH3_MP2_CCD_hes.inp"))
    );
    assert_eq!(
        hessian_filename(Path::new("NH3.inp")),
        Err(Opt2HesError::NotAnOptFile(String::from("NH3.inp")))
    );
}

/// copy `files` from testfiles into a fresh temporary directory
fn scratch(files: &[&str]) -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    for file in files {
        std::fs::copy(Path::new("testfiles").join(file), dir.path().join(file))
            .unwrap();
    }
    dir
}

#[test_case("NH3_CCSD-T_CC6"; "cc6")]
#[test_case("H2O_MP2_CCD"; "mp2")]
fn end_to_end(stem: &str) {
    let opt = format!("{stem}_opt.inp");
    let log = format!("{stem}_opt.log");
    let dir = scratch(&[opt.as_str(), log.as_str()]);
    let optfile = dir.path().join(&opt);

    let got = opt2hes(&optfile, dir.path().join(&log)).unwrap();

    assert_eq!(got, dir.path().join(format!("{stem}_hes.inp")));
    let want = read_to_string(format!("testfiles/{stem}_hes.want")).unwrap();
    assert_eq!(read_to_string(&got).unwrap(), want);
    // the optimization input is untouched
    assert_eq!(
        read_to_string(&optfile).unwrap(),
        read_to_string(Path::new("testfiles").join(&opt)).unwrap()
    );
}

#[test]
fn method_override() {
    let dir = scratch(&["H2O_MP2_CCD_opt.inp", "H2O_MP2_CCD_opt.log"]);
    let got = opt2hes_with(
        dir.path().join("H2O_MP2_CCD_opt.inp"),
        dir.path().join("H2O_MP2_CCD_opt.log"),
        Some(ForceMethod::FullyNumerical),
    )
    .unwrap();
    let got = read_to_string(got).unwrap();
    assert!(got.contains(FULLNUM));
    assert!(!got.contains("SEMINUM"));
}

#[test]
fn unfinished_log() {
    let dir = scratch(&["H2O_MP2_CCD_opt.inp", "unfinished_opt.log"]);
    let got = opt2hes(
        dir.path().join("H2O_MP2_CCD_opt.inp"),
        dir.path().join("unfinished_opt.log"),
    );
    assert_eq!(got, Err(Opt2HesError::Log(LogError::NoEquilibrium)));
    assert!(!dir.path().join("H2O_MP2_CCD_hes.inp").exists());
}

#[test]
fn missing_log() {
    let dir = scratch(&["H2O_MP2_CCD_opt.inp"]);
    let log = dir.path().join("H2O_MP2_CCD_opt.log");
    let got = opt2hes(dir.path().join("H2O_MP2_CCD_opt.inp"), &log);
    assert_eq!(
        got,
        Err(Opt2HesError::ReadFileError(
            log.display().to_string(),
            ErrorKind::NotFound
        ))
    );
}
