//! Turn a finished geometry optimization into a hessian job.
//!
//! Given the input file of an optimization and the log it produced, [opt2hes]
//! writes a new input file that reruns the job as a hessian calculation at the
//! converged geometry. The original input file is never modified.

use std::{
    error::Error,
    ffi::OsStr,
    fmt::Display,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};

use log::{debug, info, warn};

use crate::{
    find::find_line,
    logfile::{LogError, extract_coordinates},
    read_lines, strip_whitespace,
};

#[cfg(test)]
mod tests;

pub const OPTIMIZE: &str = "=OPTIMIZE";
pub const HESSIAN: &str = "=HESSIAN";

/// both spellings of the numerical gradient flag, in the order they are
/// removed
pub const NUMGRD: [&str; 2] = ["NUMGRD=.TRUE.", "NUMGRD=.T."];

const FORCE: &str = "$FORCE";
const SCF: &str = "$SCF";
const DATA: &str = "$DATA";

/// file name fragments identifying optimization and hessian input files
const OPT_ID: &str = "_opt";
const HES_ID: &str = "_hes";

#[derive(Debug, PartialEq, Eq)]
pub enum Opt2HesError {
    ReadFileError(String, ErrorKind),
    WriteFileError(String, ErrorKind),
    Log(LogError),
    /// a line the conversion has to edit is missing from the input file
    MissingMarker(&'static str),
    /// no line of the $DATA group matches this coordinate line from the log
    NoMatchingCoordinate(String),
    /// the input file name has no `_opt` to turn into `_hes`
    NotAnOptFile(String),
}

impl Display for Opt2HesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for Opt2HesError {}

impl From<LogError> for Opt2HesError {
    fn from(value: LogError) -> Self {
        Self::Log(value)
    }
}

/// How GAMESS should compute the hessian
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForceMethod {
    /// finite differences of analytic gradients
    SemiNumerical,
    /// finite differences of energies
    FullyNumerical,
}

impl ForceMethod {
    /// the value of the METHOD keyword in the $FORCE group
    pub fn keyword(&self) -> &'static str {
        match self {
            ForceMethod::SemiNumerical => "SEMINUM",
            ForceMethod::FullyNumerical => "FULLNUM",
        }
    }

    /// the full $FORCE line, including its newline
    pub fn force_line(&self) -> String {
        format!(" $FORCE METHOD={} NVIB=2 PROJCT=.TRUE. $END\n", self.keyword())
    }

    /// Choose the method for a job declared with `tags`. Without any tags the
    /// default is [ForceMethod::FullyNumerical]. Otherwise every tag present is
    /// applied in the order of [METHOD_TABLE], so a coupled cluster or large
    /// basis tag overrides a B3LYP or MP2 tag.
    pub fn from_tags(tags: &[MethodTag]) -> Self {
        let mut ret = ForceMethod::FullyNumerical;
        for (tag, _, method) in METHOD_TABLE {
            if tags.contains(&tag) {
                ret = method;
            }
        }
        ret
    }

    /// shorthand for [ForceMethod::from_tags] on [MethodTag::from_filename]
    pub fn from_filename(name: &str) -> Self {
        Self::from_tags(&MethodTag::from_filename(name))
    }
}

impl Display for ForceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword().to_lowercase())
    }
}

impl FromStr for ForceMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SEMINUM" => Ok(Self::SemiNumerical),
            "FULLNUM" => Ok(Self::FullyNumerical),
            _ => Err(format!(
                "unrecognized force method `{s}`, expected seminum or fullnum"
            )),
        }
    }
}

/// The methods and basis sets that decide the [ForceMethod]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodTag {
    B3lyp,
    Mp2,
    Cc5,
    Cc6,
    PcSeg4,
}

/// each tag with the file name fragment that declares it and the method it
/// asks for. order matters, see [ForceMethod::from_tags]
pub const METHOD_TABLE: [(MethodTag, &str, ForceMethod); 5] = [
    (MethodTag::B3lyp, "_B3LYP_", ForceMethod::SemiNumerical),
    (MethodTag::Mp2, "_MP2_", ForceMethod::SemiNumerical),
    (MethodTag::Cc5, "_CC5_", ForceMethod::FullyNumerical),
    (MethodTag::Cc6, "_CC6_", ForceMethod::FullyNumerical),
    (MethodTag::PcSeg4, "_PCseg-4_", ForceMethod::FullyNumerical),
];

impl MethodTag {
    /// the tags whose markers appear in `name`, like `IBv6_NH3_MP2_CC6_opt.inp`
    pub fn from_filename(name: &str) -> Vec<Self> {
        METHOD_TABLE
            .iter()
            .filter(|(_, marker, _)| name.contains(marker))
            .map(|(tag, _, _)| *tag)
            .collect()
    }
}

/// The part of a coordinate line used to pair it with a line of the $DATA
/// group: everything before the first `.0`, which is normally the atom label
/// and its nuclear charge, with the whitespace removed. ` N  7.0  0.0 ...`
/// gives `N7`.
///
/// Atoms of the same element share a key, so they are paired with the $DATA
/// lines of that element in order.
pub fn match_key(coord: &str) -> String {
    let prefix = coord.split_once(".0").map_or(coord, |(k, _)| k);
    strip_whitespace(prefix)
}

/// Convert the lines of an optimization input file into those of a hessian
/// input file by applying [set_runtype], [remove_numgrd], [insert_force_line],
/// and [substitute_coordinates] in that order. The force line goes in before
/// the coordinates so the line numbers of the $DATA group stay valid.
///
/// `input` is left untouched and the edited copy is returned.
pub fn convert_to_hessian<S: AsRef<str>>(
    input: &[String],
    coords: &[S],
    force: ForceMethod,
) -> Result<Vec<String>, Opt2HesError> {
    let mut inp = input.to_vec();
    set_runtype(&mut inp)?;
    remove_numgrd(&mut inp);
    insert_force_line(&mut inp, force)?;
    substitute_coordinates(&mut inp, coords)?;
    Ok(inp)
}

/// replace the `=OPTIMIZE` on the first line containing it with `=HESSIAN`
pub fn set_runtype(inp: &mut [String]) -> Result<(), Opt2HesError> {
    let i = find_line(OPTIMIZE, &*inp)
        .ok_or(Opt2HesError::MissingMarker(OPTIMIZE))?;
    inp[i] = inp[i].replace(OPTIMIZE, HESSIAN);
    debug!("set run type on line {i}");
    Ok(())
}

/// strip each spelling of [NUMGRD] from the first line containing it, leaving
/// the rest of the line alone. a missing flag is not an error
pub fn remove_numgrd(inp: &mut [String]) {
    for flag in NUMGRD {
        if let Some(i) = find_line(flag, &*inp) {
            inp[i] = inp[i].replace(flag, "");
            debug!("removed {flag} from line {i}");
        }
    }
}

/// Insert the $FORCE line for `force` before the first line containing $SCF,
/// unless it is already there. An existing $FORCE line asking for a different
/// method is overwritten instead, so the file never ends up with two.
pub fn insert_force_line(
    inp: &mut Vec<String>,
    force: ForceMethod,
) -> Result<(), Opt2HesError> {
    let line = force.force_line();
    if find_line(line.trim(), &*inp).is_some() {
        return Ok(());
    }
    if let Some(i) = find_line(FORCE, &*inp) {
        warn!("replacing `{}` with `{}`", inp[i].trim(), line.trim());
        inp[i] = line;
    } else {
        let i =
            find_line(SCF, &*inp).ok_or(Opt2HesError::MissingMarker(SCF))?;
        inp.insert(i, line);
        debug!("inserted {FORCE} line at line {i}");
    }
    Ok(())
}

/// Write each line of `coords` over the first line from $DATA onward whose
/// whitespace-free text contains its [match_key]. Every line can be replaced
/// only once, so atoms of the same element fill the lines of that element in
/// order. Blank lines in `coords` are skipped.
///
/// A coordinate line without a candidate is an error rather than a silently
/// misplaced atom. `inp` may be partially updated in that case.
pub fn substitute_coordinates<S: AsRef<str>>(
    inp: &mut [String],
    coords: &[S],
) -> Result<(), Opt2HesError> {
    let start =
        find_line(DATA, &*inp).ok_or(Opt2HesError::MissingMarker(DATA))?;
    // whitespace-free copies of the candidates, paired with their line numbers
    // in `inp`
    let mut region: Vec<(usize, String)> = inp[start..]
        .iter()
        .enumerate()
        .map(|(i, line)| (start + i, strip_whitespace(line)))
        .collect();
    for coord in coords {
        let coord = coord.as_ref();
        if coord.trim().is_empty() {
            continue;
        }
        let key = match_key(coord);
        let Some(pos) = find_line(&key, region.iter().map(|(_, l)| l)) else {
            return Err(Opt2HesError::NoMatchingCoordinate(
                coord.trim_end().to_owned(),
            ));
        };
        let (j, _) = region.remove(pos);
        debug!("replacing line {j} with coordinates for {key}");
        inp[j] = coord.to_owned();
        if !inp[j].ends_with('\n') {
            inp[j].push('\n');
        }
    }
    Ok(())
}

/// the name of the hessian input file corresponding to `optfile`: the `_opt`
/// in its file name becomes `_hes`. the directory is left alone
pub fn hessian_filename(optfile: &Path) -> Result<PathBuf, Opt2HesError> {
    let not_opt = || Opt2HesError::NotAnOptFile(optfile.display().to_string());
    let name = optfile
        .file_name()
        .and_then(OsStr::to_str)
        .ok_or_else(not_opt)?;
    if !name.contains(OPT_ID) {
        return Err(not_opt());
    }
    Ok(optfile.with_file_name(name.replace(OPT_ID, HES_ID)))
}

/// Write the hessian input file for the optimization input `optfile` using the
/// equilibrium geometry from `logfile`. The [ForceMethod] is taken from the
/// [MethodTag]s in the name of `optfile`. Returns the path of the new file,
/// see [hessian_filename].
pub fn opt2hes(
    optfile: impl AsRef<Path>,
    logfile: impl AsRef<Path>,
) -> Result<PathBuf, Opt2HesError> {
    opt2hes_with(optfile, logfile, None)
}

/// like [opt2hes], but `method` overrides the method derived from the file
/// name when it is `Some`
pub fn opt2hes_with(
    optfile: impl AsRef<Path>,
    logfile: impl AsRef<Path>,
    method: Option<ForceMethod>,
) -> Result<PathBuf, Opt2HesError> {
    let optfile = optfile.as_ref();
    let logfile = logfile.as_ref();
    let hesfile = hessian_filename(optfile)?;
    let force = method.unwrap_or_else(|| {
        let name = optfile.file_name().unwrap_or_default().to_string_lossy();
        ForceMethod::from_filename(&name)
    });

    let log = read(logfile)?;
    let coords = extract_coordinates(&log)?;
    let inp = read(optfile)?;
    let hes = convert_to_hessian(&inp, coords, force)?;

    std::fs::write(&hesfile, hes.concat()).map_err(|e| {
        Opt2HesError::WriteFileError(hesfile.display().to_string(), e.kind())
    })?;
    info!("wrote {} with METHOD={}", hesfile.display(), force.keyword());

    Ok(hesfile)
}

fn read(path: &Path) -> Result<Vec<String>, Opt2HesError> {
    read_lines(path).map_err(|e| {
        Opt2HesError::ReadFileError(path.display().to_string(), e.kind())
    })
}
