//! GAMESS(US) input parameters.
//!
//! An [Input] collects the values of the `$CONTRL`, `$SYSTEM`, `$STATPT`, and
//! `$SCF` groups, plus the optional `$DFT` and `$BASIS` groups, either from a
//! named [Template] or from an existing input file, and writes them back out
//! as the header of a new input file.

use std::{
    collections::HashMap,
    error::Error,
    fmt::Display,
    io::ErrorKind,
    iter::once,
    path::Path,
    str::FromStr,
    sync::LazyLock,
};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::templates::{Template, Templates};


/// GAMESS ignores anything past column 80, so groups are wrapped well before
/// that
const WIDTH: usize = 72;

static GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\$([a-z]+)\b(.*?)\$END").unwrap());

#[derive(Debug, PartialEq, Eq)]
pub enum InputError {
    ReadFileError(String, ErrorKind),
    WriteFileError(String, ErrorKind),
    UnknownTemplate(String),
    MissingGroup(&'static str),
    MissingKey {
        group: &'static str,
        key: &'static str,
    },
}

impl Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for InputError {}

/// the value given for `key` among the whitespace-separated `KEY=VALUE` pairs
/// in `params`. keys are case-insensitive like in GAMESS, and a key has to
/// start a token, so `MULT` is not found in `XMULT=3`
fn find_value<'a>(params: &'a str, key: &str) -> Option<&'a str> {
    let mut tokens = params.split_whitespace();
    while let Some(tok) = tokens.next() {
        let Some((k, v)) = tok.split_once('=') else {
            continue;
        };
        if k.eq_ignore_ascii_case(key) {
            // allow for a space after the =
            return if v.is_empty() { tokens.next() } else { Some(v) };
        }
    }
    None
}

/// define a struct for one input group, with a `String` field for each
/// required key and an `Option<String>` for each optional one
macro_rules! group {
    (
        $(#[$meta:meta])*
        $name:ident, $group:literal,
        required { $($field:ident => $key:literal),* $(,)? }
        optional { $($ofield:ident => $okey:literal),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            $(pub $field: String,)*
            $(
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $ofield: Option<String>,
            )*
        }

        impl $name {
            pub const NAME: &'static str = $group;

            /// extract the values of this group from the `KEY=VALUE` pairs in
            /// `params`. every required key must be present
            pub fn new(params: &str) -> Result<Self, InputError> {
                Ok(Self {
                    $($field: find_value(params, $key)
                        .ok_or(InputError::MissingKey {
                            group: $group,
                            key: $key,
                        })?
                        .to_owned(),)*
                    $($ofield: find_value(params, $okey).map(str::to_owned),)*
                })
            }

            #[allow(unused_mut)]
            fn pairs(&self) -> Vec<(&'static str, &str)> {
                let mut ret = vec![$(($key, self.$field.as_str()),)*];
                $(
                    if let Some(v) = &self.$ofield {
                        ret.push(($okey, v.as_str()));
                    }
                )*
                ret
            }
        }
    };
}

group! {
    /// the `$CONTRL` group describing the kind of calculation
    Control, "$CONTRL",
    required {
        scftyp => "SCFTYP",
        mult => "MULT",
        nprint => "NPRINT",
        coord => "COORD",
        runtyp => "RUNTYP",
        icut => "ICUT",
        itol => "ITOL",
        maxit => "MAXIT",
        qmttol => "QMTTOL",
        icharg => "ICHARG",
        ispher => "ISPHER",
    }
    optional {
        dfttyp => "DFTTYP",
        mplevl => "MPLEVL",
        cctyp => "CCTYP",
        numgrd => "NUMGRD",
    }
}

group! {
    /// memory and time limits
    System, "$SYSTEM",
    required {
        mwords => "MWORDS",
        memddi => "MEMDDI",
    }
    optional {}
}

group! {
    /// geometry search settings
    Statpt, "$STATPT",
    required {
        opttol => "OPTTOL",
        nstep => "NSTEP",
    }
    optional {}
}

group! {
    Scf, "$SCF",
    required {
        dirscf => "DIRSCF",
        fdiff => "FDIFF",
        conv => "CONV",
    }
    optional {}
}

group! {
    /// integration grid for DFT calculations
    Dft, "$DFT",
    required {
        method => "METHOD",
    }
    optional {
        nrad => "NRAD",
        nleb => "NLEB",
    }
}

group! {
    Basis, "$BASIS",
    required {
        gbasis => "GBASIS",
    }
    optional {
        ngauss => "NGAUSS",
        ndfunc => "NDFUNC",
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub control: Control,
    pub system: System,
    pub statpt: Statpt,
    pub scf: Scf,
    pub dft: Option<Dft>,
    pub basis: Option<Basis>,
}

impl Input {
    /// Build an [Input] from `src`, which is either the name of one of the
    /// built-in [Templates] or the path to a `.txt` file holding GAMESS
    /// groups
    pub fn new(src: &str) -> Result<Self, InputError> {
        Self::with_templates(src, Templates::builtin())
    }

    /// like [Input::new], but looking template names up in `templates`
    pub fn with_templates(
        src: &str,
        templates: &Templates,
    ) -> Result<Self, InputError> {
        if Path::new(src).extension().is_some_and(|ext| ext == "txt") {
            Self::load(src)
        } else {
            Self::from_template(src, templates)
        }
    }

    pub fn from_template(
        name: &str,
        templates: &Templates,
    ) -> Result<Self, InputError> {
        let template = templates
            .get(name)
            .ok_or_else(|| InputError::UnknownTemplate(name.to_owned()))?;
        Self::try_from(template)
    }

    /// load the groups of the GAMESS input file at `path`. the file does not
    /// need to be a `.txt` file, so any existing input file works too
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        std::fs::read_to_string(path)
            .map_err(|e| {
                InputError::ReadFileError(path.display().to_string(), e.kind())
            })?
            .parse()
    }

    /// the groups of `self` preceded by a comment line containing `version`
    pub fn to_inp(&self, version: &str) -> String {
        format!("!{version}\n!\n{self}")
    }

    /// Write [Input::to_inp] to `path`. The result can be read back in with
    /// [Input::load].
    pub fn write_inp(
        &self,
        path: impl AsRef<Path>,
        version: &str,
    ) -> Result<(), InputError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_inp(version)).map_err(|e| {
            InputError::WriteFileError(path.display().to_string(), e.kind())
        })
    }
}

impl TryFrom<&Template> for Input {
    type Error = InputError;

    fn try_from(t: &Template) -> Result<Self, Self::Error> {
        Ok(Self {
            control: Control::new(&t.control)?,
            system: System::new(&t.system)?,
            statpt: Statpt::new(&t.statpt)?,
            scf: Scf::new(&t.scf)?,
            dft: t.dft.as_deref().map(Dft::new).transpose()?,
            basis: t.basis.as_deref().map(Basis::new).transpose()?,
        })
    }
}

impl FromStr for Input {
    type Err = InputError;

    /// collect the body of every `$NAME ... $END` group in `s`, skipping `!`
    /// comment lines. a group given more than once is treated as one long
    /// group
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .lines()
            .filter(|line| !line.trim_start().starts_with('!'))
            .collect::<Vec<_>>()
            .join("\n");
        let mut groups: HashMap<String, String> = HashMap::new();
        for cap in GROUP.captures_iter(&body) {
            let group = groups.entry(format!("${}", &cap[1]).to_uppercase());
            let group = group.or_default();
            group.push(' ');
            group.push_str(&cap[2]);
        }
        let required = |name: &'static str| {
            groups
                .get(name)
                .map(String::as_str)
                .ok_or(InputError::MissingGroup(name))
        };
        Ok(Self {
            control: Control::new(required(Control::NAME)?)?,
            system: System::new(required(System::NAME)?)?,
            statpt: Statpt::new(required(Statpt::NAME)?)?,
            scf: Scf::new(required(Scf::NAME)?)?,
            dft: groups.get(Dft::NAME).map(|g| Dft::new(g)).transpose()?,
            basis: groups
                .get(Basis::NAME)
                .map(|g| Basis::new(g))
                .transpose()?,
        })
    }
}

/// write one group, starting new lines as needed to stay within [WIDTH]
fn write_group(
    f: &mut std::fmt::Formatter<'_>,
    name: &str,
    pairs: &[(&str, &str)],
) -> std::fmt::Result {
    let mut line = format!(" {name}");
    let tokens = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .chain(once(String::from("$END")));
    for tok in tokens {
        if line.len() + 1 + tok.len() > WIDTH {
            writeln!(f, "{line}")?;
            line = String::from(" ");
        }
        line.push(' ');
        line.push_str(&tok);
    }
    writeln!(f, "{line}")
}

impl Display for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_group(f, Control::NAME, &self.control.pairs())?;
        write_group(f, System::NAME, &self.system.pairs())?;
        write_group(f, Statpt::NAME, &self.statpt.pairs())?;
        write_group(f, Scf::NAME, &self.scf.pairs())?;
        if let Some(dft) = &self.dft {
            write_group(f, Dft::NAME, &dft.pairs())?;
        }
        if let Some(basis) = &self.basis {
            write_group(f, Basis::NAME, &basis.pairs())?;
        }
        Ok(())
    }
}
