//! Named sets of default parameters for building an [crate::input::Input]

use std::{
    collections::BTreeMap, error::Error, fmt::Display, io::ErrorKind,
    path::Path, sync::LazyLock,
};

use serde::{Deserialize, Serialize};

/// the templates shipped with the crate
static BUILTIN: LazyLock<Templates> = LazyLock::new(|| {
    toml::from_str(include_str!("templates.toml"))
        .expect("built-in templates should be valid TOML")
});

/// The parameters for each group of an input file, as `KEY=VALUE` pairs
/// separated by whitespace
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Template {
    pub control: String,
    pub system: String,
    pub statpt: String,
    pub scf: String,
    pub dft: Option<String>,
    pub basis: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TemplateError {
    ReadFileError(String, ErrorKind),
    ParseError(String),
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for TemplateError {}

/// A table of [Template]s keyed by name, deserialized from a TOML file with one
/// table per template:
///
/// ```toml
/// [optimize]
/// control = "SCFTYP=RHF MULT=1 NPRINT=0 COORD=UNIQUE RUNTYP=OPTIMIZE ..."
/// system = "MWORDS=500 MEMDDI=0"
/// statpt = "OPTTOL=1.0E-06 NSTEP=150"
/// scf = "DIRSCF=.TRUE. FDIFF=.FALSE. CONV=1.0E-08"
/// basis = "GBASIS=CCT"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Templates(BTreeMap<String, Template>);

impl Templates {
    /// the templates compiled into the crate: `optimize`, `hessian`, and
    /// `b3lyp`
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            TemplateError::ReadFileError(path.display().to_string(), e.kind())
        })?;
        contents.parse()
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.0.get(name)
    }

    /// the template names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, template: Template) {
        self.0.insert(name.into(), template);
    }
}

impl std::str::FromStr for Templates {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s).map_err(|e| TemplateError::ParseError(e.to_string()))
    }
}
