//! Configuration settings for drawing a plot

use std::{
    error::Error,
    fmt::Display,
    fs::read_to_string,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use gamess::plot::PlotOptions;
use serde::Deserialize;


#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    ReadFileError(String, ErrorKind),
    ParseError(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for ConfigError {}

/// Data can either be a literal table in the config file, or the name of a
/// file to be loaded
#[derive(Clone, Deserialize, PartialEq, Debug)]
#[serde(untagged)]
enum DataSrc {
    Literal(String),
    File { file: String },
}

impl TryFrom<DataSrc> for String {
    type Error = ConfigError;

    fn try_from(value: DataSrc) -> Result<Self, Self::Error> {
        match value {
            DataSrc::Literal(s) => Ok(s),
            DataSrc::File { file } => read_to_string(&file)
                .map_err(|e| ConfigError::ReadFileError(file, e.kind())),
        }
    }
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum PlotKind {
    #[serde(alias = "histogram")]
    Histogram,
    #[serde(alias = "scatter")]
    Scatter,
}

impl Display for PlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlotKind::Histogram => write!(f, "histogram"),
            PlotKind::Scatter => write!(f, "scatter"),
        }
    }
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    /// The kind of plot to draw, either "histogram" or "scatter"
    kind: PlotKind,

    /// The numbers to plot, as a table with one row per line and the columns
    /// separated by commas or whitespace. Lines starting with # are ignored.
    data: DataSrc,

    /// The SVG file to write
    output: String,

    /// Caption drawn above the plot. Defaults to no caption.
    title: Option<String>,

    x_label: Option<String>,

    y_label: Option<String>,

    /// Width and height of the image in pixels. Defaults to [800, 600].
    size: Option<[u32; 2]>,

    /// The number of histogram bins. Defaults to 10 and must be at least 1.
    bins: Option<usize>,

    /// Radius of scatter plot points in pixels. Defaults to 3.
    point_size: Option<u32>,

    /// The column of `data` to use for the x values, counting from 0. Defaults
    /// to 0.
    x_column: Option<usize>,

    /// The column of `data` to use for the y values of a scatter plot.
    /// Defaults to 1.
    y_column: Option<usize>,
}

/// Construct a full `Config` using [Config::load] on a TOML file or use
/// [Config::new] and the Builder pattern
#[derive(Clone, Deserialize, PartialEq, Debug)]
#[serde(try_from = "RawConfig")]
pub struct Config {
    pub kind: PlotKind,

    /// the table of numbers to plot, parsed by [gamess::plot::prep_data]
    pub data: String,

    pub output: PathBuf,

    pub title: String,

    pub x_label: String,

    pub y_label: String,

    pub size: (u32, u32),

    pub bins: usize,

    pub point_size: u32,

    pub x_column: usize,

    pub y_column: usize,
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(rc: RawConfig) -> Result<Self, Self::Error> {
        let bins = rc.bins.unwrap_or(10);
        if bins == 0 {
            return Err(ConfigError::ParseError(String::from(
                "bins must be greater than zero",
            )));
        }
        let [width, height] = rc.size.unwrap_or([800, 600]);
        Ok(Self {
            kind: rc.kind,
            data: rc.data.try_into()?,
            output: PathBuf::from(rc.output),
            title: rc.title.unwrap_or_default(),
            x_label: rc.x_label.unwrap_or_default(),
            y_label: rc.y_label.unwrap_or_default(),
            size: (width, height),
            bins,
            point_size: rc.point_size.unwrap_or(3),
            x_column: rc.x_column.unwrap_or(0),
            y_column: rc.y_column.unwrap_or(1),
        })
    }
}

impl Config {
    /// Construct a [Config] with no title or axis labels, a size of 800x600,
    /// 10 bins, points 3 pixels across, and x and y values taken from the first
    /// two columns of `data`
    pub fn new(
        kind: PlotKind,
        data: impl Into<String>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            kind,
            data: data.into(),
            output: output.into(),
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            size: (800, 600),
            bins: 10,
            point_size: 3,
            x_column: 0,
            y_column: 1,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    pub fn columns(mut self, x: usize, y: usize) -> Self {
        self.x_column = x;
        self.y_column = y;
        self
    }

    /// load a [Config] from the TOML file specified by `filename`
    pub fn load(filename: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let filename = filename.as_ref();
        let contents = read_to_string(filename).map_err(|e| {
            ConfigError::ReadFileError(filename.display().to_string(), e.kind())
        })?;
        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// the [PlotOptions] corresponding to `self`
    pub fn options(&self) -> PlotOptions {
        let (width, height) = self.size;
        PlotOptions::new(&self.output)
            .title(&self.title)
            .x_label(&self.x_label)
            .y_label(&self.y_label)
            .size(width, height)
            .bins(self.bins)
            .point_size(self.point_size)
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Config {
            kind,
            data,
            output,
            title,
            x_label,
            y_label,
            size: (width, height),
            bins,
            point_size,
            x_column,
            y_column,
        } = self;
        write!(
            f,
            "
Configuration Options:
kind = {kind}
output = {}
title = {title}
x_label = {x_label}
y_label = {y_label}
size = {width}x{height}
bins = {bins}
point_size = {point_size}
x_column = {x_column}
y_column = {y_column}
data = {} lines
",
            output.display(),
            data.lines().count(),
        )
    }
}
