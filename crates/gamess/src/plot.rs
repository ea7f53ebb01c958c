//! Histograms and scatter plots of numeric results, written as SVG files

use std::{error::Error, fmt::Display, ops::Range, path::PathBuf};

use log::info;
use plotters::prelude::*;


#[derive(Debug, PartialEq)]
pub enum PlotError {
    /// `token` on line `line` of the data is not a finite number
    ParseError { line: usize, token: String },
    /// line `line` has `got` fields, but the first data line had `want`
    Ragged { line: usize, want: usize, got: usize },
    NoData,
    MissingColumn(usize),
    LengthMismatch(usize, usize),
    ZeroBins,
    Draw(String),
}

impl Display for PlotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for PlotError {}

/// The fixed set of knobs shared by [make_histogram] and [make_scatter]
#[derive(Clone, Debug, PartialEq)]
pub struct PlotOptions {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub output: PathBuf,
    /// width and height in pixels
    pub size: (u32, u32),
    /// number of histogram bins
    pub bins: usize,
    /// radius of scatter points in pixels
    pub point_size: u32,
}

impl PlotOptions {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            output: output.into(),
            size: (800, 600),
            bins: 10,
            point_size: 3,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    pub fn y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    pub fn point_size(mut self, point_size: u32) -> Self {
        self.point_size = point_size;
        self
    }
}

/// Split a table of numbers into its columns. Fields are separated by commas,
/// whitespace, or both. Blank lines and anything after a `#` are ignored, and
/// every remaining line must have as many fields as the first.
pub fn prep_data(text: &str) -> Result<Vec<Vec<f64>>, PlotError> {
    let mut cols: Vec<Vec<f64>> = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.split_once('#').map_or(line, |(data, _)| data);
        let fields: Vec<_> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();
        if fields.is_empty() {
            continue;
        }
        if cols.is_empty() {
            cols.resize(fields.len(), Vec::new());
        } else if fields.len() != cols.len() {
            return Err(PlotError::Ragged {
                line: i + 1,
                want: cols.len(),
                got: fields.len(),
            });
        }
        for (col, field) in cols.iter_mut().zip(fields) {
            let v = field
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| PlotError::ParseError {
                    line: i + 1,
                    token: field.to_owned(),
                })?;
            col.push(v);
        }
    }
    if cols.is_empty() {
        return Err(PlotError::NoData);
    }
    Ok(cols)
}

/// column `n` of the result of [prep_data]
pub fn column(cols: &[Vec<f64>], n: usize) -> Result<&[f64], PlotError> {
    cols.get(n)
        .map(Vec::as_slice)
        .ok_or(PlotError::MissingColumn(n))
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Sort `values` into `bins` equal-width bins spanning their range. Every bin
/// is closed on the left and open on the right except the last, which also
/// holds the maximum. When all of the values are equal there is a single bin
/// of width one centered on them.
pub fn bin_counts(values: &[f64], bins: usize) -> Result<Vec<Bin>, PlotError> {
    if bins == 0 {
        return Err(PlotError::ZeroBins);
    }
    let (min, max) = bounds(values).ok_or(PlotError::NoData)?;
    if min == max {
        return Ok(vec![Bin {
            start: min - 0.5,
            end: min + 0.5,
            count: values.len(),
        }]);
    }
    let width = (max - min) / bins as f64;
    let mut ret: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();
    // the last bin ends exactly at max rather than at the accumulated sum
    ret[bins - 1].end = max;
    for v in values {
        let i = (((v - min) / width) as usize).min(bins - 1);
        ret[i].count += 1;
    }
    Ok(ret)
}

fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// widen [min, max] by 5% on each side, or by 0.5 if it is empty
fn padded(min: f64, max: f64) -> Range<f64> {
    let pad = if min == max { 0.5 } else { 0.05 * (max - min) };
    min - pad..max + pad
}

/// Draw a histogram of `values` with `opts.bins` bins to `opts.output`
pub fn make_histogram(
    values: &[f64],
    opts: &PlotOptions,
) -> Result<(), PlotError> {
    let bins = bin_counts(values, opts.bins)?;
    draw_histogram(&bins, opts).map_err(|e| PlotError::Draw(e.to_string()))?;
    info!("wrote histogram to {}", opts.output.display());
    Ok(())
}

fn draw_histogram(
    bins: &[Bin],
    opts: &PlotOptions,
) -> Result<(), Box<dyn Error>> {
    let x_range = bins[0].start..bins[bins.len() - 1].end;
    let y_max = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);

    let root = SVGBackend::new(&opts.output, opts.size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(&opts.title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, 0.0..1.1 * y_max as f64)?;

    chart
        .configure_mesh()
        .x_desc(&opts.x_label)
        .y_desc(&opts.y_label)
        .draw()?;

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new(
            [(b.start, 0.0), (b.end, b.count as f64)],
            BLUE.mix(0.6).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Draw the points `(x[i], y[i])` to `opts.output`
pub fn make_scatter(
    x: &[f64],
    y: &[f64],
    opts: &PlotOptions,
) -> Result<(), PlotError> {
    if x.len() != y.len() {
        return Err(PlotError::LengthMismatch(x.len(), y.len()));
    }
    let (x0, x1) = bounds(x).ok_or(PlotError::NoData)?;
    let (y0, y1) = bounds(y).ok_or(PlotError::NoData)?;
    draw_scatter(x, y, padded(x0, x1), padded(y0, y1), opts)
        .map_err(|e| PlotError::Draw(e.to_string()))?;
    info!("wrote scatter plot to {}", opts.output.display());
    Ok(())
}

fn draw_scatter(
    x: &[f64],
    y: &[f64],
    x_range: Range<f64>,
    y_range: Range<f64>,
    opts: &PlotOptions,
) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(&opts.output, opts.size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(&opts.title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(&opts.x_label)
        .y_desc(&opts.y_label)
        .draw()?;

    chart.draw_series(
        x.iter()
            .zip(y)
            .map(|(&x, &y)| Circle::new((x, y), opts.point_size, RED.filled())),
    )?;

    root.present()?;
    Ok(())
}
