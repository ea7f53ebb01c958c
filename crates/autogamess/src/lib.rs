use gamess::plot::{PlotError, column, make_histogram, make_scatter, prep_data};

use crate::config::{Config, PlotKind};

pub mod config;

/// print the message to stderr and exit with status 1
#[macro_export]
macro_rules! die {
    ($($t:tt)*) => {{
        eprintln!($($t)*);
        std::process::exit(1)
    }};
}

/// Render the plot described by `config`. Histograms use column
/// `config.x_column` of the data, while scatter plots pair it with
/// `config.y_column`.
pub fn plot(config: &Config) -> Result<(), PlotError> {
    let cols = prep_data(&config.data)?;
    let opts = config.options();
    let x = column(&cols, config.x_column)?;
    match config.kind {
        PlotKind::Histogram => make_histogram(x, &opts),
        PlotKind::Scatter => {
            let y = column(&cols, config.y_column)?;
            make_scatter(x, y, &opts)
        }
    }
}
