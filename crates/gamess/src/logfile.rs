//! Reading the converged geometry out of a GAMESS optimization log

use std::{error::Error, fmt::Display};

use crate::find::find_line;

/// printed once the optimizer has converged
pub const HEAD_MARKER: &str = "***** EQUILIBRIUM GEOMETRY LOCATED *****";

/// printed before every full listing of the geometry. the last one closes the
/// block of symmetry unique coordinates following [HEAD_MARKER]
pub const TAIL_MARKER: &str = "COORDINATES OF ALL ATOMS ARE";

/// the marker itself, the COORDINATES OF SYMMETRY UNIQUE ATOMS line, the column
/// labels, and the dashed separator
const HEADER_LINES: usize = 4;

#[derive(Debug, PartialEq, Eq)]
pub enum LogError {
    /// the log never reached [HEAD_MARKER]
    NoEquilibrium,
    /// the log has no [TAIL_MARKER] at all
    NoCoordinates,
    /// the last [TAIL_MARKER] comes before the coordinates that should follow
    /// [HEAD_MARKER]
    Truncated { head: usize, tail: usize },
}

impl Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for LogError {}

/// Return the lines of `log` holding the equilibrium geometry. The block starts
/// [HEADER_LINES] after the first [HEAD_MARKER] and ends before the last
/// [TAIL_MARKER], so it includes the blank line GAMESS prints before the tail.
///
/// Only the first head marker is considered, so `log` should come from a single
/// optimization run.
pub fn extract_coordinates<S: AsRef<str>>(
    log: &[S],
) -> Result<&[S], LogError> {
    let head = find_line(HEAD_MARKER, log).ok_or(LogError::NoEquilibrium)?
        + HEADER_LINES;
    let tail = log.len()
        - find_line(TAIL_MARKER, log.iter().rev())
            .ok_or(LogError::NoCoordinates)?
        - 1;
    if tail < head {
        return Err(LogError::Truncated { head, tail });
    }
    log::debug!("found equilibrium coordinates on lines {head}..{tail}");
    Ok(&log[head..tail])
}
