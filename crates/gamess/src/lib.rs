use std::{io, path::Path};

pub mod find;
pub mod input;
pub mod logfile;
pub mod opt2hes;
pub mod plot;
pub mod templates;


/// build a `Vec<String>` of lines, each terminated by a newline. mostly useful
/// for writing tests against [read_lines] output
#[macro_export]
macro_rules! lines {
    ($($line:expr),* $(,)?) => ({
        vec![$(format!("{}\n", $line),)*] as Vec<String>
    });
}

/// read the file at `path` into its lines. unlike [str::lines], each line keeps
/// its terminator so that the lines can be edited and written back out
/// verbatim
pub fn read_lines(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents.split_inclusive('\n').map(String::from).collect())
}

/// strip every whitespace character from `s`, including the ones in the middle
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}
