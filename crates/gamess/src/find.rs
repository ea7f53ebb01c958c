//! Locating marker lines in files held in memory as ordered lines

/// Return the index of the first line in `lines` containing `target`, or
/// `None` if no line contains it. Pass a reversed iterator to find the last
/// match instead, keeping in mind that the returned index then counts from the
/// end.
pub fn find_line<I, S>(target: &str, lines: I) -> Option<usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .position(|line| line.as_ref().contains(target))
}
