use common::model::csv::Delimiter;

/// Lines inspected when guessing the delimiter.
pub const SAMPLE_LINES: usize = 3;

/// Picks the delimiter from the first lines of a file.
///
/// Raw `,` and `;` are counted without looking at quotes; semicolon wins only
/// when it is strictly more frequent. Never fails: an empty sample is comma.
pub fn detect_delimiter<S: AsRef<str>>(lines: &[S]) -> Delimiter {
    let (commas, semicolons) = lines
        .iter()
        .take(SAMPLE_LINES)
        .flat_map(|line| line.as_ref().chars())
        .fold((0usize, 0usize), |(c, s), ch| match ch {
            ',' => (c + 1, s),
            ';' => (c, s + 1),
            _ => (c, s),
        });

    if semicolons > commas {
        Delimiter::Semicolon
    } else {
        Delimiter::Comma
    }
}
