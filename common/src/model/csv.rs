use serde::{Deserialize, Serialize};

/// Field separator detected for an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    Comma,
    Semicolon,
}

impl Delimiter {
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
        }
    }
}

/// A named column of an uploaded file.
///
/// `column` is the position the name was read from in the header row, which
/// is also the position of its values in every data row. Header cells that are
/// blank are not columns, so `column` may skip positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub column: usize,
}
