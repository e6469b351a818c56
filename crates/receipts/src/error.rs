use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Input has no header row, or a header row and no data rows.
    EmptyInput,
    /// Required columns of the selected profile are absent from the header.
    MissingColumns { profile: String, columns: Vec<String> },
    /// A time value that none of the supported shapes can normalize.
    /// `record` is the 1-based data record number (header excluded).
    RowFormat { record: usize, column: String, value: String },
    /// Profile TOML parse / validation error.
    ProfileConfig(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => {
                write!(f, "input is empty: a header row and at least one data row are required")
            }
            Self::MissingColumns { profile, columns } => {
                write!(f, "profile '{profile}': missing required column(s): {}", columns.join(", "))
            }
            Self::RowFormat { record, column, value } => {
                write!(
                    f,
                    "record {record}: cannot interpret time '{value}' in column '{column}' \
                     (expected e.g. 13:05 or 130522)"
                )
            }
            Self::ProfileConfig(msg) => write!(f, "profile config error: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}
