/// The supported manifest formats.
///
/// Each variant maps to a concrete `ManifestEncoder` implementation. With the
/// `cli` feature the enum doubles as a `clap` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ManifestFormat {
    /// Comma-separated values with a fixed header row.
    #[default]
    Csv,

    /// A single JSON array of segment objects.
    Json,
}

impl ManifestFormat {
    /// File name of the manifest inside the output directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Csv => "metadata.csv",
            Self::Json => "metadata.json",
        }
    }
}
