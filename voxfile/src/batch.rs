use std::path::{Path, PathBuf};

/// One text of a batch file and where its audio goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    /// 1-based index among the non-empty lines
    pub index: usize,
    pub text: String,
    pub output: PathBuf,
}

/// Split `contents` into items, one per non-empty line
///
/// Outputs are named `<prefix>_NNN` under `output_dir` (or relative if none),
/// leaving the extension to the output writer.
pub fn items(contents: &str, output_dir: Option<&Path>, prefix: &str) -> Vec<BatchItem> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, text)| {
            let index = i + 1;
            let name = format!("{prefix}_{index:03}");
            let output = output_dir.map_or_else(|| PathBuf::from(&name), |dir| dir.join(&name));

            BatchItem {
                index,
                text: text.to_owned(),
                output,
            }
        })
        .collect()
}

/// Outcome counts of a batch run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
}

impl Summary {
    pub const fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}
