use crate::error::DatasetError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub const ALL: [Split; 2] = [Split::Train, Split::Test];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Split::Train => "TRAIN",
            Split::Test => "TEST",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WasteClass {
    /// `O`
    Organic,
    /// `R`
    Recyclable,
}

impl WasteClass {
    /// Ordered as a directory-driven loader indexes them: O = 0, R = 1.
    pub const ALL: [WasteClass; 2] = [WasteClass::Organic, WasteClass::Recyclable];

    pub fn dir_name(&self) -> &'static str {
        match self {
            WasteClass::Organic => "O",
            WasteClass::Recyclable => "R",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            WasteClass::Organic => 0,
            WasteClass::Recyclable => 1,
        }
    }
}

impl fmt::Display for WasteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitCounts {
    pub organic: usize,
    pub recyclable: usize,
}

impl SplitCounts {
    pub fn total(&self) -> usize {
        self.organic + self.recyclable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatasetSummary {
    pub train: SplitCounts,
    pub test: SplitCounts,
}

impl DatasetSummary {
    pub fn split(&self, split: Split) -> SplitCounts {
        match split {
            Split::Train => self.train,
            Split::Test => self.test,
        }
    }

    pub fn total(&self) -> usize {
        self.train.total() + self.test.total()
    }
}

/// Paths of a dataset rooted at `root`.
#[derive(Debug, Clone)]
pub struct DatasetLayout {
    root: PathBuf,
}

impl DatasetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    pub fn class_dir(&self, split: Split, class: WasteClass) -> PathBuf {
        self.root.join(split.dir_name()).join(class.dir_name())
    }

    /// Count the entries of every class directory.
    pub fn count(&self) -> Result<DatasetSummary, DatasetError> {
        self.ensure_root()?;

        let mut summary = DatasetSummary::default();
        for split in Split::ALL {
            let counts = SplitCounts {
                organic: self.count_class(split, WasteClass::Organic)?,
                recyclable: self.count_class(split, WasteClass::Recyclable)?,
            };
            tracing::debug!(
                split = %split,
                organic = counts.organic,
                recyclable = counts.recyclable,
                "Split counted"
            );
            match split {
                Split::Train => summary.train = counts,
                Split::Test => summary.test = counts,
            }
        }
        Ok(summary)
    }

    pub fn count_class(&self, split: Split, class: WasteClass) -> Result<usize, DatasetError> {
        Ok(self.entries(split, class)?.len())
    }

    /// File names in a class directory, sorted.
    pub fn entries(&self, split: Split, class: WasteClass) -> Result<Vec<String>, DatasetError> {
        self.ensure_root()?;

        let dir = self.class_dir(split, class);
        if !dir.is_dir() {
            return Err(DatasetError::MissingClassDir(dir));
        }

        let mut names = fs::read_dir(&dir)?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<Result<Vec<_>, _>>()?;
        names.sort();
        Ok(names)
    }

    /// Up to `n` distinct file names of one class, drawn without replacement.
    pub fn sample(
        &self,
        split: Split,
        class: WasteClass,
        n: usize,
        rng: &mut fastrand::Rng,
    ) -> Result<Vec<String>, DatasetError> {
        let names = self.entries(split, class)?;
        tracing::trace!(split = %split, class = %class, n, available = names.len(), "Sampling");
        Ok(rng.choose_multiple(names, n))
    }

    fn ensure_root(&self) -> Result<(), DatasetError> {
        if !self.exists() {
            return Err(DatasetError::MissingRoot(self.root.clone()));
        }
        Ok(())
    }
}
