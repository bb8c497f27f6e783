use alloc::vec::Vec;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

use classify_format::ClassifyFormat;

use crate::{Classify, ClassifyError, ClassifyOptions, Reader, Writer};

// -----------------------------------------------------------------------------
// Classifier

/// Entry point bundling a format and the options of every call.
///
/// # Examples
///
/// ```
/// use classify_engine::{Classifier, Classify, XmlFormat};
///
/// #[derive(Classify, Default, Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let classifier = Classifier::new(XmlFormat);
/// let element = classifier.to_element(&Point { x: 1, y: -2 }).unwrap();
/// assert_eq!(element.name, "Point");
///
/// let point: Point = classifier.from_element(&element).unwrap();
/// assert_eq!(point, Point { x: 1, y: -2 });
/// ```
#[derive(Debug, Clone, Default)]
pub struct Classifier<F> {
    format: F,
    options: ClassifyOptions,
}

impl<F: ClassifyFormat> Classifier<F> {
    #[inline]
    pub fn new(format: F) -> Self {
        Self {
            format,
            options: ClassifyOptions::default(),
        }
    }

    #[inline]
    pub fn with_options(mut self, options: ClassifyOptions) -> Self {
        self.options = options;
        self
    }

    #[inline]
    pub fn format(&self) -> &F {
        &self.format
    }

    #[inline]
    pub fn options(&self) -> &ClassifyOptions {
        &self.options
    }

    #[inline]
    pub fn options_mut(&mut self) -> &mut ClassifyOptions {
        &mut self.options
    }

    // -------------------------------------------------------------------------
    // In memory

    /// Writes `value` to an element named after its type.
    pub fn to_element<T: Classify>(&self, value: &T) -> Result<F::Element, ClassifyError> {
        self.to_named_element(value, &T::type_name())
    }

    /// Writes `value` to an element named `tag`.
    pub fn to_named_element<T: Classify>(&self, value: &T, tag: &str) -> Result<F::Element, ClassifyError> {
        Writer::new(&self.format, &self.options).write_root(value, tag)
    }

    pub fn from_element<T: Classify>(&self, element: &F::Element) -> Result<T, ClassifyError> {
        Reader::new(&self.format, &self.options).read_root(element)
    }

    pub fn to_bytes<T: Classify>(&self, value: &T) -> Result<Vec<u8>, ClassifyError> {
        let element = self.to_element(value)?;
        let mut bytes = Vec::new();
        self.format.write_root(&element, &mut bytes)?;
        Ok(bytes)
    }

    pub fn from_bytes<T: Classify>(&self, mut bytes: &[u8]) -> Result<T, ClassifyError> {
        let element = self.format.read_root(&mut bytes)?;
        self.from_element(&element)
    }

    // -------------------------------------------------------------------------
    // Files

    /// Writes `value` to `path`, creating missing directories.
    ///
    /// Satellites of evaluated follow-id fields go next to the file unless a
    /// base directory is configured.
    pub fn write_to_file<T: Classify>(&self, value: &T, path: impl AsRef<Path>) -> Result<(), ClassifyError> {
        let path = path.as_ref();
        let options = self.file_options(path);
        let element = Writer::new(&self.format, &options).write_root(value, &T::type_name())?;

        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(|err| ClassifyError::io(dir, err))?;
        }
        let file = File::create(path).map_err(|err| ClassifyError::io(path, err))?;
        let mut out = BufWriter::new(file);
        self.format.write_root(&element, &mut out)?;
        out.flush().map_err(|err| ClassifyError::io(path, err))
    }

    /// Reads a value from `path`.
    ///
    /// Follow-id fields load their satellites relative to the file unless a
    /// base directory is configured.
    pub fn read_from_file<T: Classify>(&self, path: impl AsRef<Path>) -> Result<T, ClassifyError> {
        let path = path.as_ref();
        let options = self.file_options(path);

        let file = File::open(path).map_err(|err| ClassifyError::io(path, err))?;
        let element = self.format.read_root(&mut BufReader::new(file))?;
        Reader::new(&self.format, &options).read_root(&element)
    }

    fn file_options(&self, path: &Path) -> ClassifyOptions {
        let mut options = self.options.clone();
        if options.base_dir.is_none() {
            options.base_dir = Some(path.parent().unwrap_or(Path::new("")).to_path_buf());
        }
        options
    }
}
