//! XML entry points with default options.
//!
//! Use a [`Classifier`] to change the options.

use std::path::Path;

use classify_engine::{Classifier, Classify, ClassifyError, XmlElement, XmlFormat};

#[inline]
fn classifier() -> Classifier<XmlFormat> {
    Classifier::new(XmlFormat)
}

/// Writes `value` to an element named after its type.
///
/// # Examples
///
/// ```
/// use classify::Classify;
///
/// #[derive(Classify, Default, Debug, PartialEq)]
/// struct Tag {
///     label: String,
/// }
///
/// let tag = Tag { label: "new".into() };
/// let element = classify::xml::to_element(&tag).unwrap();
/// assert_eq!(element.name, "Tag");
/// assert_eq!(classify::xml::from_element::<Tag>(&element).unwrap(), tag);
/// ```
pub fn to_element<T: Classify>(value: &T) -> Result<XmlElement, ClassifyError> {
    classifier().to_element(value)
}

pub fn from_element<T: Classify>(element: &XmlElement) -> Result<T, ClassifyError> {
    classifier().from_element(element)
}

/// Writes `value` to `path`. Satellites go next to the file.
pub fn write_to_file<T: Classify>(value: &T, path: impl AsRef<Path>) -> Result<(), ClassifyError> {
    classifier().write_to_file(value, path)
}

/// Reads a value from `path`. Satellites are loaded relative to the file.
pub fn read_from_file<T: Classify>(path: impl AsRef<Path>) -> Result<T, ClassifyError> {
    classifier().read_from_file(path)
}

#[cfg(test)]
mod tests {
    use std::string::String;

    use crate::{Classify, Deferred};

    #[derive(Classify, Default)]
    struct Album {
        title: String,
        #[classify(follow_id)]
        cover: Deferred<Photo>,
    }

    #[derive(Classify, Default, Debug, PartialEq)]
    struct Photo {
        #[classify(captures_id)]
        name: String,
        width: u32,
    }

    #[test]
    fn files_and_satellites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("album.xml");
        let album = Album {
            title: "trip".into(),
            cover: Deferred::new("beach", Photo { width: 640, ..Photo::default() }),
        };
        super::write_to_file(&album, &path).unwrap();
        assert!(dir.path().join("Photo").join("beach.xml").is_file());

        let album: Album = super::read_from_file(&path).unwrap();
        assert_eq!(album.title, "trip");
        let cover = album.cover.value().unwrap();
        assert_eq!(cover.name, "beach");
        assert_eq!(cover.width, 640);
    }
}
