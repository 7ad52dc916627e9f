//! Test item sources: handcrafted cases and whole files
//!
//! Every source is a plain iterator of [`TestItem`]s. The random source lives
//! in [`super::random`].

use std::path::{Path, PathBuf};

use super::error::HarnessError;

/// One buffer to validate, with the placement it asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestItem {
    pub description: String,
    pub bytes: Vec<u8>,
    /// Desired offset from a 64-byte boundary, 0..=63
    pub alignment: usize,
    /// Measure `alignment` back from the end of the buffer instead
    pub align_end: bool,
}

impl TestItem {
    pub fn new(description: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            description: description.into(),
            bytes: bytes.into(),
            alignment: 0,
            align_end: false,
        }
    }
}

/// A handcrafted case together with the verdict a correct validator gives.
#[derive(Debug, Clone, Copy)]
pub struct StandardCase {
    pub description: &'static str,
    pub bytes: &'static [u8],
    pub valid: bool,
}

const fn case(description: &'static str, bytes: &'static [u8], valid: bool) -> StandardCase {
    StandardCase { description, bytes, valid }
}

const CREPE: &[u8] = b"cr\xC3\xAApe";

const STANDARD_CASES: &[StandardCase] = &[
    case("Hello", b"Hello", true),
    case("Letter followed by 0 byte", b"x\0", true),
    case("crepe with a ^ over the middle character", CREPE, true),
    case("a japanese character", &[0xE3, 0x81, 0x8C], true),
    case("largest character allowed under the RFC", &[0xF4, 0x8F, 0xBF, 0xBF], true),
    case("largest character allowed under the RFC, plus one", &[0xF4, 0x90, 0x80, 0x80], false),
    case("oversize null byte ('modified UTF-8')", &[0xC0, 0x80], false),
    case("char 255 encoded as 3 characters (it should be two)", &[0xE0, 0x83, 0xBF], false),
    case(
        "UTF-16 surrogates incorrectly encoded as CESU-8",
        &[0xED, 0xA0, 0x81, 0xED, 0xB0, 0x80],
        false,
    ),
    case("Previous CESU-8 example correctly coded as UTF-8", &[0xF0, 0x90, 0x90, 0x80], true),
    case("BOM character", &[0xEF, 0xBB, 0xBF], true),
    case("Empty string", &[], true),
    case("Memory scribble pattern, 0xFEFEFEFE", &[0xFE, 0xFE, 0xFE, 0xFE], false),
    case("First 2-byte character U+0080", &[0xC2, 0x80], true),
    case("Last 2-byte character U+07FF", &[0xDF, 0xBF], true),
    case("First 3-byte character U+0800", &[0xE0, 0xA0, 0x80], true),
    case("Last 3-byte character U+FFFF", &[0xEF, 0xBF, 0xBF], true),
    case("First 4-byte character U+10000", &[0xF0, 0x90, 0x80, 0x80], true),
    case("Last character before the surrogates U+D7FF", &[0xED, 0x9F, 0xBF], true),
    case("First character after the surrogates U+E000", &[0xEE, 0x80, 0x80], true),
    case("Lone surrogate U+DC00", &[0xED, 0xB0, 0x80], false),
    case("First continuation byte 0x80", &[0x80], false),
    case("Last continuation byte 0xBF", &[0xBF], false),
    case("Two continuation bytes", &[0x80, 0xBF], false),
    case("2-byte lead followed by a space", &[0xC3, 0x20], false),
    case("3-byte lead followed by a space", &[0xE3, 0x20], false),
    case("4-byte lead followed by a space", &[0xF1, 0x20], false),
    case("3-byte sequence with last byte missing", &[0xE3, 0x81], false),
    case("4-byte sequence with last byte missing", &[0xF0, 0x9F, 0x98], false),
    case("Impossible byte 0xFE", &[0xFE], false),
    case("Impossible byte 0xFF", &[0xFF], false),
    case("5-byte sequence", &[0xF8, 0x88, 0x80, 0x80, 0x80], false),
    case("Overlong slash, 2 bytes", &[0xC0, 0xAF], false),
    case("Overlong slash, 3 bytes", &[0xE0, 0x80, 0xAF], false),
    case("Overlong slash, 4 bytes", &[0xF0, 0x80, 0x80, 0xAF], false),
    case("Maximum overlong 2-byte sequence", &[0xC1, 0xBF], false),
    case("Maximum overlong 4-byte sequence", &[0xF0, 0x8F, 0xBF, 0xBF], false),
    case("Noncharacter U+FFFE is still valid UTF-8", &[0xEF, 0xBF, 0xBE], true),
    case("Regression - E1.85.A7.CE.8C", &[0xE1, 0x85, 0xA7, 0xCE, 0x8C], true),
    case(
        "Regression - offset 14, E1.85.A7.CE.8C",
        &[
            0xE0, 0xA8, 0x86, 0xD6, 0xB0, 0xC7, 0x9B, 0xD8, 0xB2, 0xE0, 0xA7, 0xBF, 0x1D, 0x3E,
            0xE1, 0x85, 0xA7, 0xCE, 0x8C,
        ],
        true,
    ),
];

/// The handcrafted cases, with the repeated "crêpe" buffers built at run time.
pub fn standard_cases() -> Vec<(TestItem, bool)> {
    let mut cases: Vec<(TestItem, bool)> = STANDARD_CASES
        .iter()
        .map(|c| (TestItem::new(c.description, c.bytes), c.valid))
        .collect();

    for repeat in [10, 3] {
        let item = TestItem::new(
            format!("{} x crepe with a ^ over the middle character", repeat),
            CREPE.repeat(repeat),
        );
        // keep them next to the single crêpe
        cases.insert(3, (item, true));
    }
    cases
}

/// Iterator over the handcrafted cases.
#[derive(Debug)]
pub struct StandardSet {
    cases: std::vec::IntoIter<(TestItem, bool)>,
}

impl StandardSet {
    pub fn new() -> Self {
        Self { cases: standard_cases().into_iter() }
    }
}

impl Default for StandardSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for StandardSet {
    type Item = TestItem;

    fn next(&mut self) -> Option<TestItem> {
        self.cases.next().map(|(item, _)| item)
    }
}

/// One item per file, read whole.
#[derive(Debug)]
pub struct FileSet {
    items: std::vec::IntoIter<TestItem>,
}

impl FileSet {
    /// Read every file up front so a bad path fails before any validation runs.
    pub fn new<P: AsRef<Path>>(paths: &[P]) -> Result<Self, HarnessError> {
        let items = paths
            .iter()
            .map(|p| read_item(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { items: items.into_iter() })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.len() == 0
    }
}

fn read_item(path: &Path) -> Result<TestItem, HarnessError> {
    let bytes = std::fs::read(path).map_err(|source| HarnessError::ReadFile {
        path: PathBuf::from(path),
        source,
    })?;
    if bytes.is_empty() {
        return Err(HarnessError::EmptyFile { path: PathBuf::from(path) });
    }
    tracing::debug!(path = %path.display(), len = bytes.len(), "loaded test file");
    Ok(TestItem::new(path.display().to_string(), bytes))
}

impl Iterator for FileSet {
    type Item = TestItem;

    fn next(&mut self) -> Option<TestItem> {
        self.items.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_expectations_match_std() {
        for (item, valid) in standard_cases() {
            assert_eq!(
                std::str::from_utf8(&item.bytes).is_ok(),
                valid,
                "{}",
                item.description
            );
        }
    }

    #[test]
    fn test_standard_set_order() {
        let descriptions: Vec<String> = StandardSet::new().map(|i| i.description).collect();
        assert_eq!(descriptions[0], "Hello");
        assert_eq!(descriptions[2], "crepe with a ^ over the middle character");
        assert_eq!(descriptions[3], "3 x crepe with a ^ over the middle character");
        assert_eq!(descriptions[4], "10 x crepe with a ^ over the middle character");
        assert!(descriptions.iter().any(|d| d == "Empty string"));
    }

    #[test]
    fn test_repeated_crepes() {
        let cases = standard_cases();
        let ten = &cases[4].0;
        assert_eq!(ten.bytes.len(), CREPE.len() * 10);
    }

    #[test]
    fn test_file_set_reads_whole_files() {
        let path = std::env::temp_dir().join(format!("utf8-lanes-fileset-{}.txt", std::process::id()));
        std::fs::write(&path, "caf\u{E9}").unwrap();

        let items: Vec<TestItem> = FileSet::new(&[&path]).unwrap().collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].bytes, "caf\u{E9}".as_bytes());
        assert_eq!(items[0].description, path.display().to_string());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_set_rejects_missing_and_empty_files() {
        let missing = std::env::temp_dir().join("utf8-lanes-does-not-exist.bin");
        assert!(matches!(
            FileSet::new(&[&missing]),
            Err(HarnessError::ReadFile { .. })
        ));

        let empty = std::env::temp_dir().join(format!("utf8-lanes-empty-{}.bin", std::process::id()));
        std::fs::write(&empty, b"").unwrap();
        assert!(matches!(FileSet::new(&[&empty]), Err(HarnessError::EmptyFile { .. })));
        std::fs::remove_file(&empty).unwrap();
    }
}
