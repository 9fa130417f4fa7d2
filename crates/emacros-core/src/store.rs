//! Record storage inside one definition file.
//!
//! A [`RecordStore`] reads a definition file once, from the open surface if
//! the host has one (so unsaved edits are honored) or else from disk, and
//! applies find/insert/delete/rename against that text. Every mutation is
//! written back synchronously as a plain write: no backup files, no
//! formatting. A store opened on a file that no surface shows is transient;
//! dropping it leaves nothing behind in the host's set of open surfaces.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::codec::{decode_block, encode_record, header_prefix, scan_headers, HeaderLine};
use crate::errors::MacroError;
use crate::macros::{MacroName, MacroRecord};
use crate::surface::{SharedSurface, SurfaceSet};

/// Byte range of one record block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLocation {
    /// Offset of the header line.
    pub start: usize,
    /// Offset just past the block (next header or end of text).
    pub end: usize,
    /// 1-based line of the header.
    pub line: usize,
}

/// Result of a successful insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// No record of that name existed.
    Added,
    /// A previous record was deleted first.
    Replaced,
}

/// A record block that did not decode and was left out of a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// 1-based line of the header.
    pub line: usize,
    /// Name from the header.
    pub name: String,
    /// Why the payload was rejected.
    pub reason: String,
}

#[derive(Debug)]
enum Backing {
    Surface(SharedSurface),
    File { existed: bool },
}

/// Records of one definition file.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    backing: Backing,
    text: String,
}

impl RecordStore {
    /// Open the definition file at `path`.
    ///
    /// A missing file is an empty store; it is created by the first write.
    ///
    /// # Errors
    ///
    /// Returns [`MacroError::Io`] if the file exists but cannot be read.
    pub fn open(path: &Path, surfaces: &SurfaceSet) -> Result<Self, MacroError> {
        if let Some(surface) = surfaces.get(path) {
            let text = surface.borrow().text().to_string();
            tracing::debug!("Using open surface for {}", path.display());
            return Ok(Self {
                path: path.to_path_buf(),
                backing: Backing::Surface(surface),
                text,
            });
        }

        let (text, existed) = match fs::read_to_string(path) {
            Ok(text) => (text, true),
            Err(e) if e.kind() == ErrorKind::NotFound => (String::new(), false),
            Err(e) => return Err(MacroError::io(path, e)),
        };
        Ok(Self {
            path: path.to_path_buf(),
            backing: Backing::File { existed },
            text,
        })
    }

    /// Path of the definition file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current text of the file.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the file exists on disk or is shown by an open surface.
    pub fn exists(&self) -> bool {
        match &self.backing {
            Backing::Surface(_) => true,
            Backing::File { existed } => *existed,
        }
    }

    /// Whether an open surface holds edits that were never saved.
    pub fn has_unsaved_edits(&self) -> bool {
        match &self.backing {
            Backing::Surface(surface) => surface.borrow().is_modified(),
            Backing::File { .. } => false,
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    fn locations(&self) -> Vec<(HeaderLine, RecordLocation)> {
        let headers = scan_headers(&self.text);
        let ends: Vec<usize> = headers
            .iter()
            .skip(1)
            .map(|h| h.start)
            .chain(std::iter::once(self.text.len()))
            .collect();
        headers
            .into_iter()
            .zip(ends)
            .map(|(header, end)| {
                let location = RecordLocation {
                    start: header.start,
                    end,
                    line: header.line,
                };
                (header, location)
            })
            .collect()
    }

    /// Locate the record named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`MacroError::DuplicateRecord`] if the name occurs more than
    /// once; the file was edited by hand and no record can be picked safely.
    pub fn find(&self, name: &str) -> Result<Option<RecordLocation>, MacroError> {
        let matches: Vec<RecordLocation> = self
            .locations()
            .into_iter()
            .filter(|(header, _)| header.name == name)
            .map(|(_, location)| location)
            .collect();
        match matches.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(*only)),
            many => Err(MacroError::DuplicateRecord {
                name: name.to_string(),
                path: self.path.clone(),
                count: many.len(),
            }),
        }
    }

    /// Whether a record named `name` exists.
    pub fn contains(&self, name: &str) -> Result<bool, MacroError> {
        Ok(self.find(name)?.is_some())
    }

    /// Decode the record named `name`.
    pub fn get(&self, name: &str) -> Result<Option<MacroRecord>, MacroError> {
        match self.find(name)? {
            Some(loc) => Ok(Some(decode_block(
                &self.text[loc.start..loc.end],
                &self.path,
                loc.line,
            )?)),
            None => Ok(None),
        }
    }

    /// Raw text of the record block named `name`, newline terminated.
    pub fn block(&self, name: &str) -> Result<Option<String>, MacroError> {
        Ok(self.find(name)?.map(|loc| {
            let mut block = self.text[loc.start..loc.end].to_string();
            if !block.ends_with('\n') {
                block.push('\n');
            }
            block
        }))
    }

    /// Decode every record in file order.
    ///
    /// Duplicated names are returned as they appear; a warning is logged.
    /// Blocks that fail to decode are skipped and returned separately, so one
    /// bad record does not hide the rest of the file.
    pub fn records(&self) -> (Vec<MacroRecord>, Vec<SkippedRecord>) {
        let mut records: Vec<MacroRecord> = Vec::new();
        let mut skipped = Vec::new();
        for (header, loc) in self.locations() {
            if records.iter().any(|r| r.name.as_str() == header.name) {
                tracing::warn!(
                    "Macro `{}` is defined more than once in {}; the last definition wins",
                    header.name,
                    self.path.display()
                );
            }
            match decode_block(&self.text[loc.start..loc.end], &self.path, loc.line) {
                Ok(record) => records.push(record),
                Err(err) => {
                    let reason = match err {
                        MacroError::Parse { message, .. } => message,
                        other => other.to_string(),
                    };
                    tracing::warn!(
                        "Skipping macro `{}` at {}:{}: {}",
                        header.name,
                        self.path.display(),
                        loc.line,
                        reason
                    );
                    skipped.push(SkippedRecord {
                        line: loc.line,
                        name: header.name,
                        reason,
                    });
                }
            }
        }
        (records, skipped)
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Append `record`, replacing an existing one only if `overwrite` is set.
    ///
    /// # Errors
    ///
    /// Returns [`MacroError::Conflict`] without touching the file when the
    /// name exists and `overwrite` is false, or [`MacroError::Io`] when the
    /// write fails.
    pub fn insert(
        &mut self,
        record: &MacroRecord,
        overwrite: bool,
    ) -> Result<InsertOutcome, MacroError> {
        let existing = self.find(record.name.as_str())?;
        if existing.is_some() && !overwrite {
            return Err(MacroError::Conflict {
                name: record.name.to_string(),
                path: self.path.clone(),
            });
        }

        let mut text = self.text.clone();
        if let Some(loc) = existing {
            text.replace_range(loc.start..loc.end, "");
        }
        push_block(&mut text, &encode_record(record));
        self.persist(text)?;

        Ok(if existing.is_some() {
            InsertOutcome::Replaced
        } else {
            InsertOutcome::Added
        })
    }

    /// Delete the record named `name`. Returns whether one was removed.
    ///
    /// The block runs from its header up to the next header, so the bytes of
    /// neighboring records are left exactly as they were.
    pub fn delete(&mut self, name: &str) -> Result<bool, MacroError> {
        let Some(loc) = self.find(name)? else {
            return Ok(false);
        };
        let mut text = self.text.clone();
        text.replace_range(loc.start..loc.end, "");
        self.persist(text)?;
        Ok(true)
    }

    /// Rewrite the header of `old` in place to `new`, keeping its payload.
    ///
    /// Returns whether `old` was found. The caller must ensure `new` is not
    /// already present.
    pub fn rename(&mut self, old: &str, new: &MacroName) -> Result<bool, MacroError> {
        let Some(loc) = self.find(old)? else {
            return Ok(false);
        };
        let old_prefix = header_prefix(old);
        let mut text = self.text.clone();
        text.replace_range(
            loc.start..loc.start + old_prefix.len(),
            &header_prefix(new.as_str()),
        );
        self.persist(text)?;
        Ok(true)
    }

    /// Append a raw block taken from another store.
    pub fn append_block(&mut self, block: &str) -> Result<(), MacroError> {
        let mut text = self.text.clone();
        push_block(&mut text, block.trim_end_matches('\n'));
        self.persist(text)
    }

    fn persist(&mut self, text: String) -> Result<(), MacroError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| MacroError::io(parent, e))?;
            }
        }
        fs::write(&self.path, &text).map_err(|e| MacroError::io(&self.path, e))?;

        match &mut self.backing {
            Backing::Surface(surface) => surface.borrow_mut().mark_saved(text.clone()),
            Backing::File { existed } => *existed = true,
        }
        tracing::debug!("Wrote {} ({} bytes)", self.path.display(), text.len());
        self.text = text;
        Ok(())
    }
}

fn push_block(text: &mut String, block: &str) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(block);
    text.push('\n');
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::{KeyEvent, MacroCode};
    use tempfile::TempDir;

    fn record(name: &str, text: &str) -> MacroRecord {
        MacroRecord::new(
            MacroName::try_new(name).unwrap(),
            MacroCode::Text(text.to_string()),
        )
    }

    fn open(path: &Path) -> RecordStore {
        RecordStore::open(path, &SurfaceSet::new()).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_and_created_on_insert() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sub").join("for-c.el");
        let mut store = open(&path);
        assert!(!store.exists());
        assert_eq!(store.find("a").unwrap(), None);

        let outcome = store.insert(&record("a", "1"), false).unwrap();
        assert_eq!(outcome, InsertOutcome::Added);
        assert!(store.exists());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "(emacros-new-macro 'a \"1\")\n"
        );
    }

    #[test]
    fn test_find_matches_full_token_only() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.el");
        fs::write(&path, "(emacros-new-macro 'foo2 \"x\")\n").unwrap();
        let store = open(&path);
        assert_eq!(store.find("foo").unwrap(), None);
        assert!(store.find("foo2").unwrap().is_some());
    }

    #[test]
    fn test_insert_conflict_does_not_mutate() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.el");
        let original = "(emacros-new-macro 'a \"1\")";
        fs::write(&path, original).unwrap();
        let mut store = open(&path);

        let err = store.insert(&record("a", "2"), false).unwrap_err();
        assert!(matches!(err, MacroError::Conflict { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_insert_overwrite_moves_record_to_end() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.el");
        // No trailing newline: insert must add one before appending.
        fs::write(
            &path,
            "(emacros-new-macro 'a \"1\")\n(emacros-new-macro 'b \"2\")",
        )
        .unwrap();
        let mut store = open(&path);

        let outcome = store.insert(&record("a", "new"), true).unwrap();
        assert_eq!(outcome, InsertOutcome::Replaced);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "(emacros-new-macro 'b \"2\")\n(emacros-new-macro 'a \"new\")\n"
        );
    }

    #[test]
    fn test_delete_leaves_neighbors_byte_identical() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.el");
        let before = ";; my macros\n(emacros-new-macro 'a \"1\")  ; first\n\n";
        let target = "(emacros-new-macro 'b\n  [97 98])\n;; about b\n";
        let after = "(emacros-new-macro 'c \"3\")";
        fs::write(&path, format!("{}{}{}", before, target, after)).unwrap();
        let mut store = open(&path);

        assert!(store.delete("b").unwrap());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("{}{}", before, after)
        );
        assert!(!store.delete("b").unwrap());
    }

    #[test]
    fn test_rename_in_place_keeps_payload_and_position() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.el");
        fs::write(
            &path,
            "(emacros-new-macro 'greet \"Hello\")\n(emacros-new-macro 'z [1])\n",
        )
        .unwrap();
        let mut store = open(&path);

        let new = MacroName::try_new("hello_fn").unwrap();
        assert!(store.rename("greet", &new).unwrap());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "(emacros-new-macro 'hello_fn \"Hello\")\n(emacros-new-macro 'z [1])\n"
        );
        assert_eq!(
            store.get("hello_fn").unwrap().unwrap().code,
            MacroCode::Text("Hello".into())
        );
        assert!(!store.rename("greet", &new).unwrap());
    }

    #[test]
    fn test_duplicate_names_are_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.el");
        fs::write(
            &path,
            "(emacros-new-macro 'a \"1\")\n(emacros-new-macro 'a \"2\")\n",
        )
        .unwrap();
        let mut store = open(&path);

        assert!(matches!(
            store.find("a"),
            Err(MacroError::DuplicateRecord { count: 2, .. })
        ));
        assert!(store.delete("a").is_err());
        // Loading still sees both, in order.
        let (records, skipped) = store.records();
        assert!(skipped.is_empty());
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].code, MacroCode::Text("2".into()));
    }

    #[test]
    fn test_undecodable_block_is_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.el");
        fs::write(
            &path,
            "(emacros-new-macro 'good \"ok\")\n(emacros-new-macro 'bad \"open\n(emacros-new-macro 'tail [97])\n",
        )
        .unwrap();
        let store = open(&path);

        let (records, skipped) = store.records();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["good", "tail"]);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].name, "bad");
        assert_eq!(skipped[0].line, 2);
        assert!(skipped[0].reason.contains("unterminated"));
    }

    #[test]
    fn test_block_moves_verbatim() {
        let temp = TempDir::new().unwrap();
        let src_path = temp.path().join("src.el");
        let dst_path = temp.path().join("dst.el");
        fs::write(&src_path, "(emacros-new-macro 'k [97 300 return])").unwrap();
        let src = open(&src_path);
        let mut dst = open(&dst_path);

        let block = src.block("k").unwrap().unwrap();
        dst.append_block(&block).unwrap();
        let moved = dst.get("k").unwrap().unwrap();
        assert_eq!(
            moved.code,
            MacroCode::Events(vec![
                KeyEvent::Char(97),
                KeyEvent::Char(300),
                KeyEvent::Key("return".into()),
            ])
        );
    }

    #[test]
    fn test_surface_backed_store_keeps_unsaved_edits() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.el");
        fs::write(&path, "(emacros-new-macro 'a \"disk\")\n").unwrap();

        let mut surfaces = SurfaceSet::new();
        let surface = surfaces.open(&path, "(emacros-new-macro 'a \"disk\")\n");
        surface
            .borrow_mut()
            .edit("(emacros-new-macro 'a \"disk\")\n(emacros-new-macro 'typed \"t\")\n");

        let mut store = RecordStore::open(&path, &surfaces).unwrap();
        assert!(store.has_unsaved_edits());
        store.insert(&record("b", "2"), false).unwrap();

        let on_disk = fs::read_to_string(&path).unwrap();
        assert!(on_disk.contains("'typed"));
        assert!(on_disk.contains("'b \"2\""));
        assert!(!surface.borrow().is_modified());
        assert_eq!(surface.borrow().text(), on_disk);
    }

    #[test]
    fn test_transient_store_leaves_no_surface() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.el");
        let surfaces = SurfaceSet::new();
        {
            let mut store = RecordStore::open(&path, &surfaces).unwrap();
            store.insert(&record("a", "1"), false).unwrap();
        }
        assert!(surfaces.is_empty());
        assert!(path.exists());
    }
}
