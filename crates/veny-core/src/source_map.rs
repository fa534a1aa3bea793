//! Offsets, positions, and the multi-file address space they live in.
//!
//! Every file handed to the compiler is assigned a disjoint range in a
//! single, process-wide `u32` address space. An [`Offset`] is a point in
//! that space; a [`Position`] is the `(file, line, column)` triple a
//! human wants to see. [`FileSet`] is the thing that converts one into
//! the other.

use std::cell::Cell;

/// A point in the shared, process-wide offset space.
///
/// Wraps a `u32` rather than `usize` so that spans stay cheap to copy
/// and compare; compilations of more than 4 GiB of source are not a
/// goal of this front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Offset(u32);

/// Sentinel for "no offset available". `FileSet` bases start at 1, so
/// 0 never collides with a real offset.
pub const NO_OFFSET: Offset = Offset(0);

impl Offset {
    pub fn new(value: u32) -> Self {
        Offset(value)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self != NO_OFFSET
    }

    fn checked_add(self, delta: u32) -> Option<Offset> {
        self.0.checked_add(delta).map(Offset)
    }
}

impl std::fmt::Display for Offset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved `(file, line, column)` location. Line and column are
/// 1-based, matching editor conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file_name: String,
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file_name, self.line, self.column)
    }
}

/// Errors raised while growing a [`FileSet`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SourceMapError {
    #[error("file size overflows the compilation's offset space")]
    BaseOverflow,
}

/// Per-file slice of the address space: a base offset, a size, and a
/// table of line-start offsets (relative to the file, not the shared
/// space) used to binary-search a raw offset down to a line/column.
///
/// The lexer does not track line numbers itself (see `lexer.rs`); line
/// starts are populated here, once, by scanning the source text after
/// the file is registered.
#[derive(Debug)]
pub struct FilePosMap {
    name: String,
    base: Offset,
    size: u32,
    /// Always non-empty: `line_starts[0] == 0`.
    line_starts: Vec<u32>,
}

impl FilePosMap {
    fn new(name: impl Into<String>, base: Offset, size: u32) -> Self {
        Self {
            name: name.into(),
            base,
            size,
            line_starts: vec![0],
        }
    }

    /// Scans `source` for `\n` and rebuilds the line-start table.
    /// `source.len()` must equal `self.size()`.
    pub fn populate_lines(&mut self, source: &str) {
        debug_assert_eq!(source.len() as u32, self.size);
        self.line_starts.clear();
        self.line_starts.push(0);
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                self.line_starts.push(i as u32 + 1);
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> Offset {
        self.base
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn end(&self) -> Offset {
        Offset(self.base.0 + self.size)
    }

    pub fn contains(&self, offset: Offset) -> bool {
        offset.0 >= self.base.0 && offset.0 <= self.base.0 + self.size
    }

    /// Converts an absolute offset into a `(file, line, column)` triple.
    ///
    /// `adjusted` is accepted for forward compatibility with future
    /// `#line`-style directives; this version always produces the raw
    /// mapping regardless of its value.
    pub fn position_for(&self, offset: Offset, _adjusted: bool) -> Option<Position> {
        if !self.contains(offset) {
            return None;
        }
        let rel = offset.0 - self.base.0;
        let idx = match self.line_starts.binary_search(&rel) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let line_start = self.line_starts[idx];
        Some(Position {
            file_name: self.name.clone(),
            line: idx as u32 + 1,
            column: rel - line_start + 1,
        })
    }
}

/// Ordered sequence of [`FilePosMap`]s covering one compilation.
///
/// Appends are the only mutation: each new file lands at
/// `current_base`, which then advances by `size + 1` to reserve an
/// EOF position that belongs to no line but is still a valid offset
/// for an `EOF` token.
pub struct FileSet {
    files: Vec<FilePosMap>,
    current_base: Offset,
    /// Index of the most recently resolved file; `file()` checks it
    /// first since lookups cluster within one file during lexing.
    last: Cell<usize>,
}

impl FileSet {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            current_base: Offset(1),
            last: Cell::new(0),
        }
    }

    /// Registers a file of `size` bytes, returning a handle to its map.
    /// Errors if the new base would overflow the offset space. Negative
    /// sizes are rejected by the type system (`size: u32`).
    pub fn add_file(&mut self, name: impl Into<String>, size: u32) -> Result<usize, SourceMapError> {
        let base = self.current_base;
        let next_base = base
            .checked_add(size)
            .and_then(|b| b.checked_add(1))
            .ok_or(SourceMapError::BaseOverflow)?;
        self.files.push(FilePosMap::new(name, base, size));
        self.current_base = next_base;
        Ok(self.files.len() - 1)
    }

    pub fn get(&self, index: usize) -> Option<&FilePosMap> {
        self.files.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut FilePosMap> {
        self.files.get_mut(index)
    }

    /// Finds the `FilePosMap` whose range contains `offset`, in
    /// `O(log n)` over the number of files, with a one-slot cache hit
    /// in the common case of repeated lookups within the same file.
    pub fn file(&self, offset: Offset) -> Option<&FilePosMap> {
        let cached = self.last.get();
        if let Some(f) = self.files.get(cached) {
            if f.contains(offset) {
                return Some(f);
            }
        }
        let idx = self.files.partition_point(|f| f.base() <= offset);
        if idx == 0 {
            return None;
        }
        let candidate = &self.files[idx - 1];
        if candidate.contains(offset) {
            self.last.set(idx - 1);
            Some(candidate)
        } else {
            None
        }
    }

    pub fn position_for(&self, offset: Offset) -> Option<Position> {
        self.file(offset)?.position_for(offset, false)
    }
}

impl Default for FileSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bases_are_disjoint_and_increasing() {
        let mut set = FileSet::new();
        let a = set.add_file("a.veny", 10).unwrap();
        let b = set.add_file("b.veny", 5).unwrap();
        assert_eq!(set.get(a).unwrap().base(), Offset::new(1));
        assert_eq!(set.get(b).unwrap().base(), Offset::new(12));
    }

    #[test]
    fn round_trip_positions() {
        let mut set = FileSet::new();
        let source = "line one\nline two\nline three";
        let idx = set.add_file("f.veny", source.len() as u32).unwrap();
        set.get_mut(idx).unwrap().populate_lines(source);
        let map = set.get(idx).unwrap();

        let offset_of_t_in_two = map.base().value() + source.find("two").unwrap() as u32;
        let pos = set.position_for(Offset::new(offset_of_t_in_two)).unwrap();
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 6);
        assert_eq!(pos.file_name, "f.veny");
    }

    #[test]
    fn out_of_range_offset_returns_none() {
        let mut set = FileSet::new();
        set.add_file("f.veny", 4).unwrap();
        assert!(set.position_for(Offset::new(999)).is_none());
    }

    #[test]
    fn overflow_is_rejected() {
        let mut set = FileSet::new();
        assert_eq!(
            set.add_file("huge.veny", u32::MAX),
            Err(SourceMapError::BaseOverflow)
        );
    }

    #[test]
    fn file_lookup_cache_hits_same_file() {
        let mut set = FileSet::new();
        let source = "abc\ndef\n";
        let idx = set.add_file("f.veny", source.len() as u32).unwrap();
        set.get_mut(idx).unwrap().populate_lines(source);
        let base = set.get(idx).unwrap().base().value();
        // Two lookups in a row within the same file exercise the cache path.
        assert!(set.file(Offset::new(base)).is_some());
        assert!(set.file(Offset::new(base + 1)).is_some());
    }
}
