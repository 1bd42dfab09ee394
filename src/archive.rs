//! Unpacking downloaded release artifacts.
//!
//! The format is sniffed from the first bytes of the file rather than its name.
//! Compressed streams are sniffed again after decompression so `.tar.gz` and
//! `.tar.bz2` unpack in one pass. Archive members are written flat, by base name,
//! into the destination directory; sub-directories are not recreated.

use crate::error::{Error, ExtractError};
use crate::platform::platform;
use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use fs_err as fs;
use log::{debug, warn};
use std::fmt;
use std::io::{self, Chain, Cursor, Read};
use std::path::{Path, PathBuf};
use tar::EntryType;
use zip::ZipArchive;

/// Number of leading bytes inspected to classify a stream.
pub const SNIFF_LEN: u64 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Gzip,
    Bzip2,
    Tar,
    Zip,
    Unknown,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileType::Gzip => "gzip",
            FileType::Bzip2 => "bzip2",
            FileType::Tar => "tar",
            FileType::Zip => "zip",
            FileType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl FileType {
    /// Classifies a stream by its leading bytes.
    pub fn detect(head: &[u8]) -> Self {
        if head.starts_with(&[0x1f, 0x8b, 0x08]) {
            FileType::Gzip
        } else if head.starts_with(b"BZh") {
            FileType::Bzip2
        } else if head.starts_with(b"PK\x03\x04") || head.starts_with(b"PK\x05\x06") || head.starts_with(b"PK\x07\x08") {
            FileType::Zip
        } else if head.len() >= 262 && &head[257..262] == b"ustar" {
            FileType::Tar
        } else {
            FileType::Unknown
        }
    }
}

/// A reader that yields the sniffed bytes before the rest of the stream.
pub type Sniffed<R> = Chain<Cursor<Vec<u8>>, R>;

/// Reads up to [`SNIFF_LEN`] bytes from `reader` to classify it, and returns a
/// reader that replays the stream from its first byte.
pub fn sniff<R: Read>(mut reader: R) -> io::Result<(FileType, Sniffed<R>)> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    reader.by_ref().take(SNIFF_LEN).read_to_end(&mut head)?;
    let file_type = FileType::detect(&head);
    debug!("sniffed {} bytes, file type is {file_type}", head.len());
    Ok((file_type, Cursor::new(head).chain(reader)))
}

/// The outcome of a successful [`extract_file`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// False when the file was not compressed or archived; it is then the artifact itself.
    pub extracted: bool,
    /// Files written, in the order they were written.
    pub files: Vec<PathBuf>,
}

/// Decompresses or unarchives `path` into the directory containing it.
pub fn extract_file(path: &Path) -> Result<Extraction, ExtractError> {
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| ExtractError {
                path: path.to_path_buf(),
                written: Vec::new(),
                source: e.into(),
            })?
            .join(path)
    };
    let dest = abs.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("/"));
    extract_file_into(&abs, &dest)
}

/// Decompresses or unarchives `path` into `dest`, creating `dest` if needed.
///
/// On failure, files already written are left in place and listed in the error.
pub fn extract_file_into(path: &Path, dest: &Path) -> Result<Extraction, ExtractError> {
    debug!("extracting file {} into directory {}", path.display(), dest.display());
    let mut sink = Sink::new(dest);
    match sink.extract(path) {
        Ok(extracted) => Ok(Extraction {
            extracted,
            files: sink.written,
        }),
        Err(source) => Err(ExtractError {
            path: path.to_path_buf(),
            written: sink.written,
            source,
        }),
    }
}

/// Writes extracted files into one directory and remembers what it wrote.
struct Sink {
    dest: PathBuf,
    written: Vec<PathBuf>,
}

impl Sink {
    fn new(dest: &Path) -> Self {
        Self {
            dest: dest.to_path_buf(),
            written: Vec::new(),
        }
    }

    fn extract(&mut self, path: &Path) -> Result<bool, Error> {
        let file = fs::File::open(path)?;
        let (file_type, reader) = sniff(file)?;
        match file_type {
            FileType::Gzip => self.gunzip(reader, path)?,
            FileType::Bzip2 => self.bunzip2(reader, path)?,
            FileType::Tar => self.untar(reader)?,
            // Zip needs the central directory at the end of the file, so it gets a
            // fresh, seekable handle.
            FileType::Zip => self.unzip(fs::File::open(path)?)?,
            FileType::Unknown => {
                debug!("nothing to extract from file {}, unknown file type", path.display());
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn gunzip<R: Read>(&mut self, reader: R, source: &Path) -> Result<(), Error> {
        debug!("decompressing gzip");
        let (inner_type, inner) = sniff(MultiGzDecoder::new(reader))?;
        if inner_type == FileType::Tar {
            return self.untar(inner);
        }
        let embedded = inner
            .get_ref()
            .1
            .header()
            .and_then(|h| h.filename())
            .map(|name| String::from_utf8_lossy(name).into_owned());
        debug!("gzip embedded file name is {embedded:?}");
        let name = match embedded.as_deref().and_then(base_name) {
            Some(name) => name,
            None => strip_suffixes(&file_name_of(source), &[".gz", ".GZ", ".gzip"]),
        };
        debug!("nothing to unarchive, saving decompressed file as {name:?}");
        self.save(inner, &name)
    }

    fn bunzip2<R: Read>(&mut self, reader: R, source: &Path) -> Result<(), Error> {
        debug!("decompressing bzip2");
        let (inner_type, inner) = sniff(MultiBzDecoder::new(reader))?;
        if inner_type == FileType::Tar {
            return self.untar(inner);
        }
        let name = strip_suffixes(&file_name_of(source), &[".bz2", ".BZ2"]);
        debug!("nothing to unarchive, saving decompressed file as {name:?}");
        self.save(inner, &name)
    }

    fn untar<R: Read>(&mut self, reader: R) -> Result<(), Error> {
        debug!("extracting tar");
        let mut archive = tar::Archive::new(reader);
        for entry in archive.entries()? {
            let entry = entry?;
            let entry_path = entry.path()?.to_string_lossy().into_owned();
            match entry.header().entry_type() {
                EntryType::Directory => debug!("skipping directory {entry_path:?}"),
                EntryType::Regular | EntryType::Continuous => match base_name(&entry_path) {
                    Some(name) => self.save(entry, &name)?,
                    None => warn!("skipping tar entry {entry_path:?} which has no file name"),
                },
                other => {
                    return Err(Error::UnsupportedEntry {
                        name: entry_path,
                        kind: format!("{other:?}"),
                    })
                }
            }
        }
        debug!("end of tar file");
        Ok(())
    }

    fn unzip(&mut self, file: fs::File) -> Result<(), Error> {
        debug!("extracting zip");
        let mut archive = ZipArchive::new(file)?;
        for i in 0..archive.len() {
            let member = archive.by_index(i)?;
            let member_name = member.name().to_string();
            if member_name.ends_with('/') {
                debug!("skipping directory {member_name:?}");
                continue;
            }
            match base_name(&member_name) {
                Some(name) => self.save(member, &name)?,
                None => warn!("skipping zip entry {member_name:?} which has no file name"),
            }
        }
        Ok(())
    }

    /// Writes `reader` to `dest/name` as an executable. Data goes to a temporary
    /// file first, so a failed decode never leaves a truncated file behind.
    fn save<R: Read>(&mut self, mut reader: R, name: &str) -> Result<(), Error> {
        platform().create_private_dir_all(&self.dest)?;
        let target = self.dest.join(name);
        if self.written.contains(&target) {
            warn!("{} appears more than once in the archive, keeping the last one", target.display());
        }
        debug!("saving to file {}", target.display());
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dest)?;
        io::copy(&mut reader, tmp.as_file_mut())?;
        tmp.persist(&target).map_err(|e| Error::Io(e.error))?;
        platform().make_executable(&target)?;
        if !self.written.contains(&target) {
            self.written.push(target);
        }
        Ok(())
    }
}

/// The last component of an archive member path, accepting either separator.
fn base_name(member: &str) -> Option<String> {
    member
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn strip_suffixes(name: &str, suffixes: &[&str]) -> String {
    suffixes
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .filter(|stripped| !stripped.is_empty())
        .unwrap_or(name)
        .to_string()
}
