//! In-process archiver built on the `tar` and `flate2` crates.

use camino::Utf8Path;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use tar::{Archive, Builder};

use super::Archiver;
use crate::error::{CacheError, Result};

/// Archiver that never leaves the process.
///
/// Produces archives whose members are relative to the packed directory, so
/// they can be restored by either archiver.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTar;

impl Archiver for NativeTar {
    fn pack(&self, src_dir: &Utf8Path, dest_file: &Utf8Path, compressed: bool) -> Result<()> {
        let file = File::create(dest_file)
            .map_err(|err| CacheError::io(format!("create {dest_file}"), err))?;
        let written = if compressed {
            write_archive(GzEncoder::new(file, Compression::default()), src_dir.as_std_path())
                .and_then(GzEncoder::finish)
        } else {
            write_archive(file, src_dir.as_std_path())
        };
        written
            .and_then(|mut file| file.flush())
            .map_err(|err| CacheError::io(format!("pack {src_dir} into {dest_file}"), err))
    }

    fn unpack(&self, src_file: &Utf8Path, dest_dir: &Utf8Path, compressed: bool) -> Result<()> {
        let file =
            File::open(src_file).map_err(|err| CacheError::io(format!("open {src_file}"), err))?;
        let extracted = if compressed {
            read_archive(GzDecoder::new(file), dest_dir.as_std_path())
        } else {
            read_archive(file, dest_dir.as_std_path())
        };
        extracted
            .map_err(|err| CacheError::io(format!("unpack {src_file} into {dest_dir}"), err))
    }
}

fn write_archive<W: Write>(writer: W, src_dir: &Path) -> io::Result<W> {
    let mut builder = Builder::new(writer);
    builder.follow_symlinks(false);
    builder.append_dir_all("", src_dir)?;
    builder.into_inner()
}

fn read_archive<R: Read>(reader: R, dest_dir: &Path) -> io::Result<()> {
    Archive::new(reader).unpack(dest_dir)
}
