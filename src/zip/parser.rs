//! Low-level ZIP archive parser.
//!
//! This module handles the binary parsing of ZIP file structures,
//! reading from any source that implements the [`ReadAt`] trait.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the file's end
//! 2. If ZIP64, read the ZIP64 EOCD for large file support
//! 3. Read the Central Directory to get metadata for all files
//! 4. For extraction, read each file's Local File Header and stream its data
//!
//! Only metadata is held in memory. Entry contents are read on demand
//! through [`EntryReader`].

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use crate::io::{ReadAt, SectionReader};
use anyhow::{Context, Result, bail};

use super::entry::EntryReader;
use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

/// ZIP64 extended information extra field ID.
const ZIP64_EXTRA_ID: u16 = 0x0001;

/// Low-level ZIP file parser.
///
/// Owns the data source for as long as the archive is being read; dropping
/// the parser releases it.
pub struct ZipParser<R: ReadAt> {
    /// The underlying data source
    reader: R,
    /// Total size of the archive in bytes
    size: u64,
}

impl<R: ReadAt> ZipParser<R> {
    pub fn new(reader: R) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Returns the record together with its offset in the file. The simple
    /// case (no archive comment) is tried first; otherwise the tail of the
    /// file is searched backwards for the signature.
    pub fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        let eocd_size = EndOfCentralDirectory::SIZE as u64;
        if self.size < eocd_size {
            bail!("Not a valid ZIP file: {} bytes is too small", self.size);
        }

        let offset = self.size - eocd_size;
        let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
        self.reader.read_exact_at(offset, &mut buf)?;

        if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && &buf[20..22] == b"\x00\x00" {
            let eocd = EndOfCentralDirectory::from_bytes(&buf)?;
            return Ok((eocd, offset));
        }

        // The EOCD is followed by a comment of up to 64 KiB.
        let search_size = (MAX_COMMENT_SIZE + eocd_size).min(self.size);
        let search_start = self.size - search_size;

        let mut buf = vec![0u8; search_size as usize];
        self.reader.read_exact_at(search_start, &mut buf)?;

        for i in (0..=buf.len() - EndOfCentralDirectory::SIZE).rev() {
            if &buf[i..i + 4] == EndOfCentralDirectory::SIGNATURE {
                // Only accept a candidate whose comment runs exactly to EOF.
                let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;

                if comment_len == buf.len() - i - EndOfCentralDirectory::SIZE {
                    let eocd = EndOfCentralDirectory::from_bytes(
                        &buf[i..i + EndOfCentralDirectory::SIZE],
                    )?;
                    return Ok((eocd, search_start + i as u64));
                }
            }
        }

        bail!("Not a valid ZIP file: End of Central Directory not found")
    }

    /// Read the ZIP64 End of Central Directory record.
    ///
    /// Called when the regular EOCD has fields saturated to 0xFFFF or
    /// 0xFFFFFFFF. The locator sits immediately before the regular EOCD.
    pub fn read_zip64_eocd(&self, eocd_offset: u64) -> Result<Zip64EOCD> {
        let locator_offset = eocd_offset
            .checked_sub(Zip64EOCDLocator::SIZE as u64)
            .context("ZIP64 End of Central Directory Locator is missing")?;
        let mut locator_buf = vec![0u8; Zip64EOCDLocator::SIZE];
        self.reader.read_exact_at(locator_offset, &mut locator_buf)?;

        let locator = Zip64EOCDLocator::from_bytes(&locator_buf)?;

        let mut eocd64_buf = vec![0u8; Zip64EOCD::MIN_SIZE];
        self.reader
            .read_exact_at(locator.eocd64_offset, &mut eocd64_buf)?;

        Zip64EOCD::from_bytes(&eocd64_buf)
    }

    /// List all entries of the archive in central directory order.
    ///
    /// Reads the EOCD (and the ZIP64 records when needed), then fetches and
    /// parses the whole Central Directory in one read.
    ///
    /// # Returns
    ///
    /// A vector of [`ZipFileEntry`] structures, one for each file/directory
    /// in the archive, directories included.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive is invalid, truncated, or its
    /// Central Directory lies outside the file.
    pub fn list_files(&self) -> Result<Vec<ZipFileEntry>> {
        let (eocd, eocd_offset) = self.find_eocd()?;

        let (cd_offset, cd_size, total_entries) = if eocd.is_zip64() {
            let eocd64 = self.read_zip64_eocd(eocd_offset)?;
            (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries)
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
            )
        };

        match cd_offset.checked_add(cd_size) {
            Some(end) if end <= self.size => {}
            _ => bail!(
                "Central Directory ({} bytes at offset {}) lies outside the archive",
                cd_size,
                cd_offset
            ),
        }
        // Every record is at least CDFH_MIN_SIZE bytes, which bounds the
        // allocation below for corrupt entry counts.
        if total_entries > cd_size / CDFH_MIN_SIZE as u64 {
            bail!(
                "Central Directory of {} bytes cannot hold {} entries",
                cd_size,
                total_entries
            );
        }

        let mut cd_data = vec![0u8; cd_size as usize];
        self.reader.read_exact_at(cd_offset, &mut cd_data)?;

        let mut entries = Vec::with_capacity(total_entries as usize);
        let mut cursor = Cursor::new(cd_data.as_slice());

        for index in 0..total_entries {
            let entry = parse_cdfh(&mut cursor)
                .with_context(|| format!("Central Directory record {index}"))?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Get the actual data offset for a file entry.
    ///
    /// The Local File Header has its own name and extra field lengths which
    /// may differ from the Central Directory record, so it has to be read.
    pub fn get_data_offset(&self, entry: &ZipFileEntry) -> Result<u64> {
        let mut lfh_buf = vec![0u8; LFH_SIZE];
        self.reader
            .read_exact_at(entry.lfh_offset, &mut lfh_buf)
            .with_context(|| format!("reading Local File Header at {}", entry.lfh_offset))?;

        if &lfh_buf[0..4] != LFH_SIGNATURE {
            bail!("Invalid Local File Header at offset {}", entry.lfh_offset);
        }

        let mut cursor = Cursor::new(&lfh_buf[26..]);
        let file_name_length = cursor.read_u16::<LittleEndian>()? as u64;
        let extra_field_length = cursor.read_u16::<LittleEndian>()? as u64;

        Ok(entry.lfh_offset + LFH_SIZE as u64 + file_name_length + extra_field_length)
    }

    /// Open a decompressing stream over one entry's contents.
    pub fn open_entry(&self, entry: &ZipFileEntry) -> Result<EntryReader<'_, R>> {
        if entry.is_encrypted() {
            bail!("Encrypted entries are not supported");
        }

        let data_offset = self.get_data_offset(entry)?;
        match data_offset.checked_add(entry.compressed_size) {
            Some(end) if end <= self.size => {}
            _ => bail!(
                "Entry data ({} bytes at offset {}) lies outside the archive",
                entry.compressed_size,
                data_offset
            ),
        }

        let section = SectionReader::new(&self.reader, data_offset, entry.compressed_size);
        EntryReader::new(section, entry.compression_method)
    }
}

/// Parse a Central Directory File Header from a cursor.
fn parse_cdfh(cursor: &mut Cursor<&[u8]>) -> Result<ZipFileEntry> {
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig)?;
    if sig != CDFH_SIGNATURE {
        bail!("Invalid Central Directory File Header");
    }

    let version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let flags = cursor.read_u16::<LittleEndian>()?;
    let compression_method = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let _crc32 = cursor.read_u32::<LittleEndian>()?;
    let mut compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let mut uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let file_name_length = cursor.read_u16::<LittleEndian>()?;
    let extra_field_length = cursor.read_u16::<LittleEndian>()?;
    let file_comment_length = cursor.read_u16::<LittleEndian>()?;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let external_attrs = cursor.read_u32::<LittleEndian>()?;
    let mut lfh_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let mut file_name_bytes = vec![0u8; file_name_length as usize];
    cursor.read_exact(&mut file_name_bytes)?;
    // Use lossy conversion to handle non-UTF8 filenames gracefully
    let file_name = String::from_utf8_lossy(&file_name_bytes).into_owned();

    let extra_field_end = cursor.position() + extra_field_length as u64;
    if extra_field_end + file_comment_length as u64 > cursor.get_ref().len() as u64 {
        bail!("Central Directory File Header for {file_name} is truncated");
    }

    while cursor.position() + 4 <= extra_field_end {
        let header_id = cursor.read_u16::<LittleEndian>()?;
        let field_size = cursor.read_u16::<LittleEndian>()?;
        let field_end = (cursor.position() + field_size as u64).min(extra_field_end);

        if header_id == ZIP64_EXTRA_ID {
            // Values are present only for header fields saturated to 0xFFFFFFFF,
            // in this fixed order.
            if uncompressed_size == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                uncompressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if compressed_size == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                compressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if lfh_offset == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                lfh_offset = cursor.read_u64::<LittleEndian>()?;
            }
        }

        cursor.set_position(field_end);
    }

    cursor.set_position(extra_field_end + file_comment_length as u64);

    let is_directory = is_directory_entry(&file_name, version_made_by, external_attrs);

    Ok(ZipFileEntry {
        file_name,
        compression_method: CompressionMethod::from_u16(compression_method),
        compressed_size,
        uncompressed_size,
        lfh_offset,
        flags,
        is_directory,
    })
}
