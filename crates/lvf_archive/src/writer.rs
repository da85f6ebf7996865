use std::io::{self, Write};

use byteorder::{WriteBytesExt, LE};
use chrono::{Datelike, Local, Timelike};

use crate::crc32::crc32;

const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4B50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4B50;
const END_OF_CENTRAL_DIR_SIGNATURE: u32 = 0x0605_4B50;

/// Version 2.0 - the minimum that understands store-method entries.
const ZIP_VERSION: u16 = 20;
const METHOD_STORE: u16 = 0;

pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// An MS-DOS packed time/date pair, as stored in ZIP headers.
///
/// Seconds have 2-second granularity; years count from 1980.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    pub time: u16,
    pub date: u16,
}

impl DosDateTime {
    /// Capture the current local wall-clock time.
    pub fn now() -> Self {
        let now = Local::now();
        Self::from_parts(
            now.year(),
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
        )
    }

    /// Pack calendar fields into the DOS representation.
    ///
    /// Years before 1980 are clamped to 1980, the epoch of the format.
    pub fn from_parts(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        let time = ((hour & 0x1F) << 11) | ((minute & 0x3F) << 5) | ((second / 2) & 0x1F);
        let years_since_epoch = (year.max(1980) - 1980) as u32;
        let date = ((years_since_epoch & 0x7F) << 9) | ((month & 0x0F) << 5) | (day & 0x1F);
        Self {
            time: time as u16,
            date: date as u16,
        }
    }
}

#[derive(Debug, Clone)]
struct FileSpec {
    path: String,
    content: String,
}

/// Builds an uncompressed ZIP byte stream from (path, content) pairs.
///
/// Files are written in insertion order. All entries use the store method;
/// sizes, CRCs and central-directory offsets are computed during the single
/// linear pass over the inputs.
#[derive(Debug, Clone, Default)]
pub struct StoreZipBuilder {
    files: Vec<FileSpec>,
    timestamp: Option<DosDateTime>,
}

impl StoreZipBuilder {
    /// Append a file. `path` is stored verbatim as the archive entry name.
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push(FileSpec {
            path: path.into(),
            content: content.into(),
        });
        self
    }

    /// Fix the timestamp written into every header.
    ///
    /// Without this the current wall-clock time is used, which makes two
    /// otherwise identical builds differ in their time/date fields.
    pub fn with_timestamp(mut self, timestamp: DosDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Build the archive into an in-memory byte vector.
    ///
    /// An empty builder yields a structurally valid, zero-entry archive
    /// (a lone end-of-central-directory record).
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.build_to_writer(&mut out)?;
        Ok(out)
    }

    /// Build the archive and write it to `writer`.
    pub fn build_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        let stamp = self.timestamp.unwrap_or_else(DosDateTime::now);

        struct CentralRecord {
            crc: u32,
            size: u32,
            local_offset: u32,
            name: Vec<u8>,
        }

        let mut central = Vec::with_capacity(self.files.len());
        let mut offset: u32 = 0;

        for file in &self.files {
            let name = file.path.as_bytes();
            let data = file.content.as_bytes();
            let crc = crc32(data);
            let size = data.len() as u32;

            writer.write_u32::<LE>(LOCAL_HEADER_SIGNATURE)?;
            writer.write_u16::<LE>(ZIP_VERSION)?;
            writer.write_u16::<LE>(0)?; // general purpose flags
            writer.write_u16::<LE>(METHOD_STORE)?;
            writer.write_u16::<LE>(stamp.time)?;
            writer.write_u16::<LE>(stamp.date)?;
            writer.write_u32::<LE>(crc)?;
            writer.write_u32::<LE>(size)?; // compressed
            writer.write_u32::<LE>(size)?; // uncompressed
            writer.write_u16::<LE>(name.len() as u16)?;
            writer.write_u16::<LE>(0)?; // extra field length
            writer.write_all(name)?;
            writer.write_all(data)?;

            central.push(CentralRecord {
                crc,
                size,
                local_offset: offset,
                name: name.to_vec(),
            });
            offset += 30 + name.len() as u32 + size;
        }

        let central_start = offset;
        let mut central_size: u32 = 0;
        for record in &central {
            writer.write_u32::<LE>(CENTRAL_HEADER_SIGNATURE)?;
            writer.write_u16::<LE>(ZIP_VERSION)?; // version made by
            writer.write_u16::<LE>(ZIP_VERSION)?; // version needed
            writer.write_u16::<LE>(0)?; // general purpose flags
            writer.write_u16::<LE>(METHOD_STORE)?;
            writer.write_u16::<LE>(stamp.time)?;
            writer.write_u16::<LE>(stamp.date)?;
            writer.write_u32::<LE>(record.crc)?;
            writer.write_u32::<LE>(record.size)?; // compressed
            writer.write_u32::<LE>(record.size)?; // uncompressed
            writer.write_u16::<LE>(record.name.len() as u16)?;
            writer.write_u16::<LE>(0)?; // extra field length
            writer.write_u16::<LE>(0)?; // comment length
            writer.write_u16::<LE>(0)?; // disk number start
            writer.write_u16::<LE>(0)?; // internal attributes
            writer.write_u32::<LE>(0)?; // external attributes
            writer.write_u32::<LE>(record.local_offset)?;
            writer.write_all(&record.name)?;
            central_size += 46 + record.name.len() as u32;
        }

        let entry_count = self.files.len() as u16;
        writer.write_u32::<LE>(END_OF_CENTRAL_DIR_SIGNATURE)?;
        writer.write_u16::<LE>(0)?; // this disk
        writer.write_u16::<LE>(0)?; // central directory start disk
        writer.write_u16::<LE>(entry_count)?; // entries on this disk
        writer.write_u16::<LE>(entry_count)?; // entries total
        writer.write_u32::<LE>(central_size)?;
        writer.write_u32::<LE>(central_start)?;
        writer.write_u16::<LE>(0)?; // comment length

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Cursor, Read};

    fn fixed_stamp() -> DosDateTime {
        DosDateTime::from_parts(2024, 6, 15, 12, 30, 42)
    }

    #[test]
    fn single_entry_round_trip() {
        let bytes = StoreZipBuilder::default()
            .with_file("a.txt", "hello")
            .with_timestamp(fixed_stamp())
            .build()
            .unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 1);

        let mut entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "a.txt");
        assert_eq!(entry.compression(), zip::CompressionMethod::Stored);
        assert_eq!(entry.crc32(), crc32(b"hello"));

        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn multiple_entries_preserve_order_and_paths() {
        let bytes = StoreZipBuilder::default()
            .with_file("patch/one/Mod.ini", "first\n")
            .with_file("patch/two/Mod.ini", "second\n")
            .with_timestamp(fixed_stamp())
            .build()
            .unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.by_index(0).unwrap().name(), "patch/one/Mod.ini");
        assert_eq!(archive.by_index(1).unwrap().name(), "patch/two/Mod.ini");
    }

    #[test]
    fn empty_builder_yields_valid_empty_archive() {
        let bytes = StoreZipBuilder::default()
            .with_timestamp(fixed_stamp())
            .build()
            .unwrap();

        // Lone end-of-central-directory record
        assert_eq!(bytes.len(), 22);
        assert_eq!(&bytes[0..4], &[0x50, 0x4B, 0x05, 0x06]);

        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn local_header_fields() {
        let bytes = StoreZipBuilder::default()
            .with_file("x", "ab")
            .with_timestamp(fixed_stamp())
            .build()
            .unwrap();

        // signature, version 20, flags 0, method 0 (store)
        assert_eq!(&bytes[0..4], &[0x50, 0x4B, 0x03, 0x04]);
        assert_eq!(&bytes[4..6], &[20, 0]);
        assert_eq!(&bytes[6..8], &[0, 0]);
        assert_eq!(&bytes[8..10], &[0, 0]);
        // compressed == uncompressed == 2
        assert_eq!(&bytes[18..22], &[2, 0, 0, 0]);
        assert_eq!(&bytes[22..26], &[2, 0, 0, 0]);
        // filename length 1, then name and raw data
        assert_eq!(&bytes[26..28], &[1, 0]);
        assert_eq!(&bytes[30..31], b"x" as &[u8]);
        assert_eq!(&bytes[31..33], b"ab" as &[u8]);
    }

    #[test]
    fn central_directory_offsets_match_local_headers() {
        let bytes = StoreZipBuilder::default()
            .with_file("a.txt", "hello")
            .with_file("b.txt", "world!")
            .with_timestamp(fixed_stamp())
            .build()
            .unwrap();

        // Second local header follows the first: 30 + len("a.txt") + len("hello")
        let second_offset = 30 + 5 + 5;
        assert_eq!(
            &bytes[second_offset..second_offset + 4],
            &[0x50, 0x4B, 0x03, 0x04]
        );

        // The reference reader resolves both entries through the central directory
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        archive
            .by_name("b.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "world!");
    }

    #[test]
    fn deterministic_with_fixed_timestamp() {
        let build = || {
            StoreZipBuilder::default()
                .with_file("a.txt", "same")
                .with_timestamp(fixed_stamp())
                .build()
                .unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn dos_datetime_packing() {
        let stamp = DosDateTime::from_parts(2024, 6, 15, 12, 30, 42);
        // hour 12, minute 30, second 42/2=21
        assert_eq!(stamp.time, (12 << 11) | (30 << 5) | 21);
        // year 2024-1980=44, month 6, day 15
        assert_eq!(stamp.date, (44 << 9) | (6 << 5) | 15);

        // Pre-epoch years clamp to 1980
        let clamped = DosDateTime::from_parts(1970, 1, 1, 0, 0, 0);
        assert_eq!(clamped.date, (1 << 5) | 1);
    }

    #[test]
    fn build_to_writer_matches_build() {
        let builder = StoreZipBuilder::default()
            .with_file("a.txt", "hello")
            .with_timestamp(fixed_stamp());

        let mut streamed = Vec::new();
        builder.build_to_writer(&mut streamed).unwrap();
        assert_eq!(streamed, builder.build().unwrap());
    }
}
