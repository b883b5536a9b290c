//! Raw data file reading
//!
//! Handles the text exports of the supported services. The vendor is read
//! from the header comments and the column layout from the first data line;
//! every data line then becomes one normalized [`SnpRecord`].

use crate::{
    utils::open_reader, Chromosome, FormatError, Genotype, SnpKitError, SnpKitResult, SnpRecord,
    Vendor,
};
use std::io::{BufRead, Read};
use std::path::Path;

/// Column separator of a raw file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// 23andMe, Genes for Good and AncestryDNA exports
    Tab,
    /// Double-quoted, comma-separated fields
    QuotedCsv,
    /// Single-space separated fields
    Space,
}

impl Layout {
    pub fn detect(line: &str) -> Self {
        if line.starts_with('"') {
            Layout::QuotedCsv
        } else if line.contains('\t') {
            Layout::Tab
        } else if line.contains(',') {
            Layout::QuotedCsv
        } else {
            Layout::Space
        }
    }

    fn delimiter(&self) -> u8 {
        match self {
            Layout::Tab => b'\t',
            Layout::QuotedCsv => b',',
            Layout::Space => b' ',
        }
    }
}

/// What the header of a raw file says about it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFileInfo {
    pub vendor: Vendor,
    pub layout: Layout,
}

/// Scan header comments for a vendor marker and the first data line for
/// the layout
pub fn inspect<R: BufRead>(reader: R) -> SnpKitResult<RawFileInfo> {
    let mut vendor = None;
    let mut layout = Layout::Tab;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('#') {
            if let Some(detected) = Vendor::from_header_line(line) {
                vendor = Some(detected);
            }
            continue;
        }

        layout = Layout::detect(line);
        break;
    }

    Ok(RawFileInfo {
        vendor: vendor.unwrap_or(Vendor::Other),
        layout,
    })
}

/// Build a record from the fields of one data line.
///
/// Returns `Ok(None)` for the `rsid` column header some exports carry as
/// their first uncommented line.
pub fn parse_fields(
    fields: &[&str],
    vendor: Vendor,
    origin_file: &str,
) -> Result<Option<SnpRecord>, FormatError> {
    let id = fields
        .first()
        .filter(|s| !s.is_empty())
        .ok_or(FormatError::MissingField("rsid"))?;
    if id.eq_ignore_ascii_case("rsid") {
        return Ok(None);
    }

    let chromosome = fields
        .get(1)
        .filter(|s| !s.is_empty())
        .ok_or(FormatError::MissingField("chromosome"))?;
    let chromosome = Chromosome::parse(chromosome, vendor)?;

    let position = fields
        .get(2)
        .filter(|s| !s.is_empty())
        .ok_or(FormatError::MissingField("position"))?;
    let position = position
        .parse::<u64>()
        .map_err(|_| FormatError::InvalidPosition(position.to_string()))?;

    let first = fields.get(3).ok_or(FormatError::MissingField("genotype"))?;
    let genotype = match fields.get(4) {
        Some(second) if !second.is_empty() => Genotype::from_alleles(first, second)?,
        _ => Genotype::parse(first)?,
    };

    Ok(Some(SnpRecord::new(
        id.to_string(),
        chromosome,
        position,
        genotype,
        vendor,
        origin_file.to_string(),
    )))
}

/// Iterator over the normalized records of one raw file
pub struct RawReader<R> {
    path: String,
    info: RawFileInfo,
    records: csv::StringRecordsIntoIter<R>,
}

impl RawReader<Box<dyn BufRead>> {
    /// Open a raw file, plain or gzip-compressed
    pub fn open<P: AsRef<Path>>(path: P) -> SnpKitResult<Self> {
        let info = inspect(open_reader(&path)?)?;
        let label = path.as_ref().to_string_lossy().to_string();
        log::debug!(
            "{}: detected vendor {}, layout {:?}",
            label,
            info.vendor,
            info.layout
        );
        Ok(RawReader::new(open_reader(&path)?, info, label))
    }
}

impl<R: Read> RawReader<R> {
    pub fn new(reader: R, info: RawFileInfo, path: String) -> Self {
        let records = csv::ReaderBuilder::new()
            .delimiter(info.layout.delimiter())
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader)
            .into_records();

        RawReader {
            path,
            info,
            records,
        }
    }

    pub fn vendor(&self) -> Vendor {
        self.info.vendor
    }

    pub fn layout(&self) -> Layout {
        self.info.layout
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<R: Read> Iterator for RawReader<R> {
    type Item = SnpKitResult<SnpRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(SnpKitError::Csv(e))),
            };
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let fields: Vec<&str> = match self.info.layout {
                Layout::Space => record.iter().filter(|f| !f.is_empty()).collect(),
                _ => record.iter().collect(),
            };
            if fields.iter().all(|f| f.is_empty()) {
                continue;
            }

            match parse_fields(&fields, self.info.vendor, &self.path) {
                Ok(Some(snp)) => return Some(Ok(snp)),
                Ok(None) => continue,
                Err(source) => {
                    return Some(Err(SnpKitError::Format {
                        path: self.path.clone(),
                        line,
                        source,
                    }))
                }
            }
        }
    }
}

/// Read every record of a raw file
pub fn read_snp_file<P: AsRef<Path>>(path: P) -> SnpKitResult<(Vendor, Vec<SnpRecord>)> {
    let reader = RawReader::open(path)?;
    let vendor = reader.vendor();
    let records = reader.collect::<SnpKitResult<Vec<_>>>()?;
    Ok((vendor, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn reader_for(text: &str) -> RawReader<Cursor<Vec<u8>>> {
        let info = inspect(Cursor::new(text.as_bytes())).unwrap();
        RawReader::new(Cursor::new(text.as_bytes().to_vec()), info, "test.txt".to_string())
    }

    #[test]
    fn test_layout_detect() {
        assert_eq!(Layout::detect("rs1\t1\t100\tAA"), Layout::Tab);
        assert_eq!(Layout::detect("\"rs1\",\"1\",\"100\",\"AA\""), Layout::QuotedCsv);
        assert_eq!(Layout::detect("rs1 1 100 AA"), Layout::Space);
    }

    #[test]
    fn test_inspect_detects_vendor() {
        let text = "# This data file generated by 23andMe at: Fri Apr 28\n# rsid\tchromosome\tposition\tgenotype\nrs1\t1\t100\tAG\n";
        let info = inspect(Cursor::new(text)).unwrap();
        assert_eq!(info.vendor, Vendor::TwentyThreeAndMe);
        assert_eq!(info.layout, Layout::Tab);

        let info = inspect(Cursor::new("rs1 1 100 AG\n")).unwrap();
        assert_eq!(info.vendor, Vendor::Other);
        assert_eq!(info.layout, Layout::Space);
    }

    #[test]
    fn test_read_23andme_layout() {
        let text = "# 23andMe\nrs1\t1\t100\tGA\nrs2\tMT\t200\tA\nrs3\tX\t300\t--\n";
        let records: Vec<SnpRecord> = reader_for(text).map(|r| r.unwrap()).collect();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, "rs1");
        assert_eq!(records[0].chromosome, Chromosome::Autosome(1));
        assert_eq!(records[0].position, 100);
        assert_eq!(records[0].genotype.to_string(), "AG");
        assert_eq!(records[0].source, Vendor::TwentyThreeAndMe);
        assert_eq!(records[0].origin_file, "test.txt");
        assert_eq!(records[1].chromosome, Chromosome::MT);
        assert_eq!(records[1].genotype.to_string(), "AA");
        assert!(records[2].genotype.is_no_call());
    }

    #[test]
    fn test_read_ancestry_layout() {
        let text = "#AncestryDNA raw data download\nrsid\tchromosome\tposition\tallele1\tallele2\nrs1\t23\t100\tT\tC\nrs2\t25\t200\t0\t0\n";
        let records: Vec<SnpRecord> = reader_for(text).map(|r| r.unwrap()).collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].chromosome, Chromosome::X);
        assert_eq!(records[0].genotype.to_string(), "CT");
        assert_eq!(records[0].source, Vendor::AncestryDna);
        assert_eq!(records[1].chromosome, Chromosome::X);
        assert!(records[1].genotype.is_no_call());
    }

    #[test]
    fn test_read_quoted_csv_layout() {
        let text = "\"RSID\",\"CHROMOSOME\",\"POSITION\",\"RESULT\"\n\"rs1\",\"2\",\"1500\",\"TT\"\n";
        let records: Vec<SnpRecord> = reader_for(text).map(|r| r.unwrap()).collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].chromosome, Chromosome::Autosome(2));
        assert_eq!(records[0].position, 1500);
        assert_eq!(records[0].genotype.to_string(), "TT");
    }

    #[test]
    fn test_read_space_layout() {
        let text = "rs1  3 42 CA\n";
        let records: Vec<SnpRecord> = reader_for(text).map(|r| r.unwrap()).collect();
        assert_eq!(records[0].chromosome, Chromosome::Autosome(3));
        assert_eq!(records[0].genotype.to_string(), "AC");
    }

    #[test]
    fn test_format_errors() {
        let mut reader = reader_for("rs1\t1\tabc\tAA\n");
        match reader.next() {
            Some(Err(SnpKitError::Format { line, source, .. })) => {
                assert_eq!(line, 1);
                assert_eq!(source, FormatError::InvalidPosition("abc".to_string()));
            }
            other => panic!("expected format error, got {:?}", other),
        }

        let mut reader = reader_for("rs1\t1\t100\n");
        assert!(matches!(
            reader.next(),
            Some(Err(SnpKitError::Format {
                source: FormatError::MissingField("genotype"),
                ..
            }))
        ));

        let mut reader = reader_for("rs1\tchrZ\t100\tAA\n");
        assert!(matches!(
            reader.next(),
            Some(Err(SnpKitError::Format {
                source: FormatError::InvalidChromosome(_),
                ..
            }))
        ));
    }

    #[test]
    fn test_read_snp_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "# Genes for Good 23andMe compatible").unwrap();
        writeln!(temp_file, "rs1\t1\t100\tAG").unwrap();
        writeln!(temp_file, "rs2\t1\t200\tCC").unwrap();

        let (vendor, records) = read_snp_file(temp_file.path()).unwrap();
        assert_eq!(vendor, Vendor::GenesForGood);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[1].origin_file,
            temp_file.path().to_string_lossy().to_string()
        );
    }

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(
            RawReader::open("/nonexistent/genome.txt"),
            Err(SnpKitError::FileNotFound(_))
        ));
    }
}
