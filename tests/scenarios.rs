use snpkit::{
    merge::{merge_files, write_merged_table},
    roh::{scan_file, RunReport},
    Chromosome, RohConfig, Vendor,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn raw_file(header: &str, lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", header).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

fn scan_lines(lines: &[String], config: &RohConfig) -> Vec<RunReport> {
    let file = raw_file("# This data file generated by 23andMe", lines);
    scan_file(file.path(), config).unwrap().reports
}

#[test]
fn merge_prefers_trusted_source() {
    let file1 = raw_file(
        "# This data file generated by 23andMe",
        &["rs1\t1\t100\tAG".to_string()],
    );
    let file2 = raw_file("# unknown vendor", &["rs1\t1\t100\tTC".to_string()]);

    for paths in [[file1.path(), file2.path()], [file2.path(), file1.path()]] {
        let summary = merge_files(&paths).unwrap();
        assert_eq!(summary.records.len(), 1);
        assert_eq!(summary.records[0].source, Vendor::TwentyThreeAndMe);
        assert_eq!(summary.records[0].genotype.to_string(), "AG");
        assert_eq!(summary.intersections, 1);
        // AG and TC match once both are mapped onto strand classes
        assert!(summary.conflicts.is_empty());
    }
}

#[test]
fn merge_reports_conflicting_values() {
    let file1 = raw_file(
        "# This data file generated by 23andMe",
        &["rs1\t1\t100\tAG".to_string(), "rs2\t2\t200\tCC".to_string()],
    );
    let file2 = raw_file(
        "#AncestryDNA raw data download",
        &[
            "rsid\tchromosome\tposition\tallele1\tallele2".to_string(),
            "rs1\t1\t100\tA\tT".to_string(),
            "rs3\t23\t300\tG\tG".to_string(),
        ],
    );

    let summary = merge_files(&[file1.path(), file2.path()]).unwrap();
    assert_eq!(summary.conflicts.len(), 1);
    assert_eq!(summary.conflicts[0].id, "rs1");
    assert_eq!(summary.conflicts[0].new_genotype, "AT");
    assert_eq!(summary.conflicts[0].existing_genotype, "AG");

    let ids: Vec<&str> = summary.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["rs1", "rs2", "rs3"]);
    assert_eq!(summary.records[0].genotype.to_string(), "AG");
    assert_eq!(summary.records[2].chromosome, Chromosome::X);

    let mut output = Vec::new();
    write_merged_table(&summary, &mut output).unwrap();
    let output = String::from_utf8(output).unwrap();
    assert!(output.contains(&format!(
        "#    {} with 2 SNPs\n",
        file1.path().to_string_lossy()
    )));
    assert!(output.ends_with("rs1\t1\t100\tAG\nrs2\t2\t200\tCC\nrs3\tX\t300\tGG\n"));
}

#[test]
fn roh_single_uninterrupted_run() {
    let lines: Vec<String> = (0..250)
        .map(|i| format!("rs{}\t1\t{}\tAA", i, 10_000 + i * 1_000))
        .collect();

    let reports = scan_lines(&lines, &RohConfig::default());
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].chromosome, Chromosome::Autosome(1));
    assert_eq!(reports[0].length, 250);
    assert_eq!(
        reports[0].to_string(),
        "Chr 1 has a ROH of length 250 from position 10000 to position 259000 (0.25 Mb)"
    );
}

#[test]
fn roh_breaks_at_close_heterozygous_call() {
    let lines: Vec<String> = (0..301)
        .map(|i| {
            let genotype = if i == 50 { "AG" } else { "CC" };
            format!("rs{}\t5\t{}\t{}", i, i * 100, genotype)
        })
        .collect();

    let reports = scan_lines(&lines, &RohConfig::default());
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].length, 250);
    assert_eq!(reports[0].start_position, 5_100);
    assert_eq!(reports[0].end_position, 30_000);
}

#[test]
fn roh_no_call_run() {
    let lines: Vec<String> = (0..15)
        .map(|i| format!("rs{}\t7\t{}\t--", i, 1_000 + i))
        .collect();

    assert_eq!(scan_lines(&lines, &RohConfig::default()).len(), 1);

    let config = RohConfig {
        no_call_threshold: 20,
        ..RohConfig::default()
    };
    assert!(scan_lines(&lines, &config).is_empty());
}

#[test]
fn roh_scan_aborts_on_malformed_position() {
    let file = raw_file(
        "# This data file generated by 23andMe",
        &["rs1\t1\t100\tAA".to_string(), "rs2\t1\tx\tAA".to_string()],
    );
    assert!(scan_file(file.path(), &RohConfig::default()).is_err());
}
