//! Text rendering of per-position quality statistics.
//!
//! The layout produced here is what downstream comparisons diff byte for byte, so the
//! column order, separators and numeric precision must not change:
//!
//! * fields are tab-separated, lines end with `\n`;
//! * integers are printed plainly, `mean` and `stdev` with exactly two decimals;
//! * per-class fields are `count min max sum mean stdev Q1 med Q3 IQR lW rW`;
//! * a class with no observations prints `0` for `count` and `sum` and `NA` elsewhere;
//! * a count-only class (FASTA input) prints its `count` and `NA` for every quality field;
//! * rows stop at the last covered position, and an empty table yields the header only.

use crate::sequence_processor::collectors::quality::{
    FinalizedTable, Nucleotide, PositionSummary, QualitySummary,
};
use clap::ValueEnum;
use std::io::{self, Write};

/// Per-class column names, in output order.
pub const COMMON_HEADERS: [&str; 12] =
    ["count", "min", "max", "sum", "mean", "stdev", "Q1", "med", "Q3", "IQR", "lW", "rW"];

const MISSING: &str = "NA";

/// Report layout selected with `--ov`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputVersion {
    /// One row per column: overall statistics plus per-base counts
    #[default]
    V1,
    /// One row per cycle: full statistics for all bases and for each of A, C, G, T, N
    V2,
}

pub struct QualStatsReport<'a> {
    table: &'a FinalizedTable,
    version: OutputVersion,
    skipped: Option<u64>,
}

impl<'a> QualStatsReport<'a> {
    pub fn new(table: &'a FinalizedTable, version: OutputVersion) -> Self {
        Self { table, version, skipped: None }
    }

    /// Adds the `#skipped_records` trailer written by lenient runs.
    pub fn with_skipped(mut self, skipped: u64) -> Self {
        self.skipped = Some(skipped);
        self
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.version {
            OutputVersion::V1 => self.write_v1(out)?,
            OutputVersion::V2 => self.write_v2(out)?,
        }
        if let Some(skipped) = self.skipped {
            writeln!(out, "#skipped_records\t{}", skipped)?;
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        self.write_to(&mut buf).expect("writing to a Vec cannot fail");
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn write_v1<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "column")?;
        for header in COMMON_HEADERS {
            write!(out, "\t{}", header)?;
        }
        for base in Nucleotide::BASES {
            write!(out, "\t{}_Count", base.label())?;
        }
        writeln!(out, "\tMax_count")?;

        let max_count = self.table.max_count();
        for position in self.table.iter() {
            write!(out, "{}\t", position.position + 1)?;
            write_summary(out, &position.all)?;
            for base in Nucleotide::BASES {
                write!(out, "\t{}", position.base_count(base))?;
            }
            writeln!(out, "\t{}", max_count)?;
        }
        Ok(())
    }

    fn write_v2<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "cycle\tmax_count")?;
        for class in Nucleotide::CLASSES {
            for header in COMMON_HEADERS {
                write!(out, "\t{}_{}", class.label(), header)?;
            }
        }
        writeln!(out)?;

        let max_count = self.table.max_count();
        for position in self.table.iter() {
            write!(out, "{}\t{}", position.position + 1, max_count)?;
            write_classes(out, position)?;
            writeln!(out)?;
        }
        Ok(())
    }
}

fn write_classes<W: Write>(out: &mut W, position: &PositionSummary) -> io::Result<()> {
    for class in Nucleotide::CLASSES {
        write!(out, "\t")?;
        match position.class(class) {
            Some(summary) => write_summary(out, summary)?,
            None => write_missing(out)?,
        }
    }
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, s: &QualitySummary) -> io::Result<()> {
    if !s.scored {
        write!(out, "{}", s.count)?;
        for _ in 1..COMMON_HEADERS.len() {
            write!(out, "\t{}", MISSING)?;
        }
        return Ok(());
    }
    write!(
        out,
        "{}\t{}\t{}\t{}\t{:.2}\t{:.2}\t{}\t{}\t{}\t{}\t{}\t{}",
        s.count,
        s.min,
        s.max,
        s.sum,
        s.mean,
        s.std_dev,
        s.q1,
        s.median,
        s.q3,
        s.iqr,
        s.left_whisker,
        s.right_whisker
    )
}

fn write_missing<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "0\t{m}\t{m}\t0", m = MISSING)?;
    for _ in 4..COMMON_HEADERS.len() {
        write!(out, "\t{}", MISSING)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence_processor::collectors::base::StatsCollector;
    use crate::sequence_processor::collectors::quality::QualityTable;

    fn finalized(reads: &[(&str, &str)]) -> FinalizedTable {
        let mut table = QualityTable::default();
        for (seq, qual) in reads {
            for (position, (&base, &symbol)) in
                seq.as_bytes().iter().zip(qual.as_bytes()).enumerate()
            {
                table.process_base(position, base, i32::from(symbol) - 33);
            }
        }
        table.finalize()
    }

    #[test]
    fn test_v1_layout() {
        let table = finalized(&[("AC", "?5"), ("A", "5")]);
        let report = QualStatsReport::new(&table, OutputVersion::V1).render();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(
            lines[0],
            "column\tcount\tmin\tmax\tsum\tmean\tstdev\tQ1\tmed\tQ3\tIQR\tlW\trW\t\
             A_Count\tC_Count\tG_Count\tT_Count\tN_Count\tMax_count"
        );
        assert_eq!(lines[1], "1\t2\t20\t30\t50\t25.00\t5.00\t20\t30\t30\t10\t20\t30\t2\t0\t0\t0\t0\t2");
        assert_eq!(lines[2], "2\t1\t20\t20\t20\t20.00\t0.00\t20\t20\t20\t0\t20\t20\t0\t1\t0\t0\t0\t2");
        assert_eq!(lines.len(), 3);
        assert!(report.ends_with('\n'));
    }

    #[test]
    fn test_v2_layout() {
        let table = finalized(&[("G", "+")]);
        let report = QualStatsReport::new(&table, OutputVersion::V2).render();
        let lines: Vec<&str> = report.lines().collect();

        let header: Vec<&str> = lines[0].split('\t').collect();
        assert_eq!(header.len(), 2 + 6 * COMMON_HEADERS.len());
        assert_eq!(&header[..4], &["cycle", "max_count", "ALL_count", "ALL_min"]);
        assert_eq!(header[2 + 2 * COMMON_HEADERS.len()], "C_count");

        let row: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(row.len(), header.len());
        assert_eq!(&row[..4], &["1", "1", "1", "10"]);
        // A has no observations
        assert_eq!(&row[14..18], &["0", "NA", "NA", "0"]);
        assert!(row[18..26].iter().all(|f| *f == "NA"));
        // G mirrors ALL
        let g_start = 2 + 3 * COMMON_HEADERS.len();
        assert_eq!(&row[g_start..g_start + 12], &row[2..14]);
    }

    #[test]
    fn test_count_only_rows() {
        let mut table = QualityTable::default();
        table.process_unscored_base(0, b'A', 7);
        let table = table.finalize();

        let v1 = QualStatsReport::new(&table, OutputVersion::V1).render();
        let na = vec!["NA"; 11].join("\t");
        assert_eq!(v1.lines().nth(1).unwrap(), format!("1\t7\t{}\t7\t0\t0\t0\t0\t7", na));

        let v2 = QualStatsReport::new(&table, OutputVersion::V2).render();
        let row: Vec<&str> = v2.lines().nth(1).unwrap().split('\t').collect();
        assert_eq!(row.len(), 2 + 6 * COMMON_HEADERS.len());
        assert_eq!(&row[..3], &["1", "7", "7"]);
        assert!(row[3..14].iter().all(|f| *f == "NA"));
        // C has no observations
        assert_eq!(&row[26..30], &["0", "NA", "NA", "0"]);
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let table = FinalizedTable::default();
        for version in [OutputVersion::V1, OutputVersion::V2] {
            let report = QualStatsReport::new(&table, version).render();
            assert_eq!(report.lines().count(), 1);
        }
    }

    #[test]
    fn test_skipped_trailer() {
        let table = finalized(&[("A", "I")]);
        let report = QualStatsReport::new(&table, OutputVersion::V1).with_skipped(3).render();
        assert!(report.ends_with("#skipped_records\t3\n"));
    }
}
