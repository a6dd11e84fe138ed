//! Reader for `docker stats` table dumps, one file per replica count.
//!
//! Each file is a whitespace table whose fields are separated by two or more
//! spaces. Captures appended with `>>` repeat the header row, so any row whose
//! `NET I/O` field is the header text itself is dropped.

use crate::error::ParseError;
use crate::units::{percentage_to_float, to_bits};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

const NAME_COL: &str = "NAME";
const CPU_COL: &str = "CPU %";
const MEM_USAGE_COL: &str = "MEM USAGE / LIMIT";
const MEM_PERCENT_COL: &str = "MEM %";
const NET_IO_COL: &str = "NET I/O";
const BLOCK_IO_COL: &str = "BLOCK I/O";
const PIDS_COL: &str = "PIDS";
const CONTAINER_ID_COL: &str = "CONTAINER ID";

const REQUIRED_COLUMNS: [&str; 8] = [
    CONTAINER_ID_COL,
    NAME_COL,
    CPU_COL,
    MEM_USAGE_COL,
    MEM_PERCENT_COL,
    NET_IO_COL,
    BLOCK_IO_COL,
    PIDS_COL,
];

/// One measurement instant for one container.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub container: String,
    pub cpu_percentage: f64,
    pub mem_percentage: f64,
    pub mem_usage_bits: u64,
    pub net_input_bits: u64,
    pub net_output_bits: u64,
}

/// All rows of one experiment run, in file (= time) order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaDataset {
    pub replicas: u32,
    pub rows: Vec<SnapshotRow>,
}

impl ReplicaDataset {
    /// Rows of a single container, in time order.
    pub fn rows_for<'a>(&'a self, container: &'a str) -> impl Iterator<Item = &'a SnapshotRow> + 'a {
        self.rows.iter().filter(move |row| row.container == container)
    }
}

/// Datasets keyed and ordered by replica count.
pub type Datasets = BTreeMap<u32, ReplicaDataset>;

/// Load every `*_<replicas>.csv` file of a directory.
pub fn load_datasets(dir: &Path) -> Result<Datasets, ParseError> {
    let io_err = |source| ParseError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(io_err)?;
    paths.retain(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "csv"));
    paths.sort();

    let mut datasets = Datasets::new();
    for path in paths {
        let replicas = replica_count_from_path(&path)?;
        if datasets.contains_key(&replicas) {
            return Err(ParseError::DuplicateReplicaCount {
                path,
                count: replicas,
            });
        }

        let content = fs::read_to_string(&path).map_err(|source| ParseError::Io {
            path: path.clone(),
            source,
        })?;
        let rows = parse_stats(&path, &content)?;
        info!(
            "Loaded {} rows for {} replicas from {}",
            rows.len(),
            replicas,
            path.display()
        );
        datasets.insert(replicas, ReplicaDataset { replicas, rows });
    }

    Ok(datasets)
}

/// The integer between the last `_` and the extension, e.g. `stats_3.csv` -> 3.
pub fn replica_count_from_path(path: &Path) -> Result<u32, ParseError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.rsplit_once('_'))
        .and_then(|(_, count)| count.parse().ok())
        .ok_or_else(|| ParseError::MissingReplicaCount(path.to_path_buf()))
}

/// Parse the content of one stats file. `path` is only used in errors.
pub fn parse_stats(path: &Path, content: &str) -> Result<Vec<SnapshotRow>, ParseError> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines
        .next()
        .ok_or_else(|| ParseError::MissingHeader(path.to_path_buf()))?;
    let header = split_fields(header);

    let column = |name: &'static str| {
        header
            .iter()
            .position(|h| *h == name)
            .ok_or_else(|| ParseError::MissingColumn {
                path: path.to_path_buf(),
                column: name,
            })
    };
    for name in REQUIRED_COLUMNS {
        column(name)?;
    }
    let name_idx = column(NAME_COL)?;
    let cpu_idx = column(CPU_COL)?;
    let mem_usage_idx = column(MEM_USAGE_COL)?;
    let mem_percent_idx = column(MEM_PERCENT_COL)?;
    let net_idx = column(NET_IO_COL)?;

    let mut rows = Vec::new();
    let mut repeated_headers = 0;

    for (line_num, line) in lines {
        let fields = split_fields(line);
        if fields.get(net_idx) == Some(&NET_IO_COL) {
            repeated_headers += 1;
            continue;
        }
        if fields.len() != header.len() {
            return Err(ParseError::FieldCount {
                path: path.to_path_buf(),
                line: line_num,
                expected: header.len(),
                found: fields.len(),
            });
        }

        let malformed = |column: &'static str, value: &str| ParseError::MalformedField {
            path: path.to_path_buf(),
            line: line_num,
            column,
            value: value.to_string(),
        };

        let cpu_percentage = percentage_to_float(fields[cpu_idx])
            .ok_or_else(|| malformed(CPU_COL, fields[cpu_idx]))?;
        let mem_percentage = percentage_to_float(fields[mem_percent_idx])
            .ok_or_else(|| malformed(MEM_PERCENT_COL, fields[mem_percent_idx]))?;

        let (usage, _limit) = fields[mem_usage_idx]
            .split_once('/')
            .ok_or_else(|| malformed(MEM_USAGE_COL, fields[mem_usage_idx]))?;

        let (net_in, net_out) = match fields[net_idx].split('/').collect::<Vec<_>>()[..] {
            [net_in, net_out] => (net_in.trim(), net_out.trim()),
            _ => return Err(malformed(NET_IO_COL, fields[net_idx])),
        };

        rows.push(SnapshotRow {
            container: fields[name_idx].to_string(),
            cpu_percentage,
            mem_percentage,
            mem_usage_bits: to_bits(usage.trim()),
            net_input_bits: to_bits(net_in),
            net_output_bits: to_bits(net_out),
        });
    }

    if repeated_headers > 0 {
        debug!(
            "{}: dropped {} repeated header rows",
            path.display(),
            repeated_headers
        );
    }

    Ok(rows)
}

/// Split a table line on runs of two or more whitespace characters.
fn split_fields(line: &str) -> Vec<&str> {
    static FIELD_SEPARATOR: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s\s+").expect("valid field separator"));

    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }
    FIELD_SEPARATOR.split(line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "CONTAINER ID   NAME      CPU %     MEM USAGE / LIMIT     MEM %     NET I/O           BLOCK I/O     PIDS";

    fn sample_log() -> String {
        [
            HEADER,
            "3f2a1b0c9d8e   web       0.50%     12.3MiB / 7.6GiB      0.16%     1.2kB / 648B      0B / 0B       5",
            "9a8b7c6d5e4f   db        12.25%    256MiB / 7.6GiB       3.29%     2MB / 1.5MB       4MB / 0B      21",
            HEADER,
            "3f2a1b0c9d8e   web       1.00%     13MiB / 7.6GiB        0.17%     2.4kB / 1.3kB     0B / 0B       5",
            "",
            "9a8b7c6d5e4f   db        8.00%     260MiB / 7.6GiB       3.34%     3MB / 2MB         4MB / 0B      21",
        ]
        .join("\n")
    }

    #[test]
    fn test_split_fields_on_wide_gaps() {
        assert_eq!(
            split_fields("  a b   c  d / e  "),
            vec!["a b", "c", "d / e"]
        );
        assert_eq!(split_fields(HEADER).len(), 8);
        assert!(split_fields("   ").is_empty());
    }

    #[test]
    fn test_parse_stats_drops_repeated_headers() {
        let rows = parse_stats(Path::new("stats_1.csv"), &sample_log()).unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.container != NAME_COL));
    }

    #[test]
    fn test_parse_stats_derives_metrics() {
        let rows = parse_stats(Path::new("stats_1.csv"), &sample_log()).unwrap();
        let web = &rows[0];
        assert_eq!(web.container, "web");
        assert_eq!(web.cpu_percentage, 0.5);
        assert_eq!(web.mem_percentage, 0.16);
        assert_eq!(web.mem_usage_bits, 98_400_000);
        assert_eq!(web.net_input_bits, 9600);
        assert_eq!(web.net_output_bits, 648);

        let db = &rows[1];
        assert_eq!(db.mem_usage_bits, 2_048_000_000);
        assert_eq!(db.net_input_bits, 16_000_000);
        assert_eq!(db.net_output_bits, 12_000_000);
    }

    #[test]
    fn test_parse_stats_keeps_file_order() {
        let rows = parse_stats(Path::new("stats_1.csv"), &sample_log()).unwrap();
        let order: Vec<_> = rows.iter().map(|r| r.container.as_str()).collect();
        assert_eq!(order, ["web", "db", "web", "db"]);
        let dataset = ReplicaDataset { replicas: 1, rows };
        let cpu: Vec<_> = dataset.rows_for("web").map(|r| r.cpu_percentage).collect();
        assert_eq!(cpu, [0.5, 1.0]);
    }

    #[test]
    fn test_parse_stats_unknown_unit_is_zero() {
        let log = format!(
            "{HEADER}\nabc   web   1.00%   10 XB / 7.6GiB   0.10%   1kB / 1kB   0B / 0B   1\n"
        );
        let rows = parse_stats(Path::new("stats_1.csv"), &log).unwrap();
        assert_eq!(rows[0].mem_usage_bits, 0);
    }

    #[test]
    fn test_parse_stats_mem_usage_without_spaces() {
        let log = format!("{HEADER}\nabc   web   1.00%   12MiB/1GiB   0.10%   1kB/2kB   0B / 0B   1\n");
        let rows = parse_stats(Path::new("stats_1.csv"), &log).unwrap();
        assert_eq!(rows[0].mem_usage_bits, 96_000_000);
        assert_eq!(rows[0].net_input_bits, 8000);
        assert_eq!(rows[0].net_output_bits, 16_000);
    }

    #[test]
    fn test_parse_stats_missing_column() {
        let log = "CONTAINER ID   NAME   CPU %   MEM %   BLOCK I/O   PIDS\n";
        let err = parse_stats(Path::new("stats_1.csv"), log).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingColumn { column: "MEM USAGE / LIMIT", .. }
        ));
    }

    #[test]
    fn test_parse_stats_empty_file() {
        let err = parse_stats(Path::new("stats_1.csv"), "\n\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingHeader(_)));
    }

    #[test]
    fn test_parse_stats_malformed_percentage() {
        let log = format!("{HEADER}\nabc   web   --   1MiB / 2GiB   0.10%   1kB / 1kB   0B / 0B   1\n");
        let err = parse_stats(Path::new("stats_1.csv"), &log).unwrap_err();
        assert!(err.to_string().contains("stats_1.csv:2"));
        assert!(err.to_string().contains("CPU %"));
    }

    #[test]
    fn test_parse_stats_field_count() {
        let log = format!("{HEADER}\nabc   web   1.00%\n");
        let err = parse_stats(Path::new("stats_1.csv"), &log).unwrap_err();
        assert!(matches!(err, ParseError::FieldCount { expected: 8, found: 3, .. }));
    }

    #[test]
    fn test_replica_count_from_path() {
        assert_eq!(replica_count_from_path(Path::new("logs/stats_3.csv")).unwrap(), 3);
        assert_eq!(replica_count_from_path(Path::new("a_b_12.csv")).unwrap(), 12);
        assert!(replica_count_from_path(Path::new("logs/stats.csv")).is_err());
        assert!(replica_count_from_path(Path::new("logs/stats_x.csv")).is_err());
    }
}
