use std::env;
use std::time::Instant;

use sysinfo::{get_current_pid, ProcessRefreshKind, System};
use wfa_core::utils::{deterministic_dna, mutate_dna};
use wfa_core::{AlignerBuilder, Penalties};

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("wfa_probe: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    eprintln!(
        "wfa_probe: {} scenarios, lengths 256..={}, error rate {}, full-DP check up to {}",
        SCENARIOS.len(),
        options.max_len,
        options.error_rate,
        options.verify_limit
    );

    let mut rss = RssMeter::new();
    let mut measurements = Vec::new();
    for scenario in SCENARIOS {
        eprintln!("{} ({})", scenario.title, scenario.blurb);
        measurements.extend(run_scenario(scenario, &options, &mut rss));
    }

    let failed = print_summary(&measurements, &options);
    options.format.write(&measurements);
    if failed > 0 {
        std::process::exit(1);
    }
}

struct Options {
    format: OutputFormat,
    verify_limit: usize,
    max_len: usize,
    error_rate: f64,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut format = OutputFormat::Csv;
        let mut verify_limit = 1024usize;
        let mut max_len = 16384usize;
        let mut error_rate = 0.05f64;

        while let Some(arg) = args.next() {
            let arg = arg.into();
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
                None => (arg, None),
            };
            if flag == "--help" || flag == "-h" {
                Options::print_help();
                std::process::exit(0);
            }
            let value = match inline {
                Some(value) => value,
                None => args
                    .next()
                    .ok_or_else(|| format!("missing value after {flag}"))?
                    .into(),
            };
            match flag.as_str() {
                "--format" => format = OutputFormat::from_str(&value)?,
                "--verify-limit" => {
                    verify_limit = value
                        .parse::<usize>()
                        .map_err(|_| "verify limit must be a positive integer".to_string())?
                }
                "--max-len" => {
                    max_len = value
                        .parse::<usize>()
                        .map_err(|_| "max length must be a positive integer".to_string())?
                }
                "--error-rate" => {
                    error_rate = value
                        .parse::<f64>()
                        .ok()
                        .filter(|r| (0.0..=1.0).contains(r))
                        .ok_or_else(|| "error rate must be between 0 and 1".to_string())?
                }
                _ => return Err(format!("unrecognized argument '{flag}'")),
            }
        }

        Ok(Self {
            format,
            verify_limit,
            max_len,
            error_rate,
        })
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --release --bin wfa_probe [-- <options>]

Options:
  --format <csv|table|json>     Output format (default: csv)
  --verify-limit <N>            Maximum sequence length to verify via full DP (default: 1024)
  --max-len <N>                 Longest sequence to align (default: 16384)
  --error-rate <R>              Fraction of positions edited in the text (default: 0.05)
  -h, --help                    Print this help message

Examples:
  cargo run --release --bin wfa_probe
  cargo run --release --bin wfa_probe -- --format table --verify-limit 512 --max-len 65536
"
        );
    }
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Csv,
    Table,
    Json,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "csv" => Ok(Self::Csv),
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write(self, measurements: &[Measurement]) {
        let rows: Vec<Vec<(&str, Field)>> = measurements.iter().map(Measurement::fields).collect();
        let header: Vec<&str> = match rows.first() {
            Some(row) => row.iter().map(|(name, _)| *name).collect(),
            None => return,
        };
        match self {
            OutputFormat::Csv => {
                println!("{}", header.join(","));
                for row in &rows {
                    let cells: Vec<String> = row.iter().map(|(_, f)| f.quoted()).collect();
                    println!("{}", cells.join(","));
                }
            }
            OutputFormat::Table => {
                let widths: Vec<usize> = (0..header.len())
                    .map(|col| {
                        rows.iter()
                            .map(|row| row[col].1.to_string().len())
                            .chain([header[col].len()])
                            .max()
                            .unwrap_or(0)
                    })
                    .collect();
                let line = |cells: Vec<String>| {
                    let padded: Vec<String> = cells
                        .iter()
                        .zip(&widths)
                        .map(|(cell, &w)| format!("{cell:<w$}"))
                        .collect();
                    println!("{}", padded.join("  ").trim_end());
                };
                line(header.iter().map(|h| h.to_string()).collect());
                line(widths.iter().map(|&w| "-".repeat(w)).collect());
                for row in &rows {
                    line(row.iter().map(|(_, f)| f.to_string()).collect());
                }
            }
            OutputFormat::Json => {
                let objects: Vec<String> = rows
                    .iter()
                    .map(|row| {
                        let pairs: Vec<String> = row
                            .iter()
                            .map(|(name, f)| format!("\"{name}\":{}", f.quoted()))
                            .collect();
                        format!("  {{{}}}", pairs.join(","))
                    })
                    .collect();
                println!("[\n{}\n]", objects.join(",\n"));
            }
        }
    }
}

struct Measurement {
    scenario: &'static str,
    len: usize,
    score: i32,
    cigar_ops: usize,
    wall_s: f64,
    rss_delta_kib: u64,
    aligner_kib: u64,
    status: VerificationStatus,
    detail: Option<String>,
}

/// One output cell. Text is quoted in CSV and JSON, numbers are not.
enum Field {
    Text(String),
    Int(i64),
    Secs(f64),
}

impl Field {
    fn quoted(&self) -> String {
        match self {
            Field::Text(text) => format!("\"{}\"", text.replace('"', "'")),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Text(text) => f.write_str(text),
            Field::Int(n) => write!(f, "{n}"),
            Field::Secs(secs) => write!(f, "{secs:.3}"),
        }
    }
}

impl Measurement {
    fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![
            ("scenario", Field::Text(self.scenario.to_string())),
            ("len", Field::Int(self.len as i64)),
            ("score", Field::Int(i64::from(self.score))),
            ("cigar_ops", Field::Int(self.cigar_ops as i64)),
            ("wall_s", Field::Secs(self.wall_s)),
            ("rss_delta_kib", Field::Int(self.rss_delta_kib as i64)),
            ("aligner_kib", Field::Int(self.aligner_kib as i64)),
            ("status", Field::Text(self.status.label().to_string())),
            ("detail", Field::Text(self.detail.clone().unwrap_or_default())),
        ]
    }
}

#[derive(Clone, Copy, PartialEq)]
enum VerificationStatus {
    NotChecked,
    Passed,
    Failed,
}

impl VerificationStatus {
    fn label(&self) -> &'static str {
        match self {
            VerificationStatus::NotChecked => "not_checked",
            VerificationStatus::Passed => "passed",
            VerificationStatus::Failed => "failed",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            VerificationStatus::Passed => "✓",
            VerificationStatus::Failed => "✗",
            VerificationStatus::NotChecked => "○",
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    High,
    Low,
    ScoreOnly,
}

struct Scenario {
    name: &'static str,
    title: &'static str,
    blurb: &'static str,
    penalties: Penalties,
    mode: Mode,
    /// Adaptive reduction may miss the optimum, so only an upper bound is
    /// checked.
    adaptive: bool,
}

const AFFINE: Penalties = Penalties::Affine(wfa_core::AffinePenalties {
    mismatch: 4,
    gap_opening: 6,
    gap_extension: 2,
});

const AFFINE2P: Penalties = Penalties::Affine2p(wfa_core::Affine2pPenalties {
    mismatch: 4,
    gap_opening1: 6,
    gap_extension1: 2,
    gap_opening2: 24,
    gap_extension2: 1,
});

const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "edit",
        title: "Edit Distance",
        blurb: "Single component, unit costs, full layers kept.",
        penalties: Penalties::Edit,
        mode: Mode::High,
        adaptive: false,
    },
    Scenario {
        name: "gap_linear",
        title: "Gap-Linear Alignment",
        blurb: "Single component, mismatch 4, indel 2.",
        penalties: Penalties::Linear(wfa_core::LinearPenalties {
            mismatch: 4,
            indel: 2,
        }),
        mode: Mode::High,
        adaptive: false,
    },
    Scenario {
        name: "gap_affine",
        title: "Gap-Affine Alignment",
        blurb: "M/I1/D1 components, mismatch 4, opening 6, extension 2.",
        penalties: AFFINE,
        mode: Mode::High,
        adaptive: false,
    },
    Scenario {
        name: "gap_affine_2p",
        title: "Two-Piece Gap-Affine Alignment",
        blurb: "All five components, long gaps switch to the cheap extension.",
        penalties: AFFINE2P,
        mode: Mode::High,
        adaptive: false,
    },
    Scenario {
        name: "gap_affine_low_memory",
        title: "Gap-Affine Alignment (low memory)",
        blurb: "Score window only, script recovered from piggyback trace words.",
        penalties: AFFINE,
        mode: Mode::Low,
        adaptive: false,
    },
    Scenario {
        name: "gap_affine_2p_low_memory",
        title: "Two-Piece Gap-Affine Alignment (low memory)",
        blurb: "Score window only, five components carrying trace words.",
        penalties: AFFINE2P,
        mode: Mode::Low,
        adaptive: false,
    },
    Scenario {
        name: "gap_affine_score_only",
        title: "Gap-Affine Score Only",
        blurb: "Score window only, no script.",
        penalties: AFFINE,
        mode: Mode::ScoreOnly,
        adaptive: false,
    },
    Scenario {
        name: "gap_affine_adaptive",
        title: "Gap-Affine Alignment (adaptive reduction)",
        blurb: "Band trimmed by distance to the end; scores bounded below by the optimum.",
        penalties: AFFINE,
        mode: Mode::Low,
        adaptive: true,
    },
];

fn sizes(max_len: usize) -> Vec<usize> {
    std::iter::successors(Some(256usize), |&len| len.checked_mul(2))
        .take_while(|&len| len <= max_len)
        .collect()
}

/// Every length for one scenario, timed and checked.
fn run_scenario(scenario: &Scenario, options: &Options, rss: &mut RssMeter) -> Vec<Measurement> {
    sizes(options.max_len)
        .into_iter()
        .map(|len| {
            let pattern = deterministic_dna(len, len as u64);
            let text = mutate_dna(&pattern, options.error_rate, len as u64 + 7);
            let mut m = Measurement {
                scenario: scenario.name,
                len,
                score: 0,
                cigar_ops: 0,
                wall_s: 0.0,
                rss_delta_kib: 0,
                aligner_kib: 0,
                status: VerificationStatus::NotChecked,
                detail: None,
            };
            let rss_before = rss.kib();
            let start = Instant::now();
            let checked = align_and_check(scenario, options, &pattern, &text, &mut m);
            m.wall_s = start.elapsed().as_secs_f64();
            m.rss_delta_kib = rss.kib().saturating_sub(rss_before);
            match checked {
                Ok(status) => m.status = status,
                Err(detail) => {
                    m.status = VerificationStatus::Failed;
                    m.detail = Some(detail);
                }
            }
            eprintln!(
                "  {} len={:<6} score={:<6} ops={:<7} aligner={} KiB  {:.3}s",
                m.status.icon(),
                len,
                m.score,
                m.cigar_ops,
                m.aligner_kib,
                m.wall_s
            );
            m
        })
        .collect()
}

fn align_and_check(
    scenario: &Scenario,
    options: &Options,
    pattern: &[u8],
    text: &[u8],
    m: &mut Measurement,
) -> Result<VerificationStatus, String> {
    let mut builder = AlignerBuilder::new()
        .penalties(scenario.penalties)
        .low_memory(scenario.mode == Mode::Low)
        .max_resident_memory(u64::MAX);
    if scenario.mode == Mode::ScoreOnly {
        builder = builder.score_only();
    }
    builder = if scenario.adaptive {
        builder.reduction_adaptive(10, 50)
    } else {
        builder.reduction_none()
    };
    let mut aligner = builder
        .build(pattern.len(), text.len())
        .map_err(|err| err.to_string())?;
    let alignment = aligner.align(pattern, text).map_err(|err| err.to_string())?;
    m.score = alignment.score;

    if let Some(cigar) = &alignment.cigar {
        m.cigar_ops = cigar.len();
        if !cigar.is_valid_for(pattern, text) {
            return Err("script does not transform pattern into text".to_string());
        }
        // adjacent runs of different gap pieces may rescore cheaper
        let rescored = cigar.score(&scenario.penalties);
        let consistent = if scenario.adaptive {
            rescored <= alignment.score
        } else {
            rescored == alignment.score
        };
        if !consistent {
            return Err(format!("script costs {rescored}, reported {}", alignment.score));
        }
    }
    m.aligner_kib = aligner.get_size() / 1024;

    if pattern.len() > options.verify_limit {
        return Ok(VerificationStatus::NotChecked);
    }
    let baseline = gotoh_score(pattern, text, &scenario.penalties);
    let ok = if scenario.adaptive {
        m.score >= baseline
    } else {
        m.score == baseline
    };
    if ok {
        Ok(VerificationStatus::Passed)
    } else {
        Err(format!("expected {baseline}, got {}", m.score))
    }
}

/// Totals and per-scenario scaling on stderr. Returns the failure count.
fn print_summary(measurements: &[Measurement], options: &Options) -> usize {
    let count = |status| measurements.iter().filter(|m| m.status == status).count();
    let failed = count(VerificationStatus::Failed);
    eprintln!();
    eprintln!(
        "{} runs: {} passed, {} failed, {} above the check limit of {}",
        measurements.len(),
        count(VerificationStatus::Passed),
        failed,
        count(VerificationStatus::NotChecked),
        options.verify_limit
    );
    for m in measurements.iter().filter(|m| m.detail.is_some()) {
        eprintln!(
            "  {} {} len={}: {}",
            m.status.icon(),
            m.scenario,
            m.len,
            m.detail.as_deref().unwrap_or_default()
        );
    }

    for scenario in SCENARIOS {
        let runs: Vec<&Measurement> = measurements
            .iter()
            .filter(|m| m.scenario == scenario.name)
            .collect();
        let (Some(first), Some(last)) = (runs.first(), runs.last()) else {
            continue;
        };
        let peak = runs.iter().map(|m| m.aligner_kib).max().unwrap_or(0);
        let growth = if first.wall_s > 0.0 {
            last.wall_s / first.wall_s
        } else {
            0.0
        };
        eprintln!(
            "  {:<26} peak footprint {:>8} KiB, {:.3}s at len {} ({:.1}x the shortest)",
            scenario.name, peak, last.wall_s, last.len, growth
        );
    }
    failed
}

/// Resident set size of this process.
struct RssMeter {
    sys: System,
}

impl RssMeter {
    fn new() -> Self {
        RssMeter { sys: System::new() }
    }

    fn kib(&mut self) -> u64 {
        let Ok(pid) = get_current_pid() else {
            return 0;
        };
        self.sys.refresh_process_specifics(pid, ProcessRefreshKind::new());
        self.sys.process(pid).map_or(0, |p| p.memory() / 1024)
    }
}

/// Lowest total penalty by Gotoh's recurrence over every gap piece, keeping
/// one row of each table.
fn gotoh_score(pattern: &[u8], text: &[u8], penalties: &Penalties) -> i32 {
    const INF: i32 = i32::MAX / 4;
    let (mismatch, pieces): (i32, Vec<(i32, i32)>) = match *penalties {
        Penalties::Edit => (1, vec![(0, 1)]),
        Penalties::Linear(p) => (p.mismatch, vec![(0, p.indel)]),
        Penalties::Affine(p) => (p.mismatch, vec![(p.gap_opening, p.gap_extension)]),
        Penalties::Affine2p(p) => (
            p.mismatch,
            vec![
                (p.gap_opening1, p.gap_extension1),
                (p.gap_opening2, p.gap_extension2),
            ],
        ),
    };
    let cols = text.len() + 1;
    // best[j] and del[p][j] hold the previous row until overwritten
    let mut best = vec![INF; cols];
    let mut del = vec![vec![INF; cols]; pieces.len()];
    best[0] = 0;
    for j in 1..cols {
        best[j] = pieces
            .iter()
            .map(|&(open, ext)| open + ext * j as i32)
            .min()
            .unwrap_or(INF);
    }
    for &v in pattern {
        let mut diag = best[0];
        let mut ins = vec![INF; pieces.len()];
        best[0] = pieces
            .iter()
            .zip(del.iter_mut())
            .map(|(&(open, ext), d)| {
                d[0] = (best[0] + open + ext).min(d[0] + ext);
                d[0]
            })
            .min()
            .unwrap_or(INF);
        for j in 1..cols {
            let sub = if v == text[j - 1] { 0 } else { mismatch };
            let mut cell = diag + sub;
            for (p, &(open, ext)) in pieces.iter().enumerate() {
                ins[p] = (best[j - 1] + open + ext).min(ins[p] + ext);
                del[p][j] = (best[j] + open + ext).min(del[p][j] + ext);
                cell = cell.min(ins[p]).min(del[p][j]);
            }
            diag = best[j];
            best[j] = cell;
        }
    }
    best[cols - 1]
}
