//! Prometheus text exposition parser using nom.
//!
//! Turns the text format into typed metric families. Summary and histogram
//! series (`_sum`, `_count`, `_bucket`, `quantile`/`le` labelled lines) are
//! folded into one record per label set.

use crate::core::{PromflatError, Result};
use crate::metrics::types::{
    Histogram, HistogramBucket, Label, MetricFamily, MetricKind, MetricRecord, MetricValue,
    Quantile, Summary,
};
use nom::{
    bytes::complete::{take_while, take_while1},
    character::complete::{char, space0, space1},
    combinator::{opt, recognize},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use std::collections::HashMap;

/// One parsed sample line
#[derive(Debug, Clone, PartialEq)]
struct SampleLine {
    name: String,
    labels: Vec<Label>,
    value: f64,
    timestamp_ms: Option<i64>,
}

/// Parse a complete exposition document.
///
/// Families are returned in the order their first line appears.
pub fn parse_exposition(text: &str) -> Result<Vec<MetricFamily>> {
    let mut builder = FamilySet::default();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            builder.comment(comment.trim_start(), line_no)?;
            continue;
        }

        let sample = parse_sample_line(line, line_no)?;
        builder.sample(sample, line_no)?;
    }

    Ok(builder.finish())
}

fn parse_sample_line(line: &str, line_no: usize) -> Result<SampleLine> {
    match sample_line(line) {
        Ok((remaining, sample)) => {
            if remaining.trim().is_empty() {
                Ok(sample)
            } else {
                Err(PromflatError::parse(
                    line_no,
                    format!("unexpected input after sample: '{}'", remaining),
                ))
            }
        },
        Err(e) => Err(PromflatError::parse(line_no, format!("invalid sample line: {}", e))),
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == ':'
}

fn is_label_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parse a metric name
fn metric_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(take_while1(is_name_start), take_while(is_name_char)))(input)
}

/// Parse a label name
fn label_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(take_while1(is_label_start), take_while(is_label_char)))(input)
}

/// Parse a double-quoted label value, resolving `\\`, `\"` and `\n`
fn label_value(input: &str) -> IResult<&str, String> {
    let (rest, _) = char('"')(input)?;
    let mut out = String::new();
    let mut chars = rest.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((&rest[i + 1..], out)),
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, '\\')) => out.push('\\'),
                Some((_, '"')) => out.push('"'),
                Some((_, other)) => {
                    out.push('\\');
                    out.push(other);
                },
                None => break,
            },
            _ => out.push(c),
        }
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

/// Parse `name="value"`
fn label_pair(input: &str) -> IResult<&str, Label> {
    let (input, (name, _, _, _, value)) =
        tuple((label_name, space0, char('='), space0, label_value))(input)?;
    Ok((input, Label::new(name, value)))
}

/// Parse `{a="1", b="2"}`, trailing comma allowed
fn label_set(input: &str) -> IResult<&str, Vec<Label>> {
    delimited(
        pair(char('{'), space0),
        separated_list0(delimited(space0, char(','), space0), label_pair),
        tuple((space0, opt(char(',')), space0, char('}'))),
    )(input)
}

fn token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

/// Parse a full sample line
fn sample_line(input: &str) -> IResult<&str, SampleLine> {
    let (input, name) = metric_name(input)?;
    let (input, labels) = opt(preceded(space0, label_set))(input)?;
    let (input, value) = preceded(space1, token)(input)?;
    let (input, timestamp) = opt(preceded(space1, token))(input)?;

    let value = parse_float(value).ok_or_else(|| {
        nom::Err::Error(nom::error::Error::new(value, nom::error::ErrorKind::Float))
    })?;
    let timestamp_ms = match timestamp {
        Some(ts) => Some(ts.parse::<i64>().map_err(|_| {
            nom::Err::Error(nom::error::Error::new(ts, nom::error::ErrorKind::Digit))
        })?),
        None => None,
    };

    Ok((
        input,
        SampleLine {
            name: name.to_string(),
            labels: labels.unwrap_or_default(),
            value,
            timestamp_ms,
        },
    ))
}

/// Parse a sample value or label bound, accepting the exposition spellings
/// of the non-finite values
pub(crate) fn parse_float(s: &str) -> Option<f64> {
    match s {
        "+Inf" | "Inf" => Some(f64::INFINITY),
        "-Inf" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ => s.parse::<f64>().ok(),
    }
}

fn unescape_help(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            },
            None => out.push('\\'),
        }
    }
    out
}

/// Families under construction
#[derive(Default)]
struct FamilySet {
    families: Vec<FamilyBuilder>,
    index: HashMap<String, usize>,
}

struct FamilyBuilder {
    name: String,
    help: Option<String>,
    kind: MetricKind,
    typed: bool,
    records: Vec<MetricRecord>,
    groups: HashMap<Vec<Label>, usize>,
}

impl FamilyBuilder {
    fn new(name: &str, kind: MetricKind) -> Self {
        Self {
            name: name.to_string(),
            help: None,
            kind,
            typed: false,
            records: Vec::new(),
            groups: HashMap::new(),
        }
    }

    /// Record for the given label set, created empty on first use.
    ///
    /// Lines naming the same labels in a different order share one record,
    /// which keeps the order of the first line.
    fn group(&mut self, labels: Vec<Label>, empty: MetricValue) -> &mut MetricRecord {
        let mut key = labels.clone();
        key.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.value.cmp(&b.value)));

        let idx = match self.groups.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.records.len();
                self.groups.insert(key, idx);
                self.records.push(MetricRecord {
                    labels,
                    timestamp_ms: 0,
                    value: empty,
                });
                idx
            },
        };
        &mut self.records[idx]
    }
}

impl FamilySet {
    fn family_mut(&mut self, name: &str) -> &mut FamilyBuilder {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                let idx = self.families.len();
                self.families.push(FamilyBuilder::new(name, MetricKind::Untyped));
                self.index.insert(name.to_string(), idx);
                idx
            },
        };
        &mut self.families[idx]
    }

    fn comment(&mut self, comment: &str, line_no: usize) -> Result<()> {
        let mut parts = comment.splitn(3, char::is_whitespace);
        let keyword = parts.next().unwrap_or_default();
        if keyword != "HELP" && keyword != "TYPE" {
            return Ok(());
        }
        let Some(name) = parts.next().filter(|n| !n.is_empty()) else {
            return Err(PromflatError::parse(line_no, format!("{} line without metric name", keyword)));
        };
        if metric_name(name).map(|(rest, _)| !rest.is_empty()).unwrap_or(true) {
            return Err(PromflatError::parse(line_no, format!("invalid metric name '{}'", name)));
        }
        let rest = parts.next().unwrap_or_default().trim();

        if keyword == "HELP" {
            let family = self.family_mut(name);
            if family.help.is_some() {
                return Err(PromflatError::parse(line_no, format!("second HELP line for '{}'", name)));
            }
            family.help = Some(unescape_help(rest));
            return Ok(());
        }

        let Some(kind) = MetricKind::from_type_token(rest) else {
            return Err(PromflatError::parse(line_no, format!("unknown metric type '{}'", rest)));
        };
        let family = self.family_mut(name);
        if family.typed {
            return Err(PromflatError::parse(line_no, format!("second TYPE line for '{}'", name)));
        }
        if !family.records.is_empty() {
            return Err(PromflatError::parse(
                line_no,
                format!("TYPE line for '{}' after its samples", name),
            ));
        }
        family.kind = kind;
        family.typed = true;
        Ok(())
    }

    /// Family a sample line belongs to, and the series suffix it carries
    fn owner(&self, name: &str) -> (String, Suffix) {
        if self.index.contains_key(name) {
            return (name.to_string(), Suffix::None);
        }
        for (suffix, tag) in [("_bucket", Suffix::Bucket), ("_sum", Suffix::Sum), ("_count", Suffix::Count)] {
            let Some(base) = name.strip_suffix(suffix) else {
                continue;
            };
            let Some(&idx) = self.index.get(base) else {
                continue;
            };
            match (self.families[idx].kind, tag) {
                (MetricKind::Histogram, _) | (MetricKind::Summary, Suffix::Sum | Suffix::Count) => {
                    return (base.to_string(), tag);
                },
                _ => {},
            }
        }
        (name.to_string(), Suffix::None)
    }

    fn sample(&mut self, sample: SampleLine, line_no: usize) -> Result<()> {
        let (owner, suffix) = self.owner(&sample.name);
        let family = self.family_mut(&owner);

        match family.kind {
            MetricKind::Counter | MetricKind::Gauge | MetricKind::Untyped => {
                let value = match family.kind {
                    MetricKind::Counter => MetricValue::Counter(sample.value),
                    MetricKind::Gauge => MetricValue::Gauge(sample.value),
                    _ => MetricValue::Untyped(sample.value),
                };
                family.records.push(MetricRecord {
                    labels: sample.labels,
                    timestamp_ms: sample.timestamp_ms.unwrap_or(0),
                    value,
                });
            },
            MetricKind::Summary => {
                let (quantile, labels) = split_label(sample.labels, "quantile");
                let record = family.group(labels, MetricValue::Summary(Summary::default()));
                if let Some(ts) = sample.timestamp_ms {
                    record.timestamp_ms = ts;
                }
                let MetricValue::Summary(summary) = &mut record.value else {
                    return Ok(());
                };
                match suffix {
                    Suffix::Sum => summary.sample_sum = sample.value,
                    Suffix::Count => summary.sample_count = count_value(sample.value, line_no)?,
                    _ => {
                        let Some(q) = quantile else {
                            return Err(PromflatError::parse(
                                line_no,
                                format!("summary sample '{}' without quantile label", sample.name),
                            ));
                        };
                        let q = parse_float(&q).ok_or_else(|| {
                            PromflatError::parse(line_no, format!("invalid quantile '{}'", q))
                        })?;
                        summary.quantiles.push(Quantile {
                            quantile: q,
                            value: sample.value,
                        });
                    },
                }
            },
            MetricKind::Histogram => {
                let (le, labels) = split_label(sample.labels, "le");
                let record = family.group(labels, MetricValue::Histogram(Histogram::default()));
                if let Some(ts) = sample.timestamp_ms {
                    record.timestamp_ms = ts;
                }
                let MetricValue::Histogram(histogram) = &mut record.value else {
                    return Ok(());
                };
                match suffix {
                    Suffix::Sum => histogram.sample_sum = sample.value,
                    Suffix::Count => histogram.sample_count = count_value(sample.value, line_no)?,
                    Suffix::Bucket => {
                        let Some(le) = le else {
                            return Err(PromflatError::parse(
                                line_no,
                                format!("histogram bucket '{}' without le label", sample.name),
                            ));
                        };
                        let bound = parse_float(&le).ok_or_else(|| {
                            PromflatError::parse(line_no, format!("invalid bucket bound '{}'", le))
                        })?;
                        let count = count_value(sample.value, line_no)?;
                        if bound == f64::INFINITY {
                            // re-synthesized from the aggregate count on expansion
                            if histogram.sample_count == 0 {
                                histogram.sample_count = count;
                            }
                        } else {
                            histogram.buckets.push(HistogramBucket {
                                upper_bound: bound,
                                cumulative_count: count,
                            });
                        }
                    },
                    Suffix::None => {
                        return Err(PromflatError::parse(
                            line_no,
                            format!("unexpected sample '{}' in histogram", sample.name),
                        ));
                    },
                }
            },
        }
        Ok(())
    }

    fn finish(self) -> Vec<MetricFamily> {
        self.families
            .into_iter()
            .map(|f| MetricFamily {
                name: f.name,
                help: f.help,
                kind: f.kind,
                metrics: f.records,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suffix {
    None,
    Bucket,
    Sum,
    Count,
}

/// Remove one label by name, returning its value and the remaining labels
fn split_label(labels: Vec<Label>, name: &str) -> (Option<String>, Vec<Label>) {
    let mut found = None;
    let rest = labels
        .into_iter()
        .filter_map(|l| {
            if l.name == name {
                found = Some(l.value);
                None
            } else {
                Some(l)
            }
        })
        .collect();
    (found, rest)
}

fn count_value(value: f64, line_no: usize) -> Result<u64> {
    if !value.is_finite() || value < 0.0 {
        return Err(PromflatError::parse(line_no, format!("invalid count value {}", value)));
    }
    Ok(value as u64)
}
