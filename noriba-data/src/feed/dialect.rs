//! Delimiter and quote detection for feed files.

/// Characters tried as delimiters, in order of preference.
pub const CANDIDATE_DELIMITERS: [char; 5] = [',', '\t', ';', '|', ':'];

/// Number of characters inspected when sniffing.
pub const SAMPLE_CHARS: usize = 8192;

/// Delimiter and quote character of one feed file.
///
/// Spaces directly after an unquoted delimiter are always skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// Field separator.
    pub delimiter: char,
    /// Character wrapping quoted fields.
    pub quote: char,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
        }
    }
}

impl Dialect {
    /// Infer the dialect from the start of a decoded file.
    ///
    /// Returns `None` when candidate delimiters appear but none of them splits
    /// the sample consistently or occurs on every record. A sample with no
    /// candidate delimiter at all is a single-column file and uses the default
    /// comma dialect.
    ///
    /// # Examples
    /// ```
    /// use noriba_data::feed::Dialect;
    ///
    /// let dialect = Dialect::sniff("stop_id;stop_name\nS1;Tokyo\n").expect("semicolons");
    /// assert_eq!(dialect.delimiter, ';');
    /// ```
    #[must_use]
    pub fn sniff(text: &str) -> Option<Self> {
        let sample = sample(text);
        let quote = guess_quote(sample);
        let records = split_records(sample, quote);
        if records.is_empty() {
            return Some(Self {
                quote,
                ..Self::default()
            });
        }

        let mut best: Option<(char, usize)> = None;
        let mut everywhere: Option<char> = None;
        let mut any_present = false;
        for delimiter in CANDIDATE_DELIMITERS {
            let counts: Vec<usize> = records
                .iter()
                .map(|record| count_unquoted(record, delimiter, quote))
                .collect();
            if counts.iter().any(|count| *count > 0) {
                any_present = true;
            }
            if everywhere.is_none() && counts.iter().all(|count| *count > 0) {
                everywhere = Some(delimiter);
            }
            let Some((modal, hits)) = modal_count(&counts) else {
                continue;
            };
            // A delimiter qualifies when its modal non-zero count covers a
            // strict majority of records.
            if modal == 0 || hits * 2 <= counts.len() {
                continue;
            }
            if best.is_none_or(|(_, best_hits)| hits > best_hits) {
                best = Some((delimiter, hits));
            }
        }

        // Without a consistent count, fall back to a delimiter present on
        // every record (rows with trailing empty values split unevenly).
        match best.map(|(delimiter, _)| delimiter).or(everywhere) {
            Some(delimiter) => Some(Self { delimiter, quote }),
            None if !any_present => Some(Self {
                quote,
                ..Self::default()
            }),
            None => None,
        }
    }
}

/// Where a scan of delimited text currently sits.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    /// Start of a line.
    LineStart,
    /// Directly after an unquoted delimiter.
    AfterDelimiter,
    /// Inside an unquoted field.
    Unquoted,
    /// Inside a quoted field.
    Quoted,
    /// On a quote inside a quoted field; a second quote escapes it.
    QuoteInQuoted,
}

impl Dialect {
    /// Drop spaces that sit between an unquoted delimiter and the next field.
    ///
    /// Quoted content, the first field of each line and tabs are kept as
    /// they are, so `S1,  "  Tokyo"` yields the value `  Tokyo`.
    #[must_use]
    pub fn skip_initial_space(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut state = Scan::LineStart;
        for ch in text.chars() {
            state = match (state, ch) {
                (Scan::AfterDelimiter, ' ') => continue,
                (Scan::Quoted, c) if c == self.quote => Scan::QuoteInQuoted,
                (Scan::Quoted, _) => Scan::Quoted,
                (Scan::QuoteInQuoted, c) if c == self.quote => Scan::Quoted,
                (Scan::LineStart | Scan::AfterDelimiter, c) if c == self.quote => Scan::Quoted,
                (_, c) if c == self.delimiter => Scan::AfterDelimiter,
                (_, '\n') => Scan::LineStart,
                _ => Scan::Unquoted,
            };
            out.push(ch);
        }
        out
    }
}

/// First [`SAMPLE_CHARS`] characters, cut back to the last complete line.
fn sample(text: &str) -> &str {
    let Some((cut, _)) = text.char_indices().nth(SAMPLE_CHARS) else {
        return text;
    };
    let head = text.get(..cut).unwrap_or(text);
    match head.rfind('\n') {
        Some(end) => head.get(..=end).unwrap_or(head),
        None => head,
    }
}

/// Prefer `'` only when it opens more fields than `"`.
fn guess_quote(sample: &str) -> char {
    let opening = |quote: char| {
        let mut previous: Option<char> = None;
        let mut count = 0_usize;
        for current in sample.chars() {
            let at_field_start = previous
                .is_none_or(|ch| ch == '\n' || ch == ' ' || CANDIDATE_DELIMITERS.contains(&ch));
            if current == quote && at_field_start {
                count += 1;
            }
            previous = Some(current);
        }
        count
    };
    if opening('\'') > opening('"') { '\'' } else { '"' }
}

/// Split a sample into records, keeping newlines inside quotes.
fn split_records(sample: &str, quote: char) -> Vec<&str> {
    let mut records = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (index, ch) in sample.char_indices() {
        if ch == quote {
            in_quotes = !in_quotes;
        } else if ch == '\n' && !in_quotes {
            push_record(&mut records, sample.get(start..index));
            start = index + 1;
        }
    }
    push_record(&mut records, sample.get(start..));
    records
}

fn push_record<'a>(records: &mut Vec<&'a str>, record: Option<&'a str>) {
    if let Some(record) = record.map(|line| line.trim_end_matches('\r'))
        && !record.trim().is_empty()
    {
        records.push(record);
    }
}

fn count_unquoted(record: &str, delimiter: char, quote: char) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for ch in record.chars() {
        if ch == quote {
            in_quotes = !in_quotes;
        } else if ch == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Most frequent count and how many records share it; ties prefer the larger count.
fn modal_count(counts: &[usize]) -> Option<(usize, usize)> {
    let mut tallies: Vec<(usize, usize)> = Vec::new();
    for count in counts {
        match tallies.iter_mut().find(|(value, _)| value == count) {
            Some((_, hits)) => *hits += 1,
            None => tallies.push((*count, 1)),
        }
    }
    tallies
        .into_iter()
        .max_by(|(left, left_hits), (right, right_hits)| {
            left_hits.cmp(right_hits).then(left.cmp(right))
        })
}
