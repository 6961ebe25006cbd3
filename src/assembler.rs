//! Transaction assembly: groups rows into per-transaction blocks and applies
//! positional line roles to build `Transaction` records.
//!
//! A block opens on a row that starts with a weekday/date marker
//! ("Sat, Oct 11") and runs until the next marker. Within a block:
//!
//! - line 0 carries the date and the start of the event label; a trailing run
//!   of pure `$amount` tokens is the transaction amount and is stripped;
//! - line 1 carries the time of day and an optional event date/time; its
//!   trailing amount is a running balance and is always stripped;
//! - lines 2+ are continuation text kept verbatim, dollar amounts included.

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::error::{ImportIssue, LedgerError, Result};
use crate::layout::LayoutFamily;
use crate::models::{StatementPeriod, Transaction, TransactionRow};
use crate::settings::ParseSettings;

const MONTHS: &str = "Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec";

// ---------------------------------------------------------------------------
// Token helpers
// ---------------------------------------------------------------------------

fn amount_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[-+\u{2212}]?\$[-\u{2212}]?\d[\d,]*(?:\.\d{1,2})?|\([-\u{2212}]?\$\d[\d,]*(?:\.\d{1,2})?\))$")
            .expect("amount token regex")
    })
}

fn clock_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(\d{1,2}):(\d{2})\s*([AP]M)\b").expect("clock regex"))
}

fn event_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)\b({MONTHS})[a-z]*\.?\s+(\d{{1,2}})\s+(\d{{1,2}}):(\d{{2}})\s*([AP]M)\b"
        ))
        .expect("event date regex")
    })
}

fn period_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let point = format!(
            r"({MONTHS})[a-z]*\.?\s+(\d{{1,2}}),\s*(\d{{4}})(?:\s+(\d{{1,2}})(?::(\d{{2}}))?\s*([AP]M))?"
        );
        Regex::new(&format!(r"(?i){point}\s*[-\u{{2013}}\u{{2014}}]\s*{point}")).expect("period regex")
    })
}

fn tolls_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\btolls?\s+reimburs\w*:?\s*\$\s?(\d[\d,]*\.\d{2})").expect("tolls regex")
    })
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

/// Parse a statement amount such as `$1,234.56`, `-$5.00`, `$-5.00` or
/// `($5.00)`. Returns `None` for anything that is not a number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw
        .trim()
        .replace('\u{2212}', "-")
        .replace([',', '$', '"'], "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.trim().parse::<f64>().ok().map(|v| -v.abs());
    }
    let s = s.strip_prefix('+').unwrap_or(s);
    if let Some(rest) = s.strip_prefix('-') {
        // "-$-5.00" collapses to "--5.00"; a sign is a sign.
        return rest.trim_start_matches('-').parse::<f64>().ok().map(|v| -v);
    }
    s.parse().ok()
}

fn is_amount_token(token: &str) -> bool {
    amount_token_re().is_match(token)
}

/// Split off a trailing run of pure amount tokens. Returns the remaining text
/// and the tokens of the run, left to right.
fn split_trailing_amounts(text: &str) -> (String, Vec<String>) {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut cut = tokens.len();
    while cut > 0 && is_amount_token(tokens[cut - 1]) {
        cut -= 1;
    }
    let run = tokens[cut..].iter().map(|t| t.to_string()).collect();
    (tokens[..cut].join(" "), run)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let months = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    months.iter().position(|m| *m == prefix).map(|i| i as u32 + 1)
}

fn clock(hour: &str, minute: &str, meridiem: &str) -> Option<NaiveTime> {
    let h: u32 = hour.parse().ok()?;
    let m: u32 = minute.parse().ok()?;
    if !(1..=12).contains(&h) {
        return None;
    }
    let h = match (meridiem.to_uppercase().as_str(), h) {
        ("AM", 12) => 0,
        ("AM", h) => h,
        ("PM", 12) => 12,
        (_, h) => h + 12,
    };
    NaiveTime::from_hms_opt(h, m, 0)
}

/// Pick the year that puts `month/day` closest to `anchor`.
fn resolve_year(month: u32, day: u32, anchor: NaiveDate) -> Option<NaiveDate> {
    (anchor.year() - 1..=anchor.year() + 1)
        .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
        .min_by_key(|d| (*d - anchor).num_days().abs())
}

fn collapse_whitespace(text: &str) -> String {
    whitespace_re().replace_all(text.trim(), " ").to_string()
}

// ---------------------------------------------------------------------------
// Statement period
// ---------------------------------------------------------------------------

fn period_point(caps: &regex::Captures, base: usize) -> Option<NaiveDateTime> {
    let month = month_number(caps.get(base)?.as_str())?;
    let day: u32 = caps.get(base + 1)?.as_str().parse().ok()?;
    let year: i32 = caps.get(base + 2)?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = match (caps.get(base + 3), caps.get(base + 5)) {
        (Some(h), Some(mer)) => clock(
            h.as_str(),
            caps.get(base + 4).map_or("00", |m| m.as_str()),
            mer.as_str(),
        )?,
        _ => NaiveTime::MIN,
    };
    Some(date.and_time(time))
}

/// Parse a period label such as `Oct 6, 2025 4 AM - Oct 13, 2025 4 AM`.
/// Labels that do not follow that shape keep `start`/`end` unset.
pub fn parse_statement_period(label: &str) -> StatementPeriod {
    let Some(caps) = period_re().captures(label) else {
        return StatementPeriod::unparsed(label);
    };
    StatementPeriod {
        label: label.to_string(),
        start: period_point(&caps, 1),
        end: period_point(&caps, 7),
    }
}

fn find_period(rows: &[TransactionRow]) -> Option<StatementPeriod> {
    rows.iter().find_map(|row| {
        let text = row.text();
        period_re()
            .find(&text)
            .map(|m| parse_statement_period(m.as_str().trim()))
    })
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AssembleOutput {
    pub period: StatementPeriod,
    pub transactions: Vec<Transaction>,
    pub issues: Vec<ImportIssue>,
    pub blocks: usize,
}

pub struct Assembler {
    layout: LayoutFamily,
    marker: Regex,
    import_date: NaiveDateTime,
}

struct Block<'a> {
    start: usize,
    rows: Vec<&'a TransactionRow>,
}

impl Assembler {
    pub fn new(layout: LayoutFamily, settings: &ParseSettings, import_date: NaiveDateTime) -> Result<Self> {
        if settings.weekday_tokens.is_empty() {
            return Err(LedgerError::Settings("weekday_tokens must not be empty".to_string()));
        }
        let tokens: Vec<String> = settings
            .weekday_tokens
            .iter()
            .map(|t| regex::escape(t.trim()))
            .collect();
        let marker = Regex::new(&format!(
            r"^(?:{}),?\s+(?i:({MONTHS})[a-z]*\.?)\s+(\d{{1,2}})\b",
            tokens.join("|")
        ))
        .map_err(|e| LedgerError::Settings(e.to_string()))?;
        Ok(Self {
            layout,
            marker,
            import_date,
        })
    }

    pub fn is_block_start(&self, row: &TransactionRow) -> bool {
        row.leftmost().is_some() && self.marker.is_match(&row.text())
    }

    fn blocks<'a>(&self, rows: &'a [TransactionRow]) -> (Vec<&'a TransactionRow>, Vec<Block<'a>>) {
        let mut preamble = Vec::new();
        let mut blocks: Vec<Block> = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            if self.is_block_start(row) {
                blocks.push(Block {
                    start: index,
                    rows: vec![row],
                });
            } else if let Some(block) = blocks.last_mut() {
                block.rows.push(row);
            } else {
                preamble.push(row);
            }
        }
        (preamble, blocks)
    }

    /// Build transactions from extracted rows. `fallback_label` names the
    /// statement period when the document header does not.
    pub fn assemble(&self, rows: &[TransactionRow], fallback_label: &str) -> AssembleOutput {
        let (preamble, blocks) = self.blocks(rows);
        let preamble: Vec<TransactionRow> = preamble.into_iter().cloned().collect();
        let period = find_period(&preamble).unwrap_or_else(|| StatementPeriod::unparsed(fallback_label));
        let anchor = period
            .start
            .map(|d| d.date())
            .unwrap_or_else(|| self.import_date.date());
        log::info!("{} block(s) found for period \"{}\"", blocks.len(), period.label);

        let mut transactions = Vec::new();
        let mut issues = Vec::new();
        for block in &blocks {
            match self.assemble_block(block, &period.label, anchor, &mut issues) {
                Ok(txn) => transactions.push(txn),
                Err(issue) => {
                    log::warn!("{issue}");
                    issues.push(issue);
                }
            }
        }

        AssembleOutput {
            period,
            transactions,
            issues,
            blocks: blocks.len(),
        }
    }

    /// Line 0 with the date marker removed, plus the resolved date.
    fn line_zero(&self, row: &TransactionRow, anchor: NaiveDate) -> std::result::Result<(NaiveDate, String), String> {
        let text = row.text();
        let caps = self
            .marker
            .captures(&text)
            .ok_or_else(|| format!("no date marker in \"{text}\""))?;
        let month = caps
            .get(1)
            .and_then(|m| month_number(m.as_str()))
            .ok_or_else(|| format!("unknown month in \"{text}\""))?;
        let day: u32 = caps
            .get(2)
            .and_then(|d| d.as_str().parse().ok())
            .ok_or_else(|| format!("unknown day in \"{text}\""))?;
        let date = resolve_year(month, day, anchor)
            .ok_or_else(|| format!("invalid date {month}/{day} in \"{text}\""))?;
        let rest = caps.get(0).map_or("", |m| &text[m.end()..]);
        Ok((date, rest.trim().to_string()))
    }

    /// Look for an amount fragment in the layout's amount column. Returns the
    /// amount and line 0 rebuilt without that fragment.
    fn column_amount(&self, row: &TransactionRow, anchor: NaiveDate) -> Option<(f64, String)> {
        let (index, amount) = row.fragments.iter().enumerate().find_map(|(i, f)| {
            let text = f.text.trim();
            if self.layout.in_amount_column(f.x) && is_amount_token(text) {
                parse_amount(text).map(|a| (i, a))
            } else {
                None
            }
        })?;
        let mut without = row.clone();
        without.fragments.remove(index);
        let (_, rest) = self.line_zero(&without, anchor).ok()?;
        Some((amount, rest))
    }

    fn assemble_block(
        &self,
        block: &Block,
        period_label: &str,
        anchor: NaiveDate,
        issues: &mut Vec<ImportIssue>,
    ) -> std::result::Result<Transaction, ImportIssue> {
        let row = block.start;
        let (date, rest) = self
            .line_zero(block.rows[0], anchor)
            .map_err(|message| ImportIssue::BlockParse { row, message })?;

        // Amount: trailing pure-amount run, then the layout's amount column.
        let (body, run) = split_trailing_amounts(&rest);
        let (amount, head) = match run.first().and_then(|t| parse_amount(t)) {
            Some(amount) => (Some(amount), body),
            None => match self.column_amount(block.rows[0], anchor) {
                Some((amount, rest)) => (Some(amount), rest),
                None => (None, rest),
            },
        };

        let mut parts = vec![head];
        let mut time = None;
        let mut event_date = None;

        if let Some(line1) = block.rows.get(1) {
            let text = line1.text();
            let mut remainder = text.as_str();
            if let Some(caps) = clock_re().captures(remainder) {
                time = clock(&caps[1], &caps[2], &caps[3]);
                remainder = &remainder[caps.get(0).map_or(0, |m| m.end())..];
            }
            // The trailing amount on this line is a running balance.
            let (remainder, _balance) = split_trailing_amounts(remainder);
            let found = event_date_re()
                .captures(&remainder)
                .map(|caps| (self.event_date(&caps, date), caps.get(0).map_or(0..0, |m| m.range())));
            let remainder = match found {
                Some((parsed, span)) => {
                    event_date = parsed;
                    format!("{} {}", &remainder[..span.start], &remainder[span.end..])
                }
                None => remainder,
            };
            parts.push(remainder);
        }

        for line in block.rows.iter().skip(2) {
            let text = line.text();
            if event_date.is_none() {
                event_date = event_date_re()
                    .captures(&text)
                    .and_then(|caps| self.event_date(&caps, date));
            }
            parts.push(text);
        }

        let event_type = collapse_whitespace(&parts.join(" "));
        if event_date.is_none() {
            event_date = event_date_re()
                .captures(&event_type)
                .and_then(|caps| self.event_date(&caps, date));
        }

        let mut needs_manual_verification = false;
        let transaction_date = match time {
            Some(t) => date.and_time(t),
            None => {
                needs_manual_verification = true;
                issues.push(ImportIssue::MissingTime {
                    row,
                    event_type: event_type.clone(),
                });
                date.and_time(NaiveTime::MIN)
            }
        };
        let amount = match amount {
            Some(a) => a,
            None => {
                needs_manual_verification = true;
                issues.push(ImportIssue::AmbiguousAmount {
                    row,
                    event_type: event_type.clone(),
                });
                0.0
            }
        };
        let tolls_reimbursed = tolls_re()
            .captures(&event_type)
            .and_then(|caps| parse_amount(&caps[1]));

        Ok(Transaction {
            id: None,
            transaction_date,
            event_date,
            event_type,
            amount,
            tolls_reimbursed,
            statement_period: period_label.to_string(),
            shift_id: None,
            import_date: self.import_date,
            source_row: row,
            needs_manual_verification,
        })
    }

    fn event_date(&self, caps: &regex::Captures, anchor: NaiveDate) -> Option<NaiveDateTime> {
        let month = month_number(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let date = resolve_year(month, day, anchor)?;
        let time = clock(&caps[3], &caps[4], &caps[5])?;
        Some(date.and_time(time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::group_rows;
    use crate::models::PositionedFragment;

    fn import_date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 14)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn assembler() -> Assembler {
        Assembler::new(LayoutFamily::UberWeeklyV1, &ParseSettings::default(), import_date()).unwrap()
    }

    /// One row per entry; each entry is a list of (text, x) on a shared y.
    fn rows(lines: &[&[(&str, f64)]]) -> Vec<TransactionRow> {
        let mut frags = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            for (text, x) in line.iter() {
                frags.push(PositionedFragment::new(*text, *x, 100.0 + 12.0 * i as f64));
            }
        }
        group_rows(0, &frags, 2.0)
    }

    const HEADER: &[(&str, f64)] = &[("Oct 6, 2025 4 AM - Oct 13, 2025 4 AM", 40.0)];

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("-$5.00"), Some(-5.0));
        assert_eq!(parse_amount("$-5.00"), Some(-5.0));
        assert_eq!(parse_amount("\u{2212}$5.00"), Some(-5.0));
        assert_eq!(parse_amount("($7.25)"), Some(-7.25));
        assert_eq!(parse_amount("UberX"), None);
    }

    #[test]
    fn test_split_trailing_amounts() {
        let (body, run) = split_trailing_amounts("UberX $12.34 -$12.34");
        assert_eq!(body, "UberX");
        assert_eq!(run, vec!["$12.34", "-$12.34"]);
        let (body, run) = split_trailing_amounts("we've added $20.00 to your statement.");
        assert_eq!(body, "we've added $20.00 to your statement.");
        assert!(run.is_empty());
    }

    #[test]
    fn test_parse_statement_period() {
        let period = parse_statement_period("Oct 6, 2025 4 AM - Oct 13, 2025 4 AM");
        assert_eq!(period.start, Some(dt(2025, 10, 6, 4, 0)));
        assert_eq!(period.end, Some(dt(2025, 10, 13, 4, 0)));
        let period = parse_statement_period("week 41");
        assert_eq!(period.start, None);
        assert_eq!(period.label, "week 41");
    }

    #[test]
    fn test_ride_block() {
        let rows = rows(&[
            HEADER,
            &[("Sat, Oct 11", 40.0), ("UberX", 160.0), ("$12.34", 440.0), ("$12.34", 520.0)],
            &[("4:15 PM", 40.0), ("Oct 11 3:50 PM", 160.0), ("$150.00", 520.0)],
        ]);
        let out = assembler().assemble(&rows, "fallback");
        assert_eq!(out.blocks, 1);
        assert!(out.issues.is_empty());
        let txn = &out.transactions[0];
        assert_eq!(txn.event_type, "UberX");
        assert_eq!(txn.amount, 12.34);
        assert_eq!(txn.transaction_date, dt(2025, 10, 11, 16, 15));
        assert_eq!(txn.event_date, Some(dt(2025, 10, 11, 15, 50)));
        assert_eq!(txn.statement_period, "Oct 6, 2025 4 AM - Oct 13, 2025 4 AM");
        assert_eq!(txn.source_row, 1);
        assert!(!txn.needs_manual_verification);
    }

    #[test]
    fn test_quest_keeps_description_and_strips_duplicate_amounts() {
        let rows = rows(&[
            HEADER,
            &[
                ("Mon, Oct 13", 40.0),
                ("Quest (Friday Oct 10, 2025 4:00:00 AM - Monday Oct 13, 2025 4:00:00 AM):", 160.0),
                ("$20.00", 440.0),
                ("$20.00", 520.0),
            ],
            &[("4:02 AM", 40.0), ("$432.10", 520.0)],
            &[("You completed 20 trips (level 1) and we've added $20.00 to your payment statement.", 160.0)],
        ]);
        let out = assembler().assemble(&rows, "fallback");
        let txn = &out.transactions[0];
        assert_eq!(txn.amount, 20.0);
        assert_eq!(
            txn.event_type,
            "Quest (Friday Oct 10, 2025 4:00:00 AM - Monday Oct 13, 2025 4:00:00 AM): \
             You completed 20 trips (level 1) and we've added $20.00 to your payment statement."
        );
        assert!(!txn.event_type.contains("$20.00 $20.00"));
        assert!(!txn.event_type.contains("$432.10"));
        assert_eq!(txn.category(), crate::categorizer::Category::Promotion);
        assert_eq!(txn.event_date, None);
    }

    #[test]
    fn test_balance_on_line_one_is_never_the_amount() {
        let rows = rows(&[
            HEADER,
            &[("Fri, Oct 10", 40.0), ("Tip", 160.0)],
            &[("9:41 PM", 40.0), ("$88.17", 520.0)],
        ]);
        let out = assembler().assemble(&rows, "fallback");
        let txn = &out.transactions[0];
        assert_eq!(txn.event_type, "Tip");
        assert_eq!(txn.amount, 0.0);
        assert!(txn.needs_manual_verification);
        assert!(!txn.event_type.contains("$88.17"));
        assert!(matches!(out.issues[0], ImportIssue::AmbiguousAmount { row: 1, .. }));
    }

    #[test]
    fn test_amount_column_used_when_line_zero_has_trailing_text() {
        let rows = rows(&[
            HEADER,
            &[("Thu, Oct 9", 40.0), ("UberXL", 160.0), ("$31.02", 450.0), ("Priority", 505.0)],
            &[("11:05 AM", 40.0), ("$60.00", 520.0)],
        ]);
        let out = assembler().assemble(&rows, "fallback");
        let txn = &out.transactions[0];
        assert_eq!(txn.amount, 31.02);
        assert_eq!(txn.event_type, "UberXL Priority");
        assert!(!txn.needs_manual_verification);
    }

    #[test]
    fn test_continuation_amounts_and_tolls_are_kept() {
        let rows = rows(&[
            HEADER,
            &[("Wed, Oct 8", 40.0), ("Uber Comfort", 160.0), ("$40.50", 440.0)],
            &[("7:30 AM", 40.0), ("Oct 8 7:02 AM", 160.0), ("$200.00", 520.0)],
            &[("Tolls reimbursed $6.50", 160.0)],
        ]);
        let out = assembler().assemble(&rows, "fallback");
        let txn = &out.transactions[0];
        assert_eq!(txn.event_type, "Uber Comfort Tolls reimbursed $6.50");
        assert_eq!(txn.tolls_reimbursed, Some(6.5));
        assert_eq!(txn.event_date, Some(dt(2025, 10, 8, 7, 2)));
    }

    #[test]
    fn test_invalid_date_block_is_skipped_not_fatal() {
        let rows = rows(&[
            HEADER,
            &[("Sat, Feb 30", 40.0), ("UberX", 160.0), ("$9.00", 440.0)],
            &[("1:00 PM", 40.0)],
            &[("Sun, Oct 12", 40.0), ("Tip", 160.0), ("$3.00", 440.0)],
            &[("2:00 AM", 40.0), ("$3.00", 520.0)],
        ]);
        let out = assembler().assemble(&rows, "fallback");
        assert_eq!(out.blocks, 2);
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.transactions[0].amount, 3.0);
        assert_eq!(out.transactions[0].transaction_date, dt(2025, 10, 12, 2, 0));
        assert!(out.issues.iter().any(|i| i.is_error() && i.row() == 1));
    }

    #[test]
    fn test_missing_time_is_flagged() {
        let rows = rows(&[HEADER, &[("Sat, Oct 11", 40.0), ("UberX", 160.0), ("$7.00", 440.0)]]);
        let out = assembler().assemble(&rows, "fallback");
        let txn = &out.transactions[0];
        assert!(txn.needs_manual_verification);
        assert_eq!(txn.transaction_date, dt(2025, 10, 11, 0, 0));
        assert!(matches!(out.issues[0], ImportIssue::MissingTime { .. }));
    }

    #[test]
    fn test_split_weekday_artifact_opens_block() {
        let rows = rows(&[
            HEADER,
            &[("T ue, Oct 7", 40.0), ("UberX", 160.0), ("$8.80", 440.0)],
            &[("6:10 PM", 40.0), ("$100.00", 520.0)],
        ]);
        let out = assembler().assemble(&rows, "fallback");
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.transactions[0].transaction_date, dt(2025, 10, 7, 18, 10));
    }

    #[test]
    fn test_year_rolls_back_across_new_year() {
        let rows = rows(&[
            &[("Dec 29, 2025 4 AM - Jan 5, 2026 4 AM", 40.0)],
            &[("Wed, Dec 31", 40.0), ("UberX", 160.0), ("$15.00", 440.0)],
            &[("11:50 PM", 40.0), ("$15.00", 520.0)],
            &[("Thu, Jan 1", 40.0), ("UberX", 160.0), ("$22.00", 440.0)],
            &[("12:20 AM", 40.0), ("$37.00", 520.0)],
        ]);
        let out = assembler().assemble(&rows, "fallback");
        assert_eq!(out.transactions[0].transaction_date, dt(2025, 12, 31, 23, 50));
        assert_eq!(out.transactions[1].transaction_date, dt(2026, 1, 1, 0, 20));
    }

    #[test]
    fn test_fallback_label_without_header() {
        let rows = rows(&[
            &[("Sat, Oct 11", 40.0), ("UberX", 160.0), ("$5.00", 440.0)],
            &[("4:15 PM", 40.0)],
        ]);
        let out = assembler().assemble(&rows, "statement-oct");
        assert_eq!(out.period.label, "statement-oct");
        assert_eq!(out.transactions[0].statement_period, "statement-oct");
    }

    #[test]
    fn test_empty_weekday_tokens_rejected() {
        let settings = ParseSettings {
            weekday_tokens: vec![],
            ..ParseSettings::default()
        };
        assert!(Assembler::new(LayoutFamily::UberWeeklyV1, &settings, import_date()).is_err());
    }
}
