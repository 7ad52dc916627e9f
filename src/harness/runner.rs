//! Runs every validator over every test item and judges the results
//!
//! A validator that changes its mind between repeats of the same input is a
//! fatal error. Otherwise an item is good when all validators agree, confused
//! when the independent validators disagree among themselves, and a failure
//! when ours are the odd ones out.

use std::fmt;
use std::time::Instant;

use super::error::HarnessError;
use super::pool::{BlockPool, Placement};
use super::testset::TestItem;
use super::validators::Validator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Good,
    Confusion,
    Failure,
}

impl Verdict {
    /// Word closing an item's report line.
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Good => "good.",
            Verdict::Confusion => "CONFUSION!",
            Verdict::Failure => "FAILURE!",
        }
    }
}

/// Where each item's bytes are placed before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignmentMode {
    /// Validate the bytes where they already are
    #[default]
    Natural,
    /// Use each item's own alignment request
    PerItem,
    /// The same offset for every item
    Forced { offset: usize, from_end: bool },
}

impl AlignmentMode {
    fn placement(self, item: &TestItem) -> Option<(Placement, usize)> {
        let (offset, from_end) = match self {
            AlignmentMode::Natural => return None,
            AlignmentMode::PerItem => (item.alignment, item.align_end),
            AlignmentMode::Forced { offset, from_end } => (offset, from_end),
        };
        let placement = if from_end { Placement::EndOfPage } else { Placement::StartOfPage };
        Some((placement, offset))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    pub keep_going: bool,
    pub alignment: AlignmentMode,
    /// Runs per validator per item; at least one
    pub repeat: usize,
    pub record_timings: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            keep_going: false,
            alignment: AlignmentMode::Natural,
            repeat: 1,
            record_timings: false,
        }
    }
}

/// Running totals over all items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub good: usize,
    /// Good items every validator accepted
    pub good_accepted: usize,
    /// Good items every validator rejected
    pub good_rejected: usize,
    pub confused: usize,
    pub failed: usize,
}

impl Totals {
    fn record(&mut self, report: &ItemReport) {
        match report.verdict {
            Verdict::Good => {
                self.good += 1;
                if report.outcomes.iter().all(|o| o.accepted) {
                    self.good_accepted += 1;
                } else {
                    self.good_rejected += 1;
                }
            }
            Verdict::Confusion => self.confused += 1,
            Verdict::Failure => self.failed += 1,
        }
    }
}

impl fmt::Display for Totals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Good: {}   ({} good utf8, {} bad utf8),    confused: {},   failed: {}",
            self.good, self.good_accepted, self.good_rejected, self.confused, self.failed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub name: String,
    pub ours: bool,
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub description: String,
    pub len: usize,
    pub outcomes: Vec<Outcome>,
    pub verdict: Verdict,
}

impl ItemReport {
    /// `desc -- name accept, name reject, ... good.`
    pub fn line(&self) -> String {
        let outcomes: Vec<String> = self
            .outcomes
            .iter()
            .map(|o| format!("{} {}", o.name, if o.accepted { "accept" } else { "reject" }))
            .collect();
        format!("{} -- {} {}", self.description, outcomes.join(", "), self.verdict.label())
    }
}

/// Judge one item from every validator's answer.
pub fn judge(outcomes: &[Outcome]) -> Verdict {
    if outcomes.iter().all(|o| o.accepted) || outcomes.iter().all(|o| !o.accepted) {
        return Verdict::Good;
    }
    let mut independent = outcomes.iter().filter(|o| !o.ours).map(|o| o.accepted);
    if let Some(first) = independent.next()
        && independent.any(|accepted| accepted != first)
    {
        return Verdict::Confusion;
    }
    Verdict::Failure
}

/// Per-run durations of one validator on one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingRecord {
    pub validator: String,
    pub description: String,
    pub len: usize,
    pub nanos: Vec<u128>,
}

pub struct Runner<'p> {
    validators: Vec<Box<dyn Validator>>,
    options: RunnerOptions,
    pool: &'p BlockPool,
    totals: Totals,
    timings: Vec<TimingRecord>,
}

impl<'p> Runner<'p> {
    pub fn new(validators: Vec<Box<dyn Validator>>, options: RunnerOptions, pool: &'p BlockPool) -> Self {
        Self {
            validators,
            options,
            pool,
            totals: Totals::default(),
            timings: Vec::new(),
        }
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn timings(&self) -> &[TimingRecord] {
        &self.timings
    }

    pub fn validator_names(&self) -> Vec<&str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Whether a run should go on after an item with this verdict.
    pub fn should_continue(&self, verdict: Verdict) -> bool {
        self.options.keep_going || verdict == Verdict::Good
    }

    /// Validate one item with every validator and fold it into the totals.
    pub fn run_item(&mut self, item: &TestItem) -> Result<ItemReport, HarnessError> {
        let pool = self.pool;
        let placed = self
            .options
            .alignment
            .placement(item)
            .map(|(placement, gap)| pool.acquire_copy(&item.bytes, placement, gap));
        let data: &[u8] = placed.as_deref().unwrap_or(item.bytes.as_slice());

        let repeat = self.options.repeat.max(1);
        let mut outcomes = Vec::with_capacity(self.validators.len());

        for validator in &mut self.validators {
            validator.prepare(data.len());

            let mut nanos = Vec::new();
            let mut verdict = None;
            for _ in 0..repeat {
                let started = Instant::now();
                let accepted = validator.validate(data);
                if self.options.record_timings {
                    nanos.push(started.elapsed().as_nanos());
                }
                match verdict {
                    None => verdict = Some(accepted),
                    Some(previous) if previous != accepted => {
                        return Err(HarnessError::Inconsistent {
                            validator: validator.name().to_string(),
                            description: item.description.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }

            if self.options.record_timings {
                self.timings.push(TimingRecord {
                    validator: validator.name().to_string(),
                    description: item.description.clone(),
                    len: data.len(),
                    nanos,
                });
            }

            outcomes.push(Outcome {
                name: validator.name().to_string(),
                ours: validator.ours(),
                accepted: verdict.unwrap_or(true),
            });
        }

        let verdict = judge(&outcomes);
        let report = ItemReport {
            description: item.description.clone(),
            len: data.len(),
            outcomes,
            verdict,
        };
        tracing::debug!(
            description = %report.description,
            len = report.len,
            verdict = ?report.verdict,
            "item judged"
        );
        self.totals.record(&report);
        Ok(report)
    }

    /// Run items until they run out, or until the first item that is not
    /// good unless keep-going is set. `observe` sees every item with its
    /// report.
    pub fn run_all<I, F>(&mut self, items: I, mut observe: F) -> Result<Totals, HarnessError>
    where
        I: IntoIterator<Item = TestItem>,
        F: FnMut(&TestItem, &ItemReport),
    {
        for item in items {
            let report = self.run_item(&item)?;
            observe(&item, &report);
            if !self.should_continue(report.verdict) {
                tracing::info!(description = %report.description, "stopping at first bad verdict");
                break;
            }
        }
        Ok(self.totals)
    }

    /// Timings as CSV: `name,"item",len,t1,t2,...` in nanoseconds.
    pub fn timing_csv(&self) -> String {
        let mut csv = String::new();
        for record in &self.timings {
            let times: Vec<String> = record.nanos.iter().map(u128::to_string).collect();
            csv.push_str(&format!(
                "{},\"{}\",{},{}\n",
                record.validator,
                record.description.replace('"', "\"\""),
                record.len,
                times.join(",")
            ));
        }
        csv
    }
}
