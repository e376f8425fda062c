//! Validator session: binds the aggregator to a page lifecycle.
//!
//! The session is a small state machine driven by explicit events and an
//! explicit clock. Hosts feed it `mount`/`route_changed`/`run_validation`
//! events and call `poll` when `next_deadline` passes; no timers live here.

use crate::dom::RenderContext;
use crate::models::site::SiteMap;
use crate::models::{Severity, Stakeholder, ValidationIssue};
use crate::validate::{filter_issues, validate_all, RunOptions};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Delay between a trigger and the scan, letting rendering settle.
    pub debounce: Duration,
    /// Schedule a scan on mount.
    pub auto_run: bool,
    pub run: RunOptions,
    /// Severities kept after each run; empty keeps all.
    pub severities: Vec<Severity>,
    /// Audience filter applied after each run.
    pub stakeholder: Option<Stakeholder>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            debounce: DEFAULT_DEBOUNCE,
            auto_run: true,
            run: RunOptions::default(),
            severities: Vec::new(),
            stakeholder: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// A scan is pending and fires at `due`.
    Validating { due: Instant },
}

#[derive(Debug)]
pub struct ValidatorSession {
    opts: SessionOptions,
    phase: Phase,
    pathname: String,
    issues: Vec<ValidationIssue>,
    last_validated: Option<DateTime<Utc>>,
}

impl ValidatorSession {
    pub fn new(opts: SessionOptions) -> Self {
        ValidatorSession {
            opts,
            phase: Phase::Idle,
            pathname: "/".to_string(),
            issues: Vec::new(),
            last_validated: None,
        }
    }

    pub fn mount(&mut self, pathname: &str, now: Instant) {
        self.pathname = pathname.to_string();
        if self.opts.auto_run {
            self.schedule(now);
        }
    }

    /// Drop any pending scan.
    pub fn unmount(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Returns true when the path actually changed.
    pub fn route_changed(&mut self, pathname: &str, now: Instant) -> bool {
        if self.pathname == pathname {
            return false;
        }
        debug!("route {} -> {}", self.pathname, pathname);
        self.pathname = pathname.to_string();
        self.schedule(now);
        true
    }

    /// Manual trigger. While a scan is pending this only moves its due time.
    pub fn run_validation(&mut self, now: Instant) {
        self.schedule(now);
    }

    fn schedule(&mut self, now: Instant) {
        self.phase = Phase::Validating {
            due: now + self.opts.debounce,
        };
    }

    /// Run the pending scan if its due time has passed. Returns true when a
    /// scan ran.
    pub fn poll(&mut self, now: Instant, ctx: &dyn RenderContext, site: &SiteMap) -> bool {
        match self.phase {
            Phase::Validating { due } if now >= due => {
                self.scan_now(ctx, site);
                true
            }
            _ => false,
        }
    }

    /// Scan synchronously, bypassing the debounce.
    pub fn scan_now(&mut self, ctx: &dyn RenderContext, site: &SiteMap) {
        let outcome = validate_all(ctx, site, &self.pathname, &self.opts.run);
        self.issues = filter_issues(&outcome.issues, &self.opts.severities, self.opts.stakeholder);
        self.last_validated = Some(Utc::now());
        self.phase = Phase::Idle;
        info!("{}: {} issue(s)", self.pathname, self.issues.len());
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn is_validating(&self) -> bool {
        matches!(self.phase, Phase::Validating { .. })
    }

    pub fn last_validated(&self) -> Option<DateTime<Utc>> {
        self.last_validated
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Validating { due } => Some(due),
            Phase::Idle => None,
        }
    }
}
