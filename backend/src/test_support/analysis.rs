//! Test doubles for the analysis lifecycle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use tokio::sync::Notify;

use crate::domain::ports::{FinancialAnalyzer, FinancialAnalyzerError};
use crate::domain::{
    AnalysisPrompt, AnalysisReport, FinancialMetrics, HealthScore, parse_analysis_report,
};

/// Clock frozen at a fixed instant.
pub struct FixtureClock(pub DateTime<Utc>);

impl Default for FixtureClock {
    fn default() -> Self {
        match Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).single() {
            Some(now) => Self(now),
            None => panic!("fixture timestamp"),
        }
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A plausible report with the given health score.
pub fn sample_report(score: i64) -> AnalysisReport {
    let health_score = match HealthScore::new(score) {
        Ok(score) => score,
        Err(error) => panic!("sample score: {error}"),
    };
    AnalysisReport {
        metrics: FinancialMetrics {
            revenue: Some(120_000.0),
            expenses: Some(95_000.0),
            net_profit: Some(25_000.0),
            ..FinancialMetrics::default()
        },
        health_score,
        risks: vec!["Customer concentration".to_owned()],
        opportunities: vec!["Expand online sales".to_owned()],
        recommendations: vec!["Build a cash buffer".to_owned()],
        narrative: "## Summary\nHealthy margins.".to_owned(),
    }
}

/// Analyzer returning the same outcome on every call and recording prompts.
pub struct ScriptedAnalyzer {
    outcome: Result<AnalysisReport, FinancialAnalyzerError>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedAnalyzer {
    /// Always succeed with `report`.
    pub fn succeeding(report: AnalysisReport) -> Self {
        Self {
            outcome: Ok(report),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with `error`.
    pub fn failing(error: FinancialAnalyzerError) -> Self {
        Self {
            outcome: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        match self.prompts.lock() {
            Ok(prompts) => prompts.clone(),
            Err(_) => panic!("prompts mutex"),
        }
    }
}

#[async_trait]
impl FinancialAnalyzer for ScriptedAnalyzer {
    async fn analyze(
        &self,
        prompt: &AnalysisPrompt,
    ) -> Result<AnalysisReport, FinancialAnalyzerError> {
        match self.prompts.lock() {
            Ok(mut prompts) => prompts.push(prompt.as_str().to_owned()),
            Err(_) => panic!("prompts mutex"),
        }
        self.outcome.clone()
    }
}

/// Analyzer that blocks until released, for observing the `processing`
/// window.
#[derive(Default)]
pub struct GatedAnalyzer {
    entered: Notify,
    release: Notify,
    calls: AtomicUsize,
}

impl GatedAnalyzer {
    /// Shared handle.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Wait until a call has started.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Let the blocked call finish.
    pub fn release(&self) {
        self.release.notify_one();
    }

    /// Number of calls started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FinancialAnalyzer for GatedAnalyzer {
    async fn analyze(
        &self,
        _prompt: &AnalysisPrompt,
    ) -> Result<AnalysisReport, FinancialAnalyzerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(sample_report(64))
    }
}

/// Analyzer that never answers.
#[derive(Debug, Default, Clone, Copy)]
pub struct StalledAnalyzer;

#[async_trait]
impl FinancialAnalyzer for StalledAnalyzer {
    async fn analyze(
        &self,
        _prompt: &AnalysisPrompt,
    ) -> Result<AnalysisReport, FinancialAnalyzerError> {
        std::future::pending().await
    }
}

/// Analyzer that decodes a canned provider reply with the production parser.
pub struct RawTextAnalyzer {
    reply: String,
    calls: AtomicUsize,
}

impl RawTextAnalyzer {
    /// Reply with `reply` on every call.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `analyze` calls observed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FinancialAnalyzer for RawTextAnalyzer {
    async fn analyze(
        &self,
        _prompt: &AnalysisPrompt,
    ) -> Result<AnalysisReport, FinancialAnalyzerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        parse_analysis_report(&self.reply).map_err(FinancialAnalyzerError::from)
    }
}
