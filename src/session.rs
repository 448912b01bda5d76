//! Interaction state machine.
//!
//! ```text
//!            LoadRoster            Query (unique)          Analyze
//!   Idle ───────────────▶ RosterLoaded ─────────▶ SubjectSelected ─────▶ AnalysisRunning
//!    │                         ▲                        ▲                      │
//!    │ Query (no roster)       │ Query (none/many)      │ Query                ▼
//!    └─────────────────────────┴────────────────────────┴──────────── AnalysisComplete
//!                                                                      or Error
//! ```
//!
//! Every user action is one [`Action`]; the pipeline runs exactly once per
//! entry into [`State::AnalysisRunning`]. Input errors move the session to
//! [`State::Error`] but keep the loaded roster, so the next query just works.

use crate::api::Summarizer;
use crate::cloud::CloudRenderer;
use crate::models::AnalysisReport;
use crate::news::NewsFetcher;
use crate::pipeline::Pipeline;
use crate::roster::{Roster, Selection};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum State {
    Idle,
    RosterLoaded,
    SubjectSelected { subject: String },
    AnalysisRunning { subject: String },
    AnalysisComplete { report: Box<AnalysisReport> },
    Error { message: String },
}

impl State {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::RosterLoaded => "roster_loaded",
            Self::SubjectSelected { .. } => "subject_selected",
            Self::AnalysisRunning { .. } => "analysis_running",
            Self::AnalysisComplete { .. } => "analysis_complete",
            Self::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LoadRoster(PathBuf),
    Query(String),
    Analyze,
    Reset,
}

/// What the caller should show after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    RosterLoaded { rows: usize, name_column: String },
    Selected { subject: String },
    NotFound { query: String },
    Ambiguous { candidates: Vec<String>, total: usize },
    Report(Box<AnalysisReport>),
    NothingToAnalyze,
    Failed { message: String },
    Cleared,
}

#[derive(Debug)]
pub struct Session {
    state: State,
    roster: Option<Arc<Roster>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            roster: None,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn roster(&self) -> Option<&Roster> {
        self.roster.as_deref()
    }

    /// The subject an `Analyze` would run for, if any.
    pub fn subject(&self) -> Option<&str> {
        match &self.state {
            State::SubjectSelected { subject } | State::AnalysisRunning { subject } => Some(subject),
            State::AnalysisComplete { report } => Some(&report.subject),
            _ => None,
        }
    }

    /// Apply one action, running the pipeline if it leads into analysis.
    #[instrument(level = "info", skip_all, fields(state = self.state.name()))]
    pub async fn handle<N, S, R>(&mut self, action: Action, pipeline: &Pipeline<N, S, R>) -> Feedback
    where
        N: NewsFetcher,
        S: Summarizer,
        R: CloudRenderer,
    {
        match action {
            Action::LoadRoster(path) => self.load_roster(path),
            Action::Query(text) => self.query(&text),
            Action::Analyze => self.analyze(pipeline).await,
            Action::Reset => {
                self.state = State::Idle;
                self.roster = None;
                Feedback::Cleared
            }
        }
    }

    fn load_roster(&mut self, path: PathBuf) -> Feedback {
        match Roster::load_cached(&path) {
            Ok(roster) => {
                let feedback = Feedback::RosterLoaded {
                    rows: roster.len(),
                    name_column: roster.name_column().to_string(),
                };
                self.roster = Some(roster);
                self.state = State::RosterLoaded;
                feedback
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Roster load failed");
                self.fail(e)
            }
        }
    }

    fn query(&mut self, text: &str) -> Feedback {
        let Some(roster) = &self.roster else {
            let subject = text.trim();
            if subject.is_empty() {
                return self.fail(crate::error::RosterError::EmptyQuery);
            }
            return self.select(subject.to_string());
        };

        match roster.select(text) {
            Ok(Selection::Unique(name)) => self.select(name),
            Ok(Selection::NotFound) => {
                self.state = State::RosterLoaded;
                Feedback::NotFound {
                    query: text.trim().to_string(),
                }
            }
            Ok(Selection::Ambiguous { candidates, total }) => {
                self.state = State::RosterLoaded;
                Feedback::Ambiguous { candidates, total }
            }
            Err(e) => self.fail(e),
        }
    }

    fn select(&mut self, subject: String) -> Feedback {
        info!(%subject, "Subject selected");
        self.state = State::SubjectSelected {
            subject: subject.clone(),
        };
        Feedback::Selected { subject }
    }

    async fn analyze<N, S, R>(&mut self, pipeline: &Pipeline<N, S, R>) -> Feedback
    where
        N: NewsFetcher,
        S: Summarizer,
        R: CloudRenderer,
    {
        let Some(subject) = self.subject().map(str::to_string) else {
            return Feedback::NothingToAnalyze;
        };

        self.state = State::AnalysisRunning {
            subject: subject.clone(),
        };
        match pipeline.analyze(&subject).await {
            Ok(report) => {
                let report = Box::new(report);
                self.state = State::AnalysisComplete {
                    report: report.clone(),
                };
                Feedback::Report(report)
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: impl ToString) -> Feedback {
        let message = error.to_string();
        self.state = State::Error {
            message: message.clone(),
        };
        Feedback::Failed { message }
    }
}
