//! Editable history session for one open client.
//!
//! State is ephemeral until [`HistorySession::save`] hands the aggregate to a
//! [`ProfileStore`]. It changes only through a successful extraction (whole
//! bond list replaced), [`HistorySession::clear`], or a resync when the stored
//! version differs from the one this session was loaded from.

use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::store::ProfileStore;
use cnis_core::{HeuristicConfig, Result};
use cnis_extract::duration::sum_durations_with;
use cnis_extract::{clean_fragments, extract_bonds_at, Bond, Duration, EmploymentHistory, TextSource};

/// Warning shown when a statement yields no bonds.
pub const NO_BONDS_MESSAGE: &str =
    "Nenhum vínculo encontrado. Verifique se o PDF é um Extrato CNIS válido.";

/// Result of one extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExtractionOutcome {
    /// Bonds were found and replaced the session's list.
    Found { count: usize },
    /// Nothing plausible was found; the session is unchanged.
    Empty,
}

impl ExtractionOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::Found { count } => format!("{} vínculos encontrados!", count),
            Self::Empty => NO_BONDS_MESSAGE.to_string(),
        }
    }
}

/// Serializable snapshot of a session for presentation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub client_id: String,
    pub bonds: Vec<Bond>,
    pub total_duration: Duration,
    pub last_update: Option<String>,
    pub has_unsaved_changes: bool,
}

pub struct HistorySession {
    client_id: String,
    config: HeuristicConfig,
    bonds: Vec<Bond>,
    last_update: Option<String>,
    unsaved: bool,
    /// Stored version this session was opened or last synchronized from.
    loaded: Option<EmploymentHistory>,
}

impl HistorySession {
    /// Open a session from a client's stored history.
    pub fn open(
        client_id: impl Into<String>,
        stored: Option<EmploymentHistory>,
        config: HeuristicConfig,
    ) -> Self {
        let mut session = Self {
            client_id: client_id.into(),
            config,
            bonds: Vec::new(),
            last_update: None,
            unsaved: false,
            loaded: None,
        };
        session.replace_from(stored);
        session
    }

    /// Open a session, loading the stored history from `store`.
    pub fn load(
        client_id: impl Into<String>,
        store: &dyn ProfileStore,
        config: HeuristicConfig,
    ) -> Result<Self> {
        let client_id = client_id.into();
        let stored = store.load_history(&client_id)?;
        Ok(Self::open(client_id, stored, config))
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Aggregate tenure, always derived from the current bonds.
    pub fn total_duration(&self) -> Duration {
        sum_durations_with(
            self.bonds.iter().map(Bond::duration),
            self.config.days_per_month,
            self.config.months_per_year,
        )
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn last_update(&self) -> Option<&str> {
        self.last_update.as_deref()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            client_id: self.client_id.clone(),
            bonds: self.bonds.clone(),
            total_duration: self.total_duration(),
            last_update: self.last_update.clone(),
            has_unsaved_changes: self.unsaved,
        }
    }

    /// Decode a document and extract its bonds.
    ///
    /// Source failures are returned as errors and leave the session untouched.
    pub fn extract(
        &mut self,
        source: &dyn TextSource,
        document: &[u8],
    ) -> Result<ExtractionOutcome> {
        let fragments = source.fragments(document).map_err(|e| {
            warn!("Could not read statement for {}: {}", self.client_id, e);
            e
        })?;
        Ok(self.extract_fragments(&fragments))
    }

    /// Extract bonds from an already retrieved fragment sequence.
    pub fn extract_fragments<S: AsRef<str>>(&mut self, fragments: &[S]) -> ExtractionOutcome {
        self.extract_fragments_at(fragments, Local::now().date_naive())
    }

    /// Like [`Self::extract_fragments`], measuring ongoing bonds against `today`.
    pub fn extract_fragments_at<S: AsRef<str>>(
        &mut self,
        fragments: &[S],
        today: NaiveDate,
    ) -> ExtractionOutcome {
        let fragments = clean_fragments(fragments);
        let bonds = extract_bonds_at(&fragments, &self.config, today);
        if bonds.is_empty() {
            warn!(
                "No bonds found in {} fragments for {}",
                fragments.len(),
                self.client_id
            );
            return ExtractionOutcome::Empty;
        }

        let count = bonds.len();
        self.bonds = bonds;
        self.last_update = Some(Utc::now().to_rfc3339());
        self.unsaved = true;
        info!("Extracted {} bonds for {}", count, self.client_id);
        ExtractionOutcome::Found { count }
    }

    /// Empty the bond list. Only durable after [`Self::save`].
    pub fn clear(&mut self) {
        self.bonds.clear();
        self.last_update = None;
        self.unsaved = true;
        info!("Cleared history for {}", self.client_id);
    }

    /// Persist the current bonds and their total.
    pub fn save(&mut self, store: &dyn ProfileStore) -> Result<EmploymentHistory> {
        let timestamp = self
            .last_update
            .clone()
            .unwrap_or_else(|| Utc::now().to_rfc3339());
        let history = EmploymentHistory::new(self.bonds.clone(), timestamp.clone(), &self.config);

        store.update_history(&self.client_id, &history)?;

        self.last_update = Some(timestamp);
        self.unsaved = false;
        self.loaded = Some(history.clone());
        info!(
            "Saved {} bonds for {} (total {})",
            history.bonds().len(),
            self.client_id,
            history.total_duration()
        );
        Ok(history)
    }

    /// Adopt the externally loaded profile if it differs from what this
    /// session was loaded from. Local edits are discarded, never merged.
    pub fn resync(&mut self, client_id: &str, stored: Option<EmploymentHistory>) -> bool {
        if self.client_id == client_id && self.loaded == stored {
            return false;
        }
        if self.unsaved {
            warn!("Discarding unsaved history of {}", self.client_id);
        }
        self.client_id = client_id.to_string();
        self.replace_from(stored);
        info!("Resynchronized history for {}", self.client_id);
        true
    }

    fn replace_from(&mut self, stored: Option<EmploymentHistory>) {
        match &stored {
            Some(history) => {
                self.bonds = history.bonds().to_vec();
                self.last_update = Some(history.last_update_timestamp().to_string());
            }
            None => {
                self.bonds = Vec::new();
                self.last_update = None;
            }
        }
        self.unsaved = false;
        self.loaded = stored;
    }
}
