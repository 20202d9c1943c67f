//! Connection probe: write, read back and delete one scratch document.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::document_store::{Collection, DocumentStore, Fields};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStep {
    Write,
    Read,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: ProbeStep,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub steps: Vec<StepOutcome>,
}

impl ProbeReport {
    /// All three steps ran and passed.
    pub fn is_healthy(&self) -> bool {
        self.steps.len() == 3 && self.steps.iter().all(|s| s.ok)
    }

    pub fn first_failure(&self) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| !s.ok)
    }

    fn pass(&mut self, step: ProbeStep, detail: impl Into<String>) {
        self.steps.push(StepOutcome { step, ok: true, detail: detail.into() });
    }

    fn fail(mut self, step: ProbeStep, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        tracing::error!(?step, %detail, "connection probe failed");
        self.steps.push(StepOutcome { step, ok: false, detail });
        self
    }
}

pub async fn probe_connection(store: &dyn DocumentStore) -> ProbeReport {
    let mut report = ProbeReport::default();
    let collection = Collection::Diagnostics;

    let mut probe = Fields::new();
    probe.insert("test".into(), JsonValue::Bool(true));
    probe.insert("message".into(), JsonValue::from("connection probe"));
    probe.insert("timestamp".into(), JsonValue::from(Utc::now().to_rfc3339()));

    let id = match store.add(collection, probe.clone()).await {
        Ok(id) => id,
        Err(e) => return report.fail(ProbeStep::Write, e.to_string()),
    };
    report.pass(ProbeStep::Write, format!("wrote {collection}/{id}"));

    match store.get(collection, id).await {
        Ok(Some(doc)) if doc.fields == probe => {
            report.pass(ProbeStep::Read, "read back identical document")
        }
        Ok(Some(_)) => return report.fail(ProbeStep::Read, "document came back altered"),
        Ok(None) => return report.fail(ProbeStep::Read, "document vanished after write"),
        Err(e) => return report.fail(ProbeStep::Read, e.to_string()),
    }

    match store.delete(collection, id).await {
        Ok(true) => report.pass(ProbeStep::Delete, "removed probe document"),
        Ok(false) => return report.fail(ProbeStep::Delete, "probe document was already gone"),
        Err(e) => return report.fail(ProbeStep::Delete, e.to_string()),
    }

    tracing::info!("connection probe passed");
    report
}
