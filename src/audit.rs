//! Audit trail of a match: the local commitment and every claim proof.

use std::io::Write;
use serde::{Deserialize, Serialize};
use crate::{Character, ProofRecord, Seat, Winner};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub session_id: String,
    pub commitment: String,
    pub salt: u64,
    pub hand: [Character; 2],
    pub proofs: Vec<ProofRecord>,
    pub winner: Option<Winner>,
}

// flat row, csv can't serialize the action payloads
#[derive(Serialize)]
struct ProofRow<'a> {
    action: &'static str,
    source: Seat,
    valid: bool,
    certificate: &'a str,
    timestamp: String,
}

impl AuditReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        for record in &self.proofs {
            wtr.serialize(ProofRow {
                action: record.action.name(),
                source: record.source,
                valid: record.valid,
                certificate: &record.certificate,
                timestamp: record.timestamp.to_rfc3339(),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}
