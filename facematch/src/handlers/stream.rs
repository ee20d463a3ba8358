use serde_json::{json, Value};

use crate::{
    consts::consts::FaceId,
    gateway::Gateways,
    model::event::{FrameSearch, StreamEvent, StreamRecord},
    resolver::identity::{render_notification_summary, IdentityResolver},
};

use super::{HandlerError, HandlerResponse, HandlerResult};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// The frame had no face in it, nothing was published
    NoFaceDetected,
    /// No registered face matched. `count` is the batch's unmatched count including this record
    Unmatched { count: usize },
    Notified { face_id: FaceId, summary: String },
}

#[derive(Debug)]
pub struct RecordReport {
    /// Position of the record in its batch
    pub index: usize,
    pub sequence_number: Option<String>,
    pub result: HandlerResult<RecordOutcome>,
}

/// Per record results of one batch. A failed record never stops the ones after it
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<RecordReport>,
    pub unmatched: usize,
}

impl BatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &RecordReport> {
        self.records.iter().filter(|r| r.result.is_err())
    }

    pub fn notified(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.result, Ok(RecordOutcome::Notified { .. })))
            .count()
    }

    /// Partial batch response, lets the stream source retry only the records that failed
    pub fn batch_item_failures(&self) -> Value {
        let failures: Vec<Value> = self
            .failures()
            .filter_map(|r| r.sequence_number.as_ref())
            .map(|sequence_number| json!({ "itemIdentifier": sequence_number }))
            .collect();

        json!({ "batchItemFailures": failures })
    }

    pub fn summary(&self) -> Value {
        json!({
            "processed": self.records.len(),
            "notified": self.notified(),
            "unmatched": self.unmatched,
            "failed": self.failures().count(),
            "batchItemFailures": self.batch_item_failures()["batchItemFailures"],
        })
    }
}

/// Processes the records of one batch in delivery order
pub async fn handle_stream(gateways: &Gateways, event: &StreamEvent) -> BatchReport {
    log::info!("Parsing request data [Records: {}]", event.records.len());

    let mut report = BatchReport::default();

    for (index, record) in event.records.iter().enumerate() {
        let result = process_record(gateways, record, &mut report.unmatched).await;

        if let Err(e) = &result {
            log::error!(
                "Failed to process stream record [Index: {}, SequenceNumber: {}]: {}",
                index,
                record.sequence_number().unwrap_or("-"),
                e
            );
        }

        report.records.push(RecordReport {
            index,
            sequence_number: record.kinesis.sequence_number.clone(),
            result,
        });
    }

    log::info!(
        "Processed batch [Records: {}, Notified: {}, Unmatched: {}, Failed: {}]",
        report.records.len(),
        report.notified(),
        report.unmatched,
        report.failures().count()
    );

    report
}

/// Entry point for a raw batch body. Only an unreadable batch fails as a whole
pub async fn handle_stream_request(gateways: &Gateways, body: &str) -> HandlerResponse {
    match StreamEvent::parse(body) {
        Ok(event) => HandlerResponse::ok(handle_stream(gateways, &event).await.summary()),
        Err(e) => {
            let error = HandlerError::from(e);

            log::error!("Unreadable stream batch: {}", error);
            HandlerResponse::error(&error)
        }
    }
}

async fn process_record(
    gateways: &Gateways,
    record: &StreamRecord,
    unmatched: &mut usize,
) -> HandlerResult<RecordOutcome> {
    let FrameSearch::Searched(result) = record.decode()? else {
        log::info!("No face detected in frame");
        return Ok(RecordOutcome::NoFaceDetected);
    };

    let identified = IdentityResolver::new(gateways.records.as_ref())
        .lookup(result)
        .await?;

    match identified {
        None => {
            *unmatched += 1;

            log::info!("No matching faceId found [Unmatched: {}]", unmatched);

            gateways
                .notifier
                .publish(&format!("Unknown person count={}", unmatched))
                .await?;

            Ok(RecordOutcome::Unmatched { count: *unmatched })
        }
        Some(identified) => {
            let summary = render_notification_summary(&identified.record);

            log::info!("Sending notification [FaceId: {}]", identified.face_match.face_id);

            gateways.notifier.publish(&summary).await?;

            Ok(RecordOutcome::Notified {
                face_id: identified.face_match.face_id,
                summary,
            })
        }
    }
}
