//! Upload resolution.
//!
//! Every pending upload in a write batch is turned into a file key before
//! anything is encoded. If one upload fails the whole write is abandoned
//! and the failed field keeps its pending marker.

use crate::error::Result;
use futures::future::{try_join_all, BoxFuture, FutureExt};
use kinbase_engine::{FileRef, PendingUpload, Record, Shape};
use std::future::Future;
use tracing::debug;

/// Uploads file content and returns the key the service assigned to it.
pub trait Uploader {
    fn upload(&self, upload: &PendingUpload) -> impl Future<Output = Result<String>> + Send;
}

/// Whether the record or any of its subtable rows still holds a pending
/// upload.
pub fn has_pending_uploads(record: &Record) -> bool {
    record.fields().any(|field| {
        field.has_pending_upload()
            || (field.shape() == Shape::Subtable
                && field
                    .as_subtable()
                    .is_ok_and(|rows| rows.iter().any(has_pending_uploads)))
    })
}

/// Resolve the pending uploads of one record, subtable rows included.
///
/// Fields within the record are uploaded one after another. A successful
/// upload appends the new key to the field's file list.
pub fn resolve_record<'a, U>(record: &'a mut Record, uploader: &'a U) -> BoxFuture<'a, Result<()>>
where
    U: Uploader + Sync,
{
    async move {
        for field in record.fields_mut() {
            if let Some(upload) = field.pending_upload() {
                let file_key = uploader.upload(upload).await?;
                debug!(field = field.name(), %file_key, "resolved upload");
                field.take_pending_upload();
                field.push_file(FileRef::new(file_key))?;
            }

            if field.shape() == Shape::Subtable {
                if let Some(rows) = field.as_subtable_mut()? {
                    for row in rows.iter_mut() {
                        resolve_record(row, uploader).await?;
                    }
                }
            }
        }
        Ok(())
    }
    .boxed()
}

/// Resolve every record of a batch. Records are independent, so their
/// uploads run concurrently; the first failure fails the batch.
pub async fn resolve_batch<U>(records: &mut [Record], uploader: &U) -> Result<()>
where
    U: Uploader + Sync,
{
    let pending: Vec<_> = records
        .iter_mut()
        .filter(|record| has_pending_uploads(record))
        .map(|record| resolve_record(record, uploader))
        .collect();

    if pending.is_empty() {
        return Ok(());
    }
    try_join_all(pending).await?;
    Ok(())
}
