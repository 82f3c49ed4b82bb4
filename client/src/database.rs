//! The record-level API of one service connection.

use crate::{
    error::{Error, Result},
    transport::{Request, Transport},
    upload::{resolve_batch, resolve_record, Uploader},
};
use kinbase_engine::{codec, AppId, Decoder, PendingUpload, Record, RecordId, ResultSet};
use std::slice;
use tracing::info;

const RECORD_API: &str = "record.json";
const RECORDS_API: &str = "records.json";

/// Field list that selects only record ids.
const ID_ONLY: &[&str] = &["$id"];

/// Reads and writes records through a [`Transport`].
///
/// Write operations resolve pending uploads first; if any upload fails no
/// write request is sent. Queries are passed to the service untouched.
#[derive(Debug, Clone)]
pub struct Database<T> {
    transport: T,
    decoder: Decoder,
}

impl<T> Database<T>
where
    T: Transport + Uploader + Sync,
{
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            decoder: Decoder::default(),
        }
    }

    /// Use a different decode policy for responses.
    pub fn with_decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // Reads

    /// Run a query. An empty `fields` list returns every field.
    pub async fn select(&self, app: AppId, query: &str, fields: &[&str]) -> Result<ResultSet> {
        let request = select_request(app, query, fields);
        let body = self.transport.send(request).await?;
        Ok(self.decoder.decode_result_set(&body)?)
    }

    /// Run a query and ask the service for the total number of matches.
    pub async fn select_with_total_count(
        &self,
        app: AppId,
        query: &str,
        fields: &[&str],
    ) -> Result<ResultSet> {
        let request = select_request(app, query, fields).query("totalCount", true);
        let body = self.transport.send(request).await?;
        Ok(self.decoder.decode_result_set(&body)?)
    }

    pub async fn get_record(&self, app: AppId, id: RecordId) -> Result<Record> {
        let request = Request::get(RECORD_API).query("app", app).query("id", id);
        let body = self.transport.send(request).await?;
        Ok(self.decoder.decode_record(&body)?)
    }

    // Inserts

    /// Insert one record and return its new id.
    pub async fn insert(&self, app: AppId, record: &mut Record) -> Result<RecordId> {
        self.insert_all(app, slice::from_mut(record))
            .await?
            .first()
            .copied()
            .ok_or(Error::EmptyInsertResponse)
    }

    /// Insert records and return their new ids in order.
    pub async fn insert_all(&self, app: AppId, records: &mut [Record]) -> Result<Vec<RecordId>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        resolve_batch(records, &self.transport).await?;
        let body = codec::encode_insert(app, records)?;

        info!(app, count = records.len(), "inserting records");
        let response = self.transport.send(Request::post(RECORDS_API, body)).await?;
        Ok(codec::decode_insert_response(&response)?.ids)
    }

    // Updates

    pub async fn update(&self, app: AppId, id: RecordId, record: &mut Record) -> Result<()> {
        self.update_ids(app, &[id], record).await
    }

    /// Write the same field values to every listed record.
    pub async fn update_ids(&self, app: AppId, ids: &[RecordId], record: &mut Record) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        resolve_record(record, &self.transport).await?;
        let body = codec::encode_update_by_ids(app, ids, record)?;

        info!(app, count = ids.len(), "updating records by id");
        self.transport.send(Request::put(RECORDS_API, body)).await?;
        Ok(())
    }

    /// Update a record identified by its own id and, if set, revision.
    pub async fn update_record(&self, app: AppId, record: &mut Record) -> Result<()> {
        self.update_records(app, slice::from_mut(record)).await
    }

    pub async fn update_records(&self, app: AppId, records: &mut [Record]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        resolve_batch(records, &self.transport).await?;
        let body = codec::encode_update_by_records(app, records)?;

        info!(app, count = records.len(), "updating records");
        self.transport.send(Request::put(RECORDS_API, body)).await?;
        Ok(())
    }

    /// Update records identified by the value of a unique key field.
    pub async fn update_by_key(
        &self,
        app: AppId,
        key_field: &str,
        records: &mut [Record],
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        resolve_batch(records, &self.transport).await?;
        let body = codec::encode_update_by_key(app, key_field, records)?;

        info!(app, key_field, count = records.len(), "updating records by key");
        self.transport.send(Request::put(RECORDS_API, body)).await?;
        Ok(())
    }

    /// Apply the same field values to every record matching `query`.
    pub async fn update_by_query(&self, app: AppId, query: &str, record: &mut Record) -> Result<()> {
        let ids = self.select_ids(app, query).await?;
        self.update_ids(app, &ids, record).await
    }

    // Deletes

    pub async fn delete(&self, app: AppId, id: RecordId) -> Result<()> {
        self.delete_ids(app, &[id]).await
    }

    pub async fn delete_ids(&self, app: AppId, ids: &[RecordId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let body = codec::encode_delete_by_ids(app, ids)?;

        info!(app, count = ids.len(), "deleting records");
        self.transport.send(Request::delete(RECORDS_API, body)).await?;
        Ok(())
    }

    /// Delete a record, guarded by its revision when it has one.
    pub async fn delete_record(&self, app: AppId, record: &Record) -> Result<()> {
        self.delete_records(app, slice::from_ref(record)).await
    }

    pub async fn delete_records(&self, app: AppId, records: &[Record]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let body = codec::encode_delete(app, records)?;

        info!(app, count = records.len(), "deleting records");
        self.transport.send(Request::delete(RECORDS_API, body)).await?;
        Ok(())
    }

    pub async fn delete_by_query(&self, app: AppId, query: &str) -> Result<()> {
        let ids = self.select_ids(app, query).await?;
        self.delete_ids(app, &ids).await
    }

    // Files

    /// Upload a file on its own and return the key.
    pub async fn upload_file(&self, upload: &PendingUpload) -> Result<String> {
        self.transport.upload(upload).await
    }

    async fn select_ids(&self, app: AppId, query: &str) -> Result<Vec<RecordId>> {
        let rs = self.select(app, query, ID_ONLY).await?;
        Ok(rs.iter().filter_map(Record::id).collect())
    }
}

fn select_request(app: AppId, query: &str, fields: &[&str]) -> Request {
    let mut request = Request::get(RECORDS_API)
        .query("app", app)
        .query("query", query);
    for (i, field) in fields.iter().enumerate() {
        request = request.query(format!("fields[{}]", i), field);
    }
    request
}
