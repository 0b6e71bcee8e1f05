use crate::client::LogEndpoint;
use crate::error::{LoadError, Result};
use crate::record::HuntRecord;
use csv::Writer;
use log::{error, info, warn};
use serde_json::Value;
use std::fs::File;
use std::path::Path;

/// The page-lifetime copy of the hunt log.
///
/// The list is only ever replaced wholesale: a successful load swaps in a
/// freshly decoded list, a transport failure leaves it untouched, and a
/// payload of the wrong shape empties it.
#[derive(Debug, Default)]
pub struct HistoryStore {
    records: Vec<HuntRecord>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[HuntRecord] {
        &self.records
    }

    /// Fetch the log and replace the stored list. Returns the new length.
    pub async fn load<E: LogEndpoint + ?Sized>(
        &mut self,
        endpoint: &E,
    ) -> std::result::Result<usize, LoadError> {
        let payload = endpoint.fetch_history().await?;

        match records_from_payload(payload) {
            Ok(records) => {
                info!("Loaded {} hunts", records.len());
                self.records = records;
                Ok(self.records.len())
            }
            Err(e) => {
                error!("{}", e);
                self.records = Vec::new();
                Err(e)
            }
        }
    }
}

/// Decode the endpoint's GET payload, which must be a JSON array.
pub fn records_from_payload(payload: Value) -> std::result::Result<Vec<HuntRecord>, LoadError> {
    let items = match payload {
        Value::Array(items) => items,
        other => return Err(LoadError::Schema(describe(&other))),
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            warn!("Skipping hunt #{}: expected an object, got {}", index, describe(&item));
            continue;
        }
        match serde_json::from_value(item) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping hunt #{}: {}", index, e),
        }
    }
    Ok(records)
}

fn describe(value: &Value) -> String {
    let mut text = value.to_string();
    if text.chars().count() > 80 {
        text = text.chars().take(77).collect::<String>() + "...";
    }
    text
}

/// Save records to CSV file
pub fn save_to_csv<'a, I>(records: I, path: &Path) -> Result<usize>
where
    I: IntoIterator<Item = &'a HuntRecord>,
{
    let file = File::create(path)?;
    let mut writer = Writer::from_writer(file);

    let mut written = 0;
    for record in records {
        writer.serialize(record)?;
        written += 1;
    }

    writer.flush()?;
    info!("Data saved to {}", path.display());
    Ok(written)
}
