use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{billing::Subscription, errors::SubscriptionError};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// On-disk form of the subscription collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionSnapshot {
    #[serde(default = "SubscriptionSnapshot::schema_version_default")]
    pub schema_version: u8,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

impl SubscriptionSnapshot {
    pub fn new(subscriptions: Vec<Subscription>) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            subscriptions,
        }
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

/// Writes the subscriptions to disk atomically by staging to a temporary file.
pub fn save_subscriptions_to_file(
    subscriptions: &[Subscription],
    path: &Path,
) -> Result<(), SubscriptionError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let snapshot = SubscriptionSnapshot::new(subscriptions.to_vec());
    let tmp = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(&tmp, json)?;
    fs::rename(tmp, path)?;
    tracing::debug!(path = %path.display(), count = subscriptions.len(), "saved subscriptions");
    Ok(())
}

/// Loads a subscription snapshot from disk, returning structured errors on failure.
pub fn load_subscriptions_from_file(path: &Path) -> Result<Vec<Subscription>, SubscriptionError> {
    let data = fs::read_to_string(path)?;
    let snapshot: SubscriptionSnapshot = serde_json::from_str(&data)?;
    if snapshot.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(SubscriptionError::InvalidInput(format!(
            "unsupported schema version {}",
            snapshot.schema_version
        )));
    }
    Ok(snapshot.subscriptions)
}
