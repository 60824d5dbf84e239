//! Conversion from the core domain

use crate::domain::{DOMAIN, METADATA_KEY_SETTING};
use tasc_core::{Collection, TascError, Value};
use tasc_ops::{archived_settings, Params};
use tracing::debug;

/// Prepare a core collection for the coordinate domain.
///
/// A collection that was coordinate before gets its metadata key back
/// unless the caller names one.
pub fn from_core(collection: Collection, mut params: Params) -> Result<(Collection, Params), TascError> {
    let explicit = params.get(METADATA_KEY_SETTING).is_some_and(|v| !v.is_null());
    if !explicit {
        if let Some(key) = archived_settings(&collection, DOMAIN)
            .and_then(|s| s.get(METADATA_KEY_SETTING))
            .and_then(Value::as_text)
        {
            debug!(key, "restoring archived coordinate metadata key");
            params.insert(METADATA_KEY_SETTING.to_string(), Value::from(key));
        }
    }
    Ok((collection, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasc_ops::convert_to_core;

    fn archived(key: &str) -> Collection {
        let c = Collection::from_columns([("a", vec![Value::from(1.0)])])
            .unwrap()
            .with_metadata("domain", DOMAIN)
            .with_metadata("coordinate_domain", Value::object([(METADATA_KEY_SETTING, key)]));
        convert_to_core(c)
    }

    #[test]
    fn test_restores_archived_key() {
        let (_, params) = from_core(archived("pos"), Params::new()).unwrap();
        assert_eq!(params.get(METADATA_KEY_SETTING), Some(&Value::from("pos")));
    }

    #[test]
    fn test_explicit_key_wins() {
        let mut params = Params::new();
        params.insert(METADATA_KEY_SETTING.into(), Value::from("where"));
        let (_, params) = from_core(archived("pos"), params).unwrap();
        assert_eq!(params.get(METADATA_KEY_SETTING), Some(&Value::from("where")));
    }

    #[test]
    fn test_plain_core_passes_through() {
        let c = Collection::from_columns([("a", vec![Value::from(1.0)])]).unwrap();
        let (out, params) = from_core(c.clone(), Params::new()).unwrap();
        assert_eq!(out, c);
        assert!(params.is_empty());
    }
}
