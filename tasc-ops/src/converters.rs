//! Domain conversion
//!
//! Leaving a specialized domain copies its settings into
//! `domain_metadata.<domain>` so a later conversion back can restore them.
//! The top-level settings stay where they were.
//!
//! Converting to `timeseries` with a `start_date` parameter turns numeric
//! steps into timestamps `start_date + step * frequency`.

use crate::factory::Params;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use tasc_core::{domain_key, keys, Collection, TascError, Value, CORE_DOMAIN};
use tracing::{debug, warn};

/// Prepares a collection and parameters for construction in another domain
pub type Converter =
    Arc<dyn Fn(Collection, Params) -> Result<(Collection, Params), TascError> + Send + Sync>;

/// Is `key` a metadata key owned by `domain`?
fn is_domain_key(domain: &str, key: &str) -> bool {
    key == domain_key(domain) || key.starts_with(&format!("{}_", domain))
}

/// Copy the current domain's settings into the archive and tag as core.
///
/// Core collections come back unchanged.
pub fn convert_to_core(mut collection: Collection) -> Collection {
    let source = collection.domain().to_string();
    if source == CORE_DOMAIN {
        return collection;
    }

    let metadata = collection.metadata_mut();
    let archived: BTreeMap<String, Value> = metadata
        .iter()
        .filter(|(k, _)| is_domain_key(&source, k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let archive = metadata
        .entry(keys::DOMAIN_METADATA.to_string())
        .or_insert_with(|| Value::Object(BTreeMap::new()));
    if archive.as_object().is_none() {
        warn!(found = archive.type_name(), "domain_metadata was not an object; replacing it");
        *archive = Value::Object(BTreeMap::new());
    }
    if let Some(map) = archive.as_object_mut() {
        let entry = map
            .entry(source.clone())
            .or_insert_with(|| Value::Object(BTreeMap::new()));
        match entry.as_object_mut() {
            Some(existing) => existing.extend(archived),
            None => *entry = Value::Object(archived),
        }
    }

    debug!(from = %source, "converted to core");
    collection.set_domain(CORE_DOMAIN);
    collection
}

/// Archived settings of `domain` (`domain_metadata.<domain>.<domain>_domain`)
pub fn archived_settings<'a>(collection: &'a Collection, domain: &str) -> Option<&'a BTreeMap<String, Value>> {
    collection
        .metadata()
        .get(keys::DOMAIN_METADATA)?
        .get(domain)?
        .get(&domain_key(domain))?
        .as_object()
}

pub const TIMESERIES_DOMAIN: &str = "timeseries";
pub const START_DATE_PARAM: &str = "start_date";
pub const FREQUENCY_PARAM: &str = "frequency";

/// `"1D"`, `"2H"`, `"30min"`, `"15s"`: a count followed by a unit letter
pub fn parse_frequency(frequency: &str) -> Option<Duration> {
    let digits = frequency.chars().take_while(char::is_ascii_digit).count();
    let count: i64 = frequency[..digits].parse().ok()?;
    match frequency[digits..].chars().next()?.to_ascii_uppercase() {
        'D' => Duration::try_days(count),
        'H' => Duration::try_hours(count),
        'M' => Duration::try_minutes(count),
        'S' => Duration::try_seconds(count),
        _ => None,
    }
}

fn parse_start(value: &Value) -> Result<NaiveDateTime, TascError> {
    let text = match value {
        Value::DateTime(dt) => return Ok(*dt),
        Value::Text(text) => text,
        other => {
            return Err(TascError::type_error("DateTime", other.type_name()).with_note(START_DATE_PARAM))
        }
    };
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| {
            TascError::invalid_argument(format!("start_date '{}' is not a date", text))
                .with_suggestion("use YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS")
        })
}

/// Numeric steps to timestamps ahead of a time-series conversion.
///
/// Runs only when `start_date` is given and the index is not already
/// timestamps. `frequency` defaults to one day; an unreadable one falls
/// back to one day as well. `start_date` is consumed.
pub fn prepare_for_timeseries(collection: Collection, mut params: Params) -> Result<(Collection, Params), TascError> {
    if matches!(collection.index().get(0), None | Some(Value::DateTime(_))) {
        return Ok((collection, params));
    }
    let Some(start) = params.remove(START_DATE_PARAM) else {
        return Ok((collection, params));
    };
    let start = parse_start(&start)?;

    let frequency = params.get(FREQUENCY_PARAM).and_then(Value::as_text).unwrap_or("1D");
    let step = parse_frequency(frequency).unwrap_or_else(|| {
        warn!(frequency, "unreadable frequency; using one day");
        Duration::days(1)
    });
    let step_ms = step.num_milliseconds() as f64;

    let stamps = collection
        .index()
        .values()
        .iter()
        .map(|v| {
            let n = v
                .as_number()
                .ok_or_else(|| TascError::type_error("Number", v.type_name()).with_note("row index"))?;
            Duration::try_milliseconds((step_ms * n).round() as i64)
                .and_then(|offset| start.checked_add_signed(offset))
                .map(Value::DateTime)
                .ok_or_else(|| TascError::invalid_argument(format!("step {} is out of the date range", n)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(%start, frequency, rows = stamps.len(), "steps converted to timestamps");
    Ok((collection.reindex(stamps)?, params))
}

/// (source, target) → converter
#[derive(Default)]
pub struct ConverterRegistry {
    converters: RwLock<BTreeMap<(String, String), Converter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, source: &str, target: &str, converter: F)
    where
        F: Fn(Collection, Params) -> Result<(Collection, Params), TascError> + Send + Sync + 'static,
    {
        self.register_arc(source, target, Arc::new(converter));
    }

    pub fn register_arc(&self, source: &str, target: &str, converter: Converter) {
        self.converters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((source.to_string(), target.to_string()), converter);
    }

    pub fn get(&self, source: &str, target: &str) -> Option<Converter> {
        self.converters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(source.to_string(), target.to_string()))
            .cloned()
    }

    pub fn pairs(&self) -> Vec<(String, String)> {
        self.converters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Prepare `collection` for construction in `target`.
    ///
    /// Order: the to-core routine for core targets, then a direct
    /// `(source, target)` converter, then archive-through-core followed by
    /// the `(core, target)` converter. Without any converter the collection
    /// passes through. Time-series targets get their steps dated first.
    pub fn prepare(
        &self,
        collection: Collection,
        target: &str,
        params: Params,
    ) -> Result<(Collection, Params), TascError> {
        let (collection, params) = if target == TIMESERIES_DOMAIN {
            prepare_for_timeseries(collection, params)?
        } else {
            (collection, params)
        };
        let source = collection.domain().to_string();
        if target == CORE_DOMAIN {
            return Ok((convert_to_core(collection), params));
        }
        if let Some(converter) = self.get(&source, target) {
            debug!(from = %source, to = target, "direct conversion");
            return converter(collection, params);
        }
        if source != CORE_DOMAIN && source != target {
            let archived = convert_to_core(collection);
            return match self.get(CORE_DOMAIN, target) {
                Some(converter) => converter(archived, params),
                None => Ok((archived, params)),
            };
        }
        Ok((collection, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ld_collection() -> Collection {
        Collection::from_columns([("load", vec![Value::from(1.0)])])
            .unwrap()
            .with_metadata("domain", "load_displacement")
            .with_metadata(
                "load_displacement_domain",
                Value::object([("load_column", "load"), ("displacement_column", "disp")]),
            )
            .with_metadata("title", "specimen A")
    }

    #[test]
    fn test_convert_to_core_copies_settings() {
        let core = convert_to_core(ld_collection());
        assert_eq!(core.domain(), "core");
        assert_eq!(
            core.metadata().get("load_displacement_domain"),
            ld_collection().metadata().get("load_displacement_domain")
        );
        assert_eq!(core.metadata()["title"], Value::from("specimen A"));
        let settings = archived_settings(&core, "load_displacement").unwrap();
        assert_eq!(settings["load_column"], Value::from("load"));
    }

    #[test]
    fn test_core_is_unchanged() {
        let c = Collection::from_columns([("x", vec![Value::from(1.0)])]).unwrap();
        assert_eq!(convert_to_core(c.clone()), c);
    }

    #[test]
    fn test_archive_keeps_other_domains() {
        let mut c = convert_to_core(ld_collection());
        c.set_domain("coordinate");
        c.metadata_mut().insert(
            "coordinate_domain".into(),
            Value::object([("coordinate_metadata_key", "coordinates")]),
        );
        let core = convert_to_core(c);
        assert!(archived_settings(&core, "load_displacement").is_some());
        assert!(archived_settings(&core, "coordinate").is_some());
    }

    #[test]
    fn test_prepare_prefers_direct_converter() {
        let registry = ConverterRegistry::new();
        registry.register("load_displacement", "lab", |c, mut p: Params| {
            p.insert("direct".into(), Value::from(true));
            Ok((c, p))
        });
        registry.register("core", "lab", |c, mut p: Params| {
            p.insert("via_core".into(), Value::from(true));
            Ok((c, p))
        });
        let (c, p) = registry.prepare(ld_collection(), "lab", Params::new()).unwrap();
        assert!(p.contains_key("direct"));
        assert_eq!(c.domain(), "load_displacement");
    }

    #[test]
    fn test_prepare_routes_through_core() {
        let registry = ConverterRegistry::new();
        registry.register("core", "lab", |c: Collection, mut p: Params| {
            p.insert("seen_domain".into(), Value::from(c.domain()));
            Ok((c, p))
        });
        let (c, p) = registry.prepare(ld_collection(), "lab", Params::new()).unwrap();
        assert_eq!(p["seen_domain"], Value::from("core"));
        assert!(archived_settings(&c, "load_displacement").is_some());
    }

    #[test]
    fn test_parse_frequency() {
        assert_eq!(parse_frequency("1D"), Some(Duration::days(1)));
        assert_eq!(parse_frequency("2H"), Some(Duration::hours(2)));
        assert_eq!(parse_frequency("30min"), Some(Duration::minutes(30)));
        assert_eq!(parse_frequency("15s"), Some(Duration::seconds(15)));
        assert_eq!(parse_frequency("hourly"), None);
        assert_eq!(parse_frequency("3W"), None);
    }

    #[test]
    fn test_timeseries_dates_steps() {
        let c = Collection::from_columns([("x", vec![Value::from(1.0), Value::from(2.0), Value::from(3.0)])]).unwrap();
        let params = Params::from([
            (START_DATE_PARAM.to_string(), Value::from("2024-01-01")),
            (FREQUENCY_PARAM.to_string(), Value::from("2H")),
        ]);
        let (dated, rest) = ConverterRegistry::new().prepare(c, TIMESERIES_DOMAIN, params).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(dated.index().get(0), Some(&Value::DateTime(start + Duration::hours(2))));
        assert_eq!(dated.index().get(2), Some(&Value::DateTime(start + Duration::hours(6))));
        assert!(!rest.contains_key(START_DATE_PARAM));
        assert_eq!(dated.column("x").unwrap().len(), 3);
    }

    #[test]
    fn test_timeseries_leaves_index_without_start_date() {
        let c = Collection::from_columns([("x", vec![Value::from(1.0)])]).unwrap();
        let (same, _) = prepare_for_timeseries(c.clone(), Params::new()).unwrap();
        assert_eq!(same, c);

        let other_target = Params::from([(START_DATE_PARAM.to_string(), Value::from("2024-01-01"))]);
        let (same, rest) = ConverterRegistry::new().prepare(c.clone(), "lab", other_target).unwrap();
        assert_eq!(same.index(), c.index());
        assert!(rest.contains_key(START_DATE_PARAM));
    }

    #[test]
    fn test_timeseries_rejects_bad_start_date() {
        let c = Collection::from_columns([("x", vec![Value::from(1.0)])]).unwrap();
        let params = Params::from([(START_DATE_PARAM.to_string(), Value::from("yesterday"))]);
        let err = prepare_for_timeseries(c, params).unwrap_err();
        assert_eq!(err.code, tasc_core::codes::INVALID_ARGUMENT);
    }

    #[test]
    fn test_prepare_to_core() {
        let registry = ConverterRegistry::new();
        let (c, _) = registry.prepare(ld_collection(), "core", Params::new()).unwrap();
        assert_eq!(c.domain(), "core");
    }
}
