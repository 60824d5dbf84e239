//! The coordinate collection: per-column (x, y, z) positions kept in
//! column metadata

use std::collections::BTreeMap;
use tasc_core::{domain_key, Collection, Column, TascError, Value};
use tasc_ops::DomainParams;
use tracing::debug;

pub const DOMAIN: &str = "coordinate";
/// Domain setting naming the column metadata key that holds positions
pub const METADATA_KEY_SETTING: &str = "coordinate_metadata_key";
pub const DEFAULT_METADATA_KEY: &str = "coordinates";
/// Constructor parameter: object of column name → {x, y, z}
pub const COORDINATES_PARAM: &str = "coordinates";

/// A position; any axis may be unknown
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coordinates {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl Coordinates {
    pub fn new(x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Self {
        Self { x, y, z }
    }

    /// Read `{x, y, z}`; missing or non-numeric axes are unknown
    pub fn from_value(value: &Value) -> Self {
        let axis = |name: &str| value.get(name).and_then(Value::as_number);
        Self::new(axis("x"), axis("y"), axis("z"))
    }

    pub fn to_value(&self) -> Value {
        Value::object([("x", self.x), ("y", self.y), ("z", self.z)])
    }

    pub fn is_set(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.z.is_some()
    }

    /// Overwrite the axes given in `other`, keep the rest
    pub fn merge(&self, other: Coordinates) -> Self {
        Self::new(other.x.or(self.x), other.y.or(self.y), other.z.or(self.z))
    }

    /// Euclidean distance; planar when either z is unknown
    pub fn distance(&self, other: &Coordinates) -> Option<f64> {
        let dx = other.x? - self.x?;
        let dy = other.y? - self.y?;
        let squared = match (self.z, other.z) {
            (Some(z1), Some(z2)) => dx * dx + dy * dy + (z2 - z1) * (z2 - z1),
            _ => dx * dx + dy * dy,
        };
        Some(squared.sqrt())
    }
}

fn metadata_key(metadata: &BTreeMap<String, Value>) -> Option<&str> {
    metadata
        .get(&domain_key(DOMAIN))?
        .get(METADATA_KEY_SETTING)?
        .as_text()
}

/// Build a coordinate collection.
///
/// Every column gets an all-unknown position unless it already carries one;
/// the `coordinates` parameter then fills in positions for named columns.
pub fn construct(params: DomainParams) -> Result<Collection, TascError> {
    let key = match params.text(METADATA_KEY_SETTING)? {
        Some(key) => key.to_string(),
        None => metadata_key(&params.metadata)
            .unwrap_or(DEFAULT_METADATA_KEY)
            .to_string(),
    };
    let initial = match params.get(COORDINATES_PARAM) {
        None | Some(Value::Null) => BTreeMap::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            return Err(TascError::type_error("Object", other.type_name())
                .with_note(format!("'{}' parameter of the {} domain", COORDINATES_PARAM, DOMAIN)))
        }
    };

    let mut collection = params.into_collection()?;
    collection.metadata_mut().insert(
        domain_key(DOMAIN),
        Value::object([(METADATA_KEY_SETTING, key.as_str())]),
    );
    collection.set_domain(DOMAIN);

    for name in collection.column_names().into_iter().map(str::to_string).collect::<Vec<_>>() {
        let metadata = collection.column_metadata_mut(&name)?;
        metadata
            .entry(key.clone())
            .or_insert_with(|| Coordinates::default().to_value());
    }
    for (name, position) in &initial {
        if !collection.has_column(name) {
            debug!(column = %name, "coordinates given for a missing column; ignored");
            continue;
        }
        set_coordinates(&mut collection, name, Coordinates::from_value(position))?;
    }
    Ok(collection)
}

/// Merge `position` into the stored coordinates of `column`
pub fn set_coordinates(
    collection: &mut Collection,
    column: &str,
    position: Coordinates,
) -> Result<(), TascError> {
    let key = CoordinateView::of(collection).metadata_key().to_string();
    let metadata = collection.column_metadata_mut(column)?;
    let current = metadata.get(&key).map(Coordinates::from_value).unwrap_or_default();
    metadata.insert(key, current.merge(position).to_value());
    Ok(())
}

/// Read-only view over a collection's column positions
#[derive(Debug, Clone, Copy)]
pub struct CoordinateView<'a> {
    collection: &'a Collection,
}

impl<'a> CoordinateView<'a> {
    pub fn of(collection: &'a Collection) -> Self {
        Self { collection }
    }

    pub fn metadata_key(&self) -> &'a str {
        metadata_key(self.collection.metadata()).unwrap_or(DEFAULT_METADATA_KEY)
    }

    fn of_column(&self, column: &Column) -> Coordinates {
        column
            .metadata
            .get(self.metadata_key())
            .map(Coordinates::from_value)
            .unwrap_or_default()
    }

    pub fn coordinates(&self, column: &str) -> Result<Coordinates, TascError> {
        Ok(self.of_column(self.collection.column(column)?))
    }

    /// Columns with at least one known axis, in column order
    pub fn columns_with_coordinates(&self) -> Vec<&'a str> {
        self.collection
            .columns()
            .iter()
            .filter(|c| self.of_column(c).is_set())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Distance between two columns' positions
    pub fn distance(&self, column1: &str, column2: &str) -> Result<f64, TascError> {
        let a = self.coordinates(column1)?;
        let b = self.coordinates(column2)?;
        a.distance(&b).ok_or_else(|| {
            TascError::invalid_argument(format!(
                "'{}' and '{}' need x and y coordinates to measure a distance",
                column1, column2
            ))
            .with_suggestion("set them with set_column_coordinates")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasc_core::Indices;

    fn params() -> DomainParams {
        DomainParams {
            index: Indices::sequential(2),
            columns: vec![
                Column::numeric("a", [Some(1.0), Some(2.0)]),
                Column::numeric("b", [Some(3.0), None]),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_construct_initializes_every_column() {
        let c = construct(params()).unwrap();
        assert_eq!(c.domain(), DOMAIN);
        let view = CoordinateView::of(&c);
        assert_eq!(view.metadata_key(), DEFAULT_METADATA_KEY);
        assert_eq!(view.coordinates("a").unwrap(), Coordinates::default());
        assert!(c.column("b").unwrap().metadata.contains_key("coordinates"));
        assert!(view.columns_with_coordinates().is_empty());
    }

    #[test]
    fn test_construct_with_positions_and_custom_key() {
        let positions = Value::object([
            ("a", Value::object([("x", 1.0), ("y", 2.0)])),
            ("ghost", Value::object([("x", 9.0)])),
        ]);
        let c = construct(
            params()
                .with(METADATA_KEY_SETTING, "pos")
                .with(COORDINATES_PARAM, positions),
        )
        .unwrap();
        let view = CoordinateView::of(&c);
        assert_eq!(view.metadata_key(), "pos");
        assert_eq!(view.coordinates("a").unwrap(), Coordinates::new(Some(1.0), Some(2.0), None));
        assert_eq!(view.columns_with_coordinates(), vec!["a"]);
    }

    #[test]
    fn test_construct_rejects_bad_coordinates() {
        let err = construct(params().with(COORDINATES_PARAM, 3.0)).unwrap_err();
        assert_eq!(err.code, tasc_core::codes::TYPE_ERROR);
    }

    #[test]
    fn test_distance() {
        let a = Coordinates::new(Some(0.0), Some(0.0), Some(0.0));
        let b = Coordinates::new(Some(3.0), Some(4.0), None);
        assert_eq!(a.distance(&b), Some(5.0));
        let c = Coordinates::new(Some(2.0), Some(3.0), Some(6.0));
        assert_eq!(a.distance(&c), Some(7.0));
        assert_eq!(a.distance(&Coordinates::new(Some(1.0), None, None)), None);
    }

    #[test]
    fn test_set_coordinates_merges() {
        let mut c = construct(params()).unwrap();
        set_coordinates(&mut c, "b", Coordinates::new(Some(1.0), Some(1.0), None)).unwrap();
        set_coordinates(&mut c, "b", Coordinates::new(None, None, Some(5.0))).unwrap();
        assert_eq!(
            CoordinateView::of(&c).coordinates("b").unwrap(),
            Coordinates::new(Some(1.0), Some(1.0), Some(5.0))
        );
        assert!(set_coordinates(&mut c, "zzz", Coordinates::default()).is_err());
    }
}
