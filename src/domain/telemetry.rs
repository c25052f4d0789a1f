// Telemetry series domain model
use super::timestamp::Timestamp;
use super::value::Value;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub ts: Timestamp,
    pub value: Value,
}

impl Point {
    pub fn new(ts: Timestamp, value: impl Into<Value>) -> Self {
        Self {
            ts,
            value: value.into(),
        }
    }
}

/// A named series holding at most one point per timestamp.
///
/// Adding a point for a timestamp that is already present is silently
/// ignored: the first value written for a timestamp wins. Code that needs to
/// replace values removes the old points first.
#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    name: String,
    points: BTreeMap<Timestamp, Value>,
}

impl Telemetry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: BTreeMap::new(),
        }
    }

    pub fn with_points(name: impl Into<String>, points: impl IntoIterator<Item = Point>) -> Self {
        let mut telemetry = Self::new(name);
        for point in points {
            telemetry.add(point);
        }
        telemetry
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns `true` if the point was stored, `false` if its timestamp was taken.
    pub fn add(&mut self, point: Point) -> bool {
        match self.points.entry(point.ts) {
            Entry::Vacant(slot) => {
                slot.insert(point.value);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn add_value(&mut self, ts: i64, value: impl Into<Value>) -> bool {
        self.add(Point::new(Timestamp::of(ts), value))
    }

    pub fn get(&self, ts: Timestamp) -> Option<&Value> {
        self.points.get(&ts)
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.points
            .iter()
            .map(|(ts, value)| Point::new(*ts, value.clone()))
    }

    /// Points with `start <= ts < end`, in time order.
    pub fn points_in_range(&self, start: Timestamp, end: Timestamp) -> Vec<Point> {
        if start >= end {
            return Vec::new();
        }
        self.points
            .range(start..end)
            .map(|(ts, value)| Point::new(*ts, value.clone()))
            .collect()
    }

    /// Remove every point with `start <= ts < end` and return them.
    pub fn remove_range(&mut self, start: Timestamp, end: Timestamp) -> Vec<Point> {
        let removed = self.points_in_range(start, end);
        for point in &removed {
            self.points.remove(&point.ts);
        }
        removed
    }

    /// Split into consecutive series of at most `size` points each, all
    /// carrying this series' name. Restartable: every call walks the series
    /// from the beginning.
    pub fn partition(&self, size: usize) -> Partitions<'_> {
        assert!(size >= 1, "partition size must be at least 1");
        Partitions {
            name: &self.name,
            points: self.points.iter(),
            size,
        }
    }

    pub fn partition_count(&self, size: usize) -> usize {
        assert!(size >= 1, "partition size must be at least 1");
        self.points.len().div_ceil(size)
    }

    pub fn to_json_value(&self) -> JsonValue {
        let records = self
            .points
            .iter()
            .map(|(ts, value)| {
                let mut values = Map::new();
                values.insert(self.name.clone(), value.to_json());

                let mut record = Map::new();
                record.insert("ts".to_string(), JsonValue::from(ts.get()));
                record.insert("values".to_string(), JsonValue::Object(values));
                JsonValue::Object(record)
            })
            .collect();
        JsonValue::Array(records)
    }

    /// Wire payload: `[{"ts": <ms>, "values": {"<name>": <value>}}, ...]`
    pub fn to_json(&self) -> String {
        self.to_json_value().to_string()
    }
}

pub struct Partitions<'a> {
    name: &'a str,
    points: std::collections::btree_map::Iter<'a, Timestamp, Value>,
    size: usize,
}

impl Iterator for Partitions<'_> {
    type Item = Telemetry;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chunk = Telemetry::new(self.name);
        for (ts, value) in self.points.by_ref().take(self.size) {
            chunk.points.insert(*ts, value.clone());
        }
        if chunk.is_empty() { None } else { Some(chunk) }
    }
}
