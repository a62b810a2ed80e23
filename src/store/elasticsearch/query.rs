//! Predicate translation into the Elasticsearch query DSL.

use serde_json::{json, Value};

use crate::query::{Condition, Predicate};

/// Translate a predicate into a `bool` query of non-scoring filters
pub fn to_query(predicate: &Predicate) -> Value {
    let mut filter = Vec::new();
    let mut must_not = Vec::new();

    for condition in predicate.conditions() {
        match condition {
            Condition::Intersects { field, shape } => {
                let field = *field;
                filter.push(json!({
                    "geo_shape": {
                        field: {
                            "shape": shape,
                            "relation": "intersects"
                        }
                    }
                }));
            }
            Condition::WithinSphere {
                field,
                center,
                radius_meters,
            } => {
                let field = *field;
                filter.push(json!({
                    "geo_distance": {
                        "distance": format!("{}m", radius_meters),
                        field: { "lat": center.lat, "lon": center.lon }
                    }
                }));
            }
            Condition::Equals { field, value } => {
                let field = *field;
                filter.push(json!({ "term": { field: value } }));
            }
            Condition::NotEquals { field, value } => {
                let field = *field;
                must_not.push(json!({ "term": { field: value } }));
            }
            Condition::Missing { field } => {
                must_not.push(json!({ "exists": { "field": field } }));
            }
        }
    }

    json!({
        "bool": {
            "filter": filter,
            "must_not": must_not
        }
    })
}
