//! Store-agnostic filter predicates.
//!
//! A `Predicate` is a conjunction of conditions over named document fields.
//! Both the in-memory store and the Elasticsearch translator consume it.

use crate::models::{Point, Shape};
use crate::store::{fields, Document};
use crate::geometry::haversine_distance;

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Geometry in `field` intersects `shape`
    Intersects { field: &'static str, shape: Shape },
    /// Geometry in `field` lies within `radius_meters` of `center`
    WithinSphere {
        field: &'static str,
        center: Point,
        radius_meters: f64,
    },
    Equals { field: &'static str, value: String },
    NotEquals { field: &'static str, value: String },
    /// `field` is unset or null
    Missing { field: &'static str },
}

impl Condition {
    /// Evaluate this condition against a document.
    pub fn matches<T: Document>(&self, doc: &T) -> bool {
        match self {
            Condition::Intersects { field, shape } => doc
                .shape(field)
                .map(|stored| stored.intersects(shape))
                .unwrap_or(false),
            Condition::WithinSphere {
                field,
                center,
                radius_meters,
            } => match doc.shape(field) {
                Some(Shape::Point(p)) => haversine_distance(*center, p) <= *radius_meters,
                _ => false,
            },
            Condition::Equals { field, value } => doc.keyword(field).as_deref() == Some(value.as_str()),
            Condition::NotEquals { field, value } => doc.keyword(field).as_deref() != Some(value.as_str()),
            Condition::Missing { field } => doc.keyword(field).is_none(),
        }
    }
}

/// Conjunction of conditions. An empty predicate matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intersects(mut self, field: &'static str, shape: impl Into<Shape>) -> Self {
        self.conditions.push(Condition::Intersects {
            field,
            shape: shape.into(),
        });
        self
    }

    pub fn within_sphere(mut self, field: &'static str, center: Point, radius_meters: f64) -> Self {
        self.conditions.push(Condition::WithinSphere {
            field,
            center,
            radius_meters,
        });
        self
    }

    pub fn equals(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::Equals {
            field,
            value: value.into(),
        });
        self
    }

    pub fn not_equals(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::NotEquals {
            field,
            value: value.into(),
        });
        self
    }

    /// Restrict to documents whose soft-delete timestamp is unset
    pub fn not_deleted(mut self) -> Self {
        self.conditions.push(Condition::Missing {
            field: fields::DELETED_AT,
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// First spatial intersection condition, used to narrow candidates
    pub fn spatial_filter(&self) -> Option<(&'static str, &Shape)> {
        self.conditions.iter().find_map(|c| match c {
            Condition::Intersects { field, shape } => Some((*field, shape)),
            _ => None,
        })
    }

    pub fn matches<T: Document>(&self, doc: &T) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }
}
