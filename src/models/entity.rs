//! Typed entities rebuilt from the flat attribute maps the backend returns
//!
//! Dispatch is a closed sum type: each type tag maps to exactly one variant,
//! and the variant is deserialized straight from the attribute map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;

/// Known document kinds, keyed by the backend's type tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Product,
    Category,
    Manufacturer,
    Brand,
    Tag,
}

impl EntityKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "product" => Some(EntityKind::Product),
            "category" => Some(EntityKind::Category),
            "manufacturer" => Some(EntityKind::Manufacturer),
            "brand" => Some(EntityKind::Brand),
            "tag" => Some(EntityKind::Tag),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Category => "category",
            EntityKind::Manufacturer => "manufacturer",
            EntityKind::Brand => "brand",
            EntityKind::Tag => "tag",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ean: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduced_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u64>,
    /// Every attribute without a dedicated field
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// One typed entity of any known kind
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    Product(Product),
    Category(Category),
    Manufacturer(Manufacturer),
    Brand(Brand),
    Tag(Tag),
}

impl Entity {
    /// Build the entity of `kind` from its flat attribute map
    pub fn from_source(kind: EntityKind, source: Map<String, Value>) -> Result<Self> {
        let source = Value::Object(source);
        let entity = match kind {
            EntityKind::Product => Entity::Product(serde_json::from_value(source)?),
            EntityKind::Category => Entity::Category(serde_json::from_value(source)?),
            EntityKind::Manufacturer => Entity::Manufacturer(serde_json::from_value(source)?),
            EntityKind::Brand => Entity::Brand(serde_json::from_value(source)?),
            EntityKind::Tag => Entity::Tag(serde_json::from_value(source)?),
        };
        Ok(entity)
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Product(_) => EntityKind::Product,
            Entity::Category(_) => EntityKind::Category,
            Entity::Manufacturer(_) => EntityKind::Manufacturer,
            Entity::Brand(_) => EntityKind::Brand,
            Entity::Tag(_) => EntityKind::Tag,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Entity::Product(p) => &p.id,
            Entity::Category(c) => &c.id,
            Entity::Manufacturer(m) => &m.id,
            Entity::Brand(b) => &b.id,
            Entity::Tag(t) => &t.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attributes(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_kind_tags() {
        for kind in [
            EntityKind::Product,
            EntityKind::Category,
            EntityKind::Manufacturer,
            EntityKind::Brand,
            EntityKind::Tag,
        ] {
            assert_eq!(EntityKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(EntityKind::from_tag("warehouse"), None);
    }

    #[test]
    fn test_product_from_source_keeps_extra_attributes() {
        let source = attributes(json!({
            "id": "p1",
            "name": "Phone",
            "real_price": 199,
            "stock": 3,
            "color": "black"
        }));

        let entity = Entity::from_source(EntityKind::Product, source).unwrap();
        assert_eq!(entity.kind(), EntityKind::Product);
        assert_eq!(entity.id(), "p1");

        match entity {
            Entity::Product(product) => {
                assert_eq!(product.real_price, Some(199.0));
                assert_eq!(product.stock, Some(3));
                assert_eq!(product.attributes["color"], "black");
            }
            other => panic!("unexpected entity {:?}", other),
        }
    }

    #[test]
    fn test_from_source_rejects_bad_types() {
        let source = attributes(json!({ "id": "c1", "level": "deep" }));
        assert!(Entity::from_source(EntityKind::Category, source).is_err());
    }
}
