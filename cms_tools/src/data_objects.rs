//! Wire shapes for the CMS resource API, and their normalisation rules.
//!
//! The upstream schema is not stable: records sometimes carry a `documentId`, sometimes only a numeric `id`;
//! relations arrive as a bare id, a populated object, or a `data`-wrapped object. Every ambiguity is resolved
//! here, at the boundary. An unrecognised shape is an explicit [`CmsApiError::ShapeError`], never a value that
//! leaks deeper into the system.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CmsApiError;

//--------------------------------------      Envelopes        -------------------------------------------------------
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<Document<T>>,
}

#[derive(Debug, Deserialize)]
pub struct ItemResponse<T> {
    pub data: Document<T>,
}

/// A CMS record together with its identifiers. Mutations must use [`Document::internal_id`], which prefers the
/// `documentId` and falls back to the numeric row id; the two are not interchangeable with any business key.
#[derive(Debug, Deserialize)]
pub struct Document<T> {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    #[serde(flatten)]
    pub record: T,
}

impl<T> Document<T> {
    pub fn internal_id(&self) -> Result<String, CmsApiError> {
        self.document_id
            .clone()
            .or_else(|| self.id.map(|id| id.to_string()))
            .ok_or_else(|| CmsApiError::ShapeError("record has neither a documentId nor an id".to_string()))
    }
}

//--------------------------------------       Relation        -------------------------------------------------------
/// A relation field in any of the three shapes the CMS emits: a bare id, a populated object, or a
/// `data`-wrapped object (possibly null).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Relation {
    Id(i64),
    Object { id: i64 },
    Wrapped { data: Option<RelationData> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationData {
    pub id: i64,
}

impl Relation {
    pub fn id(&self) -> Option<i64> {
        match self {
            Relation::Id(id) => Some(*id),
            Relation::Object { id } => Some(*id),
            Relation::Wrapped { data } => data.as_ref().map(|d| d.id),
        }
    }
}

//--------------------------------------     Order records     -------------------------------------------------------
#[derive(Debug, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default = "Vec::new")]
    pub items: Vec<ItemRecord>,
    #[serde(default)]
    pub users_permissions_user: Option<Relation>,
    #[serde(default)]
    pub gateway_transaction_id: Option<String>,
    #[serde(default)]
    pub payment_data: Option<Value>,
}

/// One order line as stored on the order record. `id` is the product's documentId captured at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    pub quantity: i64,
    #[serde(default)]
    pub category: Option<String>,
}

/// Payload for creating a pending order.
#[derive(Debug, Serialize)]
pub struct NewOrderRecord {
    pub order_id: String,
    pub order_status: String,
    pub total_amount: f64,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    pub items: Vec<ItemRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_permissions_user: Option<i64>,
    pub gateway_transaction_id: Option<String>,
    pub payment_data: Value,
}

/// Partial field set written back on reconciliation.
#[derive(Debug, Serialize)]
pub struct OrderUpdateRecord {
    pub order_status: String,
    pub gateway_transaction_id: Option<String>,
    pub payment_data: Value,
}

//--------------------------------------    Product records    -------------------------------------------------------
#[derive(Debug, Deserialize)]
pub struct ProductRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stock: i64,
}

//--------------------------------------      Cart records     -------------------------------------------------------
#[derive(Debug, Deserialize)]
pub struct CartRecord {
    #[serde(default)]
    pub quantity: i64,
}

//--------------------------------------      User records     -------------------------------------------------------
/// The users endpoint is the one resource that is flat rather than `data`-wrapped.
#[derive(Debug, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(default)]
    pub email: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn document_id_prefers_document_id_over_numeric_id() {
        let doc: Document<ProductRecord> =
            serde_json::from_value(serde_json::json!({"id": 12, "documentId": "abc123", "name": "Rice", "stock": 3}))
                .unwrap();
        assert_eq!(doc.internal_id().unwrap(), "abc123");
        let doc: Document<ProductRecord> =
            serde_json::from_value(serde_json::json!({"id": 12, "name": "Rice", "stock": 3})).unwrap();
        assert_eq!(doc.internal_id().unwrap(), "12");
    }

    #[test]
    fn document_without_any_id_is_a_shape_error() {
        let doc: Document<ProductRecord> = serde_json::from_value(serde_json::json!({"name": "Rice"})).unwrap();
        assert!(doc.internal_id().is_err());
    }

    #[test]
    fn relation_normalises_all_three_shapes() {
        let r: Relation = serde_json::from_value(serde_json::json!(5)).unwrap();
        assert_eq!(r.id(), Some(5));
        let r: Relation = serde_json::from_value(serde_json::json!({"id": 5, "username": "ayu"})).unwrap();
        assert_eq!(r.id(), Some(5));
        let r: Relation = serde_json::from_value(serde_json::json!({"data": {"id": 5}})).unwrap();
        assert_eq!(r.id(), Some(5));
        let r: Relation = serde_json::from_value(serde_json::json!({"data": null})).unwrap();
        assert_eq!(r.id(), None);
    }

    #[test]
    fn order_record_tolerates_sparse_responses() {
        let doc: Document<OrderRecord> = serde_json::from_value(serde_json::json!({
            "documentId": "ord-1",
            "order_id": "ORDER-1",
            "order_status": "pending",
        }))
        .unwrap();
        assert_eq!(doc.record.order_id, "ORDER-1");
        assert!(doc.record.items.is_empty());
        assert!(doc.record.users_permissions_user.is_none());
    }
}
