//! Ordering shared by every backend so `list` sorts identically everywhere.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use super::r#trait::{Document, Fields, OrderBy};

/// Stable sort of `docs` by `order`. Documents missing the field sort last.
pub fn sort_documents(docs: &mut [Document], order: &OrderBy) {
    docs.sort_by(|a, b| {
        let (va, vb) = (a.fields.get(&order.field), b.fields.get(&order.field));
        match (va, vb) {
            (Some(va), Some(vb)) => {
                let ord = compare_values(va, vb);
                if order.descending { ord.reverse() } else { ord }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

/// Compare field values in a fixed total order: numbers (numerically),
/// then RFC 3339 timestamps (chronologically), then other strings
/// (lexically), then anything else by its JSON text.
fn compare_values(a: &JsonValue, b: &JsonValue) -> Ordering {
    match (SortKey::of(a), SortKey::of(b)) {
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(&y),
        (SortKey::Timestamp(x), SortKey::Timestamp(y)) => x.cmp(&y),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        (SortKey::Other(x), SortKey::Other(y)) => x.cmp(&y),
        (x, y) => x.rank().cmp(&y.rank()),
    }
}

enum SortKey<'a> {
    Number(f64),
    Timestamp(DateTime<Utc>),
    Text(&'a str),
    Other(String),
}

impl<'a> SortKey<'a> {
    fn of(value: &'a JsonValue) -> Self {
        match value {
            JsonValue::Number(n) => SortKey::Number(n.as_f64().unwrap_or(0.0)),
            JsonValue::String(s) => match parse_ts(s) {
                Some(ts) => SortKey::Timestamp(ts),
                None => SortKey::Text(s),
            },
            other => SortKey::Other(other.to_string()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Timestamp(_) => 1,
            SortKey::Text(_) => 2,
            SortKey::Other(_) => 3,
        }
    }
}

fn parse_ts(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Shallow merge, like a document-database field update.
pub fn merge_fields(target: &mut Fields, updates: Fields) {
    for (k, v) in updates {
        target.insert(k, v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use uuid::Uuid;

    fn doc(fields: JsonValue) -> Document {
        match fields {
            JsonValue::Object(fields) => Document { id: Uuid::now_v7(), fields },
            _ => unreachable!(),
        }
    }

    #[test]
    fn timestamps_sort_chronologically_despite_fraction_digits() {
        let mut docs = vec![
            doc(json!({ "timestamp": "2025-03-14T09:05:07Z", "n": 1 })),
            doc(json!({ "timestamp": "2025-03-14T09:05:07.500Z", "n": 2 })),
            doc(json!({ "timestamp": "2025-03-13T23:00:00Z", "n": 3 })),
        ];

        sort_documents(&mut docs, &OrderBy::desc("timestamp"));

        let order: Vec<_> = docs.iter().map(|d| d.fields["n"].as_i64().unwrap()).collect();
        assert_eq!(order, [2, 1, 3]);
    }

    #[test]
    fn numbers_sort_numerically_and_missing_fields_go_last() {
        let mut docs = vec![
            doc(json!({ "stock": 10 })),
            doc(json!({})),
            doc(json!({ "stock": 9.5 })),
        ];

        sort_documents(&mut docs, &OrderBy::asc("stock"));

        assert_eq!(docs[0].fields["stock"], 9.5);
        assert_eq!(docs[1].fields["stock"], 10);
        assert!(docs[2].fields.get("stock").is_none());
    }

    #[test]
    fn mixed_values_sort_into_fixed_groups() {
        let mut docs = vec![
            doc(json!({ "at": "not a date" })),
            doc(json!({ "at": "2025-03-14T09:00:00Z" })),
            doc(json!({ "at": true })),
            doc(json!({ "at": 7 })),
            doc(json!({ "at": "2025-03-13T09:00:00+02:00" })),
            doc(json!({ "at": "2025" })),
            doc(json!({ "at": 1.5 })),
            doc(json!({ "at": null })),
        ];

        sort_documents(&mut docs, &OrderBy::asc("at"));

        let order: Vec<_> = docs.iter().map(|d| d.fields["at"].clone()).collect();
        assert_eq!(
            order,
            [
                json!(1.5),
                json!(7),
                json!("2025-03-13T09:00:00+02:00"),
                json!("2025-03-14T09:00:00Z"),
                json!("2025"),
                json!("not a date"),
                json!(null),
                json!(true),
            ]
        );
    }

    proptest! {
        #[test]
        fn comparison_is_a_total_order(values in prop::collection::vec(value_strategy(), 3)) {
            let (a, b, c) = (&values[0], &values[1], &values[2]);
            prop_assert_eq!(compare_values(a, b), compare_values(b, a).reverse());
            let ascending =
                |x: &JsonValue, y: &JsonValue| compare_values(x, y) != Ordering::Greater;
            if ascending(a, b) && ascending(b, c) {
                prop_assert!(ascending(a, c));
            }
        }
    }

    fn value_strategy() -> impl Strategy<Value = JsonValue> {
        prop_oneof![
            (-1000i64..1000).prop_map(JsonValue::from),
            (0u32..48).prop_map(|h| {
                JsonValue::from(format!("2025-03-{:02}T{:02}:00:00Z", 10 + h / 24, h % 24))
            }),
            "[a-z0-9:-]{0,6}".prop_map(JsonValue::from),
            any::<bool>().prop_map(JsonValue::from),
            Just(JsonValue::Null),
        ]
    }

    #[test]
    fn merge_overwrites_and_keeps_untouched_fields() {
        let mut target = json!({ "name": "Coffee", "stock": 10 }).as_object().cloned().unwrap();
        merge_fields(&mut target, json!({ "stock": 4 }).as_object().cloned().unwrap());

        assert_eq!(target["name"], "Coffee");
        assert_eq!(target["stock"], 4);
    }
}
