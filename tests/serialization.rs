mod common;

use common::User;
use entity_gateway::{Entity, EntityError, Record, Row};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

fn record() -> Record {
    Record::declare(|s| {
        s.property("raw");
        s.property("text").string();
        s.property("count").int();
        s.property("doc").json();
        s.property("status").string().default("draft");
    })
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        ".{0,12}".prop_map(Value::from),
    ]
}

fn document() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z]{1,6}", scalar(), 0..4)
        .prop_map(|m| Value::Object(m.into_iter().collect()))
}

fn input() -> impl Strategy<Value = Row> {
    (
        prop::option::of(scalar()),
        prop::option::of(".{0,16}"),
        prop::option::of(any::<i64>()),
        prop::option::of(document()),
        prop::option::of("[a-z]{1,8}"),
    )
        .prop_map(|(raw, text, count, doc, status)| {
            let mut m = Row::new();
            if let Some(v) = raw {
                m.insert("raw".into(), v);
            }
            if let Some(v) = text {
                m.insert("text".into(), Value::from(v));
            }
            if let Some(v) = count {
                m.insert("count".into(), Value::from(v));
            }
            if let Some(v) = doc {
                m.insert("doc".into(), v);
            }
            if let Some(v) = status {
                m.insert("status".into(), Value::from(v));
            }
            m
        })
}

proptest! {
    #[test]
    fn from_map_then_to_map_keeps_every_key(m in input()) {
        let mut r = record();
        r.from_map(&m);
        let out = r.to_map();
        for (k, v) in &m {
            prop_assert_eq!(&out[k.as_str()], v);
        }
        if !m.contains_key("status") {
            prop_assert_eq!(&out["status"], &json!("draft"));
        }
        prop_assert_eq!(out.len(), 5);
    }

    #[test]
    fn json_text_round_trips(m in input()) {
        let mut r = record();
        r.from_map(&m);
        let text = r.to_json();
        let mut again = record();
        again.from_value(&serde_json::from_str(&text).unwrap()).unwrap();
        prop_assert_eq!(again.to_map(), r.to_map());
    }
}

#[test]
fn export_follows_declaration_order() {
    let r = record();
    let keys: Vec<_> = r.to_map().keys().cloned().collect();
    assert_eq!(keys, vec!["raw", "text", "count", "doc", "status"]);
}

#[test]
fn json_property_reads_back_structurally() {
    let mut user = User::default();
    let meta = json!({"roles": ["admin", "ops"], "level": 3});
    user.record_mut().assign("meta", meta.clone()).unwrap();
    assert_eq!(user.to_map()["meta"], meta);

    user.record_mut().assign("meta", meta.to_string()).unwrap();
    assert_eq!(user.to_map()["meta"], meta);
}

#[test]
fn undecodable_json_text_exports_as_null() {
    let mut user = User::default();
    user.record_mut().assign("meta", "{not json").unwrap();
    assert_eq!(user.to_map()["meta"], Value::Null);
}

#[test]
fn clear_resets_identity_too() {
    let mut user = User::default();
    user.from_map(&common::row(json!({"id": 3, "email": "x@y", "name": "X"})));
    user.clear();
    assert_eq!(
        user.to_value(),
        json!({"id": null, "email": null, "name": "anonymous", "meta": null, "created_at": null})
    );
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct UserDto {
    id: Option<i64>,
    email: Option<String>,
    name: String,
}

#[test]
fn serde_types_in_and_out() {
    let mut user = User::default();
    user.record_mut()
        .from_object(&UserDto {
            id: Some(1),
            email: Some("a@b".into()),
            name: "A".into(),
        })
        .unwrap();
    let dto: UserDto = user.record().to_object().unwrap();
    assert_eq!(dto.id, Some(1));
    assert_eq!(dto.name, "A");

    assert!(matches!(user.from_value(&json!([1, 2])), Err(EntityError::InvalidSchema(_))));
}
