//! The file-backed store must behave like the in-memory store, before and
//! after a reopen.

use codepage_meta::{EntityId, FileMetaStore, InMemoryMetaStore, MetaStore};
use proptest::prelude::*;
use tempfile::tempdir;

#[derive(Debug, Clone)]
enum Op {
    Set(u64, String, String),
    Delete(u64, String),
    Purge(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let entity = 1u64..4;
    let key = prop::sample::select(vec!["_html_code", "_css_code", "_js_code", "_title"])
        .prop_map(str::to_string);
    let value = any::<String>();

    prop_oneof![
        4 => (entity.clone(), key.clone(), value).prop_map(|(e, k, v)| Op::Set(e, k, v)),
        1 => (entity.clone(), key).prop_map(|(e, k)| Op::Delete(e, k)),
        1 => entity.prop_map(Op::Purge),
    ]
}

fn apply(store: &dyn MetaStore, op: &Op) {
    match op {
        Op::Set(e, k, v) => store.set(EntityId::new(*e), k, v).unwrap(),
        Op::Delete(e, k) => {
            store.delete(EntityId::new(*e), k).unwrap();
        }
        Op::Purge(e) => {
            store.purge(EntityId::new(*e)).unwrap();
        }
    }
}

fn snapshot(store: &dyn MetaStore) -> Vec<(EntityId, String, Option<String>)> {
    let mut rows = Vec::new();
    for entity in store.entities().unwrap() {
        for key in store.keys(entity).unwrap() {
            let value = store.get(entity, &key).unwrap();
            rows.push((entity, key, value));
        }
    }
    rows
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn file_store_matches_memory_store(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meta.jsonl");
        let memory = InMemoryMetaStore::new();

        {
            let file = FileMetaStore::open(&path).unwrap();
            for op in &ops {
                apply(&memory, op);
                apply(&file, op);
            }
            prop_assert_eq!(snapshot(&memory), snapshot(&file));
            file.flush().unwrap();
        }

        let reopened = FileMetaStore::open(&path).unwrap();
        prop_assert_eq!(snapshot(&memory), snapshot(&reopened));
    }
}
