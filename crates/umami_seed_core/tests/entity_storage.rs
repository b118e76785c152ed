use umami_seed_core::db::open_db_in_memory;
use umami_seed_core::model::node::{Node, NodeBundle};
use umami_seed_core::model::term::Term;
use umami_seed_core::model::user::{User, ROLE_AUTHOR};
use umami_seed_core::{
    AliasResolver, Entity, EntityPayload, EntityQuery, EntityStorage, EntityType, RepoError,
    SqliteEntityStorage, SqlitePathAliasRepository, SqliteStateStore, StateStore,
};
use uuid::Uuid;

#[test]
fn save_assigns_id_and_load_round_trips_payload() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteEntityStorage::new(&conn);

    let mut node = Node::new(NodeBundle::Article, "Hello");
    node.tags = vec![4, 9];
    node.moderation_state = "draft".to_string();
    let mut entity = Entity::new(node.clone());
    let id = storage.save(&mut entity).unwrap();
    assert_eq!(entity.id, Some(id));

    let loaded = storage.load(EntityType::Node, id).unwrap().unwrap();
    assert_eq!(loaded.uuid, entity.uuid);
    assert_eq!(loaded.payload, EntityPayload::Node(node));
    assert!(storage.load(EntityType::User, id).unwrap().is_none());
}

#[test]
fn alias_is_written_with_entity_and_resolved_by_path() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteEntityStorage::new(&conn);
    let aliases = SqlitePathAliasRepository::new(&conn);

    let mut node = Node::new(NodeBundle::Page, "About");
    node.set_slug("about-us");
    let mut entity = Entity::new(node);
    let id = storage.save(&mut entity).unwrap();

    let path = format!("/node/{id}");
    assert_eq!(aliases.alias_by_path(&path).unwrap(), "/about-us");
    assert_eq!(aliases.alias_by_path("/node/999").unwrap(), "/node/999");
}

#[test]
fn update_replaces_alias_and_delete_removes_it() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteEntityStorage::new(&conn);
    let aliases = SqlitePathAliasRepository::new(&conn);

    let mut entity = Entity::new(Term::new("Cake", "tags"));
    let id = storage.save(&mut entity).unwrap();
    let path = format!("/taxonomy/term/{id}");
    assert_eq!(aliases.alias_by_path(&path).unwrap(), "/tags/cake");

    if let EntityPayload::TaxonomyTerm(term) = &mut entity.payload {
        term.path_alias = Some("/tags/cakes".to_string());
    }
    assert_eq!(storage.save(&mut entity).unwrap(), id);
    assert_eq!(aliases.alias_by_path(&path).unwrap(), "/tags/cakes");

    let deleted = storage.delete(EntityType::TaxonomyTerm, &[entity]).unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(aliases.alias_by_path(&path).unwrap(), path);
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM path_alias;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn load_by_properties_combines_filters() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteEntityStorage::new(&conn);

    let mut tag = Entity::new(Term::new("Cake", "tags"));
    let mut recipe_category = Entity::new(Term::new("Cake", "recipe_category"));
    let mut other = Entity::new(Term::new("Bread", "tags"));
    for entity in [&mut tag, &mut recipe_category, &mut other] {
        storage.save(entity).unwrap();
    }

    let by_name = storage
        .load_by_properties(EntityType::TaxonomyTerm, &EntityQuery::by_label("Cake"))
        .unwrap();
    assert_eq!(by_name.len(), 2);

    let in_tags = storage
        .load_by_properties(
            EntityType::TaxonomyTerm,
            &EntityQuery::by_label("Cake").in_bundle("tags"),
        )
        .unwrap();
    assert_eq!(in_tags.len(), 1);
    assert_eq!(in_tags[0].uuid, tag.uuid);

    let by_uuid = storage
        .load_by_properties(
            EntityType::TaxonomyTerm,
            &EntityQuery::by_uuids([other.uuid, recipe_category.uuid]),
        )
        .unwrap();
    let ids: Vec<_> = by_uuid.iter().map(|entity| entity.id).collect();
    assert_eq!(ids, vec![recipe_category.id, other.id]);

    let none = storage
        .load_by_properties(EntityType::TaxonomyTerm, &EntityQuery::by_uuids(Vec::<Uuid>::new()))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn user_names_are_unique() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteEntityStorage::new(&conn);

    let mut first = Entity::new(User::new("Lucy Pham", ROLE_AUTHOR));
    storage.save(&mut first).unwrap();
    let mut duplicate = Entity::new(User::new("Lucy Pham", ROLE_AUTHOR));
    let err = storage.save(&mut duplicate).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert_eq!(duplicate.id, None);
}

#[test]
fn delete_rejects_entities_of_another_type() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteEntityStorage::new(&conn);
    let mut node = Entity::new(Node::new(NodeBundle::Page, "Keep me"));
    storage.save(&mut node).unwrap();

    let err = storage.delete(EntityType::User, &[node.clone()]).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    assert!(storage.load(EntityType::Node, node.id.unwrap()).unwrap().is_some());
}

#[test]
fn state_store_sets_replaces_and_deletes() {
    let conn = open_db_in_memory().unwrap();
    let state = SqliteStateStore::new(&conn);

    assert_eq!(state.get("k").unwrap(), None);
    state.set("k", "one").unwrap();
    state.set("k", "two").unwrap();
    assert_eq!(state.get("k").unwrap().as_deref(), Some("two"));
    state.delete("k").unwrap();
    assert_eq!(state.get("k").unwrap(), None);
}

#[test]
fn undecodable_payload_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO entities (uuid, entity_type, bundle, label, data)
         VALUES ('7d1c1f1e-0b7a-4c59-9a34-1a2b3c4d5e6f', 'node', 'page', 'Broken', '{}');",
        [],
    )
    .unwrap();
    let storage = SqliteEntityStorage::new(&conn);

    let err = storage
        .load_by_properties(EntityType::Node, &EntityQuery::by_label("Broken"))
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
