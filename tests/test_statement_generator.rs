//! Statement generation for simple-id and compound-id entities.

use async_trait::async_trait;
use cql_entity_mapper::domain::model::{tweet_line_entity, user_entity};
use cql_entity_mapper::{
    EntityMeta, GeneratorError, LocalPreparer, PropertyMeta, StatementGenerator, StatementPreparer,
};
use std::sync::Arc;

const TWEET_WHERE: &str =
    "WHERE user_id = :user_id AND tweet_date = :tweet_date AND tweet_id = :tweet_id";

#[derive(Debug, thiserror::Error)]
#[error("store unavailable while preparing: {0}")]
struct StoreDown(String);

struct FailingPreparer;

#[async_trait]
impl StatementPreparer for FailingPreparer {
    type Prepared = ();
    type Error = StoreDown;

    async fn prepare(&self, query: &str) -> Result<(), StoreDown> {
        Err(StoreDown(query.to_string()))
    }
}

fn property<'a>(entity: &'a EntityMeta, name: &str) -> &'a PropertyMeta {
    entity.property(name).unwrap()
}

#[tokio::test]
async fn insert_covers_id_and_regular_properties_with_ttl() -> anyhow::Result<()> {
    let preparer = LocalPreparer::new();
    let generator = StatementGenerator::new();

    let users = user_entity()?;
    let insert = generator.prepare_insert(&preparer, &users).await?;
    assert_eq!(
        insert.query,
        "INSERT INTO users (id, email, display_name, age) VALUES (:id, :email, :display_name, :age) USING TTL :ttl"
    );
    assert_eq!(insert.named_markers(), ["id", "email", "display_name", "age", "ttl"]);
    assert_eq!(insert.marker_count("login_count"), 0);
    assert_eq!(insert.marker_count("tags"), 0);

    let tweets = tweet_line_entity()?;
    let insert = generator.prepare_insert(&preparer, &tweets).await?;
    assert_eq!(
        insert.named_markers(),
        ["user_id", "tweet_date", "tweet_id", "content", "status", "ttl"]
    );
    assert_eq!(insert.marker_count("likes"), 0);
    assert_eq!(insert.marker_count("ttl"), 1);

    assert_eq!(preparer.round_trips(), 2);
    Ok(())
}

#[tokio::test]
async fn simple_id_predicate_is_a_single_equality() -> anyhow::Result<()> {
    let preparer = LocalPreparer::new();
    let generator = StatementGenerator::new();
    let users = user_entity()?;

    let select = generator.prepare_select_entity(&preparer, &users).await?;
    assert_eq!(
        select.query,
        "SELECT id, email, display_name, age FROM users WHERE id = :id"
    );

    let delete = generator.prepare_delete(&preparer, &users).await?;
    assert_eq!(delete.len(), 1);
    assert_eq!(delete["users"].query, "DELETE FROM users WHERE id = :id");
    assert_eq!(delete["users"].named_markers(), ["id"]);
    Ok(())
}

#[tokio::test]
async fn compound_id_predicate_keeps_declared_component_order() -> anyhow::Result<()> {
    let preparer = LocalPreparer::new();
    let generator = StatementGenerator::new();
    let tweets = tweet_line_entity()?;

    let select = generator.prepare_select_entity(&preparer, &tweets).await?;
    assert_eq!(
        select.query,
        format!(
            "SELECT user_id, tweet_date, tweet_id, content, status FROM tweet_line {}",
            TWEET_WHERE
        )
    );

    let field = generator
        .prepare_select_field(&preparer, &tweets, property(&tweets, "content"))
        .await?;
    assert_eq!(field.query, format!("SELECT content FROM tweet_line {}", TWEET_WHERE));

    let delete = generator.prepare_delete(&preparer, &tweets).await?;
    assert_eq!(delete["tweet_line"].query, format!("DELETE FROM tweet_line {}", TWEET_WHERE));
    Ok(())
}

#[tokio::test]
async fn selecting_a_compound_id_selects_each_component() -> anyhow::Result<()> {
    let preparer = LocalPreparer::new();
    let tweets = tweet_line_entity()?;

    let field = StatementGenerator::new()
        .prepare_select_field(&preparer, &tweets, tweets.id_meta())
        .await?;
    assert_eq!(
        field.query,
        format!("SELECT user_id, tweet_date, tweet_id FROM tweet_line {}", TWEET_WHERE)
    );
    Ok(())
}

#[tokio::test]
async fn select_field_on_counter_is_rejected_without_a_round_trip() -> anyhow::Result<()> {
    let preparer = LocalPreparer::new();
    let generator = StatementGenerator::new();
    let users = user_entity()?;

    let err = generator
        .prepare_select_field(&preparer, &users, property(&users, "login_count"))
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(err.to_string().contains("counter"));

    let err = generator
        .prepare_select_field(&preparer, &users, property(&users, "tags"))
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());

    let stranger = PropertyMeta::simple("nickname");
    let err = generator
        .prepare_select_field(&preparer, &users, &stranger)
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());

    assert_eq!(preparer.round_trips(), 0);
    Ok(())
}

#[tokio::test]
async fn update_assigns_exactly_the_given_properties_in_order() -> anyhow::Result<()> {
    let preparer = LocalPreparer::new();
    let generator = StatementGenerator::new();

    let users = user_entity()?;
    let update = generator
        .prepare_update_fields(
            &preparer,
            &users,
            &[property(&users, "age"), property(&users, "email")],
        )
        .await?;
    assert_eq!(
        update.query,
        "UPDATE users USING TTL :ttl SET age = :age, email = :email WHERE id = :id"
    );
    assert_eq!(update.named_markers(), ["ttl", "age", "email", "id"]);

    let tweets = tweet_line_entity()?;
    let update = generator
        .prepare_update_fields(&preparer, &tweets, &[property(&tweets, "status")])
        .await?;
    assert_eq!(
        update.query,
        format!("UPDATE tweet_line USING TTL :ttl SET status = :status {}", TWEET_WHERE)
    );
    Ok(())
}

#[tokio::test]
async fn update_rejects_counters_ids_and_empty_lists() -> anyhow::Result<()> {
    let preparer = LocalPreparer::new();
    let generator = StatementGenerator::new();
    let tweets = tweet_line_entity()?;

    let err = generator
        .prepare_update_fields(&preparer, &tweets, &[property(&tweets, "likes")])
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());

    let err = generator
        .prepare_update_fields(&preparer, &tweets, &[tweets.id_meta()])
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());

    let err = generator
        .prepare_update_fields(&preparer, &tweets, &[])
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());

    assert_eq!(preparer.round_trips(), 0);
    Ok(())
}

#[tokio::test]
async fn keyspace_qualifies_every_table() -> anyhow::Result<()> {
    let preparer = LocalPreparer::new();
    let generator = StatementGenerator::new().with_keyspace("social")?;
    let users = user_entity()?;

    let delete = generator.prepare_delete(&preparer, &users).await?;
    // map key stays the bare table name
    assert_eq!(delete["users"].query, "DELETE FROM social.users WHERE id = :id");

    let counters = generator.prepare_simple_counter_operations(&preparer).await?;
    assert!(counters.select.query.contains("FROM social.entity_counters"));
    Ok(())
}

#[tokio::test]
async fn store_failures_are_returned_verbatim() -> anyhow::Result<()> {
    let users = user_entity()?;
    let err = StatementGenerator::new()
        .prepare_insert(&FailingPreparer, &users)
        .await
        .unwrap_err();

    match err {
        GeneratorError::Store(StoreDown(query)) => assert!(query.starts_with("INSERT INTO users")),
        other => panic!("expected store error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn prepare_entity_uses_one_round_trip_per_template() -> anyhow::Result<()> {
    let preparer = LocalPreparer::new();
    let generator = StatementGenerator::new();

    let users = user_entity()?;
    let statements = generator.prepare_entity(&preparer, &users).await?;
    assert_eq!(
        statements.select_fields.keys().collect::<Vec<_>>(),
        ["age", "display_name", "email"]
    );
    assert!(statements.clustered_counters.is_none());
    // insert + select + 3 fields + delete
    assert_eq!(preparer.round_trips(), 6);

    let tweets = tweet_line_entity()?;
    let statements = generator.prepare_entity(&preparer, &tweets).await?;
    assert!(statements.clustered_counters.is_some());
    // insert + select + 2 fields + delete + 2 counters x 3 + select-all + delete-all
    assert_eq!(preparer.round_trips(), 6 + 13);
    assert_eq!(preparer.prepared_queries().len(), 19);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn entities_can_be_prepared_concurrently() -> anyhow::Result<()> {
    let preparer = Arc::new(LocalPreparer::new());
    let generator = Arc::new(StatementGenerator::new());
    let entities = vec![Arc::new(user_entity()?), Arc::new(tweet_line_entity()?)];

    let mut handles = Vec::new();
    for entity in entities {
        let preparer = preparer.clone();
        let generator = generator.clone();
        handles.push(tokio::spawn(async move {
            generator.prepare_entity(preparer.as_ref(), &entity).await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    assert_eq!(preparer.round_trips(), 19);
    Ok(())
}
