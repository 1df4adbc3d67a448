//! `statement-dump`: prepares every template for the entities described in
//! `ENTITY_SCHEMA_PATH` and prints the resulting CQL.
//!
//! Pass `--samples` to use the built-in sample entities instead of a file.

use cql_entity_mapper::app::bootstrap::{generator_from_env, prepare_registry};
use cql_entity_mapper::domain::model::{tweet_line_entity, user_entity, EntityRegistry};
use cql_entity_mapper::domain::statement::CounterOperation;
use cql_entity_mapper::infra::config;
use cql_entity_mapper::LocalPreparer;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: statement-dump [--samples]\n\
         \n\
         Reads env vars:\n\
           ENTITY_SCHEMA_PATH (required unless --samples)\n\
           COUNTER_TABLE      (default: entity_counters)\n\
           PREPARE_KEYSPACE   (optional)\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cql_entity_mapper=info,warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let registry = if args.iter().any(|a| a == "--samples") {
        let mut reg = EntityRegistry::new();
        reg.register(user_entity()?);
        reg.register(tweet_line_entity()?);
        reg
    } else {
        let path = config::entity_schema_path()?;
        info!(path = %path.display(), "loading entity descriptors");
        EntityRegistry::load_from_file(&path)?
    };

    let generator = generator_from_env()?;
    let preparer = LocalPreparer::new();
    let catalog = prepare_registry(&generator, &preparer, &registry).await?;

    println!("-- shared counters ({})", generator.counter_table());
    for op in CounterOperation::ALL {
        println!("{:<8} {}", op, catalog.simple_counters.get(op).query);
    }

    for (name, statements) in &catalog.entities {
        println!();
        println!("-- {}", name);
        println!("insert   {}", statements.insert.query);
        println!("select   {}", statements.select_entity.query);
        for (field, template) in &statements.select_fields {
            println!("field    [{}] {}", field, template.query);
        }
        for (table, template) in &statements.delete {
            println!("delete   [{}] {}", table, template.query);
        }
        if let Some(counters) = &statements.clustered_counters {
            for op in CounterOperation::ALL {
                for (target, template) in counters.for_operation(op) {
                    println!("{:<8} [{}] {}", op, target, template.query);
                }
            }
        }
    }

    info!(round_trips = preparer.round_trips(), "done");
    Ok(())
}
