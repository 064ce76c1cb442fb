use microblog::config::Config;
use microblog::datastore::postgres::{self, PostgresStore};
use microblog::{feed, metrics, seed};
use std::time::Duration;
use tracing::{error, info, Level};

#[allow(clippy::cognitive_complexity)]
fn main() {
    let args: Vec<_> = std::env::args().collect();
    let config_file_path = match &args[..] {
        [_, path, ..] => path,
        _ => {
            eprintln!("First argument should be path to config file");
            std::process::exit(2);
        }
    };

    let config = match Config::from_file(config_file_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("couldn't load config from {}: {:#}", config_file_path, e);
            std::process::exit(2);
        }
    };

    // Set up logger output
    let subscriber_builder = tracing_subscriber::fmt().with_max_level(Level::DEBUG);
    if config.human_logs {
        subscriber_builder.init();
    } else {
        subscriber_builder.json().init();
    }

    info!("starting microblog seeder");

    // Build the postgres client
    let db = PostgresStore::new(
        postgres::Dsn::new(&config),
        config.db_pool_size,
        Duration::from_secs(config.db_connection_timeout),
    )
    .expect("couldn't connect to Postgres");
    prometheus::register(Box::new(db.clone())).expect("couldn't register DB metrics");

    let mut sys = actix_rt::System::new("microblog");
    let (db, seed_config) = (db.clone(), config.seed.clone());
    let outcome = sys.block_on(async move {
        let seeded = seed::run(&db, &seed_config).await?;
        let first_page = feed::feed(&db, &seeded.admin, 0, 5).await?;
        Ok::<_, microblog::twoface::TfError>((seeded, first_page))
    });

    match outcome {
        Ok((seeded, first_page)) => {
            info!(
                users = seeded.users.len(),
                microposts = seeded.microposts,
                relationships = seeded.relationships,
                "seeding finished"
            );
            match serde_json::to_string_pretty(&first_page) {
                Ok(json) => println!("{}", json),
                Err(e) => error!("couldn't serialize feed: {}", e),
            }
        }
        Err(e) => {
            // Only the seeder's own log sees the internal half.
            error!(internal = %e.internal, "seeding failed: {}", e);
            std::process::exit(1);
        }
    }

    if config.print_metrics {
        match metrics::render() {
            Ok(text) => print!("{}", text),
            Err(e) => error!("couldn't render metrics: {}", e),
        }
    }
}
