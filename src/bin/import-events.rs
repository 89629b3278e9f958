use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use dotenv::dotenv;
use log::{error, info, initialize_logger, o};
use structopt::StructOpt;

use devevent::actions;
use devevent::connection::{postgres_connector, ConnectionCache};
use devevent::db::PgDb;
use devevent::event::EventSubmission;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "import-events",
    about = "Create events from a JSON file holding an array of submissions"
)]
struct Opt {
    /// The JSON file to read
    #[structopt(parse(from_os_str))]
    path: PathBuf,

    /// Keep going after an event fails validation or already exists
    #[structopt(long)]
    keep_going: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let opt = Opt::from_args();

    let logger = initialize_logger().new(o!("tool" => "import-events"));

    let contents = fs::read(&opt.path)?;
    let submissions: Vec<EventSubmission> = serde_json::from_slice(&contents)?;

    info!(logger, "Importing {} events...", submissions.len(); "path" => %opt.path.display());

    let connections = ConnectionCache::from_env(logger.clone(), postgres_connector())?;
    let db = PgDb::new(Arc::new(connections));

    let mut created = vec![];

    for (index, submission) in submissions.into_iter().enumerate() {
        let logger = logger.new(o!("index" => index));

        match actions::create_event(&logger, &db, submission).await {
            Ok(event) => {
                info!(logger, "Created event"; "slug" => event.slug(), "id" => %event.id());
                created.push(event.slug().to_owned());
            }
            Err(e) if opt.keep_going && e.is_client_error() => {
                error!(logger, "Skipping event"; "error" => %e);
            }
            Err(e) => return Err(Box::new(e)),
        }
    }

    println!("Created events:\n{}", created.join("\n"));

    Ok(())
}
