use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_browser::browser::FilterState;

#[derive(Parser, Debug)]
#[command(name = "movie-browser-server")]
#[command(about = "Movie catalog browser with a TMDB proxy", long_about = None)]
struct Args {
    #[arg(short, long)]
    config: Option<String>,

    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one page of movies through a running server.
    Browse {
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        url: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, default_value = "All")]
        genre: String,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_filter = if args.debug {
        "movie_browser=debug,tower_http=debug"
    } else {
        "movie_browser=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let result = match args.command {
        Some(Command::Browse { url, page, year, genre }) => {
            let filter = FilterState::default()
                .with_page(page)
                .with_year(year)
                .with_genre(genre);
            movie_browser::browse(&url, filter).await
        }
        None => movie_browser::run(args.config.as_deref(), args.debug).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
