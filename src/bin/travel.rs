use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use travel_journal::client::{
    api::ApiClient,
    controller::{ClientController, NoticeKind, View},
    session::FileSessionStore,
};
use travel_journal::models::travel::TravelDto;
use travel_journal::validation::travel::{RatingsInput, TravelPayload};

/// Command-line client for the travel journal API.
#[derive(Parser)]
#[command(name = "travel", version, about)]
struct Cli {
    /// Base URL of the server.
    #[arg(long, env = "TRAVEL_SERVER", default_value = "http://127.0.0.1:5000")]
    server: String,

    /// Directory holding the persisted session.
    #[arg(long, env = "TRAVEL_SESSION_DIR", default_value = ".travel-session")]
    session_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },
    /// Sign in.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// List travels, newest first.
    List {
        /// Only the signed-in user's travels.
        #[arg(long)]
        mine: bool,
    },
    /// Show one travel.
    Show { id: String },
    /// Create a travel.
    Create(TravelArgs),
    /// Update a travel. Omitted fields keep their current values.
    Update {
        id: String,
        #[command(flatten)]
        fields: TravelArgs,
    },
    /// Delete a travel.
    Delete { id: String },
    /// Upload an image and print its URL.
    Upload { path: PathBuf },
}

#[derive(Args, Default)]
struct TravelArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    cost: Option<f64>,
    /// Image URL; repeat for several.
    #[arg(long = "image")]
    images: Vec<String>,
    /// Cultural site; repeat for several.
    #[arg(long = "site")]
    cultural_sites: Vec<String>,
    /// Place to visit; repeat for several.
    #[arg(long = "place")]
    places_to_visit: Vec<String>,
    #[arg(long)]
    mobility: Option<i32>,
    #[arg(long)]
    safety: Option<i32>,
    #[arg(long)]
    population: Option<i32>,
    #[arg(long)]
    vegetation: Option<i32>,
}

impl TravelArgs {
    /// Overlays the given flags on `base`.
    fn apply(self, mut base: TravelPayload) -> TravelPayload {
        if let Some(title) = self.title {
            base.title = title;
        }
        if let Some(description) = self.description {
            base.description = description;
        }
        if let Some(location) = self.location {
            base.location = location;
        }
        if self.cost.is_some() {
            base.cost = self.cost;
        }
        if !self.images.is_empty() {
            base.images = Some(self.images);
        }
        if !self.cultural_sites.is_empty() {
            base.cultural_sites = Some(self.cultural_sites);
        }
        if !self.places_to_visit.is_empty() {
            base.places_to_visit = Some(self.places_to_visit);
        }

        let mut ratings = base.ratings.unwrap_or_default();
        ratings.mobility = self.mobility.or(ratings.mobility);
        ratings.safety = self.safety.or(ratings.safety);
        ratings.population = self.population.or(ratings.population);
        ratings.vegetation = self.vegetation.or(ratings.vegetation);
        base.ratings = Some(ratings);

        base
    }
}

fn payload_from(travel: &TravelDto) -> TravelPayload {
    TravelPayload {
        title: travel.title.clone(),
        description: travel.description.clone(),
        location: travel.location.clone(),
        cost: Some(travel.cost),
        images: Some(travel.images.clone()),
        cultural_sites: Some(travel.cultural_sites.clone()),
        places_to_visit: Some(travel.places_to_visit.clone()),
        ratings: Some(RatingsInput::from(travel.ratings)),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", sonic_rs::to_string_pretty(value)?);
    Ok(())
}

fn print_travel_line(travel: &TravelDto) {
    println!(
        "{}  {}  {} ({})  {}/5  by {}",
        travel.id,
        travel.created_at.format("%Y-%m-%d"),
        travel.title,
        travel.location,
        travel.ratings.average(),
        travel.user_name
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let api = ApiClient::new(cli.server);
    let store = FileSessionStore::new(cli.session_dir);
    let mut controller = ClientController::new(api, store);

    let outcome = run(&mut controller, cli.command).await;

    for notice in controller.drain_notices() {
        let tag = match notice.kind {
            NoticeKind::Success => "ok",
            NoticeKind::Error => "error",
            NoticeKind::Info => "info",
        };
        eprintln!("[{}] {}", tag, notice.message);
    }

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::debug!("Command failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(
    controller: &mut ClientController<FileSessionStore>,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Register {
            email,
            password,
            name,
        } => {
            controller.sign_up(&email, &password, &name).await?;
        }
        Command::Login { email, password } => {
            controller.sign_in(&email, &password).await?;
        }
        Command::Logout => {
            controller.sign_out();
        }
        Command::Whoami => {
            if controller.restore().await {
                if let Some(user) = controller.user() {
                    print_json(user)?;
                }
            } else {
                anyhow::bail!("not signed in");
            }
        }
        Command::List { mine } => {
            let signed_in = controller.restore().await;
            if mine {
                if !signed_in {
                    eprintln!("Sign in to list your own travels.");
                    anyhow::bail!("not signed in");
                }
                controller.switch_view(View::Mine).await?;
            } else if !signed_in {
                controller.reload().await?;
            }
            for travel in controller.travels() {
                print_travel_line(travel);
            }
        }
        Command::Show { id } => {
            let travel = controller.open_travel(&id).await?;
            print_json(&travel)?;
        }
        Command::Create(fields) => {
            controller.restore().await;
            let draft = fields.apply(TravelPayload::default());
            let travel = controller.create_travel(&draft).await?;
            print_json(&travel)?;
        }
        Command::Update { id, fields } => {
            controller.restore().await;
            let current = controller.open_travel(&id).await?;
            let draft = fields.apply(payload_from(&current));
            let travel = controller.update_travel(&id, &draft).await?;
            print_json(&travel)?;
        }
        Command::Delete { id } => {
            controller.restore().await;
            controller.delete_travel(&id).await?;
        }
        Command::Upload { path } => {
            controller.restore().await;
            let url = controller.upload_image(&path).await?;
            println!("{}", url);
        }
    }

    Ok(())
}
