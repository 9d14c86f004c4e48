//! Foodshare command line front end.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use foodshare_client::api::ApiClient;
use foodshare_client::assets::{CloudinaryHost, ImageUpload};
use foodshare_client::auth::{AuthProvider, IdTokenAuthProvider, SessionProvider};
use foodshare_client::config::Config;
use foodshare_client::errors::AppError;
use foodshare_client::lifecycle::own_request_status;
use foodshare_client::models::{RequestStatus, UpdateProfileRequest};
use foodshare_client::notify::{ConsoleNotifier, Notifier};
use foodshare_client::search::ListingFilter;
use foodshare_client::views::{
    status_options, DetailView, DiscoveryView, DonationFlow, DonationForm, MyDonationsView,
    MyRequestsView,
};

#[derive(Parser)]
#[command(name = "foodshare")]
#[command(about = "Share and request surplus food", long_about = None)]
#[command(version)]
struct Cli {
    /// ID token of the signed-in user (overrides FOODSHARE_ID_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Backend base URL (overrides FOODSHARE_BACKEND_URL)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the signed-in user's profile
    Profile,

    /// Create the backend profile for the signed-in user
    Register,

    /// Update profile fields
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        photo: Option<String>,
    },

    /// List available donations
    List {
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        location: Option<String>,
    },

    /// Show one donation with its requests
    Show { food_id: String },

    /// Print a share link for a donation
    Share { food_id: String },

    /// Request a donation
    Request { food_id: String },

    /// List your donations and the requests on them
    Donations,

    /// Approve, reject or reset a request on one of your donations
    SetStatus {
        request_id: String,

        #[arg(value_parser = ["pending", "approved", "rejected"])]
        status: String,
    },

    /// List the requests you made
    MyRequests,

    /// Donate food
    Donate {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,

        /// YYYY-MM-DD
        #[arg(long)]
        expiry_date: String,

        /// HH:MM
        #[arg(long)]
        expiry_time: String,

        #[arg(long)]
        location: String,

        #[arg(long)]
        image: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }
    if let Some(token) = cli.token {
        config.id_token = Some(token);
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Backend URL: {}", config.backend_url);

    let auth: Arc<dyn AuthProvider> = Arc::new(match &config.id_token {
        Some(token) => IdTokenAuthProvider::from_token(token)?,
        None => IdTokenAuthProvider::signed_out(),
    });
    let api = ApiClient::new(&config, auth.clone())?;
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);

    let session = SessionProvider::start(auth, api.clone());
    let current = session.ready().await;
    let viewer = current.viewer_id().map(str::to_string);
    let viewer = viewer.as_deref();

    let result = run(cli.command, &config, api, notifier, viewer).await;
    session.shutdown();

    if let Err(AppError::Validation(errors)) = &result {
        for (field, message) in errors.iter() {
            eprintln!("{}: {}", field.as_str(), message);
        }
    }
    result.map_err(Into::into)
}

async fn run(
    command: Commands,
    config: &Config,
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
    viewer: Option<&str>,
) -> Result<(), AppError> {
    match command {
        Commands::Profile => {
            let profile = api.get_profile().await?;
            println!("id:    {}", profile.id);
            println!("name:  {}", profile.name.as_deref().unwrap_or("-"));
            println!("email: {}", profile.email.as_deref().unwrap_or("-"));
            println!("photo: {}", profile.photo().unwrap_or("-"));
        }

        Commands::Register => match api.create_user().await? {
            Some(profile) => println!("Profile ready: {}", profile.id),
            None => println!("Profile ready"),
        },

        Commands::UpdateProfile { name, photo } => {
            let ack = api
                .update_profile(&UpdateProfileRequest { name, photo })
                .await?;
            println!("{}", ack.message.as_deref().unwrap_or("Profile updated"));
        }

        Commands::List { search, location } => {
            let view = DiscoveryView::new(api, notifier);
            view.refresh().await?;
            view.set_filter(ListingFilter::new(
                search.unwrap_or_default(),
                location.unwrap_or_default(),
            ))
            .await;

            let cards = view.cards(viewer).await;
            if cards.is_empty() {
                println!("No food donations found.");
            }
            for card in cards {
                println!(
                    "{}  {}  [{}]{}",
                    card.listing.id,
                    card.listing.display_name(),
                    card.status.label(),
                    if card.expiring_soon { "  expiring soon" } else { "" }
                );
                println!(
                    "    {} | expires {} | {}",
                    card.listing.location.as_deref().unwrap_or("-"),
                    card.expiry,
                    card.request_summary.as_deref().unwrap_or("no requests")
                );
            }
        }

        Commands::Show { food_id } => {
            let view = DetailView::new(api, notifier, food_id, &config.share_base_url);
            view.refresh().await?;
            let Some(details) = view.details().await else {
                return Ok(());
            };
            let food = &details.food;
            println!("{}", food.display_name());
            println!("  {}", food.food_description);
            println!("  location: {}", food.location.as_deref().unwrap_or("-"));
            println!(
                "  expires:  {}",
                foodshare_client::format::format_expiry(
                    food.expiry_date.as_deref(),
                    food.expiry_time.as_deref()
                )
            );
            if let Some(status) = view.status(viewer).await {
                println!("  status:   {}", status.label());
            }
            if let Some(own) = own_request_status(&details.requests, viewer) {
                println!("  your request: {}", own);
            }
            if let Some(action) = view.action(viewer).await {
                println!(
                    "  action:   {}{}",
                    action.label.as_str(),
                    if action.enabled { "" } else { " (disabled)" }
                );
            }
        }

        Commands::Share { food_id } => {
            let view = DetailView::new(api, notifier, food_id, &config.share_base_url);
            view.refresh().await?;
            let link = view.share_link().await;
            println!("{}", link.title);
            println!("{}", link.text);
            println!("{}", link.url);
        }

        Commands::Request { food_id } => {
            let view = DetailView::new(api, notifier, food_id, &config.share_base_url);
            if viewer.is_some() {
                view.refresh().await?;
            }
            let outcome = view.submit_request(viewer).await?;
            tracing::debug!("Request outcome: {:?}", outcome);
            if let Some(action) = view.action(viewer).await {
                println!("{}", action.label.as_str());
            }
        }

        Commands::Donations => {
            let view = MyDonationsView::new(api, notifier);
            view.refresh(viewer).await?;
            let donations = view.donations().await;
            if donations.is_empty() {
                println!("You have not donated any food yet.");
            }
            for item in donations {
                println!("{}  {}", item.listing.id, item.listing.display_name());
                if item.requests.is_empty() {
                    println!("    no requests");
                }
                for request in &item.requests {
                    let options: Vec<String> = status_options(request)
                        .into_iter()
                        .map(|o| {
                            if o.current {
                                format!("[{}]", o.status)
                            } else {
                                o.status.to_string()
                            }
                        })
                        .collect();
                    println!(
                        "    {}  {}  {}",
                        request.id,
                        request.requester_display_name(),
                        options.join(" ")
                    );
                }
            }
        }

        Commands::SetStatus { request_id, status } => {
            let status = RequestStatus::from_str(&status)
                .ok_or_else(|| AppError::Config(format!("Unknown status {}", status)))?;
            let view = MyDonationsView::new(api, notifier);
            view.refresh(viewer).await?;
            view.set_request_status(&request_id, status, viewer).await?;
        }

        Commands::MyRequests => {
            let view = MyRequestsView::new(api, notifier);
            view.refresh(viewer).await?;
            let requests = view.requests().await;
            if requests.is_empty() {
                println!("You have not requested any food yet.");
            }
            for request in requests {
                let name = request
                    .listing()
                    .map(|l| l.display_name().to_string())
                    .or_else(|| request.listing_id().map(str::to_string))
                    .unwrap_or_else(|| "Unknown Food".to_string());
                println!("{}  {}  {}", request.id, name, request.status);
            }
        }

        Commands::Donate {
            name,
            description,
            expiry_date,
            expiry_time,
            location,
            image,
        } => {
            let cloudinary = config.cloudinary().ok_or_else(|| {
                AppError::Config(
                    "FOODSHARE_CLOUDINARY_CLOUD_NAME and FOODSHARE_CLOUDINARY_UPLOAD_PRESET must be set"
                        .to_string(),
                )
            })?;
            let http = reqwest::Client::builder()
                .timeout(config.request_timeout)
                .build()
                .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
            let assets = Arc::new(CloudinaryHost::new(http, cloudinary));

            let form = DonationForm {
                food_name: name,
                food_description: description,
                expiry_date,
                expiry_time,
                location,
                image: Some(ImageUpload::from_path(&image).await?),
            };
            let flow = DonationFlow::new(api, assets, notifier);
            let receipt = flow
                .submit(&form, viewer, Local::now().naive_local())
                .await?;
            println!("{}", receipt.asset.secure_url);
        }
    }
    Ok(())
}
