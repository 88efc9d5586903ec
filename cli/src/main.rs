use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use client::net::{ApiClient, ApiError, ClientConfig, ImageUpload};
use client::state::{Action, Store};
use client::sync::{Effect, Hooks, MutationOutcome};
use client::util::persistence::FileStorage;
use model::{CheckInPatch, Coordinates, CourtPatch, Envelope, ImageQuery, NewCourt, ViewState};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0}")]
    Failed(String),
    #[error("cannot read {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("unsupported image type for {0}; use .jpg, .jpeg, .png or .webp")]
    UnsupportedImage(PathBuf),
    #[error("no coordinates: pass --lat/--lng or pick a location with `map click`")]
    MissingCoordinates,
    #[error("could not serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "courtmap", about = "Court map API client")]
struct Cli {
    #[arg(long, env = "COURTMAP_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[arg(long, env = "COURTMAP_SESSION_TOKEN")]
    session_token: Option<String>,

    /// Directory holding the persisted map state between runs.
    #[arg(long, env = "COURTMAP_STATE_PATH", default_value = ".courtmap")]
    state_path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Courts(CourtsCommand),
    Checkin(CheckInCommand),
    Images(ImagesCommand),
    Map(MapCommand),
}

#[derive(Args, Debug)]
struct CourtsCommand {
    #[command(subcommand)]
    command: CourtsSubcommand,
}

#[derive(Subcommand, Debug)]
enum CourtsSubcommand {
    List,
    Show {
        court_id: Uuid,
    },
    /// Add a court at the given or the picked location.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
    },
    Edit {
        court_id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        play_count: Option<i64>,
    },
}

#[derive(Args, Debug)]
struct CheckInCommand {
    #[command(subcommand)]
    command: CheckInSubcommand,
}

#[derive(Subcommand, Debug)]
enum CheckInSubcommand {
    List {
        #[arg(long)]
        court: Uuid,
    },
    Show {
        check_in_id: Uuid,
    },
    /// Record a check-in only; the play count is left alone.
    Add {
        #[arg(long)]
        court: Uuid,
    },
    Edit {
        check_in_id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Check in and bump the court's play count.
    At {
        court_id: Uuid,
    },
}

#[derive(Args, Debug)]
struct ImagesCommand {
    #[command(subcommand)]
    command: ImagesSubcommand,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Association {
    #[arg(long)]
    court: Option<Uuid>,
    #[arg(long)]
    checkin: Option<Uuid>,
}

impl From<Association> for ImageQuery {
    fn from(a: Association) -> Self {
        Self { court_id: a.court, checkin_id: a.checkin }
    }
}

#[derive(Subcommand, Debug)]
enum ImagesSubcommand {
    Upload {
        path: PathBuf,
        #[command(flatten)]
        association: Association,
    },
    List {
        #[command(flatten)]
        association: Association,
    },
    Delete {
        image_id: String,
    },
}

#[derive(Args, Debug)]
struct MapCommand {
    #[command(subcommand)]
    command: MapSubcommand,
}

#[derive(Subcommand, Debug)]
enum MapSubcommand {
    /// Print the persisted map state.
    Show,
    /// Move the camera and list the courts inside the viewport.
    Settle {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        #[arg(long, default_value_t = 13.0)]
        zoom: f64,
        #[arg(long, default_value_t = 1280.0)]
        width: f64,
        #[arg(long, default_value_t = 800.0)]
        height: f64,
    },
    Select {
        court_id: Uuid,
    },
    Close,
    /// Enter location-picking mode.
    Pick,
    /// Click the map; while picking, this sets the new court's location.
    Click {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Feed a device location fix; only the first one moves the camera.
    Locate {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::new(cli.base_url);
    config.session_token = cli.session_token.filter(|t| !t.trim().is_empty());
    if config.session_token.is_none() {
        tracing::warn!("no session token; API requests will be rejected");
    }
    let backend = ApiClient::new(config)?;
    let store = Store::with_storage(Box::new(FileStorage::new(cli.state_path)));
    let hooks = Hooks::new(backend, store);

    match cli.command {
        Command::Courts(cmd) => run_courts(&hooks, cmd.command).await,
        Command::Checkin(cmd) => run_check_in(&hooks, cmd.command).await,
        Command::Images(cmd) => run_images(&hooks, cmd.command).await,
        Command::Map(cmd) => run_map(&hooks, cmd.command).await,
    }
}

async fn run_courts(hooks: &Hooks<ApiClient>, command: CourtsSubcommand) -> Result<(), CliError> {
    match command {
        CourtsSubcommand::List => print_envelope(hooks.courts().await),
        CourtsSubcommand::Show { court_id } => print_envelope(hooks.court(court_id).await),
        CourtsSubcommand::Add { name, description, lat, lng } => {
            let given = lat.zip(lng).map(|(latitude, longitude)| Coordinates { latitude, longitude });
            let location = given
                .or_else(|| hooks.store().select(|s| s.placement_coordinates(None)))
                .ok_or(CliError::MissingCoordinates)?;
            let court = NewCourt { name, latitude: location.latitude, longitude: location.longitude, description };
            print_outcome(hooks.add_court(court).await)
        }
        CourtsSubcommand::Edit { court_id, name, description, play_count } => {
            let patch = CourtPatch { name, description, play_count, ..CourtPatch::default() };
            print_outcome(hooks.edit_court(court_id, patch).await)
        }
    }
}

async fn run_check_in(hooks: &Hooks<ApiClient>, command: CheckInSubcommand) -> Result<(), CliError> {
    match command {
        CheckInSubcommand::List { court } => print_envelope(hooks.check_ins(court).await),
        CheckInSubcommand::Show { check_in_id } => print_envelope(hooks.check_in(check_in_id).await),
        CheckInSubcommand::Add { court } => print_outcome(hooks.add_check_in(court).await),
        CheckInSubcommand::Edit { check_in_id, title, notes } => {
            print_outcome(hooks.edit_check_in(check_in_id, CheckInPatch { title, notes }).await)
        }
        CheckInSubcommand::At { court_id } => {
            let court = hooks.court(court_id).await.into_result().map_err(CliError::Failed)?;
            let outcome = hooks.check_in_at(&court.court).await;
            report_effects(&outcome.check_in.effects);
            report_effects(&outcome.play_count.effects);
            if outcome.is_partial() {
                eprintln!("warning: check-in was only partially applied");
            }
            let check_in = outcome.check_in.envelope.into_result().map_err(CliError::Failed)?;
            let court = outcome.play_count.envelope.into_result().map_err(CliError::Failed)?;
            print_json(&serde_json::json!({ "checkIn": check_in, "court": court }))
        }
    }
}

async fn run_images(hooks: &Hooks<ApiClient>, command: ImagesSubcommand) -> Result<(), CliError> {
    match command {
        ImagesSubcommand::Upload { path, association } => {
            let upload = read_image(&path, association.into())?;
            print_outcome(hooks.upload_image(upload).await)
        }
        ImagesSubcommand::List { association } => print_envelope(hooks.images(association.into()).await),
        ImagesSubcommand::Delete { image_id } => {
            let outcome = hooks.delete_image(&image_id).await;
            report_effects(&outcome.effects);
            outcome_result(&outcome.envelope)
        }
    }
}

async fn run_map(hooks: &Hooks<ApiClient>, command: MapSubcommand) -> Result<(), CliError> {
    let store = hooks.store();
    match command {
        MapSubcommand::Show => {}
        MapSubcommand::Settle { lat, lng, zoom, width, height } => {
            hooks.courts().await.into_result().map_err(CliError::Failed)?;
            let view = ViewState { latitude: lat, longitude: lng, zoom, ..ViewState::default() };
            hooks.settle_from_view(view, width, height);
            return store.select(|s| {
                print_json(&serde_json::json!({ "visibleCourts": s.visible_courts, "card": s.card_court() }))
            });
        }
        MapSubcommand::Select { court_id } => {
            let court = hooks.court(court_id).await.into_result().map_err(CliError::Failed)?;
            store.dispatch(Action::SelectCourt(court.court));
        }
        MapSubcommand::Close => store.dispatch(Action::CloseCourt),
        MapSubcommand::Pick => store.dispatch(Action::BeginSelectingLocation),
        MapSubcommand::Click { lat, lng } => store.dispatch(Action::MapClick(Coordinates { latitude: lat, longitude: lng })),
        MapSubcommand::Locate { lat, lng } => hooks.apply_location(Ok(Coordinates { latitude: lat, longitude: lng })),
    }
    store.select(|s| print_json(&client::state::PersistedState::from(s)))
}

/// Content type implied by a file extension.
fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn read_image(path: &Path, association: ImageQuery) -> Result<ImageUpload, CliError> {
    let content_type = content_type_for(path).ok_or_else(|| CliError::UnsupportedImage(path.to_owned()))?;
    let bytes = std::fs::read(path).map_err(|source| CliError::ReadFile { path: path.to_owned(), source })?;
    let file_name = path.file_name().map_or_else(|| "image".to_owned(), |n| n.to_string_lossy().into_owned());
    Ok(ImageUpload { bytes, file_name, content_type: content_type.to_owned(), association })
}

fn effect_line(effect: &Effect) -> String {
    match effect {
        Effect::ToastSuccess(message) => format!("ok: {message}"),
        Effect::ToastError(message) => format!("error: {message}"),
        Effect::NavigateBack => "back".to_owned(),
        Effect::FieldError { field, message } => format!("invalid {field}: {message}"),
    }
}

fn report_effects(effects: &[Effect]) {
    for effect in effects {
        eprintln!("{}", effect_line(effect));
    }
}

fn outcome_result<T>(envelope: &Envelope<T>) -> Result<(), CliError> {
    if envelope.success { Ok(()) } else { Err(CliError::Failed(envelope.message.clone())) }
}

fn print_outcome<T: Serialize>(outcome: MutationOutcome<T>) -> Result<(), CliError> {
    report_effects(&outcome.effects);
    print_envelope(outcome.envelope)
}

fn print_envelope<T: Serialize>(envelope: Envelope<T>) -> Result<(), CliError> {
    let data = envelope.into_result().map_err(CliError::Failed)?;
    print_json(&data)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
