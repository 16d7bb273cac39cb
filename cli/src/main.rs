mod input;


use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use intake::api::{doctor, patient};
use intake::envelope::check_code;
use intake::routes::RouteMatch;
use intake::{
    ClientError, Clients, ConfigError, FileStore, IntakeConfig, Navigation, NavigationError, Navigator, Notice,
    Notifier, Role, RouteTable, Session, StoreError,
};
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("token store error: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("no route matches {0}")]
    RouteNotFound(String),
    #[error("reading {path} failed: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("missing input; pass --data or --input")]
    MissingInput,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "medimeow", about = "MediMeow clinic intake API CLI")]
struct Cli {
    /// JSON file holding the persisted session tokens.
    #[arg(long, env = "MEDIMEOW_TOKEN_STORE", default_value = "medimeow-tokens.json")]
    token_store: PathBuf,

    /// Overrides `MEDIMEOW_LOGIN_ORIGIN`.
    #[arg(long)]
    login_origin: Option<String>,

    /// Overrides `MEDIMEOW_API_BASE_URL`.
    #[arg(long)]
    api_base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Patient(PatientCommand),
    Doctor(DoctorCommand),
    Session(SessionCommand),
    /// Run a path through the route guard and report what would mount.
    Navigate { path: String },
}

#[derive(Args, Debug)]
struct PatientCommand {
    #[command(subcommand)]
    command: PatientSubcommand,
}

#[derive(Subcommand, Debug)]
enum PatientSubcommand {
    /// Log in and store the returned patient token.
    Login(CredentialArgs),
    Register(CredentialArgs),
    Departments,
    Questionnaire {
        dept_id: String,
    },
    Submit {
        #[arg(long, conflicts_with = "input")]
        data: Option<String>,
        #[arg(long, help = "Input file path, or - for stdin")]
        input: Option<String>,
    },
    Upload {
        path: PathBuf,
        #[arg(long)]
        content_type: Option<String>,
    },
}

#[derive(Args, Debug)]
struct CredentialArgs {
    /// Account identifier (phone number or email).
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

#[derive(Args, Debug)]
struct DoctorCommand {
    #[command(subcommand)]
    command: DoctorSubcommand,
}

#[derive(Subcommand, Debug)]
enum DoctorSubcommand {
    Queue {
        #[arg(long)]
        user_id: String,
    },
    Detail {
        record_id: String,
    },
    Summary {
        record_id: String,
    },
}

#[derive(Args, Debug)]
struct SessionCommand {
    #[command(subcommand)]
    command: SessionSubcommand,
}

#[derive(Subcommand, Debug)]
enum SessionSubcommand {
    Show,
    Set { role: RoleArg, token: String },
    Clear { role: RoleArg },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum RoleArg {
    Doctor,
    Patient,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Doctor => Role::Doctor,
            RoleArg::Patient => Role::Patient,
        }
    }
}

/// Prints user notifications the way the app would show a toast.
#[derive(Debug, Default, Clone, Copy)]
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: &Notice) {
        eprintln!("[{}] {}", notice.kind(), notice.message());
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = resolve_config(IntakeConfig::from_env()?, cli.login_origin, cli.api_base_url);
    let session = Session::new(Arc::new(FileStore::new(cli.token_store.clone())));

    match cli.command {
        Command::Patient(cmd) => run_patient(&clients(&config, &session)?, &session, cmd).await,
        Command::Doctor(cmd) => run_doctor(&clients(&config, &session)?, cmd).await,
        Command::Session(cmd) => run_session(&session, cmd),
        Command::Navigate { path } => run_navigate(&session, &path),
    }
}

fn resolve_config(mut config: IntakeConfig, login_origin: Option<String>, api_base_url: Option<String>) -> IntakeConfig {
    if let Some(origin) = login_origin {
        config.login_origin = origin;
    }
    if let Some(base) = api_base_url {
        config.api_base_url = base;
    }
    config
}

fn clients(config: &IntakeConfig, session: &Session) -> Result<Clients, CliError> {
    Ok(Clients::from_config(config, session.clone(), Arc::new(StderrNotifier))?)
}

async fn run_patient(clients: &Clients, session: &Session, cmd: PatientCommand) -> Result<(), CliError> {
    let body = match cmd.command {
        PatientSubcommand::Login(args) => {
            let form = patient::LoginForm { email: args.email, password: args.password };
            let body = patient::login(&clients.patient_login, &form).await?;
            check_code(&body, &clients.patient_login.config().success_codes)?;
            match patient::session_token_from_login(&body) {
                Some(token) => session.set_token(Role::Patient, &token)?,
                None => tracing::warn!("login response carried no token; session unchanged"),
            }
            body
        }
        PatientSubcommand::Register(args) => {
            let form = patient::LoginForm { email: args.email, password: args.password };
            let body = patient::register(&clients.patient_login, &form).await?;
            check_code(&body, &clients.patient_login.config().success_codes)?;
            body
        }
        PatientSubcommand::Departments => patient::get_departments(&clients.patient_api).await?,
        PatientSubcommand::Questionnaire { dept_id } => {
            patient::get_questionnaire(&clients.patient_api, &dept_id).await?
        }
        PatientSubcommand::Submit { data, input } => {
            let answers = input::read_json(data.as_deref(), input.as_deref())?;
            patient::submit_questionnaire(&clients.patient_api, answers).await?
        }
        PatientSubcommand::Upload { path, content_type } => {
            let file = input::load_file_part(&path, content_type)?;
            patient::upload_file(&clients.patient_api, file).await?
        }
    };
    input::print_json(&body)
}

async fn run_doctor(clients: &Clients, cmd: DoctorCommand) -> Result<(), CliError> {
    let client = &clients.doctor;
    let codes = &client.config().success_codes;
    let data = match cmd.command {
        DoctorSubcommand::Queue { user_id } => {
            serde_json::to_value(doctor::get_doctor_queue(client, &user_id).await?.into_data(codes)?)?
        }
        DoctorSubcommand::Detail { record_id } => {
            serde_json::to_value(doctor::get_patient_detail(client, &record_id).await?.into_data(codes)?)?
        }
        DoctorSubcommand::Summary { record_id } => {
            serde_json::to_value(doctor::get_disease_summary(client, &record_id).await?.into_data(codes)?)?
        }
    };
    input::print_json(&data)
}

fn run_session(session: &Session, cmd: SessionCommand) -> Result<(), CliError> {
    match cmd.command {
        SessionSubcommand::Show => input::print_json(&session_summary(session)),
        SessionSubcommand::Set { role, token } => {
            session.set_token(role.into(), &token)?;
            Ok(())
        }
        SessionSubcommand::Clear { role } => {
            session.clear_token(role.into())?;
            Ok(())
        }
    }
}

/// Which roles hold a token. Token values are never printed.
fn session_summary(session: &Session) -> Value {
    let snapshot = session.snapshot();
    json!({
        "doctor": snapshot.get(Role::Doctor).is_some(),
        "patient": snapshot.get(Role::Patient).is_some(),
    })
}

fn run_navigate(session: &Session, path: &str) -> Result<(), CliError> {
    let navigator = Navigator::new(RouteTable::default(), session.clone());
    let outcome = navigator.navigate(path, |matched: &RouteMatch<'_>| {
        tracing::info!(route = matched.route.name, path = %matched.path, "view mounted");
    })?;
    match outcome {
        Navigation::Mounted { path, view, params, redirects } => input::print_json(&json!({
            "path": path,
            "view": format!("{view:?}"),
            "params": params,
            "redirects": redirects,
        })),
        Navigation::NotFound { path } => Err(CliError::RouteNotFound(path)),
    }
}
