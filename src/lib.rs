use std::path::Path;
use std::sync::Arc;

use structopt::StructOpt;
use url::Url;

pub mod client;
pub mod telemetry;
pub mod upload;
pub mod validation;
pub mod views;
pub mod web;

use client::{HttpPhotoClient, PhotoProvider};
use validation::Limits;

#[derive(Clone)]
pub struct State {
    pub args: Arc<Args>,
    pub photos: Arc<dyn PhotoProvider>,
    pub tera: Arc<tera::Tera>,
}

impl State {
    pub fn new(args: Arc<Args>, photos: Arc<dyn PhotoProvider>, tera: tera::Tera) -> Self {
        State {
            args,
            photos,
            tera: Arc::new(tera),
        }
    }
}

#[derive(Debug)]
pub enum Error {
    TemplateParseError(tera::Error),
    TemplatePathError(std::io::Error),
    TelemetryInitError(anyhow::Error),
    InvalidApiUrl(url::ParseError),
    ServerError(std::io::Error),
}

impl From<Error> for i32 {
    fn from(error: Error) -> i32 {
        match error {
            Error::TemplateParseError(_) => 3,
            Error::TelemetryInitError(_) => 4,
            Error::TemplatePathError(_) => 5,
            Error::InvalidApiUrl(_) => 6,
            Error::ServerError(_) => 7,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TemplateParseError(err) => {
                write!(f, "Template parsing error: {}", err)
            },
            Error::TemplatePathError(err) => {
                write!(f, "Could not resolve template path: {}", err)
            },
            Error::TelemetryInitError(err) => {
                write!(f, "Failed to init telemetry: {}", err)
            },
            Error::InvalidApiUrl(err) => {
                write!(f, "Invalid photo API URL: {}", err)
            },
            Error::ServerError(err) => {
                write!(f, "Gallery server failed: {}", err)
            },
        }
    }
}

#[derive(Debug, StructOpt)]
pub struct Args {
    /// Host address to bind to.
    #[structopt(long, default_value = "localhost", env = "SHUTTERBOX_BIND_ADDRESS")]
    address: String,
    /// Port to bind to.
    #[structopt(long, default_value = "8167", env = "SHUTTERBOX_BIND_PORT")]
    port: u16,

    /// Photo API base URL.
    #[structopt(long, default_value = "http://localhost:8000", env = "SHUTTERBOX_API_URL")]
    pub api_url: Url,

    /// Largest photo accepted by the upload forms, in bytes.
    #[structopt(long, default_value = "5242880", env = "SHUTTERBOX_MAX_UPLOAD_BYTES")]
    max_upload_bytes: u64,

    /// Path to Tera templates directory
    #[structopt(
        long,
        parse(from_os_str),
        default_value = "./templates",
        env = "SHUTTERBOX_TEMPLATE_PATH"
    )]
    template_path: std::path::PathBuf,
}

impl Args {
    pub fn limits(&self) -> Limits {
        Limits {
            max_upload_bytes: self.max_upload_bytes,
        }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }
}

pub fn load_templates(template_path: &Path) -> Result<tera::Tera, Error> {
    let template_path = template_path
        .canonicalize()
        .map_err(Error::TemplatePathError)?;

    let mut tera = tera::Tera::new(&template_path.join("**/*.html").to_string_lossy())
        .map_err(Error::TemplateParseError)?;
    tera.register_filter("attr", web::html::AttributeEscape);

    Ok(tera)
}

pub fn build_app(state: State) -> tide::Server<State> {
    let mut app = tide::with_state(state);
    web::mount(&mut app);
    app
}

pub async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    let args = Arc::new(Args::from_args());

    telemetry::init().map_err(Error::TelemetryInitError)?;

    let tera = load_templates(&args.template_path)?;
    let client = HttpPhotoClient::new(&args.api_url).map_err(Error::InvalidApiUrl)?;

    let state = State::new(args.clone(), Arc::new(client), tera);
    let app = build_app(state);

    tracing::info!(
        address = %args.address,
        port = args.port,
        api_url = %args.api_url,
        "starting gallery"
    );

    let address: &str = args.address.as_ref();
    app.listen((address, args.port))
        .await
        .map_err(Error::ServerError)
}
