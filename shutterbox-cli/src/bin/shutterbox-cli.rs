use serde::Serialize;
use structopt::StructOpt;
use url::Url;

use shutterbox::client::{ApiError, HttpPhotoClient, PhotoProvider};
use shutterbox::validation::{validate_image, Limits};
use shutterbox_api_structs::{ApiResponse, Photo, PhotoId};
use shutterbox_cli::media::read_upload_form;

#[derive(StructOpt)]
struct SharedApiArgs {
    /// Photo API base URL
    #[structopt(long, default_value = "http://localhost:8000", env = "SHUTTERBOX_API_URL")]
    api_url: Url,

    /// Print the result as a `{success, data|error}` JSON document.
    #[structopt(long)]
    json: bool,
}

#[derive(StructOpt)]
pub struct ListArgs {
    #[structopt(flatten)]
    api_arguments: SharedApiArgs,
}

#[derive(StructOpt)]
pub struct GetArgs {
    #[structopt(flatten)]
    api_arguments: SharedApiArgs,

    /// Photo ID to look up.
    #[structopt(name = "PHOTO_ID")]
    photo_id: PhotoId,
}

#[derive(StructOpt)]
pub struct UploadArgs {
    #[structopt(flatten)]
    api_arguments: SharedApiArgs,

    /// Optional photo title.
    #[structopt(long)]
    title: Option<String>,

    /// Optional photo description.
    #[structopt(long)]
    description: Option<String>,

    /// Largest accepted file, in bytes.
    #[structopt(long, default_value = "5242880", env = "SHUTTERBOX_MAX_UPLOAD_BYTES")]
    max_upload_bytes: u64,

    /// Path to photo file to upload.
    #[structopt(name = "PATH", parse(from_os_str))]
    file_path: std::path::PathBuf,
}

#[derive(StructOpt)]
pub enum Command {
    List(ListArgs),
    Get(GetArgs),
    Upload(UploadArgs),
}

fn client(args: &SharedApiArgs) -> HttpPhotoClient {
    match HttpPhotoClient::new(&args.api_url) {
        Ok(client) => client,
        Err(err) => {
            log::error!("Invalid photo API URL {}: {}", args.api_url, err);
            std::process::exit(2);
        },
    }
}

fn describe(photo: &Photo) -> String {
    let mut line = format!("{}\t{}", photo.id, photo.photo_url);
    if let Some(title) = &photo.title {
        line.push('\t');
        line.push_str(title);
    }
    line
}

fn report<T, E>(json: bool, result: Result<T, E>, print: impl Fn(&T)) -> bool
where
    T: Clone + Serialize,
    E: std::fmt::Display,
{
    let success = result.is_ok();
    if json {
        let response: ApiResponse<T> = result.into();
        match serde_json::to_string_pretty(&response) {
            Ok(rendered) => println!("{}", rendered),
            Err(err) => log::error!("Couldn't serialize result: {}", err),
        }
    } else {
        match result {
            Ok(data) => print(&data),
            Err(err) => log::error!("{}", err),
        }
    }
    success
}

async fn list_photos(args: ListArgs) -> bool {
    let result = client(&args.api_arguments).list_photos().await;
    report(args.api_arguments.json, result, |photos| {
        for photo in photos {
            println!("{}", describe(photo));
        }
    })
}

async fn get_photo(args: GetArgs) -> bool {
    let result = client(&args.api_arguments)
        .get_photo_by_id(args.photo_id)
        .await;
    report(args.api_arguments.json, result, |photo| {
        println!("{}", describe(photo));
        if let Some(description) = &photo.description {
            println!("{}", description);
        }
    })
}

async fn upload_photo(args: UploadArgs) -> bool {
    let form = match read_upload_form(&args.file_path, args.title.clone(), args.description.clone()) {
        Ok(form) => form,
        Err(err) => {
            log::error!("Couldn't read {}: {}", args.file_path.display(), err);
            return false;
        },
    };

    let limits = Limits {
        max_upload_bytes: args.max_upload_bytes,
    };
    if let Err(err) = validate_image(&form.photo, &limits) {
        log::info!("Refusing to upload {}", args.file_path.display());
        return report::<Photo, _>(args.api_arguments.json, Err(err), |_| {});
    }

    log::info!("Uploading {} to {}", form.photo.file_name, args.api_arguments.api_url);
    let result: Result<Photo, ApiError> = client(&args.api_arguments).upload_photo(&form).await;
    report(args.api_arguments.json, result, |photo| {
        println!("{}", describe(photo));
    })
}

#[async_std::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let success = match Command::from_args() {
        Command::List(args) => list_photos(args).await,
        Command::Get(args) => get_photo(args).await,
        Command::Upload(args) => upload_photo(args).await,
    };

    if !success {
        std::process::exit(1);
    }
}
