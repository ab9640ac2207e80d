use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::middleware::Logger;
use actix_web::{get, post, web, App, HttpResponse, HttpServer};
use futures_util::TryStreamExt;
use log::{error, info, warn};

use crate::config::Config;
use crate::error::Error;
use crate::interface::PredictResponse;
use crate::model_host::ModelHost;
use crate::predictions::Prediction;
use crate::preprocessing;

/// The multipart field the image is uploaded under.
pub const FILE_FIELD: &str = "file";

#[get("/health")]
pub async fn health(_: web::Data<ModelHost>) -> HttpResponse {
    HttpResponse::Ok().body("Ok")
}

/// Classifies one uploaded image and returns its top label.
#[post("/predict")]
pub async fn predict(
    payload: Multipart,
    model_host: web::Data<ModelHost>,
) -> Result<HttpResponse, Error> {
    let result = predict_upload(payload, model_host).await;
    if let Err(e) = &result {
        if e.is_client_error() {
            warn!("Rejected prediction request: {}", e);
        } else {
            error!("Error during inference: {}", e);
        }
    }
    result
}

async fn predict_upload(
    payload: Multipart,
    model_host: web::Data<ModelHost>,
) -> Result<HttpResponse, Error> {
    let image_bytes = read_file_field(payload).await?.ok_or(Error::NoFileUploaded)?;

    // Decoding and inference are CPU-bound; keep them off the async workers.
    let model_host = model_host.into_inner();
    let prediction = web::block(move || classify(&model_host, &image_bytes)).await??;

    let response = PredictResponse::from(&prediction);
    info!("Classified upload as {} ({:.2}%)", response.label, response.confidence * 100.0);

    Ok(HttpResponse::Ok().json(response))
}

/// Decodes, resizes and normalizes the uploaded bytes, then asks the model for its best class.
pub fn classify(model_host: &ModelHost, image_bytes: &[u8]) -> Result<Prediction, Error> {
    let input = preprocessing::prepare_input(image_bytes)?;
    model_host.predict_top(input)
}

/// Reads the body of the first `file` part that was sent as a file, i.e. with a filename.
/// Other fields are drained and ignored. Returns `None` when the form has no such part.
async fn read_file_field(mut payload: Multipart) -> Result<Option<Vec<u8>>, Error> {
    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let is_file = field.name() == Some(FILE_FIELD) && has_filename(&field);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
            if is_file {
                bytes.extend_from_slice(&chunk);
            }
        }

        if is_file {
            return Ok(Some(bytes));
        }
    }

    Ok(None)
}

/// Plain form values share the field namespace with uploads; only parts carrying a
/// filename count as files.
fn has_filename(field: &Field) -> bool {
    field.content_disposition().is_some_and(|cd| {
        cd.get_filename().is_some() || cd.get_filename_ext().is_some()
    })
}

fn multipart_error(e: MultipartError) -> Error {
    match e {
        // A body that cannot be split into parts has no file in it.
        MultipartError::ContentTypeMissing
        | MultipartError::ContentTypeParse
        | MultipartError::ContentTypeIncompatible
        | MultipartError::BoundaryMissing => Error::NoFileUploaded,
        e => Error::Multipart(e.to_string()),
    }
}

/// Registers every endpoint. The caller provides the `ModelHost` as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(predict);
}

pub async fn startup(config: Config, model_host: ModelHost) -> std::io::Result<()> {
    let app_state = web::Data::new(model_host);

    info!("Starting server at {}:{}", config.host, config.port);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(configure)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    server.bind((config.host, config.port))?.run().await
}
