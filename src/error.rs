use actix_web::{http::StatusCode, HttpResponse, ResponseError};

use crate::interface::ErrorResponse;

pub const NO_FILE_UPLOADED: &str = "No file uploaded";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{}", NO_FILE_UPLOADED)]
    NoFileUploaded,
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
    #[error(transparent)]
    Blocking(#[from] actix_web::error::BlockingError),
    #[error("Error reading multipart upload: {0}")]
    Multipart(String),
    #[error("The classifier returned {scores} scores per image but {labels} class labels are loaded")]
    LabelCountMismatch { scores: usize, labels: usize },
    #[error("The classifier returned no predictions")]
    EmptyPrediction,
}

impl Error
{
    /// Client errors are the caller's fault; everything else is a failure while processing the upload.
    pub fn is_client_error(&self) -> bool
    {
        matches!(self, Error::NoFileUploaded)
    }
}

impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
      S: serde::ser::Serializer,
    {
      serializer.serialize_str(self.to_string().as_ref())
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse { error: self })
    }
}
