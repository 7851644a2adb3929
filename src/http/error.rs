use rouille::Response;

use crate::library::error::LibraryError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::SongNotFound(id) => ApiError::NotFound(format!("song {id} not found")),

            LibraryError::InvalidSongId(e) => ApiError::BadRequest(format!("invalid song id: {e}")),

            LibraryError::Config(_)
            | LibraryError::UnknownSourceKind(_)
            | LibraryError::DuplicateSourceKind(_)
            | LibraryError::InvalidRoot { .. }
            | LibraryError::Walk(_)
            | LibraryError::Codec(_)
            | LibraryError::Io(_)
            | LibraryError::Internal(_) => {
                log::error!("request failed: {err}");
                ApiError::Internal("internal server error".into())
            }
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::BadRequest(_) => 400,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Internal(msg) => {
                Response::text(msg).with_status_code(status)
            }
        }
    }
}
