use log::{info, warn};
use rouille::{Request, Response, ResponseBody};
use serde::Serialize;
use std::{fs::File, path::Path};

use crate::{
    config::HttpConfig,
    domain::{
        id::SongId,
        song::{CoverRef, SongInfo},
    },
    http::error::ApiError,
    library::{covers::is_cover_file, error::LibraryError, is_within},
    registry::MediaSource,
};

pub struct HttpServer {
    sources: Vec<Box<dyn MediaSource>>,
    pub config: HttpConfig,
}

impl HttpServer {
    pub fn new(sources: Vec<Box<dyn MediaSource>>, config: HttpConfig) -> Self {
        Self { sources, config }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let response = rouille::router!(request,
            (GET) (/sources) => {
                self.handle_list_sources()
            },
            (GET) (/sources/{index: usize}/songs) => {
                Self::respond(self.list_songs(index))
            },
            (POST) (/sources/{index: usize}/refresh) => {
                Self::respond(self.refresh(index))
            },
            (GET) (/sources/{index: usize}/songs/{id: String}) => {
                Self::respond(self.song_info(index, &id))
            },
            (GET) (/sources/{index: usize}/songs/{id: String}/stream) => {
                Self::respond(self.song_stream(index, &id))
            },
            (GET) (/cover/{token: String}) => {
                Self::respond(self.cover(&token))
            },
            _ => Response::empty_404()
        );

        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    fn respond(result: Result<Response, ApiError>) -> Response {
        result.unwrap_or_else(ApiError::into_response)
    }

    fn source(&self, index: usize) -> Result<&dyn MediaSource, ApiError> {
        self.sources
            .get(index)
            .map(|source| &**source)
            .ok_or_else(|| ApiError::NotFound(format!("source {index} not found")))
    }

    fn handle_list_sources(&self) -> Response {
        let sources: Vec<_> = self
            .sources
            .iter()
            .enumerate()
            .map(|(index, source)| SourceResponse {
                index,
                key: source.key(),
            })
            .collect();
        Response::json(&sources)
    }

    fn list_songs(&self, index: usize) -> Result<Response, ApiError> {
        let catalog = self.source(index)?.list()?;
        let songs: Vec<_> = catalog
            .iter()
            .map(|(id, info)| SongResponse { id, info })
            .collect();
        Ok(Response::json(&songs))
    }

    fn refresh(&self, index: usize) -> Result<Response, ApiError> {
        let catalog = self.source(index)?.refresh()?;
        Ok(Response::json(&RefreshResponse {
            songs: catalog.len(),
        }))
    }

    fn song_info(&self, index: usize, id: &str) -> Result<Response, ApiError> {
        let source = self.source(index)?;
        let id = SongId::decode(id).map_err(LibraryError::from)?;
        let info = source.info(&id)?;
        Ok(Response::json(&SongResponse {
            id: &id,
            info: &info,
        }))
    }

    fn song_stream(&self, index: usize, id: &str) -> Result<Response, ApiError> {
        let source = self.source(index)?;
        let id = SongId::decode(id).map_err(LibraryError::from)?;
        let stream = source.get_track(&id)?;
        let mime = Self::mime_for_track(id.path());

        log::debug!(
            "STREAM {} -> 200 OK, path: {}, MIME type: {}",
            id,
            id.path().to_string_lossy(),
            mime
        );

        Ok(Response {
            status_code: 200,
            headers: vec![("Content-Type".into(), mime.into())],
            data: ResponseBody::from_reader(stream),
            upgrade: None,
        })
    }

    /// Serves cover images, but only cover files inside a configured source.
    fn cover(&self, token: &str) -> Result<Response, ApiError> {
        let path = CoverRef::decode_token(token)
            .map_err(|e| ApiError::BadRequest(format!("invalid cover token: {e}")))?;

        let allowed = is_cover_file(&path)
            && self
                .sources
                .iter()
                .filter_map(|source| source.root())
                .any(|root| is_within(&path, root));
        if !allowed {
            warn!("refusing cover request for {}", path.to_string_lossy());
            return Err(ApiError::NotFound("cover not found".into()));
        }

        let file = File::open(&path).map_err(|_| ApiError::NotFound("cover not found".into()))?;
        let mime = mime_guess::from_path(&path).first_or_octet_stream().to_string();
        Ok(Response::from_file(mime, file))
    }

    fn mime_for_track(path: &Path) -> String {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy())
            .map(|s| s.to_lowercase());
        let default = || {
            mime_guess::from_path(path)
                .first_or_octet_stream()
                .to_string()
        };
        ext.and_then(|ext| Self::mime_from_ext(ext.as_str()))
            .unwrap_or_else(default)
    }

    /// Map file extension (without dot) to proper MIME type for browser playback.
    /// Returns None if the extension is not recognized.
    pub fn mime_from_ext(ext: &str) -> Option<String> {
        match ext {
            "m4a" => Some("audio/x-m4a".to_string()), // Safari iOS compatible
            "aac" => Some("audio/aac".to_string()),
            "mp3" => Some("audio/mpeg".to_string()),
            "wav" => Some("audio/wav".to_string()),
            "ogg" | "opus" => Some("audio/ogg".to_string()),
            "flac" => Some("audio/flac".to_string()),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct SourceResponse {
    index: usize,
    key: String,
}

#[derive(Serialize)]
struct SongResponse<'a> {
    id: &'a SongId,
    info: &'a SongInfo,
}

#[derive(Serialize)]
struct RefreshResponse {
    songs: usize,
}

#[cfg(test)]
pub fn parse_json_response(response: rouille::Response) -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
