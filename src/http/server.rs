use anyhow::anyhow;
use log::info;
use rouille::{Request, Response};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    config::HttpConfig,
    domain::{
        hash::TrackId,
        todo::Todo,
        track::{Track, payload_key},
    },
    http::error::ApiError,
    manifest::WebManifest,
    storage::{BlobStore, error::StorageError, operations::Storage},
    store::{playlist::PlaylistStore, todo::TodoStore},
};

const MANIFEST_MIME: &str = "application/manifest+json";

pub struct HttpServer {
    playlist: Arc<Mutex<PlaylistStore<Storage>>>,
    todos: Arc<Mutex<TodoStore<Storage>>>,
    manifest: WebManifest,
    pub config: HttpConfig,
}

impl HttpServer {
    pub fn new(
        playlist: PlaylistStore<Storage>,
        todos: TodoStore<Storage>,
        manifest: WebManifest,
        config: HttpConfig,
    ) -> Self {
        Self {
            playlist: Arc::new(Mutex::new(playlist)),
            todos: Arc::new(Mutex::new(todos)),
            manifest,
            config,
        }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        // the router macro cannot match a dotted segment
        if request.method() == "GET" && request.url() == "/manifest.webmanifest" {
            let response = self.get_manifest().unwrap_or_else(ApiError::into_response);
            info!("Response: {} {}", request.method(), response.status_code);
            return response;
        }

        let result = rouille::router!(request,
            (GET) (/api/current) => {
                self.with_playlist(|store| Ok(Response::json(&store.current_track())))
            },
            (GET) (/api/playlist) => {
                self.with_playlist(|store| Ok(Response::json(&PlaylistView::of(store))))
            },
            (POST) (/api/next) => {
                self.with_playlist(|store| {
                    store.next_track()?;
                    Ok(Response::json(&PlaylistView::of(store)))
                })
            },
            (POST) (/api/prev) => {
                self.with_playlist(|store| {
                    store.prev_track()?;
                    Ok(Response::json(&PlaylistView::of(store)))
                })
            },
            (POST) (/api/select/{index: i64}) => {
                self.with_playlist(|store| {
                    if let Ok(index) = usize::try_from(index) {
                        store.select(index)?;
                    }
                    Ok(Response::json(&PlaylistView::of(store)))
                })
            },
            (DELETE) (/api/tracks/{index: i64}) => {
                self.with_playlist(|store| {
                    // negative indices name no entry, same as out of range ones
                    let removed = match usize::try_from(index) {
                        Ok(index) => store.remove_track(index)?,
                        Err(_) => None,
                    };
                    Ok(Response::json(&RemoveResponse {
                        removed,
                        playlist: PlaylistView::of(store),
                    }))
                })
            },
            (GET) (/tracks/{id: String}/audio) => {
                self.get_track_audio(&id)
            },
            (GET) (/api/todos) => {
                self.with_todos(|store| Ok(Response::json(&store.list())))
            },
            (POST) (/api/todos) => {
                self.add_todo(request)
            },
            _ => Ok(self.handle_assets(request))
        );

        let response = result.unwrap_or_else(ApiError::into_response);
        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    fn with_playlist<F>(&self, f: F) -> Result<Response, ApiError>
    where
        F: FnOnce(&mut PlaylistStore<Storage>) -> Result<Response, StorageError>,
    {
        let mut store = lock(&self.playlist)?;
        Ok(f(&mut *store)?)
    }

    fn with_todos<F>(&self, f: F) -> Result<Response, ApiError>
    where
        F: FnOnce(&mut TodoStore<Storage>) -> Result<Response, StorageError>,
    {
        let mut store = lock(&self.todos)?;
        Ok(f(&mut *store)?)
    }

    fn get_track_audio(&self, id: &str) -> Result<Response, ApiError> {
        let track_id =
            TrackId::from_hex(id).map_err(|_| ApiError::BadRequest("invalid track id".into()))?;
        let key = payload_key(&track_id.to_hex());

        let blob = lock(&self.playlist)?
            .backend()
            .get(&key)?
            .ok_or_else(|| StorageError::BlobNotFound(key.clone()))?;

        log::debug!(
            "AUDIO {} -> 200 OK, {} bytes, MIME type: {}",
            id,
            blob.data.len(),
            blob.content_type
        );
        Ok(Response::from_data(blob.content_type, blob.data))
    }

    fn add_todo(&self, request: &Request) -> Result<Response, ApiError> {
        let body: NewTodo = rouille::input::json_input(request)
            .map_err(|e| ApiError::BadRequest(format!("invalid to-do: {e}")))?;

        let content = body.content.trim().to_string();
        if content.is_empty() {
            return Err(ApiError::BadRequest("to-do content is empty".into()));
        }

        self.with_todos(|store| {
            let todo: Todo = store.add_todo(content)?;
            Ok(Response::json(&todo).with_status_code(201))
        })
    }

    fn get_manifest(&self) -> Result<Response, ApiError> {
        let json = self
            .manifest
            .to_json()
            .map_err(|e| ApiError::from(StorageError::Serialization(e)))?;
        Ok(Response::from_data(MANIFEST_MIME, json))
    }

    /// serves bundled files (index page, default music, icons) when configured
    fn handle_assets(&self, request: &Request) -> Response {
        if let Some(dir) = &self.config.assets_dir {
            let response = rouille::match_assets(request, dir);
            if response.is_success() {
                return response;
            }
        }
        Response::empty_404()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ApiError> {
    mutex.lock().map_err(|e| {
        ApiError::from(StorageError::Internal(anyhow!(
            "Could not access store under lock: {e}"
        )))
    })
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistView {
    playlist: Vec<Track>,
    current_index: usize,
    current_track: Track,
}

impl PlaylistView {
    fn of(store: &PlaylistStore<Storage>) -> Self {
        let state = store.state();
        Self {
            playlist: state.playlist.clone(),
            current_index: state.current_index,
            current_track: state.current_track(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RemoveResponse {
    removed: Option<Track>,
    playlist: PlaylistView,
}

#[derive(Deserialize)]
struct NewTodo {
    content: String,
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
