use anyhow::Context;
use card_injector_core::{normalize_name, Bootstrap, EngineConfig, Event, Injector, LookupIndex, NodeSnapshot};
use card_injector_data::{init_logging, AssetDir};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::PathBuf;
use tiny_http::{Header, Method, Response, Server, StatusCode};

const DEFAULT_ADDR: &str = "127.0.0.1:7979";

fn main() {
    init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (addr, assets) = parse_args(&args);
    let state = match AppState::load(AssetDir::new(assets)) {
        Ok(state) => state,
        Err(err) => {
            eprintln!("startup error: {err:#}");
            std::process::exit(1);
        }
    };
    let server = match Server::http(&addr) {
        Ok(server) => server,
        Err(err) => {
            eprintln!("bind {addr}: {err}");
            std::process::exit(1);
        }
    };
    println!("card injector server on http://{addr}");
    for request in server.incoming_requests() {
        if let Err(err) = handle_request(request, &state) {
            eprintln!("request error: {err}");
        }
    }
}

fn parse_args(args: &[String]) -> (String, PathBuf) {
    let mut addr = DEFAULT_ADDR.to_string();
    let mut assets = PathBuf::from("assets");
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--addr" => {
                if let Some(value) = args.get(idx + 1) {
                    addr = value.clone();
                    idx += 1;
                }
            }
            "--assets" | "-a" => {
                if let Some(value) = args.get(idx + 1) {
                    assets = PathBuf::from(value);
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }
    (addr, assets)
}

/// Startup loads happen once; `injector` is `None` when the toggle is off.
struct AppState {
    assets: AssetDir,
    config: EngineConfig,
    injector: Option<Injector>,
}

impl AppState {
    fn load(assets: AssetDir) -> anyhow::Result<Self> {
        let config = assets.config()?;
        let injector = Bootstrap::start(&assets, &assets, config.clone())
            .context("bootstrap from assets")?;
        Ok(Self {
            assets,
            config,
            injector,
        })
    }

    fn index(&self) -> Option<&LookupIndex> {
        self.injector.as_ref().map(Injector::index)
    }
}

#[derive(Serialize)]
struct StatusResponse {
    enabled: bool,
    cards: usize,
    normalized_keys: usize,
    items: usize,
}

#[derive(Deserialize)]
struct ResolveRequest {
    label: String,
}

#[derive(Serialize)]
struct ResolveResponse {
    label: String,
    key: String,
    found: Option<ResolvedCard>,
}

#[derive(Serialize)]
struct ResolvedCard {
    character: String,
    card: String,
    exact: bool,
    url: String,
}

#[derive(Serialize)]
struct PatchResponse {
    enabled: bool,
    patched: usize,
    events: Vec<Event>,
    document: NodeSnapshot,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct Reply {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Reply {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_vec_pretty(value) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body,
            },
            Err(err) => Self::error(500, &err.to_string()),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        let body = serde_json::to_vec(&ErrorResponse {
            error: message.to_string(),
        })
        .unwrap_or_default();
        Self {
            status,
            content_type: "application/json",
            body,
        }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: "text/plain; charset=utf-8",
            body: b"not found".to_vec(),
        }
    }
}

fn handle_request(
    mut request: tiny_http::Request,
    state: &AppState,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut body = String::new();
    if *request.method() == Method::Post {
        request.as_reader().read_to_string(&mut body)?;
    }
    let reply = route(request.method(), request.url(), &body, state);
    let header = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes())
        .map_err(|_| "invalid content type header")?;
    let response = Response::from_data(reply.body)
        .with_status_code(StatusCode(reply.status))
        .with_header(header);
    request.respond(response)?;
    Ok(())
}

fn route(method: &Method, url: &str, body: &str, state: &AppState) -> Reply {
    let path = url.split('?').next().unwrap_or(url);
    match (method, path) {
        (&Method::Get, "/cards.json") => serve_file(state.assets.cards_path()),
        (&Method::Get, "/itemcards.json") => serve_file(state.assets.items_path()),
        (&Method::Get, "/api/status") => status(state),
        (&Method::Post, "/api/resolve") => match serde_json::from_str::<ResolveRequest>(body) {
            Ok(req) => resolve(state, req),
            Err(err) => Reply::error(400, &err.to_string()),
        },
        (&Method::Post, "/api/patch") => match serde_json::from_str::<NodeSnapshot>(body) {
            Ok(snapshot) => patch(state, snapshot),
            Err(err) => Reply::error(400, &err.to_string()),
        },
        _ => Reply::not_found(),
    }
}

fn serve_file(path: PathBuf) -> Reply {
    match std::fs::read(&path) {
        Ok(body) => Reply {
            status: 200,
            content_type: "application/json",
            body,
        },
        Err(err) => {
            tracing::warn!("read {}: {err}", path.display());
            Reply::not_found()
        }
    }
}

fn status(state: &AppState) -> Reply {
    let index = state.index();
    Reply::json(
        200,
        &StatusResponse {
            enabled: index.is_some(),
            cards: index.map_or(0, LookupIndex::card_count),
            normalized_keys: index.map_or(0, LookupIndex::normalized_count),
            items: index.map_or(0, LookupIndex::item_count),
        },
    )
}

fn resolve(state: &AppState, req: ResolveRequest) -> Reply {
    let Some(index) = state.index() else {
        return Reply::error(409, "card injection is disabled");
    };
    let key = normalize_name(req.label.trim());
    let found = index
        .match_key(&key, state.config.max_fuzzy_distance)
        .map(|found| ResolvedCard {
            character: found.character.to_string(),
            card: found.card.to_string(),
            exact: index.exact(&key).is_some(),
            url: state.config.asset_url(found.character, found.card),
        });
    Reply::json(
        200,
        &ResolveResponse {
            label: req.label,
            key,
            found,
        },
    )
}

fn patch(state: &AppState, snapshot: NodeSnapshot) -> Reply {
    let Some(index) = state.index() else {
        return Reply::json(
            200,
            &PatchResponse {
                enabled: false,
                patched: 0,
                events: Vec::new(),
                document: snapshot,
            },
        );
    };
    let mut doc = card_injector_core::Document::from_snapshot(&snapshot);
    let mut injector = Injector::new(index.clone(), state.config.clone());
    let patched = injector.attach(&mut doc);
    Reply::json(
        200,
        &PatchResponse {
            enabled: true,
            patched,
            events: injector.drain_events(),
            document: doc.snapshot(doc.root()),
        },
    )
}
