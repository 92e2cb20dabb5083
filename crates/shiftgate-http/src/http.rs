//! Blocking HTTP server for the readiness API.
//!
//! Request handling is request-line only: parse method and target, route,
//! load the dataset and ledger from disk, execute, answer JSON. Gate
//! checks append a governance event before replying; a blocked gate
//! answers 412. Audit persistence is fire-and-log, so a flush failure
//! never turns a computed decision into a 500.

use chrono::{NaiveDate, Utc};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use thiserror::Error;

use shiftgate_engine::{
    CockpitAggregator, EngineConfig, GateAction, GovernanceGate, ReadinessContext, TokenService,
    verify_chain,
};
use shiftgate_store::{LedgerStore, MemoryStore};

use crate::session::{Session, SessionResolver};

#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub bind: SocketAddr,
    pub data: PathBuf,
    pub ledger: PathBuf,
}

#[derive(Debug, Error)]
pub enum HttpServeError {
    #[error("bind failed: {0}")]
    Bind(std::io::Error),
    #[error("accept failed: {0}")]
    Accept(std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HttpResponse {
    status: u16,
    body: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    Healthz,
    Index,
    Readiness { shift: String, date: NaiveDate },
    LedgerVerify,
    Gate { action: String, target: Option<String>, shift: String, date: NaiveDate },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
enum RouteError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub fn serve_readiness_api(
    config: HttpServerConfig,
    resolver: &dyn SessionResolver,
) -> Result<(), HttpServeError> {
    let listener = TcpListener::bind(config.bind).map_err(HttpServeError::Bind)?;
    tracing::info!(bind = %config.bind, "readiness api listening");

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&mut stream, &config, resolver) {
                    let _ = write_json_response(
                        &mut stream,
                        HttpResponse {
                            status: 500,
                            body: json!({ "error": format!("internal server error: {err}") }),
                        },
                    );
                }
            }
            Err(err) => return Err(HttpServeError::Accept(err)),
        }
    }

    Ok(())
}

fn handle_connection(
    stream: &mut TcpStream,
    config: &HttpServerConfig,
    resolver: &dyn SessionResolver,
) -> Result<(), String> {
    let (method, target) = read_request_line(stream).map_err(|e| e.to_string())?;

    if method != "GET" {
        return write_json_response(
            stream,
            HttpResponse {
                status: 405,
                body: json!({ "error": "method not allowed; use GET" }),
            },
        )
        .map_err(|e| e.to_string());
    }

    let route = match parse_route_target(&target) {
        Ok(route) => route,
        Err(RouteError::BadRequest(msg)) => {
            return write_json_response(
                stream,
                HttpResponse {
                    status: 400,
                    body: json!({ "error": msg }),
                },
            )
            .map_err(|e| e.to_string());
        }
        Err(RouteError::NotFound(msg)) => {
            return write_json_response(
                stream,
                HttpResponse {
                    status: 404,
                    body: json!({ "error": msg }),
                },
            )
            .map_err(|e| e.to_string());
        }
    };

    let Some(session) = resolver.resolve() else {
        return write_json_response(
            stream,
            HttpResponse {
                status: 401,
                body: json!({ "error": "unauthenticated" }),
            },
        )
        .map_err(|e| e.to_string());
    };

    let store = MemoryStore::load_json(&config.data).map_err(|e| e.to_string())?;
    let mut ledger = if config.ledger.exists() {
        LedgerStore::load_jsonl(&config.ledger).map_err(|e| e.to_string())?
    } else {
        LedgerStore::default()
    };
    let tokens = TokenService::from_config(&EngineConfig::from_env());

    let response = execute_route(
        &store,
        &mut ledger,
        &tokens,
        &session,
        route,
        Some(&config.ledger),
    );
    write_json_response(stream, response).map_err(|e| e.to_string())
}

fn read_request_line(stream: &mut TcpStream) -> Result<(String, String), RouteError> {
    let mut buf = [0u8; 8192];
    let n = stream
        .read(&mut buf)
        .map_err(|e| RouteError::BadRequest(format!("failed to read request: {e}")))?;
    if n == 0 {
        return Err(RouteError::BadRequest("empty request".to_string()));
    }
    let req = String::from_utf8_lossy(&buf[..n]);
    let line = req
        .lines()
        .next()
        .ok_or_else(|| RouteError::BadRequest("missing request line".to_string()))?;
    parse_request_line(line)
}

fn parse_request_line(line: &str) -> Result<(String, String), RouteError> {
    let mut parts = line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| RouteError::BadRequest("missing method".to_string()))?;
    let target = parts
        .next()
        .ok_or_else(|| RouteError::BadRequest("missing target".to_string()))?;
    Ok((method.to_string(), target.to_string()))
}

fn parse_route_target(target: &str) -> Result<Route, RouteError> {
    let (path, query) = split_target(target);
    let params = parse_query_params(query);

    match path {
        "/" => Ok(Route::Index),
        "/healthz" => Ok(Route::Healthz),
        "/readiness" => {
            let (shift, date) = shift_and_date(&params)?;
            Ok(Route::Readiness { shift, date })
        }
        "/ledger/verify" => Ok(Route::LedgerVerify),
        "/gate" => {
            let action = params.get("action").cloned().ok_or_else(|| {
                RouteError::BadRequest(
                    "missing action (use /gate?action=<name>&shift=<code>&date=<iso>)".to_string(),
                )
            })?;
            let (shift, date) = shift_and_date(&params)?;
            Ok(Route::Gate {
                action,
                target: params.get("target").cloned(),
                shift,
                date,
            })
        }
        _ => Err(RouteError::NotFound(format!("unknown route: {path}"))),
    }
}

fn shift_and_date(params: &BTreeMap<String, String>) -> Result<(String, NaiveDate), RouteError> {
    let shift = params
        .get("shift")
        .filter(|s| !s.is_empty())
        .cloned()
        .ok_or_else(|| RouteError::BadRequest("missing shift code (shift=<code>)".to_string()))?;
    let raw_date = params
        .get("date")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| RouteError::BadRequest("missing shift date (date=<iso>)".to_string()))?;
    let date = raw_date
        .parse::<NaiveDate>()
        .map_err(|_| RouteError::BadRequest(format!("bad shift date: {raw_date}")))?;
    Ok((shift, date))
}

fn split_target(target: &str) -> (&str, &str) {
    match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    }
}

fn parse_query_params(query: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (k, v) = match pair.split_once('=') {
            Some((k, v)) => (k, v),
            None => (pair, ""),
        };
        let key = percent_decode(k);
        if key.is_empty() {
            continue;
        }
        out.insert(key, percent_decode(v));
    }
    out
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                if let (Some(h), Some(l)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                    out.push((h * 16 + l) as char);
                    i += 3;
                } else {
                    out.push('%');
                    i += 1;
                }
            }
            ch => {
                out.push(ch as char);
                i += 1;
            }
        }
    }
    out
}

fn hex_val(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

/// Run one routed request. Gate decisions persist their audit event
/// through the gate's own fire-and-log seam; nothing else writes.
fn execute_route(
    store: &MemoryStore,
    ledger: &mut LedgerStore,
    tokens: &TokenService,
    session: &Session,
    route: Route,
    audit_path: Option<&Path>,
) -> HttpResponse {
    match route {
        Route::Healthz => HttpResponse {
            status: 200,
            body: json!({ "ok": true }),
        },
        Route::Index => HttpResponse {
            status: 200,
            body: json!({
                "service": "shiftgate.readiness.v1",
                "routes": [
                    "/healthz",
                    "/readiness?shift=<code>&date=<iso>",
                    "/ledger/verify",
                    "/gate?action=<name>&shift=<code>&date=<iso>"
                ]
            }),
        },
        Route::Readiness { shift, date } => {
            let ctx = context(session, shift, date);
            let now = Utc::now();
            match CockpitAggregator::new(store).evaluate(&ctx, now) {
                Ok(result) => {
                    let token = tokens
                        .issue(&ctx, &result, &["roster.publish".to_string()], now)
                        .ok()
                        .flatten();
                    let mut body = match serde_json::to_value(&result) {
                        Ok(body) => body,
                        Err(err) => return serialize_error(err),
                    };
                    if let (Some(object), Some(token)) = (body.as_object_mut(), token) {
                        object.insert("execution_token".to_string(), Value::String(token));
                    }
                    HttpResponse { status: 200, body }
                }
                Err(err) => HttpResponse {
                    status: 500,
                    body: json!({ "error": err.to_string() }),
                },
            }
        }
        Route::LedgerVerify => {
            let report = verify_chain(ledger, &session.org_id);
            match serde_json::to_value(&report) {
                Ok(body) => HttpResponse { status: 200, body },
                Err(err) => serialize_error(err),
            }
        }
        Route::Gate {
            action,
            target,
            shift,
            date,
        } => {
            let target = target.unwrap_or_else(|| format!("{}/{shift}", session.site_id));
            let gate_action = GateAction {
                name: action,
                target,
                shift_scoped: true,
            };
            let ctx = context(session, shift, date);
            let mut gate = GovernanceGate::new(store);
            if let Some(path) = audit_path {
                gate = gate.with_audit_path(path);
            }
            match gate.guard(
                ledger,
                &session.actor,
                &gate_action,
                &ctx,
                None,
                Utc::now(),
            ) {
                Ok(decision) => {
                    let status = if decision.allowed() { 200 } else { 412 };
                    match serde_json::to_value(&decision) {
                        Ok(body) => HttpResponse { status, body },
                        Err(err) => serialize_error(err),
                    }
                }
                Err(err) => HttpResponse {
                    status: 500,
                    body: json!({ "error": err.to_string() }),
                },
            }
        }
    }
}

fn context(session: &Session, shift: String, date: NaiveDate) -> ReadinessContext {
    ReadinessContext {
        org_id: session.org_id.clone(),
        site_id: session.site_id.clone(),
        shift_code: shift,
        shift_date: date,
    }
}

fn serialize_error(err: serde_json::Error) -> HttpResponse {
    HttpResponse {
        status: 500,
        body: json!({ "error": err.to_string() }),
    }
}

fn write_json_response(stream: &mut TcpStream, response: HttpResponse) -> std::io::Result<()> {
    let body = serde_json::to_vec_pretty(&response.body)?;
    let header = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        reason_phrase(response.status),
        body.len()
    );
    stream.write_all(header.as_bytes())?;
    stream.write_all(&body)?;
    stream.flush()
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        405 => "Method Not Allowed",
        412 => "Precondition Failed",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
