use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use shiftgate_http::{HttpServerConfig, StaticSessionResolver, serve_readiness_api};

pub fn run(
    org: String,
    site: String,
    actor: String,
    data: String,
    ledger: String,
    bind: String,
) {
    let bind_addr: SocketAddr = bind.parse().unwrap_or_else(|e| {
        eprintln!("error: invalid --bind address `{bind}`: {e}");
        process::exit(1);
    });

    let config = HttpServerConfig {
        bind: bind_addr,
        data: PathBuf::from(&data),
        ledger: PathBuf::from(&ledger),
    };
    let resolver = StaticSessionResolver::new(org.clone(), site.clone(), actor);

    println!("shiftgate serve");
    println!("  bind: {bind_addr}");
    println!("  session: {org}/{site}");
    println!("  data: {data}");
    println!("  ledger: {ledger}");
    println!("  routes:");
    println!("    GET /healthz");
    println!("    GET /readiness?shift=<code>&date=<iso>");
    println!("    GET /ledger/verify");
    println!("    GET /gate?action=<name>&shift=<code>&date=<iso>");

    if let Err(e) = serve_readiness_api(config, &resolver) {
        eprintln!("error: readiness API failed: {e}");
        process::exit(1);
    }
}
