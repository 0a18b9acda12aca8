//! # embedhttp demo server
//!
//! Serves a greeting on `/` and echoes request bodies on `/echo`. Every response gets
//! an `ETag` and every request is logged.
//!
//! Settings are read from an optional `embedhttp.toml` and `EMBEDHTTP_*` variables.
use std::time::Instant;

use sha2::{Digest, Sha256};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use embedhttp::{
    Context, HttpError, Next, Response, Server, ServerConfig, StatusCode, middleware::BodyParser,
};

fn access_log(ctx: &mut Context, next: Next<'_>) {
    let started = Instant::now();
    next.run(ctx);
    info!(
        method = %ctx.req.method,
        path = %ctx.req.path,
        status = %ctx.resp.status,
        elapsed = ?started.elapsed(),
        "handled request"
    );
}

fn etag(ctx: &mut Context, next: Next<'_>) {
    next.run(ctx);
    if ctx.resp.headers.is_empty() || ctx.resp.content.is_empty() {
        return;
    }
    let digest = hex::encode(Sha256::digest(&ctx.resp.content));
    ctx.resp.set_header("ETag", format!("\"{digest}\""));
}

fn router(ctx: &mut Context, _next: Next<'_>) {
    ctx.resp = match ctx.req.path.as_str() {
        "/" => Response::html(
            StatusCode::Ok,
            "<html><body><h1>Hello from embedhttp</h1></body></html>",
        ),
        "/echo" => {
            let mut resp = Response::text(StatusCode::Ok, "");
            resp.set_content(std::mem::take(&mut ctx.req.content));
            resp
        }
        _ => Response::html(
            StatusCode::NotFound,
            "<html><body><h1>Not Found</h1></body></html>",
        ),
    };
}

fn main() -> Result<(), HttpError> {
    let config = ServerConfig::load(Some("embedhttp"))?;

    let level = config.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install the log subscriber: {e}");
    }

    let mut server = Server::from_config(&config)?;
    server
        .use_handler(access_log)
        .use_middleware(BodyParser::new(config.max_body_size))
        .use_handler(etag)
        .use_handler(router);

    info!(address = %server.local_addr()?, "serving");
    server.run()
}
