use std::io;

use actix_cors::Cors;
use actix_web::{
    get,
    http::StatusCode,
    middleware::{self, Condition},
    post,
    web::{self, Data},
    App, HttpResponse, HttpServer, Responder,
};
use clap::Parser;
use facematch::{
    gateway::{GatewayEngine, Gateways},
    handlers::{
        search::handle_search, stream::handle_stream_request, upload::handle_upload,
        HandlerResponse,
    },
    options::PipelineOptions,
};

use crate::tracers::init_tracing_subscriber;

mod tracers;

fn into_http_response(response: HandlerResponse) -> HttpResponse {
    let status = StatusCode::from_u16(response.status_code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut builder = HttpResponse::build(status);

    for (name, value) in &response.headers {
        builder.insert_header((name.as_str(), value.as_str()));
    }

    builder.body(response.body)
}

/// Registers a face -- `{image, missingpersondata}`
#[post("/upload")]
async fn upload(gateways: web::Data<Gateways>, body: String) -> impl Responder {
    into_http_response(handle_upload(&gateways, &body).await)
}

/// Searches a face and notifies observers -- `{image}`
#[post("/search")]
async fn search(gateways: web::Data<Gateways>, body: String) -> impl Responder {
    into_http_response(handle_search(&gateways, &body).await)
}

/// Processes one batch of face search stream records -- `{Records: [...]}`
#[post("/stream")]
async fn stream(gateways: web::Data<Gateways>, body: String) -> impl Responder {
    into_http_response(handle_stream_request(&gateways, &body).await)
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

/// 🔎 Missing person HTTP server, exposes the upload, search and stream handlers
#[derive(Parser, Debug)]
struct Cli {
    /// Port the http server will run on
    #[clap(short, long, default_value = "9000")]
    port: u16,

    /// Address the http server will run on
    #[clap(short, long, default_value = "0.0.0.0")]
    address: String,

    /// Logs every http request
    #[clap(long)]
    log_http: bool,

    #[clap(long, default_value_t = 2)]
    http_workers: usize,

    /// Serve from the in-memory engine instead of AWS, state lives until shutdown
    #[clap(long)]
    local: bool,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    init_tracing_subscriber();

    let args = Cli::parse();

    let (engine, options) = if args.local {
        (
            GatewayEngine::Memory,
            PipelineOptions::from_env().unwrap_or_default(),
        )
    } else {
        let options = PipelineOptions::from_env()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        (GatewayEngine::Aws, options)
    };

    let log_http = args.log_http;

    // Clients are created once and shared by every worker
    let gateways = Data::new(Gateways::from_engine(engine, &options).await);

    log::info!(
        "starting HTTP server on {}:{} [Engine: {:?}]",
        args.address,
        args.port,
        engine
    );

    HttpServer::new(move || {
        App::new()
            .app_data(gateways.clone())
            .service(upload)
            .service(search)
            .service(stream)
            .service(health)
            .wrap(Cors::permissive())
            .wrap(Condition::new(log_http, middleware::Logger::default()))
    })
    .workers(args.http_workers)
    .bind((args.address, args.port))?
    .run()
    .await
}
