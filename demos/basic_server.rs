//! A basic HTTP server demonstrating handler registration and request access.

use std::io::Write;

use log::info;
use rawhttp_rs::{HttpResponse, HttpServer, Request, ServerConfig, StatusCode};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize the logger
    env_logger::init();

    let server = HttpServer::new(ServerConfig::default());

    // A plain text greeting
    server.add_handler("GET", "/", |_request: &Request, out: &mut dyn Write| {
        HttpResponse::new(StatusCode::Ok)
            .with_content_type("text/plain")
            .with_body_string("Hello, World!")
            .write_to(out)
    });

    // Routes match the full path, so the query string is part of the key
    server.add_handler("GET", "/hello?name=Ada&name=Grace", |request: &Request, out: &mut dyn Write| {
        let names = request.query_param("name");
        let greeting = if names.is_empty() {
            "Hello, World!".to_string()
        } else {
            format!("Hello, {}!", names.join(" and "))
        };

        HttpResponse::new(StatusCode::Ok)
            .with_content_type("text/plain")
            .with_body_string(greeting)
            .write_to(out)
    });

    // Echo the request body back, or the JSON document re-serialized
    server.add_handler("POST", "/echo", |request: &Request, out: &mut dyn Write| {
        let response = if request.is_json() {
            match request.json::<serde_json::Value>() {
                Ok(value) => HttpResponse::new(StatusCode::Ok)
                    .with_content_type("application/json")
                    .with_body_string(value.to_string()),
                Err(e) => HttpResponse::new(StatusCode::BadRequest)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Invalid JSON: {e}")),
            }
        } else {
            HttpResponse::new(StatusCode::Ok)
                .with_content_type("text/plain")
                .with_body_string(request.body().unwrap_or_default())
        };

        response.with_header("Connection", "close").write_to(out)
    });

    // Raw bytes straight to the socket
    server.add_handler("GET", "/raw", |_request: &Request, out: &mut dyn Write| {
        out.write_all(b"HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n")
    });

    info!("Starting server on http://0.0.0.0:8081");
    server.listen(8081)?;

    Ok(())
}
