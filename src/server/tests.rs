//! Tests for the HTTP server implementation.

#[cfg(test)]
mod server_tests {
    use std::io::{self, Read, Write};
    use std::net::{Shutdown, TcpListener, TcpStream};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use log::debug;

    use crate::parser::Request;
    use crate::server::{
        Connection, Error, HttpResponse, HttpServer, Outcome, RouteTable, ServerConfig, StatusCode,
        DEFAULT_WORKERS, PEEK_WINDOW,
    };

    const BAD_REQUEST: &[u8] = b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
    const NOT_FOUND: &[u8] = b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

    // Mock TcpStream for testing. Reads hand out at most `chunk` bytes at a time.
    struct MockTcpStream {
        read_data: Vec<u8>,
        position: usize,
        chunk: usize,
        write_data: Vec<u8>,
    }

    impl MockTcpStream {
        fn new(read_data: impl Into<Vec<u8>>) -> Self {
            Self::chunked(read_data, usize::MAX)
        }

        fn chunked(read_data: impl Into<Vec<u8>>, chunk: usize) -> Self {
            Self {
                read_data: read_data.into(),
                position: 0,
                chunk,
                write_data: Vec::new(),
            }
        }
    }

    impl Read for MockTcpStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let remaining = &self.read_data[self.position..];
            let n = remaining.len().min(buf.len()).min(self.chunk);
            buf[..n].copy_from_slice(&remaining[..n]);
            self.position += n;
            Ok(n)
        }
    }

    impl Write for MockTcpStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.write_data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    // Runs one connection over the mock and returns the outcome and written bytes.
    fn serve(mut stream: MockTcpStream, routes: &RouteTable) -> (Result<Outcome, Error>, Vec<u8>) {
        let result = Connection::new(&mut stream, None, PEEK_WINDOW).run(routes);
        (result, stream.write_data)
    }

    fn text_handler(text: &'static str) -> impl Fn(&Request, &mut dyn Write) -> io::Result<()> {
        move |_request, out| {
            HttpResponse::new(StatusCode::Ok)
                .with_content_type("text/plain")
                .with_body_string(text)
                .write_to(out)
        }
    }

    fn echo_routes() -> RouteTable {
        let routes = RouteTable::new();
        routes.add_handler("POST", "/echo", |request: &Request, out: &mut dyn Write| {
            HttpResponse::new(StatusCode::Ok)
                .with_body_string(request.body().unwrap_or("<none>"))
                .write_to(out)
        });
        routes.add_handler("GET", "/echo", |request: &Request, out: &mut dyn Write| {
            HttpResponse::new(StatusCode::Ok)
                .with_body_string(request.body().unwrap_or("<none>"))
                .write_to(out)
        });
        routes
    }

    #[test]
    fn test_server_creation() {
        let config = ServerConfig::default();
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.peek_window, 4096);

        let server = HttpServer::new(config.clone());
        assert_eq!(server.config.addr, config.addr);
        assert!(server.routes.is_empty());
    }

    #[test]
    fn test_config_from_json() {
        let config = ServerConfig::from_json(r#"{"addr": "0.0.0.0:9000", "workers": 8}"#).unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.workers, 8);
        assert_eq!(config.peek_window, PEEK_WINDOW);

        let result = ServerConfig::from_json(r#"{"workers": "many"}"#);
        assert!(matches!(result, Err(Error::JsonError(_))));
    }

    #[test]
    fn test_response_bytes() {
        assert_eq!(HttpResponse::empty(StatusCode::BadRequest).to_bytes(), BAD_REQUEST);
        assert_eq!(HttpResponse::empty(StatusCode::NotFound).to_bytes(), NOT_FOUND);

        let response = HttpResponse::new(StatusCode::Ok)
            .with_header("X-Trace", "1")
            .with_body_string("hi")
            .with_header("x-trace", "2");
        assert_eq!(response.to_bytes(), b"HTTP/1.1 200 OK\r\nX-Trace: 2\r\nContent-Length: 2\r\n\r\nhi");
    }

    #[test]
    fn test_routes_are_exact_matches() {
        let routes = RouteTable::new();
        routes.add_handler("GET", "/a", text_handler("a"));

        assert!(routes.dispatch("GET", "/a").is_ok());
        assert!(matches!(routes.dispatch("GET", "/a/"), Err(Error::NotFound { .. })));
        assert!(matches!(routes.dispatch("get", "/a"), Err(Error::NotFound { .. })));
        assert!(matches!(
            routes.dispatch("POST", "/a"),
            Err(Error::NotFound { ref method, ref path }) if method == "POST" && path == "/a"
        ));
    }

    #[test]
    fn test_last_registration_wins() {
        let routes = RouteTable::new();
        routes.add_handler("GET", "/a", text_handler("first"));
        routes.add_handler("GET", "/a", text_handler("second"));
        routes.add_handler("PUT", "/a", text_handler("put"));

        assert_eq!(routes.len(), 2);
        assert_eq!(
            routes.routes(),
            vec![("GET".to_string(), "/a".to_string()), ("PUT".to_string(), "/a".to_string())]
        );

        let (result, written) = serve(MockTcpStream::new("GET /a HTTP/1.1\r\n\r\n"), &routes);
        assert_eq!(result.unwrap(), Outcome::Responded);
        assert!(String::from_utf8_lossy(&written).ends_with("second"));
    }

    #[test]
    fn test_cloned_table_shares_routes() {
        let routes = RouteTable::new();
        let server = HttpServer::with_routes(ServerConfig::default(), routes.clone());
        server.add_handler("GET", "/late", text_handler("late"));
        assert!(routes.dispatch("GET", "/late").is_ok());
    }

    #[test]
    fn test_handle_connection_with_valid_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let routes = RouteTable::new();
        let counter = Arc::clone(&calls);
        routes.add_handler("GET", "/a", move |request: &Request, out: &mut dyn Write| {
            counter.fetch_add(1, Ordering::SeqCst);
            assert_eq!(request.headers(), ["Host: localhost"]);
            text_handler("Test response")(request, out)
        });

        let (result, written) = serve(MockTcpStream::new("GET /a HTTP/1.1\r\nHost: localhost\r\n\r\n"), &routes);

        assert_eq!(result.unwrap(), Outcome::Responded);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let response = String::from_utf8_lossy(&written);
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Content-Type: text/plain\r\n"));
        assert!(response.ends_with("Test response"));
    }

    #[test]
    fn test_handle_connection_with_not_found() {
        let routes = RouteTable::new();
        routes.add_handler("GET", "/a", text_handler("a"));

        let (result, written) = serve(MockTcpStream::new("GET /b HTTP/1.1\r\n\r\n"), &routes);
        assert_eq!(result.unwrap(), Outcome::NotFound);
        assert_eq!(written, NOT_FOUND);

        let (result, written) = serve(MockTcpStream::new("POST /a HTTP/1.1\r\n\r\n"), &routes);
        assert_eq!(result.unwrap(), Outcome::NotFound);
        assert_eq!(written, NOT_FOUND);
    }

    #[test]
    fn test_unknown_method_is_not_found() {
        let routes = RouteTable::new();
        routes.add_handler("GET", "/a", text_handler("a"));

        let (result, written) = serve(MockTcpStream::new("FROB /a HTTP/1.1\r\n\r\n"), &routes);
        assert_eq!(result.unwrap(), Outcome::NotFound);
        assert_eq!(written, NOT_FOUND);
    }

    #[test]
    fn test_handle_connection_with_invalid_request() {
        let routes = echo_routes();
        for raw in [
            "GET /echo\r\n\r\n",
            "GET /echo HTTP/1.1 extra\r\n\r\n",
            "GET echo HTTP/1.1\r\n\r\n",
            "GET /echo HTTP/1.1",
            "GET /echo HTTP/1.1\r\nHost: localhost\r\n",
            "POST /echo HTTP/1.1\r\nContent-Length: five\r\n\r\nhello",
            "",
        ] {
            let (result, written) = serve(MockTcpStream::new(raw), &routes);
            assert_eq!(result.unwrap(), Outcome::BadRequest, "{raw:?}");
            assert_eq!(written, BAD_REQUEST, "{raw:?}");
        }
    }

    #[test]
    fn test_header_block_larger_than_window() {
        let routes = echo_routes();
        let raw = format!("GET /echo HTTP/1.1\r\nX-Padding: {}\r\n\r\n", "x".repeat(PEEK_WINDOW));

        let (result, written) = serve(MockTcpStream::new(raw), &routes);
        assert_eq!(result.unwrap(), Outcome::BadRequest);
        assert_eq!(written, BAD_REQUEST);
    }

    #[test]
    fn test_post_reads_exactly_content_length() {
        let routes = echo_routes();
        let (result, written) = serve(
            MockTcpStream::new("POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello world"),
            &routes,
        );
        assert_eq!(result.unwrap(), Outcome::Responded);
        assert!(String::from_utf8_lossy(&written).ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn test_get_ignores_content_length() {
        let routes = echo_routes();
        let (result, written) = serve(
            MockTcpStream::new("GET /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello"),
            &routes,
        );
        assert_eq!(result.unwrap(), Outcome::Responded);
        assert!(String::from_utf8_lossy(&written).ends_with("\r\n\r\n<none>"));
    }

    #[test]
    fn test_fragmented_request() {
        let routes = echo_routes();
        let body = "b".repeat(PEEK_WINDOW * 2);
        let raw = format!("POST /echo HTTP/1.1\r\nContent-Length: {}\r\n\r\n{body}", body.len());

        let (result, written) = serve(MockTcpStream::chunked(raw, 3), &routes);
        assert_eq!(result.unwrap(), Outcome::Responded);
        assert!(String::from_utf8_lossy(&written).ends_with(&format!("\r\n\r\n{body}")));
    }

    #[test]
    fn test_route_lookup_includes_query_string() {
        let routes = RouteTable::new();
        routes.add_handler("GET", "/search", text_handler("bare"));
        let (result, written) = serve(MockTcpStream::new("GET /search?q=cat HTTP/1.1\r\n\r\n"), &routes);
        assert_eq!(result.unwrap(), Outcome::NotFound);
        assert_eq!(written, NOT_FOUND);

        routes.add_handler("GET", "/search?q=cat&q=dog", |request: &Request, out: &mut dyn Write| {
            let values = request.query_param("q").join(",");
            HttpResponse::new(StatusCode::Ok).with_body_string(values).write_to(out)
        });
        let (result, written) = serve(MockTcpStream::new("GET /search?q=cat&q=dog HTTP/1.1\r\n\r\n"), &routes);
        assert_eq!(result.unwrap(), Outcome::Responded);
        assert!(String::from_utf8_lossy(&written).ends_with("\r\n\r\ncat,dog"));
    }

    #[test]
    fn test_invalid_uri_is_a_fault() {
        let routes = echo_routes();
        let (result, written) = serve(MockTcpStream::new("GET //[::1 HTTP/1.1\r\n\r\n"), &routes);
        assert!(matches!(result, Err(Error::ParseError(_))));
        assert!(written.is_empty());
    }

    #[test]
    fn test_handler_error_is_propagated() {
        let routes = RouteTable::new();
        routes.add_handler("GET", "/fail", |_request: &Request, _out: &mut dyn Write| {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away"))
        });

        let (result, written) = serve(MockTcpStream::new("GET /fail HTTP/1.1\r\n\r\n"), &routes);
        assert!(matches!(result, Err(Error::IoError(ref e)) if e.kind() == io::ErrorKind::BrokenPipe));
        assert!(written.is_empty());
    }

    #[test]
    fn test_handler_panic_is_reported() {
        let routes = RouteTable::new();
        routes.add_handler("GET", "/panic", |_request: &Request, _out: &mut dyn Write| -> io::Result<()> {
            panic!("handler bug")
        });

        let mut stream = MockTcpStream::new("GET /panic HTTP/1.1\r\n\r\n");
        let result = Connection::new(&mut stream, None, PEEK_WINDOW).run_guarded(&routes);
        assert!(matches!(result, Err(Error::HandlerPanic(ref message)) if message.contains("handler bug")));
        assert!(stream.write_data.is_empty());

        // Requests that do not panic come back unchanged.
        let mut stream = MockTcpStream::new("GET /missing HTTP/1.1\r\n\r\n");
        let result = Connection::new(&mut stream, None, PEEK_WINDOW).run_guarded(&routes);
        assert_eq!(result.unwrap(), Outcome::NotFound);
        assert_eq!(stream.write_data, NOT_FOUND);
    }

    #[test]
    fn test_concurrent_registration_and_lookup() {
        let routes = RouteTable::new();

        let registrations: Vec<_> = (0..100)
            .map(|i| {
                let routes = routes.clone();
                thread::spawn(move || {
                    routes.add_handler("GET", format!("/r/{i}"), move |_request: &Request, out: &mut dyn Write| {
                        write!(out, "{i}")
                    });
                })
            })
            .collect();
        for handle in registrations {
            handle.join().unwrap();
        }
        assert_eq!(routes.len(), 100);

        let lookups: Vec<_> = (0..100)
            .map(|i| {
                let routes = routes.clone();
                thread::spawn(move || {
                    let (result, written) = serve(MockTcpStream::new(format!("GET /r/{i} HTTP/1.1\r\n\r\n")), &routes);
                    assert_eq!(result.unwrap(), Outcome::Responded);
                    assert_eq!(written, i.to_string().into_bytes());
                })
            })
            .collect();
        for handle in lookups {
            handle.join().unwrap();
        }
    }

    fn start_server(routes: RouteTable, workers: usize) -> std::net::SocketAddr {
        let _ = env_logger::builder().is_test(true).try_init();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let config = ServerConfig {
            addr,
            workers,
            ..ServerConfig::default()
        };

        thread::spawn(move || {
            let server = HttpServer::with_routes(config, routes);
            if let Err(e) = server.serve(listener) {
                debug!("Test server stopped: {e}");
            }
        });
        addr
    }

    fn round_trip(addr: std::net::SocketAddr, request: &[u8]) -> Vec<u8> {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
        stream.write_all(request).unwrap();
        stream.shutdown(Shutdown::Write).unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).unwrap();
        response
    }

    #[test]
    fn test_listener_serves_connections() {
        let routes = RouteTable::new();
        routes.add_handler("GET", "/a", text_handler("from a"));
        let addr = start_server(routes, DEFAULT_WORKERS);

        let response = round_trip(addr, b"GET /a HTTP/1.1\r\nHost: localhost\r\n\r\n");
        assert!(String::from_utf8_lossy(&response).ends_with("from a"));

        assert_eq!(round_trip(addr, b"GET /b HTTP/1.1\r\n\r\n"), NOT_FOUND);
        assert_eq!(round_trip(addr, b"GET b HTTP/1.1\r\n\r\n"), BAD_REQUEST);
    }

    #[test]
    fn test_listener_queues_when_workers_are_busy() {
        let routes = RouteTable::new();
        routes.add_handler("GET", "/slow", |request: &Request, out: &mut dyn Write| {
            thread::sleep(Duration::from_millis(50));
            text_handler("slow")(request, out)
        });
        let addr = start_server(routes, 2);

        let clients: Vec<_> = (0..6)
            .map(|_| thread::spawn(move || round_trip(addr, b"GET /slow HTTP/1.1\r\n\r\n")))
            .collect();
        for client in clients {
            let response = client.join().unwrap();
            assert!(String::from_utf8_lossy(&response).ends_with("slow"));
        }
    }

    #[test]
    fn test_connection_fault_does_not_stop_the_server() {
        let routes = RouteTable::new();
        routes.add_handler("GET", "/panic", |_request: &Request, _out: &mut dyn Write| -> io::Result<()> {
            panic!("handler bug")
        });
        routes.add_handler("GET", "/ok", text_handler("still up"));
        let addr = start_server(routes, 1);

        assert!(round_trip(addr, b"GET /panic HTTP/1.1\r\n\r\n").is_empty());
        assert!(round_trip(addr, b"GET //[::1 HTTP/1.1\r\n\r\n").is_empty());
        let response = round_trip(addr, b"GET /ok HTTP/1.1\r\n\r\n");
        assert!(String::from_utf8_lossy(&response).ends_with("still up"));
    }
}
