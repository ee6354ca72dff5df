//! Tests for the HTTP server implementation.

#[cfg(test)]
mod server_tests {
    use std::io::{self, Cursor};
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};
    use serde_json::json;
    use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

    use crate::parser::Method;
    use crate::server::{
        Entity, Error, HttpResponse, HttpServer, PathPattern, ResponseParts, Reply, SerializerKind,
        ServerConfig, StatusCode, MAX_REQUEST_SIZE,
    };

    // Mock TcpStream for testing
    struct MockTcpStream {
        read_data: Cursor<Vec<u8>>,
        write_data: Vec<u8>,
    }

    impl MockTcpStream {
        fn new(read_data: Vec<u8>) -> Self {
            Self {
                read_data: Cursor::new(read_data),
                write_data: Vec::new(),
            }
        }

        fn written_data(&self) -> &[u8] {
            &self.write_data
        }
    }

    impl AsyncRead for MockTcpStream {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let this = self.get_mut();
            let n = std::io::Read::read(&mut this.read_data, buf.initialize_unfilled())?;
            buf.advance(n);
            Poll::Ready(Ok(()))
        }
    }

    impl AsyncWrite for MockTcpStream {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            let this = self.get_mut();
            this.write_data.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    async fn send(server: &HttpServer, request: &[u8], read_buffer_size: usize) -> (Result<(), Error>, String) {
        let mut stream = MockTcpStream::new(request.to_vec());
        let result = HttpServer::handle_connection(&mut stream, server.router.clone(), read_buffer_size).await;
        let response = String::from_utf8_lossy(stream.written_data()).into_owned();
        (result, response)
    }

    fn body_of(response: &str) -> &str {
        response.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or("")
    }

    #[tokio::test]
    async fn test_server_creation() {
        let config = ServerConfig {
            addr: "127.0.0.1:9090".parse().unwrap(),
            max_connections: 100,
            read_buffer_size: 4096,
            default_serializer: SerializerKind::Yaml,
        };

        let server = HttpServer::new(config.clone());
        assert_eq!(server.config.addr, config.addr);
        assert_eq!(server.config.max_connections, 100);
        assert_eq!(server.router.read().await.default_serializer(), SerializerKind::Yaml);

        let defaults = ServerConfig::default();
        assert_eq!(defaults.max_connections, 1024);
        assert_eq!(defaults.default_serializer, SerializerKind::Json);
    }

    #[tokio::test]
    async fn test_add_route() {
        let server = HttpServer::new(ServerConfig::default());

        server.add_route("/test", vec![Method::GET], |_req| async {
            Ok(HttpResponse::new(StatusCode::Ok)
                .with_content_type("text/plain")
                .with_body_string("Test response"))
        }).await.unwrap();

        let router = server.router.read().await;
        assert_eq!(router.routes().len(), 1);
        assert_eq!(router.routes()[0].path, "/test");
        assert_eq!(router.routes()[0].methods, vec![Method::GET]);
    }

    #[tokio::test]
    async fn test_add_route_rejects_bad_pattern() {
        let server = HttpServer::new(ServerConfig::default());

        let result = server.add_route("no-slash", vec![Method::GET], |_req| async {
            Ok(HttpResponse::new(StatusCode::Ok))
        }).await;

        assert!(matches!(result, Err(Error::InvalidPattern(..))));
        assert!(server.router.read().await.routes().is_empty());
    }

    #[tokio::test]
    async fn test_handle_connection_with_valid_request() {
        let server = HttpServer::new(ServerConfig::default());
        server.add_route("/test", vec![Method::GET], |_req| async {
            Ok(HttpResponse::new(StatusCode::Ok)
                .with_content_type("text/plain")
                .with_body_string("Test response"))
        }).await.unwrap();

        let (result, response) = send(&server, b"GET /test HTTP/1.1\r\nHost: localhost\r\n\r\n", 1024).await;

        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Content-Type: text/plain\r\n"));
        assert!(response.contains("Test response"));
    }

    #[tokio::test]
    async fn test_handle_connection_with_not_found() {
        let server = HttpServer::new(ServerConfig::default());
        server.add_route("/test", vec![Method::GET], |_req| async {
            Ok(HttpResponse::new(StatusCode::Ok).with_body_string("Test response"))
        }).await.unwrap();

        let (result, response) = send(&server, b"GET /nonexistent?x=1 HTTP/1.1\r\nHost: localhost\r\n\r\n", 1024).await;

        assert!(matches!(result, Err(Error::NotFound(ref p)) if p == "/nonexistent"));
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(response.contains("Not found: /nonexistent"));
    }

    #[tokio::test]
    async fn test_handle_connection_with_method_not_allowed() {
        let server = HttpServer::new(ServerConfig::default());
        server.add_route("/test", vec![Method::GET], |_req| async {
            Ok(HttpResponse::new(StatusCode::Ok).with_body_string("Test response"))
        }).await.unwrap();

        let (result, response) = send(&server, b"POST /test HTTP/1.1\r\nHost: localhost\r\n\r\n", 1024).await;

        assert!(matches!(result, Err(Error::MethodNotAllowed(Method::POST, _))));
        assert!(response.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
        assert!(response.contains("Method POST not allowed for path: /test"));
        assert!(response.contains("Allow: GET\r\n"));
    }

    #[tokio::test]
    async fn test_handle_connection_with_invalid_request() {
        let server = HttpServer::new(ServerConfig::default());

        let (result, response) = send(&server, b"INVALID REQUEST", 1024).await;

        assert!(matches!(result, Err(Error::ParseError(_))));
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(response.contains("Error parsing request:"));
    }

    #[tokio::test]
    async fn test_handler_error_becomes_500() {
        let server = HttpServer::new(ServerConfig::default());
        server.add_route("/boom", vec![Method::GET], |_req| async {
            Err::<HttpResponse, _>(Error::InternalError("exploded".to_string()))
        }).await.unwrap();

        let (result, response) = send(&server, b"GET /boom HTTP/1.1\r\nHost: localhost\r\n\r\n", 1024).await;

        assert!(matches!(result, Err(Error::InternalError(_))));
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(response.contains("exploded"));
    }

    #[tokio::test]
    async fn test_route_with_multiple_methods() {
        let server = HttpServer::new(ServerConfig::default());
        server.add_route("/multi", vec![Method::GET, Method::POST], |req| async move {
            match req.method {
                Method::GET => Ok(HttpResponse::new(StatusCode::Ok).with_body_string("GET response")),
                Method::POST => Ok(HttpResponse::new(StatusCode::Created).with_body_string("POST response")),
                _ => Err(Error::InternalError("Unexpected method".to_string())),
            }
        }).await.unwrap();

        let (get_result, get_response) = send(&server, b"GET /multi HTTP/1.1\r\nHost: localhost\r\n\r\n", 1024).await;
        assert!(get_result.is_ok());
        assert!(get_response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(get_response.contains("GET response"));

        let (post_result, post_response) = send(&server, b"POST /multi HTTP/1.1\r\nHost: localhost\r\n\r\n", 1024).await;
        assert!(post_result.is_ok());
        assert!(post_response.starts_with("HTTP/1.1 201 Created\r\n"));
        assert!(post_response.contains("POST response"));
    }

    #[tokio::test]
    async fn test_route_captures_reach_handler() {
        let server = HttpServer::new(ServerConfig::default());
        server.add_route("/user/:id[.:format]", vec![Method::GET], |req| async move {
            let id = req.param("id").cloned().unwrap_or_default();
            let format = req.param("format").cloned().unwrap_or_else(|| "none".to_string());
            Ok(HttpResponse::new(StatusCode::Ok).with_body_string(format!("{id}/{format}")))
        }).await.unwrap();

        let (_, response) = send(&server, b"GET /user/7.json HTTP/1.1\r\nHost: localhost\r\n\r\n", 1024).await;
        assert_eq!(body_of(&response), "7/json");

        let (_, response) = send(&server, b"GET /user/7 HTTP/1.1\r\nHost: localhost\r\n\r\n", 1024).await;
        assert_eq!(body_of(&response), "7/none");
    }

    #[tokio::test]
    async fn test_body_spanning_several_reads() {
        let server = HttpServer::new(ServerConfig::default());
        server.add_route("/echo", vec![Method::POST], |req| async move {
            Ok(HttpResponse::new(StatusCode::Ok).with_body_bytes(req.body))
        }).await.unwrap();

        let payload = "x".repeat(300);
        let request = format!(
            "POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: {len}\r\n\r\n{payload}",
            len = payload.len()
        );

        // A small buffer forces several reads
        let (result, response) = send(&server, request.as_bytes(), 16).await;
        assert!(result.is_ok());
        assert_eq!(body_of(&response), payload);
    }

    #[tokio::test]
    async fn test_oversized_request_is_rejected() {
        let server = HttpServer::new(ServerConfig::default());
        let len = MAX_REQUEST_SIZE + 1;
        let mut request = format!("POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: {len}\r\n\r\n").into_bytes();
        request.extend(std::iter::repeat(b'a').take(len));

        let (result, response) = send(&server, &request, 64 * 1024).await;
        assert!(matches!(result, Err(Error::PayloadTooLarge(_))));
        assert!(response.starts_with("HTTP/1.1 413 Request Entity Too Large\r\n"));
    }

    #[tokio::test]
    async fn test_announced_oversized_body_is_rejected_without_waiting() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let server = HttpServer::new(ServerConfig::default());
        let (mut client, mut connection) = tokio::io::duplex(64 * 1024);
        client
            .write_all(b"POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5000000\r\n\r\nabc")
            .await
            .unwrap();

        // The client keeps its end open; the server must not wait for the body
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            HttpServer::handle_connection(&mut connection, server.router.clone(), 1024),
        )
        .await
        .expect("server waited for a body it will never accept");
        drop(connection);

        let mut out = Vec::new();
        client.read_to_end(&mut out).await.unwrap();
        let response = String::from_utf8_lossy(&out);

        assert!(matches!(result, Err(Error::PayloadTooLarge(len)) if len > MAX_REQUEST_SIZE));
        assert!(response.starts_with("HTTP/1.1 413 Request Entity Too Large\r\n"));
    }

    #[tokio::test]
    async fn test_unrepresentable_content_length_is_rejected() {
        let server = HttpServer::new(ServerConfig::default());
        let request = b"POST /x HTTP/1.1\r\nHost: a\r\nContent-Length: 18446744073709551615\r\n\r\n";

        let (result, response) = send(&server, request, 1024).await;
        assert!(matches!(result, Err(Error::PayloadTooLarge(_))));
        assert!(response.starts_with("HTTP/1.1 413 Request Entity Too Large\r\n"));
    }

    #[tokio::test]
    async fn test_bodiless_statuses_send_no_body() {
        let server = HttpServer::new(ServerConfig::default());
        server.add_route("/gone", vec![Method::DELETE], |_req| async {
            Ok(Entity::new(StatusCode::NoContent, serde_json::Value::Null))
        }).await.unwrap();
        server.add_hook(|_req, parts| {
            parts.set_content_type("text/x-yaml");
            parts.set_header("X-Trace", "7");
            Ok(())
        }).await;

        let (result, response) = send(&server, b"DELETE /gone HTTP/1.1\r\nHost: localhost\r\n\r\n", 1024).await;

        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 204 No Content\r\n"));
        assert!(response.contains("X-Trace: 7\r\n"));
        assert!(!response.contains("Content-Length"));
        assert!(!response.contains("Content-Type"));
        assert_eq!(body_of(&response), "");

        assert!(!StatusCode::Continue.allows_body());
        assert!(!StatusCode::NotModified.allows_body());
        assert!(StatusCode::Ok.allows_body());
        assert!(StatusCode::NotFound.allows_body());
    }

    #[tokio::test]
    async fn test_handler_can_build_json_response() {
        let server = HttpServer::new(ServerConfig::default());
        server.add_route("/raw", vec![Method::GET], |_req| async {
            HttpResponse::new(StatusCode::Ok).with_json(&json!({"raw": true}))
        }).await.unwrap();

        let (result, response) = send(&server, b"GET /raw HTTP/1.1\r\nHost: localhost\r\n\r\n", 1024).await;
        assert!(result.is_ok());
        assert!(response.contains("Content-Type: application/json\r\n"));
        assert_eq!(body_of(&response), r#"{"raw":true}"#);
    }

    #[tokio::test]
    async fn test_entity_reply_uses_default_serializer() {
        let server = HttpServer::new(ServerConfig::default());
        server.add_route("/thing", vec![Method::GET], |_req| async {
            Ok(Entity::new(StatusCode::Accepted, json!({"name": "thing"})))
        }).await.unwrap();

        let (result, response) = send(&server, b"GET /thing HTTP/1.1\r\nHost: localhost\r\n\r\n", 1024).await;

        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 202 Accepted\r\n"));
        assert!(response.contains("Content-Type: application/json\r\n"));
        assert_eq!(body_of(&response), r#"{"name":"thing"}"#);
    }

    #[tokio::test]
    async fn test_hooks_run_in_order_and_can_halt() {
        let server = HttpServer::new(ServerConfig::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let handler_calls = calls.clone();
        server.add_route("/guarded", vec![Method::GET], move |_req| {
            let handler_calls = handler_calls.clone();
            async move {
                handler_calls.fetch_add(1, Ordering::SeqCst);
                Ok(json!({"ok": true}))
            }
        }).await.unwrap();

        server.add_hook(|_req, parts| {
            parts.set_serializer(SerializerKind::Yaml);
            parts.set_header("X-First", "1");
            Ok(())
        }).await;
        server.add_hook(|req, _parts| {
            if req.has_query_param("deny") {
                return Err(HttpResponse::new(StatusCode::Forbidden).with_body_string("denied"));
            }
            Ok(())
        }).await;

        let (result, response) = send(&server, b"GET /guarded HTTP/1.1\r\nHost: localhost\r\n\r\n", 1024).await;
        assert!(result.is_ok());
        assert!(response.contains("Content-Type: text/x-yaml\r\n"));
        assert!(response.contains("X-First: 1\r\n"));
        assert_eq!(body_of(&response), "ok: true\n");

        let (result, response) = send(&server, b"GET /guarded?deny HTTP/1.1\r\nHost: localhost\r\n\r\n", 1024).await;
        assert!(matches!(result, Err(Error::Halted(StatusCode::Forbidden))));
        assert!(response.starts_with("HTTP/1.1 403 Forbidden\r\n"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_render_keeps_handler_headers() {
        let mut parts = ResponseParts::default();
        parts.set_content_type("application/json");
        parts.set_header("X-Extra", "yes");

        let reply = Reply::from(HttpResponse::new(StatusCode::Ok).with_content_type("text/html"));
        let response = parts.render(reply, SerializerKind::Json).unwrap();

        assert_eq!(response.header("content-type").unwrap(), "text/html");
        assert_eq!(response.header("X-Extra").unwrap(), "yes");
    }

    #[test]
    fn test_status_code_table() {
        assert_eq!(StatusCode::from_u16(404), Some(StatusCode::NotFound));
        assert_eq!(StatusCode::from_u16(418).unwrap().reason_phrase(), "I'm a teapot");
        assert_eq!(StatusCode::from_u16(299), None);
        assert_eq!(StatusCode::Created.to_string(), "201 Created");
        assert!(StatusCode::BadRequest.is_error());
        assert!(!StatusCode::TemporaryRedirect.is_error());

        for pair in StatusCode::ALL.windows(2) {
            assert!(pair[0].as_u16() < pair[1].as_u16());
        }
    }

    #[test]
    fn test_path_pattern_matching() {
        let pattern = PathPattern::parse("/user/:id[.:format]").unwrap();
        let params = pattern.matches("/user/1.5.yml").unwrap();
        assert_eq!(params["id"], "1.5");
        assert_eq!(params["format"], "yml");
        assert_eq!(pattern.matches("/user/1").unwrap().get("format"), None);
        assert!(pattern.matches("/user/").is_none());
        assert!(pattern.matches("/user/1/extra").is_none());
        assert!(pattern.matches("/users/1").is_none());

        let collection = PathPattern::parse("/user[.:format]").unwrap();
        assert_eq!(collection.matches("/user.json").unwrap()["format"], "json");
        assert!(collection.matches("/user").unwrap().is_empty());
        assert!(collection.matches("/username").is_none());

        let required = PathPattern::parse("/report/:id.:format").unwrap();
        assert!(required.matches("/report/3").is_none());
        assert_eq!(required.matches("/report/3.dump").unwrap()["format"], "dump");

        assert!(PathPattern::parse("/").unwrap().matches("/").is_some());
    }

    #[test]
    fn test_path_pattern_errors() {
        for bad in ["user", "/user/:", "/a/:id/:id", "/[.:format]", "/user/:id[.:]", "/x]"] {
            assert!(
                matches!(PathPattern::parse(bad), Err(Error::InvalidPattern(..))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_serializer_ids() {
        assert_eq!("JSON".parse::<SerializerKind>().unwrap(), SerializerKind::Json);
        assert_eq!("yaml".parse::<SerializerKind>().unwrap(), SerializerKind::Yaml);
        assert_eq!("Dumper".parse::<SerializerKind>().unwrap(), SerializerKind::Dumper);
        assert!(matches!("XML".parse::<SerializerKind>(), Err(Error::UnknownSerializer(ref s)) if s == "XML"));
        assert_eq!(SerializerKind::Dumper.content_type(), "text/x-data-dumper");
    }

    #[test]
    fn test_dumper_output() {
        let value = json!({"type": "test", "item": 1});
        let out = SerializerKind::Dumper.serialize(&value).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "$VAR1 = {\n  'item' => 1,\n  'type' => 'test'\n};\n"
        );

        let nested = json!({"list": [1.5, null, "it's"], "empty": {}, "flag": false});
        let out = String::from_utf8(SerializerKind::Dumper.serialize(&nested).unwrap()).unwrap();
        assert_eq!(
            out,
            "$VAR1 = {\n  'empty' => {},\n  'flag' => '',\n  'list' => [\n    '1.5',\n    undef,\n    'it\\'s'\n  ]\n};\n"
        );

        assert!(matches!(
            SerializerKind::Dumper.deserialize(b"$VAR1 = 1;"),
            Err(Error::DeserializeUnsupported("Dumper"))
        ));
    }

    #[test]
    fn test_yaml_round_trip_of_request_body() {
        let value = SerializerKind::Yaml.deserialize(b"item: 1\ntype: test\n").unwrap();
        assert_eq!(value, json!({"item": 1, "type": "test"}));
    }
}
