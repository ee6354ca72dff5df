//! HTTP server implementation.

use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinSet;
use tokio::signal;
use log::{info, warn, error};
use std::net::SocketAddr;

use crate::parser::{HttpRequest, Method, parse_request, request_len};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::handler::{HandlerFn, Reply, ResponseParts, Route, handler_fn};
use crate::server::response::{HttpResponse, StatusCode};
use crate::server::router::{Lookup, Router};

/// Largest request the server buffers before answering 413.
pub const MAX_REQUEST_SIZE: usize = 1024 * 1024;

/// An HTTP server.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    /// Routes and before hooks.
    pub router: Arc<RwLock<Router>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        let router = Router::new(config.default_serializer);
        Self {
            config,
            router: Arc::new(RwLock::new(router)),
        }
    }

    /// Add a route to the server.
    ///
    /// `path` is a pattern such as `/user/:id[.:format]`; captured values are
    /// available through [`HttpRequest::param`].
    pub async fn add_route<F, Fut, R>(&self, path: impl Into<String>, methods: Vec<Method>, handler: F) -> Result<(), Error>
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Error>> + Send + 'static,
        R: Into<Reply> + Send + 'static,
    {
        self.add_handler(path, methods, handler_fn(handler)).await
    }

    /// Add a route with an already boxed handler.
    pub async fn add_handler(&self, path: impl Into<String>, methods: Vec<Method>, handler: HandlerFn) -> Result<(), Error> {
        let route = Route::new(path, methods, handler)?;
        self.add_routes(vec![route]).await;
        Ok(())
    }

    /// Add several routes at once, under a single lock of the route table.
    pub async fn add_routes(&self, routes: Vec<Route>) {
        let mut router = self.router.write().await;
        for route in routes {
            router.add_route(route);
        }
    }

    /// Register a hook that runs before every route handler, in registration order.
    pub async fn add_hook<F>(&self, hook: F)
    where
        F: Fn(&HttpRequest, &mut ResponseParts) -> Result<(), HttpResponse> + Send + Sync + 'static,
    {
        self.router.write().await.add_hook(Arc::new(hook));
    }

    /// Log the registered endpoints.
    async fn display_server_info(&self) {
        let router = self.router.read().await;
        info!("Registered endpoints:");
        for route in router.routes() {
            let methods = route.methods.iter()
                .map(|m| m.as_str())
                .collect::<Vec<&str>>()
                .join(", ");
            info!("  {methods} {}", route.path);
        }
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!("Server listening on http://{addr}", addr = self.config.addr);
        Ok(listener)
    }

    /// Set up a Ctrl+C handler for graceful shutdown.
    fn setup_ctrl_c_handler(shutdown_tx: Arc<mpsc::Sender<()>>, tasks: &mut JoinSet<()>) {
        tasks.spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    let _ = shutdown_tx.send(()).await;
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        });
    }

    /// Handle a new connection.
    fn handle_new_connection(
        mut socket: tokio::net::TcpStream,
        addr: SocketAddr,
        semaphore: Arc<tokio::sync::Semaphore>,
        router: Arc<RwLock<Router>>,
        read_buffer_size: usize,
        tasks: &mut JoinSet<()>,
    ) {
        let permit = match semaphore.try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                tasks.spawn(async move {
                    let response = HttpResponse::new(StatusCode::ServiceUnavailable)
                        .with_content_type("text/plain")
                        .with_body_string("Server is at capacity, please try again later");
                    let _ = socket.write_all(&response.to_bytes()).await;
                });
                return;
            }
        };

        tasks.spawn(async move {
            // Released when the task completes
            let _permit = permit;

            if let Err(e) = Self::handle_connection(&mut socket, router, read_buffer_size).await {
                match e {
                    Error::NotFound(_) | Error::MethodNotAllowed(..) | Error::Halted(_) => {
                        info!("Request from {addr} rejected: {e}");
                    }
                    _ => error!("Error handling connection from {addr}: {e}"),
                }
            }
        });
    }

    /// Handle connection errors. Returns true when the accept loop should stop.
    async fn handle_connection_error(e: std::io::Error) -> bool {
        error!("Error accepting connection: {e}");

        if e.kind() == std::io::ErrorKind::BrokenPipe {
            error!("Critical error accepting connection, shutting down");
            return true;
        }

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        false
    }

    /// Perform graceful shutdown.
    async fn perform_shutdown(tasks: &mut JoinSet<()>) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let shutdown_timeout = tokio::time::Duration::from_secs(30);
        let _ = tokio::time::timeout(shutdown_timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        }).await;

        info!("Server shutdown complete");
    }

    /// Start the server and listen for incoming connections.
    pub async fn start(&self) -> Result<(), Error> {
        self.display_server_info().await;

        let listener = self.setup_listener().await?;
        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.config.max_connections));

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let shutdown_tx = Arc::new(shutdown_tx);

        let mut tasks = JoinSet::new();
        Self::setup_ctrl_c_handler(shutdown_tx.clone(), &mut tasks);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutting down server...");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => {
                            Self::handle_new_connection(
                                socket,
                                addr,
                                semaphore.clone(),
                                self.router.clone(),
                                self.config.read_buffer_size,
                                &mut tasks,
                            );
                        },
                        Err(e) => {
                            if Self::handle_connection_error(e).await {
                                break;
                            }
                        }
                    }
                }
            }
        }

        Self::perform_shutdown(&mut tasks).await;

        Ok(())
    }

    /// Read one request from the socket.
    ///
    /// Stops once the announced body has arrived or the peer stops sending.
    /// Fails with [`Error::PayloadTooLarge`] as soon as the head announces, or
    /// the data reaches, more than [`MAX_REQUEST_SIZE`] bytes.
    async fn read_request(
        socket: &mut (impl AsyncRead + Unpin),
        read_buffer_size: usize,
    ) -> Result<Vec<u8>, Error> {
        let mut buf = vec![0; read_buffer_size.max(1)];
        let mut data = Vec::new();

        loop {
            let n = socket.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);

            match request_len(&data) {
                Some(len) if len > MAX_REQUEST_SIZE => return Err(Error::PayloadTooLarge(len)),
                Some(len) if data.len() >= len => break,
                _ if data.len() > MAX_REQUEST_SIZE => return Err(Error::PayloadTooLarge(data.len())),
                _ => {}
            }
        }

        Ok(data)
    }

    /// Handle a single connection.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        router: Arc<RwLock<Router>>,
        read_buffer_size: usize,
    ) -> Result<(), Error> {
        let data = match Self::read_request(socket, read_buffer_size).await {
            Ok(data) => data,
            Err(Error::PayloadTooLarge(len)) => {
                warn!("Rejecting request of {len} bytes");
                let response = HttpResponse::new(StatusCode::RequestEntityTooLarge)
                    .with_content_type("text/plain")
                    .with_body_string("Request too large");
                socket.write_all(&response.to_bytes()).await?;
                return Err(Error::PayloadTooLarge(len));
            }
            Err(e) => return Err(e),
        };
        if data.is_empty() {
            return Ok(()); // Connection closed
        }

        let request = match parse_request(&data) {
            Ok(req) => req,
            Err(e) => {
                let response = HttpResponse::new(StatusCode::BadRequest)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Error parsing request: {e}"));
                socket.write_all(&response.to_bytes()).await?;
                return Err(Error::ParseError(e));
            }
        };

        let (response, outcome) = Self::dispatch(&router, request).await;
        socket.write_all(&response.to_bytes()).await?;
        outcome
    }

    /// Route a parsed request through hooks and its handler.
    ///
    /// Always yields the response to send; the second element reports whether
    /// the request was served normally.
    pub async fn dispatch(router: &RwLock<Router>, mut request: HttpRequest) -> (HttpResponse, Result<(), Error>) {
        let (handler, hooks, default_serializer) = {
            let router = router.read().await;
            match router.lookup(request.method, request.path_without_query()) {
                Lookup::Found { handler, params } => {
                    request.params = params;
                    (handler, router.hooks().to_vec(), router.default_serializer())
                }
                Lookup::NotFound => {
                    let path = request.path_without_query().to_string();
                    let response = HttpResponse::new(StatusCode::NotFound)
                        .with_content_type("text/plain")
                        .with_body_string(format!("Not found: {path}"));
                    return (response, Err(Error::NotFound(path)));
                }
                Lookup::MethodNotAllowed(allowed) => {
                    let path = request.path_without_query().to_string();
                    let allowed = allowed.iter().map(|m| m.as_str()).collect::<Vec<&str>>().join(", ");
                    let response = HttpResponse::new(StatusCode::MethodNotAllowed)
                        .with_header("Allow", allowed.clone())
                        .with_content_type("text/plain")
                        .with_body_string(format!(
                            "Method {method} not allowed for path: {path}. Allowed methods: {allowed}",
                            method = request.method,
                        ));
                    return (response, Err(Error::MethodNotAllowed(request.method, path)));
                }
            }
        };

        let mut parts = ResponseParts::default();
        for hook in &hooks {
            if let Err(response) = hook(&request, &mut parts) {
                let status = response.status;
                return (response, Err(Error::Halted(status)));
            }
        }

        let reply = match handler(request).await {
            Ok(reply) => reply,
            Err(e) => {
                let response = internal_error(&e);
                return (response, Err(e));
            }
        };

        match parts.render(reply, default_serializer) {
            Ok(response) => (response, Ok(())),
            Err(e) => (internal_error(&e), Err(e)),
        }
    }
}

fn internal_error(e: &Error) -> HttpResponse {
    HttpResponse::new(StatusCode::InternalServerError)
        .with_content_type("text/plain")
        .with_body_string(format!("Internal server error: {e}"))
}
