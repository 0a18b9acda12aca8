use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream, ToSocketAddrs},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use tracing::{debug, error, info, warn};

use crate::{
    error::HttpError,
    http::Context,
    middleware::HeadParser,
    runtime::{
        handler::Handler,
        task::{Next, TaskList},
    },
    settings::ServerConfig,
    transport::{Connection, Listener},
};

/// Pause between accept attempts when retries are enabled.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// A HTTP/1.0 server: a listening socket plus the handler chain run for every connection.
///
/// The chain always starts with a [`HeadParser`]; handlers added with
/// [`Server::use_handler`] run after it in registration order.
#[derive(Debug)]
pub struct Server {
    listener: Listener,
    tasks: TaskList,
    closed: Arc<AtomicBool>,
    accept_retries: u32,
}

/// Stops a running [`Server`] from another thread.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    closed: Arc<AtomicBool>,
    wake_addr: SocketAddr,
}

impl Server {
    /// Listens on `port` on every local interface.
    ///
    /// # Errors
    ///
    /// Returns an `HttpError` if no address can be bound.
    pub fn new(port: u16) -> Result<Self, HttpError> {
        Ok(Self::with_listener(Listener::listen(port)?, HeadParser::new(), 0))
    }

    /// Listens on the first address `addr` resolves to that can be bound.
    ///
    /// # Errors
    ///
    /// Returns an `HttpError` if resolution fails or no address can be bound.
    pub fn bind<A: ToSocketAddrs + fmt::Debug>(addr: A) -> Result<Self, HttpError> {
        Ok(Self::with_listener(Listener::bind(addr)?, HeadParser::new(), 0))
    }

    /// Builds a server from loaded settings.
    ///
    /// # Errors
    ///
    /// Returns an `HttpError` if resolution fails or no address can be bound.
    pub fn from_config(config: &ServerConfig) -> Result<Self, HttpError> {
        let listener = Listener::bind((config.host.as_str(), config.port))?;
        let parser = config
            .max_head_size
            .map_or_else(HeadParser::new, HeadParser::with_limit);
        Ok(Self::with_listener(listener, parser, config.accept_retries))
    }

    fn with_listener(listener: Listener, parser: HeadParser, accept_retries: u32) -> Self {
        let mut tasks = TaskList::new();
        tasks.push(parser);
        Self {
            listener,
            tasks,
            closed: Arc::new(AtomicBool::new(false)),
            accept_retries,
        }
    }

    /// Appends a closure to the handler chain.
    pub fn use_handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Context, Next<'_>) + Send + Sync + 'static,
    {
        self.tasks.push(handler);
        self
    }

    /// Appends a [`Handler`] implementation, such as a bundled middleware, to the chain.
    pub fn use_middleware<H: Handler + 'static>(&mut self, handler: H) -> &mut Self {
        self.tasks.push(handler);
        self
    }

    /// The address the server listens on.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Io` if the socket cannot report its address.
    pub fn local_addr(&self) -> Result<SocketAddr, HttpError> {
        self.listener.local_addr()
    }

    /// Returns a handle that makes [`Server::run`] return.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Io` if the socket cannot report its address.
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle, HttpError> {
        let mut wake_addr = self.local_addr()?;
        if wake_addr.ip().is_unspecified() {
            let loopback = match wake_addr.ip() {
                IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
            };
            wake_addr.set_ip(loopback);
        }
        Ok(ShutdownHandle {
            closed: Arc::clone(&self.closed),
            wake_addr,
        })
    }

    /// Accepts connections and serves each one on its own thread.
    ///
    /// Connection threads are detached. Returns `Ok(())` once a [`ShutdownHandle`] closed
    /// the server; threads still serving connections keep running.
    ///
    /// # Errors
    ///
    /// Returns the accept error once more than `accept_retries` accepts failed in a row.
    pub fn run(self) -> Result<(), HttpError> {
        let Self {
            listener,
            tasks,
            closed,
            accept_retries,
        } = self;
        let tasks = Arc::new(tasks);

        accept_loop(|| listener.accept(), &closed, accept_retries, |connection| {
            let peer = connection.peer_addr();
            let tasks = Arc::clone(&tasks);
            let spawned = thread::Builder::new()
                .name("embedhttp-conn".to_string())
                .spawn(move || serve_connection(connection, &tasks));
            if let Err(e) = spawned {
                error!(cause = %e, %peer, "failed to spawn connection thread, dropping connection");
            }
        })
    }
}

/// Hands every accepted item to `serve` until `closed` is set.
///
/// Up to `retries` consecutive accept failures are tolerated with a pause in between;
/// the count starts over after each successful accept.
fn accept_loop<T, A, S>(mut accept: A, closed: &AtomicBool, retries: u32, mut serve: S) -> Result<(), HttpError>
where
    A: FnMut() -> Result<T, HttpError>,
    S: FnMut(T),
{
    let mut failures = 0;
    loop {
        let accepted = accept();
        if closed.load(Ordering::SeqCst) {
            info!("server closed, no longer accepting connections");
            return Ok(());
        }

        match accepted {
            Ok(item) => {
                failures = 0;
                serve(item);
            }
            Err(e) if failures < retries => {
                failures += 1;
                warn!(cause = %e, attempt = failures, "failed to accept, retrying");
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(e) => {
                error!(cause = %e, "failed to accept, shutting down");
                return Err(e);
            }
        }
    }
}

impl ShutdownHandle {
    /// Marks the server closed and wakes its accept loop.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        if let Err(e) = TcpStream::connect(self.wake_addr) {
            debug!(cause = %e, "wake-up connection failed, server stops on the next accept");
        }
    }

    /// Returns whether [`ShutdownHandle::close`] was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Runs the chain for one connection and writes whatever response it built.
fn serve_connection(connection: Connection, tasks: &TaskList) {
    let peer = connection.peer_addr();
    debug!(%peer, "accepted connection");

    let mut ctx = Context::new(connection);
    tasks.run(&mut ctx);

    match ctx.write() {
        Ok(()) => debug!(%peer, status = %ctx.resp.status, "connection finished"),
        Err(e) => warn!(%peer, cause = %e, "failed to write response"),
    }
}
