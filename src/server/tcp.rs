//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Listener y ciclo de vida del gateway. Un hilo acceptor dedicado empuja
//! cada conexión aceptada a la cola de despacho acotada; el pool fijo de
//! workers las procesa de punta a punta. El apagado es determinista: un
//! stop flag más una conexión loopback desbloquean el `accept`, el cierre
//! de la cola drena y joinea el pool.

use crate::config::Config;
use crate::dispatch::{BoundedQueue, WorkerPool};
use crate::gateway::app::Application;
use crate::metrics::MetricsCollector;
use crate::server::connection::Connection;
use crate::server::worker::Gateway;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Socket de escucha del gateway
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Crea el socket, habilita SO_REUSEADDR, hace bind y listen con el
    /// backlog configurado
    ///
    /// Fallar acá es fatal para el startup; no hay reintentos.
    pub fn bind(config: &Config) -> io::Result<Self> {
        let addr: SocketAddr = config
            .address()
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("cannot resolve bind address: {}", config.address()),
                )
            })?;

        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.listen(config.backlog)?;

        Ok(Self {
            inner: socket.into(),
        })
    }

    /// Dirección local efectiva (relevante con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Bloquea hasta aceptar la próxima conexión
    pub fn accept(&self) -> io::Result<Connection> {
        let (stream, peer_addr) = self.inner.accept()?;
        Ok(Connection::new(stream, peer_addr))
    }
}

/// Gateway HTTP/1.0 concurrente
pub struct Server {
    config: Config,
    app: Arc<dyn Application>,
    metrics: Arc<MetricsCollector>,
}

impl Server {
    /// Crea el servidor con la aplicación dada
    pub fn new(config: Config, app: Arc<dyn Application>) -> Self {
        Self::with_metrics(config, app, Arc::new(MetricsCollector::new()))
    }

    /// Crea el servidor compartiendo un collector de métricas externo
    /// (útil cuando la aplicación también quiere leerlo)
    pub fn with_metrics(
        config: Config,
        app: Arc<dyn Application>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            config,
            app,
            metrics,
        }
    }

    /// Collector de métricas del servidor
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        Arc::clone(&self.metrics)
    }

    /// Hace bind, levanta el pool de workers y el hilo acceptor
    ///
    /// Retorna un handle para consultar la dirección efectiva y apagar
    /// el servidor de forma determinista.
    pub fn start(self) -> io::Result<ServerHandle> {
        let listener = Listener::bind(&self.config)?;
        let local_addr = listener.local_addr()?;

        println!("[+] Gateway escuchando en {}", local_addr);

        let queue = Arc::new(BoundedQueue::new(self.config.queue_capacity));

        let gateway = Arc::new(Gateway::new(
            Arc::clone(&self.app),
            self.config.host.clone(),
            local_addr.port(),
            Arc::clone(&self.metrics),
        ));

        let pool = WorkerPool::start(self.config.workers, Arc::clone(&queue), move |conn| {
            gateway.handle_connection(conn)
        });

        let stop = Arc::new(AtomicBool::new(false));

        let acceptor = thread::spawn({
            let queue = Arc::clone(&queue);
            let stop = Arc::clone(&stop);
            move || Self::accept_loop(listener, queue, stop)
        });

        Ok(ServerHandle {
            local_addr,
            stop,
            queue,
            pool,
            acceptor,
        })
    }

    /// Arranca el servidor y bloquea para siempre
    pub fn run(self) -> io::Result<()> {
        let handle = self.start()?;
        handle.wait();
        Ok(())
    }

    /// Loop del acceptor: único productor de la cola de despacho
    ///
    /// El push bloquea cuando la cola está llena (backpressure): las
    /// conexiones quedan esperando en el backlog del SO.
    fn accept_loop(
        listener: Listener,
        queue: Arc<BoundedQueue<Connection>>,
        stop: Arc<AtomicBool>,
    ) {
        while !stop.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok(conn) => {
                    // La conexión loopback del shutdown solo desbloquea
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }

                    if queue.push(conn).is_err() {
                        // Cola cerrada: la conexión se descarta y cierra
                        break;
                    }
                }
                Err(e) => {
                    // Un peer reseteando antes de completar no detiene
                    // el servidor
                    eprintln!("   ❌ Error al aceptar conexión: {}", e);
                }
            }
        }
    }
}

/// Handle de un servidor en ejecución
pub struct ServerHandle {
    local_addr: SocketAddr,
    stop: Arc<AtomicBool>,
    queue: Arc<BoundedQueue<Connection>>,
    pool: WorkerPool,
    acceptor: JoinHandle<()>,
}

impl ServerHandle {
    /// Dirección local efectiva del listener
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Apaga el servidor y joinea acceptor y workers
    ///
    /// Las conexiones ya encoladas se terminan de procesar (la cola se
    /// drena antes de que los workers salgan).
    pub fn shutdown(self) {
        self.stop.store(true, Ordering::Relaxed);

        // Conexión breve a nosotros mismos para desbloquear accept()
        let _ = TcpStream::connect(self.local_addr);
        let _ = self.acceptor.join();

        self.queue.close();
        self.pool.join();

        println!("[*] Gateway apagado");
    }

    /// Bloquea hasta que el acceptor termine (en la práctica, para siempre)
    pub fn wait(self) {
        let _ = self.acceptor.join();
        self.queue.close();
        self.pool.join();
    }
}
