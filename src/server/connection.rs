//! # Handle de Conexión
//! src/server/connection.rs
//!
//! Una conexión aceptada es un handle de propiedad exclusiva: pasa del
//! acceptor a la cola y de ahí a exactamente un worker, que la cierra
//! exactamente una vez. Cerrar una conexión ya cerrada es un no-op.

use std::io::{self, BufReader};
use std::net::{Shutdown, SocketAddr, TcpStream};

/// Conexión TCP aceptada, con cierre idempotente
pub struct Connection {
    stream: Option<TcpStream>,
    peer_addr: SocketAddr,
}

impl Connection {
    /// Envuelve un stream aceptado junto con la dirección del peer
    pub fn new(stream: TcpStream, peer_addr: SocketAddr) -> Self {
        Self {
            stream: Some(stream),
            peer_addr,
        }
    }

    /// Dirección del peer remoto
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Stream de lectura bufferizado sobre la conexión
    pub fn reader(&self) -> io::Result<BufReader<TcpStream>> {
        match &self.stream {
            Some(stream) => Ok(BufReader::new(stream.try_clone()?)),
            None => Err(already_closed()),
        }
    }

    /// Stream de escritura sobre la conexión
    pub fn writer(&self) -> io::Result<TcpStream> {
        match &self.stream {
            Some(stream) => stream.try_clone(),
            None => Err(already_closed()),
        }
    }

    /// Cierra la conexión liberando ambos sentidos del socket
    ///
    /// Idempotente: sobre una conexión ya cerrada no hace nada.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            // El peer pudo haber cerrado primero; el shutdown puede fallar
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    /// Indica si la conexión ya fue cerrada
    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }
}

impl Drop for Connection {
    /// Los recursos se liberan en todo camino de salida
    fn drop(&mut self) {
        self.close();
    }
}

fn already_closed() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "connection already closed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Helper: crea un par (conexión aceptada, stream del cliente)
    fn connection_pair() -> (Connection, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().unwrap();

        let client = thread::spawn(move || TcpStream::connect(addr).unwrap());

        let (stream, peer_addr) = listener.accept().unwrap();
        (Connection::new(stream, peer_addr), client.join().unwrap())
    }

    #[test]
    fn test_reader_writer_roundtrip() {
        let (conn, mut client) = connection_pair();

        client.write_all(b"ping").unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        let mut reader = conn.reader().unwrap();
        let mut received = Vec::new();
        reader.read_to_end(&mut received).unwrap();
        assert_eq!(received, b"ping");

        let mut writer = conn.writer().unwrap();
        writer.write_all(b"pong").unwrap();
        drop(writer);
        drop(conn);

        let mut answer = Vec::new();
        client.read_to_end(&mut answer).unwrap();
        assert_eq!(answer, b"pong");
    }

    #[test]
    fn test_close_is_idempotent() {
        let (mut conn, _client) = connection_pair();

        assert!(!conn.is_closed());

        conn.close();
        assert!(conn.is_closed());

        // Cerrar de nuevo es un no-op, no un error
        conn.close();
        assert!(conn.is_closed());
    }

    #[test]
    fn test_reader_after_close_fails() {
        let (mut conn, _client) = connection_pair();
        conn.close();

        assert!(conn.reader().is_err());
        assert!(conn.writer().is_err());
    }

    #[test]
    fn test_peer_addr() {
        let (conn, client) = connection_pair();
        assert_eq!(conn.peer_addr(), client.local_addr().unwrap());
    }
}
