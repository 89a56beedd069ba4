use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

use crate::client::Proto;

/// The non-blocking socket underneath one endpoint. Stands in for the
/// "black box" OS-level connect/read/write primitives this library treats
/// as opaque — here, Tokio's reactor.
pub(crate) enum Conn {
    Tcp(TcpStream),
    Udp(UdpSocket),
}

impl Conn {
    pub(crate) async fn connect(proto: Proto, target: SocketAddr) -> io::Result<Self> {
        match proto {
            Proto::Tcp => Ok(Conn::Tcp(TcpStream::connect(target).await?)),
            Proto::Udp => {
                let bind_addr: SocketAddr = if target.is_ipv4() {
                    ([0, 0, 0, 0], 0).into()
                } else {
                    ([0u16; 8], 0).into()
                };
                let sock = UdpSocket::bind(bind_addr).await?;
                sock.connect(target).await?;
                Ok(Conn::Udp(sock))
            }
        }
    }

    pub(crate) async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Conn::Tcp(s) => s.write_all(buf).await,
            Conn::Udp(s) => {
                s.send(buf).await?;
                Ok(())
            }
        }
    }

    pub(crate) async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Conn::Tcp(s) => s.read(buf).await,
            Conn::Udp(s) => s.recv(buf).await,
        }
    }
}
