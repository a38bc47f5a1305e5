//! Underlying transport protocols.
//!
//! These traits describe the transport primitives the resolver needs:
//! connecting a datagram socket to a peer, sending one datagram, and
//! receiving one datagram, all asynchronously. Tests provide their own
//! implementations to stand in for the network.

use core::future::Future;
use core::pin::Pin;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;

/// How many times do we try a new random port if we get 'address in use.'
const RETRY_RANDOM_PORT: usize = 10;

//------------ AsyncConnect --------------------------------------------------

/// Establish a connection to a server asynchronously.
pub trait AsyncConnect {
    /// The type of an established connection.
    type Connection;

    /// The future establishing the connection.
    type Fut: Future<Output = Result<Self::Connection, io::Error>> + Send;

    /// Returns a future establishing a connection to the given address.
    fn connect(&self, addr: SocketAddr) -> Self::Fut;
}

//------------ AsyncDgramRecv ------------------------------------------------

/// Receive a datagram packet asynchronously.
pub trait AsyncDgramRecv {
    /// The future performing the receive operation.
    type Fut: Future<Output = Result<Vec<u8>, io::Error>> + Send;

    /// Returns a future that receives a datagram into the given buffer.
    ///
    /// The buffer is returned truncated to the length of the datagram.
    fn recv(&self, buf: Vec<u8>) -> Self::Fut;
}

//------------ AsyncDgramSend ------------------------------------------------

/// Send a datagram packet asynchronously.
pub trait AsyncDgramSend {
    /// The future performing the send operation.
    type Fut: Future<Output = Result<usize, io::Error>> + Send;

    /// Returns a future that sends the buffer as one datagram.
    fn send(&self, buf: &[u8]) -> Self::Fut;
}

//------------ UdpConnect ----------------------------------------------------

/// Create new UDP 'connections.'
#[derive(Clone, Copy, Debug, Default)]
pub struct UdpConnect;

impl UdpConnect {
    /// Creates a new UDP connector.
    pub fn new() -> Self {
        UdpConnect
    }
}

impl AsyncConnect for UdpConnect {
    type Connection = UdpDgram;
    type Fut = Pin<
        Box<
            dyn Future<Output = Result<Self::Connection, std::io::Error>>
                + Send,
        >,
    >;

    fn connect(&self, addr: SocketAddr) -> Self::Fut {
        Box::pin(UdpDgram::new(addr))
    }
}

//------------ UdpDgram ------------------------------------------------------

/// A single UDP 'connection.'
#[derive(Debug)]
pub struct UdpDgram {
    /// Underlying UDP socket.
    sock: Arc<UdpSocket>,
}

impl UdpDgram {
    /// Creates a new UdpDgram object connected to the given address.
    async fn new(addr: SocketAddr) -> Result<Self, io::Error> {
        let sock = Self::udp_bind(addr.is_ipv4()).await?;
        sock.connect(addr).await?;
        Ok(Self {
            sock: Arc::new(sock),
        })
    }

    /// Bind to a random local UDP port.
    async fn udp_bind(v4: bool) -> Result<UdpSocket, io::Error> {
        let mut i = 0;
        loop {
            let local: SocketAddr = if v4 {
                ([0u8; 4], 0).into()
            } else {
                ([0u16; 8], 0).into()
            };
            match UdpSocket::bind(&local).await {
                Ok(sock) => return Ok(sock),
                Err(err) => {
                    if i == RETRY_RANDOM_PORT {
                        return Err(err);
                    } else {
                        i += 1
                    }
                }
            }
        }
    }
}

impl AsyncDgramRecv for UdpDgram {
    type Fut =
        Pin<Box<dyn Future<Output = Result<Vec<u8>, io::Error>> + Send>>;

    fn recv(&self, mut buf: Vec<u8>) -> Self::Fut {
        let sock = self.sock.clone();
        Box::pin(async move {
            let len = sock.recv(&mut buf).await?;
            buf.truncate(len);
            Ok(buf)
        })
    }
}

impl AsyncDgramSend for UdpDgram {
    type Fut = Pin<Box<dyn Future<Output = Result<usize, io::Error>> + Send>>;

    fn send(&self, buf: &[u8]) -> Self::Fut {
        let sock = self.sock.clone();
        let buf = buf.to_vec();
        Box::pin(async move { sock.send(&buf).await })
    }
}
