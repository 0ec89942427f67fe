use core::net::SocketAddrV4;

/// Datagram send and receive, supplied by the host.
///
/// The node never opens or configures sockets; it only asks for the next
/// waiting datagram and hands back replies. Art-Net is IPv4 only.
pub trait Transport {
    type Error;

    /// Copies the next waiting datagram into `buf`, returning its length and
    /// sender, or `None` when nothing is waiting.
    fn receive(&mut self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddrV4)>, Self::Error>;

    fn send(&mut self, bytes: &[u8], destination: SocketAddrV4) -> Result<(), Self::Error>;
}

/// A non-blocking socket yields `None` when idle; a blocking one waits.
#[cfg(feature = "std")]
impl Transport for std::net::UdpSocket {
    type Error = std::io::Error;

    fn receive(&mut self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddrV4)>, Self::Error> {
        match self.recv_from(buf) {
            Ok((len, std::net::SocketAddr::V4(sender))) => Ok(Some((len, sender))),
            Ok((_, sender)) => {
                log::trace!("ignoring datagram from IPv6 sender {}", sender);
                Ok(None)
            }
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn send(&mut self, bytes: &[u8], destination: SocketAddrV4) -> Result<(), Self::Error> {
        self.send_to(bytes, destination)?;
        Ok(())
    }
}
