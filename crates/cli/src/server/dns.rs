use rotor_dns_infrastructure::dns::{DnsServerHandler, Transport};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const UDP_RECV_BUFFER: usize = 4096;

pub async fn start_dns_server(
    bind_addr: &str,
    handler: DnsServerHandler,
    tcp_idle_timeout: Duration,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let socket_addr: SocketAddr = bind_addr.parse()?;
    let listeners = DnsListeners::bind(socket_addr)?;

    info!(bind_address = %socket_addr, "DNS server ready (UDP + TCP)");

    listeners
        .serve(Arc::new(handler), tcp_idle_timeout, shutdown)
        .await;
    Ok(())
}

/// The UDP socket and TCP listener sharing one address.
pub struct DnsListeners {
    udp: UdpSocket,
    tcp: TcpListener,
}

impl DnsListeners {
    pub fn bind(socket_addr: SocketAddr) -> anyhow::Result<Self> {
        let domain = if socket_addr.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };

        Ok(Self {
            udp: create_udp_socket(domain, socket_addr)?,
            tcp: create_tcp_listener(domain, socket_addr)?,
        })
    }

    #[cfg(test)]
    fn local_addrs(&self) -> io::Result<(SocketAddr, SocketAddr)> {
        Ok((self.udp.local_addr()?, self.tcp.local_addr()?))
    }

    /// Runs both listeners until `shutdown` fires.
    pub async fn serve(
        self,
        handler: Arc<DnsServerHandler>,
        tcp_idle_timeout: Duration,
        shutdown: CancellationToken,
    ) {
        let udp = tokio::spawn(run_udp(
            Arc::new(self.udp),
            handler.clone(),
            shutdown.clone(),
        ));
        let tcp = tokio::spawn(run_tcp(self.tcp, handler, tcp_idle_timeout, shutdown));

        for (name, task) in [("udp", udp), ("tcp", tcp)] {
            if let Err(e) = task.await {
                error!(listener = name, error = %e, "DNS listener task failed");
            }
        }
        info!("DNS listeners stopped");
    }
}

async fn run_udp(
    socket: Arc<UdpSocket>,
    handler: Arc<DnsServerHandler>,
    shutdown: CancellationToken,
) {
    let mut recv_buf = [0u8; UDP_RECV_BUFFER];

    loop {
        let (n, from) = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = socket.recv_from(&mut recv_buf) => match received {
                Ok(received) => received,
                // ICMP port unreachable from an earlier reply surfaces here on some platforms.
                Err(e) if e.kind() == io::ErrorKind::ConnectionReset => continue,
                Err(e) => {
                    error!(error = %e, "UDP recv error");
                    continue;
                }
            },
        };

        let query: Arc<[u8]> = Arc::from(&recv_buf[..n]);
        let handler = handler.clone();
        let socket = socket.clone();
        tokio::spawn(async move {
            if let Some(response) = handler.handle_raw(&query, from.ip(), Transport::Udp).await {
                if let Err(e) = socket.send_to(&response, from).await {
                    debug!(error = %e, client = %from, "Failed to send UDP reply");
                }
            }
        });
    }
}

async fn run_tcp(
    listener: TcpListener,
    handler: Arc<DnsServerHandler>,
    idle_timeout: Duration,
    shutdown: CancellationToken,
) {
    loop {
        let (stream, peer) = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "TCP accept error");
                    continue;
                }
            },
        };

        let handler = handler.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => {}
                result = serve_tcp_connection(stream, peer, handler, idle_timeout) => {
                    if let Err(e) = result {
                        debug!(error = %e, client = %peer, "TCP connection closed with error");
                    }
                }
            }
        });
    }
}

/// Serves length-prefixed messages until the peer closes or goes idle.
async fn serve_tcp_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<DnsServerHandler>,
    idle_timeout: Duration,
) -> io::Result<()> {
    loop {
        let mut len_buf = [0u8; 2];
        match tokio::time::timeout(idle_timeout, stream.read_exact(&mut len_buf)).await {
            Err(_) => {
                debug!(client = %peer, "TCP connection idle, closing");
                return Ok(());
            }
            Ok(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
            Ok(Err(e)) => return Err(e),
            Ok(Ok(_)) => {}
        }

        let len = u16::from_be_bytes(len_buf) as usize;
        if len == 0 {
            return Ok(());
        }

        let mut message = vec![0u8; len];
        tokio::time::timeout(idle_timeout, stream.read_exact(&mut message))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "TCP read timed out"))??;

        let Some(response) = handler.handle_raw(&message, peer.ip(), Transport::Tcp).await else {
            continue;
        };
        let Ok(response_len) = u16::try_from(response.len()) else {
            warn!(client = %peer, size = response.len(), "Reply too large for TCP framing");
            return Ok(());
        };

        let mut framed = Vec::with_capacity(response.len() + 2);
        framed.extend_from_slice(&response_len.to_be_bytes());
        framed.extend_from_slice(&response);
        stream.write_all(&framed).await?;
    }
}

fn create_udp_socket(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;
    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}

fn create_tcp_listener(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(true)?;
    let std_listener: std::net::TcpListener = socket.into();
    Ok(TcpListener::from_std(std_listener)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
    use hickory_proto::rr::{Name, RData, RecordType};
    use rotor_dns_application::use_cases::{HandleDnsQueryUseCase, ResolveQueryUseCase};
    use rotor_dns_domain::config::{DatabaseConfig, ZoneConfig};
    use rotor_dns_domain::ZoneDefaults;
    use rotor_dns_infrastructure::database::create_pool;
    use rotor_dns_infrastructure::repositories::SqliteStoredRecordRepository;
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    async fn start_test_server() -> (SocketAddr, SocketAddr, CancellationToken) {
        let pool = create_pool("sqlite::memory:", &DatabaseConfig::default())
            .await
            .unwrap();
        let zone_cfg = ZoneConfig {
            server_ip: "192.0.2.53".to_string(),
            server_domain: "rotor.test".to_string(),
            ..ZoneConfig::default()
        };
        let zone = Arc::new(ZoneDefaults::from_config(&zone_cfg, 1).unwrap());
        let resolver = ResolveQueryUseCase::new(
            Arc::new(SqliteStoredRecordRepository::new(pool)),
            zone.clone(),
        );
        let use_case = Arc::new(HandleDnsQueryUseCase::new(Arc::new(resolver)));
        let handler = Arc::new(DnsServerHandler::new(use_case, zone));

        let listeners = DnsListeners::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let (udp_addr, tcp_addr) = listeners.local_addrs().unwrap();
        let shutdown = CancellationToken::new();
        tokio::spawn(listeners.serve(handler, Duration::from_secs(2), shutdown.clone()));

        (udp_addr, tcp_addr, shutdown)
    }

    fn a_query(id: u16) -> Vec<u8> {
        let mut message = Message::new();
        message
            .set_id(id)
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query);
        message.add_query(Query::query(
            Name::from_str("www.rotor.test.").unwrap(),
            RecordType::A,
        ));
        message.to_vec().unwrap()
    }

    fn assert_server_ip_answer(reply: &Message, id: u16) {
        assert_eq!(reply.id(), id);
        assert_eq!(reply.response_code(), ResponseCode::NoError);
        assert_eq!(reply.answers().len(), 1);
        match reply.answers()[0].data() {
            RData::A(a) => assert_eq!(a.0, Ipv4Addr::new(192, 0, 2, 53)),
            other => panic!("expected A, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_udp_round_trip() {
        let (udp_addr, _, shutdown) = start_test_server().await;

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(&a_query(0x0101), udp_addr).await.unwrap();

        let mut buf = [0u8; 512];
        let (n, _) = tokio::time::timeout(Duration::from_secs(2), client.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();

        assert_server_ip_answer(&Message::from_vec(&buf[..n]).unwrap(), 0x0101);
        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_tcp_round_trip_with_two_messages() {
        let (_, tcp_addr, shutdown) = start_test_server().await;
        let mut stream = TcpStream::connect(tcp_addr).await.unwrap();

        for id in [0x0201u16, 0x0202] {
            let query = a_query(id);
            stream
                .write_all(&(query.len() as u16).to_be_bytes())
                .await
                .unwrap();
            stream.write_all(&query).await.unwrap();

            let mut len_buf = [0u8; 2];
            stream.read_exact(&mut len_buf).await.unwrap();
            let mut reply = vec![0u8; u16::from_be_bytes(len_buf) as usize];
            stream.read_exact(&mut reply).await.unwrap();

            assert_server_ip_answer(&Message::from_vec(&reply).unwrap(), id);
        }

        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_idle_tcp_connection_is_closed() {
        let (_, tcp_addr, shutdown) = start_test_server().await;
        let mut stream = TcpStream::connect(tcp_addr).await.unwrap();

        let mut buf = [0u8; 1];
        let read = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf))
            .await
            .expect("server closes idle connection");
        assert_eq!(read.unwrap_or(0), 0);

        shutdown.cancel();
    }
}
