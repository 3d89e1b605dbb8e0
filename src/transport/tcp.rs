use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::config::SessionConfig;
use crate::transport::Transport;

/// Length of the big-endian frame length prefix.
const HEADER_LEN: usize = 4;

/// Read chunk size.
const READ_CHUNK: usize = 4096;

/// Length-prefixed frames over a TCP stream.
pub struct TcpTransport {
    stream: TcpStream,
    send_timeout: Duration,
    max_frame_size: u32,
    buffer: Vec<u8>,
}

fn map_io(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset => {
            anyhow::anyhow!("Connection closed by peer")
        }
        _ => anyhow::anyhow!("I/O error: {}", e),
    }
}

impl TcpTransport {
    pub fn new(stream: TcpStream, config: &SessionConfig) -> Self {
        Self {
            stream,
            send_timeout: config.send_timeout,
            max_frame_size: config.max_frame_size,
            buffer: Vec::new(),
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A, config: &SessionConfig) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream, config))
    }

    /// Split one complete frame off the read buffer.
    fn take_frame(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        if self.buffer.len() < HEADER_LEN {
            return Ok(None);
        }
        let mut len_buf = [0u8; HEADER_LEN];
        len_buf.copy_from_slice(&self.buffer[..HEADER_LEN]);
        let len = u32::from_be_bytes(len_buf);
        if len == 0 {
            anyhow::bail!("Invalid frame length: 0");
        }
        if len > self.max_frame_size {
            anyhow::bail!("Frame too large: {} bytes (max: {})", len, self.max_frame_size);
        }
        let end = HEADER_LEN + len as usize;
        if self.buffer.len() < end {
            return Ok(None);
        }
        let frame = self.buffer[HEADER_LEN..end].to_vec();
        self.buffer.drain(..end);
        Ok(Some(frame))
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, frame: Vec<u8>) -> anyhow::Result<()> {
        if frame.is_empty() {
            anyhow::bail!("Refusing to send an empty frame");
        }
        if frame.len() as u64 > self.max_frame_size as u64 {
            anyhow::bail!("Frame too large: {} bytes (max: {})", frame.len(), self.max_frame_size);
        }
        let send_op = async {
            let len = (frame.len() as u32).to_be_bytes();
            self.stream.write_all(&len).await.map_err(map_io)?;
            self.stream.write_all(&frame).await.map_err(map_io)?;
            self.stream.flush().await.map_err(map_io)
        };
        timeout(self.send_timeout, send_op)
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", self.send_timeout))?
    }

    async fn recv(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        loop {
            if let Some(frame) = self.take_frame()? {
                return Ok(Some(frame));
            }
            let mut chunk = [0u8; READ_CHUNK];
            let n = self.stream.read(&mut chunk).await.map_err(map_io)?;
            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                anyhow::bail!("Connection closed mid-frame");
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }
}
