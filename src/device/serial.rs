use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::device::platform::SerialLink;
use crate::error::DeviceError;

/// A byte stream to the module: the RFCOMM socket on Linux, the serial device node the OS binds
/// to the paired module elsewhere.
pub struct StreamLink<W> {
    stream: Mutex<W>,
}

impl<W> StreamLink<W> {
    pub fn new(stream: W) -> Self {
        StreamLink {
            stream: Mutex::new(stream),
        }
    }
}

#[cfg(not(target_os = "linux"))]
pub async fn open_port(path: &std::path::Path) -> Result<StreamLink<tokio::fs::File>, DeviceError> {
    log::info!("Opening serial port {}", path.to_string_lossy());

    let file = tokio::fs::OpenOptions::new()
        .write(true)
        .open(path)
        .await?;

    Ok(StreamLink::new(file))
}

impl<W: AsyncWrite + Unpin + Send> SerialLink for StreamLink<W> {
    async fn write(&self, data: &[u8]) -> Result<(), DeviceError> {
        let mut stream = self.stream.lock().await;
        stream.write_all(data).await?;
        stream.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::fs::OpenOptions;
    use super::*;

    #[tokio::test]
    async fn writes_reach_the_port_in_order() {
        let port = tempfile::NamedTempFile::new().unwrap();
        let file = OpenOptions::new().write(true).open(port.path()).await.unwrap();
        let link = StreamLink::new(file);

        link.write(b"a").await.unwrap();
        link.write(b"b").await.unwrap();
        link.write(b"l").await.unwrap();

        assert_eq!(std::fs::read_to_string(port.path()).unwrap(), "abl");
    }

    #[tokio::test]
    async fn closed_stream_fails_the_write() {
        let (reader, writer) = tokio::io::duplex(8);
        drop(reader);
        let link = StreamLink::new(writer);

        assert!(matches!(link.write(b"a").await, Err(DeviceError::Io { .. })));
    }

    #[cfg(not(target_os = "linux"))]
    #[tokio::test]
    async fn missing_port_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let result = open_port(&dir.path().join("rfcomm9")).await;
        assert!(matches!(result, Err(DeviceError::Io { .. })));
    }
}
