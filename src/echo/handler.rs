//! Per-connection echo loop.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Mirror everything read from `stream` back to it.
///
/// Reads in chunks of at most `buffer_size` bytes and writes back exactly
/// what each read returned. Stops at EOF or on the first read/write error.
/// The stream is owned and dropped on return, closing the connection.
///
/// Returns the number of bytes echoed.
pub async fn mirror<S>(mut stream: S, buffer_size: usize) -> std::io::Result<u64>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; buffer_size];
    let mut echoed = 0u64;

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(echoed);
        }
        stream.write_all(&buf[..n]).await?;
        echoed += n as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn echoes_until_eof() {
        let (mut client, server) = duplex(64);
        let task = tokio::spawn(mirror(server, 32));

        client.write_all(b"hello").await.unwrap();
        let mut buf = [0u8; 5];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello");

        client.shutdown().await.unwrap();
        assert_eq!(task.await.unwrap().unwrap(), 5);
    }

    #[tokio::test]
    async fn payload_larger_than_buffer_is_preserved() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let (mut client, server) = duplex(4096);
        let task = tokio::spawn(mirror(server, 32));

        client.write_all(&payload).await.unwrap();
        client.shutdown().await.unwrap();

        let mut echoed = Vec::new();
        client.read_to_end(&mut echoed).await.unwrap();
        assert_eq!(echoed, payload);
        assert_eq!(task.await.unwrap().unwrap(), 1000);
    }

    #[tokio::test]
    async fn stops_when_peer_goes_away() {
        let (client, server) = duplex(64);
        drop(client);
        assert_eq!(mirror(server, 32).await.unwrap(), 0);
    }
}
