//! Line protocol over a byte stream pair, normally stdin/stdout.
//!
//! Writes `READY`, then answers each request line until the input ends.
//! Only protocol lines are written to the output; logs go elsewhere.

use super::network::READY;
use crate::application::service::QueueHandle;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};

pub async fn run_session<R, W>(
    input: R,
    output: W,
    handle: QueueHandle,
    max_line_length: usize,
) -> Result<W, LinesCodecError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = FramedRead::new(input, LinesCodec::new_with_max_length(max_line_length));
    let mut sink = FramedWrite::new(output, LinesCodec::new());
    sink.send(READY).await?;

    let mut handled = 0u64;
    while let Some(line) = lines.next().await {
        let line = line?;
        match handle.handle_line(line).await {
            Ok(Some(response)) => {
                sink.send(response).await?;
                handled += 1;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!("stopping session: {}", e);
                break;
            }
        }
    }

    tracing::info!(handled, "input closed");
    Ok(sink.into_inner())
}
