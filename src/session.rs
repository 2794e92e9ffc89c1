//! Line-delimited JSON request loop over one loaded page.

use std::error::Error;

use pagelens_config::Config;
use pagelens_dom::{MemoryClipboard, PageDocument};
use pagelens_engine::{MessageRouter, PassiveCaptureService};
use pagelens_protocols::{FailureResponse, Request, Response};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::render;

/// Answer one request per input line until the input ends. Passive capture
/// runs for the whole session.
pub(crate) async fn run<R, W>(
    mut doc: PageDocument,
    config: &Config,
    input: R,
    output: &mut W,
    pretty: bool,
) -> Result<usize, Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut capture = PassiveCaptureService::new(config.capture.clone());
    capture.start(&mut doc.globals);
    let mut router = MessageRouter::new(config);
    let mut clipboard = MemoryClipboard::new();

    let mut lines = input.lines();
    let mut handled = 0;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => router.handle(&mut doc, &mut clipboard, Some(&capture), request),
            Err(e) => {
                warn!(error = %e, "Unparseable request");
                Response::Failure(FailureResponse::new(format!("invalid request: {e}")))
            }
        };
        let mut rendered = render(&response, pretty)?;
        rendered.push('\n');
        output.write_all(rendered.as_bytes()).await?;
        output.flush().await?;
        handled += 1;
    }

    router.cleanup(&mut doc);
    capture.stop(&mut doc.globals);
    info!(handled, "Session ended");
    Ok(handled)
}
