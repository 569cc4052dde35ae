use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use crate::resource::upgrade::{UpgradeFuture, UpgradeHandler, Upgraded};

/// Upgraded session that writes back whatever it reads, one scratch buffer
/// at a time, until the peer closes.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoSession;

impl UpgradeHandler for EchoSession {
    fn serve<'a>(&'a self, conn: Upgraded, scratch: &'a mut [u8]) -> UpgradeFuture<'a> {
        Box::pin(async move {
            let Upgraded { mut io, pending } = conn;
            let mut total = pending.len();

            if !pending.is_empty() {
                io.write_all(&pending).await?;
            }

            loop {
                let n = io.read(scratch).await?;
                if n == 0 {
                    break;
                }
                io.write_all(&scratch[..n]).await?;
                io.flush().await?;
                total += n;
            }

            debug!(bytes = total, "upgraded session closed");
            Ok(())
        })
    }
}
