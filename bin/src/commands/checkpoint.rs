//! Checkpoint inspection commands.

use crate::display::state_manager;
use anyhow::Result;
use std::path::PathBuf;

/// Print what the saved checkpoint holds.
pub(crate) fn show(state_dir: Option<PathBuf>) -> Result<()> {
    let state = state_manager(state_dir)?;

    let Some(snapshot) = state.load_checkpoint()? else {
        println!("No checkpoint at {}", state.checkpoint_path().display());
        return Ok(());
    };

    println!("Checkpoint: {}", state.checkpoint_path().display());
    println!("Interval: {}", snapshot.interval);
    println!("Taken: {}", snapshot.taken_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Live: {}  Pending: {}", snapshot.live.len(), snapshot.pending.len());

    let rows = snapshot
        .live
        .iter()
        .map(|bar| ("live", bar))
        .chain(snapshot.pending.iter().map(|bar| ("pending", bar)));
    for (kind, bar) in rows {
        println!(
            "  {:<8} {:<10} {}  O {:.4}  H {:.4}  L {:.4}  C {:.4}  V {:.4}",
            kind,
            bar.symbol,
            bar.bucket_start.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        );
    }

    Ok(())
}

/// Delete the saved checkpoint.
pub(crate) fn clear(state_dir: Option<PathBuf>) -> Result<()> {
    let state = state_manager(state_dir)?;

    if state.clear_checkpoint()? {
        println!("Removed {}", state.checkpoint_path().display());
    } else {
        println!("No checkpoint at {}", state.checkpoint_path().display());
    }

    Ok(())
}
