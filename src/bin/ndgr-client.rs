//! CLI surface (spec.md §6, collaborator): `stream`, `download`, `version`.
//!
//! A thin wrapper over [`ndgr_client::NdgrClient`] — all engineering lives in
//! the library; this binary only parses arguments, drives the public API,
//! and renders output the way a terminal user or a downstream script expects.

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use ndgr_client::{xml_transcript, NdgrClient};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "ndgr-client", about = "Client for niconico live's NDGR comment fabric")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stream comments from the NDGR server.
    Stream {
        /// Program identifier (e.g. lv345479473) or channel alias.
        handle: String,
    },
    /// Download backward (historical) comments from the NDGR server.
    Download {
        /// Program identifier, channel alias, or "all" for every known
        /// channel alias (requires a prior channel-alias-map refresh).
        handle: String,
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Show version.
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Stream { handle } => run_stream(&handle).await,
        Command::Download { handle, output_dir } => run_download(&handle, &output_dir).await,
        Command::Version => {
            println!("ndgr-client {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_stream(handle: &str) -> ndgr_client::Result<()> {
    let client = NdgrClient::new()?;
    let mut comments = Box::pin(client.stream_comments(handle));
    while let Some(comment) = comments.next().await {
        let comment = comment?;
        // Anonymized comments display the hashed user id, not `0`
        // (original_source/ndgr_client/constants.py `NDGRComment.__str__`).
        let user = if comment.raw_user_id > 0 {
            comment.raw_user_id.to_string()
        } else {
            comment.hashed_user_id.clone()
        };
        println!("[{user}] {}", comment.content);
    }
    Ok(())
}

async fn run_download(handle: &str, output_dir: &std::path::Path) -> ndgr_client::Result<()> {
    let client = NdgrClient::new()?;

    let handles: Vec<String> = if handle == "all" {
        // TODO(tsukumijima/ndgr-client-rs#1): seed this from a bundled
        // jikkyo-id table instead of requiring a prior map refresh, once
        // `updateChannelAliasMap`'s source page stabilizes.
        client.update_channel_alias_map("https://jk.nicovideo.jp/").await?;
        let aliases = client.known_channel_aliases();
        if aliases.is_empty() {
            return Err(ndgr_client::NdgrError::Input(
                "no channel aliases known; refresh the channel map first".to_owned(),
            ));
        }
        aliases
    } else {
        vec![handle.to_owned()]
    };

    std::fs::create_dir_all(output_dir)
        .map_err(|e| ndgr_client::NdgrError::Input(format!("cannot create {}: {e}", output_dir.display())))?;

    for h in &handles {
        let comments = client.download_backward(h).await?;
        println!("Total comments for {h}: {}", comments.len());

        let xml = xml_transcript::render(&comments);
        let path = output_dir.join(format!("{h}.xml"));
        std::fs::write(&path, xml)
            .map_err(|e| ndgr_client::NdgrError::Input(format!("cannot write {}: {e}", path.display())))?;
        println!("Saved to {}", path.display());
    }

    Ok(())
}
