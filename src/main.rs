//! Questionnaire page driver
//!
//! - Renders a page definition (built-in or TOML) and attaches the page components
//! - Reads user actions as JSON lines, prints notices as JSON lines
//! - At end of input waits for pending timers and prints the final page as JSON
//!
//! Important env variables:
//!   PAGE              : built-in page (questionnaire | results | comparison), default questionnaire
//!   PAGE_CONFIG_PATH  : path to a TOML page definition (overrides PAGE)
//!   EVENT_SCRIPT_PATH : file of JSON-line actions; stdin when unset
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info, instrument};

use questionnaire_page::config::load_page_config_from_env;
use questionnaire_page::protocol::{Notice, UserAction};
use questionnaire_page::session::{PageSession, RecordingToolkit};
use questionnaire_page::telemetry;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    let cfg = load_page_config_from_env()?;
    let (mut session, notices) = PageSession::load(&cfg, RecordingToolkit::default()).await?;
    emit(&notices);

    match std::env::var("EVENT_SCRIPT_PATH") {
        Ok(path) => {
            let file = tokio::fs::File::open(&path).await?;
            info!(target: "page", %path, "Replaying action script");
            run(&mut session, BufReader::new(file)).await?;
        }
        Err(_) => run(&mut session, BufReader::new(tokio::io::stdin())).await?,
    }

    session.settle().await;
    let page = session.close().await;
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}

/// Action loop: one JSON action per line until EOF or ctrl-c.
#[instrument(level = "info", skip_all)]
async fn run<R>(session: &mut PageSession, reader: R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!(target: "page", "Interrupted; closing page");
                None
            }
        };
        let Some(line) = line else { break };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let notices = match serde_json::from_str::<UserAction>(line) {
            Ok(action) => session.perform(action).await,
            Err(e) => {
                error!(target: "page", error = %e, "Invalid action line");
                vec![Notice::Error { message: format!("Invalid JSON: {}", e) }]
            }
        };
        emit(&notices);
    }
    Ok(())
}

fn emit(notices: &[Notice]) {
    for n in notices {
        let out = serde_json::to_string(n).unwrap_or_else(|e| {
            serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });
        println!("{}", out);
    }
}
