// Line-oriented solve loop
// Reads one JSON pose command per line, writes one JSON actuation report per line.
// No smoothing or hold logic: every command is solved on its own.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

// local imports
use crate::messages::{ActuationReport, PoseCommand, RuntimeHealth};
use crate::platform::GeometryModel;

pub struct Runtime {
    model: GeometryModel,
    health: RuntimeHealth,
    commands: u64,
}

impl Runtime {
    pub fn new(model: GeometryModel) -> Self {
        Self {
            model,
            health: RuntimeHealth::Ok,
            commands: 0,
        }
    }

    pub fn health(&self) -> RuntimeHealth {
        self.health
    }

    /// Process one raw command line
    pub fn on_line(&mut self, line: &str) -> ActuationReport {
        self.commands += 1;

        let report = match serde_json::from_str::<PoseCommand>(line) {
            Ok(cmd) => self.on_command(cmd),
            Err(e) => {
                warn!("Failed to parse command: {}", e);
                ActuationReport::bad_command(e.to_string())
            }
        };

        if report.health != self.health {
            info!("Health {:?} -> {:?}", self.health, report.health);
        }
        self.health = report.health;
        report
    }

    /// Record a line that could not be decoded
    fn on_invalid(&mut self, reason: String) -> ActuationReport {
        self.commands += 1;
        warn!("Failed to decode command: {}", reason);
        if self.health != RuntimeHealth::BadCommand {
            info!("Health {:?} -> {:?}", self.health, RuntimeHealth::BadCommand);
        }
        self.health = RuntimeHealth::BadCommand;
        ActuationReport::bad_command(reason)
    }

    fn on_command(&self, cmd: PoseCommand) -> ActuationReport {
        debug!("Received command: {:?}", &cmd);
        let pose = cmd.pose();
        if !pose.is_finite() {
            warn!("Rejecting non-finite pose {:?}", pose);
            return ActuationReport::bad_command(format!("non-finite pose {:?}", pose));
        }
        ActuationReport::from_result(&self.model.solve_pose(&pose))
    }
}

/// Run the loop until `input` reaches EOF
pub async fn run<R, W>(
    model: GeometryModel,
    mut input: R,
    mut output: W,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut runtime = Runtime::new(model);
    let mut buf = Vec::new();

    info!("Runtime started, reading pose commands");

    loop {
        buf.clear();
        // Raw bytes so a line that is not UTF-8 is reported instead of ending the loop
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let report = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => runtime.on_line(line.trim()),
            Err(e) => runtime.on_invalid(format!("command is not valid UTF-8: {}", e)),
        };
        let mut json = serde_json::to_string(&report)?;
        json.push('\n');
        output.write_all(json.as_bytes()).await?;
        output.flush().await?;
    }

    info!("Input closed after {} commands", runtime.commands);
    Ok(())
}

/// Run the loop over process stdin/stdout
pub async fn run_stdio(
    model: GeometryModel,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    run(model, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}
