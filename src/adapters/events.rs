use crate::domain::model::RollcallEvent;
use crate::domain::ports::EventSink;
use crate::utils::error::Result;
use std::io::Write;

/// 只把事件寫進 log
#[derive(Debug, Clone, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, channel: &str, event: &RollcallEvent) -> Result<()> {
        let payload = serde_json::to_string(event)?;
        tracing::info!(channel = %channel, "📣 {}", payload);
        Ok(())
    }
}

/// 每個事件輸出一行 JSON 到 stdout：`{"channel": ..., "event": {...}}`
#[derive(Debug, Clone, Default)]
pub struct StdoutEventSink;

impl EventSink for StdoutEventSink {
    fn emit(&self, channel: &str, event: &RollcallEvent) -> Result<()> {
        let line = serde_json::to_string(&serde_json::json!({
            "channel": channel,
            "event": event,
        }))?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", line)?;
        stdout.flush()?;
        Ok(())
    }
}
