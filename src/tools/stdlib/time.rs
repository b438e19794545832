//! Wall-clock time

use chrono::Utc;

use crate::runtime::Value;
use crate::tools::ToolRegistry;

/// Register time tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(TimeMsTool);
}

primitive!(TimeMsTool, "time-ms", "Milliseconds since the Unix epoch", arity = Some(0), |args, _ctx| {
    Ok(Value::Int(Utc::now().timestamp_millis()))
});
