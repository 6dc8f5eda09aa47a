//! `ackwatch check-config`

use anyhow::Result;

use ackwatch_config::{validate, AckwatchConfig};

pub fn run(config: &AckwatchConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        print!("{config}");
    }

    let report = validate(config);
    if report.is_clean() {
        println!("\n✅ Configuration OK");
    } else {
        println!();
        for warning in &report.warnings {
            println!("  🟡 {warning}");
        }
    }
    Ok(())
}
