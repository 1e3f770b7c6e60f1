//! Step-by-step walkthrough: discover the host's tools, then call the first one.

use anyhow::Result;
use sundial_client::McpHttpClient;

pub async fn run(client: &McpHttpClient, cities: &[String]) -> Result<()> {
    println!("--- Sundial: a simple tool client ---");
    println!("Endpoint: {}", client.url());

    println!("\n[Step 1: Ask the host what it can do]");
    let tools = match client.list_tools().await {
        Ok(tools) => tools,
        Err(e) => {
            println!("   -> Error listing tools: {e}");
            anyhow::bail!("{e}");
        }
    };
    let Some(tool) = tools.first() else {
        println!("   -> The host didn't return any tools.");
        return Ok(());
    };
    println!("   -> Success! The host has {} tool(s):", tools.len());
    for t in &tools {
        println!("      - {}: {}", t.name, t.description.trim());
    }

    println!("\n[Step 2: Use the '{}' tool]", tool.name);
    let mut failures = 0;
    for city in cities {
        let arguments = serde_json::json!({ "city": city });
        match client.call_tool(&tool.name, arguments).await {
            Ok(output) if !output.is_error => {
                println!("   -> {city}: '{}'", output.first_text().unwrap_or_default());
            }
            Ok(output) => {
                failures += 1;
                println!(
                    "   -> {city}: tool error: {}",
                    output.first_text().unwrap_or_default()
                );
            }
            Err(e) => {
                failures += 1;
                println!("   -> {city}: error calling '{}': {e}", tool.name);
            }
        }
    }

    println!("\n--- Demonstration Complete ---");
    anyhow::ensure!(failures == 0, "{failures} call(s) failed");
    Ok(())
}
