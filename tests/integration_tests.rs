use anyhow::Result;
use clap::Parser;
use gpa_ledger::adapters::messaging::{handle_configured_message, handle_raw_message};
use gpa_ledger::adapters::overlay::{OverlayStore, DEFAULT_OVERLAY_KEY};
use gpa_ledger::{CliConfig, GradeDelta, LocalStorage, ReportEngine, TomlConfig, TranscriptPipeline};
use std::path::Path;
use tempfile::TempDir;

const GRADE_HISTORY: &str = r#"
<html><body>
<div class="hist-grades">
  <table>
    <tbody>
      <tr><td>ENG102</td><td>3.0</td><td>Introduction to Composition</td><td>A</td></tr>
    </tbody>
  </table>
  <table>
    <tbody>
      <tr><td>PHY107</td><td>4.0</td><td>Physics I</td></tr>
    </tbody>
  </table>
  <table>
    <tbody>
      <tr><td>Spring</td><td>2022</td><td>CSE115</td><td>3</td><td>ABC</td><td>A. Teacher</td><td>3.0</td><td>Programming Language I</td><td>A</td><td>3</td><td>3</td></tr>
      <tr><td></td><td></td><td>MAT120</td><td>1</td><td>XYZ</td><td>B. Teacher</td><td>3.0</td><td>Calculus I</td><td>B</td><td>3</td><td>3</td></tr>
      <tr class="divider-td"><td colspan="11"></td></tr>
      <tr><td>Fall</td><td>2022</td><td>CSE173</td><td>2</td><td>DEF</td><td>C. Teacher</td><td>3.0</td><td>Discrete Mathematics</td><td>F</td><td>3</td><td>0</td></tr>
      <tr><td></td><td></td><td>HIS103</td><td>4</td><td>GHI</td><td>D. Teacher</td><td>3.0</td><td>Emergence of Bangladesh</td><td>W</td><td>0</td><td>0</td></tr>
    </tbody>
  </table>
</div>
</body></html>
"#;

struct Workspace {
    _dir: TempDir,
    input: String,
    output: String,
}

fn workspace() -> Result<Workspace> {
    let dir = TempDir::new()?;
    let input = dir.path().join("grade_history.html");
    std::fs::write(&input, GRADE_HISTORY)?;
    let output = dir.path().join("output");

    Ok(Workspace {
        input: input.to_string_lossy().into_owned(),
        output: output.to_string_lossy().into_owned(),
        _dir: dir,
    })
}

fn cli(ws: &Workspace, extra: &[&str]) -> CliConfig {
    let mut args = vec![
        "gpa-ledger",
        "--input",
        ws.input.as_str(),
        "--output-path",
        ws.output.as_str(),
    ];
    args.extend_from_slice(extra);
    CliConfig::parse_from(args)
}

async fn run(config: CliConfig) -> Result<serde_json::Value> {
    let storage = LocalStorage::new(config.output_path.clone());
    let output_dir = config.output_path.clone();
    let engine = ReportEngine::new(TranscriptPipeline::new(storage, config));

    let report_path = engine.run().await?;
    assert_eq!(report_path, format!("{}/report.json", output_dir));

    let json = std::fs::read_to_string(&report_path)?;
    Ok(serde_json::from_str(&json)?)
}

#[tokio::test]
async fn test_end_to_end_report() -> Result<()> {
    let ws = workspace()?;
    let report = run(cli(&ws, &[])).await?;

    // (4*3 + 3*3 + 0*3) / 9
    assert_eq!(report["summary"]["cgpa"].as_f64().map(|v| (v * 100.0).round()), Some(233.0));
    assert_eq!(report["summary"]["attempted_credits"], 9.0);
    assert_eq!(report["summary"]["completed_credits"], 6.0);
    assert_eq!(report["summary"]["waiver_credits"], 3.0);
    assert_eq!(report["summary"]["transfer_credits"], 4.0);
    assert_eq!(report["summary"]["total_credits"], 9.0);
    assert!(report["what_if"].is_null());

    let series = &report["progression"]["series"];
    assert_eq!(series["labels"], serde_json::json!(["Spring 2022", "Fall 2022"]));
    assert_eq!(series["cumulative_gpa"], serde_json::json!([3.5, 2.33]));
    assert_eq!(series["course_counts"], serde_json::json!([2, 2]));

    let csv = std::fs::read_to_string(Path::new(&ws.output).join("courses.csv"))?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[4].starts_with("HIS103,Emergence of Bangladesh,Fall 2022,3,W,,unchanged"));

    Ok(())
}

#[tokio::test]
async fn test_what_if_from_command_line() -> Result<()> {
    let ws = workspace()?;
    let report = run(cli(&ws, &["--what-if", "CSE173=B", "--what-if", "NOPE101=A"])).await?;

    let what_if = &report["what_if"];
    assert_eq!(what_if["comparison"]["trend"], "improved");
    assert_eq!(what_if["badge"], "+1.00");
    assert_eq!(what_if["changed_courses"], 1);

    // 基準統計不變
    assert_eq!(report["progression"]["series"]["cumulative_gpa"][1], 2.33);
    Ok(())
}

#[tokio::test]
async fn test_saved_overlay_survives_between_runs() -> Result<()> {
    let ws = workspace()?;

    run(cli(&ws, &["--what-if", "MAT120=A", "--save-overlay"])).await?;
    let saved = Path::new(&ws.output).join(format!("{}.json", DEFAULT_OVERLAY_KEY));
    assert!(saved.exists());

    // 第二次執行沒有 --what-if，仍套用已保存的 overlay
    let report = run(cli(&ws, &[])).await?;
    // 2.67 - 2.33
    assert_eq!(report["what_if"]["badge"], "+0.34");

    let report = run(cli(&ws, &["--ignore-saved"])).await?;
    assert!(report["what_if"].is_null());

    Ok(())
}

#[tokio::test]
async fn test_messages_answer_from_saved_overlay() -> Result<()> {
    let ws = workspace()?;
    let storage = LocalStorage::new(ws.output.clone());
    let store = OverlayStore::new(&storage, DEFAULT_OVERLAY_KEY);

    let reply: serde_json::Value =
        serde_json::from_str(&handle_raw_message(r#"{"type":"CALCULATE_CGPA"}"#, &store).await)?;
    assert_eq!(reply["success"], true);
    assert!(reply["data"].is_null());

    store.save(&[GradeDelta::grade("CSE115", "B")]).await?;
    let reply: serde_json::Value =
        serde_json::from_str(&handle_raw_message(r#"{"type":"CALCULATE_CGPA"}"#, &store).await)?;
    assert_eq!(reply["data"][0]["code"], "CSE115");

    let reply: serde_json::Value =
        serde_json::from_str(&handle_raw_message(r#"{"type":"CLEAR_WHAT_IF"}"#, &store).await)?;
    assert_eq!(reply["success"], true);
    assert!(store.load().await?.is_none());

    let reply: serde_json::Value =
        serde_json::from_str(&handle_raw_message(r#"{"type":"PING"}"#, &store).await)?;
    assert_eq!(reply["success"], false);

    Ok(())
}

#[tokio::test]
async fn test_toml_config_pipeline() -> Result<()> {
    let ws = workspace()?;
    let toml = format!(
        r#"
[source]
input = "{}"

[overlay]
key = "plan-b"
save = true

[[what_if]]
code = "CSE173"
grade = "C"

[load]
output_path = "{}"
"#,
        ws.input.replace('\\', "/"),
        ws.output.replace('\\', "/")
    );
    let config = TomlConfig::from_toml_str(&toml)?;

    let storage = LocalStorage::new(ws.output.clone());
    let engine = ReportEngine::new(TranscriptPipeline::new(storage, config));
    engine.run().await?;

    assert!(Path::new(&ws.output).join("plan-b.json").exists());
    let json = std::fs::read_to_string(Path::new(&ws.output).join("report.json"))?;
    let report: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(report["what_if"]["comparison"]["trend"], "improved");

    Ok(())
}

#[tokio::test]
async fn test_messages_follow_toml_overlay_location() -> Result<()> {
    let ws = workspace()?;
    let plans = Path::new(&ws.output).join("plans");
    let toml = format!(
        r#"
[source]
input = "{}"

[overlay]
key = "plan-b"
save = true

[[what_if]]
code = "CSE173"
grade = "C"

[load]
output_path = "{}"
"#,
        ws.input.replace('\\', "/"),
        plans.to_string_lossy().replace('\\', "/")
    );
    let config = TomlConfig::from_toml_str(&toml)?;

    let storage = LocalStorage::new(config.load.output_path.clone());
    ReportEngine::new(TranscriptPipeline::new(storage, config.clone()))
        .run()
        .await?;

    // CLI 預設位置沒有 overlay
    let reply: serde_json::Value = serde_json::from_str(
        &handle_configured_message(r#"{"type":"CALCULATE_CGPA"}"#, &cli(&ws, &[])).await,
    )?;
    assert!(reply["data"].is_null());

    let reply: serde_json::Value = serde_json::from_str(
        &handle_configured_message(r#"{"type":"CALCULATE_CGPA"}"#, &config).await,
    )?;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["data"][2]["code"], "CSE173");
    assert_eq!(reply["data"][2]["grade"], "C");

    let reply: serde_json::Value = serde_json::from_str(
        &handle_configured_message(r#"{"type":"CLEAR_WHAT_IF"}"#, &config).await,
    )?;
    assert_eq!(reply["success"], true);
    assert!(!plans.join("plan-b.json").exists());

    Ok(())
}
