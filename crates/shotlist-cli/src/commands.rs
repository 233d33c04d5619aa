//! Command handlers.
//!
//! Each handler takes the [`AppContext`] and writes user-facing output to
//! `out`. Logging goes through `tracing`, never to `out`.

use std::io::Write;

use anyhow::{bail, Context, Result};
use shotlist_core::core::export::export_project;
use shotlist_core::core::storage::validate_project_name;
use shotlist_core::core::timecode::to_timecode;
use shotlist_core::core::{ShotMetadata, ShotRecord};
use tracing::warn;

use crate::cli::{AddArgs, Command, ConfigAction, ShotTarget, UpdateArgs};
use crate::context::AppContext;

/// Dispatches one parsed command
pub fn run(command: Command, ctx: &mut AppContext, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Projects { json } => projects(ctx, json, out),
        Command::Add(args) => add(ctx, args, out),
        Command::Update(args) => update(ctx, args, out),
        Command::Show { target, json } => show(ctx, target, json, out),
        Command::List { project, json } => list(ctx, &project, json, out),
        Command::Delete { target } => delete(ctx, target, out),
        Command::Export { project, out: dest } => export(ctx, &project, dest, out),
        Command::AttachImage { target, image } => attach_image(ctx, target, &image, out),
        Command::Config { action } => config(ctx, action, out),
    }
}

fn project_name(raw: &str) -> Result<String> {
    Ok(validate_project_name(raw)?.to_string())
}

// =============================================================================
// Shots
// =============================================================================

fn projects(ctx: &mut AppContext, json: bool, out: &mut dyn Write) -> Result<()> {
    let fps = ctx.settings.shots.fps;
    let db = ctx.db()?;

    let mut summaries = Vec::new();
    for name in db.list_projects()? {
        summaries.push(db.project_summary(&name)?);
    }

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&summaries)?)?;
        return Ok(());
    }

    if summaries.is_empty() {
        writeln!(out, "No projects")?;
        return Ok(());
    }

    writeln!(out, "{:<24} {:>6}  {}", "PROJECT", "SHOTS", "RUNTIME")?;
    for summary in &summaries {
        writeln!(
            out,
            "{:<24} {:>6}  {}",
            summary.name,
            summary.shot_count,
            to_timecode(summary.total_duration_sec as f64, fps)
        )?;
    }
    Ok(())
}

fn add(ctx: &mut AppContext, args: AddArgs, out: &mut dyn Write) -> Result<()> {
    let project = project_name(&args.target.project)?;
    let defaults = ctx.settings.shots.clone();
    let details = args.details;

    let metadata = ShotMetadata {
        description: details.description.unwrap_or_default(),
        location: details.location.unwrap_or_default(),
        time_of_day: details.time_of_day.unwrap_or_default(),
        shot_size: details.shot_size.unwrap_or_default(),
        actors: details.actors.unwrap_or_default(),
        props: details.props.unwrap_or_default(),
        notes: details.notes.unwrap_or_default(),
        audio: details.audio.unwrap_or_default(),
        camera: details.camera.unwrap_or(defaults.camera),
        image_path: None,
        created_by: ctx.settings.general.operator_name.clone(),
    };

    let record = ShotRecord::new(
        args.target.key,
        args.duration.unwrap_or(defaults.duration),
        args.fps.unwrap_or(defaults.fps),
        &args.clip,
    )
    .with_metadata(metadata);

    ctx.db()?.insert_shot(&project, &record)?;
    writeln!(out, "Added {} {}", project, record.key)?;
    Ok(())
}

fn update(ctx: &mut AppContext, args: UpdateArgs, out: &mut dyn Write) -> Result<()> {
    let project = project_name(&args.target.project)?;
    let patch = args.to_patch();
    if patch.is_empty() {
        bail!("nothing to update: pass at least one field");
    }

    let record = ctx.db()?.patch_shot(&project, args.target.key, &patch)?;
    writeln!(out, "Updated {} {}", project, record.key)?;
    Ok(())
}

fn show(ctx: &mut AppContext, target: ShotTarget, json: bool, out: &mut dyn Write) -> Result<()> {
    let project = project_name(&target.project)?;
    let record = ctx.db()?.require_shot(&project, target.key)?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?;
        return Ok(());
    }

    let meta = &record.metadata;
    let rows = [
        ("Project", project.clone()),
        ("Scene/Shot/Take", record.key.to_string()),
        ("Duration", format!("{} s", record.duration)),
        ("FPS", record.fps.to_string()),
        ("Clip", record.clip_name.clone()),
        ("Description", meta.description.clone()),
        ("Location", meta.location.clone()),
        ("Time of day", meta.time_of_day.to_string()),
        ("Shot size", meta.shot_size.to_string()),
        ("Actors", meta.actors.clone()),
        ("Props", meta.props.clone()),
        ("Notes", meta.notes.clone()),
        ("Audio", meta.audio.to_string()),
        ("Camera", meta.camera.clone()),
        ("Image", meta.image_path.clone().unwrap_or_else(|| "-".to_string())),
        ("Logged by", meta.created_by.clone()),
    ];
    for (label, value) in rows {
        writeln!(out, "{:<16} {}", label, value)?;
    }
    Ok(())
}

fn list(ctx: &mut AppContext, project: &str, json: bool, out: &mut dyn Write) -> Result<()> {
    let project = project_name(project)?;
    let records = ctx.db()?.list_shots(&project)?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
        return Ok(());
    }

    if records.is_empty() {
        writeln!(out, "No shots in '{}'", project)?;
        return Ok(());
    }

    out.write_all(format_shot_table(&records).as_bytes())?;
    Ok(())
}

/// Shots with their record-in timecode on the assembled timeline
pub fn format_shot_table(records: &[ShotRecord]) -> String {
    let mut table = format!(
        "{:<10} {:>5} {:>4}  {:<11}  {:<16} {:<11} {}\n",
        "S/S/T", "DUR", "FPS", "TC IN", "CLIP", "TIME", "LOCATION"
    );

    let mut elapsed: u64 = 0;
    for record in records {
        table.push_str(&format!(
            "{:<10} {:>5} {:>4}  {:<11}  {:<16} {:<11} {}\n",
            record.key.to_string(),
            record.duration,
            record.fps,
            to_timecode(elapsed as f64, record.fps),
            record.clip_name,
            record.metadata.time_of_day.to_string(),
            record.metadata.location
        ));
        elapsed += u64::from(record.duration);
    }
    table
}

fn delete(ctx: &mut AppContext, target: ShotTarget, out: &mut dyn Write) -> Result<()> {
    let project = project_name(&target.project)?;
    ctx.db()?.delete_shot(&project, target.key)?;
    writeln!(out, "Deleted {} {}", project, target.key)?;
    Ok(())
}

fn attach_image(
    ctx: &mut AppContext,
    target: ShotTarget,
    image: &std::path::Path,
    out: &mut dyn Write,
) -> Result<()> {
    let project = project_name(&target.project)?;
    ctx.db()?.require_shot(&project, target.key)?;

    let stored = ctx
        .image_store()
        .attach(&project, target.key, image)
        .with_context(|| format!("attaching {}", image.display()))?;

    let stored_str = stored.to_string_lossy().to_string();
    ctx.db()?.set_image_path(&project, target.key, &stored_str)?;
    writeln!(out, "Attached {} to {} {}", stored_str, project, target.key)?;
    Ok(())
}

// =============================================================================
// Export
// =============================================================================

fn export(
    ctx: &mut AppContext,
    project: &str,
    dest: Option<std::path::PathBuf>,
    out: &mut dyn Write,
) -> Result<()> {
    let project = project_name(project)?;
    let dest = dest.unwrap_or_else(|| ctx.settings.export.default_output_path(&project));

    let db = ctx.db()?;
    if !db.project_exists(&project)? {
        warn!("Project '{}' has no shots; exporting an empty document", project);
    }

    let result = export_project(db, &project, &dest)
        .with_context(|| format!("exporting '{}' to {}", project, dest.display()))?;

    writeln!(
        out,
        "Exported {} shots of '{}' to {}",
        result.shot_count,
        project,
        result.output_path.display()
    )?;
    Ok(())
}

// =============================================================================
// Config
// =============================================================================

fn config(ctx: &mut AppContext, action: ConfigAction, out: &mut dyn Write) -> Result<()> {
    match action {
        ConfigAction::Show => {
            writeln!(out, "{}", serde_json::to_string_pretty(&ctx.settings)?)?;
        }
        ConfigAction::Path => {
            writeln!(out, "{}", ctx.settings_manager().settings_path().display())?;
        }
        ConfigAction::Set { key, value } => {
            let mut settings = ctx.settings.clone();
            settings.set_value(&key, &value)?;
            ctx.replace_settings(settings)?;
            writeln!(out, "Set {}", key)?;
        }
        ConfigAction::Reset => {
            ctx.settings = ctx.settings_manager().reset()?;
            writeln!(out, "Settings reset to defaults")?;
        }
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use shotlist_core::core::settings::AppSettings;
    use shotlist_core::core::ShotKey;
    use tempfile::TempDir;

    fn exec(ctx: &mut AppContext, args: &[&str]) -> Result<String> {
        let mut argv = vec!["shotlist"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv)?;

        let mut out = Vec::new();
        run(cli.command, ctx, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn context() -> (TempDir, AppContext) {
        let dir = TempDir::new().unwrap();
        let ctx = AppContext::new(dir.path().to_path_buf());
        (dir, ctx)
    }

    #[test]
    fn test_add_list_export_edl() {
        let (dir, mut ctx) = context();

        exec(&mut ctx, &["add", "-p", "Pilot", "1/1/2", "-c", "A002", "-d", "3"]).unwrap();
        exec(&mut ctx, &["add", "-p", "Pilot", "1/1/1", "-c", "A001.mov", "-d", "5"]).unwrap();

        let listing = exec(&mut ctx, &["list", "-p", "Pilot"]).unwrap();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1/1/1"));
        assert!(lines[2].contains("00:00:05:00"));

        let edl_path = dir.path().join("pilot.edl");
        let msg = exec(
            &mut ctx,
            &["export", "-p", "Pilot", "-o", edl_path.to_str().unwrap()],
        )
        .unwrap();
        assert!(msg.starts_with("Exported 2 shots"));

        let edl = std::fs::read_to_string(&edl_path).unwrap();
        assert!(edl.contains(
            "001  AX       V     C        00:00:00:00 00:00:05:00 00:00:00:00 00:00:05:00\n"
        ));
        assert!(edl.contains(
            "003  AX       V     C        00:00:05:00 00:00:08:00 00:00:05:00 00:00:08:00\n"
        ));
    }

    #[test]
    fn test_add_uses_settings_defaults() {
        let (_dir, mut ctx) = context();
        exec(&mut ctx, &["config", "set", "shots.fps", "50"]).unwrap();
        exec(&mut ctx, &["config", "set", "general.operatorName", "Mia"]).unwrap();

        exec(&mut ctx, &["add", "-p", "Pilot", "2/1/1", "-c", "B001"]).unwrap();

        let record = ctx
            .db()
            .unwrap()
            .require_shot("Pilot", ShotKey::new(2, 1, 1))
            .unwrap();
        assert_eq!(record.fps, 50);
        assert_eq!(record.duration, 3);
        assert_eq!(record.metadata.created_by, "Mia");
        assert_eq!(record.clip_name, "B001.mov");
    }

    #[test]
    fn test_duplicate_add_fails() {
        let (_dir, mut ctx) = context();
        exec(&mut ctx, &["add", "-p", "Pilot", "1/1/1", "-c", "A001"]).unwrap();
        assert!(exec(&mut ctx, &["add", "-p", "Pilot", "1/1/1", "-c", "A001"]).is_err());
    }

    #[test]
    fn test_update_and_show() {
        let (_dir, mut ctx) = context();
        exec(&mut ctx, &["add", "-p", "Pilot", "1/1/1", "-c", "A001"]).unwrap();

        assert!(exec(&mut ctx, &["update", "-p", "Pilot", "1/1/1"]).is_err());

        exec(
            &mut ctx,
            &["update", "-p", "Pilot", "1/1/1", "--location", "Pier", "--shot-size", "detail"],
        )
        .unwrap();

        let shown = exec(&mut ctx, &["show", "-p", "Pilot", "1/1/1"]).unwrap();
        assert!(shown.contains(&format!("{:<16} Pier", "Location")));
        assert!(shown.contains(&format!("{:<16} detail", "Shot size")));

        let json = exec(&mut ctx, &["show", "-p", "Pilot", "1/1/1", "--json"]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["location"], "Pier");
    }

    #[test]
    fn test_projects_and_delete() {
        let (_dir, mut ctx) = context();
        assert_eq!(exec(&mut ctx, &["projects"]).unwrap(), "No projects\n");

        exec(&mut ctx, &["add", "-p", "Teaser", "1/1/1", "-c", "T001", "-d", "4"]).unwrap();
        exec(&mut ctx, &["add", "-p", "Pilot", "1/1/1", "-c", "A001", "-d", "61"]).unwrap();

        let listing = exec(&mut ctx, &["projects"]).unwrap();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Pilot"));
        assert!(lines[1].ends_with("00:01:01:00"));

        exec(&mut ctx, &["delete", "-p", "Pilot", "1/1/1"]).unwrap();
        let json = exec(&mut ctx, &["projects", "--json"]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["name"], "Teaser");
    }

    #[test]
    fn test_export_empty_project_uses_default_destination() {
        let (dir, mut ctx) = context();
        let exports = dir.path().join("exports");
        exec(
            &mut ctx,
            &["config", "set", "export.outputDir", exports.to_str().unwrap()],
        )
        .unwrap();
        exec(&mut ctx, &["config", "set", "export.defaultFormat", "csv"]).unwrap();

        exec(&mut ctx, &["export", "-p", "Nothing"]).unwrap();

        let csv = std::fs::read_to_string(exports.join("Nothing.csv")).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_export_rejects_project_outside_export_dir() {
        let (dir, mut ctx) = context();
        let exports = dir.path().join("a").join("b");
        exec(
            &mut ctx,
            &["config", "set", "export.outputDir", exports.to_str().unwrap()],
        )
        .unwrap();

        assert!(exec(&mut ctx, &["export", "-p", "../../evil"]).is_err());
        assert!(exec(&mut ctx, &["add", "-p", "../../evil", "1/1/1", "-c", "A001"]).is_err());
        assert!(!dir.path().join("evil.edl").exists());
        assert!(!exports.exists());
    }

    #[test]
    fn test_config_set_rejects_unknown_export_format() {
        let (_dir, mut ctx) = context();
        assert!(exec(&mut ctx, &["config", "set", "export.defaultFormat", "pdf"]).is_err());
        assert_eq!(ctx.settings.export.default_format, "edl");

        exec(&mut ctx, &["config", "set", "export.defaultFormat", "xlsx"]).unwrap();
        assert_eq!(ctx.settings.export.default_format, "xlsx");
    }

    #[test]
    fn test_attach_image() {
        let (dir, mut ctx) = context();
        let still = dir.path().join("frame.png");
        std::fs::write(&still, b"png").unwrap();

        assert!(exec(
            &mut ctx,
            &["attach-image", "-p", "Pilot", "1/1/1", still.to_str().unwrap()]
        )
        .is_err());

        exec(&mut ctx, &["add", "-p", "Pilot", "1/1/1", "-c", "A001"]).unwrap();
        exec(
            &mut ctx,
            &["attach-image", "-p", "Pilot", "1/1/1", still.to_str().unwrap()],
        )
        .unwrap();

        let record = ctx
            .db()
            .unwrap()
            .require_shot("Pilot", ShotKey::new(1, 1, 1))
            .unwrap();
        let stored = record.metadata.image_path.unwrap();
        assert!(stored.ends_with("1_1_1.png"));
        assert!(std::path::Path::new(&stored).exists());
    }

    #[test]
    fn test_config_reset() {
        let (_dir, mut ctx) = context();
        exec(&mut ctx, &["config", "set", "shots.duration", "10"]).unwrap();
        assert_eq!(ctx.settings.shots.duration, 10);
        assert!(ctx.settings_manager().settings_path().exists());

        exec(&mut ctx, &["config", "reset"]).unwrap();
        assert_eq!(ctx.settings, AppSettings::default());
        assert!(!ctx.settings_manager().settings_path().exists());
    }

    #[test]
    fn test_format_shot_table_accumulates() {
        let records = vec![
            ShotRecord::new(ShotKey::new(1, 1, 1), 90, 25, "A001.mov"),
            ShotRecord::new(ShotKey::new(1, 1, 2), 30, 25, "A002.mov"),
        ];
        let table = format_shot_table(&records);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[1].contains("00:00:00:00"));
        assert!(lines[2].contains("00:01:30:00"));
    }
}
