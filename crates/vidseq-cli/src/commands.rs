use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing::{info, warn};
use vidseq_core::{
    generate_render_script, InstrumentPatch, MediaIndex, MediaSource, ProjectFile, Sequencer,
    SCRIPT_FILE_NAME,
};
use vidseq_services::{
    import_project, save_render, DirCatalog, HttpCatalog, MediaCatalog,
    RenderClient, VidseqConfig,
};

use crate::Command;

/// Parse `NAME=PATH` for `--upload`
pub fn parse_upload(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=PATH, got {s:?}")),
    }
}

pub async fn dispatch(command: Command, config: VidseqConfig) -> anyhow::Result<()> {
    match command {
        Command::Info { project } => info_cmd(&project),
        Command::Script { project, output } => script_cmd(&project, output),
        Command::Catalog { dir, url } => catalog_cmd(&config, dir, url).await,
        Command::Render {
            project,
            uploads,
            catalog_url,
            render_url,
            output,
            timeout_secs,
        } => {
            let mut config = config;
            if let Some(url) = render_url {
                config.render_url = url;
            }
            if let Some(dir) = output {
                config.output_dir = dir;
            }
            if let Some(secs) = timeout_secs {
                config.render_timeout_secs = secs;
            }
            render_cmd(&config, &project, uploads, catalog_url).await
        }
    }
}

fn read_project(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Load a project without resolving any media
fn load_offline(path: &Path) -> anyhow::Result<Sequencer> {
    let file = ProjectFile::from_json(&read_project(path)?)?;
    let mut store = Sequencer::new();
    store.import_project(file, &MediaIndex::new())?;
    Ok(store)
}

fn info_cmd(project: &Path) -> anyhow::Result<()> {
    let store = load_offline(project)?;
    let state = store.state();
    let t = &state.transport;
    println!("{}", project.display());
    println!(
        "  bpm {}  length {} beats ({:.2}s)  grid {}x{}",
        t.bpm,
        t.total_beats,
        t.duration_secs(),
        state.grid.cols,
        state.grid.rows
    );
    println!(
        "  {} instruments, {} clips, render length {:.2}s",
        state.instruments.len(),
        state.clips.len(),
        state.render_duration_secs()
    );
    for inst in &state.instruments {
        let (row, col) = state.grid.cell_of(inst.grid_position);
        println!(
            "  [{row},{col}] {:<20} {} clips  {}",
            inst.name,
            state.clips_for(&inst.id).count(),
            inst.color
        );
    }
    Ok(())
}

fn script_cmd(project: &Path, output: Option<PathBuf>) -> anyhow::Result<()> {
    let store = load_offline(project)?;
    let script = generate_render_script(store.state());
    let output = output.unwrap_or_else(|| PathBuf::from(SCRIPT_FILE_NAME));
    std::fs::write(&output, script).with_context(|| format!("writing {}", output.display()))?;
    info!(path = %output.display(), "Render script written");
    Ok(())
}

async fn print_listing<C: MediaCatalog>(catalog: &C) -> anyhow::Result<()> {
    let files = catalog.list().await?;
    if files.is_empty() {
        warn!("Catalog is empty");
    }
    for file in files {
        println!("{}\t{}", file, catalog.locator(&file));
    }
    Ok(())
}

async fn catalog_cmd(
    config: &VidseqConfig,
    dir: Option<PathBuf>,
    url: Option<String>,
) -> anyhow::Result<()> {
    match url {
        Some(url) => print_listing(&HttpCatalog::new(url)).await,
        None => {
            let dir = dir.unwrap_or_else(|| config.clips_dir.clone());
            print_listing(&DirCatalog::new(dir)).await
        }
    }
}

async fn render_cmd(
    config: &VidseqConfig,
    project: &Path,
    uploads: Vec<(String, PathBuf)>,
    catalog_url: Option<String>,
) -> anyhow::Result<()> {
    let json = read_project(project)?;
    let mut store = Sequencer::new();
    match catalog_url {
        Some(url) => import_project(&mut store, &json, &HttpCatalog::new(url)).await?,
        None => import_project(&mut store, &json, &DirCatalog::new(&config.clips_dir)).await?,
    }

    for (name, path) in uploads {
        let Some(id) = store
            .state()
            .instruments
            .iter()
            .find(|i| i.name == name)
            .map(|i| i.id.clone())
        else {
            bail!("no instrument named {name:?} in {}", project.display());
        };
        let patch = InstrumentPatch::default().media(Some(MediaSource::Upload(path)));
        store.update_instrument(&id, patch);
    }

    let missing: Vec<&str> = store
        .state()
        .instruments
        .iter()
        .filter(|i| i.media.is_none())
        .map(|i| i.name.as_str())
        .collect();
    if !missing.is_empty() {
        warn!(?missing, "Instruments without media; the render service will look them up itself");
    }

    let client = RenderClient::new(&config.render_url, config.render_timeout());
    let video = client.trigger_remote_render(store.state()).await?;
    let path = save_render(&config.output_dir, &video).await?;
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upload() {
        assert_eq!(
            parse_upload("bass=/tmp/take.webm").unwrap(),
            ("bass".to_string(), PathBuf::from("/tmp/take.webm"))
        );
        assert!(parse_upload("bass").is_err());
        assert!(parse_upload("=x.mp4").is_err());
    }

    #[test]
    fn test_script_command_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("song.json");
        std::fs::write(
            &project,
            r##"{"version":"1.0","bpm":120,"totalBeats":16,"gridSize":{"rows":1,"cols":2},
                "instruments":[{"id":"k","name":"kick","color":"#FF6B6B","gridPosition":1}],
                "clips":[{"id":"c","instrumentId":"k","startTime":2,"duration":2,"trackIndex":0}]}"##,
        )
        .unwrap();
        let out = dir.path().join("render.py");

        script_cmd(&project, Some(out.clone())).unwrap();

        let script = std::fs::read_to_string(out).unwrap();
        assert!(script.contains("CELL_WIDTH = 960"));
        assert!(script.contains("video0 = video0.with_position((960, 0))"));
    }

    #[test]
    fn test_load_offline_rejects_other_versions() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("old.json");
        std::fs::write(&project, r#"{"version":"0.1"}"#).unwrap();
        assert!(load_offline(&project).is_err());
    }
}
