//! Drag command

use super::session::Session;
use anyhow::{Context, Result};
use atelier_core::RecordId;
use atelier_editor::{
    Clock, EditorConfig, EditorContext, GizmoAxis, GizmoDelta, ManualClock, SystemClock,
    TransformEditor, WriteOutcome,
};
use atelier_store::RecordsFile;
use std::time::Duration;

pub struct DragArgs {
    pub records: String,
    pub id: String,
    pub mode: String,
    pub axis: String,
    pub amount: f32,
    pub steps: u32,
    pub interval_ms: u64,
    pub realtime: bool,
    pub config: EditorConfig,
}

pub fn run(args: DragArgs) -> Result<()> {
    let mut session = Session::open(&args.records, &args.config)?;
    let axis = match args.axis.as_str() {
        "x" => GizmoAxis::X,
        "y" => GizmoAxis::Y,
        "z" => GizmoAxis::Z,
        "uniform" => GizmoAxis::Uniform,
        other => anyhow::bail!("Unknown axis: {}", other),
    };

    let mut ctx = EditorContext::new();
    let mut editor = TransformEditor::new(args.config.transform_editor_config());
    let mut manual = ManualClock::new();
    let system = SystemClock::new();
    let now = |manual: &ManualClock| {
        if args.realtime {
            system.now()
        } else {
            manual.now()
        }
    };

    ctx.select(RecordId::from(args.id.as_str()));
    let node = editor
        .attach(&mut ctx, &session.graph, &session.sync)
        .with_context(|| format!("Record '{}' is not in the render tree", args.id))?;
    while editor.mode().label() != args.mode {
        editor.shortcut(&mut ctx);
    }

    println!(
        "Dragging '{}' ({} along {}, {} steps of {} every {}ms)",
        args.id,
        editor.mode().label(),
        args.axis,
        args.steps,
        args.amount,
        args.interval_ms
    );

    let delta = GizmoDelta::new(axis, args.amount);
    let mut written = 0;
    let mut debounced = 0;
    for _ in 0..args.steps {
        editor.drag(&ctx, &mut session.graph, delta)?;
        let outcome =
            editor.on_transform_changed(now(&manual), &mut ctx, &session.graph, &mut session.store)?;
        match outcome {
            WriteOutcome::Written(_) => written += 1,
            WriteOutcome::Debounced => debounced += 1,
            other => log::debug!("drag step: {:?}", other),
        }
        if args.realtime {
            std::thread::sleep(Duration::from_millis(args.interval_ms));
        } else {
            manual.advance_ms(args.interval_ms);
        }
    }

    let flushed = matches!(
        editor.release(now(&manual), &mut ctx, &session.graph, &mut session.store)?,
        WriteOutcome::Written(_)
    );
    println!(
        "  {} writes, {} dropped by debounce{}",
        written,
        debounced,
        if flushed { ", final transform flushed on release" } else { "" }
    );

    // The write-back pass should find the live node already matching
    if let Some(report) = session.pass()? {
        log::debug!("post-drag pass: {} updated", report.updated.len());
    }
    if session.node(&args.id)? != node {
        log::warn!("'{}' was rebuilt after the drag", args.id);
    }

    let record = session
        .store
        .get(&args.id)
        .cloned()
        .with_context(|| format!("Record '{}' vanished from the store", args.id))?;
    let file = RecordsFile {
        records: vec![record],
    };
    println!();
    print!("{}", toml::to_string_pretty(&file)?);

    Ok(())
}
