//! Pick command

use super::session::Session;
use anyhow::Result;
use atelier_core::Vec3;
use atelier_editor::{
    pick_at, resolve, EditorConfig, EditorContext, EditorEvent, SelectionOutcome,
};
use atelier_scene::Camera;

pub struct PickArgs {
    pub records: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub modifier: bool,
    pub config: EditorConfig,
}

pub fn run(args: PickArgs) -> Result<()> {
    if args.width <= 0.0 || args.height <= 0.0 {
        anyhow::bail!("Viewport must have a positive size");
    }

    let session = Session::open(&args.records, &args.config)?;
    let camera = Camera::looking_at(Vec3::from_array(args.eye), Vec3::from_array(args.target))
        .with_aspect(args.width / args.height);

    let hit = pick_at(
        &session.graph,
        &camera,
        args.x,
        args.y,
        (args.width, args.height),
    );
    match hit.and_then(|node| session.sync.id_for(node)) {
        Some(id) => println!("Hit: {}", id),
        None if hit.is_some() => println!("Hit: <untagged node>"),
        None => println!("Hit: nothing"),
    }

    let mut ctx = EditorContext::new();
    match resolve(&mut ctx, &session.graph, hit, args.modifier) {
        SelectionOutcome::Selected(id) => println!("Selected: {}", id),
        SelectionOutcome::Cleared => println!("Selection cleared"),
        SelectionOutcome::Rejected => println!("Selection unchanged"),
    }

    for event in ctx.drain_events() {
        if let EditorEvent::Diagnostic(diagnostic) = event {
            println!("  note: {}", diagnostic);
        }
    }

    Ok(())
}
