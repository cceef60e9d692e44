use std::error::Error;
use std::path::PathBuf;

use circlelize::{CircleCommand, CircleParams, Mesh, MeshSelection};
use log::{error, info};

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let (input, output) = match (args.next(), args.next()) {
        (Some(input), Some(output)) => (input, output),
        _ => return Err("usage: circlelize <input.obj> <output.obj>".into()),
    };

    let (mut obj, mut mesh) = Mesh::load_obj(&input)?;
    info!(
        "loaded {}: {} vertices, {} faces",
        input.display(),
        mesh.vertex_count(),
        mesh.face_count()
    );

    let start = mesh
        .boundary_edges()
        .next()
        .ok_or("mesh is closed, there is no border loop to circularize")?;
    let selection = MeshSelection::edges(mesh.boundary_component(start));

    let mut command = CircleCommand::new();
    let snapshot = command.execute(&mut mesh, &selection, &CircleParams::default())?;
    info!("moved {} border vertices", snapshot.ordered.len());

    mesh.write_positions(&mut obj.data);
    obj.save(&output)?;
    info!("wrote {}", output.display());
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
