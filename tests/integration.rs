//! End-to-end integration tests.
//!
//! These tests write synthetic input files, load them through the public
//! API, and exercise editing, restriction and export on the result.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use approx::assert_relative_eq;

use abstract_mesh::config::InspectConfig;
use abstract_mesh::ingestion::load_mesh;
use abstract_mesh::types::{Face, Vertex};
use abstract_mesh::{ChangeFlags, FaceGroup, Inspector, MeshError};

/// Write a two-object OBJ + MTL to `dir`.
///
/// `hull` is a 4x4 grid with normals and UVs; `fin` is a single triangle
/// with positions only, so the mesh as a whole is not homogeneous.
fn write_two_part_obj(dir: &Path) {
    let n = 4usize;
    let verts = n + 1;

    let mut obj = String::from("mtllib ship.mtl\no hull\nusemtl paint\n");
    for y in 0..verts {
        for x in 0..verts {
            let fx = x as f32 / n as f32;
            let fy = y as f32 / n as f32;
            obj.push_str(&format!("v {} {} 0\n", fx, fy * 0.5));
            obj.push_str(&format!("vt {} {}\n", fx, fy));
            obj.push_str("vn 0 0 1\n");
        }
    }
    for y in 0..n {
        for x in 0..n {
            let tl = y * verts + x + 1; // 1-indexed
            let tr = tl + 1;
            let bl = tl + verts;
            let br = bl + 1;
            obj.push_str(&format!("f {tl}/{tl}/{tl} {bl}/{bl}/{bl} {tr}/{tr}/{tr}\n"));
            obj.push_str(&format!("f {tr}/{tr}/{tr} {bl}/{bl}/{bl} {br}/{br}/{br}\n"));
        }
    }

    let base = verts * verts;
    obj.push_str("o fin\nusemtl paint\n");
    obj.push_str("v 0 0 1\nv 0 1 2\nv 0 0 3\n");
    obj.push_str(&format!("f {} {} {}\n", base + 1, base + 2, base + 3));

    fs::write(dir.join("ship.obj"), &obj).unwrap();
    fs::write(dir.join("ship.mtl"), "newmtl paint\nKd 0.8 0.1 0.1\n").unwrap();
}

#[test]
fn obj_load_builds_one_group_per_object() {
    let tmp = tempfile::tempdir().unwrap();
    write_two_part_obj(tmp.path());

    let mut mesh = load_mesh(&tmp.path().join("ship.obj")).unwrap();
    assert_eq!(mesh.name(), Some("ship"));
    assert_eq!(mesh.face_group_count(), 2);
    assert_eq!(mesh.face_count(), 33);

    let names: Vec<_> = mesh.iter().map(|g| g.name().unwrap_or("")).collect();
    assert_eq!(names, vec!["hull", "fin"]);

    // Both groups reference the same material allocation.
    let hull_mat = mesh.face_group_at(0).unwrap().material().cloned().unwrap();
    let fin_mat = mesh.face_group_at(1).unwrap().material().cloned().unwrap();
    assert_eq!(hull_mat, fin_mat);
    assert_relative_eq!(hull_mat.base_color[0], 0.8);

    let (schema, homogeneous) = mesh.get_vertex_schema();
    assert_eq!(schema.get("position"), Some(3));
    assert_eq!(schema.get("normal"), Some(3));
    assert_eq!(schema.get("uv"), Some(2));
    assert!(!homogeneous);
    assert!(mesh.iter_mut().all(|g| g.is_homogeneous()));

    let bb = mesh.bounding_box();
    assert_relative_eq!(bb.min[2], 0.0);
    assert_relative_eq!(bb.max[1], 1.0);
    assert_relative_eq!(bb.max[2], 3.0);
}

#[test]
fn uniform_inspection_restricts_to_positions() {
    let tmp = tempfile::tempdir().unwrap();
    write_two_part_obj(tmp.path());

    let config = InspectConfig {
        input: tmp.path().join("ship.obj"),
        uniform: true,
        temporary_attributes: vec!["normal".into()],
        ..Default::default()
    };
    let result = Inspector::run(&config).expect("inspection should succeed");
    let summary = result.summary;

    assert!(summary.homogeneous);
    assert_eq!(summary.vertex_schema.len(), 1);
    assert_eq!(summary.vertex_schema.get("position"), Some(3));
    assert_eq!(summary.groups[0].temporary_attributes, vec!["normal".to_string()]);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["groups"][1]["name"], "fin");
    assert_eq!(json["face_count"], 33);
}

#[test]
fn export_after_load_round_trips_through_bulk_constructor() {
    let tmp = tempfile::tempdir().unwrap();
    write_two_part_obj(tmp.path());

    let mut mesh = load_mesh(&tmp.path().join("ship.obj")).unwrap();
    let hull = mesh.face_group_at_mut(0).unwrap();
    let arrays = hull.to_attribute_arrays().unwrap();
    assert_eq!(arrays.vertex_count, 25);
    assert_eq!(arrays.triangle_count(), 32);

    let mut rebuilt =
        FaceGroup::from_attribute_arrays(&arrays.attributes, arrays.vertex_count, &arrays.indices)
            .unwrap();
    assert_eq!(rebuilt.faces(), hull.faces());
    assert_eq!(rebuilt.vertex_schema(), hull.vertex_schema());
}

#[test]
fn editing_a_loaded_group_notifies_listeners() {
    let tmp = tempfile::tempdir().unwrap();
    write_two_part_obj(tmp.path());

    let mut mesh = load_mesh(&tmp.path().join("ship.obj")).unwrap();
    let fin = mesh.face_group_at_mut(1).unwrap();

    let render_rebuilds = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&render_rebuilds);
    fin.subscribe(move |flags: &ChangeFlags| {
        if flags.affects_render_mesh {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    fin.set_attribute_temporary("position", true);
    assert_eq!(render_rebuilds.load(Ordering::SeqCst), 0);

    let v = |z: f32| Vertex::new().with("position", [0.0, 0.0, z]).with("normal", [1.0, 0.0, 0.0]);
    fin.add_face(Face::triangle(v(4.0), v(5.0), v(6.0)));
    assert_eq!(render_rebuilds.load(Ordering::SeqCst), 1);
    assert!(!fin.is_homogeneous());
    assert_relative_eq!(fin.bounding_box().max[2], 6.0);

    assert!(matches!(
        fin.face_at(fin.face_count()),
        Err(MeshError::IndexOutOfRange { .. })
    ));
}

#[test]
fn ply_load_through_public_api() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("panel.ply");
    fs::write(
        &path,
        "\
ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
property float nx
property float ny
property float nz
element face 1
property list uchar int vertex_indices
end_header
0 0 0 0 0 1
2 0 0 0 0 1
2 2 0 0 0 1
0 2 0 0 0 1
4 0 1 2 3
",
    )
    .unwrap();

    let mut mesh = load_mesh(&path).unwrap();
    assert_eq!(mesh.name(), Some("panel"));
    assert_eq!(mesh.face_count(), 2);
    assert!(mesh.is_homogeneous());
    let bb = mesh.bounding_box();
    assert_eq!(bb.min, [0.0, 0.0, 0.0]);
    assert_relative_eq!(bb.max[0], 2.0);
    assert_relative_eq!(bb.max[1], 2.0);
}

#[test]
fn inspection_missing_input_returns_error() {
    let tmp = tempfile::tempdir().unwrap();
    let config = InspectConfig {
        input: tmp.path().join("nonexistent.obj"),
        ..Default::default()
    };
    assert!(Inspector::run(&config).is_err());
}
